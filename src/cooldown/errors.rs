use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CooldownError {
    #[error("Actor id must not be empty")]
    EmptyActor,

    #[error("Action name must not be empty")]
    EmptyAction,

    #[error("Cooldown duration must be at least one second")]
    ZeroDuration,
}
