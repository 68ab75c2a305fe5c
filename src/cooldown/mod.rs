// src/cooldown/mod.rs
mod clock;
mod errors;
mod format;
mod tracker;

pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::CooldownError;
pub use format::format_duration;
pub use tracker::{CooldownCheck, CooldownStats, CooldownTracker};
