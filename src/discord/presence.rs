// src/discord/presence.rs
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serenity::gateway::ActivityData;
use serenity::prelude::*;
use std::time::Duration;
use tokio::task::JoinHandle;
use log::debug;

fn activities(guilds: usize, users: usize) -> Vec<ActivityData> {
    vec![
        ActivityData::watching(format!("{} servers", guilds)),
        ActivityData::watching(format!("{} users", users)),
        ActivityData::playing("/help for commands"),
        ActivityData::playing("serenity"),
    ]
}

/// Picks a random activity every `every` until the task is aborted.
pub fn spawn_rotation(ctx: Context, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let choices = activities(ctx.cache.guild_count(), ctx.cache.user_count());
            let picked = choices.choose(&mut rand::thread_rng()).cloned();
            if let Some(activity) = picked {
                debug!("Rotating presence to {:?}", activity.name);
                ctx.set_activity(Some(activity));
            }
        }
    })
}

/// Owns the running rotation task. A reconnect hands it a task bound to the
/// fresh `Context`; the old one is aborted.
#[derive(Default)]
pub struct PresenceRotation {
    task: Mutex<Option<JoinHandle<()>>>,
}

impl PresenceRotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&self, task: JoinHandle<()>) {
        if let Some(previous) = self.task.lock().replace(task) {
            debug!("Restarting presence rotation");
            previous.abort();
        }
    }

    pub fn stop(&self) {
        if let Some(task) = self.task.lock().take() {
            task.abort();
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.lock().as_ref().map_or(false, |task| !task.is_finished())
    }
}

impl Drop for PresenceRotation {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idle_task() -> JoinHandle<()> {
        tokio::spawn(std::future::pending::<()>())
    }

    #[tokio::test]
    async fn replacing_aborts_previous_task() {
        let rotation = PresenceRotation::new();
        let first = idle_task();
        let first_abort = first.abort_handle();

        rotation.replace(first);
        rotation.replace(idle_task());
        tokio::task::yield_now().await;

        assert!(first_abort.is_finished());
        assert!(rotation.is_running());
    }

    #[tokio::test]
    async fn stop_aborts_running_task() {
        let rotation = PresenceRotation::new();
        let task = idle_task();
        let abort = task.abort_handle();
        rotation.replace(task);

        rotation.stop();
        tokio::task::yield_now().await;

        assert!(abort.is_finished());
        assert!(!rotation.is_running());
        rotation.stop();
    }
}
