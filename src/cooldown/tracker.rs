use log::{debug, trace};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::task::JoinHandle;

use super::clock::{Clock, SystemClock};
use super::errors::CooldownError;
use super::format::format_duration;

/// actor id -> action name -> expiry in epoch millis
type Entries = HashMap<String, HashMap<String, u64>>;

/// Outcome of [`CooldownTracker::check_and_apply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CooldownCheck {
    pub on_cooldown: bool,
    pub remaining_seconds: u64,
    pub formatted_remaining: Option<String>,
}

impl CooldownCheck {
    fn granted() -> Self {
        Self {
            on_cooldown: false,
            remaining_seconds: 0,
            formatted_remaining: None,
        }
    }

    fn denied(remaining_seconds: u64) -> Self {
        Self {
            on_cooldown: true,
            remaining_seconds,
            formatted_remaining: Some(format_duration(remaining_seconds)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CooldownStats {
    pub total: usize,
    pub active: usize,
    pub expired: usize,
}

/// Per (actor, action) rate limiter with lazy expiry.
///
/// An entry whose expiry is at or before the current instant is treated as
/// absent and removed the next time it is looked at. The optional sweeper
/// only reclaims memory; reads never depend on it.
pub struct CooldownTracker<C: Clock = SystemClock> {
    entries: Mutex<Entries>,
    clock: C,
}

impl CooldownTracker<SystemClock> {
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl Default for CooldownTracker<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

fn validate(actor_id: &str, action: &str) -> Result<(), CooldownError> {
    if actor_id.is_empty() {
        return Err(CooldownError::EmptyActor);
    }
    if action.is_empty() {
        return Err(CooldownError::EmptyAction);
    }
    Ok(())
}

/// Returns the live expiry for the key, evicting it if it has lapsed.
fn live_expiry(entries: &mut Entries, actor_id: &str, action: &str, now: u64) -> Option<u64> {
    let actions = entries.get_mut(actor_id)?;
    let expires_at = *actions.get(action)?;
    if now >= expires_at {
        actions.remove(action);
        if actions.is_empty() {
            entries.remove(actor_id);
        }
        trace!("Lazily expired cooldown {}/{}", actor_id, action);
        return None;
    }
    Some(expires_at)
}

fn remaining_from(expires_at: u64, now: u64) -> u64 {
    (expires_at - now).div_ceil(1000)
}

impl<C: Clock> CooldownTracker<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }

    pub fn is_on_cooldown(&self, actor_id: &str, action: &str) -> Result<bool, CooldownError> {
        validate(actor_id, action)?;
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        Ok(live_expiry(&mut entries, actor_id, action, now).is_some())
    }

    /// Whole seconds left, rounded up. Zero exactly when the key is not on cooldown.
    pub fn remaining_seconds(&self, actor_id: &str, action: &str) -> Result<u64, CooldownError> {
        validate(actor_id, action)?;
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        Ok(live_expiry(&mut entries, actor_id, action, now)
            .map(|expires_at| remaining_from(expires_at, now))
            .unwrap_or(0))
    }

    pub fn grant(&self, actor_id: &str, action: &str, duration_secs: u64) -> Result<(), CooldownError> {
        validate(actor_id, action)?;
        if duration_secs == 0 {
            return Err(CooldownError::ZeroDuration);
        }
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        Self::insert(&mut entries, actor_id, action, now, duration_secs);
        Ok(())
    }

    fn insert(entries: &mut Entries, actor_id: &str, action: &str, now: u64, duration_secs: u64) {
        let expires_at = now.saturating_add(duration_secs.saturating_mul(1000));
        entries
            .entry(actor_id.to_string())
            .or_default()
            .insert(action.to_string(), expires_at);
        debug!("Cooldown granted: {}/{} for {}s", actor_id, action, duration_secs);
    }

    /// Gate used by command dispatch. On success the cooldown starts now,
    /// before the action itself runs.
    pub fn check_and_apply(
        &self,
        actor_id: &str,
        action: &str,
        cooldown_secs: u64,
    ) -> Result<CooldownCheck, CooldownError> {
        validate(actor_id, action)?;
        if cooldown_secs == 0 {
            return Err(CooldownError::ZeroDuration);
        }
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();

        if let Some(expires_at) = live_expiry(&mut entries, actor_id, action, now) {
            return Ok(CooldownCheck::denied(remaining_from(expires_at, now)));
        }

        Self::insert(&mut entries, actor_id, action, now, cooldown_secs);
        Ok(CooldownCheck::granted())
    }

    pub fn clear(&self, actor_id: &str, action: &str) {
        let mut entries = self.entries.lock();
        if let Some(actions) = entries.get_mut(actor_id) {
            actions.remove(action);
            if actions.is_empty() {
                entries.remove(actor_id);
            }
        }
    }

    pub fn clear_all(&self, actor_id: &str) {
        self.entries.lock().remove(actor_id);
    }

    pub fn clear_everything(&self) {
        self.entries.lock().clear();
    }

    /// Physical entry count, including lapsed entries not yet evicted.
    pub fn len(&self) -> usize {
        self.entries.lock().values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// Counts live entries, evicting the lapsed ones it walks over.
    pub fn stats(&self) -> CooldownStats {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        let total = entries.values().map(HashMap::len).sum();
        let expired = Self::evict_expired(&mut entries, now);
        CooldownStats {
            total,
            active: total - expired,
            expired,
        }
    }

    /// Drops every lapsed entry and returns how many went.
    pub fn sweep(&self) -> usize {
        let now = self.clock.now_millis();
        let mut entries = self.entries.lock();
        Self::evict_expired(&mut entries, now)
    }

    fn evict_expired(entries: &mut Entries, now: u64) -> usize {
        let mut removed = 0;
        entries.retain(|_, actions| {
            let before = actions.len();
            actions.retain(|_, expires_at| now < *expires_at);
            removed += before - actions.len();
            !actions.is_empty()
        });
        removed
    }
}

impl<C: Clock + 'static> CooldownTracker<C> {
    /// Periodically sweeps lapsed entries. The task only holds a weak
    /// reference and ends once the last `Arc` to the tracker is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let tracker: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(tracker) = tracker.upgrade() else {
                    debug!("Cooldown tracker dropped, stopping sweeper");
                    break;
                };
                let removed = tracker.sweep();
                if removed > 0 {
                    debug!("Cooldown sweep removed {} expired entries", removed);
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::clock::ManualClock;
    use std::thread;

    fn tracker() -> (CooldownTracker<ManualClock>, ManualClock) {
        let clock = ManualClock::new(1_700_000_000_000);
        (CooldownTracker::with_clock(clock.clone()), clock)
    }

    #[test]
    fn first_check_grants_second_is_denied() {
        let (tracker, clock) = tracker();

        let first = tracker.check_and_apply("42", "ping", 3).unwrap();
        assert_eq!(first, CooldownCheck::granted());

        clock.advance(Duration::from_millis(500));
        let second = tracker.check_and_apply("42", "ping", 3).unwrap();
        assert!(second.on_cooldown);
        assert_eq!(second.remaining_seconds, 3);
        assert_eq!(second.formatted_remaining.as_deref(), Some("3 seconds"));
    }

    #[test]
    fn denied_attempt_does_not_extend_the_window() {
        let (tracker, clock) = tracker();
        tracker.check_and_apply("42", "ping", 3).unwrap();

        clock.advance(Duration::from_secs(2));
        assert!(tracker.check_and_apply("42", "ping", 3).unwrap().on_cooldown);

        clock.advance(Duration::from_secs(1));
        assert!(!tracker.check_and_apply("42", "ping", 3).unwrap().on_cooldown);
    }

    #[test]
    fn expires_after_duration() {
        let (tracker, clock) = tracker();
        tracker.grant("42", "info", 5).unwrap();
        assert!(tracker.is_on_cooldown("42", "info").unwrap());

        clock.advance(Duration::from_millis(4_999));
        assert!(tracker.is_on_cooldown("42", "info").unwrap());

        clock.advance(Duration::from_millis(1));
        assert!(!tracker.is_on_cooldown("42", "info").unwrap());
        assert_eq!(tracker.len(), 0, "lookup past expiry evicts the entry");
    }

    #[test]
    fn keys_are_independent() {
        let (tracker, _clock) = tracker();
        tracker.grant("A", "ping", 10).unwrap();

        assert!(tracker.is_on_cooldown("A", "ping").unwrap());
        assert!(!tracker.is_on_cooldown("A", "help").unwrap());
        assert!(!tracker.is_on_cooldown("B", "ping").unwrap());
    }

    #[test]
    fn countdown_is_monotonic_and_ends_with_cooldown() {
        let (tracker, clock) = tracker();
        tracker.grant("42", "help", 3).unwrap();

        let mut last = u64::MAX;
        for _ in 0..40 {
            let remaining = tracker.remaining_seconds("42", "help").unwrap();
            let on_cooldown = tracker.is_on_cooldown("42", "help").unwrap();
            assert!(remaining <= last);
            assert_eq!(remaining == 0, !on_cooldown);
            last = remaining;
            clock.advance(Duration::from_millis(100));
        }
        assert_eq!(last, 0);
    }

    #[test]
    fn regrant_overwrites_previous_expiry() {
        let (tracker, clock) = tracker();
        tracker.grant("42", "ping", 60).unwrap();
        tracker.grant("42", "ping", 2).unwrap();
        assert_eq!(tracker.len(), 1);

        clock.advance(Duration::from_secs(2));
        assert!(!tracker.is_on_cooldown("42", "ping").unwrap());
    }

    #[test]
    fn clear_is_idempotent() {
        let (tracker, _clock) = tracker();
        tracker.grant("42", "ping", 10).unwrap();

        tracker.clear("42", "help");
        tracker.clear("7", "ping");
        assert_eq!(tracker.len(), 1);

        tracker.clear("42", "ping");
        tracker.clear("42", "ping");
        assert!(tracker.is_empty());
    }

    #[test]
    fn clear_all_only_touches_one_actor() {
        let (tracker, _clock) = tracker();
        tracker.grant("A", "ping", 10).unwrap();
        tracker.grant("A", "help", 10).unwrap();
        tracker.grant("B", "ping", 10).unwrap();
        tracker.grant("AB", "ping", 10).unwrap();

        tracker.clear_all("A");

        assert!(!tracker.is_on_cooldown("A", "ping").unwrap());
        assert!(!tracker.is_on_cooldown("A", "help").unwrap());
        assert!(tracker.is_on_cooldown("B", "ping").unwrap());
        assert!(tracker.is_on_cooldown("AB", "ping").unwrap());
    }

    #[test]
    fn clear_everything_empties_store() {
        let (tracker, _clock) = tracker();
        tracker.grant("A", "ping", 10).unwrap();
        tracker.grant("B", "info", 10).unwrap();
        tracker.clear_everything();
        assert!(tracker.is_empty());
    }

    #[test]
    fn stats_evicts_expired_entries() {
        let (tracker, clock) = tracker();
        tracker.grant("A", "ping", 3).unwrap();
        tracker.grant("B", "ping", 3).unwrap();
        tracker.grant("A", "info", 30).unwrap();

        clock.advance(Duration::from_secs(5));
        let stats = tracker.stats();
        assert_eq!(stats, CooldownStats { total: 3, active: 1, expired: 2 });

        let stats = tracker.stats();
        assert_eq!(stats, CooldownStats { total: 1, active: 1, expired: 0 });
    }

    #[test]
    fn sweep_removes_only_lapsed_entries() {
        let (tracker, clock) = tracker();
        tracker.grant("A", "ping", 3).unwrap();
        tracker.grant("A", "info", 30).unwrap();

        clock.advance(Duration::from_secs(3));
        assert_eq!(tracker.sweep(), 1);
        assert_eq!(tracker.sweep(), 0);
        assert!(tracker.is_on_cooldown("A", "info").unwrap());
    }

    #[test]
    fn rejects_invalid_arguments() {
        let (tracker, _clock) = tracker();
        assert_eq!(tracker.is_on_cooldown("", "ping"), Err(CooldownError::EmptyActor));
        assert_eq!(tracker.remaining_seconds("42", ""), Err(CooldownError::EmptyAction));
        assert_eq!(tracker.grant("42", "ping", 0), Err(CooldownError::ZeroDuration));
        assert_eq!(
            tracker.check_and_apply("42", "ping", 0),
            Err(CooldownError::ZeroDuration)
        );
        assert!(tracker.is_empty(), "rejected calls leave no entry behind");
    }

    #[test]
    fn concurrent_checks_admit_exactly_one() {
        let (tracker, _clock) = tracker();
        let tracker = Arc::new(tracker);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let tracker = Arc::clone(&tracker);
                thread::spawn(move || !tracker.check_and_apply("42", "ping", 3).unwrap().on_cooldown)
            })
            .collect();

        let admitted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|admitted| *admitted)
            .count();
        assert_eq!(admitted, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_reclaims_lapsed_entries() {
        let (tracker, clock) = tracker();
        let tracker = Arc::new(tracker);
        tracker.grant("A", "ping", 3).unwrap();

        let handle = tracker.spawn_sweeper(Duration::from_secs(10));
        clock.advance(Duration::from_secs(5));
        assert_eq!(tracker.len(), 1);

        tokio::time::sleep(Duration::from_secs(11)).await;
        tokio::task::yield_now().await;
        assert_eq!(tracker.len(), 0);

        drop(tracker);
        tokio::time::sleep(Duration::from_secs(11)).await;
        assert!(handle.await.is_ok());
    }
}
