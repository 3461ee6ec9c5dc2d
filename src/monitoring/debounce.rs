//! Alert debouncing.
//!
//! Stateful gate between threshold evaluation and dispatch: a batch of
//! conditions only goes out if the cooldown has elapsed since the last
//! dispatched alert. The caller owns persisting the updated state
//! before invoking the dispatcher (at-most-once within the cooldown,
//! not exactly-once delivery).

use chrono::{DateTime, Duration, Utc};

use super::AlertCondition;

/// The one piece of mutable persisted state in the agent.
/// `last_alert_time`, once set, never moves backward during the process
/// lifetime.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertState {
    pub last_alert_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown: Duration,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self { cooldown }
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Decide whether `conditions` should be dispatched at `now`.
    ///
    /// Empty condition sets never dispatch and never touch state. An
    /// unset `last_alert_time` counts as cooldown-elapsed, so the first
    /// ever alert always fires. Returns true after advancing
    /// `state.last_alert_time` to `now`; the caller must persist the
    /// state before dispatching.
    pub fn should_dispatch(
        &self,
        state: &mut AlertState,
        conditions: &[AlertCondition],
        now: DateTime<Utc>,
    ) -> bool {
        if conditions.is_empty() {
            return false;
        }

        let cooldown_elapsed = match state.last_alert_time {
            None => true,
            Some(last) => now - last > self.cooldown,
        };

        if cooldown_elapsed {
            state.last_alert_time = Some(now);
        }
        cooldown_elapsed
    }
}
