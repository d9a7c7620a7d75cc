//! Sleep timer: a countdown state machine producing an expiry action.
//!
//! The timer never blocks; the owning context polls it on its periodic tick
//! (sub-second granularity is not required) and executes the returned action
//! exactly once.

use std::time::{Duration, Instant};

use tracing::info;

/// What to do to the playback engine when the countdown expires.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SleepAction {
    Stop,
    Pause,
    FadeThenStop,
}

#[derive(Debug)]
enum State {
    Idle,
    Armed {
        deadline: Instant,
        action: SleepAction,
    },
}

/// `{idle | armed(deadline, action)}`; armed transitions to idle exactly
/// once, on expiry or explicit cancel.
#[derive(Debug)]
pub struct SleepTimer {
    state: State,
}

impl Default for SleepTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepTimer {
    pub fn new() -> Self {
        Self { state: State::Idle }
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, State::Armed { .. })
    }

    /// Arm with `deadline = now + minutes`. Re-arming while already armed
    /// replaces the previous deadline and action; countdowns never stack.
    pub fn start(&mut self, now: Instant, minutes: u64, action: SleepAction) {
        let deadline = now + Duration::from_secs(minutes * 60);
        self.state = State::Armed { deadline, action };
        info!(minutes, ?action, "sleep timer armed");
    }

    /// Armed → idle with no side effect on playback.
    pub fn cancel(&mut self) {
        if self.is_armed() {
            info!("sleep timer cancelled");
        }
        self.state = State::Idle;
    }

    /// Seconds until expiry; 0 when idle or already due.
    pub fn remaining(&self, now: Instant) -> u64 {
        match &self.state {
            State::Idle => 0,
            State::Armed { deadline, .. } => deadline.saturating_duration_since(now).as_secs(),
        }
    }

    /// Fire the expiry action if the deadline has been reached.
    ///
    /// Returns the action at most once per arming: firing transitions the
    /// timer back to idle before the caller runs the action.
    pub fn poll(&mut self, now: Instant) -> Option<SleepAction> {
        match &self.state {
            State::Armed { deadline, action } if now >= *deadline => {
                let action = *action;
                self.state = State::Idle;
                info!(?action, "sleep timer expired");
                Some(action)
            }
            _ => None,
        }
    }
}
