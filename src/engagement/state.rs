use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PauseReason {
    Hidden,
    Idle,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum EngagementState {
    Active,
    Paused(PauseReason),
    Flushed,
}

/// Active-time bookkeeping for one page view.
///
/// Every transition takes the current instant from the caller, so the same
/// sequence of calls always produces the same totals.
#[derive(Debug, Clone)]
pub struct EngagementSession {
    session_id: String,
    started_at: DateTime<Utc>,
    state: EngagementState,
    visible: bool,
    accumulated_active_ms: u64,
    /// `None` while paused or flushed.
    last_resume_at: Option<Instant>,
    /// Identifies the idle window currently armed; older expiries are stale.
    idle_generation: u64,
}

impl EngagementSession {
    pub fn begin(session_id: String, started_at: DateTime<Utc>, now: Instant) -> Self {
        Self {
            session_id,
            started_at,
            state: EngagementState::Active,
            visible: true,
            accumulated_active_ms: 0,
            last_resume_at: Some(now),
            idle_generation: 0,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn state(&self) -> EngagementState {
        self.state
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_flushed(&self) -> bool {
        self.state == EngagementState::Flushed
    }

    pub fn accumulated_active_ms(&self) -> u64 {
        self.accumulated_active_ms
    }

    /// Accumulated time plus the running stretch, without mutating anything.
    pub fn active_ms(&self, now: Instant) -> u64 {
        self.accumulated_active_ms
            .saturating_add(self.running_ms(now))
    }

    /// Tab went to the background. Returns whether the state changed.
    pub fn hide(&mut self, now: Instant) -> bool {
        match self.state {
            EngagementState::Flushed => false,
            EngagementState::Paused(PauseReason::Hidden) => {
                self.visible = false;
                false
            }
            EngagementState::Active => {
                self.accrue(now);
                self.visible = false;
                self.state = EngagementState::Paused(PauseReason::Hidden);
                true
            }
            EngagementState::Paused(PauseReason::Idle) => {
                self.visible = false;
                self.state = EngagementState::Paused(PauseReason::Hidden);
                true
            }
        }
    }

    /// Tab came back. Showing the page counts as attention, so this resumes
    /// from either pause reason.
    pub fn show(&mut self, now: Instant) -> bool {
        match self.state {
            EngagementState::Flushed => false,
            EngagementState::Active => {
                self.visible = true;
                false
            }
            EngagementState::Paused(_) => {
                self.visible = true;
                self.resume(now);
                true
            }
        }
    }

    /// Pointer, key, scroll or click input. Only an idle, visible page resumes;
    /// input while hidden or already active leaves the accrual untouched.
    pub fn record_activity(&mut self, now: Instant) -> bool {
        if self.state == EngagementState::Paused(PauseReason::Idle) && self.visible {
            self.resume(now);
            return true;
        }
        false
    }

    /// Starts a new idle window at `now` and returns its generation and
    /// deadline. Any window armed before is stale from here on.
    pub fn arm_idle(&mut self, now: Instant, timeout: Duration) -> Option<(u64, Instant)> {
        if self.is_flushed() {
            return None;
        }
        self.idle_generation = self.idle_generation.wrapping_add(1);
        Some((self.idle_generation, now + timeout))
    }

    /// Input plus a fresh idle window, as one transition. Returns whether the
    /// page resumed and the window to watch.
    pub fn activity(&mut self, now: Instant, timeout: Duration) -> (bool, Option<(u64, Instant)>) {
        let resumed = self.record_activity(now);
        (resumed, self.arm_idle(now, timeout))
    }

    /// Showing the tab plus a fresh idle window when it resumed. Windows armed
    /// before a resume are stale either way.
    pub fn reveal(&mut self, now: Instant, timeout: Duration) -> (bool, Option<(u64, Instant)>) {
        if self.show(now) {
            (true, self.arm_idle(now, timeout))
        } else {
            (false, None)
        }
    }

    /// The idle window `generation` ran out at `deadline` with no input.
    /// Stale generations and non-active states are ignored, so a page that
    /// was hidden when its window closed is not excluded a second time.
    pub fn idle_expired(&mut self, generation: u64, deadline: Instant) -> bool {
        if generation != self.idle_generation || self.state != EngagementState::Active {
            return false;
        }
        self.accrue(deadline);
        self.state = EngagementState::Paused(PauseReason::Idle);
        true
    }

    /// Ends the session and returns its total active milliseconds, exactly once.
    pub fn flush(&mut self, now: Instant) -> Option<u64> {
        if self.is_flushed() {
            return None;
        }
        if self.state == EngagementState::Active {
            self.accrue(now);
        }
        self.last_resume_at = None;
        self.state = EngagementState::Flushed;
        Some(self.accumulated_active_ms)
    }

    fn resume(&mut self, now: Instant) {
        self.last_resume_at = Some(now);
        self.state = EngagementState::Active;
    }

    fn accrue(&mut self, now: Instant) {
        let running = self.running_ms(now);
        self.accumulated_active_ms = self.accumulated_active_ms.saturating_add(running);
        self.last_resume_at = None;
    }

    fn running_ms(&self, now: Instant) -> u64 {
        match (self.state, self.last_resume_at) {
            (EngagementState::Active, Some(resumed)) => {
                now.saturating_duration_since(resumed).as_millis() as u64
            }
            _ => 0,
        }
    }
}

/// Whole seconds, rounded half-up.
pub fn rounded_seconds(total_ms: u64) -> u64 {
    total_ms.saturating_add(500) / 1000
}
