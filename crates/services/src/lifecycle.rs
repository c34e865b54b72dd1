use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Human-facing session status. Advisory only: derived on read, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionStatus {
    Completed,
    Active,
    /// The clock says the session is running but nobody pressed start.
    ShouldBeActive,
    Upcoming,
    Missed,
}

impl SessionStatus {
    pub fn label(&self) -> &'static str {
        match self {
            SessionStatus::Completed => "Completed",
            SessionStatus::Active => "Live Now",
            SessionStatus::ShouldBeActive => "Should be active",
            SessionStatus::Upcoming => "Upcoming",
            SessionStatus::Missed => "Missed",
        }
    }

    /// Whether an operator should act on the session (start it, or close it out).
    pub fn needs_attention(&self) -> bool {
        matches!(self, SessionStatus::ShouldBeActive | SessionStatus::Missed)
    }
}

/// Status from the two stored flags and the schedule window `[start, end)`.
///
/// Priority is fixed: `completed` beats `is_active`, which beats the clock.
pub fn derive_status(
    completed: bool,
    is_active: bool,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> SessionStatus {
    if completed {
        SessionStatus::Completed
    } else if is_active {
        SessionStatus::Active
    } else if now >= start && now < end {
        SessionStatus::ShouldBeActive
    } else if now < start {
        SessionStatus::Upcoming
    } else {
        SessionStatus::Missed
    }
}

/// What the wall clock alone says about a session. Display state, never written back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClockState {
    pub is_active: bool,
    pub completed: bool,
}

impl ClockState {
    pub fn at(start: DateTime<Utc>, end: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        Self {
            is_active: now >= start && now < end,
            completed: now >= end,
        }
    }
}

/// Whole seconds left until `end`, never negative.
pub fn time_remaining(end: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (end - now).num_seconds().max(0)
}
