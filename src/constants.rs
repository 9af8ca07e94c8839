//! # System Constants
//!
//! Lifecycle state and status tokens for task records, plus the default
//! messages the lifecycle manager stamps on records it touches.
//!
//! The tokens are stored as strings in the database for compatibility with the
//! platform's other consumers of the `task_records` table; the closed enums
//! here are the only way this crate produces them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Message given to freshly created records.
pub const DEFAULT_MESSAGE: &str = "Initialized";

/// Requester identity used when the caller does not supply one.
pub const DEFAULT_USERID: &str = "system";

pub const MESSAGE_TASK_COMPLETED_SUCCESSFULLY: &str = "Task completed successfully";
pub const MESSAGE_TASK_COMPLETED_UNSUCCESSFULLY: &str = "Task did not complete successfully";

/// Coarse lifecycle phase of a task record.
///
/// Transitions are monotonic through Initialized → Queued → Active → Finished.
/// The public API never moves a record out of Finished; nothing enforces this
/// at the storage layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    /// Initial state when the record is created
    Initialized,
    /// Submitted to the queue subsystem, not yet picked up
    Queued,
    /// A worker is operating on the task
    Active,
    /// Terminal state; `TaskStatus` is authoritative from here on
    Finished,
}

impl TaskState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Initialized => "Initialized",
            Self::Queued => "Queued",
            Self::Active => "Active",
            Self::Finished => "Finished",
        }
    }

    /// Check if this is the terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Initialized" => Ok(Self::Initialized),
            "Queued" => Ok(Self::Queued),
            "Active" => Ok(Self::Active),
            "Finished" => Ok(Self::Finished),
            _ => Err(format!("Invalid task state: {s}")),
        }
    }
}

/// Outcome classification of a task record.
///
/// Meaningful mainly once the record reaches `TaskState::Finished`. `Expired`
/// is accepted at the API boundary but never persisted — it normalizes to
/// `Error` on every write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskStatus {
    Ok,
    Warn,
    Error,
    Timeout,
    Expired,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "Ok",
            Self::Warn => "Warn",
            Self::Error => "Error",
            Self::Timeout => "Timeout",
            Self::Expired => "Expired",
        }
    }

    /// Collapse `Expired` into `Error`; identity for every other status.
    pub fn normalized(&self) -> TaskStatus {
        match self {
            Self::Expired => Self::Error,
            other => *other,
        }
    }

    /// Case-insensitive comparison against a wire token.
    pub fn matches(&self, token: &str) -> bool {
        self.as_str().eq_ignore_ascii_case(token)
    }

    /// Parse a wire token case-insensitively.
    ///
    /// Queue workers report completion with free-form casing ("ok", "Error").
    /// Unrecognized tokens classify as `Error` — the closed-enum rendering of
    /// accepting whatever the worker sent.
    pub fn parse_token(token: &str) -> TaskStatus {
        [Self::Ok, Self::Warn, Self::Error, Self::Timeout, Self::Expired]
            .into_iter()
            .find(|status| status.matches(token))
            .unwrap_or(Self::Error)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Ok" => Ok(Self::Ok),
            "Warn" => Ok(Self::Warn),
            "Error" => Ok(Self::Error),
            "Timeout" => Ok(Self::Timeout),
            "Expired" => Ok(Self::Expired),
            _ => Err(format!("Invalid task status: {s}")),
        }
    }
}

/// Map a state-or-status token to its display string.
///
/// Covers the seven tokens a record can legitimately surface; anything else
/// resolves to "Unknown" rather than an error.
pub fn human_status(state_or_status: &str) -> &'static str {
    match state_or_status {
        "Initialized" => "Initialized",
        "Queued" => "Queued",
        "Active" => "Running",
        // Finished records surface their status token:
        "Ok" => "Complete",
        "Warn" => "Finished with Warnings",
        "Error" => "Error",
        "Timeout" => "Timed Out",
        _ => "Unknown",
    }
}

/// State groupings for scope predicates and activity checks
pub mod state_groups {
    use super::TaskState;

    /// States in which a record is not considered active: it is either parked
    /// on the queue or already terminal.
    pub const INACTIVE_STATES: &[TaskState] = &[TaskState::Queued, TaskState::Finished];
}
