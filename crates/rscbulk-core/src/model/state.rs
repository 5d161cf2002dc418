// ── Enrollment task state ──
//
// The lifecycle of one device's cloud enrollment. `InProgress` carries the
// monitor handle, so "running without a handle" cannot be represented.

use std::fmt;

use serde::Serialize;
use strum::Display;

/// Opaque reference to a running enrollment task, used to poll and cancel it.
///
/// Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MonitorHandle(String);

impl MonitorHandle {
    /// Wrap a monitor location. Returns `None` for an empty (or blank) value.
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        if location.trim().is_empty() {
            None
        } else {
            Some(Self(location))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MonitorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Enrollment lifecycle of one device.
///
/// ```text
/// NotStarted --(enroll)--> InProgress --(poll: success)--> Success
///                                    \--(poll: failure)--> Error
///                                    \--(operator)-------> Cancelled
/// NotStarted --(already bound)--> AlreadyEnrolled
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Display)]
pub enum TaskState {
    #[default]
    #[strum(to_string = "NOT STARTED")]
    NotStarted,
    #[strum(to_string = "ALREADY ENROLLED")]
    AlreadyEnrolled,
    #[strum(to_string = "IN PROGRESS")]
    InProgress(MonitorHandle),
    #[strum(to_string = "ENROLLED")]
    Success,
    #[strum(to_string = "ERROR")]
    Error,
    #[strum(to_string = "CANCELLED")]
    Cancelled,
}

/// Serialized as its report label.
impl Serialize for TaskState {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl TaskState {
    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::AlreadyEnrolled | Self::Success | Self::Error | Self::Cancelled
        )
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::InProgress(_))
    }

    pub fn monitor_handle(&self) -> Option<&MonitorHandle> {
        match self {
            Self::InProgress(handle) => Some(handle),
            _ => None,
        }
    }

    /// Whether `next` is a legal successor of this state.
    pub fn can_advance_to(&self, next: &Self) -> bool {
        match (self, next) {
            (Self::NotStarted, Self::InProgress(_) | Self::AlreadyEnrolled)
            | (Self::InProgress(_), Self::Success | Self::Error | Self::Cancelled) => true,
            _ => false,
        }
    }

    /// Move to `next` if the transition is legal. Returns whether the state
    /// changed; terminal states refuse every transition.
    pub fn advance(&mut self, next: Self) -> bool {
        if self.can_advance_to(&next) {
            *self = next;
            true
        } else {
            false
        }
    }
}

/// Status reported by a device for its enrollment task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum BindStatus {
    #[strum(to_string = "in progress")]
    InProgress,
    #[strum(to_string = "success")]
    Success,
    #[strum(to_string = "error")]
    Error,
}

impl BindStatus {
    /// The terminal state a poll result leads to, if any.
    pub fn terminal_state(self) -> Option<TaskState> {
        match self {
            Self::InProgress => None,
            Self::Success => Some(TaskState::Success),
            Self::Error => Some(TaskState::Error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running() -> TaskState {
        TaskState::InProgress(MonitorHandle::new("/api/v1/tasks/1").expect("non-empty handle"))
    }

    #[test]
    fn empty_handle_is_rejected() {
        assert!(MonitorHandle::new("").is_none());
        assert!(MonitorHandle::new("   ").is_none());
        assert_eq!(
            MonitorHandle::new("/t/1").map(|h| h.as_str().to_owned()),
            Some("/t/1".to_owned())
        );
    }

    #[test]
    fn lifecycle_transitions() {
        let mut state = TaskState::NotStarted;
        assert!(state.advance(running()));
        assert!(state.is_in_progress());
        assert!(state.advance(TaskState::Success));
        assert!(state.is_terminal());
    }

    #[test]
    fn terminal_states_never_change() {
        let poll_results = [
            BindStatus::InProgress,
            BindStatus::Error,
            BindStatus::Success,
            BindStatus::Error,
        ];
        for terminal in [
            TaskState::Success,
            TaskState::Error,
            TaskState::Cancelled,
            TaskState::AlreadyEnrolled,
        ] {
            let mut state = terminal.clone();
            for status in poll_results {
                if let Some(next) = status.terminal_state() {
                    assert!(!state.advance(next));
                }
                assert!(!state.advance(TaskState::Cancelled));
                assert!(!state.advance(running()));
                assert_eq!(state, terminal);
            }
        }
    }

    #[test]
    fn cancel_only_from_in_progress() {
        let mut state = TaskState::NotStarted;
        assert!(!state.advance(TaskState::Cancelled));
        assert!(!state.advance(TaskState::Success));
        assert_eq!(state, TaskState::NotStarted);
    }

    #[test]
    fn labels() {
        assert_eq!(running().to_string(), "IN PROGRESS");
        assert_eq!(TaskState::Success.to_string(), "ENROLLED");
        assert_eq!(TaskState::AlreadyEnrolled.to_string(), "ALREADY ENROLLED");
        assert_eq!(TaskState::Cancelled.to_string(), "CANCELLED");
    }
}
