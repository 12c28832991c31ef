//! Read/archive state machine.
//!
//! [`Lifecycle`] is the only mutable part of a notification. Every change
//! goes through [`Lifecycle::apply`], which returns the next state and
//! whether anything changed. A transition that does not apply to the
//! current state is a no-op, never an error.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::NotificationStatus;

/// A requested state change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Move into the archive and stamp the time.
    Archive,
    /// Leave the archive. Always leaves the notification read.
    UnArchive,
    /// Mark as seen.
    MarkAsRead,
    /// Mark as not seen.
    MarkAsUnread,
}

impl Transition {
    /// Return the transition as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Archive => "archive",
            Self::UnArchive => "unarchive",
            Self::MarkAsRead => "mark_as_read",
            Self::MarkAsUnread => "mark_as_unread",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Read status and archive state of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lifecycle {
    status: NotificationStatus,
    archived: bool,
    archived_on: Option<DateTime<Utc>>,
}

impl Lifecycle {
    /// State of a freshly created notification: unread, not archived.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a state loaded from storage.
    pub fn restore(
        status: NotificationStatus,
        archived: bool,
        archived_on: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            status,
            archived,
            archived_on,
        }
    }

    /// Current read status.
    pub fn status(&self) -> NotificationStatus {
        self.status
    }

    /// Whether the notification sits in the archive.
    pub fn is_archived(&self) -> bool {
        self.archived
    }

    /// When the notification was archived, if it is.
    pub fn archived_on(&self) -> Option<DateTime<Utc>> {
        self.archived_on
    }

    /// Compute the state after `transition`.
    ///
    /// Returns the next state and `true` if it differs from `self`.
    pub fn apply(self, transition: Transition, now: DateTime<Utc>) -> (Self, bool) {
        match transition {
            Transition::Archive if !self.archived => (
                Self {
                    archived: true,
                    archived_on: Some(now),
                    ..self
                },
                true,
            ),
            Transition::UnArchive if self.archived => (
                Self {
                    status: NotificationStatus::Read,
                    archived: false,
                    archived_on: None,
                },
                true,
            ),
            Transition::MarkAsRead if self.status != NotificationStatus::Read => (
                Self {
                    status: NotificationStatus::Read,
                    ..self
                },
                true,
            ),
            Transition::MarkAsUnread if self.status != NotificationStatus::Unread => (
                Self {
                    status: NotificationStatus::Unread,
                    ..self
                },
                true,
            ),
            _ => (self, false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_stamps_time_once() {
        let first = Utc::now();
        let (archived, changed) = Lifecycle::new().apply(Transition::Archive, first);
        assert!(changed);
        assert!(archived.is_archived());
        assert_eq!(archived.archived_on(), Some(first));

        let later = first + chrono::Duration::seconds(30);
        let (again, changed) = archived.apply(Transition::Archive, later);
        assert!(!changed);
        assert_eq!(again.archived_on(), Some(first));
    }

    #[test]
    fn test_unarchive_forces_read() {
        let now = Utc::now();
        let state = Lifecycle::restore(NotificationStatus::Unread, true, Some(now));
        let (next, changed) = state.apply(Transition::UnArchive, now);
        assert!(changed);
        assert_eq!(next.status(), NotificationStatus::Read);
        assert!(!next.is_archived());
        assert_eq!(next.archived_on(), None);
    }

    #[test]
    fn test_unarchive_when_not_archived_is_noop() {
        let state = Lifecycle::new();
        let (next, changed) = state.apply(Transition::UnArchive, Utc::now());
        assert!(!changed);
        assert_eq!(next, state);
        assert_eq!(next.status(), NotificationStatus::Unread);
    }

    #[test]
    fn test_status_transitions_keep_archive_state() {
        let now = Utc::now();
        let state = Lifecycle::restore(NotificationStatus::Unread, true, Some(now));
        let (read, changed) = state.apply(Transition::MarkAsRead, now);
        assert!(changed);
        assert!(read.is_archived());
        assert_eq!(read.archived_on(), Some(now));

        let (unread, changed) = read.apply(Transition::MarkAsUnread, now);
        assert!(changed);
        assert_eq!(unread.status(), NotificationStatus::Unread);
        let (_, changed) = unread.apply(Transition::MarkAsUnread, now);
        assert!(!changed);
    }
}
