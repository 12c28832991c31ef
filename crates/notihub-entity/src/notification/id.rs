//! Notification identifier.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Store-assigned notification identifier.
///
/// Notifications that have not been persisted yet carry
/// [`NotificationId::UNSET`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NotificationId(pub i64);

impl NotificationId {
    /// Identifier of a notification that has not been persisted.
    pub const UNSET: Self = Self(0);

    /// Return the inner value.
    pub fn get(self) -> i64 {
        self.0
    }

    /// Whether the persistence layer has assigned this identifier.
    pub fn is_set(self) -> bool {
        self != Self::UNSET
    }
}

impl fmt::Display for NotificationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for NotificationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(Self)
    }
}

impl From<i64> for NotificationId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl From<NotificationId> for i64 {
    fn from(id: NotificationId) -> i64 {
        id.0
    }
}
