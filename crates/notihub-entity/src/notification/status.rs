//! Notification read status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Whether the recipient has seen a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationStatus {
    /// Not seen yet.
    #[default]
    Unread,
    /// Seen.
    Read,
}

impl NotificationStatus {
    /// Return the status as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Read => "read",
        }
    }
}

impl fmt::Display for NotificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationStatus {
    type Err = notihub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "unread" => Ok(Self::Unread),
            "read" => Ok(Self::Read),
            _ => Err(notihub_core::AppError::validation(format!(
                "Invalid notification status: '{s}'. Expected one of: unread, read"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("read".parse::<NotificationStatus>().unwrap(), NotificationStatus::Read);
        assert_eq!("UNREAD".parse::<NotificationStatus>().unwrap(), NotificationStatus::Unread);
        assert!("seen".parse::<NotificationStatus>().is_err());
    }
}
