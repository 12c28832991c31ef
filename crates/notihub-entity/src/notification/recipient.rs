//! Recipient filter value.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifies who should see a notification, e.g. `("user", "42")` or
/// `("role", "admin")`. Used purely as a query filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NotificationRecipient {
    /// Kind of recipient.
    pub recipient_type: String,
    /// Identifier within that kind.
    pub recipient_id: String,
}

impl NotificationRecipient {
    /// Create a new recipient.
    pub fn new(recipient_type: impl Into<String>, recipient_id: impl Into<String>) -> Self {
        Self {
            recipient_type: recipient_type.into(),
            recipient_id: recipient_id.into(),
        }
    }

    /// Whether a notification addressed to `(recipient_type, recipient_id)`
    /// belongs to this recipient.
    pub fn matches(&self, recipient_type: &str, recipient_id: &str) -> bool {
        self.recipient_type == recipient_type && self.recipient_id == recipient_id
    }
}

impl fmt::Display for NotificationRecipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.recipient_type, self.recipient_id)
    }
}
