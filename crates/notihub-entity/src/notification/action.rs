//! Actions attached to a notification.

use serde::{Deserialize, Serialize};

/// Something the recipient can do from a notification, e.g. "Open" a
/// document. The core treats it as an opaque payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Button or link text.
    pub label: String,
    /// Where the action leads (URL, route, command).
    pub target: String,
}

impl NotificationAction {
    /// Create a new action.
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}
