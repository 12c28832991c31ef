//! Notification batching and content limit configuration.

use serde::{Deserialize, Serialize};

/// Hard maximum length of a notification description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
/// Hard maximum length of a notification summary, in characters.
pub const MAX_SUMMARY_LENGTH: usize = 500;

/// Settings consumed by the batching publisher and by notification
/// construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Flush once the buffer holds more than this many notifications.
    /// `0` flushes on every publish.
    #[serde(default)]
    pub batch_limit: usize,
    /// Descriptions are truncated to this many characters.
    #[serde(default = "default_description_limit")]
    pub description_limit: usize,
    /// Summaries are truncated to this many characters.
    #[serde(default = "default_summary_limit")]
    pub summary_limit: usize,
}

impl NotificationsConfig {
    /// Return a copy with a different batch limit.
    pub fn with_batch_limit(mut self, batch_limit: usize) -> Self {
        self.batch_limit = batch_limit;
        self
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            batch_limit: 0,
            description_limit: default_description_limit(),
            summary_limit: default_summary_limit(),
        }
    }
}

fn default_description_limit() -> usize {
    MAX_DESCRIPTION_LENGTH
}

fn default_summary_limit() -> usize {
    MAX_SUMMARY_LENGTH
}
