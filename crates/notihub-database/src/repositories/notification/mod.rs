//! Notification repository contract.
//!
//! The batching service depends only on [`NotificationRepository`]; any
//! store that honours it is substitutable. Two implementations live here:
//! [`MemoryNotificationRepository`] and [`PgNotificationRepository`].

mod memory;
mod postgres;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use notihub_core::result::AppResult;
use notihub_core::types::pagination::{PageRequest, PaginatedData};
use notihub_entity::notification::{
    Notification, NotificationId, NotificationRecipient, Transition,
};

pub use memory::MemoryNotificationRepository;
pub use postgres::PgNotificationRepository;

/// Outcome of a status or archive mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Mutation {
    /// The transition did not apply; nothing was written.
    Unchanged,
    /// The transition applied and `rows` rows were persisted.
    Applied { rows: u64 },
}

impl Mutation {
    /// Sentinel reported by [`Mutation::affected`] for a no-op.
    pub const NO_OP: i64 = -1;

    /// Affected row count, or `-1` when nothing changed.
    pub fn affected(&self) -> i64 {
        match self {
            Self::Unchanged => Self::NO_OP,
            Self::Applied { rows } => i64::try_from(*rows).unwrap_or(i64::MAX),
        }
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.affected())
    }
}

/// Filter for listing notifications.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationQuery {
    /// Only notifications addressed to one of these recipients match.
    /// An empty list matches nothing.
    pub recipients: Vec<NotificationRecipient>,
    /// Which page to return.
    #[serde(default)]
    pub page: PageRequest,
    /// Include archived notifications.
    #[serde(default)]
    pub show_archived: bool,
    /// Case-insensitive substring matched against summary or description.
    /// Ignored when empty.
    #[serde(default)]
    pub title: String,
}

impl NotificationQuery {
    /// Query the first page for `recipients`, excluding archived ones.
    pub fn new(recipients: Vec<NotificationRecipient>, page: PageRequest) -> Self {
        Self {
            recipients,
            page,
            show_archived: false,
            title: String::new(),
        }
    }

    /// Include or exclude archived notifications.
    pub fn with_archived(mut self, show_archived: bool) -> Self {
        self.show_archived = show_archived;
        self
    }

    /// Filter by a title fragment.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Whether `notification` satisfies every filter of this query.
    pub fn matches(&self, notification: &Notification) -> bool {
        if !belongs_to(notification, &self.recipients) {
            return false;
        }
        if !self.show_archived && notification.is_archived() {
            return false;
        }
        if self.title.is_empty() {
            return true;
        }
        let needle = self.title.to_lowercase();
        let content = notification.content();
        content.summary.to_lowercase().contains(&needle)
            || content.description.to_lowercase().contains(&needle)
    }
}

/// Whether `notification` is addressed to any of `recipients`.
pub fn belongs_to(notification: &Notification, recipients: &[NotificationRecipient]) -> bool {
    let content = notification.content();
    recipients
        .iter()
        .any(|r| r.matches(&content.recipient_type, &content.recipient_id))
}

/// Persistence operations the notification core depends on.
#[async_trait]
pub trait NotificationRepository: Send + Sync + fmt::Debug + 'static {
    /// Fetch a notification. Fails with a not-found error if absent.
    async fn get_notification(&self, id: NotificationId) -> AppResult<Notification>;

    /// Insert all notifications as one all-or-nothing operation.
    ///
    /// Incoming ids are ignored; the store assigns new ones. Every row is
    /// stored unread and not archived, whatever state the caller's copy
    /// is in. Returns the number of inserted rows.
    async fn add_range(&self, notifications: &[Notification]) -> AppResult<u64>;

    /// Overwrite an already stored notification with every field
    /// [`Notification::copy_to`] carries: content, actions, read/archive
    /// state and `created_on`. Fails with a not-found error if the id is
    /// unknown.
    async fn save(&self, notification: &Notification) -> AppResult<u64>;

    /// Fetch, apply `transition`, and persist if it changed anything.
    async fn transition(
        &self,
        id: NotificationId,
        transition: Transition,
    ) -> AppResult<Mutation> {
        let mut notification = self.get_notification(id).await?;
        if !notification.apply(transition) {
            return Ok(Mutation::Unchanged);
        }
        let rows = self.save(&notification).await?;
        Ok(Mutation::Applied { rows })
    }

    async fn archive(&self, id: NotificationId) -> AppResult<Mutation> {
        self.transition(id, Transition::Archive).await
    }

    async fn unarchive(&self, id: NotificationId) -> AppResult<Mutation> {
        self.transition(id, Transition::UnArchive).await
    }

    async fn mark_as_read(&self, id: NotificationId) -> AppResult<Mutation> {
        self.transition(id, Transition::MarkAsRead).await
    }

    async fn mark_as_unread(&self, id: NotificationId) -> AppResult<Mutation> {
        self.transition(id, Transition::MarkAsUnread).await
    }

    /// List matching notifications, newest id first.
    async fn get_notifications(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedData<Notification>>;

    /// Count unread notifications addressed to any of `recipients`.
    async fn not_read_notification_count(
        &self,
        recipients: &[NotificationRecipient],
    ) -> AppResult<u64>;
}
