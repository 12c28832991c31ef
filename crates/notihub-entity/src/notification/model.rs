//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use notihub_core::config::NotificationsConfig;
use notihub_core::error::AppError;
use notihub_core::result::AppResult;

use super::action::NotificationAction;
use super::id::NotificationId;
use super::lifecycle::{Lifecycle, Transition};
use super::recipient::NotificationRecipient;
use super::status::NotificationStatus;

/// Maximum length of the entity type, in characters.
pub const MAX_ENTITY_TYPE_LENGTH: usize = 100;
/// Maximum length of the entity id, in characters.
pub const MAX_ENTITY_ID_LENGTH: usize = 100;
/// Maximum length of the recipient type, in characters.
pub const MAX_RECIPIENT_TYPE_LENGTH: usize = 100;
/// Maximum length of the recipient id, in characters.
pub const MAX_RECIPIENT_ID_LENGTH: usize = 100;

/// Input for [`Notification::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNotification {
    /// Long text shown to the recipient.
    pub description: String,
    /// Kind of domain object the notification refers to.
    pub entity_type: String,
    /// Identifier of that domain object. Required.
    pub entity_id: String,
    /// Kind of recipient.
    pub recipient_type: String,
    /// Recipient identifier.
    pub recipient_id: String,
    /// Short text, usually used as a title.
    pub summary: String,
    /// Optional application-defined category.
    pub category: Option<i32>,
    /// Actions offered to the recipient.
    pub actions: Vec<NotificationAction>,
}

/// Immutable content of a notification.
///
/// Length rules mirror the hard maxima; values are truncated before
/// validation runs, so only misconfigured limits or an oversize
/// `entity_id` can trip them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct NotificationContent {
    /// Long text shown to the recipient.
    #[validate(length(max = 2000))]
    pub description: String,
    /// Short text, usually used as a title.
    #[validate(length(max = 500))]
    pub summary: String,
    /// Kind of domain object the notification refers to.
    #[validate(length(max = 100))]
    pub entity_type: String,
    /// Identifier of that domain object.
    #[validate(length(min = 1, max = 100, message = "entity_id must be 1-100 characters"))]
    pub entity_id: String,
    /// Kind of recipient.
    #[validate(length(max = 100))]
    pub recipient_type: String,
    /// Recipient identifier.
    #[validate(length(max = 100))]
    pub recipient_id: String,
    /// Optional application-defined category.
    pub category: Option<i32>,
}

/// A notification addressed to one recipient.
///
/// Content is fixed at construction. Read and archive state change only
/// through the transition methods, each of which reports whether it
/// changed anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    id: NotificationId,
    #[serde(flatten)]
    content: NotificationContent,
    actions: Vec<NotificationAction>,
    #[serde(flatten)]
    lifecycle: Lifecycle,
    created_on: DateTime<Utc>,
}

impl Notification {
    /// Build a new, unpersisted notification.
    ///
    /// Description and summary are truncated to the configured limits;
    /// entity type, recipient type and recipient id to their fixed maxima.
    /// Fails with a validation error when `entity_id` is blank or longer
    /// than [`MAX_ENTITY_ID_LENGTH`], or when a configured limit exceeds
    /// the hard maximum of its field.
    pub fn new(draft: NewNotification, limits: &NotificationsConfig) -> AppResult<Self> {
        if draft.entity_id.trim().is_empty() {
            return Err(AppError::validation("entity_id is required"));
        }

        let content = NotificationContent {
            description: truncate_chars(draft.description, limits.description_limit),
            summary: truncate_chars(draft.summary, limits.summary_limit),
            entity_type: truncate_chars(draft.entity_type, MAX_ENTITY_TYPE_LENGTH),
            entity_id: draft.entity_id,
            recipient_type: truncate_chars(draft.recipient_type, MAX_RECIPIENT_TYPE_LENGTH),
            recipient_id: truncate_chars(draft.recipient_id, MAX_RECIPIENT_ID_LENGTH),
            category: draft.category,
        };
        content.validate()?;

        Ok(Self {
            id: NotificationId::UNSET,
            content,
            actions: draft.actions,
            lifecycle: Lifecycle::new(),
            created_on: Utc::now(),
        })
    }

    /// Rebuild a notification loaded from storage. No validation is run.
    pub fn from_storage(
        id: NotificationId,
        content: NotificationContent,
        actions: Vec<NotificationAction>,
        lifecycle: Lifecycle,
        created_on: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            actions,
            lifecycle,
            created_on,
        }
    }

    /// Store-assigned identifier, or [`NotificationId::UNSET`].
    pub fn id(&self) -> NotificationId {
        self.id
    }

    /// Record the identifier assigned by the persistence layer.
    pub fn assign_id(&mut self, id: NotificationId) {
        self.id = id;
    }

    /// The row a store creates when inserting this notification: the given
    /// id and a fresh lifecycle, unread and not archived. Content, actions
    /// and `created_on` are kept.
    pub fn into_stored(mut self, id: NotificationId) -> Self {
        self.id = id;
        self.lifecycle = Lifecycle::new();
        self
    }

    /// Whether the notification has been written to the store.
    pub fn is_persisted(&self) -> bool {
        self.id.is_set()
    }

    /// Content fields.
    pub fn content(&self) -> &NotificationContent {
        &self.content
    }

    /// Who should see this notification.
    pub fn recipient(&self) -> NotificationRecipient {
        NotificationRecipient::new(
            self.content.recipient_type.clone(),
            self.content.recipient_id.clone(),
        )
    }

    /// Actions in the order they were added.
    pub fn actions(&self) -> &[NotificationAction] {
        &self.actions
    }

    /// Append an action. Duplicates are allowed.
    pub fn add_action(&mut self, action: NotificationAction) {
        self.actions.push(action);
    }

    /// Read status and archive state.
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    /// Current read status.
    pub fn status(&self) -> NotificationStatus {
        self.lifecycle.status()
    }

    /// Whether the recipient has read it.
    pub fn is_read(&self) -> bool {
        self.status() == NotificationStatus::Read
    }

    /// Whether the recipient has not read it yet.
    pub fn is_unread(&self) -> bool {
        self.status() == NotificationStatus::Unread
    }

    /// Whether it has been moved to the archive.
    pub fn is_archived(&self) -> bool {
        self.lifecycle.is_archived()
    }

    /// When the notification was archived, if it is.
    pub fn archived_on(&self) -> Option<DateTime<Utc>> {
        self.lifecycle.archived_on()
    }

    /// When the notification was constructed.
    pub fn created_on(&self) -> DateTime<Utc> {
        self.created_on
    }

    /// Apply a transition. Returns `false` if it did not apply.
    pub fn apply(&mut self, transition: Transition) -> bool {
        let (next, changed) = self.lifecycle.apply(transition, Utc::now());
        self.lifecycle = next;
        changed
    }

    /// Archive. Returns `false` if already archived.
    pub fn archive(&mut self) -> bool {
        self.apply(Transition::Archive)
    }

    /// Leave the archive and mark as read. Returns `false` if not archived.
    pub fn unarchive(&mut self) -> bool {
        self.apply(Transition::UnArchive)
    }

    /// Returns `false` if already read.
    pub fn mark_as_read(&mut self) -> bool {
        self.apply(Transition::MarkAsRead)
    }

    /// Returns `false` if already unread.
    pub fn mark_as_unread(&mut self) -> bool {
        self.apply(Transition::MarkAsUnread)
    }

    /// Copy every field except the id into `other`.
    ///
    /// Both sides must describe the same stored notification; mismatched
    /// ids fail with a conflict error and leave `other` untouched.
    pub fn copy_to(&self, other: &mut Notification) -> AppResult<()> {
        if self.id != other.id {
            return Err(AppError::conflict(format!(
                "Notification ids do not match: {} vs {}",
                self.id, other.id
            )));
        }

        other.content = self.content.clone();
        other.actions = self.actions.clone();
        other.lifecycle = self.lifecycle;
        other.created_on = self.created_on;
        Ok(())
    }
}

/// Cut `value` down to at most `limit` characters.
fn truncate_chars(mut value: String, limit: usize) -> String {
    if let Some((byte_idx, _)) = value.char_indices().nth(limit) {
        value.truncate(byte_idx);
    }
    value
}
