//! Batched publishing and notification state management.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use notihub_core::config::NotificationsConfig;
use notihub_core::result::AppResult;
use notihub_core::types::pagination::PaginatedData;
use notihub_database::{Mutation, NotificationQuery, NotificationRepository};
use notihub_entity::notification::{
    NewNotification, Notification, NotificationId, NotificationRecipient,
};

/// Buffers published notifications and flushes them to the repository
/// in batches.
///
/// A single mutex guards the buffer. `publish` appends in one critical
/// section and checks the batch limit in a second one, so concurrent
/// publishers may briefly push the buffer past the limit before one of
/// them flushes. The limit is a trigger, not a cap.
///
/// There is no background task: a flush runs on the caller that trips the
/// limit, or in [`NotificationService::shutdown`]. Call `shutdown` before
/// dropping the service; buffered notifications are lost otherwise.
#[derive(Debug)]
pub struct NotificationService {
    /// Notification repository.
    repo: Arc<dyn NotificationRepository>,
    /// Batch limit and content limits.
    config: NotificationsConfig,
    /// Notifications published but not yet written.
    pending: Mutex<Vec<Notification>>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(repo: Arc<dyn NotificationRepository>, config: NotificationsConfig) -> Self {
        Self {
            repo,
            config,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &NotificationsConfig {
        &self.config
    }

    /// Number of notifications waiting for the next flush.
    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    /// Builds a notification using this service's content limits.
    pub fn compose(&self, draft: NewNotification) -> AppResult<Notification> {
        Notification::new(draft, &self.config)
    }

    /// Buffers a notification and flushes if the buffer now holds more
    /// than `batch_limit` entries.
    ///
    /// A failed flush is returned to the caller and leaves every buffered
    /// notification, including this one, in place for the next attempt.
    pub async fn publish(&self, notification: Notification) -> AppResult<()> {
        {
            let mut pending = self.pending.lock().await;
            pending.push(notification);
            debug!(pending = pending.len(), "Notification buffered");
        }

        let mut pending = self.pending.lock().await;
        if pending.len() > self.config.batch_limit {
            self.save_batch(&mut pending).await?;
        }
        Ok(())
    }

    /// Composes and publishes a notification in one step.
    pub async fn publish_new(&self, draft: NewNotification) -> AppResult<()> {
        let notification = self.compose(draft)?;
        self.publish(notification).await
    }

    /// Flushes everything still buffered. Returns the number of
    /// notifications written.
    ///
    /// On failure the buffer is kept, so `shutdown` can be retried.
    pub async fn shutdown(&self) -> AppResult<u64> {
        let mut pending = self.pending.lock().await;
        let written = self.save_batch(&mut pending).await?;
        info!(written, "Notification service drained");
        Ok(written)
    }

    /// Writes the whole buffer as one bulk insert. Must be called with the
    /// buffer lock held; the buffer is cleared only after the insert
    /// succeeds.
    async fn save_batch(&self, pending: &mut Vec<Notification>) -> AppResult<u64> {
        if pending.is_empty() {
            return Ok(0);
        }

        let count = pending.len();
        match self.repo.add_range(pending.as_slice()).await {
            Ok(inserted) => {
                pending.clear();
                info!(count, inserted, "Flushed notification batch");
                Ok(inserted)
            }
            Err(e) => {
                warn!(count, error = %e, "Notification flush failed, batch retained");
                Err(e)
            }
        }
    }

    /// Archives a stored notification.
    pub async fn archive(&self, id: NotificationId) -> AppResult<Mutation> {
        self.repo.archive(id).await
    }

    /// Restores an archived notification and marks it read.
    pub async fn unarchive(&self, id: NotificationId) -> AppResult<Mutation> {
        self.repo.unarchive(id).await
    }

    /// Marks a stored notification as read.
    pub async fn mark_as_read(&self, id: NotificationId) -> AppResult<Mutation> {
        self.repo.mark_as_read(id).await
    }

    /// Marks a stored notification as unread.
    pub async fn mark_as_unread(&self, id: NotificationId) -> AppResult<Mutation> {
        self.repo.mark_as_unread(id).await
    }

    /// Gets a stored notification by id.
    pub async fn get_notification(&self, id: NotificationId) -> AppResult<Notification> {
        self.repo.get_notification(id).await
    }

    /// Lists stored notifications. Buffered notifications are not visible
    /// until flushed.
    pub async fn get_notifications(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedData<Notification>> {
        self.repo.get_notifications(query).await
    }

    /// Counts unread stored notifications for the given recipients.
    pub async fn get_notification_counter(
        &self,
        recipients: &[NotificationRecipient],
    ) -> AppResult<u64> {
        self.repo.not_read_notification_count(recipients).await
    }
}

impl Drop for NotificationService {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().len();
        if pending > 0 {
            warn!(
                pending,
                "Notification service dropped without shutdown; buffered notifications discarded"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use notihub_core::types::pagination::PageRequest;
    use notihub_database::MemoryNotificationRepository;

    fn draft(recipient_id: &str) -> NewNotification {
        NewNotification {
            entity_type: "ticket".to_string(),
            entity_id: "T-9".to_string(),
            recipient_type: "user".to_string(),
            recipient_id: recipient_id.to_string(),
            summary: "Ticket assigned".to_string(),
            ..NewNotification::default()
        }
    }

    #[tokio::test]
    async fn test_compose_uses_service_limits() {
        let config = NotificationsConfig {
            summary_limit: 6,
            ..NotificationsConfig::default()
        };
        let service = NotificationService::new(Arc::new(MemoryNotificationRepository::new()), config);
        let n = service.compose(draft("1")).unwrap();
        assert_eq!(n.content().summary, "Ticket");
    }

    #[tokio::test]
    async fn test_passthroughs_reach_repository() {
        let repo = Arc::new(MemoryNotificationRepository::new());
        let service = NotificationService::new(repo.clone(), NotificationsConfig::default());
        service.publish_new(draft("1")).await.unwrap();
        assert_eq!(repo.len().await, 1);

        let id = NotificationId(1);
        let recipients = [NotificationRecipient::new("user", "1")];
        assert_eq!(service.get_notification_counter(&recipients).await.unwrap(), 1);
        assert_eq!(service.mark_as_read(id).await.unwrap().affected(), 1);
        assert_eq!(service.mark_as_read(id).await.unwrap().affected(), -1);
        assert_eq!(service.get_notification_counter(&recipients).await.unwrap(), 0);
        assert_eq!(service.mark_as_unread(id).await.unwrap().affected(), 1);
        assert_eq!(service.archive(id).await.unwrap().affected(), 1);
        assert_eq!(service.unarchive(id).await.unwrap().affected(), 1);
        assert!(service.get_notification(id).await.unwrap().is_read());

        let page = service
            .get_notifications(&NotificationQuery::new(
                recipients.to_vec(),
                PageRequest::default(),
            ))
            .await
            .unwrap();
        assert_eq!(page.total_count, 1);
    }
}
