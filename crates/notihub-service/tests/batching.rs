//! Flush behaviour of the batching notification service.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use notihub_core::config::NotificationsConfig;
use notihub_core::error::{AppError, ErrorKind};
use notihub_core::result::AppResult;
use notihub_core::types::pagination::PaginatedData;
use notihub_database::{
    MemoryNotificationRepository, NotificationQuery, NotificationRepository,
};
use notihub_entity::notification::{
    NewNotification, Notification, NotificationId, NotificationRecipient,
};
use notihub_service::NotificationService;

/// Memory repository that records every bulk insert and can be told to
/// fail them.
#[derive(Debug, Default)]
struct RecordingRepository {
    inner: MemoryNotificationRepository,
    batches: Mutex<Vec<Vec<String>>>,
    fail: AtomicBool,
}

impl RecordingRepository {
    fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Summaries of each batch passed to `add_range`, in call order.
    async fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().await.clone()
    }
}

#[async_trait]
impl NotificationRepository for RecordingRepository {
    async fn get_notification(&self, id: NotificationId) -> AppResult<Notification> {
        self.inner.get_notification(id).await
    }

    async fn add_range(&self, notifications: &[Notification]) -> AppResult<u64> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::new(ErrorKind::Storage, "database unavailable"));
        }
        self.batches.lock().await.push(
            notifications
                .iter()
                .map(|n| n.content().summary.clone())
                .collect(),
        );
        self.inner.add_range(notifications).await
    }

    async fn save(&self, notification: &Notification) -> AppResult<u64> {
        self.inner.save(notification).await
    }

    async fn get_notifications(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedData<Notification>> {
        self.inner.get_notifications(query).await
    }

    async fn not_read_notification_count(
        &self,
        recipients: &[NotificationRecipient],
    ) -> AppResult<u64> {
        self.inner.not_read_notification_count(recipients).await
    }
}

fn draft(summary: &str) -> NewNotification {
    NewNotification {
        entity_type: "order".to_string(),
        entity_id: "A-1".to_string(),
        recipient_type: "user".to_string(),
        recipient_id: "alice".to_string(),
        summary: summary.to_string(),
        ..NewNotification::default()
    }
}

fn service(batch_limit: usize) -> (Arc<RecordingRepository>, NotificationService) {
    let repo = Arc::new(RecordingRepository::default());
    let config = NotificationsConfig::default().with_batch_limit(batch_limit);
    let service = NotificationService::new(repo.clone(), config);
    (repo, service)
}

#[tokio::test]
async fn test_flushes_once_limit_is_exceeded() {
    let (repo, service) = service(2);

    service.publish_new(draft("n1")).await.unwrap();
    service.publish_new(draft("n2")).await.unwrap();
    assert!(repo.batches().await.is_empty());
    assert_eq!(service.pending_count().await, 2);

    service.publish_new(draft("n3")).await.unwrap();
    assert_eq!(repo.batches().await, vec![vec!["n1", "n2", "n3"]]);
    assert_eq!(service.pending_count().await, 0);
    assert_eq!(repo.inner.len().await, 3);
}

#[tokio::test]
async fn test_zero_limit_flushes_every_publish() {
    let (repo, service) = service(0);

    service.publish_new(draft("n1")).await.unwrap();
    service.publish_new(draft("n2")).await.unwrap();

    assert_eq!(repo.batches().await, vec![vec!["n1"], vec!["n2"]]);
    assert_eq!(service.pending_count().await, 0);
}

#[tokio::test]
async fn test_shutdown_flushes_remainder_in_one_call() {
    let (repo, service) = service(10);

    service.publish_new(draft("n1")).await.unwrap();
    service.publish_new(draft("n2")).await.unwrap();
    assert!(repo.batches().await.is_empty());

    assert_eq!(service.shutdown().await.unwrap(), 2);
    assert_eq!(repo.batches().await, vec![vec!["n1", "n2"]]);
    assert_eq!(service.pending_count().await, 0);

    // Nothing left to write.
    assert_eq!(service.shutdown().await.unwrap(), 0);
    assert_eq!(repo.batches().await.len(), 1);
}

#[tokio::test]
async fn test_failed_flush_retains_buffer() {
    let (repo, service) = service(1);
    repo.set_failing(true);

    service.publish_new(draft("n1")).await.unwrap();
    let err = service.publish_new(draft("n2")).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    assert_eq!(service.pending_count().await, 2);

    let err = service.shutdown().await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Storage);
    assert_eq!(service.pending_count().await, 2);

    repo.set_failing(false);
    assert_eq!(service.shutdown().await.unwrap(), 2);
    assert_eq!(repo.batches().await, vec![vec!["n1", "n2"]]);
    assert_eq!(repo.inner.len().await, 2);
}

#[tokio::test]
async fn test_invalid_draft_is_not_buffered() {
    let (repo, service) = service(0);

    let err = service
        .publish_new(NewNotification {
            entity_id: "   ".to_string(),
            ..draft("n1")
        })
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::Validation);
    assert_eq!(service.pending_count().await, 0);
    assert!(repo.batches().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_publishers_persist_everything_once() {
    const PUBLISHERS: usize = 50;
    let (repo, service) = service(7);
    let service = Arc::new(service);

    let mut handles = Vec::with_capacity(PUBLISHERS);
    for i in 0..PUBLISHERS {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.publish_new(draft(&format!("n{i}"))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    service.shutdown().await.unwrap();

    let mut written: Vec<String> = repo.batches().await.into_iter().flatten().collect();
    written.sort();
    let mut expected: Vec<String> = (0..PUBLISHERS).map(|i| format!("n{i}")).collect();
    expected.sort();
    assert_eq!(written, expected);
    assert_eq!(repo.inner.len().await, PUBLISHERS);
}

#[tokio::test]
async fn test_buffered_notifications_are_not_listed_until_flushed() {
    let (_repo, service) = service(5);
    service.publish_new(draft("n1")).await.unwrap();

    let recipients = vec![NotificationRecipient::new("user", "alice")];
    let query = NotificationQuery::new(recipients.clone(), Default::default());
    assert_eq!(service.get_notifications(&query).await.unwrap().total_count, 0);
    assert_eq!(service.get_notification_counter(&recipients).await.unwrap(), 0);

    service.shutdown().await.unwrap();
    assert_eq!(service.get_notifications(&query).await.unwrap().total_count, 1);
    assert_eq!(service.get_notification_counter(&recipients).await.unwrap(), 1);
}
