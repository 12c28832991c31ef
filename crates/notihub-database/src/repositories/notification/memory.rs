//! In-memory notification store using a Tokio mutex.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use notihub_core::error::AppError;
use notihub_core::result::AppResult;
use notihub_core::types::pagination::PaginatedData;
use notihub_entity::notification::{
    Notification, NotificationId, NotificationRecipient, Transition,
};

use super::{Mutation, NotificationQuery, NotificationRepository, belongs_to};

#[derive(Debug, Default)]
struct InnerState {
    /// Last identifier handed out.
    last_id: i64,
    rows: BTreeMap<NotificationId, Notification>,
}

/// In-memory notification repository.
///
/// Every operation runs inside one critical section, so bulk inserts are
/// all-or-nothing and transitions cannot interleave. Suitable for tests
/// and single-process use; contents are lost when the process exits.
#[derive(Debug, Clone, Default)]
pub struct MemoryNotificationRepository {
    state: Arc<Mutex<InnerState>>,
}

impl MemoryNotificationRepository {
    /// Creates an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored notifications.
    pub async fn len(&self) -> usize {
        self.state.lock().await.rows.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// All stored notifications in insertion order.
    pub async fn snapshot(&self) -> Vec<Notification> {
        self.state.lock().await.rows.values().cloned().collect()
    }
}

#[async_trait]
impl NotificationRepository for MemoryNotificationRepository {
    async fn get_notification(&self, id: NotificationId) -> AppResult<Notification> {
        let state = self.state.lock().await;
        state
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    async fn add_range(&self, notifications: &[Notification]) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        for notification in notifications {
            state.last_id += 1;
            let id = NotificationId(state.last_id);
            state.rows.insert(id, notification.clone().into_stored(id));
        }
        debug!(count = notifications.len(), last_id = state.last_id, "Stored notifications");
        Ok(notifications.len() as u64)
    }

    async fn save(&self, notification: &Notification) -> AppResult<u64> {
        let mut state = self.state.lock().await;
        let stored = state.rows.get_mut(&notification.id()).ok_or_else(|| {
            AppError::not_found(format!("Notification {} not found", notification.id()))
        })?;
        notification.copy_to(stored)?;
        Ok(1)
    }

    async fn transition(
        &self,
        id: NotificationId,
        transition: Transition,
    ) -> AppResult<Mutation> {
        let mut state = self.state.lock().await;
        let stored = state
            .rows
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

        if stored.apply(transition) {
            debug!(%id, %transition, "Notification transition applied");
            Ok(Mutation::Applied { rows: 1 })
        } else {
            Ok(Mutation::Unchanged)
        }
    }

    async fn get_notifications(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedData<Notification>> {
        let state = self.state.lock().await;
        let matching: Vec<&Notification> = state
            .rows
            .values()
            .rev()
            .filter(|n| query.matches(n))
            .collect();

        let total = matching.len() as u64;
        let offset = usize::try_from(query.page.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.page.limit()).unwrap_or(usize::MAX);
        let results = matching
            .into_iter()
            .skip(offset)
            .take(limit)
            .cloned()
            .collect();

        Ok(PaginatedData::new(results, total))
    }

    async fn not_read_notification_count(
        &self,
        recipients: &[NotificationRecipient],
    ) -> AppResult<u64> {
        let state = self.state.lock().await;
        let count = state
            .rows
            .values()
            .filter(|n| n.is_unread() && belongs_to(n, recipients))
            .count();
        Ok(count as u64)
    }
}
