//! PostgreSQL notification repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::postgres::{PgExecutor, PgPool, Postgres};
use sqlx::{FromRow, QueryBuilder};
use tracing::{debug, info};

use notihub_core::error::{AppError, ErrorKind};
use notihub_core::result::AppResult;
use notihub_core::types::pagination::PaginatedData;
use notihub_entity::notification::{
    Lifecycle, Notification, NotificationAction, NotificationContent, NotificationId,
    NotificationRecipient, NotificationStatus, Transition,
};

use super::{Mutation, NotificationQuery, NotificationRepository};

/// Rows per multi-row `INSERT`. Each row binds 12 parameters and
/// PostgreSQL caps a statement at 65535.
const INSERT_CHUNK_SIZE: usize = 1000;

/// Every stored column except `id`, in bind order for inserts and updates.
const COLUMNS: [&str; 12] = [
    "description",
    "summary",
    "entity_type",
    "entity_id",
    "recipient_type",
    "recipient_id",
    "category",
    "actions",
    "status",
    "archived",
    "archived_on",
    "created_on",
];

/// Recipient filter shared by list and count queries. `$1` holds the
/// recipient types and `$2` the recipient ids, index-aligned.
const RECIPIENT_FILTER: &str =
    "(recipient_type, recipient_id) IN (SELECT * FROM UNNEST($1::text[], $2::text[]))";

#[derive(Debug, FromRow)]
struct NotificationRow {
    id: i64,
    description: String,
    summary: String,
    entity_type: String,
    entity_id: String,
    recipient_type: String,
    recipient_id: String,
    category: Option<i32>,
    actions: Json<Vec<NotificationAction>>,
    status: String,
    archived: bool,
    archived_on: Option<DateTime<Utc>>,
    created_on: DateTime<Utc>,
}

impl TryFrom<NotificationRow> for Notification {
    type Error = AppError;

    fn try_from(row: NotificationRow) -> Result<Self, Self::Error> {
        let status: NotificationStatus = row.status.parse().map_err(|e: AppError| {
            AppError::storage(format!("Notification {} has a corrupt status: {}", row.id, e.message))
        })?;

        Ok(Notification::from_storage(
            NotificationId(row.id),
            NotificationContent {
                description: row.description,
                summary: row.summary,
                entity_type: row.entity_type,
                entity_id: row.entity_id,
                recipient_type: row.recipient_type,
                recipient_id: row.recipient_id,
                category: row.category,
            },
            row.actions.0,
            Lifecycle::restore(status, row.archived, row.archived_on),
            row.created_on,
        ))
    }
}

/// Repository for notifications stored in PostgreSQL.
#[derive(Debug, Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Split recipients into the two arrays bound by [`RECIPIENT_FILTER`].
fn recipient_arrays(recipients: &[NotificationRecipient]) -> (Vec<String>, Vec<String>) {
    recipients
        .iter()
        .map(|r| (r.recipient_type.clone(), r.recipient_id.clone()))
        .unzip()
}

/// `ILIKE` pattern matching `fragment` anywhere, with wildcards escaped.
fn contains_pattern(fragment: &str) -> String {
    let mut escaped = String::with_capacity(fragment.len() + 2);
    escaped.push('%');
    for c in fragment.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// `UPDATE` assigning every column in [`COLUMNS`] from `$2` on, keyed by
/// `id = $1`.
fn update_statement() -> String {
    let assignments: Vec<String> = COLUMNS
        .iter()
        .enumerate()
        .map(|(i, column)| format!("{column} = ${}", i + 2))
        .collect();
    format!("UPDATE notifications SET {} WHERE id = $1", assignments.join(", "))
}

/// Overwrite the stored row of `notification` with every field
/// `Notification::copy_to` carries.
async fn write_row<'e, E>(executor: E, notification: &Notification) -> AppResult<u64>
where
    E: PgExecutor<'e>,
{
    let content = notification.content();
    let sql = update_statement();
    let result = sqlx::query(&sql)
        .bind(notification.id().get())
        .bind(&content.description)
        .bind(&content.summary)
        .bind(&content.entity_type)
        .bind(&content.entity_id)
        .bind(&content.recipient_type)
        .bind(&content.recipient_id)
        .bind(content.category)
        .bind(Json(notification.actions().to_vec()))
        .bind(notification.status().as_str())
        .bind(notification.is_archived())
        .bind(notification.archived_on())
        .bind(notification.created_on())
        .execute(executor)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to save notification", e))?;

    Ok(result.rows_affected())
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn get_notification(&self, id: NotificationId) -> AppResult<Notification> {
        let row = sqlx::query_as::<_, NotificationRow>("SELECT * FROM notifications WHERE id = $1")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to fetch notification", e)
            })?
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

        Notification::try_from(row)
    }

    async fn add_range(&self, notifications: &[Notification]) -> AppResult<u64> {
        if notifications.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;

        // Every row starts unread and unarchived, whatever the caller did to it.
        let fresh = Lifecycle::new();
        let mut inserted = 0u64;
        for chunk in notifications.chunks(INSERT_CHUNK_SIZE) {
            let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(format!(
                "INSERT INTO notifications ({}) ",
                COLUMNS.join(", ")
            ));
            builder.push_values(chunk, |mut row, n| {
                let content = n.content();
                row.push_bind(content.description.clone())
                    .push_bind(content.summary.clone())
                    .push_bind(content.entity_type.clone())
                    .push_bind(content.entity_id.clone())
                    .push_bind(content.recipient_type.clone())
                    .push_bind(content.recipient_id.clone())
                    .push_bind(content.category)
                    .push_bind(Json(n.actions().to_vec()))
                    .push_bind(fresh.status().as_str())
                    .push_bind(fresh.is_archived())
                    .push_bind(fresh.archived_on())
                    .push_bind(n.created_on());
            });

            let result = builder.build().execute(&mut *tx).await.map_err(|e| {
                AppError::with_source(ErrorKind::Storage, "Failed to insert notifications", e)
            })?;
            inserted += result.rows_affected();
        }

        tx.commit().await?;

        info!(inserted, "Inserted notification batch");
        Ok(inserted)
    }

    async fn save(&self, notification: &Notification) -> AppResult<u64> {
        let rows = write_row(&self.pool, notification).await?;
        if rows == 0 {
            return Err(AppError::not_found(format!(
                "Notification {} not found",
                notification.id()
            )));
        }
        Ok(rows)
    }

    async fn transition(
        &self,
        id: NotificationId,
        transition: Transition,
    ) -> AppResult<Mutation> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, NotificationRow>(
            "SELECT * FROM notifications WHERE id = $1 FOR UPDATE",
        )
        .bind(id.get())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to lock notification", e))?
        .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;

        let mut notification = Notification::try_from(row)?;
        if !notification.apply(transition) {
            // Dropping the transaction rolls it back and releases the row lock.
            return Ok(Mutation::Unchanged);
        }

        let rows = write_row(&mut *tx, &notification).await?;
        tx.commit().await?;

        debug!(%id, %transition, rows, "Notification transition applied");
        Ok(Mutation::Applied { rows })
    }

    async fn get_notifications(
        &self,
        query: &NotificationQuery,
    ) -> AppResult<PaginatedData<Notification>> {
        if query.recipients.is_empty() {
            return Ok(PaginatedData::empty());
        }

        let (types, ids) = recipient_arrays(&query.recipients);
        let pattern = contains_pattern(&query.title);
        let filter = format!(
            "{RECIPIENT_FILTER} AND ($3 OR NOT archived) \
             AND ($4 = '' OR summary ILIKE $5 OR description ILIKE $5)"
        );

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notifications WHERE {filter}"
        ))
        .bind(&types)
        .bind(&ids)
        .bind(query.show_archived)
        .bind(&query.title)
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to count notifications", e))?;

        let rows = sqlx::query_as::<_, NotificationRow>(&format!(
            "SELECT * FROM notifications WHERE {filter} ORDER BY id DESC LIMIT $6 OFFSET $7"
        ))
        .bind(&types)
        .bind(&ids)
        .bind(query.show_archived)
        .bind(&query.title)
        .bind(&pattern)
        .bind(i64::try_from(query.page.limit()).unwrap_or(i64::MAX))
        .bind(i64::try_from(query.page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to list notifications", e))?;

        let results = rows
            .into_iter()
            .map(Notification::try_from)
            .collect::<AppResult<Vec<_>>>()?;

        Ok(PaginatedData::new(results, total.max(0) as u64))
    }

    async fn not_read_notification_count(
        &self,
        recipients: &[NotificationRecipient],
    ) -> AppResult<u64> {
        if recipients.is_empty() {
            return Ok(0);
        }

        let (types, ids) = recipient_arrays(recipients);
        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM notifications WHERE {RECIPIENT_FILTER} AND status = 'unread'"
        ))
        .bind(&types)
        .bind(&ids)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Storage, "Failed to count unread", e))?;

        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("invoice"), "%invoice%");
    }

    #[test]
    fn test_update_writes_every_inserted_column() {
        let sql = update_statement();
        assert!(sql.ends_with("WHERE id = $1"));
        for (i, column) in COLUMNS.iter().enumerate() {
            assert!(
                sql.contains(&format!("{column} = ${}", i + 2)),
                "{column} missing from {sql}"
            );
        }
        assert!(sql.contains("actions = $9"));
        assert!(sql.contains("created_on = $13"));
    }

    #[test]
    fn test_sqlx_errors_map_to_error_kinds() {
        assert_eq!(AppError::from(sqlx::Error::RowNotFound).kind, ErrorKind::NotFound);
        assert_eq!(AppError::from(sqlx::Error::PoolTimedOut).kind, ErrorKind::Storage);
    }

    #[test]
    fn test_recipient_arrays_stay_aligned() {
        let (types, ids) = recipient_arrays(&[
            NotificationRecipient::new("user", "7"),
            NotificationRecipient::new("role", "admin"),
        ]);
        assert_eq!(types, vec!["user", "role"]);
        assert_eq!(ids, vec!["7", "admin"]);
    }
}
