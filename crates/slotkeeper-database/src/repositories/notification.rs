//! Notification repository implementation.

use async_trait::async_trait;
use sqlx::PgPool;

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::NotificationId;
use slotkeeper_core::types::pagination::{PageRequest, PageResponse};
use slotkeeper_entity::notification::Notification;

use super::db_error;
use crate::store::NotificationStore;

/// Repository for the admin notification feed.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    pool: PgPool,
}

impl NotificationRepository {
    /// Create a new notification repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for NotificationRepository {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "INSERT INTO notifications (id, reservation_id, event_type, title, message, is_read, read_at, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
        )
        .bind(notification.id)
        .bind(notification.reservation_id)
        .bind(&notification.event_type)
        .bind(&notification.title)
        .bind(&notification.message)
        .bind(notification.is_read)
        .bind(notification.read_at)
        .bind(notification.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to create notification"))
    }

    async fn find_notifications(
        &self,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM notifications WHERE NOT ($1 AND is_read)",
        )
        .bind(unread_only)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to count notifications"))?;

        let items = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE NOT ($1 AND is_read) \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(unread_only)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to list notifications"))?;

        Ok(PageResponse::new(items, *page, total as u64))
    }

    async fn count_unread(&self) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notifications WHERE NOT is_read")
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to count unread notifications"))?;
        Ok(count as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<Notification> {
        sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = TRUE, read_at = COALESCE(read_at, NOW()) \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_error("Failed to mark notification read"))?
        .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    async fn delete_notification(&self, id: NotificationId) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM notifications WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to delete notification"))?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(format!("Notification {id} not found")));
        }
        Ok(())
    }

    async fn clear_notifications(&self) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM notifications")
            .execute(&self.pool)
            .await
            .map_err(db_error("Failed to clear notifications"))?;
        Ok(result.rows_affected())
    }
}
