//! Admin notification feed.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::error::AppError;
use slotkeeper_core::events::ReservationEvent;
use slotkeeper_core::types::NotificationId;
use slotkeeper_core::types::pagination::{PageRequest, PageResponse};
use slotkeeper_database::store::NotificationStore;
use slotkeeper_entity::notification::Notification;

use crate::context::RequestContext;

/// Manages the notification feed shown to staff.
#[derive(Clone)]
pub struct NotificationService {
    /// Notification store.
    store: Arc<dyn NotificationStore>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// Whether events are written to the feed.
    persist: bool,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(store: Arc<dyn NotificationStore>, rbac: Arc<RbacEnforcer>, persist: bool) -> Self {
        Self {
            store,
            rbac,
            persist,
        }
    }

    /// Writes a feed entry for a reservation event.
    ///
    /// Returns `None` when persistence is switched off.
    pub async fn record(&self, event: &ReservationEvent) -> Result<Option<Notification>, AppError> {
        if !self.persist {
            return Ok(None);
        }
        let notification = Notification::from_event(event, Utc::now());
        self.store.insert_notification(&notification).await.map(Some)
    }

    /// Lists notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        unread_only: bool,
        page: PageRequest,
    ) -> Result<PageResponse<Notification>, AppError> {
        self.require(ctx, SystemPermission::NotificationRead)?;
        self.store.find_notifications(unread_only, &page).await
    }

    /// Gets the unread notification count.
    pub async fn unread_count(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.require(ctx, SystemPermission::NotificationRead)?;
        self.store.count_unread().await
    }

    /// Marks a notification as read.
    pub async fn mark_read(
        &self,
        ctx: &RequestContext,
        id: NotificationId,
    ) -> Result<Notification, AppError> {
        self.require(ctx, SystemPermission::NotificationManage)?;
        self.store.mark_read(id).await
    }

    /// Deletes a notification.
    pub async fn delete(&self, ctx: &RequestContext, id: NotificationId) -> Result<(), AppError> {
        self.require(ctx, SystemPermission::NotificationManage)?;
        self.store.delete_notification(id).await
    }

    /// Deletes every notification.
    pub async fn clear(&self, ctx: &RequestContext) -> Result<u64, AppError> {
        self.require(ctx, SystemPermission::NotificationManage)?;
        let removed = self.store.clear_notifications().await?;
        info!(removed, actor = ctx.actor(), "Notifications cleared");
        Ok(removed)
    }

    fn require(&self, ctx: &RequestContext, permission: SystemPermission) -> Result<(), AppError> {
        self.rbac.require_permission(&ctx.role, &permission)
    }
}
