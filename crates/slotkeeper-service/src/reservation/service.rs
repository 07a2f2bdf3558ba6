//! Creates reservations against slots and moves them between buckets.

use std::sync::Arc;

use tracing::{info, warn};

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::error::AppError;
use slotkeeper_core::events::{DomainEvent, ReservationEvent};
use slotkeeper_core::types::ReservationId;
use slotkeeper_core::types::pagination::{PageRequest, PageResponse};
use slotkeeper_database::store::{ChapterStore, ReservationStore, Transition};
use slotkeeper_entity::reservation::{
    NewReservation, Reservation, ReservationFilter, ReservationStatus, StatusSummary,
};

use crate::bulk::BulkReport;
use crate::context::RequestContext;
use crate::notification::{EventPublisher, NotificationService};

/// Manages the reservation lifecycle.
#[derive(Clone)]
pub struct ReservationService {
    /// Chapter store.
    chapters: Arc<dyn ChapterStore>,
    /// Reservation store.
    reservations: Arc<dyn ReservationStore>,
    /// Notification feed.
    notifications: Arc<NotificationService>,
    /// Event broadcast.
    events: EventPublisher,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
}

impl ReservationService {
    /// Creates a new reservation service.
    pub fn new(
        chapters: Arc<dyn ChapterStore>,
        reservations: Arc<dyn ReservationStore>,
        notifications: Arc<NotificationService>,
        events: EventPublisher,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            chapters,
            reservations,
            notifications,
            events,
            rbac,
        }
    }

    /// Creates a pending reservation and takes its slot.
    ///
    /// Open to the public booking flow.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        new: NewReservation,
    ) -> Result<Reservation, AppError> {
        new.validate()?;

        let chapter = self
            .chapters
            .find_chapter(new.chapter_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Chapter {} not found", new.chapter_id)))?;

        if !chapter.accepts_party(new.people) {
            return Err(AppError::validation(format!(
                "Chapter '{}' takes {} to {} players, got {}",
                chapter.name, chapter.min_player_number, chapter.max_player_number, new.people
            )));
        }

        let reservation = self
            .reservations
            .bind_reservation(&new, chapter.scenario_id)
            .await?;

        info!(
            reservation_id = %reservation.id,
            chapter_id = %reservation.chapter_id,
            slot_id = ?reservation.time_slot_id,
            people = reservation.people,
            actor = ctx.actor(),
            "Reservation created"
        );

        self.emit(
            ctx,
            ReservationEvent::Created {
                reservation_id: reservation.id,
                chapter_id: reservation.chapter_id,
                time_slot_id: new.time_slot_id,
                name: reservation.name.clone(),
                party_size: reservation.people,
                starts_at: reservation.slot_start,
            },
        )
        .await;

        Ok(reservation)
    }

    /// Gets a reservation by ID.
    pub async fn get(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
    ) -> Result<Reservation, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::ReservationRead)?;
        self.find(id).await
    }

    /// Lists reservations matching the filter.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        filter: &ReservationFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Reservation>, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::ReservationRead)?;
        self.reservations.find_reservations(filter, &page).await
    }

    /// Reservation counts per bucket.
    pub async fn summary(&self, ctx: &RequestContext) -> Result<StatusSummary, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::ReservationRead)?;
        self.reservations.status_summary().await
    }

    /// Moves a reservation to `next`.
    ///
    /// `source` is the bucket the caller believes the reservation is in.
    /// When omitted, the stored status is used.
    pub async fn update_status(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
        source: Option<ReservationStatus>,
        next: ReservationStatus,
    ) -> Result<Reservation, AppError> {
        let expected = match source {
            Some(status) => status,
            None => self.find(id).await?.status,
        };
        self.rbac.require_transition(&ctx.role, expected)?;

        let Transition {
            reservation,
            previous,
        } = self
            .reservations
            .transition(id, Some(expected), next)
            .await?;

        info!(
            reservation_id = %id,
            from = %previous,
            to = %next,
            actor = ctx.actor(),
            "Reservation status changed"
        );

        self.emit(
            ctx,
            ReservationEvent::StatusChanged {
                reservation_id: id,
                name: reservation.name.clone(),
                from: previous.to_string(),
                to: next.to_string(),
            },
        )
        .await;

        Ok(reservation)
    }

    /// Moves a reservation into the deleted bucket and releases its slot.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        id: ReservationId,
        source: Option<ReservationStatus>,
    ) -> Result<Reservation, AppError> {
        self.update_status(ctx, id, source, ReservationStatus::Deleted)
            .await
    }

    /// Applies one status to many reservations, reporting per ID.
    pub async fn bulk_update_status(
        &self,
        ctx: &RequestContext,
        ids: &[ReservationId],
        source: Option<ReservationStatus>,
        next: ReservationStatus,
    ) -> Result<BulkReport<ReservationId, ReservationStatus>, AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::BulkOperate)?;
        if ids.is_empty() {
            return Err(AppError::validation("No reservations selected"));
        }

        let mut report = BulkReport::new();
        for id in unique(ids) {
            let result = self
                .update_status(ctx, id, source, next)
                .await
                .map(|r| r.status);
            report.push(id, result);
        }

        if report.failed > 0 {
            warn!(
                succeeded = report.succeeded,
                failed = report.failed,
                to = %next,
                "Bulk reservation update partially failed"
            );
        }
        Ok(report)
    }

    async fn find(&self, id: ReservationId) -> Result<Reservation, AppError> {
        self.reservations
            .find_reservation(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))
    }

    /// Records the event in the feed and broadcasts it.
    ///
    /// The state change already happened, so failures here are logged only.
    async fn emit(&self, ctx: &RequestContext, event: ReservationEvent) {
        if let Err(e) = self.notifications.record(&event).await {
            warn!(
                reservation_id = %event.reservation_id(),
                error = %e,
                "Failed to persist reservation notification"
            );
        }
        self.events
            .publish(DomainEvent::reservation(ctx.subject.clone(), event));
    }
}

/// IDs in first-seen order without repeats.
pub(crate) fn unique<T: Copy + PartialEq>(ids: &[T]) -> Vec<T> {
    let mut seen = Vec::with_capacity(ids.len());
    for id in ids {
        if !seen.contains(id) {
            seen.push(*id);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, new_reservation, seed_day};
    use slotkeeper_core::error::ErrorKind;
    use slotkeeper_entity::user::UserRole;

    fn desk() -> RequestContext {
        RequestContext::new("front-desk", UserRole::Subadmin)
    }

    #[tokio::test]
    async fn test_create_marks_slot_unavailable() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let r = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        assert_eq!(r.status, ReservationStatus::Pending);
        assert_eq!(r.time_slot_id, Some(slot.id));
        assert!(!fx.availability.get(slot.id).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_second_reservation_on_same_slot_fails() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        fx.reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();
        let err = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SlotUnavailable);
    }

    #[tokio::test]
    async fn test_party_size_outside_bounds() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let mut new = new_reservation(&fx, slot.id);
        new.people = fx.chapter.max_player_number + 1;
        let err = fx
            .reservations
            .create(&RequestContext::public(), new)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_decline_releases_and_reapprove_reacquires() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let r = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        fx.reservations
            .update_status(&admin(), r.id, Some(ReservationStatus::Pending), ReservationStatus::Declined)
            .await
            .unwrap();
        assert!(fx.availability.get(slot.id).await.unwrap().is_available);

        let approved = fx
            .reservations
            .update_status(&admin(), r.id, None, ReservationStatus::Approved)
            .await
            .unwrap();
        assert_eq!(approved.status, ReservationStatus::Approved);
        assert!(!fx.availability.get(slot.id).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_reapprove_fails_when_slot_taken_meanwhile() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let first = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();
        fx.reservations
            .update_status(&admin(), first.id, None, ReservationStatus::Declined)
            .await
            .unwrap();
        fx.reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        let err = fx
            .reservations
            .update_status(&admin(), first.id, None, ReservationStatus::Approved)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SlotUnavailable);
    }

    #[tokio::test]
    async fn test_stale_source_is_conflict() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let r = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();
        let err = fx
            .reservations
            .update_status(&admin(), r.id, Some(ReservationStatus::Approved), ReservationStatus::Declined)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_subadmin_only_moves_pending() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let r = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        fx.reservations
            .update_status(&desk(), r.id, None, ReservationStatus::Approved)
            .await
            .unwrap();
        let err = fx
            .reservations
            .delete(&desk(), r.id, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Forbidden);
    }

    #[tokio::test]
    async fn test_events_are_persisted_and_broadcast() {
        let fx = fixture().await;
        let mut rx = fx.events.subscribe();
        let slot = seed_day(&fx, 3).await;
        let r = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();
        fx.reservations.delete(&admin(), r.id, None).await.unwrap();

        let first = rx.recv().await.unwrap();
        assert!(first.actor.is_none());
        let second = rx.recv().await.unwrap();
        assert_eq!(second.actor.as_deref(), Some("ops"));

        let feed = fx
            .notifications
            .list(&admin(), false, PageRequest::default())
            .await
            .unwrap();
        assert_eq!(feed.total_items, 2);
        assert!(fx.availability.get(slot.id).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_bulk_status_reports_each_id() {
        let fx = fixture().await;
        let a = seed_day(&fx, 3).await;
        let b = seed_day(&fx, 4).await;
        let ra = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, a.id))
            .await
            .unwrap();
        let rb = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, b.id))
            .await
            .unwrap();
        fx.reservations.delete(&admin(), rb.id, None).await.unwrap();

        let report = fx
            .reservations
            .bulk_update_status(
                &admin(),
                &[ra.id, rb.id, ra.id],
                None,
                ReservationStatus::Approved,
            )
            .await
            .unwrap();
        assert_eq!(report.results.len(), 2);
        assert_eq!(report.succeeded, 1);
        assert_eq!(report.failed, 1);
        assert!(report.is_partial());
    }
}
