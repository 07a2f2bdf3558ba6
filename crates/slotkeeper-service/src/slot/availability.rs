//! Slot listing, single-slot changes and day-scoped bulk changes.

use std::sync::Arc;

use chrono::{FixedOffset, NaiveDate};
use tracing::info;

use slotkeeper_auth::rbac::{RbacEnforcer, SystemPermission};
use slotkeeper_core::config::ScheduleConfig;
use slotkeeper_core::error::AppError;
use slotkeeper_core::types::{ChapterId, TimeSlotId};
use slotkeeper_database::store::{ChapterStore, SlotChange, SlotQuery, SlotStore};
use slotkeeper_entity::slot::{SlotPlan, TimeSlot, TimeWindow};
use slotkeeper_entity::slot::calendar::to_utc;

use crate::context::RequestContext;

/// Manages availability of existing slots.
#[derive(Clone)]
pub struct AvailabilityService {
    /// Chapter store.
    chapters: Arc<dyn ChapterStore>,
    /// Slot store.
    slots: Arc<dyn SlotStore>,
    /// RBAC enforcer.
    rbac: Arc<RbacEnforcer>,
    /// Timezone used when a slot is rescheduled.
    schedule: ScheduleConfig,
}

impl AvailabilityService {
    /// Creates a new availability service.
    pub fn new(
        chapters: Arc<dyn ChapterStore>,
        slots: Arc<dyn SlotStore>,
        rbac: Arc<RbacEnforcer>,
        schedule: ScheduleConfig,
    ) -> Self {
        Self {
            chapters,
            slots,
            rbac,
            schedule,
        }
    }

    /// Lists slots matching the query. Public.
    pub async fn list(&self, query: &SlotQuery) -> Result<Vec<TimeSlot>, AppError> {
        if let (Some(from), Some(to)) = (query.from, query.to)
            && from > to
        {
            return Err(AppError::validation(format!(
                "Date range start {from} is after end {to}"
            )));
        }
        self.slots.find_slots(query).await
    }

    /// Gets a slot by ID.
    pub async fn get(&self, id: TimeSlotId) -> Result<TimeSlot, AppError> {
        self.slots
            .find_slot(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Time slot {id} not found")))
    }

    /// Sets one slot's availability to an explicit value.
    pub async fn toggle(
        &self,
        ctx: &RequestContext,
        id: TimeSlotId,
        is_available: bool,
    ) -> Result<TimeSlot, AppError> {
        self.require_manage(ctx)?;
        let slot = self.slots.set_availability(id, is_available).await?;
        info!(
            slot_id = %id,
            is_available,
            actor = ctx.actor(),
            "Time slot availability set"
        );
        Ok(slot)
    }

    /// Blocks every slot of the chapter on `date`.
    pub async fn disable_day(
        &self,
        ctx: &RequestContext,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.require_manage(ctx)?;
        self.disable_day_unchecked(chapter_id, date).await
    }

    /// Unblocks every slot of the chapter on `date`. Held slots stay taken.
    pub async fn enable_day(
        &self,
        ctx: &RequestContext,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.require_manage(ctx)?;
        self.enable_day_unchecked(chapter_id, date).await
    }

    /// Deletes every unheld slot of the chapter on `date`.
    pub async fn clear_day(
        &self,
        ctx: &RequestContext,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.require_manage(ctx)?;
        self.clear_day_unchecked(chapter_id, date).await
    }

    /// Deletes every unheld slot of the chapter.
    pub async fn clear_all(
        &self,
        ctx: &RequestContext,
        chapter_id: ChapterId,
    ) -> Result<SlotChange, AppError> {
        self.require_manage(ctx)?;
        self.clear_all_unchecked(chapter_id).await
    }

    /// Moves a slot to a new window on the same date.
    pub async fn reschedule(
        &self,
        ctx: &RequestContext,
        id: TimeSlotId,
        window: TimeWindow,
    ) -> Result<TimeSlot, AppError> {
        self.require_manage(ctx)?;
        let slot = self.get(id).await?;
        let offset = self.offset()?;
        let plan = SlotPlan {
            date: slot.date,
            start_time: to_utc(slot.date, window.start(), offset),
            end_time: to_utc(slot.date, window.end(), offset),
        };
        let updated = self.slots.reschedule_slot(id, &plan).await?;
        info!(slot_id = %id, window = %window, actor = ctx.actor(), "Time slot rescheduled");
        Ok(updated)
    }

    /// Deletes one slot.
    pub async fn delete(&self, ctx: &RequestContext, id: TimeSlotId) -> Result<(), AppError> {
        self.require_manage(ctx)?;
        self.slots.delete_slot(id).await?;
        info!(slot_id = %id, actor = ctx.actor(), "Time slot deleted");
        Ok(())
    }

    pub(crate) async fn disable_day_unchecked(
        &self,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.ensure_chapter(chapter_id).await?;
        let change = self.slots.disable_day(chapter_id, date).await?;
        info!(chapter_id = %chapter_id, %date, affected = change.affected, "Day disabled");
        Ok(change)
    }

    pub(crate) async fn enable_day_unchecked(
        &self,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.ensure_chapter(chapter_id).await?;
        let change = self.slots.enable_day(chapter_id, date).await?;
        info!(
            chapter_id = %chapter_id,
            %date,
            affected = change.affected,
            retained_held = change.retained_held,
            "Day enabled"
        );
        Ok(change)
    }

    pub(crate) async fn clear_day_unchecked(
        &self,
        chapter_id: ChapterId,
        date: NaiveDate,
    ) -> Result<SlotChange, AppError> {
        self.ensure_chapter(chapter_id).await?;
        let change = self.slots.clear_day(chapter_id, date).await?;
        info!(
            chapter_id = %chapter_id,
            %date,
            deleted = change.affected,
            retained_held = change.retained_held,
            "Day cleared"
        );
        Ok(change)
    }

    pub(crate) async fn clear_all_unchecked(
        &self,
        chapter_id: ChapterId,
    ) -> Result<SlotChange, AppError> {
        self.ensure_chapter(chapter_id).await?;
        let change = self.slots.clear_chapter(chapter_id).await?;
        info!(
            chapter_id = %chapter_id,
            deleted = change.affected,
            retained_held = change.retained_held,
            "Chapter slots cleared"
        );
        Ok(change)
    }

    fn require_manage(&self, ctx: &RequestContext) -> Result<(), AppError> {
        self.rbac
            .require_permission(&ctx.role, &SystemPermission::SlotManage)
    }

    async fn ensure_chapter(&self, chapter_id: ChapterId) -> Result<(), AppError> {
        match self.chapters.find_chapter(chapter_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::not_found(format!("Chapter {chapter_id} not found"))),
        }
    }

    fn offset(&self) -> Result<FixedOffset, AppError> {
        FixedOffset::east_opt(self.schedule.utc_offset_minutes * 60).ok_or_else(|| {
            AppError::configuration(format!(
                "Invalid schedule offset: {} minutes",
                self.schedule.utc_offset_minutes
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{admin, fixture, new_reservation, seed_day};
    use slotkeeper_core::error::ErrorKind;
    use slotkeeper_entity::reservation::ReservationStatus;

    #[tokio::test]
    async fn test_toggle_is_idempotent_on_target() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;

        let first = fx.availability.toggle(&admin(), slot.id, false).await.unwrap();
        let second = fx.availability.toggle(&admin(), slot.id, false).await.unwrap();
        assert_eq!(first.is_available, second.is_available);
        assert!(second.is_disabled);

        let back = fx.availability.toggle(&admin(), slot.id, true).await.unwrap();
        assert!(back.is_bookable());
    }

    #[tokio::test]
    async fn test_enable_day_keeps_booked_slot_unavailable() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        fx.reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        let disabled = fx
            .availability
            .disable_day(&admin(), fx.chapter.id, slot.date)
            .await
            .unwrap();
        assert_eq!(disabled.affected, 1);

        let enabled = fx
            .availability
            .enable_day(&admin(), fx.chapter.id, slot.date)
            .await
            .unwrap();
        assert_eq!(enabled.retained_held, 1);

        let after = fx.availability.get(slot.id).await.unwrap();
        assert!(!after.is_available);
        assert!(!after.is_disabled);
    }

    #[tokio::test]
    async fn test_decline_after_day_reenabled_frees_slot() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 3).await;
        let reservation = fx
            .reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        fx.availability
            .disable_day(&admin(), fx.chapter.id, slot.date)
            .await
            .unwrap();
        fx.availability
            .enable_day(&admin(), fx.chapter.id, slot.date)
            .await
            .unwrap();
        fx.reservations
            .update_status(
                &admin(),
                reservation.id,
                Some(ReservationStatus::Pending),
                ReservationStatus::Declined,
            )
            .await
            .unwrap();

        let after = fx.availability.get(slot.id).await.unwrap();
        assert!(after.is_available);
        assert!(!after.is_disabled);
    }

    #[tokio::test]
    async fn test_toggle_on_held_slot_fails() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 4).await;
        fx.reservations
            .create(&RequestContext::public(), new_reservation(&fx, slot.id))
            .await
            .unwrap();

        let err = fx
            .availability
            .toggle(&admin(), slot.id, true)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::SlotUnavailable);
    }

    #[tokio::test]
    async fn test_day_operation_on_unknown_chapter() {
        let fx = fixture().await;
        let err = fx
            .availability
            .clear_all(&admin(), ChapterId::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_reschedule_rejects_overlap() {
        let fx = fixture().await;
        let slot = seed_day(&fx, 5).await;
        let _ = fx
            .generator
            .generate_unchecked(&crate::slot::GenerateSlots {
                chapter_id: fx.chapter.id,
                date_range: slotkeeper_entity::slot::DateRange::new(slot.date, slot.date)
                    .unwrap(),
                weekday_time: TimeWindow::parse("20:00", "21:00").unwrap(),
                weekend_time: None,
                time_ranges: vec![],
            })
            .await
            .unwrap();

        let err = fx
            .availability
            .reschedule(
                &admin(),
                slot.id,
                TimeWindow::parse("19:30", "20:30").unwrap(),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);

        let moved = fx
            .availability
            .reschedule(
                &admin(),
                slot.id,
                TimeWindow::parse("17:00", "18:00").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(moved.start_time.format("%H:%M").to_string(), "17:00");
    }
}
