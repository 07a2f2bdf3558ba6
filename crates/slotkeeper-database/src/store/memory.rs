//! In-memory store using a single Tokio mutex for single-node deployments
//! and tests.
//!
//! Each trait method takes the lock once, so every operation is atomic
//! with respect to every other one.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use tracing::{info, warn};

use slotkeeper_core::error::AppError;
use slotkeeper_core::result::AppResult;
use slotkeeper_core::types::pagination::{PageRequest, PageResponse};
use slotkeeper_core::types::{
    ChapterId, NotificationId, PriceId, ReservationId, ScenarioId, TimeSlotId,
};
use slotkeeper_entity::chapter::Chapter;
use slotkeeper_entity::notification::Notification;
use slotkeeper_entity::price::Price;
use slotkeeper_entity::reservation::{
    NewReservation, Reservation, ReservationFilter, ReservationStatus, StatusSummary,
};
use slotkeeper_entity::scenario::Scenario;
use slotkeeper_entity::slot::{NewTimeSlot, PlanVerdict, SlotPlan, TimeSlot, classify};

use super::{
    ChapterRemoval, ChapterStore, InsertOutcome, NotificationStore, PriceStore, ReservationStore,
    ScenarioStore, SlotChange, SlotQuery, SlotStore, Transition,
};

/// Internal tables for the memory store.
#[derive(Debug, Default)]
struct Tables {
    scenarios: HashMap<ScenarioId, Scenario>,
    chapters: HashMap<ChapterId, Chapter>,
    prices: HashMap<PriceId, Price>,
    slots: HashMap<TimeSlotId, TimeSlot>,
    reservations: HashMap<ReservationId, Reservation>,
    notifications: HashMap<NotificationId, Notification>,
}

impl Tables {
    fn is_held(&self, slot_id: TimeSlotId) -> bool {
        self.reservations
            .values()
            .any(|r| r.time_slot_id == Some(slot_id) && r.status.holds_slot())
    }

    fn slot_mut(&mut self, id: TimeSlotId) -> AppResult<&mut TimeSlot> {
        self.slots
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Time slot {id} not found")))
    }

    fn ensure_chapter(&self, id: ChapterId) -> AppResult<()> {
        if self.chapters.contains_key(&id) {
            Ok(())
        } else {
            Err(AppError::not_found(format!("Chapter {id} not found")))
        }
    }

    /// Remove slots and null out reservation references to them.
    fn remove_slots(&mut self, ids: &[TimeSlotId]) {
        for id in ids {
            self.slots.remove(id);
        }
        for r in self.reservations.values_mut() {
            if r.time_slot_id.is_some_and(|s| ids.contains(&s)) {
                r.time_slot_id = None;
            }
        }
    }

    fn delete_unheld(&mut self, chapter_id: ChapterId, date: Option<NaiveDate>) -> SlotChange {
        let in_scope: Vec<TimeSlotId> = self
            .slots
            .values()
            .filter(|s| s.chapter_id == chapter_id && date.is_none_or(|d| s.date == d))
            .map(|s| s.id)
            .collect();
        let (held, free): (Vec<_>, Vec<_>) = in_scope.into_iter().partition(|id| self.is_held(*id));
        self.remove_slots(&free);
        SlotChange {
            affected: free.len() as u64,
            retained_held: held.len() as u64,
        }
    }
}

/// In-memory implementation of every storage trait.
///
/// Cloning is cheap and clones share the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    /// Create an empty memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of<T: serde::Serialize>(mut items: Vec<T>, page: &PageRequest) -> PageResponse<T> {
    let total = items.len() as u64;
    let start = usize::try_from(page.offset())
        .unwrap_or(usize::MAX)
        .min(items.len());
    let end = (start + page.limit() as usize).min(items.len());
    let items: Vec<T> = items.drain(start..end).collect();
    PageResponse::new(items, *page, total)
}

#[async_trait]
impl ScenarioStore for MemoryStore {
    async fn find_all_scenarios(&self) -> AppResult<Vec<Scenario>> {
        let tables = self.tables.lock().await;
        let mut all: Vec<Scenario> = tables.scenarios.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn find_scenario(&self, id: ScenarioId) -> AppResult<Option<Scenario>> {
        Ok(self.tables.lock().await.scenarios.get(&id).cloned())
    }

    async fn insert_scenario(&self, scenario: &Scenario) -> AppResult<Scenario> {
        let mut tables = self.tables.lock().await;
        if tables.scenarios.contains_key(&scenario.id) {
            return Err(AppError::conflict(format!(
                "Scenario {} already exists",
                scenario.id
            )));
        }
        tables.scenarios.insert(scenario.id, scenario.clone());
        Ok(scenario.clone())
    }

    async fn update_scenario(&self, scenario: &Scenario) -> AppResult<Scenario> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .scenarios
            .get_mut(&scenario.id)
            .ok_or_else(|| AppError::not_found(format!("Scenario {} not found", scenario.id)))?;
        *stored = scenario.clone();
        Ok(scenario.clone())
    }

    async fn delete_scenario(&self, id: ScenarioId) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        let chapters = tables
            .chapters
            .values()
            .filter(|c| c.scenario_id == id)
            .count();
        if chapters > 0 {
            return Err(AppError::conflict(format!(
                "Scenario {id} still has {chapters} chapter(s)"
            )));
        }
        tables
            .scenarios
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Scenario {id} not found")))
    }
}

#[async_trait]
impl ChapterStore for MemoryStore {
    async fn find_chapters(&self, scenario_id: Option<ScenarioId>) -> AppResult<Vec<Chapter>> {
        let tables = self.tables.lock().await;
        let mut chapters: Vec<Chapter> = tables
            .chapters
            .values()
            .filter(|c| scenario_id.is_none_or(|s| s == c.scenario_id))
            .cloned()
            .collect();
        chapters.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(chapters)
    }

    async fn find_chapter(&self, id: ChapterId) -> AppResult<Option<Chapter>> {
        Ok(self.tables.lock().await.chapters.get(&id).cloned())
    }

    async fn insert_chapter(&self, chapter: &Chapter) -> AppResult<Chapter> {
        let mut tables = self.tables.lock().await;
        if !tables.scenarios.contains_key(&chapter.scenario_id) {
            return Err(AppError::conflict(format!(
                "Scenario {} does not exist",
                chapter.scenario_id
            )));
        }
        tables.chapters.insert(chapter.id, chapter.clone());
        Ok(chapter.clone())
    }

    async fn update_chapter(&self, chapter: &Chapter) -> AppResult<Chapter> {
        let mut tables = self.tables.lock().await;
        if !tables.scenarios.contains_key(&chapter.scenario_id) {
            return Err(AppError::conflict(format!(
                "Scenario {} does not exist",
                chapter.scenario_id
            )));
        }
        let stored = tables
            .chapters
            .get_mut(&chapter.id)
            .ok_or_else(|| AppError::not_found(format!("Chapter {} not found", chapter.id)))?;
        *stored = chapter.clone();
        Ok(chapter.clone())
    }

    async fn delete_chapter(&self, id: ChapterId) -> AppResult<ChapterRemoval> {
        let mut tables = self.tables.lock().await;
        tables.ensure_chapter(id)?;

        let active = tables
            .reservations
            .values()
            .filter(|r| r.chapter_id == id && r.status.holds_slot())
            .count();
        if active > 0 {
            return Err(AppError::conflict(format!(
                "Chapter {id} has {active} pending or approved reservation(s)"
            )));
        }

        let before_reservations = tables.reservations.len();
        tables.reservations.retain(|_, r| r.chapter_id != id);
        let reservations_deleted = (before_reservations - tables.reservations.len()) as u64;

        let before_slots = tables.slots.len();
        tables.slots.retain(|_, s| s.chapter_id != id);
        let slots_deleted = (before_slots - tables.slots.len()) as u64;

        let live: Vec<ReservationId> = tables.reservations.keys().copied().collect();
        for n in tables.notifications.values_mut() {
            if n.reservation_id.is_some_and(|r| !live.contains(&r)) {
                n.reservation_id = None;
            }
        }

        tables.chapters.remove(&id);
        info!(chapter_id = %id, slots_deleted, reservations_deleted, "Chapter deleted");
        Ok(ChapterRemoval {
            slots_deleted,
            reservations_deleted,
        })
    }
}

#[async_trait]
impl PriceStore for MemoryStore {
    async fn find_all_prices(&self) -> AppResult<Vec<Price>> {
        let tables = self.tables.lock().await;
        let mut prices: Vec<Price> = tables.prices.values().cloned().collect();
        prices.sort_by_key(|p| (p.players_count, p.is_and_above));
        Ok(prices)
    }

    async fn find_price(&self, id: PriceId) -> AppResult<Option<Price>> {
        Ok(self.tables.lock().await.prices.get(&id).cloned())
    }

    async fn insert_price(&self, price: &Price) -> AppResult<Price> {
        self.tables
            .lock()
            .await
            .prices
            .insert(price.id, price.clone());
        Ok(price.clone())
    }

    async fn update_price(&self, price: &Price) -> AppResult<Price> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .prices
            .get_mut(&price.id)
            .ok_or_else(|| AppError::not_found(format!("Price {} not found", price.id)))?;
        *stored = price.clone();
        Ok(price.clone())
    }

    async fn delete_price(&self, id: PriceId) -> AppResult<()> {
        self.tables
            .lock()
            .await
            .prices
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Price {id} not found")))
    }
}

#[async_trait]
impl SlotStore for MemoryStore {
    async fn find_slots(&self, query: &SlotQuery) -> AppResult<Vec<TimeSlot>> {
        let tables = self.tables.lock().await;
        let mut slots: Vec<TimeSlot> = tables
            .slots
            .values()
            .filter(|s| query.matches(s))
            .filter(|s| {
                query.scenario_id.is_none_or(|scenario_id| {
                    tables
                        .chapters
                        .get(&s.chapter_id)
                        .is_some_and(|c| c.scenario_id == scenario_id)
                })
            })
            .cloned()
            .collect();
        slots.sort_by_key(|s| (s.start_time, s.chapter_id.into_uuid()));
        Ok(slots)
    }

    async fn find_slot(&self, id: TimeSlotId) -> AppResult<Option<TimeSlot>> {
        Ok(self.tables.lock().await.slots.get(&id).cloned())
    }

    async fn insert_planned(
        &self,
        chapter_id: ChapterId,
        plans: &[SlotPlan],
    ) -> AppResult<InsertOutcome> {
        let mut tables = self.tables.lock().await;
        tables.ensure_chapter(chapter_id)?;

        let mut existing: Vec<TimeSlot> = tables
            .slots
            .values()
            .filter(|s| s.chapter_id == chapter_id)
            .cloned()
            .collect();

        let now = Utc::now();
        let mut outcome = InsertOutcome::default();
        for plan in plans {
            match classify(&existing, plan) {
                PlanVerdict::Duplicate(_) => outcome.skipped_existing.push(plan.date),
                PlanVerdict::Overlap(_) => outcome.conflicts.push(plan.date),
                PlanVerdict::Create => {
                    let slot = TimeSlot::new(
                        NewTimeSlot {
                            chapter_id,
                            date: plan.date,
                            start_time: plan.start_time,
                            end_time: plan.end_time,
                        },
                        now,
                    );
                    tables.slots.insert(slot.id, slot.clone());
                    existing.push(slot.clone());
                    outcome.created.push(slot);
                }
            }
        }
        Ok(outcome)
    }

    async fn set_availability(&self, id: TimeSlotId, is_available: bool) -> AppResult<TimeSlot> {
        let mut tables = self.tables.lock().await;
        let held = tables.is_held(id);
        let slot = tables.slot_mut(id)?;
        if is_available && held {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }
        slot.is_available = is_available;
        slot.is_disabled = !is_available;
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    async fn disable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let mut affected = 0;
        for slot in tables
            .slots
            .values_mut()
            .filter(|s| s.chapter_id == chapter_id && s.date == date)
        {
            slot.is_available = false;
            slot.is_disabled = true;
            slot.updated_at = now;
            affected += 1;
        }
        Ok(SlotChange {
            affected,
            retained_held: 0,
        })
    }

    async fn enable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        let mut tables = self.tables.lock().await;
        let in_scope: Vec<TimeSlotId> = tables
            .slots
            .values()
            .filter(|s| s.chapter_id == chapter_id && s.date == date)
            .map(|s| s.id)
            .collect();

        let now = Utc::now();
        let mut change = SlotChange::default();
        for id in in_scope {
            let held = tables.is_held(id);
            let slot = tables.slot_mut(id)?;
            slot.is_disabled = false;
            slot.updated_at = now;
            // A held slot is unblocked but stays taken until its reservation releases it.
            if held {
                change.retained_held += 1;
            } else {
                slot.is_available = true;
                change.affected += 1;
            }
        }
        Ok(change)
    }

    async fn clear_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange> {
        Ok(self
            .tables
            .lock()
            .await
            .delete_unheld(chapter_id, Some(date)))
    }

    async fn clear_chapter(&self, chapter_id: ChapterId) -> AppResult<SlotChange> {
        Ok(self.tables.lock().await.delete_unheld(chapter_id, None))
    }

    async fn reschedule_slot(&self, id: TimeSlotId, plan: &SlotPlan) -> AppResult<TimeSlot> {
        let mut tables = self.tables.lock().await;
        let chapter_id = tables
            .slots
            .get(&id)
            .map(|s| s.chapter_id)
            .ok_or_else(|| AppError::not_found(format!("Time slot {id} not found")))?;
        if tables.is_held(id) {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }
        let clash = tables.slots.values().any(|s| {
            s.chapter_id == chapter_id && s.id != id && s.overlaps(plan.start_time, plan.end_time)
        });
        if clash {
            return Err(AppError::conflict(format!(
                "New interval for time slot {id} overlaps another slot"
            )));
        }

        let slot = tables.slot_mut(id)?;
        slot.date = plan.date;
        slot.start_time = plan.start_time;
        slot.end_time = plan.end_time;
        slot.updated_at = Utc::now();
        Ok(slot.clone())
    }

    async fn delete_slot(&self, id: TimeSlotId) -> AppResult<()> {
        let mut tables = self.tables.lock().await;
        if !tables.slots.contains_key(&id) {
            return Err(AppError::not_found(format!("Time slot {id} not found")));
        }
        if tables.is_held(id) {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {id} is held by an active reservation"
            )));
        }
        tables.remove_slots(&[id]);
        Ok(())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn bind_reservation(
        &self,
        new: &NewReservation,
        scenario_id: ScenarioId,
    ) -> AppResult<Reservation> {
        let mut tables = self.tables.lock().await;
        let held = tables.is_held(new.time_slot_id);
        let slot = tables
            .slots
            .get(&new.time_slot_id)
            .filter(|s| s.chapter_id == new.chapter_id)
            .ok_or_else(|| {
                AppError::not_found(format!(
                    "Time slot {} not found for chapter {}",
                    new.time_slot_id, new.chapter_id
                ))
            })?;
        if held || !slot.is_bookable() {
            return Err(AppError::slot_unavailable(format!(
                "Time slot {} is no longer available",
                slot.id
            )));
        }

        let now = Utc::now();
        let reservation = Reservation::pending(new.clone(), scenario_id, slot, now);
        let slot = tables.slot_mut(new.time_slot_id)?;
        slot.is_available = false;
        slot.updated_at = now;
        tables
            .reservations
            .insert(reservation.id, reservation.clone());
        Ok(reservation)
    }

    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>> {
        Ok(self.tables.lock().await.reservations.get(&id).cloned())
    }

    async fn find_reservations(
        &self,
        filter: &ReservationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Reservation>> {
        let tables = self.tables.lock().await;
        let mut matching: Vec<Reservation> = tables
            .reservations
            .values()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();
        matching.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.id.into_uuid().cmp(&b.id.into_uuid()))
        });
        Ok(page_of(matching, page))
    }

    async fn status_summary(&self) -> AppResult<StatusSummary> {
        let tables = self.tables.lock().await;
        let mut summary = StatusSummary::default();
        for r in tables.reservations.values() {
            summary.add(r.status, 1);
        }
        Ok(summary)
    }

    async fn transition(
        &self,
        id: ReservationId,
        expected: Option<ReservationStatus>,
        next: ReservationStatus,
    ) -> AppResult<Transition> {
        let mut tables = self.tables.lock().await;
        let current = tables
            .reservations
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;

        let previous = current.status;
        if let Some(expected) = expected
            && expected != previous
        {
            return Err(AppError::conflict(format!(
                "Reservation {id} is {previous}, not {expected}"
            )));
        }
        if !previous.can_transition_to(next) {
            return Err(AppError::conflict(format!(
                "Reservation {id} cannot move from {previous} to {next}"
            )));
        }

        let now = Utc::now();
        match (previous.holds_slot(), next.holds_slot(), current.time_slot_id) {
            (false, true, None) => {
                return Err(AppError::slot_unavailable(format!(
                    "The time slot of reservation {id} no longer exists"
                )));
            }
            (false, true, Some(slot_id)) => {
                let held = tables.is_held(slot_id);
                let slot = tables.slot_mut(slot_id)?;
                if held || !slot.is_bookable() {
                    return Err(AppError::slot_unavailable(format!(
                        "Time slot {slot_id} was taken since reservation {id} was declined"
                    )));
                }
                slot.is_available = false;
                slot.updated_at = now;
            }
            (true, false, Some(slot_id)) => {
                let other_holder = tables.reservations.values().any(|r| {
                    r.id != id && r.time_slot_id == Some(slot_id) && r.status.holds_slot()
                });
                let slot = tables.slot_mut(slot_id)?;
                if other_holder || slot.is_disabled {
                    warn!(reservation_id = %id, slot_id = %slot_id, "Time slot kept unavailable after release");
                } else {
                    slot.is_available = true;
                    slot.updated_at = now;
                }
            }
            _ => {}
        }

        let reservation = tables
            .reservations
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Reservation {id} not found")))?;
        reservation.status = next;
        reservation.updated_at = now;

        info!(reservation_id = %id, from = %previous, to = %next, "Reservation status changed");
        Ok(Transition {
            reservation: reservation.clone(),
            previous,
        })
    }
}

#[async_trait]
impl NotificationStore for MemoryStore {
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification> {
        self.tables
            .lock()
            .await
            .notifications
            .insert(notification.id, notification.clone());
        Ok(notification.clone())
    }

    async fn find_notifications(
        &self,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        let tables = self.tables.lock().await;
        let mut items: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| !(unread_only && n.is_read))
            .cloned()
            .collect();
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page_of(items, page))
    }

    async fn count_unread(&self) -> AppResult<u64> {
        let tables = self.tables.lock().await;
        Ok(tables.notifications.values().filter(|n| !n.is_read).count() as u64)
    }

    async fn mark_read(&self, id: NotificationId) -> AppResult<Notification> {
        let mut tables = self.tables.lock().await;
        let n = tables
            .notifications
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))?;
        if !n.is_read {
            n.is_read = true;
            n.read_at = Some(Utc::now());
        }
        Ok(n.clone())
    }

    async fn delete_notification(&self, id: NotificationId) -> AppResult<()> {
        self.tables
            .lock()
            .await
            .notifications
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::not_found(format!("Notification {id} not found")))
    }

    async fn clear_notifications(&self) -> AppResult<u64> {
        let mut tables = self.tables.lock().await;
        let count = tables.notifications.len() as u64;
        tables.notifications.clear();
        Ok(count)
    }
}
