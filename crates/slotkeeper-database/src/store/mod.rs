//! Storage traits and their outcome types.
//!
//! Every method that changes slot availability is atomic: the PostgreSQL
//! repositories run it in one transaction with row locks, the memory store
//! runs it under a single mutex guard.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use slotkeeper_core::config::{DatabaseConfig, DatabaseProvider};
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
use slotkeeper_entity::slot::{SlotPlan, TimeSlot};

use crate::connection::DatabasePool;
use crate::repositories::{
    ChapterRepository, NotificationRepository, PriceRepository, ReservationRepository,
    ScenarioRepository, TimeSlotRepository,
};

pub use memory::MemoryStore;

/// Filter for slot listings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlotQuery {
    /// Only slots of chapters in this scenario.
    pub scenario_id: Option<ScenarioId>,
    /// Only slots of this chapter.
    pub chapter_id: Option<ChapterId>,
    /// Only slots on this exact date.
    pub date: Option<NaiveDate>,
    /// Only slots on or after this date.
    pub from: Option<NaiveDate>,
    /// Only slots on or before this date.
    pub to: Option<NaiveDate>,
    /// Only slots that can take a reservation right now.
    pub only_bookable: bool,
}

impl SlotQuery {
    /// In-process evaluation of every filter but `scenario_id`, which needs
    /// the chapter table.
    pub fn matches(&self, slot: &TimeSlot) -> bool {
        self.chapter_id.is_none_or(|c| c == slot.chapter_id)
            && self.date.is_none_or(|d| d == slot.date)
            && self.from.is_none_or(|d| slot.date >= d)
            && self.to.is_none_or(|d| slot.date <= d)
            && (!self.only_bookable || slot.is_bookable())
    }
}

/// Result of inserting a batch of planned slots for one chapter.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsertOutcome {
    /// Slots that were created.
    pub created: Vec<TimeSlot>,
    /// Dates skipped because a slot with the same start already exists.
    pub skipped_existing: Vec<NaiveDate>,
    /// Dates skipped because another slot overlaps the planned interval.
    pub conflicts: Vec<NaiveDate>,
}

/// Result of a day- or chapter-scoped bulk slot change.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotChange {
    /// Slots that were updated or deleted.
    pub affected: u64,
    /// Slots left untouched because an active reservation holds them.
    pub retained_held: u64,
}

/// What a chapter deletion removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterRemoval {
    /// Slots deleted with the chapter.
    pub slots_deleted: u64,
    /// Inactive reservations deleted with the chapter.
    pub reservations_deleted: u64,
}

/// A reservation after a status change, with the status it left.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// The updated reservation.
    pub reservation: Reservation,
    /// Status before the change.
    pub previous: ReservationStatus,
}

/// Scenario persistence.
#[async_trait]
pub trait ScenarioStore: Send + Sync + 'static {
    /// All scenarios ordered by name.
    async fn find_all_scenarios(&self) -> AppResult<Vec<Scenario>>;
    /// Find a scenario by ID.
    async fn find_scenario(&self, id: ScenarioId) -> AppResult<Option<Scenario>>;
    /// Insert a new scenario.
    async fn insert_scenario(&self, scenario: &Scenario) -> AppResult<Scenario>;
    /// Overwrite an existing scenario.
    async fn update_scenario(&self, scenario: &Scenario) -> AppResult<Scenario>;
    /// Delete a scenario. Fails with `Conflict` while chapters reference it.
    async fn delete_scenario(&self, id: ScenarioId) -> AppResult<()>;
}

/// Chapter persistence.
#[async_trait]
pub trait ChapterStore: Send + Sync + 'static {
    /// All chapters, optionally restricted to one scenario.
    async fn find_chapters(&self, scenario_id: Option<ScenarioId>) -> AppResult<Vec<Chapter>>;
    /// Find a chapter by ID.
    async fn find_chapter(&self, id: ChapterId) -> AppResult<Option<Chapter>>;
    /// Insert a new chapter.
    async fn insert_chapter(&self, chapter: &Chapter) -> AppResult<Chapter>;
    /// Overwrite an existing chapter.
    async fn update_chapter(&self, chapter: &Chapter) -> AppResult<Chapter>;
    /// Delete a chapter with its slots and inactive reservations.
    ///
    /// Fails with `Conflict` while a pending or approved reservation exists.
    async fn delete_chapter(&self, id: ChapterId) -> AppResult<ChapterRemoval>;
}

/// Price rule persistence.
#[async_trait]
pub trait PriceStore: Send + Sync + 'static {
    /// All rules ordered by players count.
    async fn find_all_prices(&self) -> AppResult<Vec<Price>>;
    /// Find a rule by ID.
    async fn find_price(&self, id: PriceId) -> AppResult<Option<Price>>;
    /// Insert a new rule.
    async fn insert_price(&self, price: &Price) -> AppResult<Price>;
    /// Overwrite an existing rule.
    async fn update_price(&self, price: &Price) -> AppResult<Price>;
    /// Delete a rule.
    async fn delete_price(&self, id: PriceId) -> AppResult<()>;
}

/// Time slot persistence and availability changes.
#[async_trait]
pub trait SlotStore: Send + Sync + 'static {
    /// Slots matching `query`, ordered by start time.
    async fn find_slots(&self, query: &SlotQuery) -> AppResult<Vec<TimeSlot>>;
    /// Find a slot by ID.
    async fn find_slot(&self, id: TimeSlotId) -> AppResult<Option<TimeSlot>>;
    /// Insert planned slots for one chapter, skipping duplicates and overlaps.
    async fn insert_planned(
        &self,
        chapter_id: ChapterId,
        plans: &[SlotPlan],
    ) -> AppResult<InsertOutcome>;
    /// Set a single slot's availability.
    ///
    /// `false` blocks the slot. `true` lifts the block and fails with
    /// `SlotUnavailable` while an active reservation holds the slot.
    async fn set_availability(&self, id: TimeSlotId, is_available: bool) -> AppResult<TimeSlot>;
    /// Block every slot of a chapter on `date`.
    async fn disable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange>;
    /// Unblock every slot of a chapter on `date`.
    ///
    /// Slots an active reservation holds lose the block but stay
    /// unavailable until that reservation releases them.
    async fn enable_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange>;
    /// Delete every unheld slot of a chapter on `date`.
    async fn clear_day(&self, chapter_id: ChapterId, date: NaiveDate) -> AppResult<SlotChange>;
    /// Delete every unheld slot of a chapter.
    async fn clear_chapter(&self, chapter_id: ChapterId) -> AppResult<SlotChange>;
    /// Move a slot to a new interval on its date.
    ///
    /// Fails with `SlotUnavailable` when held and `Conflict` on overlap.
    async fn reschedule_slot(&self, id: TimeSlotId, plan: &SlotPlan) -> AppResult<TimeSlot>;
    /// Delete one slot. Fails with `SlotUnavailable` when held.
    async fn delete_slot(&self, id: TimeSlotId) -> AppResult<()>;
}

/// Reservation persistence and slot binding.
#[async_trait]
pub trait ReservationStore: Send + Sync + 'static {
    /// Create a pending reservation and take its slot in one step.
    ///
    /// Fails with `NotFound` when the slot does not exist or belongs to
    /// another chapter and `SlotUnavailable` when it is not bookable.
    async fn bind_reservation(
        &self,
        new: &NewReservation,
        scenario_id: ScenarioId,
    ) -> AppResult<Reservation>;
    /// Find a reservation by ID.
    async fn find_reservation(&self, id: ReservationId) -> AppResult<Option<Reservation>>;
    /// Page through reservations matching `filter`, newest first.
    async fn find_reservations(
        &self,
        filter: &ReservationFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Reservation>>;
    /// Number of reservations per bucket.
    async fn status_summary(&self) -> AppResult<StatusSummary>;
    /// Move a reservation to `next`, taking or releasing its slot.
    ///
    /// When `expected` is set, the stored status must equal it or the call
    /// fails with `Conflict`. Illegal transitions fail with `Conflict`.
    async fn transition(
        &self,
        id: ReservationId,
        expected: Option<ReservationStatus>,
        next: ReservationStatus,
    ) -> AppResult<Transition>;
}

/// Admin notification feed persistence.
#[async_trait]
pub trait NotificationStore: Send + Sync + 'static {
    /// Insert a notification.
    async fn insert_notification(&self, notification: &Notification) -> AppResult<Notification>;
    /// Page through notifications, newest first.
    async fn find_notifications(
        &self,
        unread_only: bool,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>>;
    /// Number of unread notifications.
    async fn count_unread(&self) -> AppResult<u64>;
    /// Mark one notification read.
    async fn mark_read(&self, id: NotificationId) -> AppResult<Notification>;
    /// Delete one notification.
    async fn delete_notification(&self, id: NotificationId) -> AppResult<()>;
    /// Delete every notification, returning how many were removed.
    async fn clear_notifications(&self) -> AppResult<u64>;
}

/// Which backend a [`Stores`] bundle talks to.
#[derive(Debug, Clone)]
pub enum Backend {
    /// PostgreSQL pool.
    Postgres(DatabasePool),
    /// In-process tables.
    Memory,
}

/// The full set of stores the services depend on.
#[derive(Clone)]
pub struct Stores {
    /// Scenario store.
    pub scenarios: Arc<dyn ScenarioStore>,
    /// Chapter store.
    pub chapters: Arc<dyn ChapterStore>,
    /// Price store.
    pub prices: Arc<dyn PriceStore>,
    /// Slot store.
    pub slots: Arc<dyn SlotStore>,
    /// Reservation store.
    pub reservations: Arc<dyn ReservationStore>,
    /// Notification store.
    pub notifications: Arc<dyn NotificationStore>,
    /// Backend handle for health checks and shutdown.
    pub backend: Backend,
}

impl Stores {
    /// Stores backed by PostgreSQL repositories sharing one pool.
    pub fn postgres(db: DatabasePool) -> Self {
        let pool = db.pool().clone();
        Self {
            scenarios: Arc::new(ScenarioRepository::new(pool.clone())),
            chapters: Arc::new(ChapterRepository::new(pool.clone())),
            prices: Arc::new(PriceRepository::new(pool.clone())),
            slots: Arc::new(TimeSlotRepository::new(pool.clone())),
            reservations: Arc::new(ReservationRepository::new(pool.clone())),
            notifications: Arc::new(NotificationRepository::new(pool)),
            backend: Backend::Postgres(db),
        }
    }

    /// Stores backed by one shared in-memory table set.
    pub fn memory() -> Self {
        let store = MemoryStore::new();
        Self {
            scenarios: Arc::new(store.clone()),
            chapters: Arc::new(store.clone()),
            prices: Arc::new(store.clone()),
            slots: Arc::new(store.clone()),
            reservations: Arc::new(store.clone()),
            notifications: Arc::new(store),
            backend: Backend::Memory,
        }
    }

    /// Connect according to configuration, running migrations when asked.
    pub async fn from_config(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider {
            DatabaseProvider::Memory => {
                tracing::warn!("Using in-memory store; data is lost on restart");
                Ok(Self::memory())
            }
            DatabaseProvider::Postgres => {
                let db = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    crate::migration::run_migrations(db.pool()).await?;
                }
                Ok(Self::postgres(db))
            }
        }
    }

    /// Check that the backend is reachable.
    pub async fn health_check(&self) -> AppResult<bool> {
        match &self.backend {
            Backend::Postgres(db) => db.health_check().await,
            Backend::Memory => Ok(true),
        }
    }

    /// Name of the backend for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Postgres(_) => "postgres",
            Backend::Memory => "memory",
        }
    }

    /// Release backend resources.
    pub async fn close(&self) {
        if let Backend::Postgres(db) = &self.backend {
            db.close().await;
        }
    }
}
