//! Request DTOs with validation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use slotkeeper_core::error::AppError;
use slotkeeper_core::types::pagination::{DEFAULT_PER_PAGE, PageRequest};
use slotkeeper_core::types::{ChapterId, ReservationId, ScenarioId, TimeSlotId};
use slotkeeper_database::store::SlotQuery;
use slotkeeper_entity::chapter::{CreateChapter, Difficulty, UpdateChapter};
use slotkeeper_entity::price::{CreatePrice, UpdatePrice};
use slotkeeper_entity::reservation::{
    Language, NewReservation, ReservationFilter, ReservationStatus,
};
use slotkeeper_entity::scenario::{CreateScenario, UpdateScenario};
use slotkeeper_entity::slot::{DateRange, TimeWindow};
use slotkeeper_service::{BulkAction, GenerateSlots};

// ── Time slots ───────────────────────────────────────────────

/// Slot generation request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct GenerateSlotsRequest {
    /// Chapter to generate for.
    pub chapter_id: ChapterId,
    /// Inclusive date range.
    pub date_range: DateRange,
    /// Window used Monday to Friday.
    pub weekday_time: TimeWindow,
    /// Window used Saturday and Sunday.
    #[serde(default)]
    pub weekend_time: Option<TimeWindow>,
    /// Further windows generated on every day.
    #[serde(default)]
    pub time_ranges: Vec<TimeWindow>,
}

impl From<GenerateSlotsRequest> for GenerateSlots {
    fn from(req: GenerateSlotsRequest) -> Self {
        Self {
            chapter_id: req.chapter_id,
            date_range: req.date_range,
            weekday_time: req.weekday_time,
            weekend_time: req.weekend_time,
            time_ranges: req.time_ranges,
        }
    }
}

/// Query parameters for `GET /timeSlots`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlotListParams {
    /// Only chapters of this scenario.
    pub scenario_id: Option<ScenarioId>,
    /// Only this chapter.
    pub chapter_id: Option<ChapterId>,
    /// Only this date.
    pub date: Option<NaiveDate>,
    /// Only on or after this date.
    pub from: Option<NaiveDate>,
    /// Only on or before this date.
    pub to: Option<NaiveDate>,
    /// Only slots that can be booked now.
    #[serde(default)]
    pub bookable: Option<bool>,
}

impl From<SlotListParams> for SlotQuery {
    fn from(p: SlotListParams) -> Self {
        Self {
            scenario_id: p.scenario_id,
            chapter_id: p.chapter_id,
            date: p.date,
            from: p.from,
            to: p.to,
            only_bookable: p.bookable.unwrap_or(false),
        }
    }
}

/// Toggle availability request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ToggleAvailabilityRequest {
    /// Target availability.
    pub is_available: bool,
}

/// Body for the day-scoped slot operations.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DayRequest {
    /// Target date.
    pub date: NaiveDate,
}

/// Single slot edit request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleSlotRequest {
    /// New start time of day, `HH:MM`.
    #[validate(length(min = 4, max = 8))]
    pub start_time: String,
    /// New end time of day, `HH:MM`.
    #[validate(length(min = 4, max = 8))]
    pub end_time: String,
}

impl RescheduleSlotRequest {
    /// Parse into a window.
    pub fn window(&self) -> Result<TimeWindow, AppError> {
        TimeWindow::parse(&self.start_time, &self.end_time)
    }
}

/// Bulk slot operation over several chapters.
///
/// The action fields sit next to `chapterIds`:
/// `{"chapterIds": [...], "action": "disableDay", "date": "2025-03-01"}`.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkSlotsRequest {
    /// Target chapters.
    #[validate(length(min = 1, message = "Select at least one chapter"))]
    pub chapter_ids: Vec<ChapterId>,
    /// Operation to apply.
    #[serde(flatten)]
    pub action: BulkAction,
}

// ── Reservations ─────────────────────────────────────────────

/// Public booking request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    /// Chapter being booked.
    pub chapter_id: ChapterId,
    /// Slot being booked.
    pub time_slot_id: TimeSlotId,
    /// Contact name.
    #[validate(length(min = 1, max = 200, message = "Name is required"))]
    pub name: String,
    /// Contact email.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Contact phone.
    #[validate(length(min = 6, max = 32))]
    pub phone: String,
    /// Party size.
    #[validate(range(min = 1, message = "Party size must be at least 1"))]
    pub people: i32,
    /// Session language.
    pub language: Language,
}

impl From<CreateReservationRequest> for NewReservation {
    fn from(req: CreateReservationRequest) -> Self {
        Self {
            chapter_id: req.chapter_id,
            time_slot_id: req.time_slot_id,
            name: req.name,
            email: req.email,
            phone: req.phone,
            people: req.people,
            language: req.language,
        }
    }
}

/// Status change request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateStatusRequest {
    /// Target status.
    pub status: ReservationStatus,
}

/// Bulk reservation status request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct BulkStatusRequest {
    /// Target reservations.
    #[validate(length(min = 1, message = "Select at least one reservation"))]
    pub ids: Vec<ReservationId>,
    /// Target status.
    pub status: ReservationStatus,
    /// Bucket the caller believes every reservation is in.
    #[serde(default)]
    pub source: Option<String>,
}

impl BulkStatusRequest {
    /// Resolve the optional source bucket.
    pub fn source(&self) -> Result<Option<ReservationStatus>, AppError> {
        self.source
            .as_deref()
            .map(ReservationStatus::from_bucket)
            .transpose()
    }
}

/// Query parameters for `GET /reservations`.
///
/// Pagination fields are listed here rather than flattened so that
/// numbers parse from the query string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListParams {
    /// Status bucket.
    pub status: Option<String>,
    /// Slot date.
    pub date: Option<NaiveDate>,
    /// Chapter.
    pub chapter_id: Option<ChapterId>,
    /// Scenario.
    pub scenario_id: Option<ScenarioId>,
    /// Session language.
    pub language: Option<Language>,
    /// Case-insensitive match on name or email.
    pub search: Option<String>,
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page.
    pub per_page: Option<u64>,
}

impl ReservationListParams {
    /// Split into the store filter and page request.
    pub fn into_parts(self) -> Result<(ReservationFilter, PageRequest), AppError> {
        let status = self
            .status
            .as_deref()
            .map(ReservationStatus::from_bucket)
            .transpose()?;
        let filter = ReservationFilter {
            status,
            date: self.date,
            chapter_id: self.chapter_id,
            scenario_id: self.scenario_id,
            language: self.language,
            search: self.search.filter(|s| !s.trim().is_empty()),
        };
        let page = PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        );
        Ok((filter, page))
    }
}

// ── Catalog ──────────────────────────────────────────────────

/// Create scenario request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateScenarioRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "Scenario name is required"))]
    pub name: String,
    /// Category label.
    pub category: Option<String>,
    /// Long description.
    pub description: Option<String>,
}

impl From<CreateScenarioRequest> for CreateScenario {
    fn from(req: CreateScenarioRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            description: req.description,
        }
    }
}

/// Update scenario request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct UpdateScenarioRequest {
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Category label.
    pub category: Option<String>,
    /// Long description.
    pub description: Option<String>,
}

impl From<UpdateScenarioRequest> for UpdateScenario {
    fn from(req: UpdateScenarioRequest) -> Self {
        Self {
            name: req.name,
            category: req.category,
            description: req.description,
        }
    }
}

/// Create chapter request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateChapterRequest {
    /// Parent scenario.
    pub scenario_id: ScenarioId,
    /// Display name.
    #[validate(length(min = 1, max = 200, message = "Chapter name is required"))]
    pub name: String,
    /// Smallest party.
    #[validate(range(min = 1))]
    pub min_player_number: i32,
    /// Largest party.
    #[validate(range(min = 1))]
    pub max_player_number: i32,
    /// Session length.
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i32,
    /// Difficulty.
    pub difficulty: Difficulty,
    /// Historical success rate.
    #[validate(range(min = 0, max = 100))]
    pub percentage_of_success: Option<i32>,
    /// Long description.
    pub description: Option<String>,
    /// Venue.
    pub place: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Video reference.
    pub video: Option<String>,
}

impl From<CreateChapterRequest> for CreateChapter {
    fn from(req: CreateChapterRequest) -> Self {
        Self {
            scenario_id: req.scenario_id,
            name: req.name,
            min_player_number: req.min_player_number,
            max_player_number: req.max_player_number,
            duration_minutes: req.duration_minutes,
            difficulty: req.difficulty,
            percentage_of_success: req.percentage_of_success,
            description: req.description,
            place: req.place,
            image: req.image,
            video: req.video,
        }
    }
}

/// Update chapter request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateChapterRequest {
    /// Parent scenario.
    pub scenario_id: Option<ScenarioId>,
    /// Display name.
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    /// Smallest party.
    #[validate(range(min = 1))]
    pub min_player_number: Option<i32>,
    /// Largest party.
    #[validate(range(min = 1))]
    pub max_player_number: Option<i32>,
    /// Session length.
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: Option<i32>,
    /// Difficulty.
    pub difficulty: Option<Difficulty>,
    /// Historical success rate.
    #[validate(range(min = 0, max = 100))]
    pub percentage_of_success: Option<i32>,
    /// Long description.
    pub description: Option<String>,
    /// Venue.
    pub place: Option<String>,
    /// Image reference.
    pub image: Option<String>,
    /// Video reference.
    pub video: Option<String>,
}

impl From<UpdateChapterRequest> for UpdateChapter {
    fn from(req: UpdateChapterRequest) -> Self {
        Self {
            scenario_id: req.scenario_id,
            name: req.name,
            min_player_number: req.min_player_number,
            max_player_number: req.max_player_number,
            duration_minutes: req.duration_minutes,
            difficulty: req.difficulty,
            percentage_of_success: req.percentage_of_success,
            description: req.description,
            place: req.place,
            image: req.image,
            video: req.video,
        }
    }
}

/// Query parameters for `GET /chapters`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterListParams {
    /// Only chapters of this scenario.
    pub scenario_id: Option<ScenarioId>,
}

/// Create price request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePriceRequest {
    /// Party size the rule applies to.
    #[validate(range(min = 1))]
    pub players_count: i32,
    /// Also applies to larger parties.
    #[serde(default)]
    pub is_and_above: bool,
    /// Price per person in minor units.
    #[validate(range(min = 1))]
    pub price_per_person: i64,
    /// ISO 4217 currency code.
    #[validate(length(equal = 3, message = "Currency must be a 3-letter code"))]
    pub currency: String,
}

impl From<CreatePriceRequest> for CreatePrice {
    fn from(req: CreatePriceRequest) -> Self {
        Self {
            players_count: req.players_count,
            is_and_above: req.is_and_above,
            price_per_person: req.price_per_person,
            currency: req.currency,
        }
    }
}

/// Update price request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePriceRequest {
    /// Party size the rule applies to.
    #[validate(range(min = 1))]
    pub players_count: Option<i32>,
    /// Also applies to larger parties.
    pub is_and_above: Option<bool>,
    /// Price per person in minor units.
    #[validate(range(min = 1))]
    pub price_per_person: Option<i64>,
    /// ISO 4217 currency code.
    #[validate(length(equal = 3))]
    pub currency: Option<String>,
}

impl From<UpdatePriceRequest> for UpdatePrice {
    fn from(req: UpdatePriceRequest) -> Self {
        Self {
            players_count: req.players_count,
            is_and_above: req.is_and_above,
            price_per_person: req.price_per_person,
            currency: req.currency,
        }
    }
}

/// Query parameters for `GET /prices/quote`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteParams {
    /// Party size to price.
    pub party_size: i32,
}

// ── Notifications ────────────────────────────────────────────

/// Query parameters for `GET /notifications`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationListParams {
    /// Only unread notifications.
    pub unread: Option<bool>,
    /// Page number (1-based).
    pub page: Option<u64>,
    /// Items per page.
    pub per_page: Option<u64>,
}

impl NotificationListParams {
    /// Page request with defaults applied.
    pub fn page_request(&self) -> PageRequest {
        PageRequest::new(
            self.page.unwrap_or(1),
            self.per_page.unwrap_or(DEFAULT_PER_PAGE),
        )
    }
}
