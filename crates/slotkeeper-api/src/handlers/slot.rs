//! Time slot handlers: generation, listing, availability, and bulk actions.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use slotkeeper_core::types::{ChapterId, TimeSlotId};
use slotkeeper_database::store::SlotChange;
use slotkeeper_entity::slot::TimeSlot;
use slotkeeper_service::bulk::BulkOutcome;
use slotkeeper_service::{BulkReport, GenerationReport};

use crate::dto::request::{
    BulkSlotsRequest, DayRequest, GenerateSlotsRequest, RescheduleSlotRequest, SlotListParams,
    ToggleAvailabilityRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, ValidJson};
use crate::state::AppState;

/// POST /api/timeSlots
pub async fn generate_slots(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<GenerateSlotsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<GenerationReport>>), ApiError> {
    let report = state.generator_service.generate(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(report))))
}

/// GET /api/timeSlots
pub async fn list_slots(
    State(state): State<AppState>,
    Query(params): Query<SlotListParams>,
) -> Result<Json<ApiResponse<Vec<TimeSlot>>>, ApiError> {
    let slots = state.availability_service.list(&params.into()).await?;
    Ok(Json(ApiResponse::ok(slots)))
}

/// GET /api/timeSlots/{id}
pub async fn get_slot(
    State(state): State<AppState>,
    IdPath(id): IdPath<TimeSlotId>,
) -> Result<Json<ApiResponse<TimeSlot>>, ApiError> {
    let slot = state.availability_service.get(id).await?;
    Ok(Json(ApiResponse::ok(slot)))
}

/// PUT /api/timeSlots/{id}
pub async fn reschedule_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<TimeSlotId>,
    ValidJson(req): ValidJson<RescheduleSlotRequest>,
) -> Result<Json<ApiResponse<TimeSlot>>, ApiError> {
    let slot = state
        .availability_service
        .reschedule(&auth, id, req.window()?)
        .await?;
    Ok(Json(ApiResponse::ok(slot)))
}

/// DELETE /api/timeSlots/{id}
pub async fn delete_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<TimeSlotId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.availability_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Time slot deleted"))))
}

/// PUT /api/timeSlots/{id}/toggle-availability
pub async fn toggle_availability(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<TimeSlotId>,
    ValidJson(req): ValidJson<ToggleAvailabilityRequest>,
) -> Result<Json<ApiResponse<TimeSlot>>, ApiError> {
    let slot = state
        .availability_service
        .toggle(&auth, id, req.is_available)
        .await?;
    Ok(Json(ApiResponse::ok(slot)))
}

/// DELETE /api/timeSlots/clear-all/{chapterId}
pub async fn clear_all(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chapter_id): IdPath<ChapterId>,
) -> Result<Json<ApiResponse<SlotChange>>, ApiError> {
    let change = state
        .availability_service
        .clear_all(&auth, chapter_id)
        .await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// DELETE /api/timeSlots/clear-day/{chapterId}
pub async fn clear_day(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chapter_id): IdPath<ChapterId>,
    ValidJson(req): ValidJson<DayRequest>,
) -> Result<Json<ApiResponse<SlotChange>>, ApiError> {
    let change = state
        .availability_service
        .clear_day(&auth, chapter_id, req.date)
        .await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// PUT /api/timeSlots/disable-day/{chapterId}
pub async fn disable_day(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chapter_id): IdPath<ChapterId>,
    ValidJson(req): ValidJson<DayRequest>,
) -> Result<Json<ApiResponse<SlotChange>>, ApiError> {
    let change = state
        .availability_service
        .disable_day(&auth, chapter_id, req.date)
        .await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// PUT /api/timeSlots/enable-day/{chapterId}
pub async fn enable_day(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(chapter_id): IdPath<ChapterId>,
    ValidJson(req): ValidJson<DayRequest>,
) -> Result<Json<ApiResponse<SlotChange>>, ApiError> {
    let change = state
        .availability_service
        .enable_day(&auth, chapter_id, req.date)
        .await?;
    Ok(Json(ApiResponse::ok(change)))
}

/// POST /api/timeSlots/bulk
///
/// 200 when every chapter succeeded, 207 when at least one failed.
pub async fn bulk_action(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<BulkSlotsRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BulkReport<ChapterId, BulkOutcome>>>), ApiError> {
    let report = state
        .bulk_service
        .apply(&auth, &req.chapter_ids, &req.action)
        .await?;
    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::ok(report))))
}
