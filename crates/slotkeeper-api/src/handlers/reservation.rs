//! Reservation handlers.
//!
//! Status and delete routes take the caller's view of the reservation's
//! bucket as the first path segment; a stale bucket is rejected.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use slotkeeper_core::types::ReservationId;
use slotkeeper_core::types::pagination::PageResponse;
use slotkeeper_entity::reservation::{Reservation, ReservationStatus, StatusSummary};
use slotkeeper_service::BulkReport;

use crate::dto::request::{
    BulkStatusRequest, CreateReservationRequest, ReservationListParams, UpdateStatusRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, OptionalAuthUser, ValidJson};
use crate::state::AppState;

/// POST /api/reservations
pub async fn create_reservation(
    State(state): State<AppState>,
    caller: OptionalAuthUser,
    ValidJson(req): ValidJson<CreateReservationRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Reservation>>), ApiError> {
    let reservation = state
        .reservation_service
        .create(&caller, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(reservation))))
}

/// GET /api/reservations
pub async fn list_reservations(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<ReservationListParams>,
) -> Result<Json<ApiResponse<PageResponse<Reservation>>>, ApiError> {
    let (filter, page) = params.into_parts()?;
    let result = state.reservation_service.list(&auth, &filter, page).await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// GET /api/reservations/summary
pub async fn summary(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<StatusSummary>>, ApiError> {
    let summary = state.reservation_service.summary(&auth).await?;
    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/reservations/{id}
pub async fn get_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<ReservationId>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let reservation = state.reservation_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// PUT /api/reservations/{source}/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath((source, id)): IdPath<(String, ReservationId)>,
    ValidJson(req): ValidJson<UpdateStatusRequest>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let source = ReservationStatus::from_bucket(&source)?;
    let reservation = state
        .reservation_service
        .update_status(&auth, id, Some(source), req.status)
        .await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// DELETE /api/reservations/{source}/{id}
pub async fn delete_reservation(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath((source, id)): IdPath<(String, ReservationId)>,
) -> Result<Json<ApiResponse<Reservation>>, ApiError> {
    let source = ReservationStatus::from_bucket(&source)?;
    let reservation = state
        .reservation_service
        .delete(&auth, id, Some(source))
        .await?;
    Ok(Json(ApiResponse::ok(reservation)))
}

/// POST /api/reservations/bulk-status
///
/// 200 when every reservation moved, 207 when at least one failed.
pub async fn bulk_status(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<BulkStatusRequest>,
) -> Result<
    (
        StatusCode,
        Json<ApiResponse<BulkReport<ReservationId, ReservationStatus>>>,
    ),
    ApiError,
> {
    let source = req.source()?;
    let report = state
        .reservation_service
        .bulk_update_status(&auth, &req.ids, source, req.status)
        .await?;
    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };
    Ok((status, Json(ApiResponse::ok(report))))
}
