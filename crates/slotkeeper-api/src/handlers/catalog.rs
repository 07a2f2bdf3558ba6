//! Scenario, chapter and price handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use slotkeeper_core::types::{ChapterId, PriceId, ScenarioId};
use slotkeeper_database::store::ChapterRemoval;
use slotkeeper_entity::chapter::Chapter;
use slotkeeper_entity::price::{Price, Quote};
use slotkeeper_entity::scenario::Scenario;

use crate::dto::request::{
    ChapterListParams, CreateChapterRequest, CreatePriceRequest, CreateScenarioRequest,
    QuoteParams, UpdateChapterRequest, UpdatePriceRequest, UpdateScenarioRequest,
};
use crate::dto::response::{ApiResponse, MessageResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, IdPath, ValidJson};
use crate::state::AppState;

// ── Scenarios ────────────────────────────────────────────────

/// GET /api/scenarios
pub async fn list_scenarios(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Scenario>>>, ApiError> {
    let scenarios = state.catalog_service.list_scenarios().await?;
    Ok(Json(ApiResponse::ok(scenarios)))
}

/// GET /api/scenarios/{id}
pub async fn get_scenario(
    State(state): State<AppState>,
    IdPath(id): IdPath<ScenarioId>,
) -> Result<Json<ApiResponse<Scenario>>, ApiError> {
    let scenario = state.catalog_service.get_scenario(id).await?;
    Ok(Json(ApiResponse::ok(scenario)))
}

/// POST /api/scenarios
pub async fn create_scenario(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateScenarioRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Scenario>>), ApiError> {
    let scenario = state
        .catalog_service
        .create_scenario(&auth, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(scenario))))
}

/// PUT /api/scenarios/{id}
pub async fn update_scenario(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<ScenarioId>,
    ValidJson(req): ValidJson<UpdateScenarioRequest>,
) -> Result<Json<ApiResponse<Scenario>>, ApiError> {
    let scenario = state
        .catalog_service
        .update_scenario(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(scenario)))
}

/// DELETE /api/scenarios/{id}
pub async fn delete_scenario(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<ScenarioId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.catalog_service.delete_scenario(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Scenario deleted"))))
}

// ── Chapters ─────────────────────────────────────────────────

/// GET /api/chapters
pub async fn list_chapters(
    State(state): State<AppState>,
    Query(params): Query<ChapterListParams>,
) -> Result<Json<ApiResponse<Vec<Chapter>>>, ApiError> {
    let chapters = state
        .catalog_service
        .list_chapters(params.scenario_id)
        .await?;
    Ok(Json(ApiResponse::ok(chapters)))
}

/// GET /api/chapters/{id}
pub async fn get_chapter(
    State(state): State<AppState>,
    IdPath(id): IdPath<ChapterId>,
) -> Result<Json<ApiResponse<Chapter>>, ApiError> {
    let chapter = state.catalog_service.get_chapter(id).await?;
    Ok(Json(ApiResponse::ok(chapter)))
}

/// POST /api/chapters
pub async fn create_chapter(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreateChapterRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Chapter>>), ApiError> {
    let chapter = state
        .catalog_service
        .create_chapter(&auth, req.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(chapter))))
}

/// PUT /api/chapters/{id}
pub async fn update_chapter(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<ChapterId>,
    ValidJson(req): ValidJson<UpdateChapterRequest>,
) -> Result<Json<ApiResponse<Chapter>>, ApiError> {
    let chapter = state
        .catalog_service
        .update_chapter(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(chapter)))
}

/// DELETE /api/chapters/{id}
pub async fn delete_chapter(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<ChapterId>,
) -> Result<Json<ApiResponse<ChapterRemoval>>, ApiError> {
    let removal = state.catalog_service.delete_chapter(&auth, id).await?;
    Ok(Json(ApiResponse::ok(removal)))
}

// ── Prices ───────────────────────────────────────────────────

/// GET /api/prices
pub async fn list_prices(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Price>>>, ApiError> {
    let prices = state.catalog_service.list_prices().await?;
    Ok(Json(ApiResponse::ok(prices)))
}

/// GET /api/prices/quote?partySize=
pub async fn quote(
    State(state): State<AppState>,
    Query(params): Query<QuoteParams>,
) -> Result<Json<ApiResponse<Quote>>, ApiError> {
    let quote = state.catalog_service.quote(params.party_size).await?;
    Ok(Json(ApiResponse::ok(quote)))
}

/// GET /api/prices/{id}
pub async fn get_price(
    State(state): State<AppState>,
    IdPath(id): IdPath<PriceId>,
) -> Result<Json<ApiResponse<Price>>, ApiError> {
    let price = state.catalog_service.get_price(id).await?;
    Ok(Json(ApiResponse::ok(price)))
}

/// POST /api/prices
pub async fn create_price(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidJson(req): ValidJson<CreatePriceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Price>>), ApiError> {
    let price = state.catalog_service.create_price(&auth, req.into()).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(price))))
}

/// PUT /api/prices/{id}
pub async fn update_price(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<PriceId>,
    ValidJson(req): ValidJson<UpdatePriceRequest>,
) -> Result<Json<ApiResponse<Price>>, ApiError> {
    let price = state
        .catalog_service
        .update_price(&auth, id, req.into())
        .await?;
    Ok(Json(ApiResponse::ok(price)))
}

/// DELETE /api/prices/{id}
pub async fn delete_price(
    State(state): State<AppState>,
    auth: AuthUser,
    IdPath(id): IdPath<PriceId>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    state.catalog_service.delete_price(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new("Price deleted"))))
}
