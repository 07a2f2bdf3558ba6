//! Route definitions for the Slotkeeper HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.
//! Sibling routes that share a parameter position use the same parameter
//! name, which the path matcher requires.

use axum::Router;
use axum::routing::{delete, get, post, put};

use crate::handlers;
use crate::state::AppState;

/// Build the API router without the outer middleware layers.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(slot_routes())
        .merge(reservation_routes())
        .merge(catalog_routes())
        .merge(notification_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Slot generation, availability, and bulk chapter actions
fn slot_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/timeSlots",
            get(handlers::slot::list_slots).post(handlers::slot::generate_slots),
        )
        .route("/timeSlots/bulk", post(handlers::slot::bulk_action))
        .route(
            "/timeSlots/{id}",
            get(handlers::slot::get_slot)
                .put(handlers::slot::reschedule_slot)
                .delete(handlers::slot::delete_slot),
        )
        .route(
            "/timeSlots/{id}/toggle-availability",
            put(handlers::slot::toggle_availability),
        )
        .route(
            "/timeSlots/clear-all/{chapter_id}",
            delete(handlers::slot::clear_all),
        )
        .route(
            "/timeSlots/clear-day/{chapter_id}",
            delete(handlers::slot::clear_day),
        )
        .route(
            "/timeSlots/disable-day/{chapter_id}",
            put(handlers::slot::disable_day),
        )
        .route(
            "/timeSlots/enable-day/{chapter_id}",
            put(handlers::slot::enable_day),
        )
}

/// Booking, queries, and status transitions
fn reservation_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/reservations",
            get(handlers::reservation::list_reservations)
                .post(handlers::reservation::create_reservation),
        )
        .route("/reservations/summary", get(handlers::reservation::summary))
        .route(
            "/reservations/bulk-status",
            post(handlers::reservation::bulk_status),
        )
        .route(
            "/reservations/{key}",
            get(handlers::reservation::get_reservation),
        )
        .route(
            "/reservations/{key}/{id}",
            delete(handlers::reservation::delete_reservation),
        )
        .route(
            "/reservations/{key}/{id}/status",
            put(handlers::reservation::update_status),
        )
}

/// Scenario, chapter, and price management
fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/scenarios",
            get(handlers::catalog::list_scenarios).post(handlers::catalog::create_scenario),
        )
        .route(
            "/scenarios/{id}",
            get(handlers::catalog::get_scenario)
                .put(handlers::catalog::update_scenario)
                .delete(handlers::catalog::delete_scenario),
        )
        .route(
            "/chapters",
            get(handlers::catalog::list_chapters).post(handlers::catalog::create_chapter),
        )
        .route(
            "/chapters/{id}",
            get(handlers::catalog::get_chapter)
                .put(handlers::catalog::update_chapter)
                .delete(handlers::catalog::delete_chapter),
        )
        .route(
            "/prices",
            get(handlers::catalog::list_prices).post(handlers::catalog::create_price),
        )
        .route("/prices/quote", get(handlers::catalog::quote))
        .route(
            "/prices/{id}",
            get(handlers::catalog::get_price)
                .put(handlers::catalog::update_price)
                .delete(handlers::catalog::delete_price),
        )
}

/// Admin notification feed
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications)
                .delete(handlers::notification::clear_notifications),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}",
            delete(handlers::notification::delete_notification),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
}

/// Liveness and readiness
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}
