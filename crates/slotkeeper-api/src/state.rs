//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use slotkeeper_auth::jwt::{JwtDecoder, JwtEncoder};
use slotkeeper_auth::rbac::RbacEnforcer;
use slotkeeper_core::config::AppConfig;
use slotkeeper_database::Stores;
use slotkeeper_service::{
    AvailabilityService, BulkService, CatalogService, EventPublisher, NotificationService,
    ReservationService, SlotGeneratorService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// When the state was built, for uptime reporting
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// Storage backend (PostgreSQL or in-memory)
    pub stores: Stores,
    /// Reservation event broadcast
    pub events: EventPublisher,

    // ── Auth ─────────────────────────────────────────────────
    /// JWT token encoder
    pub jwt_encoder: Arc<JwtEncoder>,
    /// JWT token decoder and validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Role-based access control enforcer
    pub rbac_enforcer: Arc<RbacEnforcer>,

    // ── Services ─────────────────────────────────────────────
    /// Scenario, chapter and price management
    pub catalog_service: Arc<CatalogService>,
    /// Slot generation
    pub generator_service: Arc<SlotGeneratorService>,
    /// Slot availability
    pub availability_service: Arc<AvailabilityService>,
    /// Reservation lifecycle
    pub reservation_service: Arc<ReservationService>,
    /// Bulk chapter actions
    pub bulk_service: Arc<BulkService>,
    /// Notification feed
    pub notification_service: Arc<NotificationService>,
}

impl AppState {
    /// Wires every service over the given stores.
    pub fn new(config: AppConfig, stores: Stores) -> Self {
        let jwt_encoder = Arc::new(JwtEncoder::new(&config.auth));
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth));
        let rbac_enforcer = Arc::new(RbacEnforcer::new());
        let events = EventPublisher::new(config.notifications.channel_capacity);

        let catalog_service = Arc::new(CatalogService::new(
            Arc::clone(&stores.scenarios),
            Arc::clone(&stores.chapters),
            Arc::clone(&stores.prices),
            Arc::clone(&rbac_enforcer),
        ));
        let generator_service = Arc::new(SlotGeneratorService::new(
            Arc::clone(&stores.chapters),
            Arc::clone(&stores.slots),
            Arc::clone(&rbac_enforcer),
            config.schedule.clone(),
        ));
        let availability_service = Arc::new(AvailabilityService::new(
            Arc::clone(&stores.chapters),
            Arc::clone(&stores.slots),
            Arc::clone(&rbac_enforcer),
            config.schedule.clone(),
        ));
        let notification_service = Arc::new(NotificationService::new(
            Arc::clone(&stores.notifications),
            Arc::clone(&rbac_enforcer),
            config.notifications.persist,
        ));
        let reservation_service = Arc::new(ReservationService::new(
            Arc::clone(&stores.chapters),
            Arc::clone(&stores.reservations),
            Arc::clone(&notification_service),
            events.clone(),
            Arc::clone(&rbac_enforcer),
        ));
        let bulk_service = Arc::new(BulkService::new(
            Arc::clone(&generator_service),
            Arc::clone(&availability_service),
            Arc::clone(&rbac_enforcer),
        ));

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            stores,
            events,
            jwt_encoder,
            jwt_decoder,
            rbac_enforcer,
            catalog_service,
            generator_service,
            availability_service,
            reservation_service,
            bulk_service,
            notification_service,
        }
    }
}
