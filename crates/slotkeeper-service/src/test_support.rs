//! Shared fixtures for service tests.

use std::sync::Arc;

use chrono::NaiveDate;

use slotkeeper_auth::rbac::RbacEnforcer;
use slotkeeper_core::config::ScheduleConfig;
use slotkeeper_core::types::TimeSlotId;
use slotkeeper_database::Stores;
use slotkeeper_entity::chapter::{Chapter, CreateChapter, Difficulty};
use slotkeeper_entity::reservation::{Language, NewReservation};
use slotkeeper_entity::scenario::CreateScenario;
use slotkeeper_entity::slot::{DateRange, TimeSlot, TimeWindow};
use slotkeeper_entity::user::UserRole;

use crate::{
    AvailabilityService, BulkService, CatalogService, EventPublisher, GenerateSlots,
    NotificationService, RequestContext, ReservationService, SlotGeneratorService,
};

pub(crate) struct Fixture {
    pub catalog: CatalogService,
    pub generator: Arc<SlotGeneratorService>,
    pub availability: Arc<AvailabilityService>,
    pub reservations: ReservationService,
    pub bulk: BulkService,
    pub notifications: Arc<NotificationService>,
    pub events: EventPublisher,
    pub chapter: Chapter,
}

pub(crate) fn admin() -> RequestContext {
    RequestContext::new("ops", UserRole::Admin)
}

pub(crate) fn window(start: &str, end: &str) -> TimeWindow {
    TimeWindow::parse(start, end).unwrap()
}

/// Services over a fresh memory store with one scenario and one 2-6 player chapter.
pub(crate) async fn fixture() -> Fixture {
    let stores = Stores::memory();
    let rbac = Arc::new(RbacEnforcer::new());
    let schedule = ScheduleConfig::default();

    let catalog = CatalogService::new(
        stores.scenarios.clone(),
        stores.chapters.clone(),
        stores.prices.clone(),
        rbac.clone(),
    );
    let generator = Arc::new(SlotGeneratorService::new(
        stores.chapters.clone(),
        stores.slots.clone(),
        rbac.clone(),
        schedule.clone(),
    ));
    let availability = Arc::new(AvailabilityService::new(
        stores.chapters.clone(),
        stores.slots.clone(),
        rbac.clone(),
        schedule,
    ));
    let notifications = Arc::new(NotificationService::new(
        stores.notifications.clone(),
        rbac.clone(),
        true,
    ));
    let events = EventPublisher::new(16);
    let reservations = ReservationService::new(
        stores.chapters.clone(),
        stores.reservations.clone(),
        notifications.clone(),
        events.clone(),
        rbac.clone(),
    );
    let bulk = BulkService::new(generator.clone(), availability.clone(), rbac);

    let scenario = catalog
        .create_scenario(
            &admin(),
            CreateScenario {
                name: "The Lost Temple".into(),
                category: Some("adventure".into()),
                description: None,
            },
        )
        .await
        .unwrap();
    let chapter = catalog
        .create_chapter(
            &admin(),
            CreateChapter {
                scenario_id: scenario.id,
                name: "Chapter I".into(),
                min_player_number: 2,
                max_player_number: 6,
                duration_minutes: 60,
                difficulty: Difficulty::Medium,
                percentage_of_success: Some(40),
                description: None,
                place: None,
                image: None,
                video: None,
            },
        )
        .await
        .unwrap();

    Fixture {
        catalog,
        generator,
        availability,
        reservations,
        bulk,
        notifications,
        events,
        chapter,
    }
}

/// Generate the 18:00-19:00 slot on 2025-03-`day` and return it.
pub(crate) async fn seed_day(fx: &Fixture, day: u32) -> TimeSlot {
    let date = NaiveDate::from_ymd_opt(2025, 3, day).unwrap();
    let report = fx
        .generator
        .generate_unchecked(&GenerateSlots {
            chapter_id: fx.chapter.id,
            date_range: DateRange::new(date, date).unwrap(),
            weekday_time: window("18:00", "19:00"),
            weekend_time: None,
            time_ranges: vec![],
        })
        .await
        .unwrap();
    report.created.into_iter().next().unwrap()
}

pub(crate) fn new_reservation(fx: &Fixture, slot: TimeSlotId) -> NewReservation {
    NewReservation {
        chapter_id: fx.chapter.id,
        time_slot_id: slot,
        name: "Ada Lovelace".into(),
        email: "ada@example.com".into(),
        phone: "+33 6 12 34 56 78".into(),
        people: 4,
        language: Language::En,
    }
}
