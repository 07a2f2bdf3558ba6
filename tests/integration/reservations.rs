//! Reservation binding, status transitions, and the notification feed.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_booking_takes_the_slot() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;

    let res = app.book(&chapter, &slot).await;
    assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
    assert_eq!(res.body["data"]["status"], "pending");
    assert_eq!(res.body["data"]["timeSlotId"], slot.as_str());
    assert_eq!(app.slot(&slot).await["isAvailable"], false);

    let again = app.book(&chapter, &slot).await;
    assert_eq!(again.status, StatusCode::CONFLICT);
    assert_eq!(again.error_code(), "SLOT_UNAVAILABLE");

    let list = app.admin("GET", "/api/reservations", None).await;
    assert_eq!(list.body["data"]["totalItems"], 1);
}

#[tokio::test]
async fn test_booking_rejects_bad_requests() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let other = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;

    let wrong_chapter = app.book(&other, &slot).await;
    assert_eq!(wrong_chapter.status, StatusCode::NOT_FOUND);

    let too_many = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "chapterId": chapter,
                "timeSlotId": slot,
                "name": "Crowd",
                "email": "crowd@example.com",
                "phone": "0612345678",
                "people": 12,
                "language": "fr"
            })),
            None,
        )
        .await;
    assert_eq!(too_many.status, StatusCode::BAD_REQUEST);

    let invalid = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "chapterId": chapter,
                "timeSlotId": slot,
                "name": "",
                "email": "nope",
                "phone": "0612345678",
                "people": 0,
                "language": "en"
            })),
            None,
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert!(invalid.body["details"].get("email").is_some());

    assert_eq!(app.slot(&slot).await["isAvailable"], true);
}

#[tokio::test]
async fn test_decline_releases_slot() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();

    let res = app
        .admin(
            "PUT",
            &format!("/api/reservations/pending/{reservation}/status"),
            Some(json!({ "status": "declined" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    assert_eq!(res.body["data"]["status"], "declined");
    assert_eq!(app.slot(&slot).await["isAvailable"], true);

    let approved = app
        .admin(
            "PUT",
            &format!("/api/reservations/declinedReservations/{reservation}/status"),
            Some(json!({ "status": "approved" })),
        )
        .await;
    assert_eq!(approved.status, StatusCode::OK, "{:?}", approved.body);
    assert_eq!(app.slot(&slot).await["isAvailable"], false);
}

#[tokio::test]
async fn test_stale_source_is_rejected() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();

    let res = app
        .admin(
            "PUT",
            &format!("/api/reservations/approved/{reservation}/status"),
            Some(json!({ "status": "declined" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::CONFLICT);
    assert_eq!(res.error_code(), "CONFLICT");

    let unknown_bucket = app
        .admin(
            "PUT",
            &format!("/api/reservations/archive/{reservation}/status"),
            Some(json!({ "status": "declined" })),
        )
        .await;
    assert_eq!(unknown_bucket.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_delete_moves_to_deleted_bucket() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();

    let res = app
        .admin(
            "DELETE",
            &format!("/api/reservations/reservations/{reservation}"),
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    assert_eq!(res.body["data"]["status"], "deleted");
    assert_eq!(app.slot(&slot).await["isAvailable"], true);

    let detail = app
        .admin("GET", &format!("/api/reservations/{reservation}"), None)
        .await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["status"], "deleted");

    let summary = app.admin("GET", "/api/reservations/summary", None).await;
    assert_eq!(summary.body["data"]["deleted"], 1);
    assert_eq!(summary.body["data"]["pending"], 0);
}

#[tokio::test]
async fn test_subadmin_triages_pending_only() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();

    let approve = app
        .request(
            "PUT",
            &format!("/api/reservations/pending/{reservation}/status"),
            Some(json!({ "status": "approved" })),
            Some(app.subadmin.as_str()),
        )
        .await;
    assert_eq!(approve.status, StatusCode::OK, "{:?}", approve.body);

    let decline = app
        .request(
            "PUT",
            &format!("/api/reservations/approved/{reservation}/status"),
            Some(json!({ "status": "declined" })),
            Some(app.subadmin.as_str()),
        )
        .await;
    assert_eq!(decline.status, StatusCode::FORBIDDEN);

    let anonymous = app.request("GET", "/api/reservations", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_list_filters_and_search() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let first = app.seed_slot(&chapter, "2025-03-03").await;
    let second = app.seed_slot(&chapter, "2025-03-04").await;
    app.book(&chapter, &first).await;
    let other = app
        .request(
            "POST",
            "/api/reservations",
            Some(json!({
                "chapterId": chapter,
                "timeSlotId": second,
                "name": "Grace Hopper",
                "email": "grace@example.com",
                "phone": "0612345678",
                "people": 3,
                "language": "fr"
            })),
            None,
        )
        .await;
    assert_eq!(other.status, StatusCode::CREATED);

    let by_search = app
        .admin("GET", "/api/reservations?search=GRACE", None)
        .await;
    assert_eq!(by_search.body["data"]["totalItems"], 1);
    assert_eq!(by_search.body["data"]["items"][0]["name"], "Grace Hopper");

    let by_date = app
        .admin("GET", "/api/reservations?date=2025-03-03&status=pending", None)
        .await;
    assert_eq!(by_date.body["data"]["totalItems"], 1);

    let paged = app
        .admin("GET", "/api/reservations?page=2&perPage=1", None)
        .await;
    assert_eq!(paged.body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(paged.body["data"]["totalPages"], 2);
}

#[tokio::test]
async fn test_events_feed_notifications() {
    let app = TestApp::new();
    let mut events = app.state.events.subscribe();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();
    assert!(events.try_recv().is_ok());

    app.admin(
        "PUT",
        &format!("/api/reservations/pending/{reservation}/status"),
        Some(json!({ "status": "approved" })),
    )
    .await;

    let count = app
        .admin("GET", "/api/notifications/unread-count", None)
        .await;
    assert_eq!(count.body["data"]["count"], 2);

    let list = app.admin("GET", "/api/notifications", None).await;
    let newest = list.body["data"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();
    let read = app
        .admin("PUT", &format!("/api/notifications/{newest}/read"), None)
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.body["data"]["isRead"], true);

    let unread = app
        .admin("GET", "/api/notifications?unread=true", None)
        .await;
    assert_eq!(unread.body["data"]["totalItems"], 1);

    let cleared = app.admin("DELETE", "/api/notifications", None).await;
    assert_eq!(cleared.body["data"]["count"], 2);
}
