//! Bulk slot actions across chapters and bulk reservation status.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_bulk_add_slots_on_every_chapter() {
    let app = TestApp::new();
    let scenario = app.create_scenario("Heist").await;
    let a = app.create_chapter(&scenario, "Vault").await;
    let b = app.create_chapter(&scenario, "Getaway").await;

    let res = app
        .admin(
            "POST",
            "/api/timeSlots/bulk",
            Some(json!({
                "chapterIds": [a, b],
                "action": "addSlots",
                "dateRange": { "from": "2025-01-06", "to": "2025-01-12" },
                "weekdayTime": { "startTime": "18:00", "endTime": "19:00" },
                "weekendTime": { "startTime": "14:00", "endTime": "15:00" }
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    assert_eq!(res.body["data"]["succeeded"], 2);
    assert_eq!(res.body["data"]["failed"], 0);
    assert_eq!(res.body["data"]["results"][0]["outcome"]["created"], 7);
    assert_eq!(res.body["data"]["results"][1]["outcome"]["created"], 7);
}

#[tokio::test]
async fn test_bulk_partial_failure_reports_each_chapter() {
    let app = TestApp::new();
    let scenario = app.create_scenario("Heist").await;
    let a = app.create_chapter(&scenario, "Vault").await;
    let b = app.create_chapter(&scenario, "Getaway").await;
    app.seed_slot(&a, "2025-03-03").await;
    app.seed_slot(&b, "2025-03-03").await;
    let missing = "00000000-0000-4000-8000-000000000000";

    let res = app
        .admin(
            "POST",
            "/api/timeSlots/bulk",
            Some(json!({
                "chapterIds": [a, missing, b],
                "action": "disableDay",
                "date": "2025-03-03"
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::MULTI_STATUS, "{:?}", res.body);
    let results = res.body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["outcome"]["affected"], 1);
    assert_eq!(results[1]["success"], false);
    assert_eq!(results[1]["error"]["code"], "NOT_FOUND");
    assert_eq!(results[2]["success"], true);
    assert_eq!(res.body["data"]["failed"], 1);

    let bookable = app
        .request("GET", "/api/timeSlots?bookable=true", None, None)
        .await;
    assert!(bookable.body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_bulk_rejects_empty_or_unauthorised_requests() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;

    let empty = app
        .admin(
            "POST",
            "/api/timeSlots/bulk",
            Some(json!({ "chapterIds": [], "action": "clearAll" })),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);

    let unknown_action = app
        .admin(
            "POST",
            "/api/timeSlots/bulk",
            Some(json!({ "chapterIds": [chapter], "action": "explode" })),
        )
        .await;
    assert_eq!(unknown_action.status, StatusCode::BAD_REQUEST);

    let subadmin = app
        .request(
            "POST",
            "/api/timeSlots/bulk",
            Some(json!({ "chapterIds": [chapter], "action": "clearAll" })),
            Some(app.subadmin.as_str()),
        )
        .await;
    assert_eq!(subadmin.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_bulk_reservation_status() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let first_slot = app.seed_slot(&chapter, "2025-03-03").await;
    let second_slot = app.seed_slot(&chapter, "2025-03-04").await;
    let first = app.book(&chapter, &first_slot).await.id();
    let second = app.book(&chapter, &second_slot).await.id();

    app.admin(
        "PUT",
        &format!("/api/reservations/pending/{second}/status"),
        Some(json!({ "status": "approved" })),
    )
    .await;

    let res = app
        .admin(
            "POST",
            "/api/reservations/bulk-status",
            Some(json!({
                "ids": [first, second],
                "status": "declined",
                "source": "pending"
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::MULTI_STATUS, "{:?}", res.body);
    assert_eq!(res.body["data"]["results"][0]["outcome"], "declined");
    assert_eq!(res.body["data"]["results"][1]["error"]["code"], "CONFLICT");
    assert_eq!(app.slot(&first_slot).await["isAvailable"], true);
    assert_eq!(app.slot(&second_slot).await["isAvailable"], false);
}
