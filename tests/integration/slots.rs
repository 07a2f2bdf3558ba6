//! Slot generation and availability endpoints.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_week_generation_uses_weekend_window() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;

    let res = app
        .admin(
            "POST",
            "/api/timeSlots",
            Some(json!({
                "chapterId": chapter,
                "dateRange": { "from": "2025-01-06", "to": "2025-01-12" },
                "weekdayTime": { "startTime": "09:00", "endTime": "18:00" },
                "weekendTime": { "startTime": "10:00", "endTime": "16:00" }
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
    let created = res.body["data"]["created"].as_array().unwrap();
    assert_eq!(created.len(), 7);

    let starts: Vec<&str> = created
        .iter()
        .map(|s| s["startTime"].as_str().unwrap())
        .collect();
    let weekday_starts = starts.iter().filter(|s| s.ends_with("09:00:00Z")).count();
    let weekend_starts = starts.iter().filter(|s| s.ends_with("10:00:00Z")).count();
    assert_eq!(weekday_starts, 5);
    assert_eq!(weekend_starts, 2);
}

#[tokio::test]
async fn test_generation_is_idempotent() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;

    let first = app.generate(&chapter, "2025-03-03", "2025-03-09").await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.generate(&chapter, "2025-03-01", "2025-03-09").await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(second.body["data"]["created"].as_array().unwrap().len(), 2);
    assert_eq!(
        second.body["data"]["skippedExisting"].as_array().unwrap().len(),
        7
    );

    let list = app
        .request(
            "GET",
            &format!("/api/timeSlots?chapterId={chapter}"),
            None,
            None,
        )
        .await;
    assert_eq!(list.status, StatusCode::OK);
    assert_eq!(list.body["data"].as_array().unwrap().len(), 9);
}

#[tokio::test]
async fn test_generation_with_several_time_ranges() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;

    let res = app
        .admin(
            "POST",
            "/api/timeSlots",
            Some(json!({
                "chapterId": chapter,
                "dateRange": { "from": "2025-03-03", "to": "2025-03-03" },
                "weekdayTime": { "startTime": "18:00", "endTime": "19:00" },
                "timeRanges": [
                    { "startTime": "10:00", "endTime": "11:00" },
                    { "startTime": "18:30", "endTime": "19:30" }
                ]
            })),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
    assert_eq!(res.body["data"]["created"].as_array().unwrap().len(), 2);
    assert_eq!(res.body["data"]["conflicts"], json!(["2025-03-03"]));
}

#[tokio::test]
async fn test_list_filters_by_scenario() {
    let app = TestApp::new();
    let temple = app.create_scenario("The Lost Temple").await;
    let first = app.create_chapter(&temple, "Chapter I").await;
    let heist = app.create_scenario("Casino Heist").await;
    let second = app.create_chapter(&heist, "Vault").await;
    app.seed_slot(&first, "2025-03-03").await;
    app.seed_slot(&second, "2025-03-03").await;

    let res = app
        .request(
            "GET",
            &format!("/api/timeSlots?scenarioId={temple}&date=2025-03-03"),
            None,
            None,
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    let slots = res.body["data"].as_array().unwrap();
    assert_eq!(slots.len(), 1);
    assert_eq!(slots[0]["chapterId"], first.as_str());
}

#[tokio::test]
async fn test_generation_rejects_bad_input() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;

    let inverted = app
        .admin(
            "POST",
            "/api/timeSlots",
            Some(json!({
                "chapterId": chapter,
                "dateRange": { "from": "2025-01-06", "to": "2025-01-07" },
                "weekdayTime": { "startTime": "18:00", "endTime": "09:00" }
            })),
        )
        .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);
    assert_eq!(inverted.error_code(), "VALIDATION_ERROR");

    let backwards = app.generate(&chapter, "2025-02-01", "2025-01-01").await;
    assert_eq!(backwards.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_slot_management_requires_admin() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let body = json!({
        "chapterId": chapter,
        "dateRange": { "from": "2025-01-06", "to": "2025-01-06" },
        "weekdayTime": { "startTime": "09:00", "endTime": "10:00" }
    });

    let anonymous = app
        .request("POST", "/api/timeSlots", Some(body.clone()), None)
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);

    let subadmin = app
        .request("POST", "/api/timeSlots", Some(body), Some(app.subadmin.as_str()))
        .await;
    assert_eq!(subadmin.status, StatusCode::FORBIDDEN);

    let garbage = app
        .request("GET", "/api/reservations", None, Some("not-a-jwt"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_toggle_and_day_operations() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-04").await;

    let off = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/{slot}/toggle-availability"),
            Some(json!({ "isAvailable": false })),
        )
        .await;
    assert_eq!(off.status, StatusCode::OK);
    assert_eq!(off.body["data"]["isAvailable"], false);
    assert_eq!(off.body["data"]["isDisabled"], true);

    let enabled = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/enable-day/{chapter}"),
            Some(json!({ "date": "2025-03-04" })),
        )
        .await;
    assert_eq!(enabled.status, StatusCode::OK);
    assert_eq!(enabled.body["data"]["affected"], 1);
    assert_eq!(app.slot(&slot).await["isAvailable"], true);

    let disabled = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/disable-day/{chapter}"),
            Some(json!({ "date": "2025-03-04" })),
        )
        .await;
    assert_eq!(disabled.status, StatusCode::OK);

    let bookable = app
        .request(
            "GET",
            &format!("/api/timeSlots?chapterId={chapter}&bookable=true"),
            None,
            None,
        )
        .await;
    assert!(bookable.body["data"].as_array().unwrap().is_empty());

    let cleared = app
        .admin(
            "DELETE",
            &format!("/api/timeSlots/clear-day/{chapter}"),
            Some(json!({ "date": "2025-03-04" })),
        )
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert_eq!(cleared.body["data"]["affected"], 1);

    let gone = app
        .request("GET", &format!("/api/timeSlots/{slot}"), None, None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_enable_day_keeps_booked_slot_taken() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-05").await;
    assert_eq!(app.book(&chapter, &slot).await.status, StatusCode::CREATED);

    let res = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/enable-day/{chapter}"),
            Some(json!({ "date": "2025-03-05" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(app.slot(&slot).await["isAvailable"], false);

    let clear = app
        .admin(
            "DELETE",
            &format!("/api/timeSlots/clear-all/{chapter}"),
            None,
        )
        .await;
    assert_eq!(clear.status, StatusCode::OK);
    assert_eq!(clear.body["data"]["retainedHeld"], 1);
}

#[tokio::test]
async fn test_decline_after_disable_and_enable_frees_slot() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-05").await;
    let reservation = app.book(&chapter, &slot).await.id();

    for action in ["disable-day", "enable-day"] {
        let res = app
            .admin(
                "PUT",
                &format!("/api/timeSlots/{action}/{chapter}"),
                Some(json!({ "date": "2025-03-05" })),
            )
            .await;
        assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    }
    let held = app.slot(&slot).await;
    assert_eq!(held["isAvailable"], false);
    assert_eq!(held["isDisabled"], false);

    let declined = app
        .admin(
            "PUT",
            &format!("/api/reservations/pending/{reservation}/status"),
            Some(json!({ "status": "declined" })),
        )
        .await;
    assert_eq!(declined.status, StatusCode::OK, "{:?}", declined.body);
    assert_eq!(app.slot(&slot).await["isAvailable"], true);
}

#[tokio::test]
async fn test_reschedule_single_slot() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-06").await;

    let res = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/{slot}"),
            Some(json!({ "startTime": "20:00", "endTime": "21:30" })),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
    assert_eq!(res.body["data"]["startTime"], "2025-03-06T20:00:00Z");

    let bad = app
        .admin(
            "PUT",
            &format!("/api/timeSlots/{slot}"),
            Some(json!({ "startTime": "21:00", "endTime": "20:00" })),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let malformed = app
        .admin("PUT", "/api/timeSlots/not-a-uuid", Some(json!({})))
        .await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
}
