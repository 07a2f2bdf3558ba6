//! Scenario, chapter and price endpoints.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_catalog_reads_are_public() {
    let app = TestApp::new();
    let scenario = app.create_scenario("Space Station").await;
    app.create_chapter(&scenario, "Docking").await;

    let scenarios = app.request("GET", "/api/scenarios", None, None).await;
    assert_eq!(scenarios.status, StatusCode::OK);
    assert_eq!(scenarios.body["data"].as_array().unwrap().len(), 1);

    let chapters = app
        .request(
            "GET",
            &format!("/api/chapters?scenarioId={scenario}"),
            None,
            None,
        )
        .await;
    assert_eq!(chapters.body["data"][0]["name"], "Docking");
    assert_eq!(chapters.body["data"][0]["difficulty"], "medium");

    let create = app
        .request(
            "POST",
            "/api/scenarios",
            Some(json!({ "name": "Sneaky" })),
            Some(app.subadmin.as_str()),
        )
        .await;
    assert_eq!(create.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_chapter_validation() {
    let app = TestApp::new();
    let scenario = app.create_scenario("Space Station").await;

    let inverted = app
        .admin(
            "POST",
            "/api/chapters",
            Some(json!({
                "scenarioId": scenario,
                "name": "Backwards",
                "minPlayerNumber": 6,
                "maxPlayerNumber": 2,
                "durationMinutes": 60,
                "difficulty": "hard"
            })),
        )
        .await;
    assert_eq!(inverted.status, StatusCode::BAD_REQUEST);

    let bad_rate = app
        .admin(
            "POST",
            "/api/chapters",
            Some(json!({
                "scenarioId": scenario,
                "name": "Lucky",
                "minPlayerNumber": 2,
                "maxPlayerNumber": 4,
                "durationMinutes": 60,
                "difficulty": "easy",
                "percentageOfSuccess": 140
            })),
        )
        .await;
    assert_eq!(bad_rate.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chapter_delete_blocked_by_active_reservation() {
    let app = TestApp::new();
    let chapter = app.seed_chapter().await;
    let slot = app.seed_slot(&chapter, "2025-03-03").await;
    let reservation = app.book(&chapter, &slot).await.id();

    let blocked = app
        .admin("DELETE", &format!("/api/chapters/{chapter}"), None)
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);

    app.admin(
        "PUT",
        &format!("/api/reservations/pending/{reservation}/status"),
        Some(json!({ "status": "declined" })),
    )
    .await;

    let removed = app
        .admin("DELETE", &format!("/api/chapters/{chapter}"), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK, "{:?}", removed.body);
    assert_eq!(removed.body["data"]["slotsDeleted"], 1);
    assert_eq!(removed.body["data"]["reservationsDeleted"], 1);
}

#[tokio::test]
async fn test_price_rules_and_quote() {
    let app = TestApp::new();
    for (players, and_above, price) in [(2, false, 3500), (3, false, 3000), (4, true, 2500)] {
        let res = app
            .admin(
                "POST",
                "/api/prices",
                Some(json!({
                    "playersCount": players,
                    "isAndAbove": and_above,
                    "pricePerPerson": price,
                    "currency": "eur"
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        assert_eq!(res.body["data"]["currency"], "EUR");
    }

    let exact = app
        .request("GET", "/api/prices/quote?partySize=3", None, None)
        .await;
    assert_eq!(exact.body["data"]["total"], 9000);

    let above = app
        .request("GET", "/api/prices/quote?partySize=6", None, None)
        .await;
    assert_eq!(above.body["data"]["pricePerPerson"], 2500);
    assert_eq!(above.body["data"]["total"], 15000);

    let none = app
        .request("GET", "/api/prices/quote?partySize=1", None, None)
        .await;
    assert_eq!(none.status, StatusCode::NOT_FOUND);

    let bad_currency = app
        .admin(
            "POST",
            "/api/prices",
            Some(json!({ "playersCount": 5, "pricePerPerson": 100, "currency": "EURO" })),
        )
        .await;
    assert_eq!(bad_currency.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new();

    let live = app.request("GET", "/api/health", None, None).await;
    assert_eq!(live.status, StatusCode::OK);
    assert_eq!(live.body["data"]["status"], "ok");

    let ready = app.request("GET", "/api/health/detailed", None, None).await;
    assert_eq!(ready.body["data"]["backend"], "memory");
    assert_eq!(ready.body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_scenario_with_chapters_cannot_be_deleted() {
    let app = TestApp::new();
    let scenario = app.create_scenario("Space Station").await;
    let chapter = app.create_chapter(&scenario, "Docking").await;

    let blocked = app
        .admin("DELETE", &format!("/api/scenarios/{scenario}"), None)
        .await;
    assert_eq!(blocked.status, StatusCode::CONFLICT);
    assert_eq!(blocked.error_code(), "CONFLICT");

    app.admin("DELETE", &format!("/api/chapters/{chapter}"), None)
        .await;
    let removed = app
        .admin("DELETE", &format!("/api/scenarios/{scenario}"), None)
        .await;
    assert_eq!(removed.status, StatusCode::OK);
}
