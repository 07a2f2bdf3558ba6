//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use slotkeeper_api::{AppState, build_app};
use slotkeeper_core::config::{AppConfig, DatabaseProvider};
use slotkeeper_database::Stores;
use slotkeeper_entity::user::UserRole;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for minting tokens
    pub state: AppState,
    /// Admin bearer token
    pub admin: String,
    /// Subadmin bearer token
    pub subadmin: String,
}

impl TestApp {
    /// Create a new test application on a fresh in-memory store.
    ///
    /// Wall-clock times are read as UTC so assertions can compare
    /// `HH:MM` directly.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.provider = DatabaseProvider::Memory;
        config.auth.jwt_secret = "integration-test-secret".to_string();
        config.schedule.utc_offset_minutes = 0;
        config.validate().expect("test config is valid");

        let state = AppState::new(config, Stores::memory());
        let admin = state
            .jwt_encoder
            .issue("admin@test", UserRole::Admin)
            .expect("admin token")
            .access_token;
        let subadmin = state
            .jwt_encoder
            .issue("desk@test", UserRole::Subadmin)
            .expect("subadmin token")
            .access_token;

        Self {
            router: build_app(state.clone()),
            state,
            admin,
            subadmin,
        }
    }

    /// Send a request and parse the JSON response
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Admin request shorthand
    pub async fn admin(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        self.request(method, path, body, Some(&self.admin)).await
    }

    /// Create a scenario and return its ID
    pub async fn create_scenario(&self, name: &str) -> String {
        let res = self
            .admin("POST", "/api/scenarios", Some(json!({ "name": name })))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        res.id()
    }

    /// Create a chapter for 2 to 6 players and return its ID
    pub async fn create_chapter(&self, scenario_id: &str, name: &str) -> String {
        let res = self
            .admin(
                "POST",
                "/api/chapters",
                Some(json!({
                    "scenarioId": scenario_id,
                    "name": name,
                    "minPlayerNumber": 2,
                    "maxPlayerNumber": 6,
                    "durationMinutes": 60,
                    "difficulty": "medium",
                    "percentageOfSuccess": 40
                })),
            )
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        res.id()
    }

    /// Scenario plus one chapter
    pub async fn seed_chapter(&self) -> String {
        let scenario = self.create_scenario("The Lost Temple").await;
        self.create_chapter(&scenario, "Chapter I").await
    }

    /// Generate slots for one chapter over a range with one window
    pub async fn generate(&self, chapter_id: &str, from: &str, to: &str) -> TestResponse {
        self.admin(
            "POST",
            "/api/timeSlots",
            Some(json!({
                "chapterId": chapter_id,
                "dateRange": { "from": from, "to": to },
                "weekdayTime": { "startTime": "18:00", "endTime": "19:00" }
            })),
        )
        .await
    }

    /// Generate a single slot and return its ID
    pub async fn seed_slot(&self, chapter_id: &str, date: &str) -> String {
        let res = self.generate(chapter_id, date, date).await;
        assert_eq!(res.status, StatusCode::CREATED, "{:?}", res.body);
        res.body["data"]["created"][0]["id"]
            .as_str()
            .expect("created slot id")
            .to_string()
    }

    /// Book a slot through the public endpoint
    pub async fn book(&self, chapter_id: &str, slot_id: &str) -> TestResponse {
        self.request(
            "POST",
            "/api/reservations",
            Some(json!({
                "chapterId": chapter_id,
                "timeSlotId": slot_id,
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "phone": "+33 6 12 34 56 78",
                "people": 4,
                "language": "en"
            })),
            None,
        )
        .await
    }

    /// Fetch one slot
    pub async fn slot(&self, slot_id: &str) -> Value {
        let res = self
            .request("GET", &format!("/api/timeSlots/{slot_id}"), None, None)
            .await;
        assert_eq!(res.status, StatusCode::OK, "{:?}", res.body);
        res.body["data"].clone()
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// `data.id` as a string
    pub fn id(&self) -> String {
        self.body["data"]["id"]
            .as_str()
            .expect("response has data.id")
            .to_string()
    }

    /// Error code of an error body
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
