//! In-process test fixture for the HTTP API.
//!
//! Builds the real router over an in-memory database with a [`MockScorer`]
//! injected, so tests control which gate wins and by how much.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use valet_core::testing::MockScorer;
use valet_core::{
    create_audit_system, AuditFilter, AuditStore, Config, Database, GateRegistry,
    SqliteAuditStore, SqliteGateRegistry,
};
use valet_server::state::AppState;

/// Test fixture for API testing with a controllable scorer.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_ticket_creation() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture.post("/api/tickets", json!({
///         "userId": "u1",
///         "carInfo": "Red Civic"
///     })).await;
///
///     assert_status!(response, StatusCode::CREATED);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Scorer used by the dispatch engine
    pub scorer: Arc<MockScorer>,
    /// Audit store the background writer drains into
    pub audit_store: Arc<dyn AuditStore>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Assert a response status, printing the body on mismatch.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "unexpected status, body: {}",
            $response.body
        )
    };
}

/// Configuration for test fixture.
#[derive(Debug, Clone)]
pub struct TestConfig {
    /// Seed the default gates A..D
    pub seed_gates: bool,
    /// Score given to gates without an explicit score
    pub default_score: u8,
    pub confidence_threshold: u8,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            seed_gates: true,
            default_score: 10,
            confidence_threshold: 90,
        }
    }
}

impl TestConfig {
    /// Config with an empty gate registry.
    pub fn without_gates() -> Self {
        Self {
            seed_gates: false,
            ..Default::default()
        }
    }
}

impl TestFixture {
    /// Create a new test fixture with default gates and scorer.
    pub async fn new() -> Self {
        Self::with_config(TestConfig::default()).await
    }

    /// Create a test fixture with custom configuration.
    pub async fn with_config(test_config: TestConfig) -> Self {
        let database = Database::in_memory().expect("Failed to open database");

        let mut config = Config::default();
        config.dispatch.confidence_threshold = test_config.confidence_threshold;

        if test_config.seed_gates {
            SqliteGateRegistry::new(database.clone())
                .seed_defaults(&config.gates.defaults)
                .expect("Failed to seed gates");
        }

        let audit_store: Arc<dyn AuditStore> = Arc::new(SqliteAuditStore::new(database.clone()));
        let (audit_handle, audit_writer) = create_audit_system(Arc::clone(&audit_store), 100);
        tokio::spawn(audit_writer.run());

        let scorer = Arc::new(MockScorer::new(test_config.default_score));

        let state = Arc::new(AppState::new(
            config,
            database,
            Arc::clone(&scorer) as Arc<dyn valet_core::GateScorer>,
            audit_handle,
            Arc::clone(&audit_store),
        ));

        let router = valet_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            scorer,
            audit_store,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a POST with a raw body and an optional content type.
    pub async fn post_raw(
        &self,
        path: &str,
        content_type: Option<&str>,
        body: &'static str,
    ) -> TestResponse {
        let mut request_builder = Request::builder().method("POST").uri(path);
        if let Some(content_type) = content_type {
            request_builder = request_builder.header("Content-Type", content_type);
        }
        let request = request_builder.body(Body::from(body)).unwrap();
        self.send(request).await
    }

    /// Send a GET request and return the raw text body.
    pub async fn get_text(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .unwrap();
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Create a ticket and move it to `requested`, returning its id.
    pub async fn requested_ticket(&self, user_id: &str, car_info: &str) -> i64 {
        let created = self
            .post(
                "/api/tickets",
                serde_json::json!({ "userId": user_id, "carInfo": car_info }),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
        let id = created.body["id"].as_i64().expect("ticket id");

        let requested = self.post_empty(&format!("/api/tickets/{}/request", id)).await;
        assert_eq!(requested.status, StatusCode::OK, "{}", requested.body);
        id
    }

    /// Poll the audit store until `event_type` shows up for the ticket.
    pub async fn wait_for_audit(&self, ticket_id: i64, event_type: &str) -> bool {
        let filter = AuditFilter::new()
            .with_ticket_id(ticket_id)
            .with_event_type(event_type);
        for _ in 0..50 {
            if self.audit_store.count(&filter).unwrap_or(0) > 0 {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        false
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse { status, body }
    }
}
