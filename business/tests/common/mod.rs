//! Shared helpers for business integration tests against a wiremock backend.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::time::Duration;

use estately_business::{BusinessConfig, DraftPatch, PropertyStatus, build_state_ctx};
use estately_states::StateCtx;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const TASK_TIMEOUT: Duration = Duration::from_secs(5);

/// A mock server and a context pointed at it.
pub struct TestContext {
    pub mock_server: MockServer,
    pub ctx: StateCtx,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_token(None).await
    }

    pub async fn with_token(token: Option<&str>) -> Self {
        let mock_server = MockServer::start().await;
        let config = BusinessConfig::new(mock_server.uri())
            .expect("mock server uri is a valid url")
            .with_auth_token(token.map(str::to_owned));
        let ctx = build_state_ctx(config);
        Self { mock_server, ctx }
    }

    /// Mirrors the CLI loop: sync, spawn queued commands, await each task and sync
    /// after it completes.
    pub async fn flush_and_wait(&mut self) {
        self.ctx.sync_updates();
        self.ctx.flush_commands();

        while self.ctx.task_count() > 0 {
            let joined = tokio::time::timeout(TASK_TIMEOUT, self.ctx.task_set_mut().join_next())
                .await
                .unwrap_or_else(|_| {
                    panic!(
                        "timed out waiting for pending tasks ({} still running)",
                        self.ctx.task_count()
                    )
                });
            if joined.is_some() {
                self.ctx.sync_updates();
            }
        }
        self.ctx.sync_updates();
    }

    pub async fn requests_to(&self, route: &str) -> usize {
        self.mock_server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|r| r.url.path() == route)
            .count()
    }

    pub async fn mock_upload(&self, url: &str) {
        Mock::given(method("POST"))
            .and(path("/upload-photos"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "photoUrls": [url] })),
            )
            .mount(&self.mock_server)
            .await;
    }

    pub async fn mock_create_property(&self, status: u16) {
        let body = if status == 201 {
            serde_json::json!({ "status": 201, "message": "created" })
        } else {
            serde_json::json!({ "message": "database unavailable" })
        };
        Mock::given(method("POST"))
            .and(path("/property"))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.mock_server)
            .await;
    }
}

pub fn lake_house() -> DraftPatch {
    DraftPatch::new()
        .name("Lake House")
        .description("Cozy")
        .price("250000")
        .location("Austin")
        .property_status(PropertyStatus::ForSale)
}

/// Printable filler so multipart bodies stay matchable as text.
pub fn photo_bytes(size: usize) -> Vec<u8> {
    vec![b'p'; size]
}
