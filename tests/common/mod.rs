// Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::{io::Write, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use health_log_service::{
    auth::{MemoryCredentialStore, TokenService},
    build_router,
    logs::LogCache,
    state::AppState,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tempfile::NamedTempFile;
use tower::ServiceExt;

pub const SECRET: &str = "integration-test-secret";

pub const SAMPLE_LOG: &str = "\
2024-01-01,alice,LOGIN,success
2024-01-01,alice,HEART_RATE,72
2024-01-02,bob,LOGIN,failed
2024-01-02,bob,LOGIN,success
2024-01-02,bob,HEART_RATE,80
2024-01-03,bob,HEART_RATE,90
malformed line
";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    // Keeps the log file alive for the test's duration.
    pub log_file: NamedTempFile,
}

pub async fn spawn_app(log: &str) -> TestApp {
    let mut log_file = NamedTempFile::new().expect("create temp log");
    log_file.write_all(log.as_bytes()).expect("write temp log");
    log_file.flush().expect("flush temp log");

    let state = AppState::new(
        LogCache::new(log_file.path()),
        TokenService::new(SECRET),
        Arc::new(MemoryCredentialStore::new()),
        4,
    );
    state.seed_demo_accounts().await.expect("seed accounts");

    TestApp {
        router: build_router(state.clone()),
        state,
        log_file,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = response
            .into_body()
            .collect()
            .await
            .expect("read body")
            .to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method("GET").uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: Value, token: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(builder.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn login(&self, username: &str, password: &str) -> String {
        let (status, body) = self
            .post_json(
                "/api/auth/login",
                serde_json::json!({ "username": username, "password": password }),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["data"]["token"].as_str().expect("token in body").to_string()
    }
}
