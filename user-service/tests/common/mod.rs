#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use service_core::config::{Config as CoreConfig, Environment};
use std::sync::Arc;
use tower::util::ServiceExt;
use user_service::config::{MongoConfig, StoreBackend, UserConfig};
use user_service::services::{InMemoryStore, MongoDb, UserStore};
use user_service::startup::{build_router, AppState, Application};
use uuid::Uuid;

/// Router backed by an in-memory store, driven with `oneshot`.
pub struct TestRouter {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
}

impl TestRouter {
    pub fn new() -> Self {
        Self::with_environment(Environment::Development)
    }

    pub fn with_environment(environment: Environment) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let state = AppState::new(environment, store.clone() as Arc<dyn UserStore>);

        Self {
            router: build_router(state),
            store,
        }
    }

    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.send(method, uri, body.map(|body| body.to_string())).await
    }

    pub async fn post_raw(&self, uri: &str, raw: &str) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(raw.to_string())).await
    }

    async fn send(&self, method: Method, uri: &str, body: Option<String>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("response body should be JSON")
        };

        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

/// A real server on a random port, backed by MongoDB.
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub db: MongoDb,
    pub db_name: String,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let uri = std::env::var("MONGODB_URI")
            .unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = format!("user_test_{}", Uuid::new_v4().simple());

        let config = UserConfig {
            common: CoreConfig { port: 0 }, // Random port for testing
            environment: Environment::Development,
            store: StoreBackend::Mongo,
            mongodb: MongoConfig {
                uri: uri.clone(),
                database: db_name.clone(),
                timeout_secs: 5,
            },
            log_level: "info".to_string(),
            otlp_endpoint: None,
        };

        let app = Application::build(config)
            .await
            .expect("Failed to build test application");

        let port = app.port();
        let address = format!("http://127.0.0.1:{}", port);

        tokio::spawn(async move {
            app.run_until_stopped().await.ok();
        });

        // Wait for the server to be ready by polling the health endpoint
        let client = reqwest::Client::new();
        let health_url = format!("{}/health", address);
        for _ in 0..50 {
            if client.get(&health_url).send().await.is_ok() {
                break;
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;
        }

        let db = MongoDb::connect(&uri, &db_name, std::time::Duration::from_secs(5))
            .await
            .expect("Failed to connect to MongoDB");

        TestApp {
            address,
            port,
            db,
            db_name,
        }
    }

    /// Drops the per-test database.
    pub async fn cleanup(&self) {
        let _ = self.db.database().drop(None).await;
    }
}
