use crate::config::{StoreBackend, UserConfig};
use crate::handlers;
use crate::services::{InMemoryStore, MongoDb, UserStore};
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::get,
    Router,
};
use service_core::config::Environment;
use service_core::error::AppError;
use service_core::middleware::{
    error_detail::error_detail_middleware, metrics::metrics_middleware, panic::handle_panic,
    tracing::request_id_middleware,
};
use std::future::{Future, IntoFuture};
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};

#[derive(Clone)]
pub struct AppState {
    pub environment: Environment,
    pub store: Arc<dyn UserStore>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(environment: Environment, store: Arc<dyn UserStore>) -> Self {
        Self {
            environment,
            store,
            started_at: Instant::now(),
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let environment = state.environment;
    with_layers(routes().with_state(state), environment)
}

fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::root).fallback(handlers::not_found))
        .route(
            "/health",
            get(handlers::health_check).fallback(handlers::not_found),
        )
        .route("/metrics", get(handlers::metrics).fallback(handlers::not_found))
        .route("/api/hello", get(handlers::hello).fallback(handlers::not_found))
        .route("/api/stats", get(handlers::stats).fallback(handlers::not_found))
        .route(
            "/api/users",
            get(handlers::list_users)
                .post(handlers::create_user)
                .fallback(handlers::not_found),
        )
        .route(
            "/api/users/:id",
            get(handlers::get_user)
                .put(handlers::update_user)
                .delete(handlers::delete_user)
                .fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
}

/// Panics are caught inside the error-detail layer so their detail is
/// redacted like any other 500.
fn with_layers(router: Router, environment: Environment) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn_with_state(environment, error_detail_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
}

/// Connects the configured store backend.
pub async fn connect_store(config: &UserConfig) -> Result<Arc<dyn UserStore>, AppError> {
    match config.store {
        StoreBackend::Mongo => {
            let db = MongoDb::connect(
                &config.mongodb.uri,
                &config.mongodb.database,
                Duration::from_secs(config.mongodb.timeout_secs),
            )
            .await?;

            // Without the index, email uniqueness is not enforced.
            if let Err(e) = db.initialize_indexes().await {
                tracing::warn!(error = %e, "Email index not created; will retry on next start");
            }

            Ok(Arc::new(db))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory user store; data is lost on restart");
            Ok(Arc::new(InMemoryStore::new()))
        }
    }
}

type ServerFuture = Pin<Box<dyn Future<Output = std::io::Result<()>> + Send>>;

pub struct Application {
    port: u16,
    server: ServerFuture,
}

impl Application {
    pub async fn build(config: UserConfig) -> Result<Self, AppError> {
        Self::build_with_shutdown(config, std::future::pending()).await
    }

    /// Like [`Application::build`], with a signal that starts a graceful
    /// shutdown. The store is disconnected once the server has drained.
    pub async fn build_with_shutdown<F>(config: UserConfig, shutdown: F) -> Result<Self, AppError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let store = connect_store(&config).await?;
        let state = AppState::new(config.environment, store);
        let app = build_router(state.clone());

        let addr = SocketAddr::from(([0, 0, 0, 0], config.common.port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let store = state.store;
        let server = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .into_future();
        let server = Box::pin(async move {
            let result = server.await;
            store.disconnect().await;
            result
        });

        Ok(Self {
            port,
            server,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
