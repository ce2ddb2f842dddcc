use crate::config::RegistrationConfig;
use crate::handlers;
use crate::services::{database::watch_connectivity, MongoUserStore, RegistrationService, UserStore};
use axum::{
    body::Body,
    extract::DefaultBodyLimit,
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use service_core::middleware::{make_request_span, request_id_middleware};
use service_core::observability::spawn_supervised;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{catch_panic::CatchPanicLayer, cors::CorsLayer, trace::TraceLayer};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn UserStore>,
    pub registration: RegistrationService,
}

impl AppState {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            registration: RegistrationService::new(store.clone()),
            store,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/health",
            get(handlers::health_check).fallback(handlers::not_found),
        )
        .route(
            "/api/register",
            post(handlers::register).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(CatchPanicLayer::custom(handlers::handle_panic))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<Body>))
        .layer(from_fn(request_id_middleware))
        .with_state(state)
}

pub struct Application {
    port: u16,
    listener: TcpListener,
    router: Router,
    store: Arc<dyn UserStore>,
}

impl Application {
    /// Connects to MongoDB and prepares its indexes before binding, so a
    /// store failure means the port is never opened.
    pub async fn build(config: RegistrationConfig) -> anyhow::Result<Self> {
        let store = MongoUserStore::connect(&config.mongodb)
            .await
            .map_err(|e| {
                tracing::error!("Failed to connect to MongoDB: {}", e);
                e
            })?;

        if let Err(e) = store.ensure_indexes().await {
            tracing::error!("Failed to initialize database indexes: {}", e);
            store.close().await;
            return Err(e.into());
        }

        spawn_supervised("mongodb-connectivity", watch_connectivity(store.connectivity()));

        Self::build_with_store(config.common.port, Arc::new(store)).await
    }

    pub async fn build_with_store(port: u16, store: Arc<dyn UserStore>) -> anyhow::Result<Self> {
        let addr = SocketAddr::from(([0, 0, 0, 0], port));
        let listener = TcpListener::bind(addr).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", addr, e);
            e
        })?;
        let port = listener.local_addr()?.port();

        Ok(Self {
            port,
            listener,
            router: router(AppState::new(store.clone())),
            store,
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Serves until `shutdown` resolves, drains in-flight requests, then
    /// closes the store.
    pub async fn run_until_stopped<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        tracing::info!("Listening on {}", self.port);

        let served = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;

        self.store.close().await;
        tracing::info!("Server gracefully shutdown");

        served.map_err(Into::into)
    }
}
