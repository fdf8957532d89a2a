use axum::{
    Router,
    routing::{delete, get},
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::Error;
use crate::service::RecordService;

pub mod error;
pub mod routes;

pub use error::ApiError;

/// Server state
pub struct AppState {
    pub service: RecordService,
    /// Attach raw store error text to 5xx bodies
    pub expose_error_detail: bool,
}

impl AppState {
    pub fn new(service: RecordService, expose_error_detail: bool) -> Self {
        Self {
            service,
            expose_error_detail,
        }
    }

    pub(crate) fn reject(&self, error: Error) -> ApiError {
        ApiError::new(error, self.expose_error_detail)
    }
}

/// Routes of the public API, mounted both at the root and under `/api`
fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(routes::health))
        .route(
            "/students",
            get(routes::list_students).post(routes::create_student),
        )
        .route("/students/{id}", delete(routes::delete_student))
        .route("/statistics", get(routes::statistics))
        .route("/groups", get(routes::list_groups))
        .route("/curricula", get(routes::list_curricula))
        .route("/sciences", get(routes::list_sciences))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(api_routes())
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve on an already bound listener until the future completes
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> anyhow::Result<()> {
    axum::serve(listener, router(state)).await?;
    Ok(())
}

pub async fn start_server(
    addr: SocketAddr,
    service: RecordService,
    expose_error_detail: bool,
) -> anyhow::Result<()> {
    let state = Arc::new(AppState::new(service, expose_error_detail));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Starting server on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
