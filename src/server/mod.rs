//! REST API over the client facade.
//!
//! | Method | Path                            |
//! |--------|---------------------------------|
//! | GET    | `/health`                       |
//! | POST   | `/generate`                     |
//! | POST   | `/chat`                         |
//! | POST   | `/batch`                        |
//! | GET    | `/providers`                    |
//! | GET    | `/providers/{provider}/models`  |
//!
//! Failures answer `{"detail": "..."}` with 404 for an unavailable provider,
//! 400 for invalid input or an unsupported model and 500 otherwise.

mod error;
mod handlers;
pub mod models;

pub use error::ApiError;

use std::sync::Arc;

use axum::Router;
use axum::extract::Request;
use axum::http::HeaderValue;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tracing::Instrument;
use uuid::Uuid;

use crate::client::GenAiClient;
use crate::config::Settings;
use crate::error::Result;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Build the API router around a shared client.
pub fn router(client: Arc<GenAiClient>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate", post(handlers::generate))
        .route("/chat", post(handlers::chat))
        .route("/batch", post(handlers::batch))
        .route("/providers", get(handlers::providers))
        .route(
            "/providers/{provider}/models",
            get(handlers::provider_models),
        )
        .layer(middleware::from_fn(request_span))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(client)
}

/// Run every request inside a span carrying a fresh request id.
async fn request_span(req: Request, next: Next) -> Response {
    let request_id = Uuid::new_v4();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    let mut response = next.run(req).instrument(span.clone()).await;
    span.in_scope(|| tracing::debug!(status = response.status().as_u16(), "Request finished"));
    if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

/// Build the client from `settings` and serve until Ctrl-C.
pub async fn serve(settings: &Settings) -> Result<()> {
    let client = Arc::new(GenAiClient::from_settings(settings));
    if client.is_empty() {
        tracing::warn!("No provider is configured; every generation request will fail");
    }

    let address = settings.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(
        %address,
        version = env!("CARGO_PKG_VERSION"),
        providers = ?client.available_providers(),
        "Starting GenAI API server"
    );

    axum::serve(listener, router(client))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Shutting down GenAI API server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
