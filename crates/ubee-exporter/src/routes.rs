use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;

use ubee_core::traits::{Extractor, PageFetcher};

use crate::dto::HealthResponse;
use crate::error::ApiError;
use crate::metrics;
use crate::state::AppState;

/// Build the router: metrics under the configured path, plus `/` and `/health`.
pub fn router<F, E>(state: Arc<AppState<F, E>>) -> Router
where
    F: PageFetcher + 'static,
    E: Extractor + 'static,
{
    let metrics_path = state.config.metrics_path.clone();

    Router::new()
        .route(&metrics_path, get(scrape_metrics::<F, E>))
        .route("/", get(index::<F, E>))
        .route("/health", get(health))
        .with_state(state)
}

/// Scrape the modem and render the result.
///
/// Always answers 200 when the exposition can be produced; scrape failures
/// show up in the error counter, not in the HTTP status.
pub async fn scrape_metrics<F, E>(
    State(state): State<Arc<AppState<F, E>>>,
) -> Result<Response, ApiError>
where
    F: PageFetcher,
    E: Extractor,
{
    let config = &state.config;
    let result = state
        .service
        .scrape(&config.modem_address, &config.credentials)
        .await;

    let body = metrics::render(&result, state.service.counters().snapshot())?;

    Ok(([(header::CONTENT_TYPE, metrics::content_type())], body).into_response())
}

pub async fn index<F, E>(State(state): State<Arc<AppState<F, E>>>) -> Response
where
    F: PageFetcher,
    E: Extractor,
{
    (
        StatusCode::MOVED_PERMANENTLY,
        [(header::LOCATION, state.config.metrics_path.clone())],
    )
        .into_response()
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
