pub mod api;
mod middleware;

pub use api::{ApiState, build_api_router};
pub use middleware::RequestContext;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::application::error::HttpError;

use self::api::error::ApiError;
use self::middleware::{log_responses, set_request_context};

/// Full application router: song API, health probe, JSON 404s.
pub fn build_router(state: ApiState) -> Router {
    Router::new()
        .merge(build_api_router())
        .route("/health", get(health))
        .fallback(route_not_found)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn health(State(state): State<ApiState>) -> Response {
    match state.songs.health_check().await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => HttpError::from_error(
            "infra::http::health",
            StatusCode::SERVICE_UNAVAILABLE,
            "Service unavailable",
            &err,
        )
        .into_response(),
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
