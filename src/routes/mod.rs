use axum::{
    Json, Router,
    http::{StatusCode, Uri},
    routing::get,
};

use crate::{
    error::ErrorData,
    response::ApiResponse,
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod budget;
pub mod doc;
pub mod exec;
pub mod health;
pub mod orders;
pub mod params;
pub mod security;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/budget", budget::router())
        .nest("/orders", orders::router())
        .nest("/security", security::router())
        .nest("/admin", admin::router())
}

/// Every route the service exposes, state bound. Transport layers (tracing,
/// request ids, limits, CORS) are added by the binary.
pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/exec", get(exec::exec))
        .nest("/api", create_api_router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found(uri: Uri) -> (StatusCode, Json<ApiResponse<ErrorData>>) {
    tracing::debug!(path = uri.path(), "no route");
    let body = ApiResponse::failure("Not Found", Some(ErrorData { error: "not_found" }));
    (StatusCode::NOT_FOUND, Json(body))
}
