use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};

use crate::{
    dto::security::{ResetAttemptsRequest, ResetAttemptsResponse, SecurityStatus},
    error::AppResult,
    middleware::auth::AdminAuth,
    response::ApiResponse,
    services::throttle_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users/{user_id}", get(security_status))
        .route("/reset", post(reset_login_attempts))
}

#[utoipa::path(
    get,
    path = "/api/security/users/{user_id}",
    params(("user_id" = String, Path, description = "Staff user ID")),
    responses(
        (
            status = 200,
            description = "Login throttle state for a user",
            body = ApiResponse<SecurityStatus>
        ),
        (status = 403, description = "Forbidden")
    ),
    security(("admin_key" = [])),
    tag = "Security"
)]
pub async fn security_status(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<SecurityStatus>>> {
    let resp = throttle_service::security_status(&state, &user_id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/security/reset",
    request_body = ResetAttemptsRequest,
    responses(
        (
            status = 200,
            description = "Reset login attempts for one user or everyone",
            body = ApiResponse<ResetAttemptsResponse>
        ),
        (status = 403, description = "Forbidden")
    ),
    security(("admin_key" = [])),
    tag = "Security"
)]
pub async fn reset_login_attempts(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Json(payload): Json<ResetAttemptsRequest>,
) -> AppResult<Json<ApiResponse<ResetAttemptsResponse>>> {
    let resp = throttle_service::reset_attempts(&state, payload.user_id.as_deref()).await?;
    Ok(Json(resp))
}
