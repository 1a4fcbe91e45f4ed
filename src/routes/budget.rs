use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};

use crate::{
    dto::budget::BudgetResponse,
    error::AppResult,
    response::ApiResponse,
    services::budget_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new().route("/{user_id}", get(get_budget))
}

#[utoipa::path(
    get,
    path = "/api/budget/{user_id}",
    params(("user_id" = String, Path, description = "Staff user ID")),
    responses(
        (status = 200, description = "Current month budget", body = ApiResponse<BudgetResponse>),
        (status = 404, description = "User not found")
    ),
    tag = "Budget"
)]
pub async fn get_budget(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<ApiResponse<BudgetResponse>>> {
    let resp = budget_service::get_budget(&state, &user_id).await?;
    Ok(Json(resp))
}
