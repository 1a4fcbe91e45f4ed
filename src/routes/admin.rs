use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};

use crate::{
    dto::{
        admin::{MaintenanceRequest, OverrideResetReport, PurgeReport, SetMasterBudgetRequest},
        budget::BudgetResponse,
        orders::OrderList,
    },
    error::AppResult,
    middleware::auth::AdminAuth,
    response::{ApiResponse, Meta},
    routes::params::OrderListQuery,
    services::{admin_service, maintenance_service, order_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_all_orders))
        .route("/accounts/{user_id}/master-budget", put(set_master_budget))
        .route("/maintenance/reset-overrides", post(reset_overrides))
        .route("/maintenance/purge-orders", post(purge_orders))
}

#[utoipa::path(
    get,
    path = "/api/admin/orders",
    params(OrderListQuery),
    responses(
        (
            status = 200,
            description = "Current month order lines for every user",
            body = ApiResponse<OrderList>
        ),
        (status = 403, description = "Forbidden")
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn list_all_orders(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<OrderListQuery>,
) -> AppResult<Json<ApiResponse<OrderList>>> {
    let resp = order_service::list_all_orders(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/admin/accounts/{user_id}/master-budget",
    params(("user_id" = String, Path, description = "Staff user ID")),
    request_body = SetMasterBudgetRequest,
    responses(
        (
            status = 200,
            description = "Set or clear a master budget override",
            body = ApiResponse<BudgetResponse>
        ),
        (status = 400, description = "Negative amount"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "User not found")
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn set_master_budget(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Path(user_id): Path<String>,
    Json(payload): Json<SetMasterBudgetRequest>,
) -> AppResult<Json<ApiResponse<BudgetResponse>>> {
    let resp = admin_service::set_master_budget(&state, &user_id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/admin/maintenance/reset-overrides",
    params(MaintenanceRequest),
    responses(
        (
            status = 200,
            description = "Clear master budget overrides (1st of month unless forced)",
            body = ApiResponse<OverrideResetReport>
        ),
        (status = 403, description = "Forbidden")
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn reset_overrides(
    State(state): State<AppState>,
    _admin: AdminAuth,
    Query(query): Query<MaintenanceRequest>,
) -> AppResult<Json<ApiResponse<OverrideResetReport>>> {
    let report = maintenance_service::reset_overrides(&state, query.force).await?;
    let message = match report {
        OverrideResetReport::Completed { .. } => "Master budget overrides reset",
        OverrideResetReport::Skipped => "Not the first day of the month; nothing reset",
    };
    Ok(Json(ApiResponse::success(message, report, Some(Meta::empty()))))
}

#[utoipa::path(
    post,
    path = "/api/admin/maintenance/purge-orders",
    responses(
        (
            status = 200,
            description = "Delete order lines past the retention period",
            body = ApiResponse<PurgeReport>
        ),
        (status = 403, description = "Forbidden")
    ),
    security(("admin_key" = [])),
    tag = "Admin"
)]
pub async fn purge_orders(
    State(state): State<AppState>,
    _admin: AdminAuth,
) -> AppResult<Json<ApiResponse<PurgeReport>>> {
    let report = maintenance_service::purge_orders(&state).await?;
    Ok(Json(ApiResponse::success(
        "Old order lines purged",
        report,
        Some(Meta::empty()),
    )))
}
