use crate::{
    audit::log_audit,
    dto::{admin::SetMasterBudgetRequest, budget::BudgetResponse},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::budget_service,
    state::AppState,
};

/// Sets or clears one user's master budget override.
pub async fn set_master_budget(
    state: &AppState,
    user_id: &str,
    payload: SetMasterBudgetRequest,
) -> AppResult<ApiResponse<BudgetResponse>> {
    if payload.master_budget.is_some_and(|amount| amount < 0) {
        return Err(AppError::Validation("Master budget cannot be negative".into()));
    }

    let account = budget_service::find_account(state, user_id).await?;
    if !state
        .accounts
        .set_override(&account.user_id, payload.master_budget)
        .await?
    {
        return Err(AppError::NotFound);
    }

    let now = state.clock.now();
    let account = budget_service::find_account(state, &account.user_id).await?;
    let budget = budget_service::snapshot_for(state, &account, now).await?;

    tracing::info!(
        user_id = %account.user_id,
        master_budget = ?payload.master_budget,
        "master budget updated"
    );
    log_audit(
        state.audit.as_ref(),
        now,
        Some(account.user_id.as_str()),
        "master_budget_set",
        Some("accounts"),
        Some(serde_json::json!({ "master_budget": payload.master_budget })),
    )
    .await;

    Ok(ApiResponse::success(
        "Master budget updated",
        BudgetResponse {
            user_id: account.user_id,
            budget,
        },
        Some(Meta::empty()),
    ))
}
