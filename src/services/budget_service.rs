use chrono::{DateTime, Utc};

use crate::{
    budget::{BudgetSnapshot, current_budget},
    dto::budget::BudgetResponse,
    error::{AppError, AppResult},
    models::Account,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Looks an account up by id, always from the store.
pub async fn find_account(state: &AppState, user_id: &str) -> AppResult<Account> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("User ID is required".into()));
    }
    state
        .accounts
        .find(user_id)
        .await?
        .ok_or(AppError::NotFound)
}

/// Budget for `account` as of `now`, from the orders currently stored.
pub async fn snapshot_for(
    state: &AppState,
    account: &Account,
    now: DateTime<Utc>,
) -> AppResult<BudgetSnapshot> {
    let window = state.calendar.month_window(now);
    let lines = state.orders.list_for_user(&account.user_id).await?;
    Ok(current_budget(account, &lines, &window))
}

pub async fn get_budget(state: &AppState, user_id: &str) -> AppResult<ApiResponse<BudgetResponse>> {
    let now = state.clock.now();
    let account = find_account(state, user_id).await?;
    let budget = snapshot_for(state, &account, now).await?;

    Ok(ApiResponse::success(
        "Budget",
        BudgetResponse {
            user_id: account.user_id,
            budget,
        },
        Some(Meta::empty()),
    ))
}
