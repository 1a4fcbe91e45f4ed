use crate::{
    audit::log_audit,
    dto::auth::{LoginRequest, LoginResponse},
    error::{AppError, AppResult},
    response::{ApiResponse, Meta},
    services::{budget_service, throttle_service},
    state::AppState,
};

/// Staff login by user id and PIN.
///
/// The lock check runs before any credential comparison, so a locked account
/// gives the same answer whether or not the PIN was right. Failures are counted
/// for any supplied id, known or not.
pub async fn login_user(
    state: &AppState,
    payload: LoginRequest,
) -> AppResult<ApiResponse<LoginResponse>> {
    let user_id = payload.user_id.trim();
    let pin = payload.pin.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("User ID is required".into()));
    }
    if pin.is_empty() {
        return Err(AppError::Validation("PIN is required".into()));
    }

    let _guard = state.login_locks.acquire(user_id).await;
    let now = state.clock.now();

    let previous = throttle_service::ensure_not_locked(state, user_id, now).await?;

    let account = state
        .accounts
        .find(user_id)
        .await?
        .filter(|account| account.pin_matches(pin));

    let Some(account) = account else {
        let record =
            throttle_service::record_failure(state, user_id, previous.as_ref(), now).await?;
        log_audit(
            state.audit.as_ref(),
            now,
            Some(user_id),
            "login_failed",
            Some("accounts"),
            Some(serde_json::json!({ "attempts": record.count })),
        )
        .await;
        return Err(AppError::InvalidCredentials {
            remaining_attempts: record.remaining_attempts(&state.policy),
            locked_minutes: record.locked_until.map(|_| state.policy.lockout_minutes),
        });
    };

    throttle_service::record_success(state, user_id, now).await?;
    let budget = budget_service::snapshot_for(state, &account, now).await?;

    tracing::info!(user_id, remaining = budget.remaining_budget, "login succeeded");
    log_audit(
        state.audit.as_ref(),
        now,
        Some(user_id),
        "user_login",
        Some("accounts"),
        None,
    )
    .await;

    Ok(ApiResponse::success(
        "Logged in",
        LoginResponse {
            user: account,
            budget,
        },
        Some(Meta::empty()),
    ))
}
