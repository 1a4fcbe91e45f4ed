//! Monthly housekeeping, triggered from outside (cron calling the
//! `maintenance` binary, or the admin endpoints).

use crate::{
    audit::log_audit,
    dto::admin::{OverrideResetReport, PurgeReport},
    error::AppResult,
    state::AppState,
};

/// Clears every master budget override on the 1st of the business month.
/// On other days it does nothing unless `force` is set. Running it again
/// the same day finds nothing left to clear.
pub async fn reset_overrides(state: &AppState, force: bool) -> AppResult<OverrideResetReport> {
    let now = state.clock.now();
    if !force && !state.calendar.is_first_of_month(now) {
        tracing::info!(
            date = %state.calendar.local(now).date_naive(),
            "override reset skipped: not the 1st"
        );
        return Ok(OverrideResetReport::Skipped);
    }

    let accounts = state.accounts.list_all().await?;
    let mut reset_count = 0u64;
    for account in accounts.iter().filter(|a| a.master_budget.is_some()) {
        if state.accounts.clear_override(&account.user_id).await? {
            reset_count += 1;
        }
    }

    tracing::info!(reset_count, forced = force, "master budget overrides reset");
    log_audit(
        state.audit.as_ref(),
        now,
        None,
        "master_budget_reset",
        Some("accounts"),
        Some(serde_json::json!({ "reset_count": reset_count, "forced": force })),
    )
    .await;

    Ok(OverrideResetReport::Completed { reset_count })
}

/// Deletes order lines placed strictly before `now - retention`.
pub async fn purge_orders(state: &AppState) -> AppResult<PurgeReport> {
    let now = state.clock.now();
    let cutoff = now - state.policy.retention();
    let deleted = state.orders.delete_older_than(cutoff).await?;

    tracing::info!(deleted, %cutoff, "old order lines purged");
    log_audit(
        state.audit.as_ref(),
        now,
        None,
        "order_retention_purge",
        Some("order_lines"),
        Some(serde_json::json!({ "deleted": deleted, "cutoff": cutoff })),
    )
    .await;

    Ok(PurgeReport { deleted, cutoff })
}
