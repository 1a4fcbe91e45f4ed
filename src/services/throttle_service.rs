//! Per-user login throttling.
//!
//! `OPEN(n)` moves to `OPEN(n + 1)` on each failure and to `LOCKED(until)` on
//! the failure that reaches the threshold. A success always lands on `OPEN(0)`.
//! Nothing wakes a lock up: an expired lock is noticed and cleared on the next
//! check. Callers on the login path hold `state.login_locks` for the user
//! around these read-modify-writes.

use chrono::{DateTime, Utc};

use crate::{
    audit::log_audit,
    dto::security::{ResetAttemptsResponse, SecurityStatus},
    error::{AppError, AppResult},
    models::LoginAttemptRecord,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Fails with [`AppError::Locked`] while a lock is active. Returns the record
/// to build on, already reset when its lock has run out.
pub async fn ensure_not_locked(
    state: &AppState,
    user_id: &str,
    now: DateTime<Utc>,
) -> AppResult<Option<LoginAttemptRecord>> {
    let record = state.attempts.get(user_id).await?;
    match record {
        Some(record) if record.is_locked_at(now) => {
            let remaining_minutes = record
                .locked_until
                .map_or(0, |until| minutes_until(until, now));
            tracing::warn!(user_id, remaining_minutes, "login refused: account locked");
            Err(AppError::Locked { remaining_minutes })
        }
        Some(record) if record.lock_expired_at(now) => {
            let reopened = LoginAttemptRecord {
                count: 0,
                last_attempt: record.last_attempt,
                locked_until: None,
            };
            state.attempts.set(user_id, &reopened).await?;
            tracing::info!(user_id, "lockout expired, counter reset");
            Ok(Some(reopened))
        }
        other => Ok(other),
    }
}

pub async fn record_failure(
    state: &AppState,
    user_id: &str,
    previous: Option<&LoginAttemptRecord>,
    now: DateTime<Utc>,
) -> AppResult<LoginAttemptRecord> {
    let record = LoginAttemptRecord::after_failure(previous, now, &state.policy);
    state.attempts.set(user_id, &record).await?;

    if let Some(until) = record.locked_until {
        tracing::warn!(
            user_id,
            attempts = record.count,
            %until,
            "account locked after repeated failures"
        );
        log_audit(
            state.audit.as_ref(),
            now,
            Some(user_id),
            "account_locked",
            Some("login_attempts"),
            Some(serde_json::json!({ "attempts": record.count, "locked_until": until })),
        )
        .await;
    } else {
        tracing::warn!(
            user_id,
            attempts = record.count,
            remaining = record.remaining_attempts(&state.policy),
            "failed login attempt"
        );
    }

    Ok(record)
}

pub async fn record_success(state: &AppState, user_id: &str, now: DateTime<Utc>) -> AppResult<()> {
    state
        .attempts
        .set(user_id, &LoginAttemptRecord::cleared(now))
        .await?;
    Ok(())
}

pub async fn security_status(
    state: &AppState,
    user_id: &str,
) -> AppResult<ApiResponse<SecurityStatus>> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::Validation("User ID is required".into()));
    }

    let now = state.clock.now();
    let record = state
        .attempts
        .get(user_id)
        .await?
        .filter(|record| !record.lock_expired_at(now));

    let status = match record {
        Some(record) => SecurityStatus {
            user_id: user_id.to_string(),
            failed_attempts: record.count,
            remaining_attempts: record.remaining_attempts(&state.policy),
            locked: record.is_locked_at(now),
            locked_until: record.locked_until,
            remaining_minutes: record.locked_until.map(|until| minutes_until(until, now)),
            last_attempt: Some(record.last_attempt),
        },
        None => SecurityStatus {
            user_id: user_id.to_string(),
            failed_attempts: 0,
            remaining_attempts: state.policy.max_login_attempts,
            locked: false,
            locked_until: None,
            remaining_minutes: None,
            last_attempt: None,
        },
    };

    Ok(ApiResponse::success("Security status", status, Some(Meta::empty())))
}

pub async fn reset_attempts(
    state: &AppState,
    user_id: Option<&str>,
) -> AppResult<ApiResponse<ResetAttemptsResponse>> {
    let user_id = user_id.map(str::trim).filter(|id| !id.is_empty());

    let cleared = match user_id {
        Some(id) => {
            let _guard = state.login_locks.acquire(id).await;
            u64::from(state.attempts.delete(id).await?)
        }
        None => state.attempts.delete_all().await?,
    };

    tracing::info!(user_id = user_id.unwrap_or("*"), cleared, "login attempts reset");
    log_audit(
        state.audit.as_ref(),
        state.clock.now(),
        user_id,
        "login_attempts_reset",
        Some("login_attempts"),
        Some(serde_json::json!({ "cleared": cleared })),
    )
    .await;

    Ok(ApiResponse::success(
        "Login attempts reset",
        ResetAttemptsResponse {
            user_id: user_id.map(str::to_string),
            cleared,
        },
        Some(Meta::empty()),
    ))
}

/// Whole minutes left on a lock, rounded up, never below 1.
fn minutes_until(until: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let seconds = (until - now).num_seconds().max(1);
    (seconds + 59) / 60
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn remaining_minutes_round_up() {
        let now = Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap();
        assert_eq!(minutes_until(now + Duration::minutes(30), now), 30);
        assert_eq!(minutes_until(now + Duration::seconds(61), now), 2);
        assert_eq!(minutes_until(now + Duration::milliseconds(200), now), 1);
    }
}
