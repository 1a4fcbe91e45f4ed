use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::AppError, state::AppState};

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Proof that the request carried the configured admin key.
#[derive(Debug, Clone, Copy)]
pub struct AdminAuth;

/// With no key configured every admin call is refused.
pub fn ensure_admin_key(state: &AppState, supplied: Option<&str>) -> Result<AdminAuth, AppError> {
    let expected = state.admin_api_key.as_deref().ok_or(AppError::Forbidden)?;
    match supplied.map(str::trim) {
        Some(key) if key == expected => Ok(AdminAuth),
        _ => {
            tracing::warn!("admin request rejected");
            Err(AppError::Forbidden)
        }
    }
}

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let supplied = parts
            .headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|value| value.to_str().ok());
        ensure_admin_key(state, supplied)
    }
}
