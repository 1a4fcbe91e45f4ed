use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

use crate::{
    response::{ApiResponse, ApiStatus, Meta},
    store::StoreError,
};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("User not found")]
    NotFound,

    #[error("Invalid user ID or PIN. {}", credential_hint(.remaining_attempts, .locked_minutes))]
    InvalidCredentials {
        remaining_attempts: u32,
        locked_minutes: Option<i64>,
    },

    #[error("Account is locked. Try again in {remaining_minutes} minute(s).")]
    Locked { remaining_minutes: i64 },

    #[error("Order total {order_total} exceeds remaining budget {remaining_budget}")]
    BudgetExceeded {
        order_total: i64,
        remaining_budget: i64,
    },

    #[error("Forbidden")]
    Forbidden,

    #[error("Order {order_id} partially recorded ({written} of {expected} lines); reconcile it")]
    PartialWrite {
        order_id: String,
        written: usize,
        expected: usize,
    },

    #[error("Storage is temporarily unavailable")]
    Storage(#[from] StoreError),

    #[error("Internal Server Error")]
    Internal(#[from] anyhow::Error),
}

fn credential_hint(remaining_attempts: &u32, locked_minutes: &Option<i64>) -> String {
    match locked_minutes {
        Some(minutes) => format!("Account locked for {minutes} minute(s)."),
        None => format!("{remaining_attempts} attempt(s) remaining before lockout."),
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorData {
    #[schema(value_type = String)]
    pub error: &'static str,
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "validation",
            AppError::NotFound => "not_found",
            AppError::InvalidCredentials { .. } => "invalid_credentials",
            AppError::Locked { .. } => "locked",
            AppError::BudgetExceeded { .. } => "budget_exceeded",
            AppError::Forbidden => "forbidden",
            AppError::PartialWrite { .. } => "partial_write",
            AppError::Storage(_) => "storage",
            AppError::Internal(_) => "internal",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidCredentials { .. } => StatusCode::UNAUTHORIZED,
            AppError::Locked { .. } => StatusCode::LOCKED,
            AppError::BudgetExceeded { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::PartialWrite { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Storage(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Builds the error envelope. Storage and internal failures are logged
    /// here with full detail; clients only see the generic message.
    pub fn envelope(&self) -> ApiResponse<ErrorData> {
        match self {
            AppError::Storage(source) => tracing::error!(error = %source, "storage failure"),
            AppError::Internal(source) => tracing::error!(error = ?source, "internal error"),
            _ => {}
        }

        ApiResponse {
            status: ApiStatus::Error,
            message: self.to_string(),
            data: Some(ErrorData { error: self.code() }),
            meta: Some(Meta::empty()),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status_code(), axum::Json(self.envelope())).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_message_never_names_the_wrong_field() {
        let err = AppError::InvalidCredentials {
            remaining_attempts: 3,
            locked_minutes: None,
        };
        assert_eq!(
            err.to_string(),
            "Invalid user ID or PIN. 3 attempt(s) remaining before lockout."
        );
    }

    #[test]
    fn storage_detail_stays_out_of_the_message() {
        let err = AppError::from(StoreError::Unavailable("db-host-17 refused".into()));
        assert_eq!(err.envelope().message, "Storage is temporarily unavailable");
        assert_eq!(err.status_code(), StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn budget_message_cites_remaining_amount() {
        let err = AppError::BudgetExceeded {
            order_total: 70_000,
            remaining_budget: 60_000,
        };
        assert!(err.to_string().contains("60000"));
    }
}
