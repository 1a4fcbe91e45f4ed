use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStatus {
    pub user_id: String,
    pub failed_attempts: u32,
    pub remaining_attempts: u32,
    pub locked: bool,
    pub locked_until: Option<DateTime<Utc>>,
    pub remaining_minutes: Option<i64>,
    pub last_attempt: Option<DateTime<Utc>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetAttemptsRequest {
    /// Omit to reset every user.
    pub user_id: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetAttemptsResponse {
    pub user_id: Option<String>,
    pub cleared: u64,
}
