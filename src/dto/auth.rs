use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{budget::BudgetSnapshot, models::Account};

#[derive(Deserialize, Debug, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub pin: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub user: Account,
    pub budget: BudgetSnapshot,
}
