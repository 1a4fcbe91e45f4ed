use serde::Serialize;
use utoipa::ToSchema;

use crate::budget::BudgetSnapshot;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetResponse {
    pub user_id: String,
    pub budget: BudgetSnapshot,
}
