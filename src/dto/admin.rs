use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetMasterBudgetRequest {
    /// `null` clears the override.
    pub master_budget: Option<i64>,
}

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MaintenanceRequest {
    /// Run the override reset even when today is not the 1st.
    #[serde(default)]
    pub force: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OverrideResetReport {
    Completed {
        #[serde(rename = "resetCount")]
        reset_count: u64,
    },
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgeReport {
    pub deleted: u64,
    #[schema(value_type = String, format = DateTime)]
    pub cutoff: chrono::DateTime<chrono::Utc>,
}
