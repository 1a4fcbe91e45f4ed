use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{budget::BudgetSnapshot, models::OrderLine};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct OrderItemRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub quantity: i64,
    #[serde(default)]
    pub price: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub items: Vec<OrderItemRequest>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PlacedItem {
    pub name: String,
    pub quantity: i32,
    pub price: i64,
    pub total: i64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlacedOrder {
    pub order_id: String,
    pub user_id: String,
    pub items: Vec<PlacedItem>,
    pub total_amount: i64,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<FixedOffset>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order: PlacedOrder,
    pub remaining_budget: i64,
    pub budget: BudgetSnapshot,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OrderList {
    pub items: Vec<OrderLine>,
}
