//! Monthly budget arithmetic.
//!
//! The effective budget is the override (`master_budget`) whenever one is set,
//! zero included, and the monthly allotment otherwise. Spending is the sum of
//! line totals this user placed inside the current business month. The remaining
//! figure is not clamped: an override lowered mid-month can push it negative.

use serde::Serialize;
use utoipa::ToSchema;

use crate::{
    clock::MonthWindow,
    models::{Account, OrderLine},
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSnapshot {
    pub total_budget: i64,
    pub monthly_total: i64,
    pub remaining_budget: i64,
    pub is_override_active: bool,
    pub monthly_budget: i64,
    pub master_budget: Option<i64>,
}

pub fn effective_budget(account: &Account) -> i64 {
    account.master_budget.unwrap_or(account.monthly_budget)
}

pub fn monthly_spend<'a>(
    user_id: &str,
    lines: impl IntoIterator<Item = &'a OrderLine>,
    window: &MonthWindow,
) -> i64 {
    lines
        .into_iter()
        .filter(|line| line.user_id == user_id && window.contains(line.placed_at()))
        .map(|line| line.line_total)
        .sum()
}

pub fn current_budget(
    account: &Account,
    lines: &[OrderLine],
    window: &MonthWindow,
) -> BudgetSnapshot {
    let total_budget = effective_budget(account);
    let monthly_total = monthly_spend(&account.user_id, lines, window);
    BudgetSnapshot {
        total_budget,
        monthly_total,
        remaining_budget: total_budget - monthly_total,
        is_override_active: account.master_budget.is_some(),
        monthly_budget: account.monthly_budget,
        master_budget: account.master_budget,
    }
}
