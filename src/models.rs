use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::config::Policy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub user_id: String,
    #[serde(skip_serializing, default)]
    pub pin: String,
    pub monthly_budget: i64,
    pub master_budget: Option<i64>,
    #[serde(default)]
    pub delivery_address: String,
    #[serde(default)]
    pub recipient: String,
    #[serde(default)]
    pub phone: String,
}

impl Account {
    /// Stored pins may carry stray whitespace from hand-edited rows.
    pub fn pin_matches(&self, pin: &str) -> bool {
        self.pin.trim() == pin
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub order_id: String,
    pub user_id: String,
    pub item_name: String,
    pub quantity: i32,
    pub unit_price: i64,
    pub line_total: i64,
    #[schema(value_type = String, format = DateTime)]
    pub timestamp: DateTime<FixedOffset>,
    pub delivery_address: String,
    pub recipient: String,
    pub phone: String,
}

impl OrderLine {
    pub fn placed_at(&self) -> DateTime<Utc> {
        self.timestamp.with_timezone(&Utc)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginAttemptRecord {
    pub count: u32,
    pub last_attempt: DateTime<Utc>,
    pub locked_until: Option<DateTime<Utc>>,
}

impl LoginAttemptRecord {
    pub fn cleared(now: DateTime<Utc>) -> Self {
        Self {
            count: 0,
            last_attempt: now,
            locked_until: None,
        }
    }

    /// Next state after a failed attempt; locks once the count reaches the threshold.
    pub fn after_failure(previous: Option<&Self>, now: DateTime<Utc>, policy: &Policy) -> Self {
        let count = previous.map_or(0, |r| r.count).saturating_add(1);
        let locked_until =
            (count >= policy.max_login_attempts).then(|| now + policy.lockout_duration());
        Self {
            count,
            last_attempt: now,
            locked_until,
        }
    }

    pub fn is_locked_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    pub fn lock_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.locked_until.is_some_and(|until| until <= now)
    }

    pub fn remaining_attempts(&self, policy: &Policy) -> u32 {
        policy.max_login_attempts.saturating_sub(self.count)
    }
}

/// Reads a budget cell the way staff type them: `"100,000"`, `" 5000 "`, `"12000원"`.
/// Anything without a leading non-negative integer reads as 0.
pub fn parse_amount(raw: &str) -> i64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    let digits: String = cleaned
        .strip_prefix('+')
        .unwrap_or(&cleaned)
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    digits.parse::<i64>().unwrap_or(0)
}

/// A blank override cell means "no override"; any other content is an override.
pub fn parse_override(raw: Option<&str>) -> Option<i64> {
    raw.filter(|v| !v.trim().is_empty()).map(parse_amount)
}
