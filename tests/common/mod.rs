#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use kitchen_budget_api::{
    clock::{BusinessCalendar, FixedClock},
    config::Policy,
    models::{Account, OrderLine},
    state::AppState,
    store::memory::MemoryStore,
};

pub const ADMIN_KEY: &str = "test-admin-key";

pub struct Harness {
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
    pub state: AppState,
}

pub fn harness(now: DateTime<Utc>, accounts: Vec<Account>) -> Harness {
    let store = Arc::new(MemoryStore::with_accounts(accounts));
    let clock = Arc::new(FixedClock::new(now));
    let state = AppState::new(store.clone(), clock.clone(), Policy::default())
        .with_admin_key(Some(ADMIN_KEY.to_string()));
    Harness { store, clock, state }
}

pub fn account(user_id: &str, pin: &str, monthly: i64) -> Account {
    Account {
        user_id: user_id.into(),
        pin: pin.into(),
        monthly_budget: monthly,
        master_budget: None,
        delivery_address: "Main kitchen".into(),
        recipient: "Kitchen Team".into(),
        phone: "010-0000-0000".into(),
    }
}

/// A UTC+9 wall-clock time as a UTC instant.
pub fn kst(year: i32, month: u32, day: u32, hour: u32, min: u32) -> DateTime<Utc> {
    BusinessCalendar::new(9)
        .offset()
        .with_ymd_and_hms(year, month, day, hour, min, 0)
        .single()
        .expect("valid local time")
        .with_timezone(&Utc)
}

pub fn line(user_id: &str, total: i64, at: DateTime<Utc>) -> OrderLine {
    OrderLine {
        order_id: format!("order_{}_seeded000", at.timestamp_millis()),
        user_id: user_id.into(),
        item_name: "rice".into(),
        quantity: 1,
        unit_price: total,
        line_total: total,
        timestamp: BusinessCalendar::new(9).local(at),
        delivery_address: "Main kitchen".into(),
        recipient: "Kitchen Team".into(),
        phone: "010-0000-0000".into(),
    }
}
