use crate::{models::Account, store::{AccountStore, StoreResult}};

/// Demo staff accounts used by the `seed` binary and the in-memory backend.
pub fn sample_accounts() -> Vec<Account> {
    vec![
        Account {
            user_id: "A1".into(),
            pin: "9999".into(),
            monthly_budget: 100_000,
            master_budget: None,
            delivery_address: "Main kitchen, 1F".into(),
            recipient: "Kitchen Team A".into(),
            phone: "010-0000-0001".into(),
        },
        Account {
            user_id: "B2".into(),
            pin: "1234".into(),
            monthly_budget: 150_000,
            master_budget: None,
            delivery_address: "Annex kitchen, B1".into(),
            recipient: "Kitchen Team B".into(),
            phone: "010-0000-0002".into(),
        },
    ]
}

/// Inserts the accounts that are not there yet. Returns how many were added.
pub async fn seed_accounts(store: &dyn AccountStore, accounts: Vec<Account>) -> StoreResult<usize> {
    let mut added = 0;
    for account in accounts {
        let user_id = account.user_id.clone();
        if store.append_if_missing(account).await? {
            tracing::info!(user_id = %user_id, "account seeded");
            added += 1;
        }
    }
    Ok(added)
}
