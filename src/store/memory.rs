use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use super::{AccountStore, AttemptStore, AuditLog, OrderStore, StoreError, StoreResult};
use crate::{
    audit::AuditEntry,
    models::{Account, LoginAttemptRecord, OrderLine},
};

/// In-process backend for every store trait. Rows keep insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    accounts: Mutex<Vec<Account>>,
    orders: Mutex<Vec<OrderLine>>,
    attempts: Mutex<HashMap<String, LoginAttemptRecord>>,
    audit: Mutex<Vec<AuditEntry>>,
    fail_next_append_after: Mutex<Option<usize>>,
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(accounts: Vec<Account>) -> Self {
        Self {
            accounts: Mutex::new(accounts),
            ..Self::default()
        }
    }

    /// Makes the next `append` stop after `written` lines and report a partial write.
    pub async fn fail_next_append_after(&self, written: usize) {
        *self.fail_next_append_after.lock().await = Some(written);
    }

    /// While set, every call fails with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub async fn insert_lines(&self, lines: Vec<OrderLine>) {
        self.orders.lock().await.extend(lines);
    }

    pub async fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.lock().await.clone()
    }

    fn ensure_available(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store switched off".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<Account>> {
        self.ensure_available()?;
        Ok(self.accounts.lock().await.clone())
    }

    async fn find(&self, user_id: &str) -> StoreResult<Option<Account>> {
        self.ensure_available()?;
        let accounts = self.accounts.lock().await;
        Ok(accounts.iter().find(|a| a.user_id == user_id).cloned())
    }

    async fn append_if_missing(&self, account: Account) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut accounts = self.accounts.lock().await;
        if accounts.iter().any(|a| a.user_id == account.user_id) {
            return Ok(false);
        }
        accounts.push(account);
        Ok(true)
    }

    async fn set_override(&self, user_id: &str, amount: Option<i64>) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut accounts = self.accounts.lock().await;
        match accounts.iter_mut().find(|a| a.user_id == user_id) {
            Some(account) => {
                account.master_budget = amount;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_override(&self, user_id: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        let mut accounts = self.accounts.lock().await;
        Ok(accounts
            .iter_mut()
            .find(|a| a.user_id == user_id)
            .and_then(|a| a.master_budget.take())
            .is_some())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn list_all(&self) -> StoreResult<Vec<OrderLine>> {
        self.ensure_available()?;
        Ok(self.orders.lock().await.clone())
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<OrderLine>> {
        self.ensure_available()?;
        let orders = self.orders.lock().await;
        Ok(orders.iter().filter(|o| o.user_id == user_id).cloned().collect())
    }

    async fn append(&self, lines: &[OrderLine]) -> StoreResult<()> {
        self.ensure_available()?;
        let cut = self.fail_next_append_after.lock().await.take();
        let mut orders = self.orders.lock().await;
        match cut {
            Some(written) if written < lines.len() => {
                orders.extend_from_slice(&lines[..written]);
                Err(StoreError::PartialWrite {
                    written,
                    expected: lines.len(),
                })
            }
            _ => {
                orders.extend_from_slice(lines);
                Ok(())
            }
        }
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        self.ensure_available()?;
        let mut orders = self.orders.lock().await;
        let before = orders.len();
        orders.retain(|line| line.placed_at() >= cutoff);
        Ok((before - orders.len()) as u64)
    }
}

#[async_trait]
impl AttemptStore for MemoryStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<LoginAttemptRecord>> {
        self.ensure_available()?;
        Ok(self.attempts.lock().await.get(user_id).cloned())
    }

    async fn set(&self, user_id: &str, record: &LoginAttemptRecord) -> StoreResult<()> {
        self.ensure_available()?;
        self.attempts
            .lock()
            .await
            .insert(user_id.to_string(), record.clone());
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> StoreResult<bool> {
        self.ensure_available()?;
        Ok(self.attempts.lock().await.remove(user_id).is_some())
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        self.ensure_available()?;
        let mut attempts = self.attempts.lock().await;
        let cleared = attempts.len() as u64;
        attempts.clear();
        Ok(cleared)
    }
}

#[async_trait]
impl AuditLog for MemoryStore {
    async fn record(&self, entry: AuditEntry) -> StoreResult<()> {
        self.ensure_available()?;
        self.audit.lock().await.push(entry);
        Ok(())
    }
}
