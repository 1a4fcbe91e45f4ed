//! Storage seams: accounts, order lines, login-attempt counters and the audit log.
//!
//! Services only see these traits. [`postgres::PgStore`] backs them with
//! PostgreSQL; [`memory::MemoryStore`] keeps everything in process for tests
//! and local runs.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{
    audit::AuditEntry,
    models::{Account, LoginAttemptRecord, OrderLine},
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("ORM error: {0}")]
    Orm(#[from] sea_orm::DbErr),

    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Some lines of one order reached the store and the rest did not.
    #[error("partial write: {written} of {expected} order lines persisted")]
    PartialWrite { written: usize, expected: usize },

    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Every account in storage order.
    async fn list_all(&self) -> StoreResult<Vec<Account>>;

    async fn find(&self, user_id: &str) -> StoreResult<Option<Account>>;

    /// Inserts the account unless one with the same `user_id` exists.
    /// Returns whether a row was created.
    async fn append_if_missing(&self, account: Account) -> StoreResult<bool>;

    /// Returns false when the user does not exist.
    async fn set_override(&self, user_id: &str, amount: Option<i64>) -> StoreResult<bool>;

    /// Returns whether an override value was actually removed.
    async fn clear_override(&self, user_id: &str) -> StoreResult<bool>;
}

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn list_all(&self) -> StoreResult<Vec<OrderLine>>;

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<OrderLine>>;

    /// Persists every line of one order. An error other than
    /// [`StoreError::PartialWrite`] means nothing was written.
    async fn append(&self, lines: &[OrderLine]) -> StoreResult<()>;

    /// Deletes lines placed strictly before `cutoff`, returning how many went.
    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<u64>;
}

#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn get(&self, user_id: &str) -> StoreResult<Option<LoginAttemptRecord>>;

    async fn set(&self, user_id: &str, record: &LoginAttemptRecord) -> StoreResult<()>;

    async fn delete(&self, user_id: &str) -> StoreResult<bool>;

    async fn delete_all(&self) -> StoreResult<u64>;
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> StoreResult<()>;
}
