use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait};
use uuid::Uuid;

use super::{AccountStore, AttemptStore, AuditLog, OrderStore, StoreResult};
use crate::{
    audit::AuditEntry,
    clock::BusinessCalendar,
    db::{DbPool, OrmConn, create_orm_conn, create_pool},
    entity::{
        accounts::{
            ActiveModel as AccountActive, Column as AccountCol, Entity as Accounts,
            Model as AccountModel,
        },
        order_lines::{
            ActiveModel as OrderLineActive, Column as OrderLineCol, Entity as OrderLines,
            Model as OrderLineModel,
        },
    },
    models::{Account, LoginAttemptRecord, OrderLine, parse_amount, parse_override},
};

/// PostgreSQL backend. Accounts and order lines go through SeaORM; the
/// login-attempt counters and audit rows use plain sqlx statements.
#[derive(Clone)]
pub struct PgStore {
    orm: OrmConn,
    pool: DbPool,
    calendar: BusinessCalendar,
}

impl PgStore {
    pub fn new(orm: OrmConn, pool: DbPool, calendar: BusinessCalendar) -> Self {
        Self { orm, pool, calendar }
    }

    pub async fn connect(database_url: &str, calendar: BusinessCalendar) -> anyhow::Result<Self> {
        let orm = create_orm_conn(database_url).await?;
        let pool = create_pool(database_url).await?;
        Ok(Self::new(orm, pool, calendar))
    }

    pub fn orm(&self) -> &OrmConn {
        &self.orm
    }

    fn line_from_entity(&self, model: OrderLineModel) -> OrderLine {
        OrderLine {
            order_id: model.order_id,
            user_id: model.user_id,
            item_name: model.item_name,
            quantity: model.quantity,
            unit_price: model.unit_price,
            line_total: model.line_total,
            timestamp: self.calendar.local(model.ordered_at.with_timezone(&Utc)),
            delivery_address: model.delivery_address,
            recipient: model.recipient,
            phone: model.phone,
        }
    }
}

fn account_from_entity(model: AccountModel) -> Account {
    Account {
        user_id: model.user_id,
        pin: model.pin,
        monthly_budget: parse_amount(&model.monthly_budget),
        master_budget: parse_override(model.master_budget.as_deref()),
        delivery_address: model.delivery_address.unwrap_or_default(),
        recipient: model.recipient.unwrap_or_default(),
        phone: model.phone.unwrap_or_default(),
    }
}

#[async_trait]
impl AccountStore for PgStore {
    async fn list_all(&self) -> StoreResult<Vec<Account>> {
        let accounts = Accounts::find()
            .order_by_asc(AccountCol::CreatedAt)
            .order_by_asc(AccountCol::UserId)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(account_from_entity)
            .collect();
        Ok(accounts)
    }

    async fn find(&self, user_id: &str) -> StoreResult<Option<Account>> {
        let account = Accounts::find_by_id(user_id.to_string())
            .one(&self.orm)
            .await?
            .map(account_from_entity);
        Ok(account)
    }

    async fn append_if_missing(&self, account: Account) -> StoreResult<bool> {
        let active = AccountActive {
            user_id: Set(account.user_id),
            pin: Set(account.pin),
            monthly_budget: Set(account.monthly_budget.to_string()),
            master_budget: Set(account.master_budget.map(|v| v.to_string())),
            delivery_address: Set(Some(account.delivery_address)),
            recipient: Set(Some(account.recipient)),
            phone: Set(Some(account.phone)),
            created_at: NotSet,
        };
        let inserted = Accounts::insert(active)
            .on_conflict(
                OnConflict::column(AccountCol::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.orm)
            .await?;
        Ok(inserted > 0)
    }

    async fn set_override(&self, user_id: &str, amount: Option<i64>) -> StoreResult<bool> {
        let result = Accounts::update_many()
            .col_expr(AccountCol::MasterBudget, Expr::value(amount.map(|v| v.to_string())))
            .filter(AccountCol::UserId.eq(user_id))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected > 0)
    }

    async fn clear_override(&self, user_id: &str) -> StoreResult<bool> {
        let result = Accounts::update_many()
            .col_expr(AccountCol::MasterBudget, Expr::value(Option::<String>::None))
            .filter(AccountCol::UserId.eq(user_id))
            .filter(AccountCol::MasterBudget.is_not_null())
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected > 0)
    }
}

#[async_trait]
impl OrderStore for PgStore {
    async fn list_all(&self) -> StoreResult<Vec<OrderLine>> {
        let lines = OrderLines::find()
            .order_by_asc(OrderLineCol::OrderedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|m| self.line_from_entity(m))
            .collect();
        Ok(lines)
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<OrderLine>> {
        let lines = OrderLines::find()
            .filter(OrderLineCol::UserId.eq(user_id))
            .order_by_asc(OrderLineCol::OrderedAt)
            .all(&self.orm)
            .await?
            .into_iter()
            .map(|m| self.line_from_entity(m))
            .collect();
        Ok(lines)
    }

    async fn append(&self, lines: &[OrderLine]) -> StoreResult<()> {
        if lines.is_empty() {
            return Ok(());
        }

        let rows = lines.iter().map(|line| OrderLineActive {
            id: Set(Uuid::new_v4()),
            order_id: Set(line.order_id.clone()),
            user_id: Set(line.user_id.clone()),
            item_name: Set(line.item_name.clone()),
            quantity: Set(line.quantity),
            unit_price: Set(line.unit_price),
            line_total: Set(line.line_total),
            ordered_at: Set(line.timestamp),
            delivery_address: Set(line.delivery_address.clone()),
            recipient: Set(line.recipient.clone()),
            phone: Set(line.phone.clone()),
        });

        // One transaction per order: either every line lands or none do.
        let txn = self.orm.begin().await?;
        OrderLines::insert_many(rows)
            .exec_without_returning(&txn)
            .await?;
        txn.commit().await?;
        Ok(())
    }

    async fn delete_older_than(&self, cutoff: DateTime<Utc>) -> StoreResult<u64> {
        let result = OrderLines::delete_many()
            .filter(OrderLineCol::OrderedAt.lt(cutoff))
            .exec(&self.orm)
            .await?;
        Ok(result.rows_affected)
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn get(&self, user_id: &str) -> StoreResult<Option<LoginAttemptRecord>> {
        let row: Option<(i32, DateTime<Utc>, Option<DateTime<Utc>>)> = sqlx::query_as(
            "SELECT count, last_attempt, locked_until FROM login_attempts WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(count, last_attempt, locked_until)| LoginAttemptRecord {
            count: u32::try_from(count).unwrap_or(0),
            last_attempt,
            locked_until,
        }))
    }

    async fn set(&self, user_id: &str, record: &LoginAttemptRecord) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO login_attempts (user_id, count, last_attempt, locked_until)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE
            SET count = EXCLUDED.count,
                last_attempt = EXCLUDED.last_attempt,
                locked_until = EXCLUDED.locked_until
            "#,
        )
        .bind(user_id)
        .bind(i32::try_from(record.count).unwrap_or(i32::MAX))
        .bind(record.last_attempt)
        .bind(record.locked_until)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM login_attempts WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM login_attempts")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl AuditLog for PgStore {
    async fn record(&self, entry: AuditEntry) -> StoreResult<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (id, user_id, action, resource, metadata, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(entry.id)
        .bind(entry.user_id)
        .bind(entry.action)
        .bind(entry.resource)
        .bind(entry.metadata)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
