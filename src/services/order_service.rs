use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::orders::{
        OrderItemRequest, OrderList, PlaceOrderRequest, PlaceOrderResponse, PlacedItem, PlacedOrder,
    },
    error::{AppError, AppResult},
    models::OrderLine,
    response::{ApiResponse, Meta},
    routes::params::{OrderListQuery, SortOrder},
    services::budget_service,
    state::AppState,
    store::StoreError,
};

/// Admits an order against the user's remaining budget and records its lines.
///
/// The budget is recomputed from stored orders while the user's order lock is
/// held, so concurrent submissions for one user are checked one after another.
/// All lines share one order id and one timestamp.
pub async fn place_order(
    state: &AppState,
    payload: PlaceOrderRequest,
) -> AppResult<ApiResponse<PlaceOrderResponse>> {
    let user_id = payload.user_id.trim().to_string();
    if user_id.is_empty() {
        return Err(AppError::Validation("User ID is required".into()));
    }
    let (items, total_amount) = validate_items(&payload.items)?;

    let _guard = state.order_locks.acquire(&user_id).await;
    let now = state.clock.now();

    let account = budget_service::find_account(state, &user_id).await?;
    let before = budget_service::snapshot_for(state, &account, now).await?;
    if total_amount > before.remaining_budget {
        tracing::info!(
            user_id = %user_id,
            total_amount,
            remaining = before.remaining_budget,
            "order rejected: budget exceeded"
        );
        return Err(AppError::BudgetExceeded {
            order_total: total_amount,
            remaining_budget: before.remaining_budget,
        });
    }

    let order_id = generate_order_id(now);
    let timestamp = state.calendar.local(now);
    let lines: Vec<OrderLine> = items
        .iter()
        .map(|item| OrderLine {
            order_id: order_id.clone(),
            user_id: account.user_id.clone(),
            item_name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.price,
            line_total: item.total,
            timestamp,
            delivery_address: account.delivery_address.clone(),
            recipient: account.recipient.clone(),
            phone: account.phone.clone(),
        })
        .collect();

    match state.orders.append(&lines).await {
        Ok(()) => {}
        Err(StoreError::PartialWrite { written, expected }) => {
            tracing::error!(
                order_id = %order_id,
                user_id = %user_id,
                written,
                expected,
                "order partially recorded; manual reconciliation required"
            );
            log_audit(
                state.audit.as_ref(),
                now,
                Some(user_id.as_str()),
                "order_reconciliation_required",
                Some("order_lines"),
                Some(serde_json::json!({
                    "order_id": order_id,
                    "written": written,
                    "expected": expected,
                })),
            )
            .await;
            return Err(AppError::PartialWrite {
                order_id,
                written,
                expected,
            });
        }
        Err(err) => return Err(err.into()),
    }

    let after = budget_service::snapshot_for(state, &account, now).await?;

    tracing::info!(
        order_id = %order_id,
        user_id = %user_id,
        lines = lines.len(),
        total_amount,
        remaining = after.remaining_budget,
        "order recorded"
    );
    log_audit(
        state.audit.as_ref(),
        now,
        Some(user_id.as_str()),
        "order_placed",
        Some("order_lines"),
        Some(serde_json::json!({ "order_id": order_id, "total_amount": total_amount })),
    )
    .await;

    Ok(ApiResponse::success(
        "Order placed",
        PlaceOrderResponse {
            order: PlacedOrder {
                order_id,
                user_id: account.user_id,
                items,
                total_amount,
                timestamp,
            },
            remaining_budget: after.remaining_budget,
            budget: after,
        },
        Some(Meta::empty()),
    ))
}

/// This month's lines for one user, newest first unless asked otherwise.
pub async fn list_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let user_id = query
        .user_id
        .as_deref()
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::Validation("User ID is required".into()))?;

    let now = state.clock.now();
    let lines = state.orders.list_for_user(user_id).await?;
    paginate_current_month(state, lines, now, &query)
}

/// This month's lines for every user.
pub async fn list_all_orders(
    state: &AppState,
    query: OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let now = state.clock.now();
    let lines = state.orders.list_all().await?;
    paginate_current_month(state, lines, now, &query)
}

fn paginate_current_month(
    state: &AppState,
    lines: Vec<OrderLine>,
    now: DateTime<Utc>,
    query: &OrderListQuery,
) -> AppResult<ApiResponse<OrderList>> {
    let (page, limit, offset) = query.pagination().normalize();
    let window = state.calendar.month_window(now);

    let mut current: Vec<OrderLine> = lines
        .into_iter()
        .filter(|line| window.contains(line.placed_at()))
        .collect();
    match query.sort_order.unwrap_or_default() {
        SortOrder::Asc => current.sort_by(|a, b| a.timestamp.cmp(&b.timestamp)),
        SortOrder::Desc => current.sort_by(|a, b| b.timestamp.cmp(&a.timestamp)),
    }

    let total = current.len() as i64;
    let items = current
        .into_iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .collect();

    Ok(ApiResponse::success(
        "Ok",
        OrderList { items },
        Some(Meta::new(page, limit, total)),
    ))
}

fn validate_items(items: &[OrderItemRequest]) -> AppResult<(Vec<PlacedItem>, i64)> {
    if items.is_empty() {
        return Err(AppError::Validation("Order must contain at least one item".into()));
    }

    let mut placed = Vec::with_capacity(items.len());
    let mut total_amount: i64 = 0;
    for (idx, item) in items.iter().enumerate() {
        let position = idx + 1;
        let name = item.name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(format!("Item {position} is missing a name")));
        }
        if item.quantity <= 0 {
            return Err(AppError::Validation(format!("Item {position} needs a positive quantity")));
        }
        if item.price <= 0 {
            return Err(AppError::Validation(format!("Item {position} needs a positive price")));
        }
        let quantity = i32::try_from(item.quantity)
            .map_err(|_| AppError::Validation(format!("Item {position} quantity is too large")))?;
        let total = item
            .quantity
            .checked_mul(item.price)
            .ok_or_else(|| AppError::Validation(format!("Item {position} total is too large")))?;
        total_amount = total_amount
            .checked_add(total)
            .ok_or_else(|| AppError::Validation("Order total is too large".into()))?;

        placed.push(PlacedItem {
            name: name.to_string(),
            quantity,
            price: item.price,
            total,
        });
    }

    Ok((placed, total_amount))
}

/// `order_<epoch millis>_<9 base-36 chars>`. Unique enough for one kitchen,
/// not a cryptographic guarantee.
fn generate_order_id(now: DateTime<Utc>) -> String {
    let suffix: String = Uuid::new_v4()
        .as_bytes()
        .iter()
        .take(9)
        .map(|b| char::from_digit(u32::from(*b) % 36, 36).unwrap_or('0'))
        .collect();
    format!("order_{}_{}", now.timestamp_millis(), suffix)
}
