mod common;

use chrono::Duration;
use common::{account, harness, kst, line};
use kitchen_budget_api::{
    dto::orders::{OrderItemRequest, PlaceOrderRequest},
    error::AppError,
    routes::params::OrderListQuery,
    services::{budget_service, order_service},
};

fn order(user_id: &str, items: &[(&str, i64, i64)]) -> PlaceOrderRequest {
    PlaceOrderRequest {
        user_id: user_id.into(),
        items: items
            .iter()
            .map(|(name, quantity, price)| OrderItemRequest {
                name: (*name).into(),
                quantity: *quantity,
                price: *price,
            })
            .collect(),
    }
}

#[tokio::test]
async fn a1_orders_then_overspends() -> anyhow::Result<()> {
    let h = harness(kst(2025, 8, 12, 10, 0), vec![account("A1", "9999", 100_000)]);

    let placed = order_service::place_order(&h.state, order("A1", &[("rice", 2, 20_000)])).await?;
    let data = placed.data.expect("order data");
    assert_eq!(data.order.total_amount, 40_000);
    assert_eq!(data.remaining_budget, 60_000);
    assert_eq!(data.budget.monthly_total, 40_000);
    assert!(data.order.order_id.starts_with("order_"));

    let err = order_service::place_order(&h.state, order("A1", &[("beef", 1, 70_000)]))
        .await
        .expect_err("over budget");
    match err {
        AppError::BudgetExceeded {
            order_total,
            remaining_budget,
        } => {
            assert_eq!(order_total, 70_000);
            assert_eq!(remaining_budget, 60_000);
        }
        other => panic!("unexpected error: {other:?}"),
    }

    // The rejected order left nothing behind.
    let budget = budget_service::get_budget(&h.state, "A1").await?;
    assert_eq!(budget.data.expect("budget").budget.remaining_budget, 60_000);
    Ok(())
}

#[tokio::test]
async fn order_equal_to_remaining_is_accepted() -> anyhow::Result<()> {
    let h = harness(kst(2025, 8, 12, 10, 0), vec![account("A1", "9999", 100_000)]);

    let err = order_service::place_order(&h.state, order("A1", &[("oil", 1, 100_001)]))
        .await
        .expect_err("one over");
    assert!(matches!(err, AppError::BudgetExceeded { remaining_budget: 100_000, .. }));

    let placed = order_service::place_order(&h.state, order("A1", &[("oil", 4, 25_000)])).await?;
    assert_eq!(placed.data.expect("order").remaining_budget, 0);
    Ok(())
}

#[tokio::test]
async fn all_lines_share_one_order_id_and_timestamp() -> anyhow::Result<()> {
    let h = harness(kst(2025, 8, 12, 10, 0), vec![account("A1", "9999", 100_000)]);
    order_service::place_order(
        &h.state,
        order("A1", &[("rice", 1, 1_000), ("salt", 2, 500), ("kimchi", 3, 2_000)]),
    )
    .await?;

    let lines = order_service::list_orders(
        &h.state,
        OrderListQuery {
            user_id: Some("A1".into()),
            ..Default::default()
        },
    )
    .await?
    .data
    .expect("lines")
    .items;
    assert_eq!(lines.len(), 3);
    assert!(lines.iter().all(|l| l.order_id == lines[0].order_id));
    assert!(lines.iter().all(|l| l.timestamp == lines[0].timestamp));
    assert!(lines.iter().all(|l| l.delivery_address == "Main kitchen"));
    assert_eq!(lines.iter().map(|l| l.line_total).sum::<i64>(), 8_000);
    Ok(())
}

#[tokio::test]
async fn spend_only_counts_the_current_business_month() -> anyhow::Result<()> {
    let h = harness(kst(2025, 9, 15, 12, 0), vec![account("A1", "9999", 100_000)]);
    h.store
        .insert_lines(vec![
            line("A1", 7_000, kst(2025, 8, 31, 23, 59)),
            line("A1", 1_000, kst(2025, 9, 1, 0, 0)),
            line("A1", 2_000, kst(2025, 9, 30, 23, 59)),
            line("A1", 9_000, kst(2025, 10, 1, 0, 0)),
            line("B2", 5_000, kst(2025, 9, 10, 9, 0)),
        ])
        .await;

    let budget = budget_service::get_budget(&h.state, "A1").await?.data.expect("budget").budget;
    assert_eq!(budget.monthly_total, 3_000);
    assert_eq!(budget.remaining_budget, 97_000);
    Ok(())
}

#[tokio::test]
async fn master_budget_wins_even_at_zero() -> anyhow::Result<()> {
    let mut a1 = account("A1", "9999", 100_000);
    a1.master_budget = Some(0);
    let h = harness(kst(2025, 8, 12, 10, 0), vec![a1]);

    let budget = budget_service::get_budget(&h.state, "A1").await?.data.expect("budget").budget;
    assert!(budget.is_override_active);
    assert_eq!(budget.total_budget, 0);
    assert_eq!(budget.remaining_budget, 0);

    let err = order_service::place_order(&h.state, order("A1", &[("rice", 1, 1)]))
        .await
        .expect_err("zero override");
    assert!(matches!(err, AppError::BudgetExceeded { .. }));
    Ok(())
}

#[tokio::test]
async fn invalid_orders_are_rejected_before_lookup() {
    let h = harness(kst(2025, 8, 12, 10, 0), vec![account("A1", "9999", 100_000)]);

    let err = order_service::place_order(&h.state, order("", &[("rice", 1, 1)]))
        .await
        .expect_err("no user");
    assert!(matches!(err, AppError::Validation(_)));

    let err = order_service::place_order(&h.state, order("A1", &[]))
        .await
        .expect_err("no items");
    assert!(matches!(err, AppError::Validation(_)));

    let err = order_service::place_order(&h.state, order("ZZ", &[("rice", 1, 1)]))
        .await
        .expect_err("unknown user");
    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn order_list_is_newest_first_and_paged() -> anyhow::Result<()> {
    let now = kst(2025, 8, 20, 12, 0);
    let h = harness(now, vec![account("A1", "9999", 100_000)]);
    h.store
        .insert_lines(
            (1..=5)
                .map(|day| line("A1", 100 * day, kst(2025, 8, day as u32, 9, 0)))
                .chain(std::iter::once(line("A1", 50, now - Duration::days(40))))
                .collect(),
        )
        .await;

    let resp = order_service::list_orders(
        &h.state,
        OrderListQuery {
            user_id: Some("A1".into()),
            page: Some(1),
            per_page: Some(2),
            sort_order: None,
        },
    )
    .await?;
    let meta = resp.meta.clone().expect("meta");
    let items = resp.data.expect("lines").items;
    assert_eq!(meta.total, Some(5));
    assert_eq!(items.iter().map(|l| l.line_total).collect::<Vec<_>>(), vec![500, 400]);

    let err = order_service::list_orders(&h.state, OrderListQuery::default())
        .await
        .expect_err("user id required");
    assert!(matches!(err, AppError::Validation(_)));
    Ok(())
}

#[tokio::test]
async fn page_far_past_the_end_is_empty() -> anyhow::Result<()> {
    let now = kst(2025, 8, 20, 12, 0);
    let h = harness(now, vec![account("A1", "9999", 100_000)]);
    h.store.insert_lines(vec![line("A1", 100, kst(2025, 8, 1, 9, 0))]).await;

    let resp = order_service::list_orders(
        &h.state,
        OrderListQuery {
            user_id: Some("A1".into()),
            page: Some(i64::MAX),
            per_page: Some(100),
            sort_order: None,
        },
    )
    .await?;
    assert_eq!(resp.meta.expect("meta").total, Some(1));
    assert!(resp.data.expect("lines").items.is_empty());
    Ok(())
}
