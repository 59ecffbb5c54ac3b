//! Integration tests for the order history page.

#![allow(clippy::unwrap_used)]

use corner_store_core::Role;
use corner_store_integration_tests::{
    Fixtures, MockApi, Reply, TEST_TOKEN, signed_in, signed_out,
};
use corner_store_storefront::api::ApiError;
use corner_store_storefront::views::OrderHistoryView;
use serde_json::json;

fn history() -> Fixtures {
    Fixtures {
        orders: Reply::ok(json!([
            {
                "id": 7,
                "createdAt": "2025-02-10T15:04:05.000Z",
                "total": "45.50",
                "orderItems": [
                    {"id": 1, "productId": "p1", "quantity": 1, "priceAtPurchase": 24.5},
                    {"id": 2, "productId": "p2", "quantity": 2, "priceAtPurchase": "10.50"},
                ],
            },
            {
                "id": 3,
                "createdAt": "2025-01-02T08:00:00.000Z",
                "total": 89,
                "orderItems": [
                    {"id": 3, "productId": "p3", "quantity": 1, "priceAtPurchase": 89},
                ],
            },
        ])),
        ..Fixtures::default()
    }
}

#[tokio::test]
async fn test_orders_render_in_api_order() {
    let api = MockApi::start(history()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Bo", Role::Customer);

    let mut view = OrderHistoryView::new(state.user().cloned());
    view.mount(state.api()).await;

    let page = view.render().unwrap();
    let first = page.find("Order #7  2025-02-10  $45.50").unwrap();
    let second = page.find("Order #3  2025-01-02  $89.00").unwrap();
    assert!(first < second);
    assert!(page.contains("Product ID: p1 x 1  $24.50"));
    assert!(page.contains("Product ID: p2 x 2  $21.00"));

    let requests = api.requests_to("/orders/my-orders");
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests.first().unwrap().authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
}

#[tokio::test]
async fn test_no_orders() {
    let api = MockApi::start(Fixtures::default()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Bo", Role::Customer);

    let mut view = OrderHistoryView::new(state.user().cloned());
    view.mount(state.api()).await;

    assert!(
        view.render()
            .unwrap()
            .contains("You haven't placed any orders yet.")
    );
}

#[tokio::test]
async fn test_failed_fetch_shows_empty_history() {
    let api = MockApi::start(Fixtures {
        orders: Reply::with_status(500, json!({"error": "Database unavailable"})),
        ..Fixtures::default()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Bo", Role::Customer);

    let mut view = OrderHistoryView::new(state.user().cloned());
    view.mount(state.api()).await;

    assert!(view.state().failure().is_some());
    let page = view.render().unwrap();
    assert!(page.contains("You haven't placed any orders yet."));
    assert!(!page.contains("Database unavailable"));
}

#[tokio::test]
async fn test_signed_out_makes_no_request() {
    let api = MockApi::start(history()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_out(&api, dir.path());

    let mut view = OrderHistoryView::new(state.user().cloned());
    view.mount(state.api()).await;

    assert_eq!(
        view.render().unwrap().trim(),
        "Please log in to view your orders."
    );
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_api_rejects_missing_token() {
    let api = MockApi::start(history()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_out(&api, dir.path());

    let err = state.api().my_orders().await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 401, .. }));
    assert_eq!(err.user_message(), "Access denied. No token provided.");
}
