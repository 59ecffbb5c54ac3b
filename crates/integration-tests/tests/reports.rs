//! Integration tests for the admin reports page.

#![allow(clippy::unwrap_used)]

use corner_store_core::Role;
use corner_store_integration_tests::{Fixtures, MockApi, Reply, signed_in};
use corner_store_storefront::views::{Loadable, Reports, ReportsView};
use serde_json::json;

// Column names arrive lowercased and aggregates as strings, as a SQL
// backend returns them.
fn reports() -> Fixtures {
    Fixtures {
        daily_revenue: Reply::ok(json!([
            {"date": "2025-03-02T00:00:00.000Z", "revenue": "310.25", "ordercount": "4"},
            {"date": "2025-03-01", "revenue": 99, "ordercount": 1},
        ])),
        category_stats: Reply::ok(json!([
            {"_id": "Electronics", "productcount": 3, "averageprice": "199.995"},
        ])),
        top_customers: Reply::ok(json!([
            {"name": "Ada", "email": "ada@example.com", "ordercount": "5", "totalspent": "1024.5"},
        ])),
        ..Fixtures::default()
    }
}

#[tokio::test]
async fn test_all_reports_rendered() {
    let api = MockApi::start(reports()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Ada", Role::Admin);

    let mut view = ReportsView::new(state.user().cloned());
    view.mount(state.api()).await;

    let page = view.render().unwrap();
    assert!(page.contains("2025-03-02  $310.25  4 orders"));
    assert!(page.contains("2025-03-01  $99.00  1 orders"));
    assert!(page.contains("Electronics  3 products  Avg: $200.00"));
    assert!(page.contains("Ada <ada@example.com> | 5 | $1024.50"));

    for path in [
        "/reports/daily-revenue",
        "/reports/category-stats",
        "/reports/top-customers",
    ] {
        assert_eq!(api.requests_to(path).len(), 1, "{path}");
    }
}

#[tokio::test]
async fn test_one_failure_empties_every_section() {
    let api = MockApi::start(Fixtures {
        category_stats: Reply::with_status(500, json!({"error": "aggregation failed"})),
        ..reports()
    })
    .await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Ada", Role::Admin);

    assert_eq!(Reports::fetch(state.api()).await, None);

    let mut view = ReportsView::new(state.user().cloned());
    view.mount(state.api()).await;

    assert!(matches!(view.state(), Loadable::Failed(_)));
    let page = view.render().unwrap();
    assert!(page.contains("No revenue data available."));
    assert!(page.contains("No category data available."));
    assert!(page.contains("No customer data available."));
    assert!(!page.contains("Ada <ada@example.com>"));
}

#[tokio::test]
async fn test_customer_makes_no_report_requests() {
    let api = MockApi::start(reports()).await;
    let dir = tempfile::tempdir().unwrap();
    let state = signed_in(&api, dir.path(), "Bo", Role::Customer);

    let mut view = ReportsView::new(state.user().cloned());
    view.mount(state.api()).await;

    assert_eq!(view.render().unwrap().trim(), "Admin access required.");
    assert!(api.requests().is_empty());
}
