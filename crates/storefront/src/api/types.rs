//! Wire types for the external store API.
//!
//! Field names follow the API's JSON. Product IDs are accepted as either `id`
//! or `_id`; report columns arrive lowercased (`ordercount`), and numeric
//! aggregates may come back as strings, so those fields deserialize
//! leniently.

use chrono::{DateTime, NaiveDate, Utc};
use corner_store_core::{Cart, OrderId, OrderItemId, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by the catalog endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(alias = "_id")]
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Envelope returned by `GET /products`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductList {
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Filters for the catalog search.
///
/// Blank values are treated as absent and never sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    search: Option<String>,
    category: Option<String>,
}

impl CatalogQuery {
    /// Build a query, discarding blank filters.
    #[must_use]
    pub fn new(search: Option<String>, category: Option<String>) -> Self {
        fn normalize(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        }
        Self {
            search: normalize(search),
            category: normalize(category),
        }
    }

    #[must_use]
    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    #[must_use]
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    /// Query parameters in the order the API receives them.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, &str)> {
        let mut params = Vec::new();
        if let Some(search) = self.search() {
            params.push(("search", search));
        }
        if let Some(category) = self.category() {
            params.push(("category", category));
        }
        params
    }
}

// =============================================================================
// Orders
// =============================================================================

/// A past order belonging to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub created_at: DateTime<Utc>,
    pub total: Price,
    #[serde(default)]
    pub order_items: Vec<OrderItem>,
}

/// One line on a past order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: OrderItemId,
    pub product_id: ProductId,
    pub quantity: u32,
    pub price_at_purchase: Price,
}

impl OrderItem {
    /// Price paid multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price_at_purchase.times(self.quantity)
    }
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckoutRequest {
    pub items: Vec<CheckoutLine>,
}

/// One submitted cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Price,
}

impl From<&Cart> for CheckoutRequest {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart
                .items()
                .iter()
                .map(|item| CheckoutLine {
                    product_id: item.product_id.clone(),
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
        }
    }
}

// =============================================================================
// Reports
// =============================================================================

/// Revenue for one calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DailyRevenue {
    pub date: String,
    pub revenue: Decimal,
    #[serde(rename = "ordercount", alias = "orderCount", deserialize_with = "count")]
    pub order_count: i64,
}

/// Product count and average price for one category.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CategoryStat {
    #[serde(rename = "_id", alias = "category")]
    pub category: String,
    #[serde(rename = "productcount", alias = "productCount", deserialize_with = "count")]
    pub product_count: i64,
    #[serde(rename = "averageprice", alias = "averagePrice")]
    pub average_price: Decimal,
}

/// A customer ranked by total spend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopCustomer {
    pub name: String,
    pub email: String,
    #[serde(rename = "ordercount", alias = "orderCount", deserialize_with = "count")]
    pub order_count: i64,
    #[serde(rename = "totalspent", alias = "totalSpent")]
    pub total_spent: Decimal,
}

/// Accept an integer count sent either as a JSON number or a numeric string.
fn count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawCount {
        Number(i64),
        Text(String),
    }

    match RawCount::deserialize(deserializer)? {
        RawCount::Number(n) => Ok(n),
        RawCount::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

/// Format an API date or timestamp as `YYYY-MM-DD`.
///
/// Unparseable input is returned unchanged.
#[must_use]
pub fn format_date(raw: &str) -> String {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return ts.with_timezone(&Utc).format("%Y-%m-%d").to_string();
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.format("%Y-%m-%d").to_string();
    }
    raw.to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_product_accepts_underscore_id() {
        let product: Product = serde_json::from_str(
            r#"{"_id":"65a1","name":"Mouse","price":24.5,"sku":"MS-1",
                "category":"Accessories","description":"Wireless",
                "updatedAt":"2025-03-01T12:00:00.000Z"}"#,
        )
        .unwrap();
        assert_eq!(product.id.as_str(), "65a1");
        assert_eq!(product.price.display(), "$24.50");
        assert!(product.updated_at.is_some());
    }

    #[test]
    fn test_product_optional_fields() {
        let product: Product =
            serde_json::from_str(r#"{"id":7,"name":"Cable","price":"3"}"#).unwrap();
        assert_eq!(product.id.as_str(), "7");
        assert!(product.sku.is_none());
        assert!(product.updated_at.is_none());
    }

    #[test]
    fn test_catalog_query_drops_blank_filters() {
        let query = CatalogQuery::new(Some("  ".to_string()), Some(" Electronics ".to_string()));
        assert_eq!(query.search(), None);
        assert_eq!(query.params(), [("category", "Electronics")]);
        assert!(CatalogQuery::default().params().is_empty());
    }

    #[test]
    fn test_order_parses_numeric_ids() {
        let order: Order = serde_json::from_str(
            r#"{"id":12,"createdAt":"2025-01-05T09:30:00Z","total":59.97,
                "orderItems":[{"id":1,"productId":"65a1","quantity":3,"priceAtPurchase":19.99}]}"#,
        )
        .unwrap();
        assert_eq!(order.id.as_str(), "12");
        assert_eq!(order.order_items[0].line_total().display(), "$59.97");
    }

    #[test]
    fn test_checkout_request_shape() {
        let mut cart = Cart::new();
        cart.add(
            ProductId::new("A"),
            "Widget".to_string(),
            Price::new(Decimal::new(1050, 2)).unwrap(),
            2,
        );
        let body = serde_json::to_value(CheckoutRequest::from(&cart)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({"items": [{"productId": "A", "quantity": 2, "price": "10.50"}]})
        );
    }

    #[test]
    fn test_report_rows_accept_string_aggregates() {
        let day: DailyRevenue = serde_json::from_str(
            r#"{"date":"2025-01-05T00:00:00.000Z","revenue":"120.50","ordercount":"3"}"#,
        )
        .unwrap();
        assert_eq!(day.order_count, 3);
        assert_eq!(day.revenue, Decimal::new(12050, 2));

        let stat: CategoryStat = serde_json::from_str(
            r#"{"_id":"electronics","productcount":4,"averageprice":"249.999"}"#,
        )
        .unwrap();
        assert_eq!(stat.category, "electronics");
        assert_eq!(stat.product_count, 4);

        let customer: TopCustomer = serde_json::from_str(
            r#"{"name":"Ada","email":"ada@example.com","orderCount":2,"totalSpent":80}"#,
        )
        .unwrap();
        assert_eq!(customer.order_count, 2);
    }

    #[test]
    fn test_count_rejects_non_numeric_string() {
        let result = serde_json::from_str::<DailyRevenue>(
            r#"{"date":"2025-01-05","revenue":1,"ordercount":"many"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_format_date() {
        assert_eq!(format_date("2025-01-05T23:30:00.000Z"), "2025-01-05");
        assert_eq!(format_date("2025-01-05"), "2025-01-05");
        assert_eq!(format_date("yesterday"), "yesterday");
    }
}
