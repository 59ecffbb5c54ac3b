//! Order history for the signed-in user.

use askama::Template;
use tracing::error;

use super::Loadable;
use crate::api::{ApiClient, Order, OrderItem};
use crate::session::User;

/// Order display data for templates.
struct OrderView {
    id: String,
    date: String,
    total: String,
    items: Vec<OrderItemView>,
}

struct OrderItemView {
    product_id: String,
    quantity: u32,
    line_total: String,
}

impl From<&OrderItem> for OrderItemView {
    fn from(item: &OrderItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            quantity: item.quantity,
            line_total: item.line_total().display(),
        }
    }
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            date: order.created_at.format("%Y-%m-%d").to_string(),
            total: order.total.display(),
            items: order.order_items.iter().map(OrderItemView::from).collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "orders.txt")]
struct OrdersTemplate {
    signed_in: bool,
    loading: bool,
    orders: Vec<OrderView>,
}

/// The order history page.
///
/// A failed fetch is logged and rendered like an empty history.
#[derive(Debug)]
pub struct OrderHistoryView {
    user: Option<User>,
    state: Loadable<Vec<Order>>,
}

impl OrderHistoryView {
    #[must_use]
    pub const fn new(user: Option<User>) -> Self {
        Self {
            user,
            state: Loadable::Loading,
        }
    }

    /// Fetch the caller's orders. Does nothing when signed out.
    pub async fn mount(&mut self, api: &ApiClient) {
        if self.user.is_none() {
            return;
        }
        self.state = Loadable::Loading;
        self.state = match api.my_orders().await {
            Ok(orders) => Loadable::Loaded(orders),
            Err(e) => {
                error!(error = %e, "Error fetching orders");
                Loadable::Failed(e.to_string())
            }
        };
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Vec<Order>> {
        &self.state
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        OrdersTemplate {
            signed_in: self.user.is_some(),
            loading: self.state.is_loading(),
            orders: self
                .state
                .loaded()
                .map(|orders| orders.iter().map(OrderView::from).collect())
                .unwrap_or_default(),
        }
        .render()
    }
}
