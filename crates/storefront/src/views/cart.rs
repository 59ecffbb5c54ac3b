//! Cart page: line editing and checkout.

use askama::Template;
use corner_store_core::{Cart, CartItem, ProductId};

use super::Route;
use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::checkout::{self, CheckoutOutcome};
use crate::session::User;
use crate::storage::StorageError;

/// Confirmation after an order is accepted.
pub const ORDER_PLACED: &str = "Order placed successfully!";

/// Cart item display data for templates.
#[derive(Clone)]
struct CartItemView {
    product_id: String,
    name: String,
    quantity: u32,
    price: String,
    line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.product_id.to_string(),
            name: item.name.clone(),
            quantity: item.quantity,
            price: item.price.display(),
            line_total: item.line_total().display(),
        }
    }
}

#[derive(Template)]
#[template(path = "cart.txt")]
struct CartTemplate<'a> {
    items: Vec<CartItemView>,
    total: String,
    products_path: String,
    message: &'a str,
}

/// The cart page.
///
/// Holds a snapshot of the cart taken at mount and refreshed after every
/// edit made through the view. Checkout borrows the view mutably for the
/// whole submission, so a second submit cannot start while one is in flight.
#[derive(Debug)]
pub struct CartView {
    user: Option<User>,
    cart: Cart,
    message: Option<String>,
}

impl CartView {
    #[must_use]
    pub const fn new(user: Option<User>) -> Self {
        Self {
            user,
            cart: Cart::new(),
            message: None,
        }
    }

    /// Load the cart.
    ///
    /// Returns the route to redirect to when nobody is signed in.
    pub fn mount(&mut self, store: &CartStore) -> Option<Route> {
        if self.user.is_none() {
            return Some(Route::Login);
        }
        self.cart = store.load();
        None
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    /// The last checkout or edit message, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Add one unit to a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn increment(&mut self, store: &CartStore, id: &ProductId) -> Result<(), StorageError> {
        let Some(quantity) = self.quantity_of(id) else {
            return Ok(());
        };
        self.set_quantity(store, id, quantity.saturating_add(1))
    }

    /// Take one unit off a line. A line at 1 stays at 1.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn decrement(&mut self, store: &CartStore, id: &ProductId) -> Result<(), StorageError> {
        let Some(quantity) = self.quantity_of(id) else {
            return Ok(());
        };
        self.set_quantity(store, id, quantity.saturating_sub(1))
    }

    /// Set a line's quantity. Values below 1 are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn set_quantity(
        &mut self,
        store: &CartStore,
        id: &ProductId,
        quantity: u32,
    ) -> Result<(), StorageError> {
        self.cart = store.set_quantity(id, quantity)?;
        Ok(())
    }

    /// Drop a line.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn remove(&mut self, store: &CartStore, id: &ProductId) -> Result<(), StorageError> {
        self.cart = store.remove(id)?;
        Ok(())
    }

    /// Submit the cart as an order.
    ///
    /// On success the cart is emptied and the outcome names the order
    /// history as the next route. On failure the cart is kept as is and the
    /// failure message is shown on the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the order was placed but the cart could not be
    /// cleared.
    pub async fn checkout(
        &mut self,
        api: &ApiClient,
        store: &CartStore,
    ) -> Result<CheckoutOutcome, StorageError> {
        let outcome = checkout::submit(api, store).await?;

        self.message = match &outcome {
            CheckoutOutcome::Placed { .. } => Some(ORDER_PLACED.to_string()),
            CheckoutOutcome::Failed { message } => Some(message.clone()),
            CheckoutOutcome::EmptyCart | CheckoutOutcome::LoginRequired => None,
        };
        self.cart = store.load();
        Ok(outcome)
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        CartTemplate {
            items: self.cart.items().iter().map(CartItemView::from).collect(),
            total: self.cart.total().display(),
            products_path: Route::Products.path(),
            message: self.message.as_deref().unwrap_or_default(),
        }
        .render()
    }

    fn quantity_of(&self, id: &ProductId) -> Option<u32> {
        self.cart.get(id).map(|item| item.quantity)
    }
}
