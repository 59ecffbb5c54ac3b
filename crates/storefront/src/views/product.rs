//! Product detail page with the purchase panel.

use askama::Template;
use corner_store_core::{Cart, ProductId};
use tracing::{debug, error};

use super::{Loadable, Route};
use crate::api::{ApiClient, ApiError, Product};
use crate::cart::CartStore;
use crate::session::User;
use crate::storage::StorageError;

/// Shown when the product cannot be loaded.
pub const NOT_FOUND: &str = "Product not found";

/// Confirmation after a successful add.
pub const ADDED: &str = "Product added to cart!";

/// Quantity chosen on the purchase panel.
///
/// Starts at 1. Decrementing never goes below 1; incrementing is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantitySelector(u32);

impl Default for QuantitySelector {
    fn default() -> Self {
        Self(1)
    }
}

impl QuantitySelector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `value`, raised to 1 if lower.
    #[must_use]
    pub fn starting_at(value: u32) -> Self {
        Self(value.max(1))
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    pub const fn increment(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    pub fn decrement(&mut self) {
        self.0 = self.0.saturating_sub(1).max(1);
    }
}

/// Result of pressing "Add to Cart".
#[derive(Debug, Clone, PartialEq)]
pub enum AddToCart {
    /// The cart after the add.
    Added(Cart),
    /// Nobody is signed in; go here instead.
    LoginRequired(Route),
    /// The product is not loaded, so there is nothing to add.
    NotLoaded,
}

#[derive(Template)]
#[template(path = "product.txt")]
struct ProductTemplate<'a> {
    loading: bool,
    failed: bool,
    error: &'a str,
    back_path: String,
    login_path: String,
    name: &'a str,
    sku: &'a str,
    category: &'a str,
    price: String,
    description: &'a str,
    updated: String,
    signed_in: bool,
    quantity: u32,
    subtotal: String,
    notice: &'a str,
}

/// The product detail page.
#[derive(Debug)]
pub struct ProductDetailView {
    id: ProductId,
    user: Option<User>,
    state: Loadable<Product>,
    quantity: QuantitySelector,
    notice: Option<&'static str>,
}

impl ProductDetailView {
    #[must_use]
    pub fn new(id: ProductId, user: Option<User>) -> Self {
        Self {
            id,
            user,
            state: Loadable::Loading,
            quantity: QuantitySelector::new(),
            notice: None,
        }
    }

    /// Fetch the product.
    ///
    /// Any failure, not only a 404, renders as "Product not found".
    pub async fn mount(&mut self, api: &ApiClient) {
        self.state = Loadable::Loading;
        self.state = match api.get_product(&self.id).await {
            Ok(product) => Loadable::Loaded(product),
            Err(ApiError::NotFound(path)) => {
                debug!(%path, "Product does not exist");
                Loadable::Failed(NOT_FOUND.to_string())
            }
            Err(e) => {
                error!(error = %e, product_id = %self.id, "Failed to fetch product");
                Loadable::Failed(NOT_FOUND.to_string())
            }
        };
    }

    #[must_use]
    pub const fn state(&self) -> &Loadable<Product> {
        &self.state
    }

    #[must_use]
    pub const fn quantity(&self) -> QuantitySelector {
        self.quantity
    }

    pub const fn quantity_mut(&mut self) -> &mut QuantitySelector {
        &mut self.quantity
    }

    /// Add the chosen quantity of this product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the cart cannot be written.
    pub fn add_to_cart(&mut self, cart: &CartStore) -> Result<AddToCart, StorageError> {
        if self.user.is_none() {
            return Ok(AddToCart::LoginRequired(Route::Login));
        }
        let Some(product) = self.state.loaded() else {
            return Ok(AddToCart::NotLoaded);
        };

        let updated = cart.add(
            product.id.clone(),
            product.name.clone(),
            product.price,
            self.quantity.value(),
        )?;
        self.notice = Some(ADDED);
        Ok(AddToCart::Added(updated))
    }

    /// Render the page.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self) -> Result<String, askama::Error> {
        let product = self.state.loaded();
        ProductTemplate {
            loading: self.state.is_loading(),
            failed: self.state.failure().is_some(),
            error: self.state.failure().unwrap_or_default(),
            back_path: Route::Products.path(),
            login_path: Route::Login.path(),
            name: product.map(|p| p.name.as_str()).unwrap_or_default(),
            sku: product.and_then(|p| p.sku.as_deref()).unwrap_or_default(),
            category: product
                .and_then(|p| p.category.as_deref())
                .unwrap_or_default(),
            price: product.map(|p| p.price.display()).unwrap_or_default(),
            description: product
                .and_then(|p| p.description.as_deref())
                .unwrap_or_default(),
            updated: product
                .and_then(|p| p.updated_at)
                .map(|ts| ts.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            signed_in: self.user.is_some(),
            quantity: self.quantity.value(),
            subtotal: product
                .map(|p| p.price.times(self.quantity.value()).display())
                .unwrap_or_default(),
            notice: self.notice.unwrap_or_default(),
        }
        .render()
    }
}
