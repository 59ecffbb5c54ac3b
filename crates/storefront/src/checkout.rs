//! Turning the cart into an order.

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::cart::CartStore;
use crate::storage::StorageError;
use crate::views::Route;

/// Prefix of the message shown when the API rejects an order.
pub const CHECKOUT_FAILED_PREFIX: &str = "Checkout failed: ";

/// What happened to a checkout attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// The order was accepted and the cart cleared.
    Placed {
        /// Where to go next.
        next: Route,
    },
    /// The API rejected the order or could not be reached. The cart is
    /// unchanged.
    Failed {
        message: String,
    },
    /// Nothing to submit.
    EmptyCart,
    /// There is no signed-in user to place the order for.
    LoginRequired,
}

/// Submit the current cart as one order.
///
/// The cart is re-read from storage right before submitting, so the order
/// reflects what is persisted rather than what a view last rendered.
///
/// # Errors
///
/// Returns an error only if the order was placed but the cart could not be
/// cleared afterwards.
pub async fn submit(api: &ApiClient, cart: &CartStore) -> Result<CheckoutOutcome, StorageError> {
    if !api.is_authenticated() {
        return Ok(CheckoutOutcome::LoginRequired);
    }

    let current = cart.load();
    if current.is_empty() {
        return Ok(CheckoutOutcome::EmptyCart);
    }

    match api.create_order_from_cart(&current).await {
        Ok(()) => {
            cart.clear()?;
            info!(
                lines = current.len(),
                total = %current.total(),
                "Order placed"
            );
            Ok(CheckoutOutcome::Placed { next: Route::Orders })
        }
        Err(e) => {
            warn!(error = %e, "Checkout failed");
            Ok(CheckoutOutcome::Failed {
                message: format!("{CHECKOUT_FAILED_PREFIX}{}", e.user_message()),
            })
        }
    }
}
