//! Cart editing and checkout.

use corner_store_core::ProductId;
use corner_store_storefront::checkout::CheckoutOutcome;
use corner_store_storefront::error::{AppError, Result, add_breadcrumb};
use corner_store_storefront::state::AppState;
use corner_store_storefront::views::CartView;

use crate::CartAction;

/// Open the cart page, or fail with a login prompt.
fn mount(state: &AppState) -> Result<CartView> {
    let mut view = CartView::new(state.user().cloned());
    match view.mount(state.cart()) {
        None => Ok(view),
        Some(route) => Err(AppError::Unauthorized(format!(
            "Please log in to view your cart ({route})"
        ))),
    }
}

pub fn edit(state: &AppState, action: CartAction) -> Result<()> {
    let mut view = mount(state)?;
    let store = state.cart();

    match action {
        CartAction::Show => {}
        CartAction::Inc { id } => view.increment(store, &ProductId::new(id))?,
        CartAction::Dec { id } => view.decrement(store, &ProductId::new(id))?,
        CartAction::Set { id, quantity } => {
            view.set_quantity(store, &ProductId::new(id), quantity)?;
        }
        CartAction::Remove { id } => view.remove(store, &ProductId::new(id))?,
        CartAction::Clear => {
            store.clear()?;
            view.mount(store);
        }
    }

    super::show(state, &view.render()?)
}

pub async fn checkout(state: &AppState) -> Result<()> {
    let mut view = mount(state)?;
    add_breadcrumb("checkout", "Submitting order", None);

    let outcome = view.checkout(state.api(), state.cart()).await?;
    super::show(state, &view.render()?)?;

    match outcome {
        CheckoutOutcome::Placed { .. } => super::account::orders(state).await,
        CheckoutOutcome::Failed { message } => Err(AppError::BadRequest(message)),
        CheckoutOutcome::EmptyCart => Err(AppError::BadRequest("Your cart is empty".to_string())),
        CheckoutOutcome::LoginRequired => Err(AppError::Unauthorized(
            "Please log in to check out".to_string(),
        )),
    }
}
