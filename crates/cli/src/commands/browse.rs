//! Home, catalog, and product pages.

use corner_store_core::ProductId;
use corner_store_storefront::api::CatalogQuery;
use corner_store_storefront::error::{AppError, Result, add_breadcrumb};
use corner_store_storefront::state::AppState;
use corner_store_storefront::views::{
    AddToCart, CatalogView, HomeView, ProductDetailView, QuantitySelector,
};

pub async fn products(state: &AppState, query: CatalogQuery) -> Result<()> {
    let mut view = CatalogView::new(query);
    view.mount(state.api()).await;
    super::show(state, &view.render()?)
}

pub fn home(state: &AppState) -> Result<()> {
    super::show(state, &HomeView.render()?)
}

/// Show a product, adding `add` units of it to the cart when given.
pub async fn product(state: &AppState, id: ProductId, add: Option<u32>) -> Result<()> {
    let mut view = ProductDetailView::new(id.clone(), state.user().cloned());
    view.mount(state.api()).await;

    let Some(quantity) = add else {
        return super::show(state, &view.render()?);
    };

    if quantity < 1 {
        return Err(AppError::BadRequest(
            "Quantity must be at least 1".to_string(),
        ));
    }
    *view.quantity_mut() = QuantitySelector::starting_at(quantity);

    let outcome = view.add_to_cart(state.cart())?;
    super::show(state, &view.render()?)?;

    match outcome {
        AddToCart::Added(cart) => {
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("product_id", id.as_str())]),
            );
            tracing::info!(product_id = %id, quantity, items = cart.item_count(), "Added to cart");
            Ok(())
        }
        AddToCart::LoginRequired(route) => Err(AppError::Unauthorized(format!(
            "Please log in to purchase this product ({route})"
        ))),
        AddToCart::NotLoaded => Err(AppError::NotFound(format!("Product {id}"))),
    }
}
