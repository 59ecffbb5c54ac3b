//! Page-level views.
//!
//! Each view owns its load state, fetches what it needs from the API when
//! mounted, and renders plain-text markup through an Askama template. Nothing
//! fetched is kept between mounts; remounting a view re-requests its data.
//!
//! Views never talk to local storage directly. Cart changes go through the
//! shared [`CartStore`](crate::cart::CartStore), and the navbar learns about
//! them from its subscription.

pub mod cart;
pub mod catalog;
pub mod home;
pub mod navbar;
pub mod orders;
pub mod product;
pub mod reports;

pub use cart::CartView;
pub use catalog::CatalogView;
pub use home::HomeView;
pub use navbar::{NavLink, Navbar};
pub use orders::OrderHistoryView;
pub use product::{AddToCart, ProductDetailView, QuantitySelector};
pub use reports::{Reports, ReportsView};

use corner_store_core::ProductId;

/// Lifecycle of a fetch-driven view.
///
/// `Loading -> Loaded | Failed`. There is no automatic retry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Loadable<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> Loadable<T> {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// The loaded value, if the fetch succeeded.
    #[must_use]
    pub const fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    /// The failure message, if the fetch failed.
    #[must_use]
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Navigable locations.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Products,
    Product(ProductId),
    Cart,
    Orders,
    Reports,
    Login,
    Register,
    Logout,
}

impl Route {
    /// The path a browser would show for this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Products => "/products".to_string(),
            Self::Product(id) => format!("/products/{id}"),
            Self::Cart => "/cart".to_string(),
            Self::Orders => "/orders".to_string(),
            Self::Reports => "/reports".to_string(),
            Self::Login => "/login".to_string(),
            Self::Register => "/register".to_string(),
            Self::Logout => "/logout".to_string(),
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_paths() {
        assert_eq!(Route::Home.path(), "/");
        assert_eq!(Route::Product(ProductId::new("42")).path(), "/products/42");
        assert_eq!(Route::Orders.to_string(), "/orders");
    }

    #[test]
    fn test_loadable_accessors() {
        let loading: Loadable<u8> = Loadable::default();
        assert!(loading.is_loading());
        assert_eq!(loading.loaded(), None);

        let failed: Loadable<u8> = Loadable::Failed("boom".to_string());
        assert_eq!(failed.failure(), Some("boom"));
        assert_eq!(Loadable::Loaded(3).loaded(), Some(&3));
    }
}
