//! Navigation bar with the live cart badge.

use askama::Template;
use corner_store_core::Cart;
use tokio::sync::watch;

use super::Route;
use crate::cart::CartStore;
use crate::session::User;

/// One navigation entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavLink {
    pub label: &'static str,
    pub path: String,
    /// Count shown next to the label; hidden when zero.
    pub badge: u64,
}

impl NavLink {
    fn new(label: &'static str, route: &Route) -> Self {
        Self {
            label,
            path: route.path(),
            badge: 0,
        }
    }
}

#[derive(Template)]
#[template(path = "navbar.txt")]
struct NavbarTemplate<'a> {
    links: &'a [NavLink],
    user_name: Option<&'a str>,
}

/// Auth-aware navigation bar.
///
/// Follows the shared cart through a subscription, so the badge tracks
/// mutations made by any view in this process.
pub struct Navbar {
    user: Option<User>,
    cart: watch::Receiver<Cart>,
    cart_count: u64,
}

impl Navbar {
    #[must_use]
    pub fn new(user: Option<User>, cart: &CartStore) -> Self {
        let mut updates = cart.subscribe();
        updates.mark_unchanged();
        Self {
            user,
            cart: updates,
            cart_count: cart.item_count(),
        }
    }

    /// Pull in any cart mutation published since the last sync.
    ///
    /// Returns `true` if the badge changed.
    pub fn sync(&mut self) -> bool {
        if !self.cart.has_changed().unwrap_or(false) {
            return false;
        }
        let count = self.cart.borrow_and_update().item_count();
        let changed = count != self.cart_count;
        self.cart_count = count;
        changed
    }

    /// Wait for the next cart mutation and apply it.
    ///
    /// Returns `false` once the cart store has been dropped.
    pub async fn changed(&mut self) -> bool {
        if self.cart.changed().await.is_err() {
            return false;
        }
        self.cart_count = self.cart.borrow_and_update().item_count();
        true
    }

    /// Units in the cart as of the last sync.
    #[must_use]
    pub const fn cart_count(&self) -> u64 {
        self.cart_count
    }

    /// Links offered to the current user, left to right.
    #[must_use]
    pub fn links(&self) -> Vec<NavLink> {
        let mut links = vec![NavLink::new("Products", &Route::Products)];
        match &self.user {
            Some(user) => {
                links.push(NavLink {
                    badge: self.cart_count,
                    ..NavLink::new("Cart", &Route::Cart)
                });
                links.push(NavLink::new("My Orders", &Route::Orders));
                if user.is_admin() {
                    links.push(NavLink::new("Reports", &Route::Reports));
                }
                links.push(NavLink::new("Logout", &Route::Logout));
            }
            None => {
                links.push(NavLink::new("Login", &Route::Login));
                links.push(NavLink::new("Register", &Route::Register));
            }
        }
        links
    }

    /// Render the bar.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&mut self) -> Result<String, askama::Error> {
        self.sync();
        let links = self.links();
        NavbarTemplate {
            links: &links,
            user_name: self.user.as_ref().map(|u| u.name.as_str()),
        }
        .render()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use corner_store_core::{Price, ProductId, Role};
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn labels(navbar: &Navbar) -> Vec<&'static str> {
        navbar.links().iter().map(|l| l.label).collect()
    }

    #[test]
    fn test_signed_out_links() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let navbar = Navbar::new(None, &cart);
        assert_eq!(labels(&navbar), ["Products", "Login", "Register"]);
    }

    #[test]
    fn test_reports_link_only_for_admin() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let customer = Navbar::new(Some(User::new("Bo", Role::Customer)), &cart);
        assert_eq!(
            labels(&customer),
            ["Products", "Cart", "My Orders", "Logout"]
        );

        let admin = Navbar::new(Some(User::new("Ada", Role::Admin)), &cart);
        assert_eq!(
            labels(&admin),
            ["Products", "Cart", "My Orders", "Reports", "Logout"]
        );
    }

    #[test]
    fn test_badge_follows_cart_mutations() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let mut navbar = Navbar::new(Some(User::new("Bo", Role::Customer)), &cart);
        assert_eq!(navbar.cart_count(), 0);
        assert!(!navbar.render().unwrap().contains("Cart ("));

        let price = Price::new(Decimal::from(3)).unwrap();
        cart.add(ProductId::new("A"), "Widget".into(), price, 2)
            .unwrap();
        cart.add(ProductId::new("B"), "Gadget".into(), price, 1)
            .unwrap();

        let page = navbar.render().unwrap();
        assert_eq!(navbar.cart_count(), 3);
        assert!(page.contains("| Cart (3) |"));
        assert!(page.contains("Hello, Bo"));
    }

    #[tokio::test]
    async fn test_changed_wakes_on_mutation() {
        let cart = CartStore::new(Arc::new(MemoryStore::new()));
        let mut navbar = Navbar::new(None, &cart);

        let writer = cart.clone();
        let handle = tokio::spawn(async move {
            writer
                .add(
                    ProductId::new("A"),
                    "Widget".into(),
                    Price::new(Decimal::ONE).unwrap(),
                    4,
                )
                .unwrap();
        });

        assert!(navbar.changed().await);
        assert_eq!(navbar.cart_count(), 4);
        handle.await.unwrap();
    }
}
