//! The shared, persisted cart.
//!
//! [`CartStore`] is the single owner of the `cart` key in local storage.
//! Views never touch storage directly: they call the store, and every
//! successful mutation is published to subscribers so the navbar badge and
//! the cart page observe the same contents in the same order.
//!
//! Each mutation reads the current blob, applies the change, and rewrites the
//! whole blob. Within one process those steps are serialized by a mutex.
//! Across processes there is no coordination; the last write wins.

use std::sync::{Arc, Mutex, PoisonError};

use corner_store_core::{Cart, Price, ProductId};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Persisted cart shared by every view.
#[derive(Clone)]
pub struct CartStore {
    inner: Arc<CartStoreInner>,
}

struct CartStoreInner {
    storage: Arc<dyn KeyValueStore>,
    updates: watch::Sender<Cart>,
    write_lock: Mutex<()>,
}

impl CartStore {
    /// Open the cart persisted in `storage`.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStore>) -> Self {
        let initial = read_cart(storage.as_ref());
        let (updates, _) = watch::channel(initial);
        Self {
            inner: Arc::new(CartStoreInner {
                storage,
                updates,
                write_lock: Mutex::new(()),
            }),
        }
    }

    /// Read the persisted cart.
    ///
    /// Missing or unreadable payloads yield an empty cart; malformed entries
    /// are dropped.
    #[must_use]
    pub fn load(&self) -> Cart {
        read_cart(self.inner.storage.as_ref())
    }

    /// Receive the cart contents after every mutation.
    ///
    /// The receiver starts with the contents as of the last mutation (or
    /// as loaded when the store was opened).
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.inner.updates.subscribe()
    }

    /// Add units of a product, merging into an existing line.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn add(
        &self,
        product_id: ProductId,
        name: String,
        price: Price,
        quantity: u32,
    ) -> Result<Cart, StorageError> {
        self.mutate("add", |cart| cart.add(product_id, name, price, quantity))
    }

    /// Set the quantity of a line. Values below 1 leave the line unchanged.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn set_quantity(&self, product_id: &ProductId, quantity: u32) -> Result<Cart, StorageError> {
        self.mutate("set_quantity", |cart| cart.set_quantity(product_id, quantity))
    }

    /// Remove the line for a product.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated cart cannot be written.
    pub fn remove(&self, product_id: &ProductId) -> Result<Cart, StorageError> {
        self.mutate("remove", |cart| cart.remove(product_id))
    }

    /// Empty the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored cart cannot be deleted.
    pub fn clear(&self) -> Result<(), StorageError> {
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        self.inner.storage.remove(CART_KEY)?;
        debug!(op = "clear", "Cart updated");
        self.inner.updates.send_replace(Cart::new());
        Ok(())
    }

    /// Current total, recomputed from the persisted lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.load().total()
    }

    /// Current number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.load().item_count()
    }

    fn mutate<F>(&self, op: &'static str, apply: F) -> Result<Cart, StorageError>
    where
        F: FnOnce(&mut Cart) -> bool,
    {
        let _guard = self
            .inner
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let mut cart = self.load();
        if !apply(&mut cart) {
            debug!(op, "Cart unchanged");
            return Ok(cart);
        }

        let payload = cart.to_json().map_err(|source| StorageError::Serialize {
            key: CART_KEY.to_string(),
            source,
        })?;
        self.inner.storage.set(CART_KEY, &payload)?;

        debug!(op, lines = cart.len(), items = cart.item_count(), "Cart updated");
        self.inner.updates.send_replace(cart.clone());
        Ok(cart)
    }
}

fn read_cart(storage: &dyn KeyValueStore) -> Cart {
    let raw = match storage.get(CART_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Cart::new(),
        Err(e) => {
            warn!(error = %e, "Failed to read stored cart, treating as empty");
            return Cart::new();
        }
    };

    let (cart, report) = Cart::parse(&raw);
    if !report.is_clean() {
        warn!(
            unreadable = report.unreadable,
            dropped = report.dropped,
            merged = report.merged,
            "Repaired malformed stored cart"
        );
    }
    cart
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::storage::MemoryStore;

    fn price(units: i64) -> Price {
        Price::new(Decimal::from(units)).unwrap()
    }

    fn store() -> (CartStore, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        (CartStore::new(storage.clone()), storage)
    }

    #[test]
    fn test_load_absent_is_empty() {
        let (cart, _) = store();
        assert!(cart.load().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let storage = Arc::new(MemoryStore::with_value(CART_KEY, "{oops"));
        let cart = CartStore::new(storage);
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_mutations_persist_whole_blob() {
        let (cart, storage) = store();
        cart.add(ProductId::new("A"), "Widget".into(), price(10), 2)
            .unwrap();

        let raw = storage.get(CART_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{"productId": "A", "name": "Widget", "price": "10", "quantity": 2}])
        );
    }

    #[test]
    fn test_example_set_then_remove() {
        let (cart, _) = store();
        let a = ProductId::new("A");
        cart.add(a.clone(), "Widget".into(), price(10), 2).unwrap();

        cart.set_quantity(&a, 3).unwrap();
        assert_eq!(cart.total(), price(30));

        cart.remove(&a).unwrap();
        assert!(cart.load().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_set_quantity_zero_does_not_write() {
        let (cart, storage) = store();
        let a = ProductId::new("A");
        cart.add(a.clone(), "Widget".into(), price(10), 2).unwrap();
        let before = storage.get(CART_KEY).unwrap();

        let after = cart.set_quantity(&a, 0).unwrap();
        assert_eq!(after.get(&a).unwrap().quantity, 2);
        assert_eq!(storage.get(CART_KEY).unwrap(), before);
    }

    #[test]
    fn test_clear_removes_key() {
        let (cart, storage) = store();
        cart.add(ProductId::new("A"), "Widget".into(), price(1), 1)
            .unwrap();
        cart.clear().unwrap();
        assert_eq!(storage.get(CART_KEY).unwrap(), None);
        assert!(cart.load().is_empty());
    }

    #[test]
    fn test_subscribers_see_every_mutation() {
        let (cart, _) = store();
        let mut rx = cart.subscribe();
        assert_eq!(rx.borrow_and_update().item_count(), 0);

        cart.add(ProductId::new("A"), "Widget".into(), price(10), 2)
            .unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().item_count(), 2);

        cart.add(ProductId::new("B"), "Gadget".into(), price(5), 1)
            .unwrap();
        assert_eq!(rx.borrow_and_update().item_count(), 3);

        cart.clear().unwrap();
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_noop_does_not_notify() {
        let (cart, _) = store();
        let mut rx = cart.subscribe();
        rx.borrow_and_update();

        cart.set_quantity(&ProductId::new("missing"), 4).unwrap();
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_two_stores_last_writer_wins() {
        let storage: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        let tab_one = CartStore::new(storage.clone());
        let tab_two = CartStore::new(storage);

        tab_one
            .add(ProductId::new("A"), "Widget".into(), price(10), 1)
            .unwrap();
        tab_two
            .add(ProductId::new("B"), "Gadget".into(), price(5), 1)
            .unwrap();

        // Each mutation re-reads before writing, so sequential writers merge.
        assert_eq!(tab_one.load().len(), 2);
    }

    #[test]
    fn test_stored_line_with_overflowing_total_is_dropped() {
        let storage = Arc::new(MemoryStore::with_value(
            CART_KEY,
            r#"[{"productId":"A","name":"W","price":"79228162514264337593543950335","quantity":2}]"#,
        ));
        let cart = CartStore::new(storage);
        assert!(cart.load().is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_quantity_change_keeps_exact_price() {
        let storage = Arc::new(MemoryStore::with_value(
            CART_KEY,
            r#"[{"productId":"A","name":"W","price":"1234567890123456.78","quantity":1}]"#,
        ));
        let cart = CartStore::new(storage.clone());
        let a = ProductId::new("A");

        cart.set_quantity(&a, 2).unwrap();

        let raw = storage.get(CART_KEY).unwrap().unwrap();
        assert!(raw.contains(r#""price":"1234567890123456.78""#));
        let exact = Price::new(Decimal::new(123_456_789_012_345_678, 2)).unwrap();
        assert_eq!(cart.load().get(&a).unwrap().price, exact);
    }
}
