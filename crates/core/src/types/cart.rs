//! Cart line items and the pure rules for changing them.
//!
//! A [`Cart`] is an ordered sequence of [`CartItem`]s with at most one line
//! per product. It is persisted as a single JSON array, and anything read
//! back from storage is validated entry by entry: malformed lines are dropped
//! and duplicate products are merged, so a `Cart` value always upholds its
//! invariants no matter what was on disk.

use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::id::ProductId;
use super::price::Price;

/// One product line in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product this line refers to.
    pub product_id: ProductId,
    /// Product name captured when the line was created.
    pub name: String,
    /// Unit price captured when the line was created.
    pub price: Price,
    /// Number of units, always at least 1.
    pub quantity: u32,
}

impl CartItem {
    /// Unit price multiplied by quantity.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }

    fn is_valid(&self) -> bool {
        !self.product_id.is_blank()
            && self.quantity >= 1
            && self.price.checked_times(self.quantity).is_some()
    }

    /// Quantity after adding `more` units, or `None` if the line total would
    /// no longer be representable.
    fn grown_by(&self, more: u32) -> Option<u32> {
        let quantity = self.quantity.checked_add(more)?;
        self.price.checked_times(quantity).map(|_| quantity)
    }
}

/// What happened while reading a persisted cart payload.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoadReport {
    /// The payload was not valid JSON or not an array.
    pub unreadable: bool,
    /// Entries discarded because they did not match the line-item schema,
    /// or whose line total overflows.
    pub dropped: usize,
    /// Entries folded into an earlier line for the same product.
    pub merged: usize,
}

impl LoadReport {
    /// Returns `true` if the payload needed no repair.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.unreadable && self.dropped == 0 && self.merged == 0
    }
}

/// Ordered cart contents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(from = "Value")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Parse a persisted payload, repairing it where possible.
    ///
    /// Never fails: unreadable input yields an empty cart and is flagged in
    /// the returned [`LoadReport`].
    #[must_use]
    pub fn parse(raw: &str) -> (Self, LoadReport) {
        serde_json::from_str::<Value>(raw).map_or_else(
            |_| {
                (
                    Self::new(),
                    LoadReport {
                        unreadable: true,
                        ..LoadReport::default()
                    },
                )
            },
            Self::from_value,
        )
    }

    /// Build a cart from an already-parsed JSON value.
    #[must_use]
    pub fn from_value(value: Value) -> (Self, LoadReport) {
        let Value::Array(entries) = value else {
            return (
                Self::new(),
                LoadReport {
                    unreadable: true,
                    ..LoadReport::default()
                },
            );
        };

        let mut cart = Self::new();
        let mut report = LoadReport::default();

        for entry in entries {
            let item = match serde_json::from_value::<CartItem>(entry) {
                Ok(item) if item.is_valid() => item,
                _ => {
                    report.dropped += 1;
                    continue;
                }
            };

            if let Some(existing) = cart.line_mut(&item.product_id) {
                match existing.grown_by(item.quantity) {
                    Some(quantity) => {
                        existing.quantity = quantity;
                        report.merged += 1;
                    }
                    None => report.dropped += 1,
                }
            } else {
                cart.items.push(item);
            }
        }

        (cart, report)
    }

    /// Serialize to the persisted JSON array form.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Lines in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn get(&self, product_id: &ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| &item.product_id == product_id)
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| &item.product_id == product_id)
    }

    /// Returns `true` if the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Add units of a product, merging into an existing line if present.
    ///
    /// A quantity of zero changes nothing, and neither does an add whose line
    /// total would overflow. The name and price of an existing line are kept
    /// as they were first captured.
    ///
    /// Returns `true` if the cart changed.
    pub fn add(&mut self, product_id: ProductId, name: String, price: Price, quantity: u32) -> bool {
        if quantity < 1 || product_id.is_blank() {
            return false;
        }

        if let Some(existing) = self.line_mut(&product_id) {
            let Some(grown) = existing.grown_by(quantity) else {
                return false;
            };
            existing.quantity = grown;
        } else {
            if price.checked_times(quantity).is_none() {
                return false;
            }
            self.items.push(CartItem {
                product_id,
                name,
                price,
                quantity,
            });
        }
        true
    }

    /// Set the quantity of an existing line.
    ///
    /// Quantities below 1, or large enough to overflow the line total, are
    /// ignored and the line keeps its previous value; use [`Cart::remove`] to
    /// delete a line.
    ///
    /// Returns `true` if the cart changed.
    pub fn set_quantity(&mut self, product_id: &ProductId, quantity: u32) -> bool {
        if quantity < 1 {
            return false;
        }
        match self.line_mut(product_id) {
            Some(line)
                if line.quantity != quantity && line.price.checked_times(quantity).is_some() =>
            {
                line.quantity = quantity;
                true
            }
            _ => false,
        }
    }

    /// Remove the line for a product.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, product_id: &ProductId) -> bool {
        let before = self.items.len();
        self.items.retain(|item| &item.product_id != product_id);
        self.items.len() != before
    }

    /// Sum of price × quantity over all lines, saturating at the largest
    /// representable amount.
    #[must_use]
    pub fn total(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

impl Serialize for Cart {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl From<Value> for Cart {
    fn from(value: Value) -> Self {
        Self::from_value(value).0
    }
}
