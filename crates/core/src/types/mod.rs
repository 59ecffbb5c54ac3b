//! Core types for Corner Store.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod cart;
pub mod id;
pub mod price;
pub mod role;

pub use cart::{Cart, CartItem, LoadReport};
pub use id::*;
pub use price::{Price, PriceError, format_money};
pub use role::Role;
