//! Corner Store Core - Shared types library.
//!
//! This crate provides the domain types used across all Corner Store components:
//! - `storefront` - API client, local cart store, and page views
//! - `cli` - Command-line storefront client
//!
//! # Architecture
//!
//! The core crate contains only types and pure operations - no I/O, no
//! storage access, no HTTP clients. The cart's merge/update rules live here so
//! they can be tested without any persistence layer.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, prices, roles, and the cart line-item model

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
