//! Corner Store Storefront library.
//!
//! Everything a storefront client needs short of a terminal: configuration,
//! the external API client, client-local key-value storage, the shared
//! [`CartStore`](cart::CartStore), and one view type per page.
//!
//! # Architecture
//!
//! - The external API is the source of truth for products, orders, and
//!   reports - every view re-fetches on mount, nothing is cached.
//! - The cart lives only in local storage under one key and is rewritten as a
//!   whole on every change. Last writer wins across processes.
//! - Views follow `loading -> {loaded, failed}` and render plain-text markup
//!   through Askama templates.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod error;
pub mod session;
pub mod state;
pub mod storage;
pub mod views;
