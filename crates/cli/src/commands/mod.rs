//! Command implementations.
//!
//! Every page command prints the navbar followed by the page body on stdout.

mod account;
mod browse;
mod cart;

use std::io::Write;

use corner_store_core::ProductId;
use corner_store_storefront::api::CatalogQuery;
use corner_store_storefront::config::StorefrontConfig;
use corner_store_storefront::error::{Result, set_sentry_user};
use corner_store_storefront::state::AppState;
use corner_store_storefront::views::Navbar;

use crate::{CartAction, Commands};

/// Run one command against freshly loaded state.
pub async fn run(command: Commands, config: &StorefrontConfig) -> Result<()> {
    let state = AppState::new(config)?;
    if let Some(user) = state.user() {
        set_sentry_user(&user.name, &user.role);
    }

    match command {
        Commands::Home => browse::home(&state),
        Commands::Products { search, category } => {
            browse::products(&state, CatalogQuery::new(search, category)).await
        }
        Commands::Product { id, add, quantity } => {
            browse::product(&state, ProductId::new(id), add.then_some(quantity)).await
        }
        Commands::Cart { action } => cart::edit(&state, action.unwrap_or(CartAction::Show)),
        Commands::Checkout => cart::checkout(&state).await,
        Commands::Orders => account::orders(&state).await,
        Commands::Reports => account::reports(&state).await,
        Commands::Session { action } => account::session(&state, action),
    }
}

/// Print the navbar and a page body.
fn show(state: &AppState, body: &str) -> Result<()> {
    let mut navbar = Navbar::new(state.user().cloned(), state.cart());
    let header = navbar.render()?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "{header}")?;
    writeln!(out)?;
    writeln!(out, "{body}")?;
    Ok(())
}

/// Print one line without the navbar.
fn say(line: &str) -> Result<()> {
    writeln!(std::io::stdout().lock(), "{line}")?;
    Ok(())
}
