//! Corner Store CLI - the storefront in a terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! corner-store products --search mouse --category Accessories
//!
//! # Show a product and add two of it to the cart
//! corner-store product 65a1 --add -q 2
//!
//! # Edit the cart and check out
//! corner-store cart inc 65a1
//! corner-store checkout
//!
//! # Record the session handed over by the auth service
//! corner-store session login -n "Ada" -r admin -t "$TOKEN"
//! ```
//!
//! # Commands
//!
//! - `home` - Welcome page
//! - `products` - Search and filter the catalog
//! - `product` - Product detail, optionally adding to the cart
//! - `cart` - Show or edit the cart
//! - `checkout` - Place an order from the cart
//! - `orders` - Order history
//! - `reports` - Admin reports
//! - `session` - Record or forget the signed-in user

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use corner_store_storefront::config::{ConfigOverrides, StorefrontConfig};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "corner-store")]
#[command(author, version, about = "Corner Store storefront")]
struct Cli {
    /// Base URL of the store API (overrides `STOREFRONT_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding the local cart and session (overrides `STOREFRONT_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the welcome page
    Home,
    /// Search and filter the catalog
    Products {
        /// Free-text search
        #[arg(short, long)]
        search: Option<String>,

        /// Category filter (Electronics, Accessories)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Show one product
    Product {
        /// Product ID
        id: String,

        /// Add the product to the cart
        #[arg(long)]
        add: bool,

        /// Quantity to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Show or edit the cart
    Cart {
        #[command(subcommand)]
        action: Option<CartAction>,
    },
    /// Place an order from the cart
    Checkout,
    /// Show your order history
    Orders,
    /// Show admin reports
    Reports,
    /// Record or forget the signed-in user
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart
    Show,
    /// Add one unit to a line
    Inc {
        /// Product ID
        id: String,
    },
    /// Take one unit off a line (stops at 1)
    Dec {
        /// Product ID
        id: String,
    },
    /// Set a line's quantity
    Set {
        /// Product ID
        id: String,
        /// New quantity (at least 1)
        quantity: u32,
    },
    /// Remove a line
    Remove {
        /// Product ID
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum SessionAction {
    /// Store the user and token issued by the auth service
    Login {
        /// Display name
        #[arg(short, long)]
        name: String,

        /// Role (`admin`, `customer`)
        #[arg(short, long, default_value = "customer")]
        role: String,

        /// Bearer token for the store API
        #[arg(short, long)]
        token: String,
    },
    /// Forget the stored session
    Logout,
    /// Show who is signed in
    Show,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn env_filter() -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "corner_store_storefront=info,corner_store_cli=info".into())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let overrides = ConfigOverrides {
        api_url: cli.api_url,
        data_dir: cli.data_dir,
    };
    let config = match StorefrontConfig::from_env(overrides) {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter())
                .with_writer(std::io::stderr)
                .init();
            tracing::error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Pages go to stdout, logs to stderr
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match commands::run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            let _ = writeln!(std::io::stderr(), "Error: {}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

