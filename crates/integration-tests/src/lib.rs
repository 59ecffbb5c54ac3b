//! Integration tests for Corner Store.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p corner-store-integration-tests
//! ```
//!
//! Each test starts a [`MockApi`]: an `axum` server on an ephemeral loopback
//! port that answers the store API endpoints from [`Fixtures`] and records
//! every request it receives. The real client, cart store, and views are
//! pointed at it through an ordinary [`StorefrontConfig`].
//!
//! # Test Categories
//!
//! - `checkout` - Order submission and cart clearing
//! - `catalog` - Product search and product detail
//! - `orders` - Order history
//! - `reports` - Admin report aggregation

use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use corner_store_core::Role;
use corner_store_storefront::config::StorefrontConfig;
use corner_store_storefront::session::{Session, SessionStore, User};
use corner_store_storefront::state::AppState;
use corner_store_storefront::storage::FileStore;
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use url::Url;

/// Token the stand-in API expects on authenticated endpoints.
pub const TEST_TOKEN: &str = "test-token";

// =============================================================================
// Fixtures
// =============================================================================

/// A canned response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Value,
}

impl Reply {
    #[must_use]
    pub const fn ok(body: Value) -> Self {
        Self {
            status: StatusCode::OK,
            body,
        }
    }

    /// A response with an arbitrary status code.
    ///
    /// # Panics
    ///
    /// Panics if `status` is not a valid HTTP status code.
    #[must_use]
    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status: StatusCode::from_u16(status).expect("valid status code"),
            body,
        }
    }
}

/// What the stand-in API serves.
#[derive(Debug, Clone)]
pub struct Fixtures {
    /// Catalog; filtered by `search` (name substring) and `category`.
    pub products: Vec<Value>,
    pub orders: Reply,
    pub checkout: Reply,
    pub daily_revenue: Reply,
    pub category_stats: Reply,
    pub top_customers: Reply,
}

impl Default for Fixtures {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            orders: Reply::ok(json!([])),
            checkout: Reply::with_status(201, json!({"id": 1})),
            daily_revenue: Reply::ok(json!([])),
            category_stats: Reply::ok(json!([])),
            top_customers: Reply::ok(json!([])),
        }
    }
}

/// One request as the stand-in API saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    /// Path below the API base, e.g. `/orders`.
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Value>,
    pub authorization: Option<String>,
    pub request_id: Option<String>,
}

// =============================================================================
// MockApi
// =============================================================================

struct ServerState {
    fixtures: Fixtures,
    requests: Mutex<Vec<RecordedRequest>>,
}

/// Stand-in store API, stopped when dropped.
pub struct MockApi {
    addr: SocketAddr,
    state: Arc<ServerState>,
    handle: JoinHandle<()>,
}

impl MockApi {
    /// Start serving `fixtures` on an ephemeral port.
    ///
    /// # Panics
    ///
    /// Panics if the listener cannot be bound.
    pub async fn start(fixtures: Fixtures) -> Self {
        let state = Arc::new(ServerState {
            fixtures,
            requests: Mutex::new(Vec::new()),
        });
        let app = Router::new().fallback(handle).with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local address");
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            handle,
        }
    }

    /// Base URL of the API, including the `/api` prefix.
    ///
    /// # Panics
    ///
    /// Panics if the bound address does not form a valid URL.
    #[must_use]
    pub fn base_url(&self) -> Url {
        Url::parse(&format!("http://{}/api/", self.addr)).expect("valid base URL")
    }

    #[must_use]
    pub fn config(&self, data_dir: &Path) -> StorefrontConfig {
        StorefrontConfig::new(self.base_url(), data_dir.to_path_buf())
    }

    /// Every request received so far, in arrival order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests received for `path`.
    #[must_use]
    pub fn requests_to(&self, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.path == path)
            .collect()
    }
}

impl Drop for MockApi {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn handle(
    State(state): State<Arc<ServerState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let path = uri
        .path()
        .strip_prefix("/api")
        .unwrap_or_else(|| uri.path())
        .to_string();
    let header_value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(String::from)
    };
    let authorization = header_value(header::AUTHORIZATION.as_str());

    state
        .requests
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: uri.query().map(String::from),
            body: serde_json::from_slice(&body).ok(),
            authorization: authorization.clone(),
            request_id: header_value("x-request-id"),
        });

    let fixtures = &state.fixtures;
    let authorized = authorization.as_deref() == Some(&*format!("Bearer {TEST_TOKEN}"));
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let get = method == Method::GET;
    let post = method == Method::POST;

    let reply = match segments.as_slice() {
        ["products"] if get => Reply::ok(json!({
            "products": search(&fixtures.products, uri.query().unwrap_or_default()),
        })),
        ["products", id] if get => find(&fixtures.products, id).map_or_else(
            || Reply::with_status(404, json!({"error": "Product not found"})),
            Reply::ok,
        ),
        ["orders" | "reports", ..] if !authorized => {
            Reply::with_status(401, json!({"error": "Access denied. No token provided."}))
        }
        ["orders"] if post => fixtures.checkout.clone(),
        ["orders", "my-orders"] if get => fixtures.orders.clone(),
        ["reports", "daily-revenue"] if get => fixtures.daily_revenue.clone(),
        ["reports", "category-stats"] if get => fixtures.category_stats.clone(),
        ["reports", "top-customers"] if get => fixtures.top_customers.clone(),
        _ => Reply::with_status(404, json!({"error": "Not found"})),
    };

    (reply.status, Json(reply.body)).into_response()
}

/// Apply the catalog filters the way the real API does.
fn search(products: &[Value], query: &str) -> Vec<Value> {
    let mut term = None;
    let mut category = None;
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        match key.as_ref() {
            "search" => term = Some(value.to_lowercase()),
            "category" => category = Some(value.into_owned()),
            _ => {}
        }
    }

    products
        .iter()
        .filter(|p| {
            term.as_ref().is_none_or(|term| {
                p["name"]
                    .as_str()
                    .is_some_and(|name| name.to_lowercase().contains(term.as_str()))
            })
        })
        .filter(|p| {
            category
                .as_ref()
                .is_none_or(|category| p["category"].as_str() == Some(category.as_str()))
        })
        .cloned()
        .collect()
}

fn find(products: &[Value], id: &str) -> Option<Value> {
    products
        .iter()
        .find(|p| p["_id"].as_str() == Some(id) || p["id"].as_str() == Some(id))
        .cloned()
}

// =============================================================================
// Helpers
// =============================================================================

/// A catalog entry as the API returns it.
#[must_use]
pub fn product(id: &str, name: &str, price: f64, category: &str) -> Value {
    json!({
        "_id": id,
        "name": name,
        "price": price,
        "sku": format!("SKU-{id}"),
        "category": category,
        "description": format!("{name} description"),
        "updatedAt": "2025-03-01T12:00:00.000Z",
    })
}

/// Application state over `data_dir`, signed in as `name` with `role`.
///
/// # Panics
///
/// Panics if the session cannot be written or the client cannot be built.
#[must_use]
pub fn signed_in(api: &MockApi, data_dir: &Path, name: &str, role: Role) -> AppState {
    SessionStore::new(Arc::new(FileStore::new(data_dir)))
        .save(&Session {
            user: User::new(name, role),
            token: SecretString::from(TEST_TOKEN),
        })
        .expect("Failed to save test session");
    AppState::new(&api.config(data_dir)).expect("Failed to build app state")
}

/// Application state over `data_dir` with nobody signed in.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn signed_out(api: &MockApi, data_dir: &Path) -> AppState {
    AppState::new(&api.config(data_dir)).expect("Failed to build app state")
}

/// Configuration pointing at a loopback port nothing listens on.
///
/// # Panics
///
/// Panics if no ephemeral port can be reserved.
#[must_use]
pub fn unreachable_config(data_dir: &Path) -> StorefrontConfig {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("Failed to reserve port");
    let addr = listener.local_addr().expect("Failed to read local address");
    drop(listener);
    let url = Url::parse(&format!("http://{addr}/api/")).expect("valid base URL");
    StorefrontConfig::new(url, data_dir.to_path_buf())
}
