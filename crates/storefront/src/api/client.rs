//! HTTP implementation of the store API client.
//!
//! Uses `reqwest` with JSON bodies. Every request carries a fresh
//! `x-request-id` so failures can be matched against server logs.

use std::sync::Arc;

use corner_store_core::{Cart, ProductId};
use reqwest::header::{ACCEPT, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;
use uuid::Uuid;

use super::types::{
    CatalogQuery, CategoryStat, CheckoutRequest, DailyRevenue, Order, Product, ProductList,
    TopCustomer,
};
use super::{ApiError, extract_error_message};
use crate::config::StorefrontConfig;

/// The HTTP header name for request IDs.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

// =============================================================================
// ApiClient
// =============================================================================

/// Client for the external store API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    token: Option<SecretString>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("token", &self.inner.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl ApiClient {
    /// Create an anonymous client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        Self::build(config, None)
    }

    /// Create a client that authenticates as the holder of `token`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_token(config: &StorefrontConfig, token: SecretString) -> Result<Self, ApiError> {
        Self::build(config, Some(token))
    }

    fn build(config: &StorefrontConfig, token: Option<SecretString>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.api_timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.api_url.clone(),
                token,
            }),
        })
    }

    /// Returns `true` if requests carry a bearer token.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.token.is_some()
    }

    /// Resolve an endpoint path below the base URL, percent-encoding segments.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl(self.inner.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Send a request and decode a JSON response.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;

        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "Failed to parse API response"
            );
            ApiError::Parse(e)
        })
    }

    /// Send a request, returning the raw body of a success response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let request_id = Uuid::new_v4().to_string();
        let mut request = request
            .header(ACCEPT, HeaderValue::from_static("application/json"))
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(token) = &self.inner.token {
            request = request.bearer_auth(token.expose_secret());
        }

        let response = request.send().await?;
        let status = response.status();
        let path = response.url().path().to_string();

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            debug!(%path, %request_id, "API returned 404");
            return Err(ApiError::NotFound(path));
        }

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                %path,
                %request_id,
                body = %body.chars().take(500).collect::<String>(),
                "API returned non-success status"
            );
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: extract_error_message(&body),
            });
        }

        debug!(%path, %request_id, status = %status, "API request succeeded");
        Ok(body)
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Search the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(search = ?query.search(), category = ?query.category()))]
    pub async fn search_products(&self, query: &CatalogQuery) -> Result<Vec<Product>, ApiError> {
        let mut url = self.endpoint(&["products"])?;
        let params = query.params();
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }

        let list: ProductList = self.execute(self.inner.client.get(url)).await?;
        Ok(list.products)
    }

    /// Get one product.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the product does not exist, or
    /// another error if the API request fails.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, ApiError> {
        let url = self.endpoint(&["products", id.as_str()])?;
        self.execute(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Submit cart lines as a new order.
    ///
    /// The response body is not interpreted beyond its status.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    #[instrument(skip(self, request), fields(lines = request.items.len()))]
    pub async fn create_order(&self, request: &CheckoutRequest) -> Result<(), ApiError> {
        let url = self.endpoint(&["orders"])?;
        self.send(self.inner.client.post(url).json(request)).await?;
        Ok(())
    }

    /// Convenience for [`create_order`](Self::create_order) from a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API rejects the order or the request fails.
    pub async fn create_order_from_cart(&self, cart: &Cart) -> Result<(), ApiError> {
        self.create_order(&CheckoutRequest::from(cart)).await
    }

    /// The caller's past orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn my_orders(&self) -> Result<Vec<Order>, ApiError> {
        let url = self.endpoint(&["orders", "my-orders"])?;
        self.execute(self.inner.client.get(url)).await
    }

    // =========================================================================
    // Reports
    // =========================================================================

    /// Revenue per day.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn daily_revenue(&self) -> Result<Vec<DailyRevenue>, ApiError> {
        let url = self.endpoint(&["reports", "daily-revenue"])?;
        self.execute(self.inner.client.get(url)).await
    }

    /// Product count and average price per category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn category_stats(&self) -> Result<Vec<CategoryStat>, ApiError> {
        let url = self.endpoint(&["reports", "category-stats"])?;
        self.execute(self.inner.client.get(url)).await
    }

    /// Customers ranked by total spend.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn top_customers(&self) -> Result<Vec<TopCustomer>, ApiError> {
        let url = self.endpoint(&["reports", "top-customers"])?;
        self.execute(self.inner.client.get(url)).await
    }
}
