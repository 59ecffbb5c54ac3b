//! Application state shared across views.

use std::sync::Arc;

use crate::api::{ApiClient, ApiError};
use crate::cart::CartStore;
use crate::config::StorefrontConfig;
use crate::session::{Session, SessionStore, User};
use crate::storage::{FileStore, KeyValueStore};

/// Application state shared across all views.
///
/// This struct is cheaply cloneable via `Arc` and provides access to the
/// API client, the cart, and the signed-in session.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    api: ApiClient,
    cart: CartStore,
    sessions: SessionStore,
    session: Option<Session>,
}

impl AppState {
    /// Create state backed by files in the configured data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &StorefrontConfig) -> Result<Self, ApiError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.data_dir.clone()));
        Self::with_storage(config, storage)
    }

    /// Create state over an arbitrary key-value store.
    ///
    /// The persisted session, if any, is loaded once here; the API client
    /// authenticates with its token.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn with_storage(
        config: &StorefrontConfig,
        storage: Arc<dyn KeyValueStore>,
    ) -> Result<Self, ApiError> {
        let sessions = SessionStore::new(storage.clone());
        let session = sessions.load();
        let api = match &session {
            Some(session) => ApiClient::with_token(config, session.token.clone())?,
            None => ApiClient::new(config)?,
        };
        let cart = CartStore::new(storage);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                api,
                cart,
                sessions,
                session,
            }),
        })
    }

    /// Get a reference to the external API client.
    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.inner.api
    }

    /// Get a reference to the shared cart.
    #[must_use]
    pub fn cart(&self) -> &CartStore {
        &self.inner.cart
    }

    /// Get a reference to the persisted session store.
    #[must_use]
    pub fn sessions(&self) -> &SessionStore {
        &self.inner.sessions
    }

    /// The signed-in user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.inner.session.as_ref().map(|s| &s.user)
    }
}
