//! Unified error handling with Sentry integration.
//!
//! Provides an `AppError` type for anything driving the storefront (the CLI,
//! tests). Errors worth investigating are captured to Sentry before being
//! reported to the user.

use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::storage::StorageError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// External API call failed.
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Local storage failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A template failed to render.
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// Writing output failed.
    #[error("Output error: {0}")]
    Output(#[from] std::io::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not signed in, or lacks the required role.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad input from the user.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Returns `true` for failures on our side rather than the user's.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        match self {
            Self::Storage(_) | Self::Render(_) | Self::Output(_) => true,
            Self::Api(ApiError::Status { status, .. }) => *status >= 500,
            Self::Api(ApiError::NotFound(_)) => false,
            Self::Api(_) => true,
            Self::Config(_) | Self::NotFound(_) | Self::Unauthorized(_) | Self::BadRequest(_) => {
                false
            }
        }
    }

    /// Log this error, capturing internal failures to Sentry.
    pub fn report(&self) {
        if self.is_internal() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Command error"
            );
        } else {
            tracing::warn!(error = %self, "Command error");
        }
    }

    /// Message suitable for showing to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(e) => match e.kind() {
                crate::api::ErrorKind::NotFound => "Not found".to_string(),
                crate::api::ErrorKind::ValidationOrServer => e.user_message().to_string(),
                crate::api::ErrorKind::Network => "Could not reach the store API".to_string(),
            },
            Self::Storage(_) | Self::Render(_) | Self::Output(_) => "Internal error".to_string(),
            Self::NotFound(message) | Self::Unauthorized(message) | Self::BadRequest(message) => {
                message.clone()
            }
            Self::Config(e) => e.to_string(),
        }
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context.
///
/// Call this once a session is known to associate errors with the user.
pub fn set_sentry_user(name: &str, role: &impl ToString) {
    sentry::configure_scope(|scope| {
        let mut user = sentry::User {
            username: Some(name.to_string()),
            ..Default::default()
        };
        user.other
            .insert("role".to_string(), serde_json::Value::String(role.to_string()));
        scope.set_user(Some(user));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "123")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("quantity must be at least 1".to_string());
        assert_eq!(err.to_string(), "Bad request: quantity must be at least 1");
    }

    #[test]
    fn test_internal_classification() {
        assert!(AppError::Storage(StorageError::InvalidKey("x".to_string())).is_internal());
        assert!(
            AppError::Api(ApiError::Status {
                status: 500,
                message: None
            })
            .is_internal()
        );
        assert!(
            !AppError::Api(ApiError::Status {
                status: 400,
                message: Some("Insufficient stock".to_string())
            })
            .is_internal()
        );
        assert!(!AppError::Api(ApiError::NotFound("/products/1".to_string())).is_internal());
        assert!(!AppError::Unauthorized("sign in".to_string()).is_internal());
    }

    #[test]
    fn test_user_message_hides_internals() {
        let err = AppError::Storage(StorageError::InvalidKey("../x".to_string()));
        assert_eq!(err.user_message(), "Internal error");

        let err = AppError::Api(ApiError::Status {
            status: 400,
            message: Some("Insufficient stock".to_string()),
        });
        assert_eq!(err.user_message(), "Insufficient stock");

        let err = AppError::Unauthorized("Please log in to view your cart".to_string());
        assert_eq!(err.user_message(), "Please log in to view your cart");
    }
}
