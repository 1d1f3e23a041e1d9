//! Centralized error types for LazyLinear.
//!
//! This module provides a unified error hierarchy for the application with
//! user-friendly error messages. All error types use `thiserror` for
//! ergonomic error handling.

use thiserror::Error;

use crate::api::{ApiError, ErrorKind};
use crate::config::ConfigError;
use crate::service::ServiceError;

/// The main application error type.
///
/// This enum aggregates all error types that can occur in LazyLinear,
/// providing user-friendly error messages while preserving the underlying
/// error context for debugging.
#[derive(Debug, Error)]
pub enum AppError {
    /// No API key in the environment or the config file.
    #[error("Linear API key not configured")]
    MissingApiKey,

    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Errors from a service operation.
    #[error("{0}")]
    Service(#[from] ServiceError),
}

impl AppError {
    /// The API error kind behind this error, if any.
    pub fn api_kind(&self) -> Option<ErrorKind> {
        match self {
            AppError::Service(e) => Some(e.kind()),
            _ => None,
        }
    }

    fn api_message(err: &ApiError) -> String {
        match err.kind {
            ErrorKind::Auth => "Authentication failed. Please check your Linear API key.".to_string(),
            ErrorKind::RateLimit => "Too many requests. Please wait a moment and try again.".to_string(),
            ErrorKind::Network => {
                "Connection failed. Please check your internet connection.".to_string()
            }
            ErrorKind::Cancelled => "The request timed out.".to_string(),
            ErrorKind::Validation => err.message.clone(),
            ErrorKind::Api => format!("Linear returned an error: {}", err.message),
        }
    }

    /// Get a user-friendly message for display.
    ///
    /// This returns a message suitable for showing to users in the UI,
    /// without technical jargon.
    pub fn user_message(&self) -> String {
        match self {
            AppError::MissingApiKey => "Linear API key not configured.".to_string(),
            AppError::Config(e) => match e {
                ConfigError::NoConfigDir => {
                    "Could not find configuration directory. Please check your system settings."
                        .to_string()
                }
                ConfigError::Io { .. } => {
                    "Could not access the configuration file. Check file permissions.".to_string()
                }
                ConfigError::Parse { .. } => {
                    "Configuration file is invalid. Please check the JSON format.".to_string()
                }
            },
            AppError::Service(e) => Self::api_message(e.api_error()),
        }
    }

    /// Check if this error is critical and requires user acknowledgment.
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            AppError::MissingApiKey | AppError::Config(_)
        ) || self.api_kind() == Some(ErrorKind::Auth)
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            AppError::MissingApiKey => Some(
                "Set LINEAR_API_KEY or add linear_api_key to ~/.config/lazylinear/config.json.",
            ),
            AppError::Config(ConfigError::Parse { .. }) => {
                Some("Fix or remove the configuration file and restart.")
            }
            _ => match self.api_kind() {
                Some(ErrorKind::Auth) => {
                    Some("Create a personal API key at https://linear.app/settings/api")
                }
                Some(ErrorKind::RateLimit) => Some("Wait a few seconds and choose Retry."),
                Some(ErrorKind::Network) | Some(ErrorKind::Cancelled) => {
                    Some("Check your internet connection and choose Retry.")
                }
                _ => None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_error(err: ApiError) -> AppError {
        AppError::Service(ServiceError::new("failed to fetch issues", err))
    }

    #[test]
    fn test_app_error_from_config_error() {
        let app_err: AppError = ConfigError::NoConfigDir.into();
        assert!(matches!(app_err, AppError::Config(ConfigError::NoConfigDir)));
    }

    #[test]
    fn test_app_error_from_service_error() {
        let err = ServiceError::new("ctx", ApiError::network("reset"));
        let app_err: AppError = err.into();
        assert_eq!(app_err.api_kind(), Some(ErrorKind::Network));
    }

    #[test]
    fn test_missing_api_key() {
        let err = AppError::MissingApiKey;
        assert_eq!(err.to_string(), "Linear API key not configured");
        assert!(err.is_critical());
        assert!(err.suggested_action().unwrap().contains("LINEAR_API_KEY"));
    }

    #[test]
    fn test_user_message_auth() {
        let err = service_error(ApiError::auth("authentication failed - invalid API key"));
        assert!(err.user_message().contains("API key"));
        assert!(err.is_critical());
        assert!(err.suggested_action().unwrap().contains("linear.app"));
    }

    #[test]
    fn test_user_message_network() {
        let err = service_error(ApiError::network("connection refused"));
        assert!(err.user_message().contains("Connection failed"));
        assert!(!err.is_critical());
        assert!(err.suggested_action().unwrap().contains("Retry"));
    }

    #[test]
    fn test_user_message_api_includes_detail() {
        let err = service_error(ApiError::api("GraphQL errors: Entity not found", 200));
        assert_eq!(
            err.user_message(),
            "Linear returned an error: GraphQL errors: Entity not found"
        );
        assert!(err.suggested_action().is_none());
    }

    #[test]
    fn test_user_message_validation_is_detail() {
        let err = service_error(ApiError::validation("title is required"));
        assert_eq!(err.user_message(), "title is required");
    }

    #[test]
    fn test_user_message_config_parse() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = AppError::Config(ConfigError::Parse {
            path: "config.json".into(),
            source,
        });
        assert!(err.user_message().contains("invalid"));
        assert!(err.is_critical());
    }
}
