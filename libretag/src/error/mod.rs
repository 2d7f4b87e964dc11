//! Error types for retag
//!
//! Every failure surfaced by the library is a [`RetagError`]. Callers that
//! need to branch on the failure category use [`RetagError::kind`] instead of
//! inspecting messages.

use crate::reassign::Step;
use thiserror::Error;


/// Main error type for retag operations
#[derive(Error, Debug)]
pub enum RetagError {
    /// Missing or invalid configuration, detected before any remote call
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Resource not found errors (404, unresolvable tag)
    #[error("{resource_type} not found: {name}")]
    NotFound { resource_type: String, name: String },

    /// Network-related errors (connection, timeout, DNS, unexpected status)
    #[error("Network error: {message}")]
    Network {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Authentication errors (401, 403)
    #[error("Authentication error (status: {status_code:?}): {message}")]
    Authentication {
        message: String,
        status_code: Option<u16>,
    },

    /// Rate limiting errors (429)
    #[error("Rate limit: {message}")]
    RateLimit {
        message: String,
        retry_after: Option<u64>,
    },

    /// Server errors (5xx)
    #[error("Server error (status: {status_code}): {message}")]
    Server { message: String, status_code: u16 },

    /// The registry refused an operation it does not implement
    #[error("Unsupported operation (status: {status_code}): {message}")]
    Unsupported { message: String, status_code: u16 },

    /// Malformed registry responses (bad digest, missing headers)
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A failure while processing one repository of a batch
    #[error(
        "{step} failed for repository '{repository}' \
         (source tag: {source_tag}, target tag: {target_tag}, current tag: {current_tag}): {source}"
    )]
    Repository {
        repository: String,
        source_tag: String,
        target_tag: String,
        current_tag: String,
        step: Step,
        #[source]
        source: Box<RetagError>,
    },
}

/// Result type alias for retag operations
pub type Result<T> = std::result::Result<T, RetagError>;

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required input missing or empty; nothing was sent to the registry.
    Configuration,
    /// The source tag did not resolve to an image.
    NotFound,
    /// Any other remote-call failure.
    Registry,
}

impl RetagError {
    /// Returns the failure category, looking through repository context.
    ///
    /// # Examples
    ///
    /// ```
    /// use libretag::error::{ErrorKind, RetagError};
    ///
    /// let err = RetagError::not_found("tag", "app:build-1");
    /// assert_eq!(err.kind(), ErrorKind::NotFound);
    /// ```
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration { .. } => ErrorKind::Configuration,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Repository { source, .. } => source.kind(),
            Self::Network { .. }
            | Self::Authentication { .. }
            | Self::RateLimit { .. }
            | Self::Server { .. }
            | Self::Unsupported { .. }
            | Self::Validation { .. } => ErrorKind::Registry,
        }
    }

    /// Returns true if the error (or the wrapped error) is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    /// Creates a new configuration error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libretag::error::RetagError;
    ///
    /// let err = RetagError::configuration("source-tag is required");
    /// assert!(matches!(err, RetagError::Configuration { .. }));
    /// ```
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new configuration error with a source error.
    pub fn configuration_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new not found error.
    pub fn not_found<S: Into<String>, N: Into<String>>(resource_type: S, name: N) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            name: name.into(),
        }
    }

    /// Creates a new network error.
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new network error with a source error.
    ///
    /// # Examples
    ///
    /// ```
    /// use libretag::error::RetagError;
    /// use std::io;
    ///
    /// let io_err = io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused");
    /// let err = RetagError::network_with_source("failed to connect", io_err);
    /// assert!(matches!(err, RetagError::Network { .. }));
    /// ```
    pub fn network_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Network {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a new authentication error.
    pub fn authentication<S: Into<String>>(message: S, status_code: Option<u16>) -> Self {
        Self::Authentication {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new rate limit error.
    pub fn rate_limit<S: Into<String>>(message: S, retry_after: Option<u64>) -> Self {
        Self::RateLimit {
            message: message.into(),
            retry_after,
        }
    }

    /// Creates a new server error.
    pub fn server<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Server {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new unsupported-operation error.
    pub fn unsupported<S: Into<String>>(message: S, status_code: u16) -> Self {
        Self::Unsupported {
            message: message.into(),
            status_code,
        }
    }

    /// Creates a new validation error.
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a new validation error with a source error.
    pub fn validation_with_source<S, E>(message: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Validation {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Attaches repository and tag context to an error raised by `step`.
    pub fn in_repository(
        self,
        request: &crate::reassign::ReassignmentRequest,
        step: Step,
    ) -> Self {
        Self::Repository {
            repository: request.repository.clone(),
            source_tag: request.source_tag.clone(),
            target_tag: request.target_tag.clone(),
            current_tag: request.current_tag.clone(),
            step,
            source: Box::new(self),
        }
    }
}

impl From<config::ConfigError> for RetagError {
    fn from(error: config::ConfigError) -> Self {
        Self::configuration_with_source("Failed to load configuration", error)
    }
}
