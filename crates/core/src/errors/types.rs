//! Core error type definitions

use std::path::PathBuf;

/// Result type alias for authgate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for authgate operations using thiserror
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file parsing errors
    ConfigParse {
        path: PathBuf,
        format: &'static str,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration errors
    Configuration { message: String },

    /// Path pattern errors
    Pattern { pattern: String, message: String },

    /// File system operations
    FileSystem {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    /// Directory protocol errors (connect, StartTLS, bind transport, search)
    Directory {
        operation: String,
        endpoint: String,
        message: String,
    },

    /// TLS trust setup errors
    Tls { message: String },

    /// Network-related errors
    Network { endpoint: String, message: String },

    /// Operation timeout errors
    Timeout {
        operation: String,
        duration: std::time::Duration,
    },
}

/// An authentication attempt that stopped on an infrastructure error.
///
/// `authenticated` records whether the bind had already succeeded when the
/// error happened, so callers can tell a broken authorization search apart
/// from a broken connection.
#[derive(Debug, thiserror::Error)]
#[error("authentication aborted (authenticated={authenticated}): {source}")]
pub struct AuthFailure {
    pub authenticated: bool,
    #[source]
    pub source: Error,
}

impl AuthFailure {
    /// Failure before the identity was authenticated
    #[must_use]
    pub fn before_bind(source: Error) -> Self {
        Self {
            authenticated: false,
            source,
        }
    }

    /// Failure after a successful bind
    #[must_use]
    pub fn after_bind(source: Error) -> Self {
        Self {
            authenticated: true,
            source,
        }
    }
}
