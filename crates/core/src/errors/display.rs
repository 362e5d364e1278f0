//! Display implementations for error types

use super::types::Error;
use std::fmt;

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::ConfigParse {
                path,
                format,
                message,
                ..
            } => {
                write!(
                    f,
                    "failed to parse {} config file '{}': {}",
                    format,
                    path.display(),
                    message
                )
            }
            Error::Configuration { message } => {
                write!(f, "configuration error: {message}")
            }
            Error::Pattern { pattern, message } => {
                write!(f, "invalid path pattern '{pattern}': {message}")
            }
            Error::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "file system {} operation failed for '{}': {}",
                    operation,
                    path.display(),
                    source
                )
            }
            Error::Directory {
                operation,
                endpoint,
                message,
            } => {
                write!(f, "directory {operation} failed for '{endpoint}': {message}")
            }
            Error::Tls { message } => {
                write!(f, "TLS setup error: {message}")
            }
            Error::Network { endpoint, message } => {
                write!(f, "network error for '{endpoint}': {message}")
            }
            Error::Timeout {
                operation,
                duration,
            } => {
                write!(f, "operation '{operation}' timed out after {duration:?}")
            }
        }
    }
}
