//! Conversion implementations for error types

use super::types::Error;
use std::path::PathBuf;

// The path is unknown here; call sites that have one use `Error::file_system`
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Error::FileSystem {
            path: PathBuf::new(),
            operation: "unknown".to_string(),
            source: error,
        }
    }
}

