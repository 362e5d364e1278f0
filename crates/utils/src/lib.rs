//! Shared utilities for authgate
//!
//! Logging setup (verbosity levels, timestamp and program-name prefix,
//! console/file destinations) and the per-identity lock registry used to
//! serialize authentication attempts.

pub mod sync;
pub mod tracing;

pub use sync::*;
pub use self::tracing::*;
