//! Error types and result extensions for authgate operations

mod builders;
mod conversions;
mod display;
mod extensions;
mod types;

pub use extensions::*;
pub use types::{AuthFailure, Error, Result};
