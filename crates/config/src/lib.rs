//! Configuration parsing and validation for authgate
//!
//! This crate turns a JSON, YAML or TOML file into a typed `ServiceConfig`
//! and resolves the HTTP status/message table. Everything here is loaded
//! once at startup; nothing is reloaded.

pub mod config;
pub mod loader;
pub mod status;


pub use config::*;
pub use loader::*;
pub use status::*;
