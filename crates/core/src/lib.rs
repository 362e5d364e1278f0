//! Core domain types, errors, and constants for the `authgate` service.
//!
//! This crate holds the pieces every other crate in the workspace agrees on:
//!
//! - **`errors`**: the primary `Error` enum and `Result` alias, plus the
//!   `AuthFailure` carried out of an authentication attempt that hit an
//!   infrastructure problem.
//! - **`types`**: request classification (`Classification`, `PolicyId`) and the
//!   three-valued authentication `Verdict`.
//! - **`auth`**: the `Authenticator` trait, the seam between the decision
//!   engine and whatever checks a credential (directory, static table, stubs).
//! - **`constants`**: header names and defaults shared by config and server.

pub mod auth;
pub mod constants;
pub mod errors;
pub mod types;

pub use self::{
    auth::{AuthAttempt, Authenticator},
    constants::*,
    errors::{AuthFailure, Error, Result, ResultExt},
    types::*,
};
