//! HTTP decision endpoint for reverse-proxy subrequest authentication
//!
//! - **`orchestrator`**: `DecisionEngine`, the per-request flow from path
//!   classification to the final outcome.
//! - **`credentials`**: Basic credential parsing and the static password
//!   table.
//! - **`state`**: builds the engine from a `ServiceConfig`.
//! - **`router`** / **`response`**: the axum surface.
//! - **`listener`**: TCP and unix-domain sockets with graceful shutdown.

pub mod client;
pub mod credentials;
pub mod listener;
pub mod orchestrator;
pub mod response;
pub mod router;
pub mod state;

pub use client::client_address;
pub use credentials::{BasicCredentials, StaticPasswords};
pub use listener::{serve, shutdown_signal, Endpoint};
pub use orchestrator::{Decision, DecisionEngine, EngineBuilder, IdentitySource, Outcome};
pub use response::render;
pub use router::router;
pub use state::build_engine;
