//! Per-identity mutual exclusion
//!
//! - **`identity_lock`**: a registry of async mutexes keyed by identity.
//!   Entries exist only while some task holds or waits for them.
//! - **`serializer`**: runs an authentication future under the identity's
//!   lock, or unguarded when serialization is turned off.

pub mod identity_lock;
pub mod serializer;

pub use identity_lock::{IdentityGuard, IdentityLocks};
pub use serializer::AuthSerializer;
