//! Directory-backed authentication
//!
//! A fresh connection is opened for every attempt: optional StartTLS, a
//! simple bind as the expanded bind DN, then up to two subtree searches
//! (the uniqueness filter from the config and the per-request
//! authorization filter) that must each match exactly one entry.

pub mod escape;
pub mod session;
pub mod template;
pub mod tls;

pub use escape::{escape_dn, escape_filter};
pub use session::LdapDirectory;
pub use template::{bind_dn, search_filter};
