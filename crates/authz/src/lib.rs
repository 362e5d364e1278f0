//! Authorization building blocks
//!
//! - **`classifier`**: turns a request path into a `Classification` using a
//!   pattern with exactly one capture group.
//! - **`resolver`**: maps a classification to a right label or to a
//!   directory search filter, with ban/default fallbacks.
//! - **`rights`**: the user-rights table consulted by right labels.
//! - **`etag`**: cache tags bound to identity, credential and path class.
//! - **`mode`**: the authorization strategy chosen at startup.

pub mod classifier;
pub mod etag;
pub mod mode;
pub mod resolver;
pub mod rights;

pub use classifier::PathClassifier;
pub use etag::{split_tags, CacheTag, CacheTagger};
pub use mode::AuthzMode;
pub use resolver::{DirectoryFilterPolicy, FilterDecision, RightLabelPolicy};
pub use rights::{RightsTable, UserRights};
