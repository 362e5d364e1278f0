//! Domain types shared by the classifier, resolver, cache tags and sessions

mod classification;
mod verdict;

pub use classification::{Classification, PolicyId};
pub use verdict::Verdict;
