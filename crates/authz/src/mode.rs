use crate::resolver::{DirectoryFilterPolicy, RightLabelPolicy};
use crate::rights::UserRights;
use std::fmt;
use std::sync::Arc;

/// Authorization strategy, fixed at startup
#[derive(Clone)]
pub enum AuthzMode {
    /// Authentication alone decides
    Open,
    /// Right label from the path, checked against the rights table
    RightLabel {
        policy: RightLabelPolicy,
        rights: Arc<dyn UserRights>,
    },
    /// Directory search filter from the path, run after the bind
    DirectoryFilter(DirectoryFilterPolicy),
}

impl AuthzMode {
    pub fn name(&self) -> &'static str {
        match self {
            AuthzMode::Open => "open",
            AuthzMode::RightLabel { .. } => "right",
            AuthzMode::DirectoryFilter(_) => "filter",
        }
    }
}

impl fmt::Debug for AuthzMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthzMode::Open => f.write_str("Open"),
            AuthzMode::RightLabel { policy, .. } => {
                f.debug_struct("RightLabel").field("policy", policy).finish_non_exhaustive()
            }
            AuthzMode::DirectoryFilter(policy) => {
                f.debug_tuple("DirectoryFilter").field(policy).finish()
            }
        }
    }
}
