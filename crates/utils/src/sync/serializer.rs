use super::identity_lock::IdentityLocks;
use std::future::Future;

/// Gate for authentication attempts
///
/// When enabled, futures for the same identity run one at a time; futures
/// for different identities are independent. No ordering among waiters is
/// promised.
#[derive(Debug, Clone, Default)]
pub struct AuthSerializer {
    locks: Option<IdentityLocks>,
}

impl AuthSerializer {
    pub fn new(enabled: bool) -> Self {
        Self {
            locks: enabled.then(IdentityLocks::new),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.locks.is_some()
    }

    /// Run `fut` while holding the identity's lock
    ///
    /// The lock is released when `fut` completes, panics or is dropped.
    pub async fn run<F, T>(&self, identity: &str, fut: F) -> T
    where
        F: Future<Output = T>,
    {
        match &self.locks {
            Some(locks) => {
                let _guard = locks.lock(identity).await;
                fut.await
            }
            None => fut.await,
        }
    }

    /// Identities currently holding or waiting for a lock
    pub fn in_flight(&self) -> usize {
        self.locks.as_ref().map_or(0, IdentityLocks::len)
    }
}
