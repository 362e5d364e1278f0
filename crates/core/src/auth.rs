//! The seam between the decision engine and credential checkers

use crate::errors::AuthFailure;
use crate::types::Verdict;
use async_trait::async_trait;

/// One authentication attempt.
///
/// `authz_filter` is the per-request authorization filter template resolved
/// from the request path; checkers without a notion of filters ignore it.
#[derive(Debug, Clone, Copy)]
pub struct AuthAttempt<'a> {
    pub identity: &'a str,
    pub credential: &'a str,
    pub client: &'a str,
    pub authz_filter: Option<&'a str>,
}

impl<'a> AuthAttempt<'a> {
    pub fn new(identity: &'a str, credential: &'a str, client: &'a str) -> Self {
        Self {
            identity,
            credential,
            client,
            authz_filter: None,
        }
    }

    pub fn with_authz_filter(mut self, filter: Option<&'a str>) -> Self {
        self.authz_filter = filter.filter(|f| !f.is_empty());
        self
    }
}

/// Checks an identity/credential pair.
///
/// Rejections are `Ok(Verdict::Unauthenticated)`; `Err` is reserved for
/// infrastructure failures.
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn authenticate(&self, attempt: &AuthAttempt<'_>) -> Result<Verdict, AuthFailure>;
}
