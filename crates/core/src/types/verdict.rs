/// Outcome of an authentication attempt that reached a conclusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Credential rejected or identity not unique
    Unauthenticated,
    /// Identity proven, authorization search did not match
    Authenticated,
    /// Identity proven and every configured check passed
    Authorized,
}

impl Verdict {
    pub fn is_authenticated(self) -> bool {
        !matches!(self, Verdict::Unauthenticated)
    }

    pub fn is_authorized(self) -> bool {
        matches!(self, Verdict::Authorized)
    }
}
