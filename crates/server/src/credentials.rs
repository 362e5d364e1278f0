//! Basic credentials and the static password table

use async_trait::async_trait;
use authgate_core::{AuthAttempt, AuthFailure, Authenticator, Error, Result, Verdict};
use axum::http::{header::AUTHORIZATION, HeaderMap};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tracing::{info, warn};

const SHA256_PREFIX: &str = "sha256:";

/// Identity and password from an `Authorization: Basic` header
#[derive(Clone, PartialEq, Eq)]
pub struct BasicCredentials {
    pub user: String,
    pub password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("user", &self.user)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    /// `None` when the header is absent, not Basic, or malformed
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
        let (scheme, encoded) = value.trim().split_once(' ')?;
        if !scheme.eq_ignore_ascii_case("basic") {
            return None;
        }

        let decoded = STANDARD.decode(encoded.trim()).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (user, password) = decoded.split_once(':')?;

        Some(Self {
            user: user.to_string(),
            password: password.to_string(),
        })
    }
}

#[derive(Clone)]
enum StoredPassword {
    Plain(Vec<u8>),
    Sha256([u8; 32]),
}

impl StoredPassword {
    fn parse(user: &str, value: &str) -> Result<Self> {
        let Some(hex_digest) = value.strip_prefix(SHA256_PREFIX) else {
            return Ok(StoredPassword::Plain(value.as_bytes().to_vec()));
        };

        let mut digest = [0u8; 32];
        hex::decode_to_slice(hex_digest.trim(), &mut digest).map_err(|e| {
            Error::configuration(format!("password for '{user}' is not a valid sha256 digest: {e}"))
        })?;
        Ok(StoredPassword::Sha256(digest))
    }

    fn verify(&self, candidate: &str) -> bool {
        match self {
            StoredPassword::Plain(stored) => stored.as_slice().ct_eq(candidate.as_bytes()).into(),
            StoredPassword::Sha256(stored) => {
                let digest = Sha256::digest(candidate.as_bytes());
                stored.as_slice().ct_eq(digest.as_slice()).into()
            }
        }
    }
}

/// Authenticator backed by the `password` table in the config file.
///
/// Values are plain text or `sha256:<hex>`.
#[derive(Clone, Default)]
pub struct StaticPasswords {
    entries: HashMap<String, StoredPassword>,
}

impl std::fmt::Debug for StaticPasswords {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticPasswords")
            .field("users", &self.entries.len())
            .finish()
    }
}

impl StaticPasswords {
    pub fn from_table(table: &HashMap<String, String>) -> Result<Self> {
        let entries = table
            .iter()
            .map(|(user, value)| Ok((user.clone(), StoredPassword::parse(user, value)?)))
            .collect::<Result<HashMap<_, _>>>()?;
        Ok(Self { entries })
    }
}

#[async_trait]
impl Authenticator for StaticPasswords {
    async fn authenticate(&self, attempt: &AuthAttempt<'_>) -> std::result::Result<Verdict, AuthFailure> {
        let accepted = self
            .entries
            .get(attempt.identity)
            .is_some_and(|stored| stored.verify(attempt.credential));

        if accepted {
            info!(user = %attempt.identity, client_ip = %attempt.client, "password accepted");
            Ok(Verdict::Authorized)
        } else {
            warn!(user = %attempt.identity, client_ip = %attempt.client, "password rejected");
            Ok(Verdict::Unauthenticated)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_parse_basic() {
        // alice:open sesame
        let creds = BasicCredentials::from_headers(&headers("Basic YWxpY2U6b3BlbiBzZXNhbWU=")).unwrap();
        assert_eq!(creds.user, "alice");
        assert_eq!(creds.password, "open sesame");
    }

    #[test]
    fn test_password_may_contain_colon() {
        // bob:a:b
        let creds = BasicCredentials::from_headers(&headers("basic Ym9iOmE6Yg==")).unwrap();
        assert_eq!(creds.user, "bob");
        assert_eq!(creds.password, "a:b");
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(BasicCredentials::from_headers(&HeaderMap::new()).is_none());
        assert!(BasicCredentials::from_headers(&headers("Bearer abc")).is_none());
        assert!(BasicCredentials::from_headers(&headers("Basic !!!")).is_none());
        // "nocolon"
        assert!(BasicCredentials::from_headers(&headers("Basic bm9jb2xvbg==")).is_none());
    }

    #[test]
    fn test_debug_hides_password() {
        let creds = BasicCredentials {
            user: "alice".into(),
            password: "hunter2".into(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }

    fn table() -> StaticPasswords {
        StaticPasswords::from_table(&HashMap::from([
            ("alice".to_string(), "wonderland".to_string()),
            (
                "bob".to_string(),
                // sha256("builder")
                "sha256:df6b07176a9b17cc4c9afc257bd404732e7d09b76436c7890f7b7be14e579794".to_string(),
            ),
        ]))
        .unwrap()
    }

    #[tokio::test]
    async fn test_plain_and_hashed_passwords() {
        let passwords = table();
        let check = |user: &'static str, pw: &'static str| {
            let passwords = passwords.clone();
            async move {
                passwords
                    .authenticate(&AuthAttempt::new(user, pw, "-"))
                    .await
                    .unwrap()
            }
        };

        assert_eq!(check("alice", "wonderland").await, Verdict::Authorized);
        assert_eq!(check("alice", "Wonderland").await, Verdict::Unauthenticated);
        assert_eq!(check("bob", "builder").await, Verdict::Authorized);
        assert_eq!(check("bob", "sha256:2bb8").await, Verdict::Unauthenticated);
        assert_eq!(check("carol", "anything").await, Verdict::Unauthenticated);
    }

    #[test]
    fn test_bad_digest_rejected_at_load() {
        let table = HashMap::from([("eve".to_string(), "sha256:nothex".to_string())]);
        assert!(StaticPasswords::from_table(&table).is_err());
    }
}
