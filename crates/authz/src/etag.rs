//! Cache tags that bind a decision to who asked and for what
//!
//! A tag is the base64url encoding of length-framed fields:
//!
//! 1. the 8-byte little-endian process epoch (milliseconds at startup)
//! 2. HMAC-SHA256 over the epoch and the identity
//! 3. for credential schemes only, HMAC-SHA256 over the epoch, the identity
//!    and the credential
//! 4. the classification marker, `M<policy id>` or `N`
//!
//! The HMAC key is random per process, so tags cannot be computed outside
//! the service and all tags lapse on restart.

use authgate_core::{Classification, Error, Result};
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::Sha256;
use std::fmt;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

const KEY_LEN: usize = 32;

// Domain separation between the two digests
const IDENTITY_DOMAIN: &[u8] = b"authgate/identity";
const CREDENTIAL_DOMAIN: &[u8] = b"authgate/credential";

/// Computes cache tags for one process lifetime
#[derive(Clone)]
pub struct CacheTagger {
    mac: HmacSha256,
    epoch: [u8; 8],
}

impl fmt::Debug for CacheTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheTagger")
            .field("epoch", &i64::from_le_bytes(self.epoch))
            .finish_non_exhaustive()
    }
}

impl CacheTagger {
    /// Fresh random key, epoch = now
    pub fn new() -> Result<Self> {
        let mut key = [0u8; KEY_LEN];
        rand::thread_rng().fill_bytes(&mut key);
        Self::with_key(&key, chrono::Utc::now().timestamp_millis())
    }

    /// Fixed key and epoch
    pub fn with_key(key: &[u8], epoch: i64) -> Result<Self> {
        let mac = HmacSha256::new_from_slice(key)
            .map_err(|e| Error::configuration(format!("cache tag key rejected: {e}")))?;
        Ok(Self {
            mac,
            epoch: epoch.to_le_bytes(),
        })
    }

    /// Tag for one request.
    ///
    /// `credential` is `Some` exactly for credential-bearing schemes.
    pub fn make_tag(
        &self,
        identity: &str,
        credential: Option<&str>,
        class: &Classification,
    ) -> CacheTag {
        let mut payload = Vec::with_capacity(128);
        put_field(&mut payload, &self.epoch);
        put_field(&mut payload, &self.digest(IDENTITY_DOMAIN, &[identity.as_bytes()]));
        if let Some(credential) = credential {
            put_field(
                &mut payload,
                &self.digest(CREDENTIAL_DOMAIN, &[identity.as_bytes(), credential.as_bytes()]),
            );
        }
        put_field(&mut payload, class.marker().as_bytes());

        CacheTag(format!("\"{}\"", URL_SAFE_NO_PAD.encode(payload)))
    }

    fn digest(&self, domain: &[u8], fields: &[&[u8]]) -> Vec<u8> {
        let mut framed = Vec::new();
        put_field(&mut framed, domain);
        put_field(&mut framed, &self.epoch);
        for field in fields {
            put_field(&mut framed, field);
        }

        let mut mac = self.mac.clone();
        mac.update(&framed);
        mac.finalize().into_bytes().to_vec()
    }
}

/// u32 big-endian length prefix, then the bytes
fn put_field(out: &mut Vec<u8>, field: &[u8]) {
    let len = u32::try_from(field.len()).unwrap_or(u32::MAX);
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(field);
}

/// A quoted entity tag, ready for the `Etag` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheTag(String);

impl CacheTag {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether an `If-None-Match` value names this tag.
    ///
    /// Weak tags (`W/"..."`) and `*` never match: a decision is only reused
    /// for the exact identity and class it was made for.
    pub fn matches(&self, if_none_match: &str) -> bool {
        split_tags(if_none_match)
            .into_iter()
            .filter(|tag| !tag.starts_with("W/") && *tag != "*")
            .fold(false, |found, tag| {
                found | bool::from(tag.as_bytes().ct_eq(self.0.as_bytes()))
            })
    }
}

impl fmt::Display for CacheTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split a comma/space separated list of entity tags
pub fn split_tags(value: &str) -> Vec<&str> {
    value
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|tag| !tag.is_empty())
        .collect()
}
