//! Typed service configuration
//!
//! `ServiceConfig` mirrors the config file one to one. It is deserialized
//! once at startup, validated, and then turned into the immutable runtime
//! state by the server crate; nothing mutates it afterwards.

use crate::loader::load_file;
use crate::status::{ResponseTable, StatusTable};
use authgate_core::{
    Error, Result, DEFAULT_DIRECTORY_TIMEOUT_MS, DEFAULT_PATH_HEADER, DEFAULT_USER_HEADER,
};
use authgate_utils::Verbosity;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Root of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    /// `tcp` or `unix`
    pub socket_type: SocketType,

    /// Listen address (tcp) or socket file path (unix)
    pub socket_path: String,

    /// `max-age` for authorized responses; zero leaves `no-store`
    #[serde(default)]
    pub cache_seconds: u32,

    /// `max-age` for every other response; zero leaves `no-store`
    #[serde(default)]
    pub neg_cache_seconds: u32,

    /// Answer 304 when `If-None-Match` carries the current tag
    #[serde(default = "default_true")]
    pub use_etag: bool,

    /// Serialize authentication attempts per identity
    #[serde(default)]
    pub use_serialized_auth: bool,

    /// Realm for the Basic challenge (required for credential schemes)
    #[serde(default)]
    pub auth_realm: String,

    /// Header carrying the path to authorize
    #[serde(default = "default_path_header")]
    pub path_header: String,

    /// How the requesting identity is established
    pub auth: AuthSection,

    /// How an established identity is authorized for a path
    #[serde(default)]
    pub authz: AuthzSection,

    /// Status/message overrides
    #[serde(default)]
    pub response: StatusTable,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocketType {
    Tcp,
    Unix,
}

/// Identity sources
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthSection {
    /// Identity forwarded by the proxy in a header, no credential
    Header {
        #[serde(default = "default_user_header")]
        user_header: String,
    },
    /// Basic credentials checked against a static password table
    Static { password: HashMap<String, String> },
    /// Basic credentials checked by binding to a directory
    Ldap(LdapSection),
}

impl AuthSection {
    pub fn name(&self) -> &'static str {
        match self {
            AuthSection::Header { .. } => "header",
            AuthSection::Static { .. } => "static",
            AuthSection::Ldap(_) => "ldap",
        }
    }

    /// Whether the scheme checks a credential (and so challenges with Basic)
    pub fn has_credential(&self) -> bool {
        !matches!(self, AuthSection::Header { .. })
    }
}

/// Directory connection and identity templates
#[derive(Debug, Clone, Deserialize)]
pub struct LdapSection {
    pub host_url: String,
    #[serde(default, deserialize_with = "flag")]
    pub start_tls: bool,
    #[serde(default, deserialize_with = "flag")]
    pub skip_cert_verify: bool,
    #[serde(default)]
    pub root_ca_files: Vec<PathBuf>,
    pub base_dn: String,
    /// Bind DN template with one `%s`
    pub bind_dn: String,
    /// Optional uniqueness filter template
    #[serde(default)]
    pub uniq_filter: String,
    /// Milliseconds; zero means the default
    #[serde(default)]
    pub timeout: u64,
}

impl LdapSection {
    pub fn timeout(&self) -> Duration {
        let ms = if self.timeout == 0 {
            DEFAULT_DIRECTORY_TIMEOUT_MS
        } else {
            self.timeout
        };
        Duration::from_millis(ms)
    }
}

/// Authorization strategies
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthzSection {
    /// Every authenticated identity is authorized
    Open {
        /// Only used to classify paths for cache tags
        #[serde(default)]
        path_pattern: Option<String>,
    },
    /// Path -> right label, checked against the rights table
    Right(RightSection),
    /// Path -> directory search filter
    Filter(FilterSection),
}

impl Default for AuthzSection {
    fn default() -> Self {
        AuthzSection::Open { path_pattern: None }
    }
}

impl AuthzSection {
    pub fn name(&self) -> &'static str {
        match self {
            AuthzSection::Open { .. } => "open",
            AuthzSection::Right(_) => "right",
            AuthzSection::Filter(_) => "filter",
        }
    }

    pub fn path_pattern(&self) -> Option<&str> {
        match self {
            AuthzSection::Open { path_pattern } => path_pattern.as_deref(),
            AuthzSection::Right(right) => Some(&right.path_pattern),
            AuthzSection::Filter(filter) => Some(&filter.path_pattern),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RightSection {
    /// Rights table file (JSON, YAML or TOML)
    pub usermap: PathBuf,
    pub path_pattern: String,
    pub nomatch_right: String,
    pub default_right: String,
    #[serde(default)]
    pub path_right: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FilterSection {
    pub path_pattern: String,
    #[serde(default)]
    pub ban_nomatch: bool,
    #[serde(default)]
    pub nomatch_filter: String,
    #[serde(default)]
    pub ban_default: bool,
    #[serde(default)]
    pub default_filter: String,
    #[serde(default)]
    pub path_filter: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoggingSection {
    #[serde(default)]
    pub enable_console: bool,
    #[serde(default)]
    pub logfile: Option<PathBuf>,
    #[serde(default)]
    pub logging_level: Verbosity,
}

impl ServiceConfig {
    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let config: ServiceConfig = load_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Check everything that can be checked without touching other files
    pub fn validate(&self) -> Result<()> {
        if self.socket_path.is_empty() {
            return Err(Error::configuration("socket_path is required"));
        }

        if self.auth.has_credential() && self.auth_realm.is_empty() {
            return Err(Error::configuration(format!(
                "auth_realm is required for auth type '{}'",
                self.auth.name()
            )));
        }

        match (&self.auth, &self.authz) {
            (AuthSection::Header { .. }, AuthzSection::Open { .. }) => {
                return Err(Error::configuration(
                    "auth type 'header' needs an authz type other than 'open'",
                ));
            }
            (AuthSection::Header { .. } | AuthSection::Static { .. }, AuthzSection::Filter(_)) => {
                return Err(Error::configuration(format!(
                    "authz type 'filter' needs auth type 'ldap', not '{}'",
                    self.auth.name()
                )));
            }
            _ => {}
        }

        if let AuthSection::Header { user_header } = &self.auth {
            if user_header.is_empty() {
                return Err(Error::configuration("auth.user_header must not be empty"));
            }
        }

        if let AuthSection::Ldap(ldap) = &self.auth {
            if ldap.host_url.is_empty() {
                return Err(Error::configuration("auth.host_url is required"));
            }
            if ldap.bind_dn.is_empty() {
                return Err(Error::configuration("auth.bind_dn is required"));
            }
        }

        if let AuthzSection::Right(right) = &self.authz {
            if right.nomatch_right.is_empty() || right.default_right.is_empty() {
                return Err(Error::configuration(
                    "authz.nomatch_right and authz.default_right are required",
                ));
            }
        }

        ResponseTable::resolve(&self.response)?;
        Ok(())
    }

    /// Settings that are accepted but have no effect
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if let AuthzSection::Filter(filter) = &self.authz {
            if filter.ban_nomatch && !filter.nomatch_filter.is_empty() {
                warnings.push("nomatch_filter is not used because ban_nomatch is true".to_string());
            }
            if filter.ban_default && !filter.default_filter.is_empty() {
                warnings.push("default_filter is not used because ban_default is true".to_string());
            }
        }
        if !self.auth.has_credential() && !self.auth_realm.is_empty() {
            warnings.push("auth_realm is not used by auth type 'header'".to_string());
        }
        warnings
    }
}

fn default_true() -> bool {
    true
}

fn default_path_header() -> String {
    DEFAULT_PATH_HEADER.to_string()
}

fn default_user_header() -> String {
    DEFAULT_USER_HEADER.to_string()
}

/// Accept `true`/`false` as well as the integer form (`0` is false)
fn flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Int(i64),
    }

    Ok(match Flag::deserialize(deserializer)? {
        Flag::Bool(b) => b,
        Flag::Int(i) => i != 0,
    })
}
