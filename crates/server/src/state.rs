//! Turns a validated `ServiceConfig` into the shared `DecisionEngine`

use crate::credentials::StaticPasswords;
use crate::orchestrator::{parse_header_name, DecisionEngine, IdentitySource};
use authgate_authz::{
    AuthzMode, CacheTagger, DirectoryFilterPolicy, PathClassifier, RightLabelPolicy, RightsTable,
};
use authgate_config::{AuthSection, AuthzSection, ResponseTable, ServiceConfig};
use authgate_core::{Authenticator, Result, ResultExt};
use authgate_directory::LdapDirectory;
use std::sync::Arc;

/// Build every runtime component, loading the rights table if one is named.
///
/// Any error here is a startup error.
pub fn build_engine(config: &ServiceConfig) -> Result<DecisionEngine> {
    config.validate()?;

    let identity = identity_source(config)?;
    let classifier = PathClassifier::new(config.authz.path_pattern())?;
    let mode = authz_mode(&config.authz)?;

    tracing::debug!(
        auth = config.auth.name(),
        authz = config.authz.name(),
        path_pattern = classifier.pattern().unwrap_or(""),
        "engine configured"
    );

    DecisionEngine::builder(identity)
        .path_header(&config.path_header)?
        .classifier(classifier)
        .mode(mode)
        .tagger(CacheTagger::new()?)
        .serialize(config.use_serialized_auth)
        .responses(ResponseTable::resolve(&config.response)?)
        .use_etag(config.use_etag)
        .cache_seconds(config.cache_seconds, config.neg_cache_seconds)
        .build()
}

fn identity_source(config: &ServiceConfig) -> Result<IdentitySource> {
    let authenticator: Arc<dyn Authenticator> = match &config.auth {
        AuthSection::Header { user_header } => {
            return Ok(IdentitySource::Header {
                header: parse_header_name("auth.user_header", user_header)?,
            });
        }
        AuthSection::Static { password } => Arc::new(StaticPasswords::from_table(password)?),
        AuthSection::Ldap(ldap) => Arc::new(LdapDirectory::new(ldap)?),
    };
    IdentitySource::basic(authenticator, &config.auth_realm)
}

fn authz_mode(section: &AuthzSection) -> Result<AuthzMode> {
    Ok(match section {
        AuthzSection::Open { .. } => AuthzMode::Open,
        AuthzSection::Right(right) => {
            let rights = RightsTable::load(&right.usermap)
                .with_context(|| format!("authz.usermap {}", right.usermap.display()))?;
            let policy = RightLabelPolicy::from_section(right);
            policy.validate(&rights)?;
            AuthzMode::RightLabel {
                policy,
                rights: Arc::new(rights),
            }
        }
        AuthzSection::Filter(filter) => {
            AuthzMode::DirectoryFilter(DirectoryFilterPolicy::from_section(filter))
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use authgate_config::{parse_str, ConfigFormat};
    use std::path::Path;

    fn config(text: &str) -> ServiceConfig {
        parse_str(text, ConfigFormat::Toml, Path::new("authgate.toml")).unwrap()
    }

    #[test]
    fn test_unknown_label_is_startup_error() {
        let dir = tempfile::tempdir().unwrap();
        let usermap = dir.path().join("rights.json");
        std::fs::write(&usermap, r#"{"reader": ["alice"]}"#).unwrap();

        let text = format!(
            r#"
            socket_type = "tcp"
            socket_path = "127.0.0.1:0"
            [auth]
            type = "header"
            [authz]
            type = "right"
            usermap = "{}"
            path_pattern = "^/docs/(\\d+)"
            nomatch_right = "none"
            default_right = "writer"
            "#,
            usermap.display()
        );
        let err = build_engine(&config(&text)).unwrap_err();
        assert!(err.to_string().contains("writer"));
    }

    #[test]
    fn test_pattern_without_group_is_startup_error() {
        let text = r#"
            socket_type = "tcp"
            socket_path = "127.0.0.1:0"
            auth_realm = "r"
            [auth]
            type = "static"
            password = { alice = "pw" }
            [authz]
            type = "open"
            path_pattern = "^/docs/"
        "#;
        assert!(build_engine(&config(text)).is_err());
    }

    #[test]
    fn test_static_open_builds() {
        let text = r#"
            socket_type = "unix"
            socket_path = "/tmp/authgate.sock"
            auth_realm = "Staff"
            [auth]
            type = "static"
            password = { alice = "pw" }
        "#;
        assert!(build_engine(&config(text)).is_ok());
    }
}
