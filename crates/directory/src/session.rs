//! One directory session per authentication attempt

use crate::template::{bind_dn, search_filter};
use crate::tls::build_connector;
use async_trait::async_trait;
use authgate_config::LdapSection;
use authgate_core::{AuthAttempt, AuthFailure, Authenticator, Error, Result, Verdict};
use ldap3::{DerefAliases, Ldap, LdapConnAsync, LdapConnSettings, Scope, SearchOptions};
use native_tls::TlsConnector;
use std::ops::ControlFlow;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// "No attributes": searches only need the entry count
const NO_ATTRS: &str = "1.1";

/// Authenticator that binds to a directory server
///
/// Immutable after construction; every attempt opens and tears down its
/// own connection, so nothing is shared between identities.
#[derive(Clone)]
pub struct LdapDirectory {
    host_url: String,
    start_tls: bool,
    base_dn: String,
    bind_template: String,
    uniq_filter: Option<String>,
    timeout: Duration,
    connector: TlsConnector,
}

impl std::fmt::Debug for LdapDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapDirectory")
            .field("host_url", &self.host_url)
            .field("start_tls", &self.start_tls)
            .field("base_dn", &self.base_dn)
            .field("bind_template", &self.bind_template)
            .field("uniq_filter", &self.uniq_filter)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl LdapDirectory {
    /// Build from the `auth` section; reads CA files, so it can fail
    pub fn new(section: &LdapSection) -> Result<Self> {
        let connector = build_connector(&section.root_ca_files, section.skip_cert_verify)?;

        Ok(Self {
            host_url: section.host_url.clone(),
            start_tls: section.start_tls,
            base_dn: section.base_dn.clone(),
            bind_template: section.bind_dn.clone(),
            uniq_filter: Some(section.uniq_filter.clone()).filter(|f| !f.is_empty()),
            timeout: section.timeout(),
            connector,
        })
    }

    async fn connect(&self) -> Result<Ldap> {
        let settings = LdapConnSettings::new()
            .set_conn_timeout(self.timeout)
            .set_starttls(self.start_tls)
            .set_connector(self.connector.clone());

        // Bounds the StartTLS handshake too, not only the TCP connect
        let (conn, ldap) = tokio::time::timeout(
            self.timeout,
            LdapConnAsync::with_settings(settings, &self.host_url),
        )
        .await
        .map_err(|_| Error::timeout("directory connect", self.timeout))?
        .map_err(|e| Error::directory("connect", &self.host_url, e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = conn.drive().await {
                debug!(error = %e, "directory connection closed with error");
            }
        });

        Ok(ldap)
    }

    async fn count_matches(&self, ldap: &mut Ldap, template: &str, identity: &str) -> Result<usize> {
        let filter = search_filter(template, identity);
        let (entries, _) = ldap
            .with_timeout(self.timeout)
            .with_search_options(SearchOptions::new().deref(DerefAliases::Never))
            .search(&self.base_dn, Scope::Subtree, &filter, vec![NO_ATTRS])
            .await
            .and_then(|res| res.success())
            .map_err(|e| Error::directory("search", &self.host_url, e.to_string()))?;
        Ok(entries.len())
    }

    async fn run_session(
        &self,
        ldap: &mut Ldap,
        attempt: &AuthAttempt<'_>,
    ) -> std::result::Result<Verdict, AuthFailure> {
        let user = attempt.identity;
        let client = attempt.client;
        let dn = bind_dn(&self.bind_template, user);

        let bound = ldap
            .with_timeout(self.timeout)
            .simple_bind(&dn, attempt.credential)
            .await
            .and_then(|res| res.success())
            .map(drop)
            .map_err(|e| Error::directory("bind", &self.host_url, e.to_string()));
        match &bound {
            Err(e) => warn!(bind_dn = %dn, user = %user, client_ip = %client, error = %e, "directory bind failed"),
            Ok(()) => info!(bind_dn = %dn, user = %user, client_ip = %client, "directory bind succeeded"),
        }
        if let ControlFlow::Break(verdict) = settle(Step::Bind(bound)) {
            return verdict;
        }

        if let Some(template) = &self.uniq_filter {
            let found = self.count_matches(ldap, template, user).await;
            log_search("unique", template, attempt, &found);
            if let ControlFlow::Break(verdict) = settle(Step::Unique(found)) {
                return verdict;
            }
        }

        if let Some(template) = attempt.authz_filter {
            let found = self.count_matches(ldap, template, user).await;
            log_search("authorization", template, attempt, &found);
            if let ControlFlow::Break(verdict) = settle(Step::Authorization(found)) {
                return verdict;
            }
        }

        Ok(Verdict::Authorized)
    }
}

/// Result of one stage of a directory session
#[derive(Debug)]
enum Step {
    Bind(Result<()>),
    /// Entries matched by the uniqueness filter
    Unique(Result<usize>),
    /// Entries matched by the authorization filter
    Authorization(Result<usize>),
}

/// Map a stage result to the attempt's answer, or continue to the next stage.
///
/// A rejected bind is a plain authentication failure. Search errors abort
/// the attempt; whether the identity counts as authenticated depends on
/// which search broke. A session that passes every stage is `Authorized`.
fn settle(step: Step) -> ControlFlow<std::result::Result<Verdict, AuthFailure>> {
    match step {
        Step::Bind(Err(_)) => ControlFlow::Break(Ok(Verdict::Unauthenticated)),
        Step::Unique(Err(e)) => ControlFlow::Break(Err(AuthFailure::before_bind(e))),
        Step::Authorization(Err(e)) => ControlFlow::Break(Err(AuthFailure::after_bind(e))),
        Step::Unique(Ok(1)) | Step::Authorization(Ok(1)) | Step::Bind(Ok(())) => {
            ControlFlow::Continue(())
        }
        Step::Unique(Ok(_)) => ControlFlow::Break(Ok(Verdict::Unauthenticated)),
        Step::Authorization(Ok(_)) => ControlFlow::Break(Ok(Verdict::Authenticated)),
    }
}

fn log_search(kind: &str, template: &str, attempt: &AuthAttempt<'_>, found: &Result<usize>) {
    let user = attempt.identity;
    let client = attempt.client;
    match found {
        Err(e) => {
            error!(user = %user, filter = %template, client_ip = %client, error = %e, "{kind} filter search failed");
        }
        Ok(1) => {
            debug!(user = %user, filter = %template, client_ip = %client, "{kind} filter matched");
        }
        Ok(entries) => {
            warn!(user = %user, filter = %template, client_ip = %client, entries, "{kind} filter did not match exactly one entry");
        }
    }
}

#[async_trait]
impl Authenticator for LdapDirectory {
    async fn authenticate(&self, attempt: &AuthAttempt<'_>) -> std::result::Result<Verdict, AuthFailure> {
        // An empty password would be an anonymous bind, which most servers accept
        if attempt.credential.is_empty() {
            warn!(user = %attempt.identity, client_ip = %attempt.client, "empty password rejected");
            return Ok(Verdict::Unauthenticated);
        }

        let mut ldap = match self.connect().await {
            Ok(ldap) => ldap,
            Err(e) => {
                error!(host = %self.host_url, user = %attempt.identity, client_ip = %attempt.client, error = %e, "directory connection failed");
                return Err(AuthFailure::before_bind(e));
            }
        };

        let verdict = self.run_session(&mut ldap, attempt).await;

        if let Err(e) = ldap.unbind().await {
            debug!(host = %self.host_url, error = %e, "directory unbind failed");
        }

        verdict
    }
}
