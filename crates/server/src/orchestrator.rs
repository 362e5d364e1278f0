//! The per-request decision: classify, check the cache tag, authenticate,
//! authorize.
//!
//! One engine covers every supported pairing of identity source and
//! authorization mode. It holds only immutable state plus the lock
//! registry inside the serializer, so a single `Arc<DecisionEngine>` is
//! shared by all request tasks.

use crate::credentials::BasicCredentials;
use authgate_authz::{AuthzMode, CacheTag, CacheTagger, PathClassifier};
use authgate_config::{ReplyKind, ResponseTable};
use authgate_core::{
    AuthAttempt, Authenticator, Classification, Error, Result, DEFAULT_PATH_HEADER,
    IF_NONE_MATCH_HEADER,
};
use authgate_utils::AuthSerializer;
use axum::http::{header::AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Where the identity comes from
#[derive(Clone)]
pub enum IdentitySource {
    /// Trusted header set by the proxy; no credential
    Header { header: HeaderName },
    /// `Authorization: Basic`, checked by `authenticator`
    Basic {
        authenticator: Arc<dyn Authenticator>,
        /// Ready-made `WWW-Authenticate` value
        challenge: HeaderValue,
    },
}

impl IdentitySource {
    /// Basic source with `Basic realm="..."`; embedded quotes are escaped
    pub fn basic(authenticator: Arc<dyn Authenticator>, realm: &str) -> Result<Self> {
        let escaped = realm.replace('"', "\\\"");
        let challenge = HeaderValue::from_str(&format!("Basic realm=\"{escaped}\""))
            .map_err(|e| Error::configuration(format!("auth_realm '{realm}' is not a valid header value: {e}")))?;
        Ok(IdentitySource::Basic {
            authenticator,
            challenge,
        })
    }

    fn name(&self) -> &'static str {
        match self {
            IdentitySource::Header { .. } => "header",
            IdentitySource::Basic { .. } => "basic",
        }
    }
}

/// What the endpoint should answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// 304, the client's cached decision still holds
    NotModified,
    /// One of the configurable status/message replies
    Reply(ReplyKind),
}

/// A finished decision, independent of the HTTP layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    pub outcome: Outcome,
    /// Absent on the missing-input early exits
    pub tag: Option<CacheTag>,
    /// Zero keeps `Cache-Control: no-store`
    pub max_age: u32,
    /// `WWW-Authenticate` value for unauthenticated Basic requests
    pub challenge: Option<HeaderValue>,
}

/// Identity and optional credential pulled from the request
struct Requester {
    identity: String,
    credential: Option<String>,
}

/// Per-request authorization engine
pub struct DecisionEngine {
    path_header: HeaderName,
    identity: IdentitySource,
    classifier: PathClassifier,
    mode: AuthzMode,
    tagger: CacheTagger,
    serializer: AuthSerializer,
    responses: ResponseTable,
    use_etag: bool,
    cache_seconds: u32,
    neg_cache_seconds: u32,
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("path_header", &self.path_header)
            .field("identity", &self.identity.name())
            .field("classifier", &self.classifier)
            .field("mode", &self.mode)
            .field("use_etag", &self.use_etag)
            .field("cache_seconds", &self.cache_seconds)
            .field("neg_cache_seconds", &self.neg_cache_seconds)
            .finish_non_exhaustive()
    }
}

impl DecisionEngine {
    pub fn builder(identity: IdentitySource) -> EngineBuilder {
        EngineBuilder::new(identity)
    }

    pub fn responses(&self) -> &ResponseTable {
        &self.responses
    }

    /// Decide one request.
    ///
    /// `client` is only used in log lines.
    pub async fn decide(&self, headers: &HeaderMap, client: &str) -> Decision {
        let Some(path) = header_str(headers, &self.path_header) else {
            warn!(header = %self.path_header, client_ip = %client, "request without path header");
            return self.early_exit(ReplyKind::NoPath);
        };

        let requester = match self.requester(headers) {
            Ok(requester) => requester,
            Err(ReplyKind::Unauth) if !headers.contains_key(AUTHORIZATION) => {
                info!(path = %path, client_ip = %client, "request without credentials, sending challenge");
                return self.early_exit(ReplyKind::Unauth);
            }
            Err(kind) => {
                warn!(path = %path, client_ip = %client, kind = ?kind, "request without identity");
                return self.early_exit(kind);
            }
        };

        let class = self.classifier.classify(path);
        let tag = self
            .tagger
            .make_tag(&requester.identity, requester.credential.as_deref(), &class);

        if self.use_etag {
            if let Some(if_none_match) = header_str(headers, IF_NONE_MATCH_HEADER) {
                if tag.matches(if_none_match) {
                    debug!(user = %requester.identity, path = %path, client_ip = %client, "cache tag matched");
                    return Decision {
                        outcome: Outcome::NotModified,
                        tag: Some(tag),
                        max_age: self.neg_cache_seconds,
                        challenge: None,
                    };
                }
            }
        }

        let kind = self.authorize(&requester, &class, path, client).await;
        self.finish(kind, tag)
    }

    fn requester(&self, headers: &HeaderMap) -> std::result::Result<Requester, ReplyKind> {
        match &self.identity {
            IdentitySource::Header { header } => header_str(headers, header)
                .map(|user| Requester {
                    identity: user.to_string(),
                    credential: None,
                })
                .ok_or(ReplyKind::NoUser),
            IdentitySource::Basic { .. } => BasicCredentials::from_headers(headers)
                .map(|creds| Requester {
                    identity: creds.user,
                    credential: Some(creds.password),
                })
                .ok_or(ReplyKind::Unauth),
        }
    }

    async fn authorize(
        &self,
        requester: &Requester,
        class: &Classification,
        path: &str,
        client: &str,
    ) -> ReplyKind {
        let user = requester.identity.as_str();

        let IdentitySource::Basic { authenticator, .. } = &self.identity else {
            // Identity from the proxy is already authenticated
            return self.check_right(user, class, path, client);
        };

        let filter_decision = match &self.mode {
            AuthzMode::DirectoryFilter(policy) => Some(policy.resolve(class)),
            _ => None,
        };
        let attempt = AuthAttempt::new(user, requester.credential.as_deref().unwrap_or(""), client)
            .with_authz_filter(filter_decision.and_then(|d| d.search_filter()));

        let verdict = self
            .serializer
            .run(user, authenticator.authenticate(&attempt))
            .await;

        let verdict = match verdict {
            Ok(verdict) => verdict,
            Err(failure) => {
                // Already logged in full by the authenticator
                debug!(user = %user, client_ip = %client, error = %failure, "authentication aborted");
                return if failure.authenticated {
                    ReplyKind::Forbidden
                } else {
                    ReplyKind::Unauth
                };
            }
        };

        if !verdict.is_authenticated() {
            return ReplyKind::Unauth;
        }

        match &self.mode {
            AuthzMode::Open => ReplyKind::Ok,
            AuthzMode::RightLabel { .. } => self.check_right(user, class, path, client),
            AuthzMode::DirectoryFilter(_) => {
                let permitted = filter_decision.is_some_and(|d| d.permitted);
                if !permitted {
                    warn!(user = %user, path = %path, client_ip = %client, "path class is banned");
                    ReplyKind::Forbidden
                } else if verdict.is_authorized() {
                    ReplyKind::Ok
                } else {
                    ReplyKind::Forbidden
                }
            }
        }
    }

    fn check_right(&self, user: &str, class: &Classification, path: &str, client: &str) -> ReplyKind {
        let AuthzMode::RightLabel { policy, rights } = &self.mode else {
            // Header identities are only ever paired with right labels
            return ReplyKind::Forbidden;
        };

        let label = policy.resolve(class);
        if rights.check_right(label, user) {
            info!(user = %user, right = %label, path = %path, client_ip = %client, "right granted");
            ReplyKind::Ok
        } else {
            warn!(user = %user, right = %label, path = %path, client_ip = %client, "right denied");
            ReplyKind::Forbidden
        }
    }

    fn early_exit(&self, kind: ReplyKind) -> Decision {
        Decision {
            outcome: Outcome::Reply(kind),
            tag: None,
            max_age: self.neg_cache_seconds,
            challenge: self.challenge_for(kind),
        }
    }

    fn finish(&self, kind: ReplyKind, tag: CacheTag) -> Decision {
        let max_age = if kind == ReplyKind::Ok {
            self.cache_seconds
        } else {
            self.neg_cache_seconds
        };
        Decision {
            outcome: Outcome::Reply(kind),
            tag: Some(tag),
            max_age,
            challenge: self.challenge_for(kind),
        }
    }

    fn challenge_for(&self, kind: ReplyKind) -> Option<HeaderValue> {
        match (&self.identity, kind) {
            (IdentitySource::Basic { challenge, .. }, ReplyKind::Unauth) => Some(challenge.clone()),
            _ => None,
        }
    }
}

/// Header value as UTF-8; `HeaderValue::to_str` would refuse non-ASCII
/// identities such as `jörg`
fn header_str<'a>(headers: &'a HeaderMap, name: impl axum::http::header::AsHeaderName) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| std::str::from_utf8(v.as_bytes()).ok())
        .filter(|v| !v.is_empty())
}

/// Assembles a `DecisionEngine`, checking that the parts fit together
pub struct EngineBuilder {
    identity: IdentitySource,
    path_header: HeaderName,
    classifier: PathClassifier,
    mode: AuthzMode,
    tagger: Option<CacheTagger>,
    serialize: bool,
    responses: ResponseTable,
    use_etag: bool,
    cache_seconds: u32,
    neg_cache_seconds: u32,
}

impl EngineBuilder {
    pub fn new(identity: IdentitySource) -> Self {
        Self {
            identity,
            path_header: HeaderName::from_static("x-authz-path"),
            classifier: PathClassifier::default(),
            mode: AuthzMode::Open,
            tagger: None,
            serialize: false,
            responses: ResponseTable::default(),
            use_etag: true,
            cache_seconds: 0,
            neg_cache_seconds: 0,
        }
    }

    pub fn path_header(mut self, name: &str) -> Result<Self> {
        self.path_header = parse_header_name("path_header", name)?;
        Ok(self)
    }

    pub fn classifier(mut self, classifier: PathClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    pub fn mode(mut self, mode: AuthzMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn tagger(mut self, tagger: CacheTagger) -> Self {
        self.tagger = Some(tagger);
        self
    }

    pub fn serialize(mut self, enabled: bool) -> Self {
        self.serialize = enabled;
        self
    }

    pub fn responses(mut self, responses: ResponseTable) -> Self {
        self.responses = responses;
        self
    }

    pub fn use_etag(mut self, enabled: bool) -> Self {
        self.use_etag = enabled;
        self
    }

    pub fn cache_seconds(mut self, positive: u32, negative: u32) -> Self {
        self.cache_seconds = positive;
        self.neg_cache_seconds = negative;
        self
    }

    pub fn build(self) -> Result<DecisionEngine> {
        match (&self.identity, &self.mode) {
            (IdentitySource::Header { .. }, AuthzMode::RightLabel { .. }) => {}
            (IdentitySource::Header { .. }, mode) => {
                return Err(Error::configuration(format!(
                    "header identities need right labels, not '{}'",
                    mode.name()
                )));
            }
            (IdentitySource::Basic { .. }, _) => {}
        }

        let tagger = match self.tagger {
            Some(tagger) => tagger,
            None => CacheTagger::new()?,
        };

        Ok(DecisionEngine {
            path_header: self.path_header,
            identity: self.identity,
            classifier: self.classifier,
            mode: self.mode,
            tagger,
            serializer: AuthSerializer::new(self.serialize),
            responses: self.responses,
            use_etag: self.use_etag,
            cache_seconds: self.cache_seconds,
            neg_cache_seconds: self.neg_cache_seconds,
        })
    }
}

pub(crate) fn parse_header_name(key: &str, name: &str) -> Result<HeaderName> {
    let name = if name.is_empty() { DEFAULT_PATH_HEADER } else { name };
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| Error::configuration(format!("{key} '{name}' is not a valid header name: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use authgate_authz::{DirectoryFilterPolicy, RightLabelPolicy, RightsTable};
    use authgate_config::FilterSection;
    use authgate_core::{AuthFailure, Verdict};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Records every attempt and answers with a fixed result
    struct Recorder {
        calls: AtomicUsize,
        filters: Mutex<Vec<Option<String>>>,
        answer: fn() -> std::result::Result<Verdict, AuthFailure>,
    }

    impl Recorder {
        fn new(answer: fn() -> std::result::Result<Verdict, AuthFailure>) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                filters: Mutex::new(Vec::new()),
                answer,
            })
        }
    }

    #[async_trait]
    impl Authenticator for Recorder {
        async fn authenticate(&self, attempt: &AuthAttempt<'_>) -> std::result::Result<Verdict, AuthFailure> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.filters
                .lock()
                .unwrap()
                .push(attempt.authz_filter.map(str::to_string));
            (self.answer)()
        }
    }

    fn tagger() -> CacheTagger {
        CacheTagger::with_key(&[1u8; 32], 42).unwrap()
    }

    fn basic_headers(path: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        if let Some(path) = path {
            headers.insert("x-authz-path", HeaderValue::from_str(path).unwrap());
        }
        // alice:secret
        headers.insert("authorization", HeaderValue::from_static("Basic YWxpY2U6c2VjcmV0"));
        headers
    }

    fn filter_engine(recorder: Arc<Recorder>, ban_nomatch: bool, ban_default: bool) -> DecisionEngine {
        let section = FilterSection {
            path_pattern: "^/([^/]+)/".into(),
            ban_nomatch,
            nomatch_filter: "(nomatch=%s)".into(),
            ban_default,
            default_filter: "(staff=%s)".into(),
            path_filter: HashMap::from([("admin".to_string(), "(admin=%s)".to_string())]),
        };
        DecisionEngine::builder(IdentitySource::basic(recorder, "Staff \"only\"").unwrap())
            .classifier(PathClassifier::new(Some("^/([^/]+)/")).unwrap())
            .mode(AuthzMode::DirectoryFilter(DirectoryFilterPolicy::from_section(&section)))
            .tagger(tagger())
            .cache_seconds(60, 5)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_missing_path_is_early_exit() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, false);

        let decision = engine.decide(&basic_headers(None), "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::NoPath));
        assert!(decision.tag.is_none());
        assert_eq!(decision.max_age, 5);
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_basic_credentials_challenges() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, false);

        let mut headers = HeaderMap::new();
        headers.insert("x-authz-path", HeaderValue::from_static("/docs/1"));
        let decision = engine.decide(&headers, "-").await;

        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Unauth));
        assert_eq!(
            decision.challenge.unwrap(),
            HeaderValue::from_static("Basic realm=\"Staff \\\"only\\\"\"")
        );
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_filter_resolution_reaches_authenticator() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, false);

        let ok = engine.decide(&basic_headers(Some("/admin/x")), "-").await;
        assert_eq!(ok.outcome, Outcome::Reply(ReplyKind::Ok));
        assert_eq!(ok.max_age, 60);

        engine.decide(&basic_headers(Some("/docs/x")), "-").await;
        engine.decide(&basic_headers(Some("nomatch")), "-").await;

        let filters = recorder.filters.lock().unwrap().clone();
        assert_eq!(
            filters,
            vec![
                Some("(admin=%s)".to_string()),
                Some("(staff=%s)".to_string()),
                Some("(nomatch=%s)".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_banned_default_denies_valid_credentials() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, true);

        let decision = engine.decide(&basic_headers(Some("/docs/x")), "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Forbidden));
        assert_eq!(decision.max_age, 5);
        // Identity still checked, but without an authorization search
        assert_eq!(recorder.filters.lock().unwrap().as_slice(), &[None]);
    }

    #[tokio::test]
    async fn test_authenticated_without_match_is_forbidden() {
        let recorder = Recorder::new(|| Ok(Verdict::Authenticated));
        let engine = filter_engine(recorder, false, false);
        let decision = engine.decide(&basic_headers(Some("/docs/x")), "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Forbidden));
    }

    #[tokio::test]
    async fn test_failures_map_by_bind_state() {
        let before = Recorder::new(|| Err(AuthFailure::before_bind(Error::network("ldap://x", "refused"))));
        let decision = filter_engine(before, false, false)
            .decide(&basic_headers(Some("/docs/x")), "-")
            .await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Unauth));
        assert!(decision.challenge.is_some());

        let after = Recorder::new(|| Err(AuthFailure::after_bind(Error::network("ldap://x", "reset"))));
        let decision = filter_engine(after, false, false)
            .decide(&basic_headers(Some("/docs/x")), "-")
            .await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Forbidden));
        assert!(decision.challenge.is_none());
    }

    #[tokio::test]
    async fn test_matching_tag_skips_authentication() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, false);

        let first = engine.decide(&basic_headers(Some("/admin/x")), "-").await;
        let tag = first.tag.unwrap();

        let mut headers = basic_headers(Some("/admin/y"));
        headers.insert("if-none-match", HeaderValue::from_str(tag.as_str()).unwrap());
        let second = engine.decide(&headers, "-").await;

        assert_eq!(second.outcome, Outcome::NotModified);
        assert_eq!(second.tag, Some(tag));
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_tag_ignored_when_disabled() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = DecisionEngine::builder(IdentitySource::basic(recorder.clone(), "r").unwrap())
            .tagger(tagger())
            .use_etag(false)
            .build()
            .unwrap();

        let first = engine.decide(&basic_headers(Some("/a")), "-").await;
        let mut headers = basic_headers(Some("/a"));
        headers.insert(
            "if-none-match",
            HeaderValue::from_str(first.tag.unwrap().as_str()).unwrap(),
        );
        let second = engine.decide(&headers, "-").await;

        assert_eq!(second.outcome, Outcome::Reply(ReplyKind::Ok));
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_header_identity_requires_right_labels() {
        let source = IdentitySource::Header {
            header: HeaderName::from_static("x-forwarded-user"),
        };
        assert!(DecisionEngine::builder(source.clone()).build().is_err());

        let rights = RightsTable::from_entries([("reader", vec!["alice"])]).unwrap();
        let mode = AuthzMode::RightLabel {
            policy: RightLabelPolicy::new("none", "reader", HashMap::new()),
            rights: Arc::new(rights),
        };
        assert!(DecisionEngine::builder(source).mode(mode).tagger(tagger()).build().is_ok());
    }

    #[test]
    fn test_realm_with_control_character_rejected() {
        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        assert!(IdentitySource::basic(recorder, "bad\nrealm").is_err());
    }

    /// Log output captured by a test subscriber
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    /// Subscriber that keeps warn and above, like the `minimum` level
    fn warn_subscriber(captured: &Captured) -> impl tracing::Subscriber + Send + Sync {
        let writer = captured.clone();
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish()
    }

    fn header_engine(grants: &[(&str, &str)]) -> DecisionEngine {
        let rights = RightsTable::from_entries(
            grants.iter().map(|(label, user)| (*label, vec![*user])),
        )
        .unwrap();
        DecisionEngine::builder(IdentitySource::Header {
            header: HeaderName::from_static("x-forwarded-user"),
        })
        .mode(AuthzMode::RightLabel {
            policy: RightLabelPolicy::new("reader", "reader", HashMap::new()),
            rights: Arc::new(rights),
        })
        .tagger(tagger())
        .build()
        .unwrap()
    }

    #[tokio::test]
    async fn test_missing_identity_header_logged_at_warn() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(warn_subscriber(&captured));

        let engine = header_engine(&[("reader", "alice")]);
        let mut headers = HeaderMap::new();
        headers.insert("x-authz-path", HeaderValue::from_static("/docs/1"));
        let decision = engine.decide(&headers, "192.0.2.7").await;

        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::NoUser));
        let logs = captured.text();
        assert!(logs.contains("WARN"), "{logs}");
        assert!(logs.contains("request without identity"), "{logs}");
        assert!(logs.contains("192.0.2.7"), "{logs}");
    }

    #[tokio::test]
    async fn test_malformed_credentials_logged_at_warn() {
        let captured = Captured::default();
        let _guard = tracing::subscriber::set_default(warn_subscriber(&captured));

        let recorder = Recorder::new(|| Ok(Verdict::Authorized));
        let engine = filter_engine(recorder.clone(), false, false);

        // No credentials at all: plain challenge, below warn
        let mut headers = HeaderMap::new();
        headers.insert("x-authz-path", HeaderValue::from_static("/docs/1"));
        engine.decide(&headers, "-").await;
        assert!(captured.text().is_empty(), "{}", captured.text());

        headers.insert("authorization", HeaderValue::from_static("Basic !!!"));
        let decision = engine.decide(&headers, "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Unauth));
        assert!(captured.text().contains("request without identity"));
        assert_eq!(recorder.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_utf8_identity_header_is_accepted() {
        let engine = header_engine(&[("reader", "jörg")]);

        let mut headers = HeaderMap::new();
        headers.insert("x-authz-path", HeaderValue::from_static("/docs/1"));
        headers.insert(
            "x-forwarded-user",
            HeaderValue::from_bytes("jörg".as_bytes()).unwrap(),
        );
        let decision = engine.decide(&headers, "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::Ok));
        assert!(decision.tag.is_some());

        // Bytes that are not UTF-8 still count as a missing identity
        headers.insert("x-forwarded-user", HeaderValue::from_bytes(&[0xff, 0xfe]).unwrap());
        let decision = engine.decide(&headers, "-").await;
        assert_eq!(decision.outcome, Outcome::Reply(ReplyKind::NoUser));
    }
}
