//! End-to-end tests for the decision endpoint.
//!
//! Requests go through the axum router with stub authenticators and rights
//! tables, so every call the engine makes can be counted.

use async_trait::async_trait;
use authgate_authz::{
    AuthzMode, CacheTagger, DirectoryFilterPolicy, PathClassifier, RightLabelPolicy, UserRights,
};
use authgate_config::FilterSection;
use authgate_core::{AuthAttempt, AuthFailure, Authenticator, Verdict};
use authgate_server::{router, DecisionEngine, IdentitySource};
use axum::body::{to_bytes, Body};
use axum::http::{HeaderName, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tower::ServiceExt;

/// Rights table that counts lookups
#[derive(Default)]
struct CountingRights {
    grants: HashMap<String, HashSet<String>>,
    lookups: AtomicUsize,
}

impl CountingRights {
    fn grant(label: &str, users: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            grants: HashMap::from([(
                label.to_string(),
                users.iter().map(|u| u.to_string()).collect(),
            )]),
            lookups: AtomicUsize::new(0),
        })
    }
}

impl UserRights for CountingRights {
    fn check_right(&self, label: &str, identity: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match label {
            "any" => true,
            "none" => false,
            _ => self.grants.get(label).is_some_and(|users| users.contains(identity)),
        }
    }

    fn validate_label(&self, label: &str) -> bool {
        matches!(label, "any" | "none") || self.grants.contains_key(label)
    }
}

/// Directory stand-in: accepts one password, records filters, tracks overlap
struct StubDirectory {
    password: &'static str,
    delay: Duration,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    filters: Mutex<Vec<Option<String>>>,
}

impl StubDirectory {
    fn new(password: &'static str) -> Arc<Self> {
        Self::slow(password, Duration::ZERO)
    }

    fn slow(password: &'static str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            password,
            delay,
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            filters: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl Authenticator for StubDirectory {
    async fn authenticate(&self, attempt: &AuthAttempt<'_>) -> Result<Verdict, AuthFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.filters
            .lock()
            .unwrap()
            .push(attempt.authz_filter.map(str::to_string));

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if attempt.credential != self.password {
            return Ok(Verdict::Unauthenticated);
        }
        Ok(match attempt.authz_filter {
            Some(_) => Verdict::Authorized,
            None => Verdict::Authenticated,
        })
    }
}

fn tagger() -> CacheTagger {
    CacheTagger::with_key(&[3u8; 32], 1_700_000_000_000).unwrap()
}

fn header_engine(rights: Arc<CountingRights>) -> Router {
    let engine = DecisionEngine::builder(IdentitySource::Header {
        header: HeaderName::from_static("x-forwarded-user"),
    })
    .classifier(PathClassifier::new(Some(r"^/docs/(\d+)")).unwrap())
    .mode(AuthzMode::RightLabel {
        policy: RightLabelPolicy::new(
            "none",
            "none",
            HashMap::from([("42".to_string(), "reader".to_string())]),
        ),
        rights,
    })
    .tagger(tagger())
    .cache_seconds(300, 10)
    .build()
    .unwrap();
    router(Arc::new(engine))
}

fn filter_engine(directory: Arc<StubDirectory>, serialize: bool) -> Router {
    let section = FilterSection {
        path_pattern: r"^/team/([a-z]+)/".into(),
        ban_nomatch: true,
        nomatch_filter: String::new(),
        ban_default: false,
        default_filter: "(memberOf=cn=staff)".into(),
        path_filter: HashMap::from([("ops".to_string(), "(memberOf=cn=ops)".to_string())]),
    };
    let engine = DecisionEngine::builder(IdentitySource::basic(directory, "Team").unwrap())
        .classifier(PathClassifier::new(Some(&section.path_pattern)).unwrap())
        .mode(AuthzMode::DirectoryFilter(DirectoryFilterPolicy::from_section(&section)))
        .tagger(tagger())
        .serialize(serialize)
        .cache_seconds(60, 0)
        .build()
        .unwrap();
    router(Arc::new(engine))
}

fn request(headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder().uri("/auth");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> Response {
    app.clone().oneshot(req).await.unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

// alice:correct horse
const ALICE_GOOD: &str = "Basic YWxpY2U6Y29ycmVjdCBob3JzZQ==";
// alice:wrong
const ALICE_BAD: &str = "Basic YWxpY2U6d3Jvbmc=";

#[tokio::test]
async fn granted_right_returns_ok_with_tag() {
    let rights = CountingRights::grant("reader", &["alice"]);
    let app = header_engine(rights.clone());

    let response = send(
        &app,
        request(&[("x-authz-path", "/docs/42"), ("x-forwarded-user", "alice")]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("etag"));
    assert_eq!(response.headers()["cache-control"], "max-age=300, must-revalidate");
    assert_eq!(response.headers()["content-type"], "text/plain; charset=utf-8");
    assert_eq!(body_text(response).await, "Authorized\n");
    assert_eq!(rights.lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn replayed_tag_short_circuits() {
    let rights = CountingRights::grant("reader", &["alice"]);
    let app = header_engine(rights.clone());
    let headers = [("x-authz-path", "/docs/42"), ("x-forwarded-user", "alice")];

    let first = send(&app, request(&headers)).await;
    let tag = first.headers()["etag"].to_str().unwrap().to_string();

    let replay = send(
        &app,
        request(&[headers[0], headers[1], ("if-none-match", tag.as_str())]),
    )
    .await;

    assert_eq!(replay.status(), StatusCode::NOT_MODIFIED);
    assert_eq!(replay.headers()["etag"], tag.as_str());
    assert_eq!(rights.lookups.load(Ordering::SeqCst), 1);

    // Another identity cannot reuse alice's tag
    let other = send(
        &app,
        request(&[headers[0], ("x-forwarded-user", "mallory"), ("if-none-match", tag.as_str())]),
    )
    .await;
    assert_eq!(other.status(), StatusCode::FORBIDDEN);
    assert_eq!(rights.lookups.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn missing_user_header_is_rejected_without_tag() {
    let rights = CountingRights::grant("reader", &["alice"]);
    let app = header_engine(rights.clone());

    let response = send(&app, request(&[("x-authz-path", "/docs/42")])).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(!response.headers().contains_key("etag"));
    assert_eq!(response.headers()["cache-control"], "max-age=10, must-revalidate");
    assert_eq!(body_text(response).await, "No user header\n");
    assert_eq!(rights.lookups.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_path_header_is_rejected() {
    let app = header_engine(CountingRights::grant("reader", &["alice"]));
    let response = send(&app, request(&[("x-forwarded-user", "alice")])).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_text(response).await, "No path header\n");
}

#[tokio::test]
async fn banned_unmatched_path_denies_valid_credentials() {
    let directory = StubDirectory::new("correct horse");
    let app = filter_engine(directory.clone(), false);

    let response = send(
        &app,
        request(&[("x-authz-path", "/elsewhere"), ("authorization", ALICE_GOOD)]),
    )
    .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(response.headers()["cache-control"], "no-store");
    assert!(!response.headers().contains_key("www-authenticate"));
    assert_eq!(directory.filters.lock().unwrap().as_slice(), &[None]);
}

#[tokio::test]
async fn filter_paths_and_bad_password() {
    let directory = StubDirectory::new("correct horse");
    let app = filter_engine(directory.clone(), false);

    let ops = send(
        &app,
        request(&[("x-authz-path", "/team/ops/runbook"), ("authorization", ALICE_GOOD)]),
    )
    .await;
    assert_eq!(ops.status(), StatusCode::OK);

    let bad = send(
        &app,
        request(&[("x-authz-path", "/team/ops/runbook"), ("authorization", ALICE_BAD)]),
    )
    .await;
    assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(bad.headers()["www-authenticate"], "Basic realm=\"Team\"");

    let anonymous = send(&app, request(&[("x-authz-path", "/team/ops/runbook")])).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    assert!(!anonymous.headers().contains_key("etag"));

    assert_eq!(
        directory.filters.lock().unwrap().as_slice(),
        &[
            Some("(memberOf=cn=ops)".to_string()),
            Some("(memberOf=cn=ops)".to_string()),
        ]
    );
}

#[tokio::test]
async fn same_identity_attempts_are_serialized() {
    let directory = StubDirectory::slow("correct horse", Duration::from_millis(20));
    let app = filter_engine(directory.clone(), true);

    let requests = (0..4).map(|_| {
        send(
            &app,
            request(&[("x-authz-path", "/team/ops/x"), ("authorization", ALICE_GOOD)]),
        )
    });
    for response in join_all(requests).await {
        assert_eq!(response.status(), StatusCode::OK);
    }

    assert_eq!(directory.calls.load(Ordering::SeqCst), 4);
    assert_eq!(directory.peak.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unserialized_attempts_overlap() {
    let directory = StubDirectory::slow("correct horse", Duration::from_millis(20));
    let app = filter_engine(directory.clone(), false);

    let requests = (0..4).map(|_| {
        send(
            &app,
            request(&[("x-authz-path", "/team/ops/x"), ("authorization", ALICE_GOOD)]),
        )
    });
    join_all(requests).await;

    assert!(directory.peak.load(Ordering::SeqCst) > 1);
}
