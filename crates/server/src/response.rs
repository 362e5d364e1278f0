use crate::orchestrator::{Decision, Outcome};
use authgate_config::ResponseTable;
use authgate_core::{CACHE_CONTROL_NO_STORE, CONTENT_TYPE_TEXT};
use axum::body::Body;
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE, ETAG, WWW_AUTHENTICATE, X_CONTENT_TYPE_OPTIONS};
use axum::http::{HeaderValue, StatusCode};
use axum::response::Response;

/// Turn a decision into the HTTP answer for the proxy
pub fn render(decision: &Decision, responses: &ResponseTable) -> Response {
    let (status, body) = match decision.outcome {
        Outcome::NotModified => (StatusCode::NOT_MODIFIED, Body::empty()),
        Outcome::Reply(kind) => {
            let reply = responses.get(kind);
            // Codes are range-checked at load; anything else fails closed
            let status = StatusCode::from_u16(reply.code).unwrap_or(StatusCode::FORBIDDEN);
            (status, Body::from(format!("{}\n", reply.message)))
        }
    };

    let mut response = Response::new(body);
    *response.status_mut() = status;

    let headers = response.headers_mut();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(CONTENT_TYPE_TEXT));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(CACHE_CONTROL, cache_control(decision.max_age));

    if let Some(tag) = decision.tag.as_ref().and_then(|t| HeaderValue::from_str(t.as_str()).ok()) {
        headers.insert(ETAG, tag);
    }
    if let Some(challenge) = &decision.challenge {
        headers.insert(WWW_AUTHENTICATE, challenge.clone());
    }

    response
}

fn cache_control(max_age: u32) -> HeaderValue {
    if max_age == 0 {
        return HeaderValue::from_static(CACHE_CONTROL_NO_STORE);
    }
    HeaderValue::from_str(&format!("max-age={max_age}, must-revalidate"))
        .unwrap_or_else(|_| HeaderValue::from_static(CACHE_CONTROL_NO_STORE))
}
