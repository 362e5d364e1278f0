use crate::client::client_address;
use crate::orchestrator::DecisionEngine;
use crate::response::render;
use axum::extract::{ConnectInfo, Request, State};
use axum::response::Response;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;

/// Every path and method goes to the decision handler
pub fn router(engine: Arc<DecisionEngine>) -> Router {
    Router::new().fallback(authorize).with_state(engine)
}

async fn authorize(State(engine): State<Arc<DecisionEngine>>, request: Request) -> Response {
    // Only present for TCP listeners
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client = client_address(request.headers(), peer);

    let decision = engine.decide(request.headers(), &client).await;
    render(&decision, engine.responses())
}
