//! Per-request gate applied before any handler: client-agent screening,
//! fixed-window rate limiting, and response header injection.

pub mod botfilter;
pub mod headers;
pub mod ratelimit;

pub use ratelimit::FixedWindowLimiter;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, warn};

use botfilter::is_blocked_agent;
use headers::apply_response_headers;
use ratelimit::ANONYMOUS_CLIENT;

/// Path prefixes the gate does not apply to.
pub const EXCLUDED_PREFIXES: [&str; 6] = [
    "/api",
    "/static",
    "/favicon.ico",
    "/public",
    "/ads",
    "/tracking",
];

/// Gate state, injected rather than global so tests and deployments own the
/// window explicitly.
#[derive(Clone)]
pub struct GateState {
    pub limiter: Arc<FixedWindowLimiter>,
}

impl GateState {
    pub fn new(limiter: Arc<FixedWindowLimiter>) -> Self {
        Self { limiter }
    }
}

pub fn is_excluded_path(path: &str) -> bool {
    EXCLUDED_PREFIXES
        .iter()
        .any(|prefix| path.starts_with(prefix))
}

/// Derive the rate-limit bucket for a request: first forwarded hop, else the
/// socket peer, else the shared anonymous bucket.
fn client_identifier(request: &Request) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        && let Some(first) = forwarded.split(',').next()
    {
        let first = first.trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

/// The gate middleware. Ordering matters: agent screening first (403), then
/// the rate window (429), then the wrapped handler, then header injection.
pub async fn request_gate(
    State(gate): State<GateState>,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();
    if is_excluded_path(&path) {
        return next.run(request).await;
    }

    let user_agent = request
        .headers()
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if is_blocked_agent(user_agent) {
        warn!(path = %path, user_agent = %user_agent, "blocked client agent");
        return (StatusCode::FORBIDDEN, "Not allowed").into_response();
    }

    let client = client_identifier(&request);
    let now_ms = Utc::now().timestamp_millis();

    if !gate.limiter.check_and_record(&client, now_ms) {
        warn!(path = %path, client = %client, "rate limit exceeded");
        return (StatusCode::TOO_MANY_REQUESTS, "Too Many Requests").into_response();
    }

    debug!(path = %path, client = %client, "request admitted");

    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut response = next.run(request).await;
    apply_response_headers(response.headers_mut(), origin.as_deref());
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excluded_prefixes_bypass_the_gate() {
        assert!(is_excluded_path("/api/leads"));
        assert!(is_excluded_path("/favicon.ico"));
        assert!(is_excluded_path("/tracking/pixel.gif"));
        assert!(!is_excluded_path("/claim/execute"));
        assert!(!is_excluded_path("/"));
    }
}
