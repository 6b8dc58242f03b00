use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    middleware::from_fn_with_state,
    routing::get,
};
use std::sync::Arc;
use tower::ServiceExt;

use claims_service::gate::{FixedWindowLimiter, GateState, request_gate};

fn test_app(limiter: Arc<FixedWindowLimiter>) -> Router {
    Router::new()
        .route("/", get(|| async { "home" }))
        .route("/api/leads", get(|| async { "api" }))
        .layer(from_fn_with_state(GateState::new(limiter), request_gate))
}

fn request(path: &str, user_agent: &str) -> Request<Body> {
    Request::builder()
        .uri(path)
        .header(header::USER_AGENT, user_agent)
        .header("x-forwarded-for", "203.0.113.7")
        .body(Body::empty())
        .unwrap()
}

const BROWSER_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

#[tokio::test]
async fn spider_agent_is_rejected_with_403() {
    let app = test_app(Arc::new(FixedWindowLimiter::default()));

    let response = app
        .oneshot(request("/", "Sogou web spider/4.0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn googlebot_is_admitted_despite_bot_substring() {
    let app = test_app(Arc::new(FixedWindowLimiter::default()));

    let response = app
        .oneshot(request(
            "/",
            "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn admitted_response_carries_security_and_cache_headers() {
    let app = test_app(Arc::new(FixedWindowLimiter::default()));

    let response = app.oneshot(request("/", BROWSER_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let headers = response.headers();
    assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
    assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
    assert_eq!(
        headers.get(header::CACHE_CONTROL).unwrap(),
        "no-cache, no-store, must-revalidate"
    );
    assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
}

#[tokio::test]
async fn trusted_origin_gets_cors_headers() {
    let app = test_app(Arc::new(FixedWindowLimiter::default()));

    let mut req = request("/", BROWSER_UA);
    req.headers_mut().insert(
        header::ORIGIN,
        "https://www.googletagmanager.com".parse().unwrap(),
    );

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .unwrap(),
        "https://www.googletagmanager.com"
    );
    assert_eq!(
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
            .unwrap(),
        "true"
    );
}

#[tokio::test]
async fn request_over_the_ceiling_gets_429() {
    let app = test_app(Arc::new(FixedWindowLimiter::new(60_000, 2)));

    for _ in 0..2 {
        let response = app.clone().oneshot(request("/", BROWSER_UA)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.oneshot(request("/", BROWSER_UA)).await.unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn excluded_paths_bypass_the_gate() {
    // Ceiling of zero rejects everything the gate sees.
    let app = test_app(Arc::new(FixedWindowLimiter::new(60_000, 0)));

    let response = app
        .clone()
        .oneshot(request("/", BROWSER_UA))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let response = app
        .oneshot(request("/api/leads", "Sogou web spider/4.0"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
