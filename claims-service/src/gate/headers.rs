//! Response header injection for admitted requests: security headers, cache
//! suppression, and origin-reflecting CORS for trusted ad/analytics domains.

use axum::http::{HeaderMap, HeaderValue, header};

/// Ad and analytics origins granted credentialed CORS access.
pub const TRUSTED_AD_DOMAINS: [&str; 7] = [
    "facebook.com",
    "facebook.net",
    "google.com",
    "google-analytics.com",
    "googletagmanager.com",
    "tiktok.com",
    "tiktokcdn.com",
];

pub fn is_trusted_origin(origin: &str) -> bool {
    TRUSTED_AD_DOMAINS.iter().any(|domain| origin.contains(domain))
}

pub fn apply_response_headers(headers: &mut HeaderMap, origin: Option<&str>) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(
        header::X_FRAME_OPTIONS,
        HeaderValue::from_static("SAMEORIGIN"),
    );
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );

    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-cache, no-store, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));

    if let Some(origin) = origin
        && is_trusted_origin(origin)
        && let Ok(origin_value) = HeaderValue::from_str(origin)
    {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin_value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization, X-Requested-With"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(
            header::ACCESS_CONTROL_MAX_AGE,
            HeaderValue::from_static("86400"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn security_and_cache_headers_are_always_set() {
        let mut headers = HeaderMap::new();
        apply_response_headers(&mut headers, None);

        assert_eq!(headers.get(header::X_CONTENT_TYPE_OPTIONS).unwrap(), "nosniff");
        assert_eq!(headers.get(header::X_FRAME_OPTIONS).unwrap(), "SAMEORIGIN");
        assert_eq!(
            headers.get(header::CACHE_CONTROL).unwrap(),
            "no-cache, no-store, must-revalidate"
        );
        assert_eq!(headers.get(header::EXPIRES).unwrap(), "0");
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[test]
    fn trusted_origin_gets_credentialed_cors() {
        let mut headers = HeaderMap::new();
        apply_response_headers(&mut headers, Some("https://www.facebook.com"));

        assert_eq!(
            headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "https://www.facebook.com"
        );
        assert_eq!(
            headers
                .get(header::ACCESS_CONTROL_ALLOW_CREDENTIALS)
                .unwrap(),
            "true"
        );
        assert_eq!(headers.get(header::ACCESS_CONTROL_MAX_AGE).unwrap(), "86400");
    }

    #[test]
    fn unknown_origin_gets_no_cors() {
        let mut headers = HeaderMap::new();
        apply_response_headers(&mut headers, Some("https://evil.example.com"));

        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }
}
