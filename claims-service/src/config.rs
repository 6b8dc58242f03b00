use crate::gate::ratelimit::{DEFAULT_MAX_REQUESTS, DEFAULT_WINDOW_MS};

/// Service configuration, read from the environment at startup.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind_addr: String,
    /// Backend claim-submission endpoint. When unset, the simulated client
    /// stands in and the processing step keeps its five-second latency.
    pub submit_url: Option<String>,
    pub rate_window_ms: i64,
    pub rate_max_requests: usize,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            submit_url: std::env::var("SUBMIT_URL").ok(),
            rate_window_ms: env_parsed("RATE_LIMIT_WINDOW_MS", DEFAULT_WINDOW_MS),
            rate_max_requests: env_parsed("RATE_LIMIT_MAX_REQUESTS", DEFAULT_MAX_REQUESTS),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:3000".to_string(),
            submit_url: None,
            rate_window_ms: DEFAULT_WINDOW_MS,
            rate_max_requests: DEFAULT_MAX_REQUESTS,
        }
    }
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_gate_constants() {
        let config = ServiceConfig::default();
        assert_eq!(config.rate_window_ms, 60_000);
        assert_eq!(config.rate_max_requests, 300);
        assert!(config.submit_url.is_none());
    }
}
