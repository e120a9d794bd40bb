//! API Middleware (Auth, Rate Limiting, Logging)

use axum::{
    extract::Request,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Paths that bypass auth and rate limiting
const EXEMPT_PATHS: &[&str] = &["/health", "/v1/health"];

fn is_exempt(path: &str) -> bool {
    EXEMPT_PATHS.contains(&path)
}

/// Rate limiter configuration
pub struct RateLimitConfig {
    /// Requests per window
    pub requests_per_window: u32,
    /// Window duration
    pub window_duration: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            requests_per_window: 100,
            window_duration: Duration::from_secs(60),
        }
    }
}

/// In-memory fixed-window rate limiter
/// Production: use Redis for distributed rate limiting
pub struct RateLimiter {
    /// Request counts per API key or client IP
    requests: DashMap<String, (u32, Instant)>,
    config: RateLimitConfig,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            requests: DashMap::new(),
            config,
        }
    }

    /// Check if a request is allowed, returns (allowed, remaining, reset_seconds)
    pub fn check(&self, key: &str) -> (bool, u32, u64) {
        let now = Instant::now();

        let mut entry = self.requests.entry(key.to_string()).or_insert((0, now));

        // Reset window if expired
        if now.duration_since(entry.1) > self.config.window_duration {
            entry.0 = 0;
            entry.1 = now;
        }

        let remaining = self.config.requests_per_window.saturating_sub(entry.0);
        let reset_secs = self
            .config
            .window_duration
            .saturating_sub(now.duration_since(entry.1))
            .as_secs();

        if entry.0 >= self.config.requests_per_window {
            return (false, 0, reset_secs);
        }

        entry.0 += 1;
        (true, remaining - 1, reset_secs)
    }

    /// Drop stale entries (call periodically)
    pub fn cleanup(&self) {
        let now = Instant::now();
        self.requests.retain(|_, (_, timestamp)| {
            now.duration_since(*timestamp) < self.config.window_duration * 2
        });
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(RateLimitConfig::default())
    }
}

// Global rate limiter instance, sized from the environment on first use
lazy_static::lazy_static! {
    pub static ref RATE_LIMITER: Arc<RateLimiter> = {
        let settings = crate::models::config::Settings::from_env();
        Arc::new(RateLimiter::new(RateLimitConfig {
            requests_per_window: settings.rate_limit_requests,
            window_duration: settings.rate_limit_window,
        }))
    };
}

/// Spawn the periodic rate-limiter cleanup task
pub fn start_cleanup_task() {
    let limiter = RATE_LIMITER.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(120));
        loop {
            interval.tick().await;
            limiter.cleanup();
        }
    });
}

/// API key authentication middleware
pub async fn auth_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_exempt(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let api_key = headers
        .get("X-API-Key")
        .or_else(|| headers.get("x-api-key"))
        .and_then(|v| v.to_str().ok());

    match api_key {
        Some(key) if validate_api_key(key) => Ok(next.run(request).await),
        Some(_) => {
            warn!("Invalid API key attempted");
            Err(StatusCode::UNAUTHORIZED)
        }
        None => {
            // Keyless access is allowed but rate limited by client IP
            Ok(next.run(request).await)
        }
    }
}

/// Validate API key format and existence
fn validate_api_key(key: &str) -> bool {
    // MVP: accept any key starting with "sk_" or "pk_"
    // Production: check against database/Redis
    key.starts_with("sk_") || key.starts_with("pk_") || key == "demo"
}

/// Rate limiting middleware
pub async fn rate_limit_middleware(
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    if is_exempt(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    // Rate limit key: API key if present, otherwise client IP
    let rate_key = headers
        .get("X-API-Key")
        .or_else(|| headers.get("x-api-key"))
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .unwrap_or_else(|| {
            headers
                .get("X-Forwarded-For")
                .or_else(|| headers.get("x-real-ip"))
                .and_then(|v| v.to_str().ok())
                .unwrap_or("unknown")
                .to_string()
        });

    let (allowed, remaining, reset) = RATE_LIMITER.check(&rate_key);

    if !allowed {
        warn!(key = %rate_key, "Rate limit exceeded");
        return Err(StatusCode::TOO_MANY_REQUESTS);
    }

    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Remaining", remaining.into());
    headers.insert("X-RateLimit-Reset", reset.into());

    Ok(response)
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limiter_window() {
        let limiter = RateLimiter::new(RateLimitConfig {
            requests_per_window: 2,
            window_duration: Duration::from_secs(60),
        });

        let (allowed, remaining, _) = limiter.check("client-a");
        assert!(allowed);
        assert_eq!(remaining, 1);

        let (allowed, remaining, _) = limiter.check("client-a");
        assert!(allowed);
        assert_eq!(remaining, 0);

        let (allowed, _, _) = limiter.check("client-a");
        assert!(!allowed);

        // Separate key gets its own window
        let (allowed, _, _) = limiter.check("client-b");
        assert!(allowed);
    }

    #[test]
    fn test_api_key_validation() {
        assert!(validate_api_key("sk_live_abc123"));
        assert!(validate_api_key("pk_test_xyz"));
        assert!(validate_api_key("demo"));
        assert!(!validate_api_key("bogus"));
    }

    #[test]
    fn test_exempt_paths() {
        assert!(is_exempt("/health"));
        assert!(is_exempt("/v1/health"));
        assert!(!is_exempt("/v1/countries"));
    }
}
