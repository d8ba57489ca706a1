//! Per-IP rate limiting for credential routes (login, signup, password reset)

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::error::{AppError, ErrorCode};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;

struct IpEntry {
    count: u32,
    window_start: Instant,
}

#[derive(Clone, Default)]
pub struct RateLimiter {
    /// route name -> (IP -> entry)
    inner: Arc<Mutex<HashMap<&'static str, HashMap<String, IpEntry>>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the request is allowed, `false` if rate-limited.
    pub(crate) async fn check(
        &self,
        route: &'static str,
        ip: &str,
        max_requests: u32,
        window_secs: u64,
    ) -> bool {
        let mut map = self.inner.lock().await;
        let route_map = map.entry(route).or_default();
        let now = Instant::now();

        let entry = route_map.entry(ip.to_owned()).or_insert_with(|| IpEntry {
            count: 0,
            window_start: now,
        });

        // Reset window if expired
        if now.duration_since(entry.window_start).as_secs() >= window_secs {
            entry.count = 0;
            entry.window_start = now;
        }

        entry.count += 1;
        entry.count <= max_requests
    }

    /// Remove entries older than 5 minutes
    pub async fn cleanup(&self) {
        let mut map = self.inner.lock().await;
        let cutoff = std::time::Duration::from_secs(300);
        let now = Instant::now();

        for route_map in map.values_mut() {
            route_map.retain(|_, entry| now.duration_since(entry.window_start) < cutoff);
        }
        map.retain(|_, route_map| !route_map.is_empty());
    }
}

/// Client IP used as the rate limit key.
///
/// The peer address, unless the server sits behind a trusted proxy; then the
/// last `X-Forwarded-For` entry, which that proxy appended.
fn extract_ip(request: &Request, trust_proxy_headers: bool) -> String {
    if trust_proxy_headers
        && let Some(forwarded) = request.headers().get("x-forwarded-for")
        && let Ok(val) = forwarded.to_str()
        && let Some(last) = val.rsplit(',').next()
    {
        let ip = last.trim();
        if !ip.is_empty() {
            return ip.to_owned();
        }
    }

    request
        .extensions()
        .get::<axum::extract::ConnectInfo<std::net::SocketAddr>>()
        .map(|ci| ci.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn too_many_requests() -> Response {
    AppError::with_message(
        ErrorCode::TooManyAttempts,
        "Too many requests, try again later",
    )
    .into_response()
}

async fn limited(
    state: &crate::state::AppState,
    route: &'static str,
    max_requests: u32,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    let ip = extract_ip(&request, state.config.trust_proxy_headers);
    if !state.rate_limiter.check(route, &ip, max_requests, 60).await {
        tracing::warn!(route, ip = %ip, "Rate limit exceeded");
        return Err(too_many_requests());
    }
    Ok(next.run(request).await)
}

/// Login: 5 requests/minute per IP
pub async fn login_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    limited(&state, "login", 5, request, next).await
}

/// Signup: 3 requests/minute per IP
pub async fn signup_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    limited(&state, "signup", 3, request, next).await
}

/// Password reset (request and redeem): 5 requests/minute per IP
pub async fn reset_rate_limit(
    State(state): State<crate::state::AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    limited(&state, "password_reset", 5, request, next).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_check_limits_per_ip_and_route() {
        let limiter = RateLimiter::new();
        for _ in 0..3 {
            assert!(limiter.check("login", "10.0.0.1", 3, 60).await);
        }
        assert!(!limiter.check("login", "10.0.0.1", 3, 60).await);
        assert!(limiter.check("login", "10.0.0.2", 3, 60).await);
        assert!(limiter.check("signup", "10.0.0.1", 3, 60).await);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_fresh_entries() {
        let limiter = RateLimiter::new();
        limiter.check("login", "10.0.0.1", 3, 60).await;
        limiter.cleanup().await;
        assert_eq!(limiter.inner.lock().await.len(), 1);
    }

    fn request_from(peer: &str, forwarded: Option<&str>) -> Request {
        let mut request = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        if let Some(value) = forwarded {
            request
                .headers_mut()
                .insert("x-forwarded-for", value.parse().unwrap());
        }
        let addr: std::net::SocketAddr = peer.parse().unwrap();
        request
            .extensions_mut()
            .insert(axum::extract::ConnectInfo(addr));
        request
    }

    #[test]
    fn test_extract_ip_ignores_forwarded_for_by_default() {
        let request = request_from("192.0.2.1:5000", Some("203.0.113.9"));
        assert_eq!(extract_ip(&request, false), "192.0.2.1");

        let request = Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();
        assert_eq!(extract_ip(&request, false), "unknown");
    }

    #[test]
    fn test_extract_ip_behind_trusted_proxy() {
        let request = request_from("10.0.0.1:5000", Some("198.51.100.7, 203.0.113.9"));
        assert_eq!(extract_ip(&request, true), "203.0.113.9");

        let request = request_from("10.0.0.1:5000", None);
        assert_eq!(extract_ip(&request, true), "10.0.0.1");
    }
}
