//! Restaurant server configuration

use crate::error::BoxError;
use crate::orders::TransitionPolicy;

/// How password reset codes are delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailTransport {
    /// AWS SES
    Ses,
    /// Write the code to the log (development only)
    Log,
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL
    pub database_url: String,
    pub http_port: u16,
    /// Environment: development | staging | production
    pub environment: String,
    /// JWT secret for user authentication
    pub jwt_secret: String,
    pub jwt_expiry_hours: i64,
    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<String>,
    /// Take the client address from `X-Forwarded-For` (rightmost entry).
    /// Only safe behind exactly one reverse proxy that appends the peer
    /// address; otherwise clients could pick their own rate limit key.
    pub trust_proxy_headers: bool,
    /// Wall-clock deadline applied to every request
    pub request_timeout_secs: u64,
    /// Lifetime of a password reset code
    pub otp_ttl_secs: i64,
    pub order_transition_policy: TransitionPolicy,
    /// Sender address for password reset mail
    pub email_from: String,
    pub email_transport: EmailTransport,
}

impl Config {
    /// Require a secret env var: must be set and non-empty in non-development environments.
    fn require_secret(name: &str, environment: &str) -> Result<String, BoxError> {
        let val = match std::env::var(name) {
            Ok(v) => v,
            Err(_) => {
                if environment != "development" {
                    return Err(format!("{name} must be set in {environment} environment").into());
                }
                format!("dev-{name}-not-for-production")
            }
        };
        if val.is_empty() && environment != "development" {
            return Err(format!("{name} must not be empty in {environment} environment").into());
        }
        Ok(val)
    }

    fn parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
        std::env::var(name)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(default)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());

        let order_transition_policy = match std::env::var("ORDER_TRANSITION_POLICY") {
            Ok(v) => v.parse()?,
            Err(_) => TransitionPolicy::default(),
        };

        let email_transport = match std::env::var("EMAIL_TRANSPORT").as_deref() {
            Ok("ses") => EmailTransport::Ses,
            Ok("log") => EmailTransport::Log,
            Ok(other) => return Err(format!("unknown EMAIL_TRANSPORT: {other}").into()),
            Err(_) if environment == "development" => EmailTransport::Log,
            Err(_) => EmailTransport::Ses,
        };

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?,
            http_port: Self::parsed("HTTP_PORT", 8080),
            jwt_secret: Self::require_secret("JWT_SECRET", &environment)?,
            jwt_expiry_hours: Self::parsed("JWT_EXPIRY_HOURS", 24),
            cors_allowed_origins: parse_origins(
                &std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000".into()),
            ),
            trust_proxy_headers: Self::parsed("TRUST_PROXY_HEADERS", false),
            request_timeout_secs: Self::parsed("REQUEST_TIMEOUT_SECS", 5),
            otp_ttl_secs: Self::parsed("OTP_TTL_SECS", 300),
            order_transition_policy,
            email_from: std::env::var("EMAIL_FROM")
                .unwrap_or_else(|_| "noreply@restaurant.local".into()),
            email_transport,
            environment,
        })
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
