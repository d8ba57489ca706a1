//! Application state

use sqlx::PgPool;
use std::sync::Arc;

use crate::auth::RateLimiter;
use crate::config::{Config, EmailTransport};
use crate::db::orders::PgOrderStore;
use crate::db::password_resets::PgResetStore;
use crate::email::{LogNotifier, Notifier, SesNotifier};
use crate::error::BoxError;
use crate::orders::OrderService;
use crate::password_reset::PasswordResetService;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool
    pub pool: PgPool,
    pub config: Arc<Config>,
    /// Order lifecycle (items, totals, status, invoices)
    pub orders: OrderService,
    pub password_reset: PasswordResetService,
    /// Rate limiter for credential routes
    pub rate_limiter: RateLimiter,
}

impl AppState {
    /// Connect to the database, run migrations and wire the services
    pub async fn new(config: &Config) -> Result<Self, BoxError> {
        let pool = PgPool::connect(&config.database_url).await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        let notifier: Arc<dyn Notifier> = match config.email_transport {
            EmailTransport::Ses => Arc::new(SesNotifier::from_env(config.email_from.clone()).await),
            EmailTransport::Log => {
                tracing::warn!("EMAIL_TRANSPORT=log: reset codes are written to the log");
                Arc::new(LogNotifier)
            }
        };

        Ok(Self::from_parts(pool, config.clone(), notifier))
    }

    pub fn from_parts(pool: PgPool, config: Config, notifier: Arc<dyn Notifier>) -> Self {
        let orders = OrderService::new(
            Arc::new(PgOrderStore::new(pool.clone())),
            config.order_transition_policy,
        );
        let password_reset = PasswordResetService::new(
            Arc::new(PgResetStore::new(pool.clone())),
            notifier,
            config.otp_ttl_secs,
        );

        Self {
            pool,
            config: Arc::new(config),
            orders,
            password_reset,
            rate_limiter: RateLimiter::new(),
        }
    }
}
