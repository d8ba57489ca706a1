//! Password reset codes (one row per email, code stored as a hash)

use async_trait::async_trait;
use sqlx::PgPool;

use crate::password_reset::ResetError;
use crate::password_reset::store::{CodeRecord, ConsumeOutcome, ResetAttempt, ResetStore, judge};

#[derive(Clone)]
pub struct PgResetStore {
    pool: PgPool,
}

impl PgResetStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResetStore for PgResetStore {
    async fn user_exists(&self, email: &str) -> Result<bool, ResetError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT id FROM users WHERE lower(email) = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }

    async fn save_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: i64,
        now: i64,
    ) -> Result<(), ResetError> {
        sqlx::query(
            "INSERT INTO password_resets (email, code_hash, attempts, expires_at, created_at)
             VALUES ($1, $2, 0, $3, $4)
             ON CONFLICT (email) DO UPDATE SET
                code_hash = $2, attempts = 0, expires_at = $3, created_at = $4",
        )
        .bind(email)
        .bind(code_hash)
        .bind(expires_at)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn consume_code(&self, attempt: ResetAttempt<'_>) -> Result<ConsumeOutcome, ResetError> {
        let mut tx = self.pool.begin().await?;

        let row: Option<(String, i32, i64)> = sqlx::query_as(
            "SELECT code_hash, attempts, expires_at FROM password_resets WHERE email = $1 FOR UPDATE",
        )
        .bind(attempt.email)
        .fetch_optional(&mut *tx)
        .await?;
        let Some((code_hash, attempts, expires_at)) = row else {
            return Ok(ConsumeOutcome::Missing);
        };
        let record = CodeRecord {
            code_hash,
            attempts,
            expires_at,
        };

        let outcome = match judge(&record, &attempt) {
            ConsumeOutcome::Mismatch => {
                sqlx::query("UPDATE password_resets SET attempts = attempts + 1 WHERE email = $1")
                    .bind(attempt.email)
                    .execute(&mut *tx)
                    .await?;
                tx.commit().await?;
                return Ok(ConsumeOutcome::Mismatch);
            }
            ConsumeOutcome::Reset => {
                let updated = sqlx::query(
                    "UPDATE users SET password_hash = $1, updated_at = $2 WHERE lower(email) = $3",
                )
                .bind(attempt.new_password_hash)
                .bind(attempt.now)
                .bind(attempt.email)
                .execute(&mut *tx)
                .await?;
                if updated.rows_affected() == 0 {
                    ConsumeOutcome::UserMissing
                } else {
                    ConsumeOutcome::Reset
                }
            }
            other => other,
        };

        sqlx::query("DELETE FROM password_resets WHERE email = $1")
            .bind(attempt.email)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(outcome)
    }
}
