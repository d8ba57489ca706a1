//! Request and redeem password reset codes

use super::error::ResetError;
use super::store::{ConsumeOutcome, ResetAttempt, ResetStore};
use crate::email::Notifier;
use crate::util::{generate_code, hash_password, now_millis};
use std::sync::Arc;

/// Wrong codes accepted before the code is burned
pub const MAX_ATTEMPTS: i32 = 5;

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MAX_PASSWORD_LEN: usize = 100;

#[derive(Clone)]
pub struct PasswordResetService {
    store: Arc<dyn ResetStore>,
    notifier: Arc<dyn Notifier>,
    ttl_secs: i64,
}

/// Emails are matched case-insensitively
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_new_password(password: &str) -> Result<(), ResetError> {
    let len = password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len) {
        return Err(ResetError::InvalidPassword(format!(
            "password must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

impl PasswordResetService {
    pub fn new(store: Arc<dyn ResetStore>, notifier: Arc<dyn Notifier>, ttl_secs: i64) -> Self {
        Self {
            store,
            notifier,
            ttl_secs,
        }
    }

    /// Issue a fresh code for the account and mail it. Any earlier code for
    /// the same email stops working.
    pub async fn request_reset(&self, email: &str) -> Result<(), ResetError> {
        let email = normalize_email(email);
        if !self.store.user_exists(&email).await? {
            return Err(ResetError::UserNotFound);
        }

        let code = generate_code();
        let code_hash = hash_password(&code).map_err(|e| ResetError::Hash(e.to_string()))?;
        let now = now_millis();
        let expires_at = now + self.ttl_secs * 1000;
        self.store
            .save_code(&email, &code_hash, expires_at, now)
            .await?;

        self.notifier
            .send_password_reset_code(&email, &code, ((self.ttl_secs + 59) / 60).max(1))
            .await
            .map_err(ResetError::Delivery)?;

        tracing::info!(email = %email, "Password reset code issued");
        Ok(())
    }

    /// Redeem a code and set the new password. A code works once.
    pub async fn verify_and_reset(
        &self,
        email: &str,
        otp: &str,
        new_password: &str,
    ) -> Result<(), ResetError> {
        validate_new_password(new_password)?;
        let email = normalize_email(email);
        let new_password_hash =
            hash_password(new_password).map_err(|e| ResetError::Hash(e.to_string()))?;

        let outcome = self
            .store
            .consume_code(ResetAttempt {
                email: &email,
                code: otp.trim(),
                new_password_hash: &new_password_hash,
                now: now_millis(),
                max_attempts: MAX_ATTEMPTS,
            })
            .await?;

        match outcome {
            ConsumeOutcome::Reset => {
                tracing::info!(email = %email, "Password reset completed");
                Ok(())
            }
            ConsumeOutcome::Missing | ConsumeOutcome::Mismatch => Err(ResetError::CodeInvalid),
            ConsumeOutcome::Expired => Err(ResetError::CodeExpired),
            ConsumeOutcome::TooManyAttempts => {
                tracing::warn!(email = %email, "Password reset code burned after too many attempts");
                Err(ResetError::TooManyAttempts)
            }
            ConsumeOutcome::UserMissing => Err(ResetError::UserNotFound),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::email::testing::RecordingNotifier;
    use crate::password_reset::memory::MemoryResetStore;
    use crate::util::verify_password;

    const EMAIL: &str = "chef@example.com";

    fn setup(ttl_secs: i64) -> (Arc<MemoryResetStore>, Arc<RecordingNotifier>, PasswordResetService) {
        let store = Arc::new(MemoryResetStore::with_user(
            EMAIL,
            &hash_password("old-password").unwrap(),
        ));
        let notifier = Arc::new(RecordingNotifier::default());
        let service = PasswordResetService::new(store.clone(), notifier.clone(), ttl_secs);
        (store, notifier, service)
    }

    #[tokio::test]
    async fn test_reset_with_mailed_code() {
        let (store, notifier, service) = setup(300);
        service.request_reset("  Chef@Example.com ").await.unwrap();
        let code = notifier.last_code(EMAIL).unwrap();
        assert_eq!(code.len(), 6);

        service
            .verify_and_reset(EMAIL, &code, "new-password")
            .await
            .unwrap();
        let hash = store.password_hash(EMAIL).unwrap();
        assert!(verify_password("new-password", &hash));
    }

    #[tokio::test]
    async fn test_code_is_single_use() {
        let (_, notifier, service) = setup(300);
        service.request_reset(EMAIL).await.unwrap();
        let code = notifier.last_code(EMAIL).unwrap();

        service
            .verify_and_reset(EMAIL, &code, "new-password")
            .await
            .unwrap();
        let second = service.verify_and_reset(EMAIL, &code, "another-one").await;
        assert!(matches!(second, Err(ResetError::CodeInvalid)));
    }

    #[tokio::test]
    async fn test_expired_code_rejected_even_if_correct() {
        let (store, notifier, service) = setup(-1);
        service.request_reset(EMAIL).await.unwrap();
        let code = notifier.last_code(EMAIL).unwrap();

        let result = service.verify_and_reset(EMAIL, &code, "new-password").await;
        assert!(matches!(result, Err(ResetError::CodeExpired)));
        assert!(verify_password(
            "old-password",
            &store.password_hash(EMAIL).unwrap()
        ));
        assert!(store.codes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_new_request_replaces_old_code() {
        let (_, notifier, service) = setup(300);
        service.request_reset(EMAIL).await.unwrap();
        let first = notifier.last_code(EMAIL).unwrap();
        service.request_reset(EMAIL).await.unwrap();
        let second = notifier.last_code(EMAIL).unwrap();

        if first != second {
            let result = service.verify_and_reset(EMAIL, &first, "new-password").await;
            assert!(matches!(result, Err(ResetError::CodeInvalid)));
        }
        service
            .verify_and_reset(EMAIL, &second, "new-password")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_wrong_codes_burn_the_code() {
        let (_, notifier, service) = setup(300);
        service.request_reset(EMAIL).await.unwrap();
        let code = notifier.last_code(EMAIL).unwrap();
        let wrong = if code == "000000" { "111111" } else { "000000" };

        for _ in 0..MAX_ATTEMPTS - 1 {
            let result = service.verify_and_reset(EMAIL, wrong, "new-password").await;
            assert!(matches!(result, Err(ResetError::CodeInvalid)));
        }
        let result = service.verify_and_reset(EMAIL, wrong, "new-password").await;
        assert!(matches!(result, Err(ResetError::TooManyAttempts)));

        let result = service.verify_and_reset(EMAIL, &code, "new-password").await;
        assert!(matches!(result, Err(ResetError::CodeInvalid)));
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let (_, notifier, service) = setup(300);
        let result = service.request_reset("nobody@example.com").await;
        assert!(matches!(result, Err(ResetError::UserNotFound)));
        assert!(notifier.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_short_password_rejected_before_consuming() {
        let (_, notifier, service) = setup(300);
        service.request_reset(EMAIL).await.unwrap();
        let code = notifier.last_code(EMAIL).unwrap();

        let result = service.verify_and_reset(EMAIL, &code, "123").await;
        assert!(matches!(result, Err(ResetError::InvalidPassword(_))));
        service
            .verify_and_reset(EMAIL, &code, "long-enough")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delivery_failure_surfaces() {
        let store = Arc::new(MemoryResetStore::with_user(EMAIL, "hash"));
        let notifier = Arc::new(RecordingNotifier {
            fail: true,
            ..Default::default()
        });
        let service = PasswordResetService::new(store, notifier, 300);
        let result = service.request_reset(EMAIL).await;
        assert!(matches!(result, Err(ResetError::Delivery(_))));
    }
}
