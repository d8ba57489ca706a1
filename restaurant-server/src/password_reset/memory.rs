//! In-memory [`ResetStore`] for tests

use super::error::ResetError;
use super::store::{CodeRecord, ConsumeOutcome, ResetAttempt, ResetStore, judge};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
pub struct MemoryResetStore {
    /// email -> password hash
    pub users: Mutex<HashMap<String, String>>,
    pub codes: Mutex<HashMap<String, CodeRecord>>,
}

impl MemoryResetStore {
    pub fn with_user(email: &str, password_hash: &str) -> Self {
        let store = Self::default();
        store
            .users
            .lock()
            .unwrap()
            .insert(email.to_string(), password_hash.to_string());
        store
    }

    pub fn password_hash(&self, email: &str) -> Option<String> {
        self.users.lock().unwrap().get(email).cloned()
    }
}

#[async_trait]
impl ResetStore for MemoryResetStore {
    async fn user_exists(&self, email: &str) -> Result<bool, ResetError> {
        Ok(self.users.lock().unwrap().contains_key(email))
    }

    async fn save_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: i64,
        _now: i64,
    ) -> Result<(), ResetError> {
        self.codes.lock().unwrap().insert(
            email.to_string(),
            CodeRecord {
                code_hash: code_hash.to_string(),
                attempts: 0,
                expires_at,
            },
        );
        Ok(())
    }

    async fn consume_code(&self, attempt: ResetAttempt<'_>) -> Result<ConsumeOutcome, ResetError> {
        let mut codes = self.codes.lock().unwrap();
        let Some(record) = codes.get_mut(attempt.email) else {
            return Ok(ConsumeOutcome::Missing);
        };

        let outcome = match judge(record, &attempt) {
            ConsumeOutcome::Mismatch => {
                record.attempts += 1;
                return Ok(ConsumeOutcome::Mismatch);
            }
            ConsumeOutcome::Reset => {
                let mut users = self.users.lock().unwrap();
                match users.get_mut(attempt.email) {
                    Some(hash) => {
                        *hash = attempt.new_password_hash.to_string();
                        ConsumeOutcome::Reset
                    }
                    None => ConsumeOutcome::UserMissing,
                }
            }
            other => other,
        };
        codes.remove(attempt.email);
        Ok(outcome)
    }
}
