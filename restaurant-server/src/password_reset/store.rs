//! Persistence seam for reset codes

use super::error::ResetError;
use async_trait::async_trait;

/// One verify-and-reset attempt
#[derive(Debug, Clone, Copy)]
pub struct ResetAttempt<'a> {
    pub email: &'a str,
    pub code: &'a str,
    /// Hash stored on success
    pub new_password_hash: &'a str,
    pub now: i64,
    pub max_attempts: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// Password replaced, code removed
    Reset,
    /// No live code (never issued or already used)
    Missing,
    /// Code past its TTL, removed
    Expired,
    /// Wrong code, attempt counted
    Mismatch,
    /// Attempt budget exhausted, code removed
    TooManyAttempts,
    /// Code matched but the account is gone
    UserMissing,
}

#[async_trait]
pub trait ResetStore: Send + Sync {
    async fn user_exists(&self, email: &str) -> Result<bool, ResetError>;

    /// Store a code hash for the email, replacing any earlier code and
    /// resetting the attempt counter.
    async fn save_code(
        &self,
        email: &str,
        code_hash: &str,
        expires_at: i64,
        now: i64,
    ) -> Result<(), ResetError>;

    /// Check the code and, when it matches, swap the password and drop the
    /// code. Runs as a single atomic step per email.
    async fn consume_code(&self, attempt: ResetAttempt<'_>) -> Result<ConsumeOutcome, ResetError>;
}

/// Stored state of an issued code
#[derive(Debug, Clone)]
pub struct CodeRecord {
    pub code_hash: String,
    pub attempts: i32,
    pub expires_at: i64,
}

/// Decide the outcome of an attempt against a live record.
///
/// Returns `Reset` when the code matches; the caller still has to write the
/// password. `Expired` and `TooManyAttempts` mean the record must be
/// dropped, `Mismatch` that its attempt counter must be incremented.
pub fn judge(record: &CodeRecord, attempt: &ResetAttempt<'_>) -> ConsumeOutcome {
    if record.expires_at < attempt.now {
        return ConsumeOutcome::Expired;
    }
    if record.attempts >= attempt.max_attempts {
        return ConsumeOutcome::TooManyAttempts;
    }
    if crate::util::verify_password(attempt.code, &record.code_hash) {
        return ConsumeOutcome::Reset;
    }
    if record.attempts + 1 >= attempt.max_attempts {
        ConsumeOutcome::TooManyAttempts
    } else {
        ConsumeOutcome::Mismatch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::hash_password;

    fn attempt<'a>(code: &'a str, now: i64) -> ResetAttempt<'a> {
        ResetAttempt {
            email: "a@b.c",
            code,
            new_password_hash: "hash",
            now,
            max_attempts: 3,
        }
    }

    #[test]
    fn test_judge() {
        let record = CodeRecord {
            code_hash: hash_password("123456").unwrap(),
            attempts: 0,
            expires_at: 1_000,
        };
        assert_eq!(judge(&record, &attempt("123456", 999)), ConsumeOutcome::Reset);
        assert_eq!(judge(&record, &attempt("123456", 1_001)), ConsumeOutcome::Expired);
        assert_eq!(judge(&record, &attempt("000000", 10)), ConsumeOutcome::Mismatch);

        let tired = CodeRecord {
            attempts: 2,
            ..record.clone()
        };
        assert_eq!(judge(&tired, &attempt("000000", 10)), ConsumeOutcome::TooManyAttempts);
        assert_eq!(judge(&tired, &attempt("123456", 10)), ConsumeOutcome::Reset);

        let spent = CodeRecord {
            attempts: 3,
            ..record
        };
        assert_eq!(judge(&spent, &attempt("123456", 10)), ConsumeOutcome::TooManyAttempts);
    }
}
