//! Outbound mail for password reset codes

use async_trait::async_trait;
use aws_sdk_sesv2::Client as SesClient;
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};

use crate::error::BoxError;

/// Delivers one-time codes to users
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send_password_reset_code(
        &self,
        to: &str,
        code: &str,
        valid_minutes: i64,
    ) -> Result<(), BoxError>;
}

/// AWS SES delivery
pub struct SesNotifier {
    ses: SesClient,
    from: String,
}

impl SesNotifier {
    pub async fn from_env(from: String) -> Self {
        let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        let ses = if let Ok(ses_region) = std::env::var("SES_REGION") {
            let ses_config = aws_config
                .to_builder()
                .region(aws_config::Region::new(ses_region))
                .build();
            SesClient::new(&ses_config)
        } else {
            SesClient::new(&aws_config)
        };
        Self { ses, from }
    }
}

#[async_trait]
impl Notifier for SesNotifier {
    async fn send_password_reset_code(
        &self,
        to: &str,
        code: &str,
        valid_minutes: i64,
    ) -> Result<(), BoxError> {
        let subject = Content::builder().data("Reset your password").build()?;

        let body = Body::builder()
            .text(
                Content::builder()
                    .data(reset_body(code, valid_minutes))
                    .build()?,
            )
            .build();

        let message = Message::builder().subject(subject).body(body).build();

        self.ses
            .send_email()
            .from_email_address(&self.from)
            .destination(Destination::builder().to_addresses(to).build())
            .content(EmailContent::builder().simple(message).build())
            .send()
            .await?;

        tracing::info!(to = to, "Password reset code sent");
        Ok(())
    }
}

/// Writes codes to the log instead of sending mail. Development only.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn send_password_reset_code(
        &self,
        to: &str,
        code: &str,
        valid_minutes: i64,
    ) -> Result<(), BoxError> {
        tracing::warn!(to = to, code = code, valid_minutes, "Password reset code (not mailed)");
        Ok(())
    }
}

fn reset_body(code: &str, valid_minutes: i64) -> String {
    format!(
        "Your password reset code is: {code}\n\
         Valid for {valid_minutes} minutes.\n\n\
         If you did not ask for a reset you can ignore this message."
    )
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_body_mentions_code_and_validity() {
        let body = reset_body("123456", 5);
        assert!(body.contains("123456"));
        assert!(body.contains("5 minutes"));
    }
}
