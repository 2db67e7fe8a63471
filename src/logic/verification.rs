use async_std::channel::Sender;
use iso8601_timestamp::Timestamp;

use crate::config::EmailVerificationConfig;
use crate::events::{self, LoginEvent};
use crate::models::{Account, EmailVerification, VerificationPurpose, VerificationRequest};
use crate::util::timestamp_after;
use crate::{Database, Error, Mailer, Result, SessionManager, Success};

/// How the notification for a started workflow went out
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    Sent,
    Failed,
}

/// Result of starting a verification workflow
///
/// The token is durable either way; `delivery` only reports whether
/// the notification made it out.
#[derive(Debug)]
pub struct StartedVerification {
    pub request: VerificationRequest,
    pub delivery: Delivery,
}

/// Coordinates email-verification and password-reset workflows
///
/// Owns the single-use token lifecycle and the out-of-band
/// notification that carries each token to the user.
#[derive(Clone)]
pub struct VerificationCoordinator {
    pub database: Database,
    pub mailer: Mailer,
    pub sessions: SessionManager,
    pub config: EmailVerificationConfig,
    pub event_channel: Option<Sender<LoginEvent>>,
}

impl VerificationCoordinator {
    pub fn new(
        database: Database,
        mailer: Mailer,
        sessions: SessionManager,
        config: EmailVerificationConfig,
        event_channel: Option<Sender<LoginEvent>>,
    ) -> VerificationCoordinator {
        VerificationCoordinator {
            database,
            mailer,
            sessions,
            config,
            event_channel,
        }
    }

    /// Start a verification workflow for an account
    ///
    /// Any outstanding request of the same purpose is displaced by the
    /// new token. A notification failure is reported through
    /// `Delivery::Failed` but never rolls the token back; calling
    /// `start` again re-issues and re-sends.
    pub async fn start(
        &self,
        account_id: &str,
        purpose: VerificationPurpose,
    ) -> Result<StartedVerification> {
        let EmailVerificationConfig::Enabled { templates, expiry } = &self.config else {
            return Err(Error::OperationFailed);
        };

        let mut account = self.database.find_account(account_id).await?;

        let token = nanoid!(32);
        let expire_after = match purpose {
            VerificationPurpose::EmailVerify => expiry.expire_verification,
            VerificationPurpose::PasswordReset => expiry.expire_password_reset,
        };

        let request = VerificationRequest {
            id: VerificationRequest::key(account_id, purpose),
            account_id: account_id.to_string(),
            token: token.clone(),
            purpose,
            issued_at: Timestamp::now_utc(),
            expires_at: timestamp_after(expire_after),
            consumed: false,
        };

        // The address is unproven until the round-trip completes
        if let VerificationPurpose::EmailVerify = purpose {
            account.verification = EmailVerification::Unverified;
            account.save(&self.database).await?;
        }

        self.database.replace_verification_request(&request).await?;

        let template = match purpose {
            VerificationPurpose::EmailVerify => &templates.verify,
            VerificationPurpose::PasswordReset => &templates.reset,
        };

        let url = format!("{}{}", template.url, token);
        let delivery = match self
            .mailer
            .send(&account.email, template, json!({ "url": url }))
            .await
        {
            Ok(_) => Delivery::Sent,
            Err(err) => {
                warn!(
                    "Failed to dispatch {} mail to {}: {:?}",
                    purpose.as_str(),
                    account.email,
                    err
                );
                Delivery::Failed
            }
        };

        events::publish(
            &self.event_channel,
            LoginEvent::StartVerification {
                account_id: account_id.to_string(),
                purpose,
            },
        )
        .await;

        Ok(StartedVerification { request, delivery })
    }

    /// Consume a verification token
    ///
    /// Single-use: the swap on the consumed flag happens in storage, a
    /// second call with the same token always fails. Consuming an
    /// email-verify token marks the account verified; a password-reset
    /// token only proves the reset, the caller applies the new
    /// password (see `complete_password_reset`).
    pub async fn consume(&self, token: &str) -> Result<Account> {
        let request = self.database.take_verification_request(token).await?;

        let mut account = self.database.find_account(&request.account_id).await?;

        if let VerificationPurpose::EmailVerify = request.purpose {
            account.verification = EmailVerification::Verified;
            account.save(&self.database).await?;
        }

        events::publish(
            &self.event_channel,
            LoginEvent::ConsumeVerification {
                account_id: request.account_id,
                purpose: request.purpose,
            },
        )
        .await;

        Ok(account)
    }

    /// Consume a password-reset token and install the new password
    ///
    /// Every session the account holds is revoked afterwards.
    pub async fn complete_password_reset(
        &self,
        token: &str,
        new_plaintext_password: String,
    ) -> Success {
        // Look before consuming: a weak replacement password or a
        // token of the wrong purpose must not burn the request.
        let request = self
            .database
            .find_verification_request(token)
            .await?
            .ok_or(Error::TokenNotFound)?;

        if request.purpose != VerificationPurpose::PasswordReset {
            return Err(Error::TokenNotFound);
        }

        self.sessions
            .credentials
            .passwords
            .assert_safe(&new_plaintext_password)?;

        let account = self.consume(token).await?;

        self.sessions
            .credentials
            .update_password(&account.id, new_plaintext_password)
            .await?;

        self.sessions.revoke_all(&account.id).await
    }
}
