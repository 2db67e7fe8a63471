use iso8601_timestamp::Timestamp;

use crate::models::{VerificationPurpose, VerificationRequest};

impl VerificationPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationPurpose::EmailVerify => "email_verify",
            VerificationPurpose::PasswordReset => "password_reset",
        }
    }
}

impl VerificationRequest {
    /// Storage key enforcing one outstanding request per (account, purpose)
    pub fn key(account_id: &str, purpose: VerificationPurpose) -> String {
        format!("{}/{}", account_id, purpose.as_str())
    }

    /// Check if this token has passed its expiry timestamp
    pub fn is_expired(&self) -> bool {
        Timestamp::now_utc() > self.expires_at
    }
}
