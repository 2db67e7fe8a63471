mod email_verification;
mod passwords;
mod sessions;

pub use email_verification::*;
pub use passwords::*;
pub use sessions::*;

/// login-core configuration
#[derive(Default, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Password acceptance policy
    pub password_scanning: PasswordScanning,

    /// Session time-to-live settings
    pub sessions: SessionLifetime,

    /// Email verification
    pub email_verification: EmailVerificationConfig,
}
