/// SMTP mail server configuration
#[derive(Serialize, Deserialize, Clone)]
pub struct SMTPSettings {
    /// Sender address
    pub from: String,

    /// Reply-To address
    pub reply_to: Option<String>,

    /// SMTP host
    pub host: String,

    /// SMTP port
    pub port: Option<i32>,

    /// SMTP username
    pub username: String,

    /// SMTP password
    pub password: String,

    /// Whether to use TLS
    pub use_tls: Option<bool>,

    /// Socket timeout for delivery (in seconds)
    ///
    /// Dispatching a notification never blocks the caller for longer
    /// than this. Defaults to 10 seconds.
    pub timeout: Option<u64>,
}

/// Email template
#[derive(Serialize, Deserialize, Clone)]
pub struct Template {
    /// Title of the email
    pub title: String,
    /// Plain text version of this email
    pub text: String,
    /// HTML version of this email
    pub html: Option<String>,
    /// URL to redirect people to from the email
    ///
    /// Use `{{url}}` to fill this field.
    ///
    /// Any given URL will be suffixed with a unique token,
    /// e.g. `https://example.com?t=` becomes `https://example.com?t=UNIQUE_CODE`.
    pub url: String,
}

/// Email templates
#[derive(Serialize, Deserialize, Clone)]
pub struct Templates {
    /// Template for email verification
    pub verify: Template,
    /// Template for password reset
    pub reset: Template,
}

/// Email expiration config
#[derive(Serialize, Deserialize, Clone)]
pub struct EmailExpiryConfig {
    /// How long email verification tokens should last for (in seconds)
    pub expire_verification: i64,
    /// How long password reset tokens should last for (in seconds)
    pub expire_password_reset: i64,
}

impl Default for EmailExpiryConfig {
    fn default() -> EmailExpiryConfig {
        EmailExpiryConfig {
            expire_verification: 3600 * 24,
            expire_password_reset: 3600,
        }
    }
}

/// Email verification config
///
/// SMTP settings live alongside this config but are consumed by
/// `SmtpMailer::new`; the coordinator itself only needs templates
/// and expiry, the sink is handed to it as a collaborator.
#[derive(Default, Serialize, Deserialize, Clone)]
pub enum EmailVerificationConfig {
    /// Don't require email verification
    #[default]
    Disabled,
    /// Use email verification
    Enabled {
        templates: Templates,
        expiry: EmailExpiryConfig,
    },
}
