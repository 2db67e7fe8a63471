use iso8601_timestamp::Timestamp;

/// Email verification status
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(tag = "status")]
pub enum EmailVerification {
    /// Waiting for the owner to prove the address
    Unverified,
    /// Address is verified
    Verified,
}

/// Account model
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Account {
    /// Unique Id
    #[serde(rename = "_id")]
    pub id: String,

    /// User's email
    pub email: String,

    /// Normalised email
    ///
    /// Aliases and separator dots are stripped from the local part
    /// so that one mailbox maps to at most one account.
    pub email_normalised: String,

    /// Argon2 hashed password
    ///
    /// The PHC string carries the salt and algorithm tag.
    pub password: String,

    /// Whether the account is disabled
    ///
    /// Accounts are never physically deleted, only deactivated.
    #[serde(default)]
    pub disabled: bool,

    /// Email verification status
    pub verification: EmailVerification,

    /// When the account was registered
    pub created_at: Timestamp,
}
