use iso8601_timestamp::Timestamp;

/// What consuming a verification token proves
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPurpose {
    /// Prove ownership of the account's email address
    EmailVerify,
    /// Authorise a password reset
    PasswordReset,
}

/// Single-use verification token tied to an account and a purpose
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct VerificationRequest {
    /// Composite `account/purpose` key
    ///
    /// Keying the collection this way means inserting a new request
    /// atomically displaces the outstanding one: there is never more
    /// than one live token per (account, purpose) pair.
    #[serde(rename = "_id")]
    pub id: String,

    /// Account Id
    pub account_id: String,

    /// Unique Token
    pub token: String,

    /// Purpose of the token
    pub purpose: VerificationPurpose,

    /// When the request was issued
    pub issued_at: Timestamp,

    /// When the token expires
    pub expires_at: Timestamp,

    /// Whether the token has already been used
    #[serde(default)]
    pub consumed: bool,
}
