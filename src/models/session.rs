use iso8601_timestamp::Timestamp;

/// Session information
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    /// Unique Id
    #[serde(rename = "_id")]
    pub id: String,

    /// User Id
    pub user_id: String,

    /// Session token
    pub token: String,

    /// Display name
    pub name: String,

    /// When the session was issued
    pub issued_at: Timestamp,

    /// When the session stops validating
    ///
    /// Expiry is re-checked on every `validate` call, a session past
    /// this timestamp is dead even while it is still in storage.
    pub expires_at: Timestamp,

    /// Whether the session has been explicitly revoked
    #[serde(default)]
    pub revoked: bool,
}
