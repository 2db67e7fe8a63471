/// Session lifetime settings
#[derive(Serialize, Deserialize, Clone)]
pub struct SessionLifetime {
    /// How long a session is valid for after issuance (in seconds)
    pub ttl: i64,

    /// How long dead sessions are kept in storage before `sweep`
    /// removes them (in seconds)
    pub grace_period: i64,
}

impl Default for SessionLifetime {
    fn default() -> SessionLifetime {
        SessionLifetime {
            ttl: 3600 * 24 * 7,
            grace_period: 3600 * 24,
        }
    }
}
