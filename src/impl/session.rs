use iso8601_timestamp::Timestamp;

use crate::models::Session;

impl Session {
    /// Check if this session has passed its expiry timestamp
    pub fn is_expired(&self) -> bool {
        Timestamp::now_utc() > self.expires_at
    }

    /// Whether this session still validates
    pub fn is_active(&self) -> bool {
        !self.revoked && !self.is_expired()
    }
}
