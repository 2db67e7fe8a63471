use chrono::Duration;
use iso8601_timestamp::Timestamp;
use regex::Regex;

use crate::{Error, Result};

lazy_static! {
    static ref ARGON_CONFIG: argon2::Config<'static> = argon2::Config::default();
}

/// Strip special characters and aliases from emails
pub fn normalise_email(original: String) -> String {
    lazy_static! {
        static ref SPLIT: Regex = Regex::new("([^@]+)(@.+)").unwrap();
        static ref SYMBOL_RE: Regex = Regex::new("\\+.+|\\.").unwrap();
    }

    if let Some(split) = SPLIT.captures(&original) {
        let mut clean = SYMBOL_RE
            .replace_all(split.get(1).unwrap().as_str(), "")
            .to_string();

        clean.push_str(split.get(2).unwrap().as_str());

        clean
    } else {
        original
    }
}

/// Hash a password using argon2
pub fn hash_password(plaintext_password: String) -> Result<String> {
    argon2::hash_encoded(
        plaintext_password.as_bytes(),
        nanoid::nanoid!(24).as_bytes(),
        &ARGON_CONFIG,
    )
    .map_err(|_| Error::InternalError)
}

/// Timestamp a given number of seconds from now
pub fn timestamp_after(seconds: i64) -> Timestamp {
    Timestamp::from_unix_timestamp_ms(
        chrono::Utc::now()
            .checked_add_signed(Duration::seconds(seconds))
            .expect("failed to checked_add_signed")
            .timestamp_millis(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalises_emails() {
        assert_eq!(
            normalise_email("in.se.rt@example.com".to_string()),
            "insert@example.com"
        );
        assert_eq!(
            normalise_email("insert+alias@example.com".to_string()),
            "insert@example.com"
        );
        assert_eq!(normalise_email("not-an-email".to_string()), "not-an-email");
    }

    #[test]
    fn hashes_and_verifies_password() {
        let hash = hash_password("password_insecure".to_string()).unwrap();
        assert!(argon2::verify_encoded(&hash, b"password_insecure").unwrap());
        assert!(!argon2::verify_encoded(&hash, b"something else").unwrap());
    }
}
