use async_std::channel::Sender;
use iso8601_timestamp::Timestamp;

use crate::config::PasswordScanning;
use crate::events::{self, LoginEvent};
use crate::models::{Account, EmailVerification};
use crate::util::{hash_password, normalise_email};
use crate::{Database, Error, Result, Success};

/// Owns hashed credentials and account state
///
/// Leaf component: its only collaborator is the storage layer.
/// Passwords are hashed with argon2 before they ever reach storage and
/// compared in constant time; nothing here sees or keeps plaintext.
#[derive(Clone)]
pub struct CredentialStore {
    pub database: Database,
    pub passwords: PasswordScanning,
    pub event_channel: Option<Sender<LoginEvent>>,
}

impl CredentialStore {
    pub fn new(
        database: Database,
        passwords: PasswordScanning,
        event_channel: Option<Sender<LoginEvent>>,
    ) -> CredentialStore {
        CredentialStore {
            database,
            passwords,
            event_channel,
        }
    }

    /// Register a new account
    ///
    /// The account is created verified; the verification workflow
    /// flips it back while an email round-trip is pending.
    pub async fn register(&self, email: String, plaintext_password: String) -> Result<Account> {
        if !email.contains('@') {
            return Err(Error::IncorrectData { with: "email" });
        }

        self.passwords.assert_safe(&plaintext_password)?;

        // Hash the user's password
        let password = hash_password(plaintext_password)?;

        // Get a normalised representation of the user's email
        let email_normalised = normalise_email(email.clone());

        let account = Account {
            id: ulid::Ulid::new().to_string(),

            email,
            email_normalised,
            password,

            disabled: false,
            verification: EmailVerification::Verified,
            created_at: Timestamp::now_utc(),
        };

        // Uniqueness is enforced by the storage layer, the insert
        // fails if the normalised email is already taken.
        self.database.insert_account(&account).await?;

        events::publish(
            &self.event_channel,
            LoginEvent::CreateAccount {
                account: account.clone(),
            },
        )
        .await;

        Ok(account)
    }

    /// Check an email / password pair
    ///
    /// Unknown emails report `false` rather than an error, the boolean
    /// answers "would this pair log in" and nothing else.
    pub async fn verify_password(&self, email: &str, plaintext_password: &str) -> Result<bool> {
        match self
            .database
            .find_account_by_normalised_email(&normalise_email(email.to_string()))
            .await?
        {
            Some(account) => Ok(account.verify_password(plaintext_password).is_ok()),
            None => Ok(false),
        }
    }

    /// Resolve an email / password pair to its account
    ///
    /// Collapses "no such account" and "wrong password" into
    /// `InvalidCredentials` so callers can't enumerate accounts.
    pub async fn authenticate(&self, email: &str, plaintext_password: &str) -> Result<Account> {
        let account = self
            .database
            .find_account_by_normalised_email(&normalise_email(email.to_string()))
            .await?
            .ok_or(Error::InvalidCredentials)?;

        account.verify_password(plaintext_password)?;

        Ok(account)
    }

    /// Replace an account's password
    pub async fn update_password(
        &self,
        account_id: &str,
        new_plaintext_password: String,
    ) -> Success {
        let mut account = self.database.find_account(account_id).await?;

        self.passwords.assert_safe(&new_plaintext_password)?;

        account.password = hash_password(new_plaintext_password)?;
        account.save(&self.database).await
    }

    /// Soft-deactivate an account
    pub async fn deactivate(&self, account_id: &str) -> Success {
        let mut account = self.database.find_account(account_id).await?;
        account.disabled = true;
        account.save(&self.database).await
    }
}

#[cfg(test)]
mod tests {
    use crate::config::PasswordScanning;
    use crate::test::*;
    use crate::{Config, Error};

    #[async_std::test]
    async fn register_then_verify_password() {
        let (core, _) = for_test();
        let credentials = core.credentials();

        credentials
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        assert!(credentials
            .verify_password("example@validemail.com", "password_insecure")
            .await
            .unwrap());
        assert!(!credentials
            .verify_password("example@validemail.com", "some other password")
            .await
            .unwrap());
        assert!(!credentials
            .verify_password("unknown@validemail.com", "password_insecure")
            .await
            .unwrap());
    }

    #[async_std::test]
    async fn fail_duplicate_account() {
        let (core, _) = for_test();
        let credentials = core.credentials();

        credentials
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        assert_eq!(
            credentials
                .register("example@validemail.com".into(), "password_insecure".into())
                .await
                .unwrap_err(),
            Error::DuplicateAccount
        );

        // Aliased spellings resolve to the same mailbox
        assert_eq!(
            credentials
                .register(
                    "ex.ample+alias@validemail.com".into(),
                    "password_insecure".into()
                )
                .await
                .unwrap_err(),
            Error::DuplicateAccount
        );
    }

    #[async_std::test]
    async fn fail_invalid_email() {
        let (core, _) = for_test();

        assert_eq!(
            core.credentials()
                .register("invalid".into(), "password_insecure".into())
                .await
                .unwrap_err(),
            Error::IncorrectData { with: "email" }
        );
    }

    #[async_std::test]
    async fn update_password() {
        let (core, _) = for_test();
        let credentials = core.credentials();

        let account = credentials
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        credentials
            .update_password(&account.id, "new password".into())
            .await
            .unwrap();

        assert!(!credentials
            .verify_password("example@validemail.com", "password_insecure")
            .await
            .unwrap());
        assert!(credentials
            .verify_password("example@validemail.com", "new password")
            .await
            .unwrap());
    }

    #[async_std::test]
    async fn fail_update_password_unknown_account() {
        let (core, _) = for_test();

        assert_eq!(
            core.credentials()
                .update_password("01H00000000000000000000000", "new password".into())
                .await
                .unwrap_err(),
            Error::AccountNotFound
        );
    }

    #[async_std::test]
    async fn fail_short_password() {
        let (core, _) = for_test_with_config(Config {
            password_scanning: PasswordScanning::MinimumLength { length: 8 },
            ..Default::default()
        });

        assert_eq!(
            core.credentials()
                .register("example@validemail.com".into(), "short".into())
                .await
                .unwrap_err(),
            Error::ShortPassword
        );
    }

    #[async_std::test]
    async fn fail_compromised_password() {
        let (core, _) = for_test_with_config(Config {
            password_scanning: PasswordScanning::Custom {
                passwords: ["password_insecure".to_string()].into_iter().collect(),
            },
            ..Default::default()
        });

        assert_eq!(
            core.credentials()
                .register("example@validemail.com".into(), "password_insecure".into())
                .await
                .unwrap_err(),
            Error::CompromisedPassword
        );
    }
}
