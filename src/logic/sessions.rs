use async_std::channel::Sender;
use iso8601_timestamp::Timestamp;

use crate::config::SessionLifetime;
use crate::events::{self, LoginEvent};
use crate::models::{Account, Session};
use crate::util::timestamp_after;
use crate::{CredentialStore, Database, Error, Result, Success};

/// Issues, validates and revokes session tokens
///
/// Authentication checks are delegated to the credential store; this
/// component only owns the token lifecycle. A session moves from
/// active to expired (time) or revoked (explicit), both irreversible,
/// and is eventually swept out of storage.
#[derive(Clone)]
pub struct SessionManager {
    pub credentials: CredentialStore,
    pub database: Database,
    pub lifetime: SessionLifetime,
    pub event_channel: Option<Sender<LoginEvent>>,
}

impl SessionManager {
    pub fn new(
        credentials: CredentialStore,
        database: Database,
        lifetime: SessionLifetime,
        event_channel: Option<Sender<LoginEvent>>,
    ) -> SessionManager {
        SessionManager {
            credentials,
            database,
            lifetime,
            event_channel,
        }
    }

    /// Login to an account
    pub async fn login(
        &self,
        email: &str,
        plaintext_password: &str,
        name: Option<String>,
    ) -> Result<Session> {
        let account = self.credentials.authenticate(email, plaintext_password).await?;

        // Prevent disabled accounts from logging in
        if account.disabled {
            return Err(Error::DisabledAccount);
        }

        // Make sure the account has been verified
        if !account.is_verified() {
            return Err(Error::UnverifiedAccount);
        }

        let session = Session {
            id: ulid::Ulid::new().to_string(),
            token: nanoid!(64),

            user_id: account.id,
            name: name.unwrap_or_else(|| "Unknown".to_string()),

            issued_at: Timestamp::now_utc(),
            expires_at: timestamp_after(self.lifetime.ttl),
            revoked: false,
        };

        self.database.save_session(&session).await?;

        events::publish(
            &self.event_channel,
            LoginEvent::CreateSession {
                session: session.clone(),
            },
        )
        .await;

        Ok(session)
    }

    /// Resolve a token to its account
    ///
    /// Expiry is re-checked on every call; a revoked or expired session
    /// fails here even while its row is still in storage.
    pub async fn validate(&self, token: &str) -> Result<Account> {
        let session = self
            .database
            .find_session_by_token(token)
            .await?
            .ok_or(Error::SessionNotFound)?;

        if session.revoked {
            return Err(Error::SessionRevoked);
        }

        if session.is_expired() {
            return Err(Error::SessionExpired);
        }

        self.database.find_account(&session.user_id).await
    }

    /// Logout: destroy the session behind a token
    pub async fn logout(&self, token: &str) -> Success {
        let session = self
            .database
            .find_session_by_token(token)
            .await?
            .ok_or(Error::SessionNotFound)?;

        self.database.delete_session(&session.id).await?;

        events::publish(
            &self.event_channel,
            LoginEvent::DeleteSession {
                user_id: session.user_id,
                session_id: session.id,
            },
        )
        .await;

        Ok(())
    }

    /// Immediately invalidate every session belonging to an account
    pub async fn revoke_all(&self, account_id: &str) -> Success {
        self.database.revoke_all_sessions(account_id).await?;

        events::publish(
            &self.event_channel,
            LoginEvent::RevokeAllSessions {
                user_id: account_id.to_string(),
            },
        )
        .await;

        Ok(())
    }

    /// Enumerate an account's sessions
    pub async fn list(&self, account_id: &str) -> Result<Vec<Session>> {
        self.database.find_sessions(account_id).await
    }

    /// Garbage-collect dead sessions
    ///
    /// Not required for correctness (`validate` re-checks state on
    /// every call), this is storage hygiene: revoked sessions and
    /// sessions expired for longer than the grace period are dropped.
    pub async fn sweep(&self) -> Result<u64> {
        let cutoff = timestamp_after(-self.lifetime.grace_period);
        self.database.sweep_sessions(cutoff).await
    }
}

#[cfg(test)]
mod tests {
    use crate::models::EmailVerification;
    use crate::test::*;
    use crate::util::timestamp_after;
    use crate::Error;

    #[async_std::test]
    async fn success_login_and_validate() {
        let (core, _) = for_test();
        let sessions = core.sessions();

        core.credentials()
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        let session = sessions
            .login("EXAMPLE@validemail.com", "password_insecure", None)
            .await
            .unwrap();

        let account = sessions.validate(&session.token).await.unwrap();
        assert_eq!(account.email, "example@validemail.com");
    }

    #[async_std::test]
    async fn fail_invalid_credentials() {
        let (core, _) = for_test();
        let sessions = core.sessions();

        core.credentials()
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        assert_eq!(
            sessions
                .login("example@validemail.com", "wrong password", None)
                .await
                .unwrap_err(),
            Error::InvalidCredentials
        );

        // Unknown users read the same as a wrong password
        assert_eq!(
            sessions
                .login("unknown@validemail.com", "password_insecure", None)
                .await
                .unwrap_err(),
            Error::InvalidCredentials
        );
    }

    #[async_std::test]
    async fn fail_disabled_account() {
        let (core, _) = for_test();

        let mut account = core
            .credentials()
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        account.disabled = true;
        account.save(&core.database).await.unwrap();

        assert_eq!(
            core.sessions()
                .login("example@validemail.com", "password_insecure", None)
                .await
                .unwrap_err(),
            Error::DisabledAccount
        );
    }

    #[async_std::test]
    async fn fail_unverified_account() {
        let (core, _) = for_test();

        let mut account = core
            .credentials()
            .register("example@validemail.com".into(), "password_insecure".into())
            .await
            .unwrap();

        account.verification = EmailVerification::Unverified;
        account.save(&core.database).await.unwrap();

        assert_eq!(
            core.sessions()
                .login("example@validemail.com", "password_insecure", None)
                .await
                .unwrap_err(),
            Error::UnverifiedAccount
        );
    }

    #[async_std::test]
    async fn fail_unknown_token() {
        let (core, _) = for_test();

        assert_eq!(
            core.sessions().validate("does_not_exist").await.unwrap_err(),
            Error::SessionNotFound
        );
    }

    #[async_std::test]
    async fn logout_destroys_session() {
        let (core, session, _, _) = for_test_authenticated().await;
        let sessions = core.sessions();

        sessions.logout(&session.token).await.unwrap();

        assert_eq!(
            sessions.validate(&session.token).await.unwrap_err(),
            Error::SessionNotFound
        );
        assert_eq!(
            sessions.logout(&session.token).await.unwrap_err(),
            Error::SessionNotFound
        );
    }

    #[async_std::test]
    async fn expired_session_fails_validation() {
        let (core, session, _, _) = for_test_authenticated().await;

        let mut session = core.database.find_session(&session.id).await.unwrap();
        session.expires_at = timestamp_after(-10);
        core.database.save_session(&session).await.unwrap();

        assert_eq!(
            core.sessions().validate(&session.token).await.unwrap_err(),
            Error::SessionExpired
        );
    }

    #[async_std::test]
    async fn revoke_all_is_immediate() {
        let (core, session, account, _) = for_test_authenticated().await;
        let sessions = core.sessions();

        let mut tokens = vec![session.token];
        for _ in 1..=3 {
            tokens.push(
                sessions
                    .login("email@example.com", "password_insecure", None)
                    .await
                    .unwrap()
                    .token,
            );
        }

        sessions.revoke_all(&account.id).await.unwrap();

        for token in tokens {
            assert_eq!(
                sessions.validate(&token).await.unwrap_err(),
                Error::SessionRevoked
            );
        }
    }

    #[async_std::test]
    async fn sweep_removes_dead_sessions() {
        let (core, session, account, _) = for_test_authenticated().await;
        let sessions = core.sessions();

        // One expired beyond the grace period
        let mut expired = core.database.find_session(&session.id).await.unwrap();
        expired.expires_at = timestamp_after(-(core.config.sessions.grace_period + 10));
        core.database.save_session(&expired).await.unwrap();

        // One revoked
        let revoked = sessions
            .login("email@example.com", "password_insecure", None)
            .await
            .unwrap();
        sessions.revoke_all(&account.id).await.unwrap();

        // One live, issued after the revocation
        let live = sessions
            .login("email@example.com", "password_insecure", None)
            .await
            .unwrap();

        assert_eq!(sessions.sweep().await.unwrap(), 2);
        assert!(sessions.validate(&live.token).await.is_ok());
        assert_eq!(
            sessions.validate(&revoked.token).await.unwrap_err(),
            Error::SessionNotFound
        );
    }
}
