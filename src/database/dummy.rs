use iso8601_timestamp::Timestamp;

use crate::{
    models::{Account, Session, VerificationRequest},
    Error, Result, Success,
};

use futures::lock::Mutex;
use std::collections::HashMap;
use std::sync::Arc;

use super::{definition::AbstractDatabase, Migration};

/// In-memory storage backend
///
/// Every operation takes the table mutex for its whole duration, which
/// gives the same per-key atomicity the real backends get from their
/// put-if-absent and compare-and-swap primitives.
#[derive(Default, Clone)]
pub struct DummyDb {
    pub accounts: Arc<Mutex<HashMap<String, Account>>>,
    pub sessions: Arc<Mutex<HashMap<String, Session>>>,
    pub requests: Arc<Mutex<HashMap<String, VerificationRequest>>>,
}

#[async_trait]
impl AbstractDatabase for DummyDb {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success {
        println!("skip migration {:?}", migration);
        Ok(())
    }

    /// Insert a new account if its email is not taken
    async fn insert_account(&self, account: &Account) -> Success {
        let mut accounts = self.accounts.lock().await;

        if accounts.values().any(|existing| {
            existing
                .email_normalised
                .eq_ignore_ascii_case(&account.email_normalised)
        }) {
            return Err(Error::DuplicateAccount);
        }

        accounts.insert(account.id.to_string(), account.clone());
        Ok(())
    }

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account> {
        let accounts = self.accounts.lock().await;
        accounts.get(id).cloned().ok_or(Error::AccountNotFound)
    }

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>> {
        let accounts = self.accounts.lock().await;
        Ok(accounts
            .values()
            .find(|account| {
                account
                    .email_normalised
                    .eq_ignore_ascii_case(normalised_email)
            })
            .cloned())
    }

    /// Save account
    async fn save_account(&self, account: &Account) -> Success {
        let mut accounts = self.accounts.lock().await;
        accounts.insert(account.id.to_string(), account.clone());
        Ok(())
    }

    /// Save session
    async fn save_session(&self, session: &Session) -> Success {
        let mut sessions = self.sessions.lock().await;
        sessions.insert(session.id.to_string(), session.clone());
        Ok(())
    }

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session> {
        let sessions = self.sessions.lock().await;
        sessions.get(id).cloned().ok_or(Error::SessionNotFound)
    }

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .values()
            .find(|session| session.token == token)
            .cloned())
    }

    /// Find sessions by user id
    async fn find_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        let sessions = self.sessions.lock().await;
        Ok(sessions
            .values()
            .filter(|session| session.user_id == user_id)
            .cloned()
            .collect())
    }

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success {
        let mut sessions = self.sessions.lock().await;
        if sessions.remove(id).is_some() {
            Ok(())
        } else {
            Err(Error::SessionNotFound)
        }
    }

    /// Flag every session belonging to a user as revoked
    async fn revoke_all_sessions(&self, user_id: &str) -> Success {
        let mut sessions = self.sessions.lock().await;
        for session in sessions.values_mut() {
            if session.user_id == user_id {
                session.revoked = true;
            }
        }

        Ok(())
    }

    /// Remove dead sessions from storage
    async fn sweep_sessions(&self, cutoff: Timestamp) -> Result<u64> {
        let mut sessions = self.sessions.lock().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.revoked && session.expires_at > cutoff);
        Ok((before - sessions.len()) as u64)
    }

    /// Store a verification request, displacing any outstanding one
    async fn replace_verification_request(&self, request: &VerificationRequest) -> Success {
        let mut requests = self.requests.lock().await;
        requests.insert(request.id.to_string(), request.clone());
        Ok(())
    }

    /// Find verification request by token
    async fn find_verification_request(
        &self,
        token: &str,
    ) -> Result<Option<VerificationRequest>> {
        let requests = self.requests.lock().await;
        Ok(requests
            .values()
            .find(|request| request.token == token)
            .cloned())
    }

    /// Consume a verification request
    async fn take_verification_request(&self, token: &str) -> Result<VerificationRequest> {
        let mut requests = self.requests.lock().await;
        let request = requests
            .values_mut()
            .find(|request| request.token == token)
            .ok_or(Error::TokenNotFound)?;

        if request.consumed {
            return Err(Error::TokenAlreadyUsed);
        }

        if request.is_expired() {
            return Err(Error::TokenExpired);
        }

        request.consumed = true;
        Ok(request.clone())
    }
}
