use iso8601_timestamp::Timestamp;

use crate::{
    models::{Account, Session, VerificationRequest},
    Result, Success,
};

use super::Migration;

/// Storage collaborator
///
/// Mutations are atomic with respect to their key. The put-if-absent
/// and compare-and-swap operations below are the durability boundary
/// for every cross-request invariant; components hold no locks of
/// their own.
#[async_trait]
pub trait AbstractDatabase: std::marker::Sync {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success;

    /// Insert a new account if its email is not taken (put-if-absent)
    async fn insert_account(&self, account: &Account) -> Success;

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account>;

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>>;

    /// Save account
    async fn save_account(&self, account: &Account) -> Success;

    /// Save session
    async fn save_session(&self, session: &Session) -> Success;

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session>;

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>>;

    /// Find sessions by user id
    async fn find_sessions(&self, user_id: &str) -> Result<Vec<Session>>;

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success;

    /// Flag every session belonging to a user as revoked
    async fn revoke_all_sessions(&self, user_id: &str) -> Success;

    /// Remove dead sessions from storage
    ///
    /// Deletes revoked sessions and sessions that expired before the
    /// cutoff, returning how many were removed.
    async fn sweep_sessions(&self, cutoff: Timestamp) -> Result<u64>;

    /// Store a verification request, displacing any outstanding request
    /// for the same (account, purpose) pair in a single atomic write
    async fn replace_verification_request(&self, request: &VerificationRequest) -> Success;

    /// Find verification request by token
    async fn find_verification_request(&self, token: &str)
        -> Result<Option<VerificationRequest>>;

    /// Consume a verification request (compare-and-swap on the consumed flag)
    ///
    /// Atomically marks an unconsumed, unexpired request as consumed and
    /// returns it. This is where the single-use guarantee lives.
    async fn take_verification_request(&self, token: &str) -> Result<VerificationRequest>;
}
