#[macro_use]
extern crate serde;
#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate async_trait;
#[macro_use]
extern crate nanoid;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_json;

#[cfg(feature = "database-mongodb")]
#[macro_use]
extern crate bson;

mod result;
pub use result::*;

pub mod config;
pub mod database;
pub mod events;
pub mod r#impl;
pub mod logic;
pub mod mailer;
pub mod models;
pub mod util;


pub use config::Config;
pub use database::{Database, Migration};
pub use events::LoginEvent;
pub use logic::{
    CredentialStore, Delivery, SessionManager, StartedVerification, VerificationCoordinator,
};
pub use mailer::Mailer;

use config::EmailVerificationConfig;
use models::{Account, VerificationPurpose};

use async_std::channel::Sender;

/// Login core state
///
/// Holds the collaborators every component is wired with: configuration,
/// the storage layer and the notification sink.
#[derive(Default, Clone)]
pub struct LoginCore {
    pub config: Config,
    pub database: Database,
    pub mailer: Mailer,
    pub event_channel: Option<Sender<LoginEvent>>,
}

impl LoginCore {
    pub fn new(config: Config, database: Database, mailer: Mailer) -> LoginCore {
        LoginCore {
            config,
            database,
            mailer,
            event_channel: None,
        }
    }

    /// Credential store wired to this state
    pub fn credentials(&self) -> CredentialStore {
        CredentialStore::new(
            self.database.clone(),
            self.config.password_scanning.clone(),
            self.event_channel.clone(),
        )
    }

    /// Session manager wired to this state
    pub fn sessions(&self) -> SessionManager {
        SessionManager::new(
            self.credentials(),
            self.database.clone(),
            self.config.sessions.clone(),
            self.event_channel.clone(),
        )
    }

    /// Verification workflow coordinator wired to this state
    pub fn verification(&self) -> VerificationCoordinator {
        VerificationCoordinator::new(
            self.database.clone(),
            self.mailer.clone(),
            self.sessions(),
            self.config.email_verification.clone(),
            self.event_channel.clone(),
        )
    }

    /// Register a new account and, if verification is enabled,
    /// kick off the email verification workflow
    pub async fn create_account(&self, email: String, password: String) -> Result<Account> {
        let account = self.credentials().register(email, password).await?;

        if let EmailVerificationConfig::Enabled { .. } = self.config.email_verification {
            self.verification()
                .start(&account.id, VerificationPurpose::EmailVerify)
                .await?;

            // Pick up the verification status written by the workflow
            return self.database.find_account(&account.id).await;
        }

        Ok(account)
    }

    /// Soft-deactivate an account and revoke everything it can log in with
    pub async fn disable_account(&self, account_id: &str) -> Success {
        self.credentials().deactivate(account_id).await?;
        self.sessions().revoke_all(account_id).await
    }

    pub async fn publish_event(&self, event: LoginEvent) {
        events::publish(&self.event_channel, event).await
    }
}
