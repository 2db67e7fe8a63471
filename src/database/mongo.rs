use bson::{to_document, DateTime, Document};
use futures::stream::TryStreamExt;
use iso8601_timestamp::Timestamp;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    Collation, CollationStrength, FindOneAndUpdateOptions, FindOneOptions, ReturnDocument,
    UpdateOptions,
};
use std::ops::Deref;

use crate::{
    models::{Account, Session, VerificationRequest},
    Error, Result, Success,
};

use super::{definition::AbstractDatabase, Migration};

#[derive(Clone)]
pub struct MongoDb(pub mongodb::Database);

impl Deref for MongoDb {
    type Target = mongodb::Database;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

fn rfc3339_now() -> String {
    DateTime::now()
        .try_to_rfc3339_string()
        .expect("failed to convert to rfc3339 time string")
}

#[async_trait]
impl AbstractDatabase for MongoDb {
    /// Run a database migration
    async fn run_migration(&self, migration: Migration) -> Success {
        match migration {
            #[cfg(debug_assertions)]
            Migration::WipeAll => {
                // Drop the entire database
                self.drop().await.unwrap();
            }
            Migration::M2026_07_02EnsureUpToSpec => {
                if self
                    .collection::<Document>("verification_requests")
                    .list_index_names()
                    .await
                    .unwrap_or_default()
                    .contains(&"token".to_owned())
                {
                    return Ok(());
                }

                // Make sure all collections exist
                let list = self.list_collection_names().await.unwrap();
                let collections = ["accounts", "sessions", "verification_requests"];

                for name in collections {
                    if !list.contains(&name.to_string()) {
                        self.create_collection(name).await.unwrap();
                    }
                }

                // Setup index for `accounts`
                let col = self.collection::<Document>("accounts");
                col.drop_indexes().await.unwrap();

                self.run_command(doc! {
                    "createIndexes": "accounts",
                    "indexes": [
                        {
                            "key": {
                                "email_normalised": 1
                            },
                            "name": "email_normalised",
                            "unique": true,
                            "collation": {
                                "locale": "en",
                                "strength": 2
                            }
                        }
                    ]
                })
                .await
                .unwrap();

                // Setup index for `sessions`
                let col = self.collection::<Document>("sessions");
                col.drop_indexes().await.unwrap();

                self.run_command(doc! {
                    "createIndexes": "sessions",
                    "indexes": [
                        {
                            "key": {
                                "token": 1
                            },
                            "name": "token",
                            "unique": true
                        },
                        {
                            "key": {
                                "user_id": 1
                            },
                            "name": "user_id"
                        }
                    ]
                })
                .await
                .unwrap();

                // Setup index for `verification_requests`
                let col = self.collection::<Document>("verification_requests");
                col.drop_indexes().await.unwrap();

                self.run_command(doc! {
                    "createIndexes": "verification_requests",
                    "indexes": [
                        {
                            "key": {
                                "token": 1
                            },
                            "name": "token",
                            "unique": true
                        }
                    ]
                })
                .await
                .unwrap();
            }
        }

        Ok(())
    }

    /// Insert a new account if its email is not taken
    ///
    /// Uniqueness rides on the `email_normalised` index, a duplicate
    /// write error is the storage layer saying "taken".
    async fn insert_account(&self, account: &Account) -> Success {
        self.collection::<Account>("accounts")
            .insert_one(account)
            .await
            .map(|_| ())
            .map_err(|err| {
                if let ErrorKind::Write(WriteFailure::WriteError(write_error)) = &*err.kind {
                    if write_error.code == 11000 {
                        return Error::DuplicateAccount;
                    }
                }

                Error::DatabaseError {
                    operation: "insert_one",
                    with: "account",
                }
            })
    }

    /// Find account by id
    async fn find_account(&self, id: &str) -> Result<Account> {
        self.collection("accounts")
            .find_one(doc! {
                "_id": id
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "account",
            })?
            .ok_or(Error::AccountNotFound)
    }

    /// Find account by normalised email
    async fn find_account_by_normalised_email(
        &self,
        normalised_email: &str,
    ) -> Result<Option<Account>> {
        self.collection("accounts")
            .find_one(doc! {
                "email_normalised": normalised_email
            })
            .with_options(
                FindOneOptions::builder()
                    .collation(
                        Collation::builder()
                            .locale("en")
                            .strength(CollationStrength::Secondary)
                            .build(),
                    )
                    .build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "account",
            })
    }

    /// Save account
    async fn save_account(&self, account: &Account) -> Success {
        self.collection::<Account>("accounts")
            .update_one(
                doc! {
                    "_id": &account.id
                },
                doc! {
                    "$set": to_document(account).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "account",
                    })?
                },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "account",
            })
            .map(|_| ())
    }

    /// Save session
    async fn save_session(&self, session: &Session) -> Success {
        self.collection::<Session>("sessions")
            .update_one(
                doc! {
                    "_id": &session.id
                },
                doc! {
                    "$set": to_document(session).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "session",
                    })?,
                },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "session",
            })
            .map(|_| ())
    }

    /// Find session by id
    async fn find_session(&self, id: &str) -> Result<Session> {
        self.collection("sessions")
            .find_one(doc! {
                "_id": id
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "session",
            })?
            .ok_or(Error::SessionNotFound)
    }

    /// Find session by token
    async fn find_session_by_token(&self, token: &str) -> Result<Option<Session>> {
        self.collection("sessions")
            .find_one(doc! {
                "token": token
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "session",
            })
    }

    /// Find sessions by user id
    async fn find_sessions(&self, user_id: &str) -> Result<Vec<Session>> {
        self.collection::<Session>("sessions")
            .find(doc! {
                "user_id": user_id
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find",
                with: "sessions",
            })?
            .try_collect()
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "collect",
                with: "sessions",
            })
    }

    /// Delete session
    async fn delete_session(&self, id: &str) -> Success {
        self.collection::<Session>("sessions")
            .delete_one(doc! {
                "_id": id
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "delete_one",
                with: "session",
            })
            .map(|_| ())
    }

    /// Flag every session belonging to a user as revoked
    async fn revoke_all_sessions(&self, user_id: &str) -> Success {
        self.collection::<Session>("sessions")
            .update_many(
                doc! {
                    "user_id": user_id
                },
                doc! {
                    "$set": {
                        "revoked": true
                    }
                },
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "update_many",
                with: "sessions",
            })
            .map(|_| ())
    }

    /// Remove dead sessions from storage
    async fn sweep_sessions(&self, cutoff: Timestamp) -> Result<u64> {
        self.collection::<Session>("sessions")
            .delete_many(doc! {
                "$or": [
                    {
                        "revoked": true
                    },
                    {
                        "expires_at": {
                            "$lte": cutoff.format().to_string()
                        }
                    }
                ]
            })
            .await
            .map(|result| result.deleted_count)
            .map_err(|_| Error::DatabaseError {
                operation: "delete_many",
                with: "sessions",
            })
    }

    /// Store a verification request, displacing any outstanding one
    ///
    /// The composite `_id` makes this a single keyed upsert, so two
    /// racing `start` calls resolve to whichever write lands last.
    async fn replace_verification_request(&self, request: &VerificationRequest) -> Success {
        self.collection::<VerificationRequest>("verification_requests")
            .update_one(
                doc! {
                    "_id": &request.id
                },
                doc! {
                    "$set": to_document(request).map_err(|_| Error::DatabaseError {
                        operation: "to_document",
                        with: "verification_request",
                    })?,
                },
            )
            .with_options(UpdateOptions::builder().upsert(true).build())
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "upsert_one",
                with: "verification_request",
            })
            .map(|_| ())
    }

    /// Find verification request by token
    async fn find_verification_request(
        &self,
        token: &str,
    ) -> Result<Option<VerificationRequest>> {
        self.collection("verification_requests")
            .find_one(doc! {
                "token": token
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "verification_request",
            })
    }

    /// Consume a verification request
    async fn take_verification_request(&self, token: &str) -> Result<VerificationRequest> {
        let taken: Option<VerificationRequest> = self
            .collection("verification_requests")
            .find_one_and_update(
                doc! {
                    "token": token,
                    "consumed": false,
                    "expires_at": {
                        "$gte": rfc3339_now()
                    }
                },
                doc! {
                    "$set": {
                        "consumed": true
                    }
                },
            )
            .with_options(
                FindOneAndUpdateOptions::builder()
                    .return_document(ReturnDocument::After)
                    .build(),
            )
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one_and_update",
                with: "verification_request",
            })?;

        if let Some(request) = taken {
            return Ok(request);
        }

        // The swap failed, work out why
        match self
            .collection::<VerificationRequest>("verification_requests")
            .find_one(doc! {
                "token": token
            })
            .await
            .map_err(|_| Error::DatabaseError {
                operation: "find_one",
                with: "verification_request",
            })? {
            None => Err(Error::TokenNotFound),
            Some(request) if request.consumed => Err(Error::TokenAlreadyUsed),
            Some(_) => Err(Error::TokenExpired),
        }
    }
}
