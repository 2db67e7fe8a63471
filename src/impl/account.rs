use crate::{
    models::{Account, EmailVerification},
    Database, Error, Success,
};

impl Account {
    /// Verify a user's password is correct
    pub fn verify_password(&self, plaintext_password: &str) -> Success {
        argon2::verify_encoded(&self.password, plaintext_password.as_bytes())
            .map(|v| {
                if v {
                    Ok(())
                } else {
                    Err(Error::InvalidCredentials)
                }
            })
            // To prevent user enumeration, we should ignore
            // the error and pretend the password is wrong.
            .map_err(|_| Error::InvalidCredentials)?
    }

    /// Whether the email address has been verified
    pub fn is_verified(&self) -> bool {
        matches!(self.verification, EmailVerification::Verified)
    }

    /// Save model
    pub async fn save(&self, database: &Database) -> Success {
        database.save_account(self).await
    }
}
