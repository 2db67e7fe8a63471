use std::collections::HashSet;

use crate::{Error, Result};

/// Password acceptance policy
#[derive(Default, Serialize, Deserialize, Clone)]
pub enum PasswordScanning {
    /// Accept any password
    #[default]
    None,
    /// Enforce a minimum length
    MinimumLength { length: usize },
    /// Reject passwords found on a custom block list
    Custom { passwords: HashSet<String> },
}

impl PasswordScanning {
    /// Check whether a password can be used
    pub fn assert_safe(&self, password: &str) -> Result<()> {
        match self {
            PasswordScanning::None => Ok(()),
            PasswordScanning::MinimumLength { length } => {
                if password.len() < *length {
                    Err(Error::ShortPassword)
                } else {
                    Ok(())
                }
            }
            PasswordScanning::Custom { passwords } => {
                if password.len() < 8 {
                    Err(Error::ShortPassword)
                } else if passwords.contains(password) {
                    Err(Error::CompromisedPassword)
                } else {
                    Ok(())
                }
            }
        }
    }
}
