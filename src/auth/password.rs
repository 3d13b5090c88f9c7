//! Plaintext passwords from forms and their bcrypt hashes.

use std::fmt::Display;

use bcrypt::{BcryptError, hash, verify};
use serde::{Deserialize, Serialize};

use crate::Error;

/// A password entered by a user that is known to be non-empty.
///
/// The password is never printed, [Display] shows a fixed mask instead.
#[derive(Clone, PartialEq)]
pub struct Password(String);

impl Password {
    /// Wrap `raw_password`.
    ///
    /// # Errors
    /// Returns [Error::EmptyPassword] if `raw_password` is empty or only whitespace.
    pub fn new(raw_password: &str) -> Result<Self, Error> {
        if raw_password.trim().is_empty() {
            return Err(Error::EmptyPassword);
        }

        Ok(Self(raw_password.to_owned()))
    }

    /// Wrap `raw_password` without checking it.
    pub fn new_unchecked(raw_password: &str) -> Self {
        Self(raw_password.to_owned())
    }
}

impl Display for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", str::repeat("*", 8))
    }
}

impl std::fmt::Debug for Password {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Password").field(&"********").finish()
    }
}

/// A salted bcrypt hash of a password.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// The bcrypt cost used in production.
    pub const DEFAULT_COST: u32 = bcrypt::DEFAULT_COST;

    /// Hash `password` with `cost` rounds of bcrypt.
    ///
    /// # Errors
    /// Returns [Error::HashingError] if bcrypt fails, e.g. for an invalid cost.
    pub fn new(password: &Password, cost: u32) -> Result<Self, Error> {
        hash(&password.0, cost)
            .map(Self)
            .map_err(|error| Error::HashingError(error.to_string()))
    }

    /// Wrap a hash that was read back from the database.
    pub fn new_unchecked(raw_password_hash: &str) -> Self {
        Self(raw_password_hash.to_owned())
    }

    /// Check whether `raw_password` matches this hash.
    pub fn verify(&self, raw_password: &str) -> Result<bool, BcryptError> {
        verify(raw_password, &self.0)
    }
}

impl AsRef<str> for PasswordHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for PasswordHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod password_tests {
    use crate::Error;

    use super::Password;

    #[test]
    fn new_fails_on_empty() {
        assert_eq!(Password::new(""), Err(Error::EmptyPassword));
        assert_eq!(Password::new(" \t\n"), Err(Error::EmptyPassword));
    }

    #[test]
    fn display_hides_password() {
        let password = Password::new("hunter2").unwrap();

        assert_eq!(password.to_string(), "********");
        assert!(!format!("{password:?}").contains("hunter2"));
    }
}
