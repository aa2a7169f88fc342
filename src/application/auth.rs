//! Capabilities the user service needs from credential and token backends.
//!
//! Hash algorithms and token formats live behind these traits; this crate only
//! ships test doubles for them.

use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("auth backend failure: {0}")]
    Backend(String),
}

impl AuthError {
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend(message.into())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenParams {
    pub user_id: Uuid,
    pub expires_in: Duration,
}

pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plain: &str) -> Result<String, AuthError>;

    /// `Err(AuthError::InvalidCredentials)` when `plain` does not match `hash`.
    fn verify(&self, hash: &str, plain: &str) -> Result<(), AuthError>;
}

pub trait TokenAuthority: Send + Sync {
    fn issue(&self, params: TokenParams) -> Result<String, AuthError>;

    fn parse(&self, token: &str) -> Result<Uuid, AuthError>;
}
