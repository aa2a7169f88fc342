//! Account use cases: registration, sign-in and profile management.

use std::{sync::Arc, time::Duration};

use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::application::auth::{AuthError, PasswordHasher, TokenAuthority, TokenParams};
use crate::application::error::AppError;
use crate::application::repos::{RepoError, UsersRepo};
use crate::domain::entities::{UserProfile, UserRecord, stored_now};
use crate::domain::validation::{validate_email, validate_password, validate_username};

#[derive(Debug, Clone)]
pub struct SignUpInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct SignInInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct UpdateUserInput {
    pub id: Uuid,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tokens {
    pub access_token: String,
}

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UsersRepo>,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenAuthority>,
    token_ttl: Duration,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UsersRepo>,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenAuthority>,
        token_ttl: Duration,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
            token_ttl,
        }
    }

    pub async fn sign_up(&self, input: SignUpInput) -> Result<UserProfile, AppError> {
        validate_email(&input.email)?;
        validate_password(&input.password)?;

        let now = stored_now();
        let password_hash = self.hasher.hash(&input.password)?;
        let username = format!("Username{}", now.unix_timestamp());
        let user = UserRecord::new(input.email, username, password_hash, now);

        self.repo.create(&user).await?;
        info!(
            target = "application::users",
            user_id = %user.id,
            "Registered user"
        );
        Ok(user.self_profile())
    }

    /// Unknown emails and wrong passwords are indistinguishable to the caller.
    pub async fn sign_in(&self, input: SignInInput) -> Result<Tokens, AppError> {
        let user = match self.repo.find_by_email(&input.email).await {
            Ok(user) => user,
            Err(RepoError::NotFound) => return Err(AuthError::InvalidCredentials.into()),
            Err(err) => return Err(err.into()),
        };

        if let Err(err) = self.hasher.verify(&user.password_hash, &input.password) {
            warn!(
                target = "application::users",
                user_id = %user.id,
                "Rejected sign-in"
            );
            return Err(err.into());
        }

        let access_token = self.tokens.issue(TokenParams {
            user_id: user.id,
            expires_in: self.token_ttl,
        })?;
        Ok(Tokens { access_token })
    }

    pub fn authenticate(&self, token: &str) -> Result<Uuid, AppError> {
        Ok(self.tokens.parse(token)?)
    }

    /// Profile of another user; the email address is withheld.
    pub async fn find(&self, id: Uuid) -> Result<UserProfile, AppError> {
        Ok(self.repo.find(id).await?.public_profile())
    }

    pub async fn find_self(&self, id: Uuid) -> Result<UserProfile, AppError> {
        Ok(self.repo.find(id).await?.self_profile())
    }

    pub async fn update(&self, input: UpdateUserInput) -> Result<UserProfile, AppError> {
        validate_username(&input.username)?;

        let mut user = self.repo.find(input.id).await?;
        user.username = input.username;
        user.touch(stored_now());

        self.repo.update(&user).await?;
        Ok(user.self_profile())
    }
}
