use std::error::Error as StdError;

use thiserror::Error;

use crate::{
    application::{auth::AuthError, pagination::PaginationError, repos::RepoError},
    domain::error::DomainError,
    infra::error::InfraError,
};

/// Collected error chain for logs; never shown to callers.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub kind: ErrorKind,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, kind: ErrorKind, error: &dyn StdError) -> Self {
        let mut messages = vec![error.to_string()];
        let mut current = error.source();
        while let Some(inner) = current {
            messages.push(inner.to_string());
            current = inner.source();
        }
        Self {
            source,
            kind,
            messages,
        }
    }
}

/// User-visible classification of an [`AppError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Invalid,
    Unauthorized,
    Conflict,
    Unavailable,
    Internal,
}

impl ErrorKind {
    pub fn public_message(self) -> &'static str {
        match self {
            ErrorKind::NotFound => "Resource not found",
            ErrorKind::Invalid => "Request could not be processed",
            ErrorKind::Unauthorized => "Authentication required",
            ErrorKind::Conflict => "Resource already exists",
            ErrorKind::Unavailable => "Service temporarily unavailable",
            ErrorKind::Internal => "Unexpected error occurred",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Pagination(#[from] PaginationError),
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(_) | AppError::Pagination(_) => ErrorKind::Invalid,
            AppError::Repo(RepoError::NotFound) => ErrorKind::NotFound,
            AppError::Repo(RepoError::Duplicate { .. }) => ErrorKind::Conflict,
            AppError::Repo(RepoError::InvalidInput { .. })
            | AppError::Repo(RepoError::Integrity { .. }) => ErrorKind::Invalid,
            AppError::Repo(RepoError::Timeout) | AppError::Repo(RepoError::Cache(_)) => {
                ErrorKind::Unavailable
            }
            AppError::Repo(RepoError::Persistence(_)) => ErrorKind::Internal,
            AppError::Auth(AuthError::InvalidCredentials)
            | AppError::Auth(AuthError::InvalidToken) => ErrorKind::Unauthorized,
            AppError::Auth(AuthError::Backend(_)) => ErrorKind::Internal,
            AppError::Infra(InfraError::Database { .. })
            | AppError::Infra(InfraError::Cache { .. }) => ErrorKind::Unavailable,
            AppError::Infra(_) | AppError::Unexpected(_) => ErrorKind::Internal,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn public_message(&self) -> &'static str {
        self.kind().public_message()
    }

    pub fn report(&self, source: &'static str) -> ErrorReport {
        ErrorReport::from_error(source, self.kind(), self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_not_found_keeps_its_identity() {
        let err = AppError::from(RepoError::NotFound);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert_eq!(err.public_message(), "Resource not found");
    }

    #[test]
    fn persistence_failures_do_not_leak_detail() {
        let err = AppError::from(RepoError::from_persistence("relation \"posts\" does not exist"));
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.public_message(), "Unexpected error occurred");
        assert!(err.to_string().contains("relation"));
    }

    #[test]
    fn validation_and_auth_errors_are_classified() {
        let invalid = AppError::from(DomainError::validation("title", "is required"));
        assert_eq!(invalid.kind(), ErrorKind::Invalid);

        let unauthorized = AppError::from(AuthError::InvalidCredentials);
        assert_eq!(unauthorized.kind(), ErrorKind::Unauthorized);

        let conflict = AppError::from(RepoError::Duplicate {
            constraint: "users_email_key".to_string(),
        });
        assert_eq!(conflict.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn report_collects_messages() {
        let err = AppError::from(RepoError::Timeout);
        let report = err.report("application::error::tests");
        assert_eq!(report.kind, ErrorKind::Unavailable);
        assert_eq!(report.messages, vec!["database timeout".to_string()]);
    }
}
