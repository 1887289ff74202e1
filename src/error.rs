// Application error taxonomy shared by every module.
//
// One enumerated kind set is used everywhere; the kind's code string is
// attached to each GraphQL error as the `code` extension.
use async_graphql::ErrorExtensions;
use thiserror::Error;

use crate::config;
use crate::database::DatabaseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Authentication,
    Authorization,
    InputValidation,
    NotFound,
    Database,
    Internal,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "AUTHENTICATION_ERROR",
            ErrorKind::Authorization => "AUTHORIZATION_ERROR",
            ErrorKind::InputValidation => "INPUT_VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND_ERROR",
            ErrorKind::Database => "DATABASE_ERROR",
            ErrorKind::Internal => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    InputValidation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Database(String),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn authentication(message: impl Into<String>) -> Self {
        AppError::Authentication(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        AppError::Authorization(message.into())
    }

    pub fn input_validation(message: impl Into<String>) -> Self {
        AppError::InputValidation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn database(message: impl Into<String>) -> Self {
        AppError::Database(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Authentication(_) => ErrorKind::Authentication,
            AppError::Authorization(_) => ErrorKind::Authorization,
            AppError::InputValidation(_) => ErrorKind::InputValidation,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Database(_) => ErrorKind::Database,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    fn is_internal(&self) -> bool {
        matches!(self.kind(), ErrorKind::Database | ErrorKind::Internal)
    }

    /// Message shown to the client. Database/internal detail is suppressed
    /// when `redact` is set; the full message still goes to the log.
    fn client_message(&self, redact: bool) -> String {
        if redact && self.is_internal() {
            "An error occurred while processing your request".to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<DatabaseError> for AppError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(sqlx::Error::RowNotFound) => {
                AppError::not_found("Record not found")
            }
            other => AppError::database(other.to_string()),
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => AppError::not_found("Record not found"),
            other => AppError::database(other.to_string()),
        }
    }
}

impl ErrorExtensions for AppError {
    fn extend(&self) -> async_graphql::Error {
        let redact = config::config().is_production();
        if self.is_internal() {
            tracing::error!(code = self.kind().code(), "{}", self);
        }
        async_graphql::Error::new(self.client_message(redact))
            .extend_with(|_, e| e.set("code", self.kind().code()))
    }
}
