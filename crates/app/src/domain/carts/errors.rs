//! Carts service errors.

use std::num::TryFromIntError;

use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// The book is already in this cart.
    #[error("book already exists in this cart")]
    AlreadyExists,

    /// Cart item absent or owned by another user. Cross-user probes
    /// surface this same variant so item existence never leaks.
    #[error("cart item not found")]
    NotFound,

    #[error("book not found")]
    BookNotFound,

    #[error("amount out of range")]
    AmountOutOfRange,

    #[error("related resource not found")]
    InvalidReference,

    #[error("missing required data")]
    MissingRequiredData,

    #[error("invalid data")]
    InvalidData,

    #[error("storage error")]
    Sql(#[source] Error),
}

impl CartsServiceError {
    /// HTTP status the response envelope reports for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::AlreadyExists => 409,
            Self::NotFound | Self::BookNotFound | Self::InvalidReference => 404,
            Self::AmountOutOfRange | Self::MissingRequiredData | Self::InvalidData => 422,
            Self::Sql(_) => 500,
        }
    }
}

impl From<Error> for CartsServiceError {
    fn from(error: Error) -> Self {
        if matches!(error, Error::RowNotFound) {
            return Self::NotFound;
        }

        match error.as_database_error().map(DatabaseError::kind) {
            Some(ErrorKind::UniqueViolation) => Self::AlreadyExists,
            Some(ErrorKind::ForeignKeyViolation) => Self::InvalidReference,
            Some(ErrorKind::NotNullViolation) => Self::MissingRequiredData,
            Some(ErrorKind::CheckViolation) => Self::InvalidData,
            Some(ErrorKind::Other | _) | None => Self::Sql(error),
        }
    }
}

impl From<TryFromIntError> for CartsServiceError {
    fn from(_: TryFromIntError) -> Self {
        Self::AmountOutOfRange
    }
}
