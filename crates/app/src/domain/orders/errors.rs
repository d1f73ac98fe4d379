//! Orders service errors.

use std::num::TryFromIntError;

use folio::{snapshot::SnapshotError, totals::TotalsError};
use sqlx::{
    Error,
    error::{DatabaseError, ErrorKind},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// The book already has a live line item in this order.
    #[error("book already exists in this order")]
    AlreadyExists,

    /// Order item absent, tombstoned, or owned by another user. Cross-user
    /// probes surface this same variant so item existence never leaks.
    #[error("order item not found")]
    NotFound,

    #[error("book not found")]
    BookNotFound,

    #[error("quantity must be at least 1")]
    InvalidQuantity,

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

impl OrdersServiceError {
    /// HTTP status the response envelope reports for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::AlreadyExists => 409,
            Self::NotFound | Self::BookNotFound | Self::InvalidReference => 404,
            Self::InvalidQuantity
            | Self::AmountOutOfRange
            | Self::MissingRequiredData
            | Self::InvalidData => 422,
            Self::Sql(_) => 500,
        }
    }
}

impl From<Error> for OrdersServiceError {
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

impl From<SnapshotError> for OrdersServiceError {
    fn from(error: SnapshotError) -> Self {
        match error {
            SnapshotError::InvalidQuantity => Self::InvalidQuantity,
            SnapshotError::Overflow => Self::AmountOutOfRange,
        }
    }
}

impl From<TotalsError> for OrdersServiceError {
    fn from(_: TotalsError) -> Self {
        Self::AmountOutOfRange
    }
}

impl From<TryFromIntError> for OrdersServiceError {
    fn from(_: TryFromIntError) -> Self {
        Self::AmountOutOfRange
    }
}
