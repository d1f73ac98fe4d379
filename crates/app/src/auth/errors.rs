//! Authorization errors.

use thiserror::Error;

use crate::domain::users::UsersServiceError;

#[derive(Debug, Error)]
pub enum AccessError {
    /// No usable identity: the request carried none, or the caller no
    /// longer exists.
    #[error("unauthorized")]
    Unauthorized,

    /// Authenticated, but the caller's role is not in the allowed set.
    #[error("forbidden")]
    Forbidden,

    #[error("role lookup failed")]
    Users(#[source] UsersServiceError),
}

impl AccessError {
    /// HTTP status the response envelope reports for this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
            Self::Users(_) => 500,
        }
    }
}
