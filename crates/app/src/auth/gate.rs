//! Role-based access gate.
//!
//! Handlers receive an explicit [`AuthContext`] instead of reading
//! authorization state off the request. Roles come from a fresh lookup
//! on every check, so a revoked role takes effect immediately.

use std::sync::Arc;

use tracing::warn;

use crate::{
    auth::errors::AccessError,
    domain::users::{UsersService, UsersServiceError, models::{Role, UserUuid}},
};

/// The authenticated caller as extracted upstream (session, token).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallerIdentity {
    pub user_uuid: UserUuid,
}

/// Per-request authorization context handed to handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    pub caller: CallerIdentity,
    pub role: Role,
}

/// Request coordinates, captured for the security audit log.
#[derive(Debug, Clone, Copy)]
pub struct RequestInfo<'a> {
    pub method: &'a str,
    pub path: &'a str,
}

/// Outcome of a successful gate pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// The route requires no role; there may be no caller at all.
    Public,
    Authorized(AuthContext),
}

#[derive(Clone)]
pub struct AccessGate {
    users: Arc<dyn UsersService>,
}

impl AccessGate {
    #[must_use]
    pub fn new(users: Arc<dyn UsersService>) -> Self {
        Self { users }
    }

    /// Checks the caller against the route's required roles.
    ///
    /// An empty `required` set short-circuits to [`Access::Public`]
    /// without touching the identity. Otherwise a missing identity is
    /// `Unauthorized` before any lookup, an unknown caller is
    /// `Unauthorized`, and a role outside the set is `Forbidden`.
    pub async fn authorize(
        &self,
        identity: Option<CallerIdentity>,
        required: &[Role],
        request: RequestInfo<'_>,
    ) -> Result<Access, AccessError> {
        if required.is_empty() {
            return Ok(Access::Public);
        }

        let Some(caller) = identity else {
            return Err(AccessError::Unauthorized);
        };

        let role = match self.users.get_role(caller.user_uuid).await {
            Ok(role) => role,
            Err(UsersServiceError::NotFound) => return Err(AccessError::Unauthorized),
            Err(error) => return Err(AccessError::Users(error)),
        };

        if !required.contains(&role) {
            warn!(
                caller = %caller.user_uuid,
                role = %role,
                method = request.method,
                path = request.path,
                "access denied; role not permitted"
            );

            return Err(AccessError::Forbidden);
        }

        Ok(Access::Authorized(AuthContext { caller, role }))
    }
}
