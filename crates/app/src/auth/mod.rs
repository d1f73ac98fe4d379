//! Authorization

mod errors;
mod gate;

pub use errors::AccessError;
pub use gate::{Access, AccessGate, AuthContext, CallerIdentity, RequestInfo};
