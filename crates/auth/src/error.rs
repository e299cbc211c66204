//! Authentication error model.

use thiserror::Error;

/// Why a caller could not be authenticated.
///
/// Both variants map to a 401 at the HTTP boundary; they are kept apart so
/// responses can tell "no credential" from "bad credential".
#[derive(Debug, Error, Copy, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credential was presented, or the Authorization header is malformed.
    #[error("missing bearer token")]
    Unauthenticated,

    /// A credential was presented but does not check out.
    #[error("invalid credentials")]
    InvalidCredentials,
}
