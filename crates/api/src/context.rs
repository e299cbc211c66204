use stockroom_auth::{Identity, Role};
use stockroom_core::UserId;

/// Authenticated caller for the current request.
///
/// Inserted by the auth middleware and immutable for the life of the request.
/// The identity is re-resolved from the credential store on every request, so
/// role edits and account deletions take effect on the caller's next call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    identity: Identity,
}

impl CurrentUser {
    pub fn new(identity: Identity) -> Self {
        Self { identity }
    }

    pub fn user_id(&self) -> UserId {
        self.identity.user_id
    }

    pub fn username(&self) -> &str {
        &self.identity.username
    }

    pub fn role(&self) -> Role {
        self.identity.role
    }
}
