//! User account repository seam.

use async_trait::async_trait;

use stockroom_auth::Role;
use stockroom_core::UserId;

use crate::error::StoreResult;

/// A stored user account.
///
/// `password_hash` is the encoded argon2 string. It stays inside the service
/// boundary and is never serialized onto the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserRecord {
    pub user_id: UserId,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Input for creating an account. The password is already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
}

/// Persistence seam for user accounts and credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Insert a new account. `DuplicateUsername` if the name is taken.
    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId>;

    /// All accounts, ordered by user id ascending.
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>>;

    /// Change an account's role. `NotFound` if the id is absent.
    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<()>;

    /// Delete an account. `NotFound` if the id is absent.
    async fn delete_user(&self, id: UserId) -> StoreResult<()>;
}
