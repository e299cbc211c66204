//! Credential resolution: bearer tokens and username/password pairs.

use std::sync::Arc;

use stockroom_auth::{AuthError, Identity, PasswordHashError, PasswordHasher, TokenSigner};
use stockroom_store::{CredentialStore, StoreError, UserRecord};

/// Why a caller could not be resolved to an identity.
///
/// `Auth` maps to 401; `Store`/`Password` are infrastructure failures and map
/// to 5xx.
#[derive(Debug, thiserror::Error)]
pub enum AuthenticateError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Password(#[from] PasswordHashError),
}

/// Resolves credentials to identities.
///
/// The role and user id always come from the credential store at request
/// time, never from the token, so a demoted or deleted account cannot keep
/// acting under a stale token.
#[derive(Clone)]
pub struct Authenticator {
    signer: TokenSigner,
    hasher: PasswordHasher,
    credentials: Arc<dyn CredentialStore>,
}

impl Authenticator {
    pub fn new(
        signer: TokenSigner,
        hasher: PasswordHasher,
        credentials: Arc<dyn CredentialStore>,
    ) -> Self {
        Self {
            signer,
            hasher,
            credentials,
        }
    }

    /// Validate a bearer token and re-resolve the account behind it.
    pub async fn authenticate(&self, token: &str) -> Result<Identity, AuthenticateError> {
        let username = self.signer.verify(token)?;
        let user = self
            .credentials
            .find_by_username(&username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        Ok(identity(user))
    }

    /// Check a username/password pair and mint a fresh token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(Identity, String), AuthenticateError> {
        let user = self
            .credentials
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !self.hasher.verify(password, &user.password_hash)? {
            return Err(AuthError::InvalidCredentials.into());
        }
        let token = self.signer.issue(&user.username);
        Ok((identity(user), token))
    }
}

fn identity(user: UserRecord) -> Identity {
    Identity {
        user_id: user.user_id,
        username: user.username,
        role: user.role,
    }
}
