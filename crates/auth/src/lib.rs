//! `stockroom-auth` — pure authentication/authorization boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod error;
pub mod password;
pub mod policy;
pub mod role;
pub mod token;

pub use error::AuthError;
pub use password::{PasswordHashError, PasswordHasher};
pub use policy::{Action, PolicyError, authorize};
pub use role::{Identity, Role};
pub use token::TokenSigner;
