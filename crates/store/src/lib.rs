//! `stockroom-store` — persistence for the item catalog and user accounts.
//!
//! Two interchangeable backends sit behind the [`ItemStore`] and
//! [`CredentialStore`] traits: Postgres for real deployments and an
//! in-memory pair for tests and development runs.

pub mod credential_store;
pub mod error;
pub mod in_memory;
pub mod item_store;
pub mod postgres;
pub mod query;

pub use credential_store::{CredentialStore, NewUser, UserRecord};
pub use error::{StoreError, StoreResult};
pub use in_memory::{InMemoryCredentialStore, InMemoryItemStore};
pub use item_store::ItemStore;
pub use postgres::{DEFAULT_TIMEOUT, PgCredentialStore, PgItemStore, ensure_schema};
pub use query::{ItemQuery, SortDir, SortKey};

/// Categories seeded on a fresh install, in insertion order (ids 1..=N).
pub const DEFAULT_CATEGORIES: &[&str] = &[
    "Cables",
    "Peripherals",
    "Components",
    "Networking",
    "Consumables",
];
