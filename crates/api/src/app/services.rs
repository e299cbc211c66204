//! Service wiring: configuration, store backends, authenticator.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use stockroom_auth::{PasswordHasher, Role, TokenSigner};
use stockroom_store::{
    CredentialStore, DEFAULT_TIMEOUT, InMemoryCredentialStore, InMemoryItemStore, ItemStore,
    NewUser, PgCredentialStore, PgItemStore, ensure_schema,
};

use crate::authenticator::Authenticator;

/// Runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub token_secret: String,
    /// `Some` selects the Postgres backend; `None` the in-memory pair.
    pub database_url: Option<String>,
    pub store_timeout: Duration,
    /// Admin account seeded at startup if absent. `/register` is admin-gated,
    /// so a fresh install needs one seeded account to get started.
    pub bootstrap_admin: Option<(String, String)>,
}

impl AppConfig {
    /// Read configuration from the environment.
    ///
    /// `USE_PERSISTENT_STORES=true` selects Postgres (requires
    /// `DATABASE_URL`); otherwise stores are in-memory. `STORE_TIMEOUT_MS`
    /// overrides the per-operation store deadline.
    pub fn from_env() -> Self {
        let token_secret = std::env::var("TOKEN_SECRET").unwrap_or_else(|_| {
            tracing::warn!("TOKEN_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let use_persistent = std::env::var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);
        let database_url = use_persistent.then(|| {
            std::env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")
        });

        let store_timeout = std::env::var("STORE_TIMEOUT_MS")
            .ok()
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_TIMEOUT);

        let bootstrap_admin = match (
            std::env::var("BOOTSTRAP_ADMIN_USERNAME"),
            std::env::var("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Ok(username), Ok(password)) => Some((username, password)),
            _ => None,
        };

        Self {
            token_secret,
            database_url,
            store_timeout,
            bootstrap_admin,
        }
    }

    /// In-memory configuration for tests and local runs.
    pub fn in_memory(token_secret: impl Into<String>) -> Self {
        Self {
            token_secret: token_secret.into(),
            database_url: None,
            store_timeout: DEFAULT_TIMEOUT,
            bootstrap_admin: None,
        }
    }
}

/// Shared service handles for request handlers.
#[derive(Clone)]
pub struct AppServices {
    pub items: Arc<dyn ItemStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub authenticator: Arc<Authenticator>,
    pub hasher: PasswordHasher,
}

pub async fn build_services(config: &AppConfig) -> AppServices {
    let (items, credentials): (Arc<dyn ItemStore>, Arc<dyn CredentialStore>) =
        match &config.database_url {
            Some(url) => {
                let pool = PgPool::connect(url)
                    .await
                    .expect("failed to connect to Postgres");
                ensure_schema(&pool)
                    .await
                    .expect("failed to bootstrap schema");
                (
                    Arc::new(PgItemStore::new(pool.clone(), config.store_timeout)),
                    Arc::new(PgCredentialStore::new(pool, config.store_timeout)),
                )
            }
            None => (
                Arc::new(InMemoryItemStore::new()),
                Arc::new(InMemoryCredentialStore::new()),
            ),
        };

    let hasher = PasswordHasher::new();
    seed_bootstrap_admin(&*credentials, &hasher, config).await;

    let signer = TokenSigner::new(config.token_secret.clone());
    let authenticator = Arc::new(Authenticator::new(
        signer,
        hasher.clone(),
        credentials.clone(),
    ));

    AppServices {
        items,
        credentials,
        authenticator,
        hasher,
    }
}

/// Seed the configured admin, or a dev default on the in-memory backend.
///
/// Failures are logged, not fatal: a Postgres deployment whose admin already
/// exists (or whose operator seeds out of band) must still come up.
async fn seed_bootstrap_admin(
    credentials: &dyn CredentialStore,
    hasher: &PasswordHasher,
    config: &AppConfig,
) {
    let (username, password) = match &config.bootstrap_admin {
        Some((username, password)) => (username.clone(), password.clone()),
        None if config.database_url.is_none() => {
            tracing::warn!("no bootstrap admin configured; seeding dev default admin/admin");
            ("admin".to_string(), "admin".to_string())
        }
        None => return,
    };

    match credentials.find_by_username(&username).await {
        Ok(Some(_)) => return,
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "bootstrap admin lookup failed");
            return;
        }
    }

    let password_hash = match hasher.hash(&password) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "bootstrap admin password hashing failed");
            return;
        }
    };
    let user = NewUser {
        username: username.clone(),
        password_hash,
        role: Role::Admin,
    };
    match credentials.insert_user(&user).await {
        Ok(id) => tracing::info!(username = %username, user_id = %id, "seeded bootstrap admin"),
        Err(err) => tracing::error!(error = %err, "bootstrap admin insert failed"),
    }
}
