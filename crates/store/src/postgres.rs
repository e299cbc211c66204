//! Postgres-backed stores.
//!
//! ## Error mapping
//!
//! | Database condition | `StoreError` |
//! |--------------------|--------------|
//! | `23503` foreign key violation | `UnknownCategory` (the only FK is `items.category_id`) |
//! | `23505` unique violation | `DuplicateUsername` (the only plain unique index is `users.username`) |
//! | other database errors | `Backend` |
//! | deadline exceeded | `Timeout` |
//! | undecodable row | `Corrupt` |
//!
//! Every operation runs under [`tokio::time::timeout`] so a stalled database
//! surfaces as a typed error instead of a hung request.

use std::future::Future;
use std::time::Duration;

use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};
use tracing::instrument;

use stockroom_auth::Role;
use stockroom_core::{CategoryId, ItemId, UserId};
use stockroom_inventory::{Item, ItemDraft, ItemPatch};

use crate::DEFAULT_CATEGORIES;
use crate::credential_store::{CredentialStore, NewUser, UserRecord};
use crate::error::{StoreError, StoreResult};
use crate::item_store::ItemStore;
use crate::query::{ItemQuery, SELECT_ITEMS};

/// Per-operation deadline applied when the configuration does not override it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Run `fut` under the store deadline, folding sqlx failures into
/// [`StoreError`]. `operation` labels the failure for logs.
async fn run_with_timeout<T, F>(deadline: Duration, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = Result<T, sqlx::Error>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(map_sqlx_error(operation, err)),
        Err(_) => Err(StoreError::Timeout(deadline)),
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "23503" => return StoreError::UnknownCategory,
                    "23505" => return StoreError::DuplicateUsername,
                    _ => {}
                }
            }
            StoreError::backend(anyhow::anyhow!(
                "database error in {operation}: {}",
                db_err.message()
            ))
        }
        other => StoreError::backend(anyhow::anyhow!("sqlx error in {operation}: {other}")),
    }
}

/// Create the schema if it does not exist and seed the default categories on
/// an empty install.
///
/// Statements run one at a time; the pool prepares each as a single
/// statement.
pub async fn ensure_schema(pool: &PgPool) -> StoreResult<()> {
    let statements = [
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            category_id BIGSERIAL PRIMARY KEY,
            category_name TEXT NOT NULL
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS items (
            item_id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            category_id BIGINT NOT NULL REFERENCES categories (category_id),
            quantity BIGINT NOT NULL DEFAULT 0,
            min_quantity BIGINT NOT NULL DEFAULT 0,
            cost NUMERIC(12, 2) NOT NULL DEFAULT 0,
            price NUMERIC(12, 2) NOT NULL DEFAULT 0,
            location TEXT NOT NULL DEFAULT '',
            vendor TEXT NOT NULL DEFAULT ''
        )
        "#,
        r#"
        CREATE TABLE IF NOT EXISTS users (
            user_id BIGSERIAL PRIMARY KEY,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL
        )
        "#,
    ];
    for statement in statements {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|err| map_sqlx_error("ensure_schema", err))?;
    }

    let count: i64 = sqlx::query("SELECT COUNT(*) AS total FROM categories")
        .fetch_one(pool)
        .await
        .map_err(|err| map_sqlx_error("count_categories", err))?
        .try_get("total")
        .map_err(|err| StoreError::corrupt(format!("failed to read category count: {err}")))?;
    if count == 0 {
        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO categories (category_name) VALUES ($1)")
                .bind(*name)
                .execute(pool)
                .await
                .map_err(|err| map_sqlx_error("seed_categories", err))?;
        }
        tracing::info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
    }
    Ok(())
}

/// Raw item row as selected by [`SELECT_ITEMS`].
#[derive(Debug)]
struct ItemRow {
    item_id: i64,
    name: String,
    category_id: i64,
    category_name: String,
    quantity: i64,
    min_quantity: i64,
    cost: Decimal,
    price: Decimal,
    location: String,
    vendor: String,
}

impl<'r> FromRow<'r, PgRow> for ItemRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(ItemRow {
            item_id: row.try_get("item_id")?,
            name: row.try_get("name")?,
            category_id: row.try_get("category_id")?,
            category_name: row.try_get("category_name")?,
            quantity: row.try_get("quantity")?,
            min_quantity: row.try_get("min_quantity")?,
            cost: row.try_get("cost")?,
            price: row.try_get("price")?,
            location: row.try_get("location")?,
            vendor: row.try_get("vendor")?,
        })
    }
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Item {
            item_id: ItemId::new(row.item_id),
            name: row.name,
            category_id: CategoryId::new(row.category_id),
            category_name: row.category_name,
            quantity: row.quantity,
            min_quantity: row.min_quantity,
            cost: row.cost,
            price: row.price,
            location: row.location,
            vendor: row.vendor,
        }
    }
}

fn decode_item(row: &PgRow) -> StoreResult<Item> {
    let row = ItemRow::from_row(row)
        .map_err(|err| StoreError::corrupt(format!("failed to decode item row: {err}")))?;
    Ok(row.into())
}

/// Item store over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgItemStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgItemStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait::async_trait]
impl ItemStore for PgItemStore {
    #[instrument(skip(self), err)]
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let sql = format!("{SELECT_ITEMS} WHERE items.item_id = $1");
        let row = run_with_timeout(self.timeout, "get_item", async {
            sqlx::query(&sql)
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
        })
        .await?;
        row.map(|row| decode_item(&row)).transpose()
    }

    #[instrument(skip(self, query), err)]
    async fn list(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        let (sql, params) = query.to_sql();
        let rows = run_with_timeout(self.timeout, "list_items", async {
            let mut fetch = sqlx::query(&sql);
            for param in &params {
                fetch = fetch.bind(param.as_str());
            }
            fetch.fetch_all(&self.pool).await
        })
        .await?;

        let mut items = Vec::with_capacity(rows.len());
        for row in rows {
            items.push(decode_item(&row)?);
        }
        Ok(items)
    }

    #[instrument(skip(self, draft), err)]
    async fn create(&self, draft: &ItemDraft) -> StoreResult<ItemId> {
        let row = run_with_timeout(self.timeout, "create_item", async {
            sqlx::query(
                r#"
                INSERT INTO items (name, category_id, quantity, min_quantity, cost, price, location, vendor)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                RETURNING item_id
                "#,
            )
            .bind(&draft.name)
            .bind(draft.category_id.as_i64())
            .bind(draft.quantity)
            .bind(draft.min_quantity)
            .bind(draft.cost)
            .bind(draft.price)
            .bind(&draft.location)
            .bind(&draft.vendor)
            .fetch_one(&self.pool)
            .await
        })
        .await?;

        let id: i64 = row
            .try_get("item_id")
            .map_err(|err| StoreError::corrupt(format!("failed to read new item id: {err}")))?;
        Ok(ItemId::new(id))
    }

    #[instrument(skip(self, patch), err)]
    async fn update(&self, id: ItemId, patch: &ItemPatch) -> StoreResult<()> {
        let exists = run_with_timeout(self.timeout, "check_item", async {
            sqlx::query("SELECT 1 FROM items WHERE item_id = $1")
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
        })
        .await?;
        if exists.is_none() {
            return Err(StoreError::NotFound);
        }
        if patch.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new("UPDATE items SET ");
        {
            let mut fields = builder.separated(", ");
            if let Some(name) = &patch.name {
                fields.push("name = ").push_bind_unseparated(name.as_str());
            }
            if let Some(category_id) = patch.category_id {
                fields
                    .push("category_id = ")
                    .push_bind_unseparated(category_id.as_i64());
            }
            if let Some(quantity) = patch.quantity {
                fields.push("quantity = ").push_bind_unseparated(quantity);
            }
            if let Some(min_quantity) = patch.min_quantity {
                fields
                    .push("min_quantity = ")
                    .push_bind_unseparated(min_quantity);
            }
            if let Some(cost) = patch.cost {
                fields.push("cost = ").push_bind_unseparated(cost);
            }
            if let Some(price) = patch.price {
                fields.push("price = ").push_bind_unseparated(price);
            }
            if let Some(location) = &patch.location {
                fields
                    .push("location = ")
                    .push_bind_unseparated(location.as_str());
            }
            if let Some(vendor) = &patch.vendor {
                fields
                    .push("vendor = ")
                    .push_bind_unseparated(vendor.as_str());
            }
        }
        builder.push(" WHERE item_id = ").push_bind(id.as_i64());

        let result = run_with_timeout(self.timeout, "update_item", async {
            builder.build().execute(&self.pool).await
        })
        .await?;
        if result.rows_affected() == 0 {
            // Row vanished between the existence check and the update.
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        let result = run_with_timeout(self.timeout, "delete_item", async {
            sqlx::query("DELETE FROM items WHERE item_id = $1")
                .bind(id.as_i64())
                .execute(&self.pool)
                .await
        })
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

/// Raw user row.
#[derive(Debug)]
struct UserRow {
    user_id: i64,
    username: String,
    password_hash: String,
    role: String,
}

impl<'r> FromRow<'r, PgRow> for UserRow {
    fn from_row(row: &'r PgRow) -> Result<Self, sqlx::Error> {
        Ok(UserRow {
            user_id: row.try_get("user_id")?,
            username: row.try_get("username")?,
            password_hash: row.try_get("password_hash")?,
            role: row.try_get("role")?,
        })
    }
}

impl TryFrom<UserRow> for UserRecord {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        let role = row.role.parse::<Role>().map_err(|_| {
            StoreError::corrupt(format!("unknown role '{}' for user {}", row.role, row.user_id))
        })?;
        Ok(UserRecord {
            user_id: UserId::new(row.user_id),
            username: row.username,
            password_hash: row.password_hash,
            role,
        })
    }
}

fn decode_user(row: &PgRow) -> StoreResult<UserRecord> {
    let row = UserRow::from_row(row)
        .map_err(|err| StoreError::corrupt(format!("failed to decode user row: {err}")))?;
    row.try_into()
}

const SELECT_USERS: &str = "SELECT user_id, username, password_hash, role FROM users";

/// Credential store over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgCredentialStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait::async_trait]
impl CredentialStore for PgCredentialStore {
    #[instrument(skip(self), err)]
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let sql = format!("{SELECT_USERS} WHERE username = $1");
        let row = run_with_timeout(self.timeout, "find_user_by_username", async {
            sqlx::query(&sql)
                .bind(username)
                .fetch_optional(&self.pool)
                .await
        })
        .await?;
        row.map(|row| decode_user(&row)).transpose()
    }

    #[instrument(skip(self), err)]
    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let sql = format!("{SELECT_USERS} WHERE user_id = $1");
        let row = run_with_timeout(self.timeout, "find_user_by_id", async {
            sqlx::query(&sql)
                .bind(id.as_i64())
                .fetch_optional(&self.pool)
                .await
        })
        .await?;
        row.map(|row| decode_user(&row)).transpose()
    }

    #[instrument(skip(self, user), fields(username = %user.username), err)]
    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId> {
        let row = run_with_timeout(self.timeout, "insert_user", async {
            sqlx::query(
                "INSERT INTO users (username, password_hash, role) VALUES ($1, $2, $3) RETURNING user_id",
            )
            .bind(&user.username)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
        })
        .await?;

        let id: i64 = row
            .try_get("user_id")
            .map_err(|err| StoreError::corrupt(format!("failed to read new user id: {err}")))?;
        Ok(UserId::new(id))
    }

    #[instrument(skip(self), err)]
    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let sql = format!("{SELECT_USERS} ORDER BY user_id ASC");
        let rows = run_with_timeout(self.timeout, "list_users", async {
            sqlx::query(&sql).fetch_all(&self.pool).await
        })
        .await?;

        let mut users = Vec::with_capacity(rows.len());
        for row in rows {
            users.push(decode_user(&row)?);
        }
        Ok(users)
    }

    #[instrument(skip(self), err)]
    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<()> {
        let result = run_with_timeout(self.timeout, "update_user_role", async {
            sqlx::query("UPDATE users SET role = $1 WHERE user_id = $2")
                .bind(role.as_str())
                .bind(id.as_i64())
                .execute(&self.pool)
                .await
        })
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let result = run_with_timeout(self.timeout, "delete_user", async {
            sqlx::query("DELETE FROM users WHERE user_id = $1")
                .bind(id.as_i64())
                .execute(&self.pool)
                .await
        })
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
