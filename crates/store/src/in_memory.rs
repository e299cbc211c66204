//! In-memory stores for tests and development runs.
//!
//! Observable semantics match the Postgres stores: ids come from a monotonic
//! counter and are never reused, reads resolve the category join, list
//! ordering follows the query, and username uniqueness is enforced.

use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use rust_decimal::Decimal;

use stockroom_auth::Role;
use stockroom_core::{CategoryId, ItemId, UserId};
use stockroom_inventory::{Category, Item, ItemDraft, ItemPatch};

use crate::DEFAULT_CATEGORIES;
use crate::credential_store::{CredentialStore, NewUser, UserRecord};
use crate::error::{StoreError, StoreResult};
use crate::item_store::ItemStore;
use crate::query::{ItemQuery, SortDir, SortKey};

fn poisoned(what: &str) -> StoreError {
    StoreError::backend(anyhow::anyhow!("{what} lock poisoned"))
}

/// Item row without the joined category name.
#[derive(Debug, Clone)]
struct StoredItem {
    name: String,
    category_id: CategoryId,
    quantity: i64,
    min_quantity: i64,
    cost: Decimal,
    price: Decimal,
    location: String,
    vendor: String,
}

#[derive(Debug)]
struct ItemTable {
    categories: BTreeMap<CategoryId, String>,
    items: BTreeMap<ItemId, StoredItem>,
    next_id: i64,
}

fn joined(table: &ItemTable, id: ItemId, stored: &StoredItem) -> Option<Item> {
    let category_name = table.categories.get(&stored.category_id)?;
    Some(Item {
        item_id: id,
        name: stored.name.clone(),
        category_id: stored.category_id,
        category_name: category_name.clone(),
        quantity: stored.quantity,
        min_quantity: stored.min_quantity,
        cost: stored.cost,
        price: stored.price,
        location: stored.location.clone(),
        vendor: stored.vendor.clone(),
    })
}

fn sort_items(items: &mut [Item], key: SortKey, dir: SortDir) {
    // Stable sort over the item_id ASC base order, so ties keep it.
    items.sort_by(|a, b| {
        let ord = match key {
            SortKey::ItemId => a.item_id.cmp(&b.item_id),
            SortKey::Name => a.name.cmp(&b.name),
            SortKey::CategoryName => a.category_name.cmp(&b.category_name),
            SortKey::Quantity => a.quantity.cmp(&b.quantity),
            SortKey::MinQuantity => a.min_quantity.cmp(&b.min_quantity),
            SortKey::Cost => a.cost.cmp(&b.cost),
            SortKey::Price => a.price.cmp(&b.price),
            SortKey::Location => a.location.cmp(&b.location),
            SortKey::Vendor => a.vendor.cmp(&b.vendor),
        };
        match dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });
}

/// Item store backed by a `BTreeMap` behind a `RwLock`.
#[derive(Debug)]
pub struct InMemoryItemStore {
    inner: RwLock<ItemTable>,
}

impl InMemoryItemStore {
    /// Store seeded with the default category set (ids 1..=N).
    pub fn new() -> Self {
        Self::with_categories(
            DEFAULT_CATEGORIES
                .iter()
                .enumerate()
                .map(|(index, name)| Category::new(CategoryId::new(index as i64 + 1), *name))
                .collect(),
        )
    }

    pub fn with_categories(categories: Vec<Category>) -> Self {
        Self {
            inner: RwLock::new(ItemTable {
                categories: categories
                    .into_iter()
                    .map(|category| (category.category_id, category.name))
                    .collect(),
                items: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read_table(&self) -> StoreResult<RwLockReadGuard<'_, ItemTable>> {
        self.inner.read().map_err(|_| poisoned("item table"))
    }

    fn write_table(&self) -> StoreResult<RwLockWriteGuard<'_, ItemTable>> {
        self.inner.write().map_err(|_| poisoned("item table"))
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let table = self.read_table()?;
        Ok(table
            .items
            .get(&id)
            .and_then(|stored| joined(&table, id, stored)))
    }

    async fn list(&self, query: &ItemQuery) -> StoreResult<Vec<Item>> {
        let table = self.read_table()?;
        let mut items: Vec<Item> = table
            .items
            .iter()
            .filter_map(|(id, stored)| joined(&table, *id, stored))
            .collect();

        if let Some(term) = &query.search {
            let needle = term.to_lowercase();
            items.retain(|item| {
                [&item.name, &item.category_name, &item.vendor, &item.location]
                    .into_iter()
                    .any(|field| field.to_lowercase().contains(&needle))
            });
        }

        sort_items(&mut items, query.sort, query.dir);
        Ok(items)
    }

    async fn create(&self, draft: &ItemDraft) -> StoreResult<ItemId> {
        let mut table = self.write_table()?;
        if !table.categories.contains_key(&draft.category_id) {
            return Err(StoreError::UnknownCategory);
        }
        let id = ItemId::new(table.next_id);
        table.next_id += 1;
        table.items.insert(
            id,
            StoredItem {
                name: draft.name.clone(),
                category_id: draft.category_id,
                quantity: draft.quantity,
                min_quantity: draft.min_quantity,
                cost: draft.cost,
                price: draft.price,
                location: draft.location.clone(),
                vendor: draft.vendor.clone(),
            },
        );
        Ok(id)
    }

    async fn update(&self, id: ItemId, patch: &ItemPatch) -> StoreResult<()> {
        let mut guard = self.write_table()?;
        let table = &mut *guard;
        if !table.items.contains_key(&id) {
            return Err(StoreError::NotFound);
        }
        if let Some(category_id) = patch.category_id {
            if !table.categories.contains_key(&category_id) {
                return Err(StoreError::UnknownCategory);
            }
        }

        let item = table.items.get_mut(&id).ok_or(StoreError::NotFound)?;
        if let Some(name) = &patch.name {
            item.name = name.clone();
        }
        if let Some(category_id) = patch.category_id {
            item.category_id = category_id;
        }
        if let Some(quantity) = patch.quantity {
            item.quantity = quantity;
        }
        if let Some(min_quantity) = patch.min_quantity {
            item.min_quantity = min_quantity;
        }
        if let Some(cost) = patch.cost {
            item.cost = cost;
        }
        if let Some(price) = patch.price {
            item.price = price;
        }
        if let Some(location) = &patch.location {
            item.location = location.clone();
        }
        if let Some(vendor) = &patch.vendor {
            item.vendor = vendor.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: ItemId) -> StoreResult<()> {
        let mut table = self.write_table()?;
        table
            .items
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    username: String,
    password_hash: String,
    role: Role,
}

#[derive(Debug)]
struct UserTable {
    users: BTreeMap<UserId, StoredUser>,
    next_id: i64,
}

fn record(id: UserId, user: &StoredUser) -> UserRecord {
    UserRecord {
        user_id: id,
        username: user.username.clone(),
        password_hash: user.password_hash.clone(),
        role: user.role,
    }
}

/// Credential store backed by a `BTreeMap` behind a `RwLock`.
#[derive(Debug)]
pub struct InMemoryCredentialStore {
    inner: RwLock<UserTable>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(UserTable {
                users: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    fn read_table(&self) -> StoreResult<RwLockReadGuard<'_, UserTable>> {
        self.inner.read().map_err(|_| poisoned("user table"))
    }

    fn write_table(&self) -> StoreResult<RwLockWriteGuard<'_, UserTable>> {
        self.inner.write().map_err(|_| poisoned("user table"))
    }
}

impl Default for InMemoryCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username(&self, username: &str) -> StoreResult<Option<UserRecord>> {
        let table = self.read_table()?;
        Ok(table
            .users
            .iter()
            .find(|(_, user)| user.username == username)
            .map(|(id, user)| record(*id, user)))
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let table = self.read_table()?;
        Ok(table.users.get(&id).map(|user| record(id, user)))
    }

    async fn insert_user(&self, user: &NewUser) -> StoreResult<UserId> {
        let mut table = self.write_table()?;
        if table
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(StoreError::DuplicateUsername);
        }
        let id = UserId::new(table.next_id);
        table.next_id += 1;
        table.users.insert(
            id,
            StoredUser {
                username: user.username.clone(),
                password_hash: user.password_hash.clone(),
                role: user.role,
            },
        );
        Ok(id)
    }

    async fn list_users(&self) -> StoreResult<Vec<UserRecord>> {
        let table = self.read_table()?;
        Ok(table
            .users
            .iter()
            .map(|(id, user)| record(*id, user))
            .collect())
    }

    async fn update_role(&self, id: UserId, role: Role) -> StoreResult<()> {
        let mut table = self.write_table()?;
        let user = table.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.role = role;
        Ok(())
    }

    async fn delete_user(&self, id: UserId) -> StoreResult<()> {
        let mut table = self.write_table()?;
        table
            .users
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, category: i64) -> ItemDraft {
        ItemDraft::new(name, CategoryId::new(category))
    }

    fn decimal(raw: &str) -> Decimal {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips_with_defaults() {
        let store = InMemoryItemStore::new();
        let id = store.create(&draft("Mouse", 2)).await.unwrap();

        let item = store.get(id).await.unwrap().unwrap();
        assert_eq!(item.item_id, id);
        assert_eq!(item.name, "Mouse");
        assert_eq!(item.category_name, "Peripherals");
        assert_eq!(item.quantity, 0);
        assert_eq!(item.min_quantity, 0);
        assert_eq!(item.cost, Decimal::ZERO);
        assert_eq!(item.price, Decimal::ZERO);
        assert_eq!(item.location, "");
        assert_eq!(item.vendor, "");
    }

    #[tokio::test]
    async fn unknown_categories_are_rejected() {
        let store = InMemoryItemStore::new();
        assert!(matches!(
            store.create(&draft("Mouse", 99)).await,
            Err(StoreError::UnknownCategory)
        ));

        let id = store.create(&draft("Mouse", 2)).await.unwrap();
        let patch = ItemPatch {
            category_id: Some(CategoryId::new(99)),
            ..ItemPatch::default()
        };
        assert!(matches!(
            store.update(id, &patch).await,
            Err(StoreError::UnknownCategory)
        ));
    }

    #[tokio::test]
    async fn update_merges_only_supplied_fields() {
        let store = InMemoryItemStore::new();
        let mut full = draft("Cable", 1);
        full.quantity = 40;
        full.min_quantity = 5;
        full.cost = decimal("1.10");
        full.price = decimal("2.20");
        full.location = "Bin 4".to_string();
        full.vendor = "Belkin".to_string();
        let id = store.create(&full).await.unwrap();

        let patch = ItemPatch {
            price: Some(decimal("2.75")),
            quantity: Some(38),
            ..ItemPatch::default()
        };
        store.update(id, &patch).await.unwrap();

        let item = store.get(id).await.unwrap().unwrap();
        assert_eq!(item.price, decimal("2.75"));
        assert_eq!(item.quantity, 38);
        assert_eq!(item.name, "Cable");
        assert_eq!(item.min_quantity, 5);
        assert_eq!(item.cost, decimal("1.10"));
        assert_eq!(item.location, "Bin 4");
        assert_eq!(item.vendor, "Belkin");
    }

    #[tokio::test]
    async fn empty_patch_is_a_no_op_on_an_existing_item() {
        let store = InMemoryItemStore::new();
        let id = store.create(&draft("Cable", 1)).await.unwrap();
        store.update(id, &ItemPatch::default()).await.unwrap();

        let missing = ItemId::new(999);
        assert!(matches!(
            store.update(missing, &ItemPatch::default()).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() {
        let store = InMemoryItemStore::new();
        let id = store.create(&draft("Cable", 1)).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(matches!(store.delete(id).await, Err(StoreError::NotFound)));
        assert!(store.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn ids_are_never_reused() {
        let store = InMemoryItemStore::new();
        let first = store.create(&draft("Cable", 1)).await.unwrap();
        store.delete(first).await.unwrap();
        let second = store.create(&draft("Mouse", 2)).await.unwrap();
        assert!(second.as_i64() > first.as_i64());
    }

    async fn seeded_store() -> InMemoryItemStore {
        let store = InMemoryItemStore::new();

        let mut mouse = draft("USB Mouse", 2);
        mouse.vendor = "Logitech".to_string();
        mouse.location = "Shelf C".to_string();
        mouse.price = decimal("8.50");
        store.create(&mouse).await.unwrap();

        let mut cable = draft("HDMI Cable", 1);
        cable.vendor = "Belkin".to_string();
        cable.location = "Bin 4".to_string();
        cable.price = decimal("4.00");
        store.create(&cable).await.unwrap();

        let mut switch = draft("Ethernet Switch", 4);
        switch.vendor = "Netgear".to_string();
        switch.location = "Shelf A".to_string();
        switch.price = decimal("30.00");
        store.create(&switch).await.unwrap();

        store
    }

    #[tokio::test]
    async fn list_sorts_by_requested_key_and_direction() {
        let store = seeded_store().await;

        let by_price_desc = ItemQuery::from_params(Some("price"), Some("DESC"), None);
        let items = store.list(&by_price_desc).await.unwrap();
        let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["Ethernet Switch", "USB Mouse", "HDMI Cable"]);

        let by_category = ItemQuery::from_params(Some("category_name"), None, None);
        let items = store.list(&by_category).await.unwrap();
        let categories: Vec<&str> = items
            .iter()
            .map(|item| item.category_name.as_str())
            .collect();
        assert_eq!(categories, ["Cables", "Networking", "Peripherals"]);
    }

    #[tokio::test]
    async fn unknown_sort_parameters_fall_back_to_item_id_asc() {
        let store = seeded_store().await;
        let query = ItemQuery::from_params(Some("no-such-column"), Some("sideways"), None);
        let items = store.list(&query).await.unwrap();
        let ids: Vec<i64> = items.iter().map(|item| item.item_id.as_i64()).collect();
        assert_eq!(ids, [1, 2, 3]);
    }

    #[tokio::test]
    async fn search_matches_four_fields_case_insensitively() {
        let store = seeded_store().await;

        for (term, expected) in [
            ("usb", vec!["USB Mouse"]),               // name
            ("peripherals", vec!["USB Mouse"]),       // category name
            ("LOGITECH", vec!["USB Mouse"]),          // vendor
            ("shelf", vec!["USB Mouse", "Ethernet Switch"]), // location
            ("zzz", vec![]),
        ] {
            let query = ItemQuery::from_params(None, None, Some(term));
            let items = store.list(&query).await.unwrap();
            let names: Vec<&str> = items.iter().map(|item| item.name.as_str()).collect();
            assert_eq!(names, expected, "term {term:?}");
        }
    }

    fn new_user(username: &str, role: Role) -> NewUser {
        NewUser {
            username: username.to_string(),
            password_hash: "$argon2id$stub".to_string(),
            role,
        }
    }

    #[tokio::test]
    async fn usernames_are_unique() {
        let store = InMemoryCredentialStore::new();
        store
            .insert_user(&new_user("casey", Role::Technician))
            .await
            .unwrap();
        assert!(matches!(
            store.insert_user(&new_user("casey", Role::Admin)).await,
            Err(StoreError::DuplicateUsername)
        ));
    }

    #[tokio::test]
    async fn accounts_are_found_by_name_and_id() {
        let store = InMemoryCredentialStore::new();
        let id = store
            .insert_user(&new_user("casey", Role::Technician))
            .await
            .unwrap();

        let by_name = store.find_by_username("casey").await.unwrap().unwrap();
        assert_eq!(by_name.user_id, id);
        assert_eq!(by_name.role, Role::Technician);

        let by_id = store.find_by_id(id).await.unwrap().unwrap();
        assert_eq!(by_id.username, "casey");

        assert!(store.find_by_username("nobody").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn role_updates_and_deletes_require_an_existing_user() {
        let store = InMemoryCredentialStore::new();
        let id = store
            .insert_user(&new_user("casey", Role::Technician))
            .await
            .unwrap();

        store.update_role(id, Role::Admin).await.unwrap();
        assert_eq!(
            store.find_by_id(id).await.unwrap().unwrap().role,
            Role::Admin
        );

        store.delete_user(id).await.unwrap();
        assert!(matches!(
            store.update_role(id, Role::Admin).await,
            Err(StoreError::NotFound)
        ));
        assert!(matches!(
            store.delete_user(id).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn list_users_orders_by_id() {
        let store = InMemoryCredentialStore::new();
        store
            .insert_user(&new_user("zoe", Role::Admin))
            .await
            .unwrap();
        store
            .insert_user(&new_user("al", Role::Technician))
            .await
            .unwrap();

        let users = store.list_users().await.unwrap();
        let names: Vec<&str> = users.iter().map(|user| user.username.as_str()).collect();
        assert_eq!(names, ["zoe", "al"]);
    }
}
