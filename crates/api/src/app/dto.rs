use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use stockroom_auth::Role;
use stockroom_core::{CategoryId, ItemId, UserId};
use stockroom_inventory::{Item, ItemDraft, ItemPatch, ReorderLine};
use stockroom_store::UserRecord;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

/// Item creation body. `minQuantity` keeps its camel-case wire spelling;
/// `cost`/`price` arrive as JSON numbers.
#[derive(Debug, Deserialize)]
pub struct CreateItemRequest {
    pub name: String,
    pub category_id: i64,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, rename = "minQuantity")]
    pub min_quantity: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
}

impl CreateItemRequest {
    /// Fold the request into a draft; unsupplied fields keep the documented
    /// defaults (zeroes and empty strings).
    pub fn into_draft(self) -> ItemDraft {
        let mut draft = ItemDraft::new(self.name, CategoryId::new(self.category_id));
        if let Some(quantity) = self.quantity {
            draft.quantity = quantity;
        }
        if let Some(min_quantity) = self.min_quantity {
            draft.min_quantity = min_quantity;
        }
        if let Some(cost) = self.cost {
            draft.cost = cost;
        }
        if let Some(price) = self.price {
            draft.price = price;
        }
        if let Some(location) = self.location {
            draft.location = location;
        }
        if let Some(vendor) = self.vendor {
            draft.vendor = vendor;
        }
        draft
    }
}

/// Partial item update; absent fields are left untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateItemRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default, rename = "minQuantity")]
    pub min_quantity: Option<i64>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub cost: Option<Decimal>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
}

impl UpdateItemRequest {
    pub fn into_patch(self) -> ItemPatch {
        ItemPatch {
            name: self.name,
            category_id: self.category_id.map(CategoryId::new),
            quantity: self.quantity,
            min_quantity: self.min_quantity,
            cost: self.cost,
            price: self.price,
            location: self.location,
            vendor: self.vendor,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub role: Role,
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item_id: ItemId,
    pub name: String,
    pub category_id: CategoryId,
    pub category_name: String,
    pub quantity: i64,
    #[serde(rename = "minQuantity")]
    pub min_quantity: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub cost: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
    pub location: String,
    pub vendor: String,
}

impl From<Item> for ItemResponse {
    fn from(item: Item) -> Self {
        ItemResponse {
            item_id: item.item_id,
            name: item.name,
            category_id: item.category_id,
            category_name: item.category_name,
            quantity: item.quantity,
            min_quantity: item.min_quantity,
            cost: item.cost,
            price: item.price,
            location: item.location,
            vendor: item.vendor,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ReorderLineResponse {
    pub item_id: ItemId,
    pub name: String,
    pub category_name: String,
    pub quantity: i64,
    #[serde(rename = "minQuantity")]
    pub min_quantity: i64,
    pub vendor: String,
    pub quantity_to_order: i64,
}

impl From<ReorderLine> for ReorderLineResponse {
    fn from(line: ReorderLine) -> Self {
        ReorderLineResponse {
            item_id: line.item_id,
            name: line.name,
            category_name: line.category_name,
            quantity: line.quantity,
            min_quantity: line.min_quantity,
            vendor: line.vendor,
            quantity_to_order: line.quantity_to_order,
        }
    }
}

/// Account view for listings; the password hash never leaves the service.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user_id: UserId,
    pub username: String,
    pub role: Role,
}

impl From<UserRecord> for UserResponse {
    fn from(user: UserRecord) -> Self {
        UserResponse {
            user_id: user.user_id,
            username: user.username,
            role: user.role,
        }
    }
}
