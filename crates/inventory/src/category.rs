//! Item categories.

use serde::{Deserialize, Serialize};

use stockroom_core::CategoryId;

/// An item category.
///
/// The category set is operator-owned (seeded at install time); the API only
/// references categories, it never creates or deletes them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub category_id: CategoryId,
    pub name: String,
}

impl Category {
    pub fn new(category_id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            category_id,
            name: name.into(),
        }
    }
}
