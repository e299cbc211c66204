//! Inventory domain module.
//!
//! This crate contains business rules for the item catalog, implemented purely
//! as deterministic domain logic (no IO, no HTTP, no storage).

pub mod category;
pub mod item;
pub mod reorder;

pub use category::Category;
pub use item::{Item, ItemDraft, ItemPatch};
pub use reorder::{ReorderLine, reorder_quantity, reorder_report};
