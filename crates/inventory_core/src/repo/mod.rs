//! Repository layer over the `items` table.
//!
//! # Responsibility
//! - Define the item persistence contract used by the inventory store.
//! - Keep SQL details and row mapping inside the core persistence boundary.
//!
//! # Invariants
//! - Writes call `Item::validate()` (or the field validators) before SQL.
//! - Mutations on a missing id return `RepoError::NotFound`.

pub mod item_repo;
