//! Inventory domain model.
//!
//! # Invariants
//! - Every item is identified by a caller-chosen integer `ItemId`.
//! - Names are unique after normalization (`Item::normalized_name`).

pub mod item;
