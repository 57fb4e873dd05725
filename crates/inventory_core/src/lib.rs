//! Core domain logic for the inventory manager.
//! This crate owns every item invariant and the cache/store consistency rules.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, LoggingError};
pub use model::item::{Item, ItemId, ItemValidationError};
pub use repo::item_repo::{ItemRepository, RepoError, RepoResult, SqliteItemRepository};
pub use service::inventory::{
    demo_items, Inventory, InventoryError, InventoryResult, InventorySummary,
};

/// Inventory backed by the SQLite repository.
pub type SqliteInventory = Inventory<SqliteItemRepository>;

/// Opens (or creates) the inventory database at `path` and loads its cache.
pub fn open_inventory(path: impl AsRef<std::path::Path>) -> InventoryResult<SqliteInventory> {
    let conn = db::open_db(path).map_err(RepoError::from)?;
    Inventory::open(SqliteItemRepository::try_new(conn)?)
}

/// Opens a throwaway in-memory inventory.
pub fn open_inventory_in_memory() -> InventoryResult<SqliteInventory> {
    let conn = db::open_db_in_memory().map_err(RepoError::from)?;
    Inventory::open(SqliteItemRepository::try_new(conn)?)
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
