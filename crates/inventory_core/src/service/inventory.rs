//! Cached inventory store.
//!
//! # Responsibility
//! - Enforce id/name uniqueness and value invariants before any write.
//! - Mirror the `items` table in memory for O(1) id lookup and ordered listing.
//!
//! # Invariants
//! - Every mutation writes through the repository first; the cache only
//!   changes after that write succeeded.
//! - `names` always holds exactly the normalized names of `items`.
//! - The cache is rebuilt from the repository when the store is opened.

use crate::model::item::{
    normalize_name, validate_price, validate_quantity, Item, ItemId, ItemValidationError,
};
use crate::repo::item_repo::{ItemRepository, RepoError};
use log::{info, warn};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors surfaced by inventory operations. All of them are recoverable.
#[derive(Debug)]
pub enum InventoryError {
    DuplicateId(ItemId),
    DuplicateName(String),
    InvalidValue(ItemValidationError),
    /// The cache lists the id but the store no longer holds the row.
    NotFound(ItemId),
    Repo(RepoError),
}

impl Display for InventoryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateId(id) => write!(f, "an item with id {id} already exists"),
            Self::DuplicateName(name) => write!(f, "an item named '{name}' already exists"),
            Self::InvalidValue(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "no item with id {id}"),
            Self::Repo(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for InventoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidValue(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for InventoryError {
    fn from(value: ItemValidationError) -> Self {
        Self::InvalidValue(value)
    }
}

impl From<RepoError> for InventoryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidValue(err),
            other => Self::Repo(other),
        }
    }
}

/// Aggregate figures over the current inventory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InventorySummary {
    pub item_count: usize,
    /// Widened so that quantities near `i64::MAX` cannot overflow the total.
    pub total_units: i128,
    pub total_value: f64,
}

/// Inventory store: a repository plus its in-memory mirror.
pub struct Inventory<R: ItemRepository> {
    repo: R,
    items: HashMap<ItemId, Item>,
    names: HashSet<String>,
}

impl<R: ItemRepository> Inventory<R> {
    /// Opens the store and loads every persisted item into the cache.
    pub fn open(repo: R) -> InventoryResult<Self> {
        let persisted = repo.list_items()?;
        let mut items = HashMap::with_capacity(persisted.len());
        let mut names = HashSet::with_capacity(persisted.len());

        for item in persisted {
            names.insert(item.normalized_name());
            items.insert(item.id, item);
        }

        info!(
            "event=inventory_open module=service status=ok item_count={}",
            items.len()
        );
        Ok(Self { repo, items, names })
    }

    /// Adds a new item.
    ///
    /// # Errors
    /// - `DuplicateId` / `DuplicateName` when the id or normalized name is taken.
    /// - `InvalidValue` when a field invariant is violated.
    pub fn add(&mut self, item: Item) -> InventoryResult<()> {
        if self.items.contains_key(&item.id) {
            return Err(InventoryError::DuplicateId(item.id));
        }
        let normalized = item.normalized_name();
        if self.names.contains(&normalized) {
            return Err(InventoryError::DuplicateName(item.name));
        }
        item.validate()?;

        self.repo.insert_item(&item)?;

        info!("event=item_add module=service status=ok item_id={}", item.id);
        self.names.insert(normalized);
        self.items.insert(item.id, item);
        Ok(())
    }

    /// Deletes an item by id. Returns `false` when no such item exists.
    pub fn remove(&mut self, id: ItemId) -> InventoryResult<bool> {
        let Some(existing) = self.items.get(&id) else {
            return Ok(false);
        };
        let normalized = existing.normalized_name();

        self.repo.delete_item(id)?;

        self.items.remove(&id);
        self.names.remove(&normalized);
        info!("event=item_remove module=service status=ok item_id={id}");
        Ok(true)
    }

    /// Sets the on-hand quantity. Returns `false` when no such item exists,
    /// before the new value is looked at.
    pub fn update_quantity(&mut self, id: ItemId, quantity: i64) -> InventoryResult<bool> {
        let Some(item) = self.items.get_mut(&id) else {
            return Ok(false);
        };
        validate_quantity(quantity)?;

        self.repo.set_quantity(id, quantity)?;

        item.quantity = quantity;
        info!("event=item_update module=service status=ok field=quantity item_id={id}");
        Ok(true)
    }

    /// Sets the unit price. Returns `false` when no such item exists.
    pub fn update_price(&mut self, id: ItemId, price: f64) -> InventoryResult<bool> {
        let Some(item) = self.items.get_mut(&id) else {
            return Ok(false);
        };
        validate_price(price)?;

        self.repo.set_price(id, price)?;

        item.price = price;
        info!("event=item_update module=service status=ok field=price item_id={id}");
        Ok(true)
    }

    /// Case-insensitive substring search over persisted names, ordered by name.
    ///
    /// Case folding matches `Item::normalized_name` (Unicode lowercase).
    pub fn find_by_name(&self, term: &str) -> InventoryResult<Vec<Item>> {
        Ok(self.repo.search_by_name(term)?)
    }

    /// Every cached item ordered by id.
    pub fn list_all(&self) -> Vec<&Item> {
        let mut items: Vec<&Item> = self.items.values().collect();
        items.sort_unstable_by_key(|item| item.id);
        items
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(&id)
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&normalize_name(name))
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Totals over the cache.
    pub fn summary(&self) -> InventorySummary {
        InventorySummary {
            item_count: self.items.len(),
            total_units: self
                .items
                .values()
                .map(|item| i128::from(item.quantity))
                .sum(),
            total_value: self.items.values().map(Item::stock_value).sum(),
        }
    }

    /// Adds each item, skipping ones whose id or name is already taken.
    ///
    /// Returns how many items were added. Invalid values and storage errors
    /// abort the load.
    pub fn seed(&mut self, items: impl IntoIterator<Item = Item>) -> InventoryResult<usize> {
        let mut added = 0;
        for item in items {
            match self.add(item) {
                Ok(()) => added += 1,
                Err(InventoryError::DuplicateId(id)) => {
                    warn!("event=inventory_seed module=service status=skip reason=duplicate_id item_id={id}");
                }
                Err(InventoryError::DuplicateName(_)) => {
                    warn!("event=inventory_seed module=service status=skip reason=duplicate_name");
                }
                Err(err) => return Err(err),
            }
        }
        Ok(added)
    }

    /// Releases the underlying store.
    pub fn close(self) -> InventoryResult<()> {
        let item_count = self.items.len();
        self.repo.close()?;
        info!("event=inventory_close module=service status=ok item_count={item_count}");
        Ok(())
    }
}

/// Fixed hardware-store catalogue used by the "load demo data" option.
pub fn demo_items() -> Vec<Item> {
    vec![
        Item::new(1, "Hammer", 25, 6.5),
        Item::new(2, "Nails (100 pcs)", 100, 3.0),
        Item::new(3, "Screwdriver", 40, 4.75),
        Item::new(4, "Handsaw", 10, 12.99),
    ]
}
