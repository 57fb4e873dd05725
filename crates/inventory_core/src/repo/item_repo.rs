//! Item repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD and search APIs over the `items` table.
//! - Map SQLite rows into typed `Item` records.
//!
//! # Invariants
//! - Each mutation is a single statement, so it commits atomically.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::item::{
    normalize_case, validate_price, validate_quantity, Item, ItemId, ItemValidationError,
};
use log::debug;
use rusqlite::functions::FunctionFlags;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const ITEM_SELECT_SQL: &str = "SELECT id, name, quantity, price FROM items";
const ITEMS_TABLE: &str = "items";
const REQUIRED_ITEM_COLUMNS: &[&str] = &["id", "name", "quantity", "price"];
/// SQL function folding case the same way as item name normalization.
const FOLD_CASE_FN: &str = "fold_case";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for item persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(ItemValidationError),
    Db(DbError),
    NotFound(ItemId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "item not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted item data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with db::open_db"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for RepoError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for inventory items.
pub trait ItemRepository {
    fn insert_item(&self, item: &Item) -> RepoResult<()>;
    fn delete_item(&self, id: ItemId) -> RepoResult<()>;
    fn set_quantity(&self, id: ItemId, quantity: i64) -> RepoResult<()>;
    fn set_price(&self, id: ItemId, price: f64) -> RepoResult<()>;
    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>>;
    /// All items ordered by id.
    fn list_items(&self) -> RepoResult<Vec<Item>>;
    /// Case-insensitive substring match on name, ordered by name then id.
    fn search_by_name(&self, term: &str) -> RepoResult<Vec<Item>>;
    /// Releases the underlying storage handle.
    fn close(self) -> RepoResult<()>
    where
        Self: Sized;
}

/// SQLite-backed item repository owning its connection.
#[derive(Debug)]
pub struct SqliteItemRepository {
    conn: Connection,
}

impl SqliteItemRepository {
    /// Wraps a migrated connection, rejecting ones that were not opened via
    /// `db::open_db`/`db::open_db_in_memory`.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        register_fold_case(&conn)?;
        Ok(Self { conn })
    }
}

impl ItemRepository for SqliteItemRepository {
    fn insert_item(&self, item: &Item) -> RepoResult<()> {
        item.validate()?;

        self.conn.execute(
            "INSERT INTO items (id, name, quantity, price) VALUES (?1, ?2, ?3, ?4);",
            params![item.id, item.name.as_str(), item.quantity, item.price],
        )?;

        debug!("event=item_insert module=repo status=ok item_id={}", item.id);
        Ok(())
    }

    fn delete_item(&self, id: ItemId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM items WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        debug!("event=item_delete module=repo status=ok item_id={id}");
        Ok(())
    }

    fn set_quantity(&self, id: ItemId, quantity: i64) -> RepoResult<()> {
        validate_quantity(quantity)?;

        let changed = self.conn.execute(
            "UPDATE items SET quantity = ?1 WHERE id = ?2;",
            params![quantity, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn set_price(&self, id: ItemId, price: f64) -> RepoResult<()> {
        validate_price(price)?;

        let changed = self.conn.execute(
            "UPDATE items SET price = ?1 WHERE id = ?2;",
            params![price, id],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn get_item(&self, id: ItemId) -> RepoResult<Option<Item>> {
        let row = self
            .conn
            .query_row(
                &format!("{ITEM_SELECT_SQL} WHERE id = ?1;"),
                [id],
                |row| Ok(read_item_row(row)),
            )
            .optional()?;

        row.transpose()
    }

    fn list_items(&self) -> RepoResult<Vec<Item>> {
        self.collect_items(&format!("{ITEM_SELECT_SQL} ORDER BY id ASC;"), params![])
    }

    fn search_by_name(&self, term: &str) -> RepoResult<Vec<Item>> {
        // instr() keeps `%` and `_` in the term literal, unlike LIKE.
        self.collect_items(
            &format!(
                "{ITEM_SELECT_SQL}
                 WHERE instr({FOLD_CASE_FN}(name), {FOLD_CASE_FN}(?1)) > 0
                 ORDER BY name COLLATE NOCASE ASC, id ASC;"
            ),
            [term],
        )
    }

    fn close(self) -> RepoResult<()> {
        self.conn
            .close()
            .map_err(|(_conn, err)| RepoError::from(err))
    }
}

impl SqliteItemRepository {
    fn collect_items<P: rusqlite::Params>(&self, sql: &str, params: P) -> RepoResult<Vec<Item>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut items = Vec::new();

        while let Some(row) = rows.next()? {
            items.push(read_item_row(row)?);
        }

        Ok(items)
    }
}

fn read_item_row(row: &Row<'_>) -> RepoResult<Item> {
    let item = Item {
        id: row.get("id")?,
        name: row.get("name")?,
        quantity: row.get("quantity")?,
        price: row.get("price")?,
    };

    item.validate().map_err(|err| {
        RepoError::InvalidData(format!("row with id {} violates item invariants: {err}", item.id))
    })?;
    Ok(item)
}

// SQLite's built-in lower() only folds ASCII.
fn register_fold_case(conn: &Connection) -> RepoResult<()> {
    conn.create_scalar_function(
        FOLD_CASE_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let value: String = ctx.get(0)?;
            Ok(normalize_case(&value))
        },
    )?;
    Ok(())
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1);",
        [ITEMS_TABLE],
        |row| row.get(0),
    )?;
    if !table_exists {
        return Err(RepoError::MissingRequiredTable(ITEMS_TABLE));
    }

    let mut stmt = conn.prepare(&format!("PRAGMA table_info({ITEMS_TABLE});"))?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<Result<Vec<_>, _>>()?;

    for &column in REQUIRED_ITEM_COLUMNS {
        if !columns.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: ITEMS_TABLE,
                column,
            });
        }
    }

    Ok(())
}
