//! Table store: the select/insert/update/delete contract plus its SQLite backend.

pub mod events;
mod migrations;
pub mod name_colors;
mod sqlite;

use std::collections::BTreeMap;

use rusqlite::types::Value;

use crate::error::{StoreError, StoreResult};

pub use sqlite::SqliteStore;

/// A row keyed by column name.
pub type Row = BTreeMap<String, Value>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Events,
    NameColors,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Events => "events",
            Table::NameColors => "name_colors",
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Table::Events => &[
                "id",
                "name",
                "date",
                "note",
                "value",
                "color",
                "recurrence_rule",
                "start_date",
                "end_date",
                "created_at",
            ],
            Table::NameColors => &["id", "name", "color_hex"],
        }
    }

    /// Rejects any column the table does not have. Column names end up in SQL
    /// text, so everything is checked against this list first.
    pub fn check_column(&self, column: &str) -> StoreResult<()> {
        if self.columns().contains(&column) {
            Ok(())
        } else {
            Err(StoreError::UnknownColumn {
                table: self.name(),
                column: column.to_string(),
            })
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    Eq(&'static str, Value),
    Gte(&'static str, Value),
    Lte(&'static str, Value),
    IsNull(&'static str),
    NotNull(&'static str),
}

impl Filter {
    pub fn column(&self) -> &'static str {
        match self {
            Filter::Eq(column, _)
            | Filter::Gte(column, _)
            | Filter::Lte(column, _)
            | Filter::IsNull(column)
            | Filter::NotNull(column) => column,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Order {
    pub column: &'static str,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: &'static str) -> Self {
        Order {
            column,
            ascending: true,
        }
    }

    pub fn desc(column: &'static str) -> Self {
        Order {
            column,
            ascending: false,
        }
    }
}

/// A table-oriented store. Every operation either returns its result or an
/// error value; none of them retries.
pub trait TableStore {
    fn select(&self, table: Table, filters: &[Filter], order: Option<&Order>) -> StoreResult<Vec<Row>>;

    /// Inserts `row` and returns it as stored, including the assigned `id`.
    fn insert(&self, table: Table, row: Row) -> StoreResult<Row>;

    /// Applies `patch` to every matching row and returns the updated rows.
    fn update(&self, table: Table, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>>;

    /// Deletes matching rows and returns how many were removed.
    fn delete(&self, table: Table, filters: &[Filter]) -> StoreResult<usize>;
}

/// Returns the default database path inside the user's data directory.
/// Falls back to `./moncal.db` when no data dir is found.
pub fn default_db_path() -> String {
    if let Some(data_dir) = dirs::data_local_dir() {
        let moncal_dir = data_dir.join("moncal");
        std::fs::create_dir_all(&moncal_dir).ok();
        moncal_dir.join("moncal.db").to_string_lossy().into_owned()
    } else {
        "moncal.db".to_string()
    }
}

pub(crate) fn text(row: &Row, column: &str) -> Option<String> {
    match row.get(column) {
        Some(Value::Text(value)) => Some(value.clone()),
        _ => None,
    }
}

pub(crate) fn integer(row: &Row, column: &str) -> Option<i64> {
    match row.get(column) {
        Some(Value::Integer(value)) => Some(*value),
        _ => None,
    }
}

pub(crate) fn optional_text(value: Option<&str>) -> Value {
    value.map_or(Value::Null, |v| Value::Text(v.to_string()))
}
