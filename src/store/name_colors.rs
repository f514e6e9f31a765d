//! Name to color mapping queries.

use rusqlite::types::Value;

use crate::error::StoreResult;
use crate::store::{Filter, Order, Row, Table, TableStore, text};

/// All stored `(name, color_hex)` pairs, ordered by name.
pub fn query_colors(store: &dyn TableStore) -> StoreResult<Vec<(String, String)>> {
    let rows = store.select(Table::NameColors, &[], Some(&Order::asc("name")))?;
    Ok(rows
        .iter()
        .filter_map(|row| Some((text(row, "name")?, text(row, "color_hex")?)))
        .collect())
}

pub fn query_color(name: &str, store: &dyn TableStore) -> StoreResult<Option<String>> {
    let rows = store.select(Table::NameColors, &[by_name(name)], None)?;
    Ok(rows.first().and_then(|row| text(row, "color_hex")))
}

/// Updates the color for `name`, inserting the mapping when it does not exist.
pub fn upsert_color(name: &str, color: &str, store: &dyn TableStore) -> StoreResult<()> {
    let mut patch = Row::new();
    patch.insert("color_hex".to_string(), Value::Text(color.to_string()));
    let updated = store.update(Table::NameColors, &[by_name(name)], patch.clone())?;
    if updated.is_empty() {
        patch.insert("name".to_string(), Value::Text(name.to_string()));
        store.insert(Table::NameColors, patch)?;
    }
    Ok(())
}

/// Returns whether a mapping was removed.
pub fn delete_color(name: &str, store: &dyn TableStore) -> StoreResult<bool> {
    Ok(store.delete(Table::NameColors, &[by_name(name)])? > 0)
}

fn by_name(name: &str) -> Filter {
    Filter::Eq("name", Value::Text(name.to_string()))
}
