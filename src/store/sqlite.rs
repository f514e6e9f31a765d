//! SQLite implementation of [`TableStore`].

use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::error::{StoreError, StoreResult};
use crate::store::{Filter, Order, Row, Table, TableStore, migrations};

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) the SQLite database and runs migrations.
    pub fn open(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        migrations::run_migrations(&conn)?;
        Ok(SqliteStore { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn matching_ids(&self, table: Table, filters: &[Filter]) -> StoreResult<Vec<i64>> {
        let mut params = Vec::new();
        let sql = format!(
            "SELECT id FROM {}{} ORDER BY id",
            table.name(),
            where_clause(table, filters, &mut params)?
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| row.get::<_, i64>(0))?;
        let mut ids = Vec::new();
        for row in rows {
            ids.push(row?);
        }
        Ok(ids)
    }

    fn row_by_id(&self, table: Table, id: i64) -> StoreResult<Row> {
        self.select(table, &[Filter::Eq("id", Value::Integer(id))], None)?
            .into_iter()
            .next()
            .ok_or(StoreError::NotFound {
                table: table.name(),
                id,
            })
    }
}

fn where_clause(table: Table, filters: &[Filter], params: &mut Vec<Value>) -> StoreResult<String> {
    if filters.is_empty() {
        return Ok(String::new());
    }
    let mut clauses = Vec::with_capacity(filters.len());
    for filter in filters {
        let column = filter.column();
        table.check_column(column)?;
        let clause = match filter {
            Filter::IsNull(_) => format!("{column} IS NULL"),
            Filter::NotNull(_) => format!("{column} IS NOT NULL"),
            Filter::Eq(_, value) | Filter::Gte(_, value) | Filter::Lte(_, value) => {
                params.push(value.clone());
                let op = match filter {
                    Filter::Gte(..) => ">=",
                    Filter::Lte(..) => "<=",
                    _ => "=",
                };
                format!("{column} {op} ?{}", params.len())
            }
        };
        clauses.push(clause);
    }
    Ok(format!(" WHERE {}", clauses.join(" AND ")))
}

impl TableStore for SqliteStore {
    fn select(&self, table: Table, filters: &[Filter], order: Option<&Order>) -> StoreResult<Vec<Row>> {
        let columns = table.columns();
        let mut params = Vec::new();
        let mut sql = format!(
            "SELECT {} FROM {}{}",
            columns.join(", "),
            table.name(),
            where_clause(table, filters, &mut params)?
        );
        match order {
            Some(order) => {
                table.check_column(order.column)?;
                let direction = if order.ascending { "ASC" } else { "DESC" };
                sql.push_str(&format!(" ORDER BY {} {direction}, id ASC", order.column));
            }
            None => sql.push_str(" ORDER BY id ASC"),
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(params.iter()), |row| {
            let mut out = Row::new();
            for (index, column) in columns.iter().enumerate() {
                out.insert((*column).to_string(), row.get::<_, Value>(index)?);
            }
            Ok(out)
        })?;
        let mut result = Vec::new();
        for row in rows {
            result.push(row?);
        }
        Ok(result)
    }

    fn insert(&self, table: Table, row: Row) -> StoreResult<Row> {
        for column in row.keys() {
            table.check_column(column)?;
        }
        if row.is_empty() {
            self.conn
                .execute(&format!("INSERT INTO {} DEFAULT VALUES", table.name()), [])?;
        } else {
            let columns = row.keys().map(String::as_str).collect::<Vec<_>>();
            let placeholders = (1..=row.len())
                .map(|i| format!("?{i}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "INSERT INTO {} ({}) VALUES ({placeholders})",
                table.name(),
                columns.join(", ")
            );
            self.conn.execute(&sql, params_from_iter(row.values()))?;
        }
        let id = self.conn.last_insert_rowid();
        self.row_by_id(table, id)
    }

    fn update(&self, table: Table, filters: &[Filter], patch: Row) -> StoreResult<Vec<Row>> {
        for column in patch.keys() {
            table.check_column(column)?;
            if column == "id" {
                return Err(StoreError::Immutable {
                    table: table.name(),
                    column: column.clone(),
                });
            }
        }
        let ids = self.matching_ids(table, filters)?;
        if !patch.is_empty() && !ids.is_empty() {
            let assignments = patch
                .keys()
                .enumerate()
                .map(|(i, column)| format!("{column} = ?{}", i + 1))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "UPDATE {} SET {assignments} WHERE id = ?{}",
                table.name(),
                patch.len() + 1
            );
            let mut stmt = self.conn.prepare(&sql)?;
            for id in &ids {
                let params = patch
                    .values()
                    .cloned()
                    .chain(std::iter::once(Value::Integer(*id)));
                stmt.execute(params_from_iter(params))?;
            }
        }
        ids.into_iter().map(|id| self.row_by_id(table, id)).collect()
    }

    fn delete(&self, table: Table, filters: &[Filter]) -> StoreResult<usize> {
        let mut params = Vec::new();
        let sql = format!(
            "DELETE FROM {}{}",
            table.name(),
            where_clause(table, filters, &mut params)?
        );
        Ok(self.conn.execute(&sql, params_from_iter(params.iter()))?)
    }
}
