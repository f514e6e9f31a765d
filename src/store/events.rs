//! Event and recurring-template queries.

use chrono::NaiveDate;
use rusqlite::types::Value;

use crate::calendar::{YearMonth, iso, parse_iso};
use crate::error::{StoreError, StoreResult};
use crate::recurrence::parse_rule;
use crate::store::{Filter, Order, Row, Table, TableStore, integer, optional_text, text};
use crate::types::{EventId, EventQuery, EventRecord};

/// Validates and inserts `record`, returning it with its assigned id.
pub fn create_event(record: &EventRecord, store: &dyn TableStore) -> StoreResult<EventRecord> {
    record.validate()?;
    let row = store.insert(Table::Events, record_to_row(record))?;
    let created = row_to_record(&row)?;
    log::info!(
        "event=event_create module=store status=ok id={:?} recurring={}",
        created.id,
        created.is_template()
    );
    Ok(created)
}

/// Replaces every stored field of the record with `record.id`.
pub fn update_event(record: &EventRecord, store: &dyn TableStore) -> StoreResult<EventRecord> {
    record.validate()?;
    let id = record
        .id
        .ok_or_else(|| StoreError::Decode("cannot update an event without an id".to_string()))?;
    let rows = store.update(Table::Events, &[by_id(id)], record_to_row(record))?;
    let row = rows.first().ok_or(StoreError::NotFound {
        table: Table::Events.name(),
        id,
    })?;
    row_to_record(row)
}

/// Returns whether a row was removed.
pub fn delete_event(id: EventId, store: &dyn TableStore) -> StoreResult<bool> {
    Ok(store.delete(Table::Events, &[by_id(id)])? > 0)
}

pub fn query_event_by_id(id: EventId, store: &dyn TableStore) -> StoreResult<Option<EventRecord>> {
    store
        .select(Table::Events, &[by_id(id)], None)?
        .first()
        .map(row_to_record)
        .transpose()
}

/// Loads single events matching `query` followed by every recurring template.
/// Templates are not filtered by date; expansion decides where they land.
pub fn query_events(query: EventQuery, store: &dyn TableStore) -> StoreResult<Vec<EventRecord>> {
    let mut single_filters = vec![Filter::IsNull("recurrence_rule")];
    let range = match query {
        EventQuery::All => None,
        EventQuery::ForYear(year) => NaiveDate::from_ymd_opt(year, 1, 1)
            .zip(NaiveDate::from_ymd_opt(year, 12, 31)),
        EventQuery::ForMonth(month) => Some((month.first_day(), month.last_day())),
    };
    if let Some((from, to)) = range {
        single_filters.push(Filter::Gte("date", Value::Text(iso(from))));
        single_filters.push(Filter::Lte("date", Value::Text(iso(to))));
    }

    let singles = store.select(Table::Events, &single_filters, Some(&Order::asc("date")))?;
    let templates = store.select(
        Table::Events,
        &[Filter::NotNull("recurrence_rule")],
        Some(&Order::asc("id")),
    )?;
    singles
        .iter()
        .chain(templates.iter())
        .map(row_to_record)
        .collect()
}

/// Loads what the month view needs.
pub fn query_month(month: YearMonth, store: &dyn TableStore) -> StoreResult<Vec<EventRecord>> {
    query_events(EventQuery::ForMonth(month), store)
}

fn by_id(id: EventId) -> Filter {
    Filter::Eq("id", Value::Integer(id))
}

fn optional_date(value: Option<NaiveDate>) -> Value {
    value.map_or(Value::Null, |date| Value::Text(iso(date)))
}

fn record_to_row(record: &EventRecord) -> Row {
    let mut row = Row::new();
    row.insert("name".to_string(), Value::Text(record.name.trim().to_string()));
    row.insert("date".to_string(), optional_date(record.date));
    row.insert("note".to_string(), optional_text(record.note.as_deref()));
    row.insert(
        "value".to_string(),
        record.value.map_or(Value::Null, Value::Real),
    );
    row.insert("color".to_string(), optional_text(record.color.as_deref()));
    row.insert(
        "recurrence_rule".to_string(),
        record
            .recurrence
            .as_ref()
            .map_or(Value::Null, |rule| Value::Text(rule.to_string())),
    );
    row.insert("start_date".to_string(), optional_date(record.start_date));
    row.insert("end_date".to_string(), optional_date(record.end_date));
    row
}

fn date_column(row: &Row, column: &str) -> StoreResult<Option<NaiveDate>> {
    text(row, column)
        .map(|value| {
            parse_iso(&value)
                .map_err(|err| StoreError::Decode(format!("{column} '{value}': {err}")))
        })
        .transpose()
}

fn row_to_record(row: &Row) -> StoreResult<EventRecord> {
    let name = text(row, "name")
        .ok_or_else(|| StoreError::Decode("event row without a name".to_string()))?;
    let value = match row.get("value") {
        Some(Value::Real(value)) => Some(*value),
        Some(Value::Integer(value)) => Some(*value as f64),
        _ => None,
    };
    Ok(EventRecord {
        id: integer(row, "id"),
        name,
        date: date_column(row, "date")?,
        note: text(row, "note"),
        value,
        color: text(row, "color"),
        recurrence: text(row, "recurrence_rule").map(|raw| parse_rule(&raw).into_rule()),
        start_date: date_column(row, "start_date")?,
        end_date: date_column(row, "end_date")?,
    })
}
