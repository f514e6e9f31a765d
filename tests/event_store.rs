use chrono::NaiveDate;
use moncal::recurrence::{Frequency, RecurrenceRule};
use moncal::store::events::{
    create_event, delete_event, query_event_by_id, query_events, query_month, update_event,
};
use moncal::store::{Filter, Row, Table, TableStore};
use moncal::{
    EventQuery, EventRecord, MonthView, NameColorRegistry, RecordError, SqliteStore, StoreError,
    YearMonth,
};
use rusqlite::types::Value;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn weekly_gym() -> EventRecord {
    let rule = RecurrenceRule::new(Frequency::Weekly)
        .with_interval(1)
        .with_by_day([chrono::Weekday::Mon, chrono::Weekday::Fri]);
    EventRecord::recurring("Gym", date(2025, 1, 1), rule)
        .with_end_date(date(2025, 1, 31))
        .with_note("legs")
}

#[test]
fn create_and_get_roundtrip() {
    let store = SqliteStore::open_in_memory().unwrap();

    let single = EventRecord::single("Rent", date(2025, 1, 5))
        .with_value(1200.5)
        .with_color("#112233");
    let created = create_event(&single, &store).unwrap();
    let id = created.id.expect("store should assign an id");

    let loaded = query_event_by_id(id, &store).unwrap().unwrap();
    assert_eq!(loaded, EventRecord { id: Some(id), ..single });
}

#[test]
fn recurring_template_roundtrips_its_rule() {
    let store = SqliteStore::open_in_memory().unwrap();
    let template = weekly_gym();
    let created = create_event(&template, &store).unwrap();

    assert_eq!(created.recurrence, template.recurrence);
    assert_eq!(created.start_date, Some(date(2025, 1, 1)));
    assert_eq!(created.end_date, Some(date(2025, 1, 31)));
    assert_eq!(created.date, None);

    let rows = store
        .select(Table::Events, &[Filter::NotNull("recurrence_rule")], None)
        .unwrap();
    assert_eq!(
        rows[0].get("recurrence_rule"),
        Some(&Value::Text("FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,FR".to_string()))
    );
}

#[test]
fn invalid_records_are_rejected_before_insert() {
    let store = SqliteStore::open_in_memory().unwrap();
    let template = weekly_gym().with_end_date(date(2024, 12, 1));
    let err = create_event(&template, &store).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Invalid(RecordError::EndBeforeStart { .. })
    ));
    assert!(query_events(EventQuery::All, &store).unwrap().is_empty());
}

#[test]
fn update_replaces_fields_and_delete_removes() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut record = create_event(&EventRecord::single("Dentist", date(2025, 3, 4)), &store).unwrap();

    record.date = Some(date(2025, 3, 11));
    record.note = Some("bring x-rays".to_string());
    let updated = update_event(&record, &store).unwrap();
    assert_eq!(updated, record);

    let id = record.id.unwrap();
    assert!(delete_event(id, &store).unwrap());
    assert!(!delete_event(id, &store).unwrap());
    assert!(query_event_by_id(id, &store).unwrap().is_none());

    let err = update_event(&record, &store).unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
}

#[test]
fn month_query_filters_singles_but_keeps_all_templates() {
    let store = SqliteStore::open_in_memory().unwrap();
    create_event(&EventRecord::single("Jan", date(2025, 1, 20)), &store).unwrap();
    create_event(&EventRecord::single("Feb", date(2025, 2, 1)), &store).unwrap();
    create_event(&EventRecord::single("NextYear", date(2026, 1, 20)), &store).unwrap();
    create_event(&weekly_gym(), &store).unwrap();

    let month = query_month(YearMonth::new(2025, 1).unwrap(), &store).unwrap();
    let names: Vec<_> = month.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Jan", "Gym"]);

    let year = query_events(EventQuery::ForYear(2025), &store).unwrap();
    assert_eq!(year.len(), 3);
    assert_eq!(query_events(EventQuery::All, &store).unwrap().len(), 4);
}

#[test]
fn unparseable_stored_rule_decodes_as_daily() {
    let store = SqliteStore::open_in_memory().unwrap();
    let mut row = Row::new();
    row.insert("name".to_string(), Value::Text("Legacy".to_string()));
    row.insert("recurrence_rule".to_string(), Value::Text("every other tuesday".to_string()));
    row.insert("start_date".to_string(), Value::Text("2025-01-01".to_string()));
    store.insert(Table::Events, row).unwrap();

    let records = query_events(EventQuery::All, &store).unwrap();
    assert_eq!(records[0].recurrence, Some(RecurrenceRule::daily()));
}

#[test]
fn month_view_from_store_resolves_stored_colors() {
    let store = SqliteStore::open_in_memory().unwrap();
    create_event(&weekly_gym(), &store).unwrap();
    create_event(&EventRecord::single("Rent", date(2025, 1, 3)), &store).unwrap();

    let mut registry = NameColorRegistry::load(&store).unwrap();
    registry.set_color("Gym", "#00ff00").unwrap();

    let month = YearMonth::new(2025, 1).unwrap();
    let records = query_month(month, &store).unwrap();
    let view = MonthView::build(&records, month, &mut registry);

    let friday = &view.days["2025-01-03"];
    assert_eq!(friday.len(), 2);
    assert_eq!(friday[0].record.name, "Gym");
    assert_eq!(friday[0].color, "#00ff00");
    assert_eq!(friday[1].record.name, "Rent");

    // Colors assigned while building the view are persisted.
    let reloaded = NameColorRegistry::load(&store).unwrap();
    assert_eq!(reloaded.get("Gym"), Some("#00ff00"));
    assert!(reloaded.get("Rent").is_some());
}
