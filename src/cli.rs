//! CLI argument parsing and command handling.

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use moncal::calendar::iso;
use moncal::color::is_valid_hex;
use moncal::config::Config;
use moncal::recurrence::{Frequency, RecurrenceRule, parse_rule, parse_weekday};
use moncal::store::{TableStore, events};
use moncal::{EventId, EventQuery, EventRecord, MonthView, NameColorRegistry, YearMonth};

#[derive(Parser)]
#[command(
    name = "moncal",
    version,
    about = "Moncal - A month calendar with recurring events"
)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Event {
        #[command(subcommand)]
        command: EventCommand,
    },
    /// Show a month (YYYY-MM); defaults to the current month
    Month { month: Option<YearMonth> },
    Color {
        #[command(subcommand)]
        command: ColorCommand,
    },
}

impl Default for Command {
    fn default() -> Self {
        Command::Month { month: None }
    }
}

#[derive(Subcommand, Debug)]
pub enum EventCommand {
    Add {
        name: String,
        #[command(flatten)]
        fields: EventFields,
    },
    Edit {
        id: EventId,
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: EventFields,
    },
    Delete {
        id: EventId,
    },
    List {
        #[arg(short = 'y', long = "year")]
        year: Option<i32>,
    },
}

#[derive(Args, Debug, Default)]
pub struct EventFields {
    /// Date of a single event (YYYY-MM-DD)
    #[arg(short = 'd', long = "date")]
    pub date: Option<NaiveDate>,
    /// First day of a recurring event
    #[arg(short = 's', long = "start")]
    pub start: Option<NaiveDate>,
    /// Last day (inclusive) of a recurring event
    #[arg(short = 'e', long = "end")]
    pub end: Option<NaiveDate>,
    /// DAILY, WEEKLY, MONTHLY or YEARLY
    #[arg(short = 'f', long = "freq")]
    pub freq: Option<Frequency>,
    #[arg(short = 'i', long = "interval")]
    pub interval: Option<u32>,
    /// Weekdays for weekly events, e.g. MO,FR
    #[arg(long = "by-day", value_delimiter = ',')]
    pub by_day: Vec<String>,
    /// Custom rule text, e.g. "FREQ=WEEKLY;INTERVAL=2;BYDAY=TU"
    #[arg(long = "rule")]
    pub rule: Option<String>,
    #[arg(short = 'n', long = "note")]
    pub note: Option<String>,
    #[arg(long = "value")]
    pub value: Option<f64>,
    #[arg(short = 'c', long = "color")]
    pub color: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ColorCommand {
    Set { name: String, color: String },
    Remove { name: String },
    Show { name: String },
    List,
}

/// Execute a CLI command (event, month, or color).
pub fn run(command: Command, store: &dyn TableStore, config: &Config) -> Result<()> {
    match command {
        Command::Event {
            command: EventCommand::Add { name, fields },
        } => handle_event_add(name, fields, store)?,
        Command::Event {
            command: EventCommand::Edit { id, name, fields },
        } => handle_event_edit(id, name, fields, store)?,
        Command::Event {
            command: EventCommand::Delete { id },
        } => handle_event_delete(id, store)?,
        Command::Event {
            command: EventCommand::List { year },
        } => handle_event_list(year, store)?,
        Command::Month { month } => handle_month(month, store, config)?,
        Command::Color { command } => handle_color(command, store)?,
    }
    Ok(())
}

fn build_rule(fields: &EventFields) -> Option<RecurrenceRule> {
    if let Some(raw) = &fields.rule {
        let parsed = parse_rule(raw);
        if parsed.is_fallback() {
            println!("Unrecognized rule '{raw}', treating it as daily.");
        }
        return Some(parsed.into_rule());
    }
    let frequency = fields.freq?;
    Some(
        RecurrenceRule::new(frequency)
            .with_interval(fields.interval.unwrap_or(1))
            .with_by_day(fields.by_day.iter().filter_map(|day| parse_weekday(day))),
    )
}

/// Copies note, value and color onto `record`. Returns false on an invalid color.
fn apply_details(record: &mut EventRecord, fields: &EventFields) -> bool {
    if let Some(color) = &fields.color {
        if !is_valid_hex(color) {
            println!("Invalid color format. Please provide a hex code like #RRGGBB.");
            return false;
        }
        record.color = Some(color.clone());
    }
    if let Some(note) = &fields.note {
        record.note = (!note.is_empty()).then(|| note.clone());
    }
    if fields.value.is_some() {
        record.value = fields.value;
    }
    true
}

fn handle_event_add(name: String, fields: EventFields, store: &dyn TableStore) -> Result<()> {
    let mut record = match build_rule(&fields) {
        Some(rule) => {
            let Some(start) = fields.start.or(fields.date) else {
                println!("Start date is required for a recurring event.");
                return Ok(());
            };
            let mut record = EventRecord::recurring(name, start, rule);
            record.end_date = fields.end;
            record
        }
        None => {
            let Some(date) = fields.date else {
                println!("Date is required.");
                return Ok(());
            };
            EventRecord::single(name, date)
        }
    };
    if !apply_details(&mut record, &fields) {
        return Ok(());
    }
    if let Err(err) = record.validate() {
        println!("{err}");
        return Ok(());
    }
    let created = events::create_event(&record, store)?;
    if let Some(id) = created.id {
        println!("Created event {id} '{}'", created.name);
    }
    Ok(())
}

fn handle_event_edit(
    id: EventId,
    name: Option<String>,
    fields: EventFields,
    store: &dyn TableStore,
) -> Result<()> {
    let Some(mut record) = events::query_event_by_id(id, store)? else {
        println!("Event {id} not found");
        return Ok(());
    };
    if let Some(name) = name {
        record.name = name;
    }
    if record.is_template() {
        if let Some(rule) = build_rule(&fields) {
            record.recurrence = Some(rule);
        }
        if fields.start.is_some() {
            record.start_date = fields.start;
        }
        if let Some(end) = fields.end {
            record.end_date = Some(end);
            // A rule UNTIL would otherwise keep the old bound.
            if let Some(rule) = record.recurrence.as_mut().filter(|rule| rule.until.is_some()) {
                rule.until = Some(end);
            }
        }
    } else if fields.date.is_some() {
        record.date = fields.date;
    }
    if !apply_details(&mut record, &fields) {
        return Ok(());
    }
    if let Err(err) = record.validate() {
        println!("{err}");
        return Ok(());
    }
    events::update_event(&record, store)?;
    println!("Updated event {id}");
    Ok(())
}

fn handle_event_delete(id: EventId, store: &dyn TableStore) -> Result<()> {
    if events::delete_event(id, store)? {
        println!("Deleted event {id}");
    } else {
        println!("Event {id} not found");
    }
    Ok(())
}

fn handle_event_list(year: Option<i32>, store: &dyn TableStore) -> Result<()> {
    let query = year.map_or(EventQuery::All, EventQuery::ForYear);
    for record in events::query_events(query, store)? {
        let id = record.id.map(|id| id.to_string()).unwrap_or_default();
        let when = match (&record.recurrence, record.date, record.start_date) {
            (Some(rule), _, Some(start)) => format!("from {} {rule}", iso(start)),
            (None, Some(date), _) => iso(date),
            _ => "-".to_string(),
        };
        println!("{id:>5}  {:<20} {when}", record.name);
    }
    Ok(())
}

fn handle_month(month: Option<YearMonth>, store: &dyn TableStore, config: &Config) -> Result<()> {
    let range = config.view;
    let month = range.clamp(month.unwrap_or_else(YearMonth::current));
    let records = events::query_month(month, store)?;
    let mut registry = NameColorRegistry::load(store)?;
    let view = MonthView::build(&records, month, &mut registry);

    let prev = if range.can_go_prev(month) {
        month.prev().to_string()
    } else {
        "-------".to_string()
    };
    let next = if range.can_go_next(month) {
        month.next().to_string()
    } else {
        "-------".to_string()
    };
    println!("{prev} < {} > {next}", view.month);

    for cell in view.grid.iter().filter(|cell| cell.in_month) {
        let entries = view.entries_on(cell);
        if entries.is_empty() {
            continue;
        }
        println!("{} {}", iso(cell.date), cell.date.format("%a"));
        for entry in entries {
            let mut line = format!("  {} {}", entry.color, entry.record.name);
            if let Some(note) = &entry.record.note {
                line.push_str(&format!(" - {note}"));
            }
            if let Some(value) = entry.record.value {
                line.push_str(&format!(" ({value:.2})"));
            }
            println!("{line}");
        }
    }
    if view.total != 0.0 {
        println!("Total: {:.2}", view.total);
    }
    Ok(())
}

fn handle_color(command: ColorCommand, store: &dyn TableStore) -> Result<()> {
    let mut registry = NameColorRegistry::load(store)?;
    match command {
        ColorCommand::Set { name, color } => match registry.set_color(&name, &color) {
            Ok(()) => println!("'{name}' is now {color}"),
            Err(err) => println!("{err}"),
        },
        ColorCommand::Remove { name } => match registry.remove_color(&name) {
            Some(_) => println!("Removed color for '{name}'"),
            None => println!("No color stored for '{name}'"),
        },
        ColorCommand::Show { name } => println!("{}", registry.color_for(&name)),
        ColorCommand::List => {
            for (name, color) in registry.legend() {
                println!("{color}  {name}");
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use moncal::SqliteStore;
    use moncal::recurrence::expand;
    use moncal::store::name_colors;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn only_event(store: &SqliteStore) -> EventRecord {
        let mut records = events::query_events(EventQuery::All, store).unwrap();
        assert_eq!(records.len(), 1);
        records.remove(0)
    }

    fn january(record: &EventRecord) -> Vec<NaiveDate> {
        expand(record, date(2025, 1, 1), date(2025, 1, 31))
    }

    #[test]
    fn add_single_and_recurring_events() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = EventFields {
            date: Some(date(2025, 1, 6)),
            note: Some("checkup".to_string()),
            value: Some(40.0),
            ..Default::default()
        };
        handle_event_add("Dentist".to_string(), fields, &store).unwrap();

        let fields = EventFields {
            start: Some(date(2025, 1, 1)),
            freq: Some(Frequency::Weekly),
            by_day: vec!["MO".to_string(), "FR".to_string()],
            ..Default::default()
        };
        handle_event_add("Gym".to_string(), fields, &store).unwrap();

        let records = events::query_events(EventQuery::All, &store).unwrap();
        assert_eq!(records.len(), 2);
        let dentist = records.iter().find(|r| r.name == "Dentist").unwrap();
        assert_eq!(dentist.date, Some(date(2025, 1, 6)));
        assert_eq!(dentist.note.as_deref(), Some("checkup"));
        assert_eq!(dentist.value, Some(40.0));
        let gym = records.iter().find(|r| r.name == "Gym").unwrap();
        assert_eq!(gym.recurrence.as_ref().unwrap().to_string(), "FREQ=WEEKLY;INTERVAL=1;BYDAY=MO,FR");
    }

    #[test]
    fn add_rejects_missing_dates_and_bad_colors() {
        let store = SqliteStore::open_in_memory().unwrap();
        handle_event_add("Nowhere".to_string(), EventFields::default(), &store).unwrap();
        let fields = EventFields {
            freq: Some(Frequency::Daily),
            ..Default::default()
        };
        handle_event_add("Unanchored".to_string(), fields, &store).unwrap();
        let fields = EventFields {
            date: Some(date(2025, 1, 6)),
            color: Some("red".to_string()),
            ..Default::default()
        };
        handle_event_add("Painted".to_string(), fields, &store).unwrap();

        assert!(events::query_events(EventQuery::All, &store).unwrap().is_empty());
    }

    #[test]
    fn edit_end_extends_a_recurring_event() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = EventFields {
            start: Some(date(2025, 1, 1)),
            end: Some(date(2025, 1, 10)),
            freq: Some(Frequency::Daily),
            ..Default::default()
        };
        handle_event_add("Gym".to_string(), fields, &store).unwrap();
        let gym = only_event(&store);
        assert_eq!(january(&gym).last(), Some(&date(2025, 1, 10)));

        let fields = EventFields {
            end: Some(date(2025, 1, 31)),
            ..Default::default()
        };
        handle_event_edit(gym.id.unwrap(), None, fields, &store).unwrap();

        let gym = only_event(&store);
        assert_eq!(gym.end_date, Some(date(2025, 1, 31)));
        let dates = january(&gym);
        assert_eq!(dates.len(), 31);
        assert_eq!(dates.last(), Some(&date(2025, 1, 31)));
    }

    #[test]
    fn edit_end_moves_an_explicit_rule_until() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = EventFields {
            start: Some(date(2025, 1, 1)),
            rule: Some("FREQ=DAILY;UNTIL=2025-01-10".to_string()),
            ..Default::default()
        };
        handle_event_add("Gym".to_string(), fields, &store).unwrap();
        let gym = only_event(&store);

        let fields = EventFields {
            end: Some(date(2025, 1, 20)),
            ..Default::default()
        };
        handle_event_edit(gym.id.unwrap(), None, fields, &store).unwrap();

        let gym = only_event(&store);
        assert_eq!(gym.recurrence.as_ref().unwrap().until, Some(date(2025, 1, 20)));
        assert_eq!(january(&gym).last(), Some(&date(2025, 1, 20)));
    }

    #[test]
    fn edit_renames_and_moves_a_single_event() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = EventFields {
            date: Some(date(2025, 1, 6)),
            ..Default::default()
        };
        handle_event_add("Dentist".to_string(), fields, &store).unwrap();
        let id = only_event(&store).id.unwrap();

        let fields = EventFields {
            date: Some(date(2025, 1, 8)),
            note: Some(String::new()),
            ..Default::default()
        };
        handle_event_edit(id, Some("Doctor".to_string()), fields, &store).unwrap();

        let record = only_event(&store);
        assert_eq!(record.name, "Doctor");
        assert_eq!(record.date, Some(date(2025, 1, 8)));
        assert_eq!(record.note, None);

        handle_event_delete(id, &store).unwrap();
        assert!(events::query_events(EventQuery::All, &store).unwrap().is_empty());
        // Deleting again only reports the missing id.
        handle_event_delete(id, &store).unwrap();
    }

    #[test]
    fn color_commands_update_the_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let set = |color: &str| ColorCommand::Set {
            name: "Gym".to_string(),
            color: color.to_string(),
        };

        handle_color(set("#123abc"), &store).unwrap();
        assert_eq!(name_colors::query_color("Gym", &store).unwrap().as_deref(), Some("#123abc"));

        handle_color(set("blue"), &store).unwrap();
        assert_eq!(name_colors::query_color("Gym", &store).unwrap().as_deref(), Some("#123abc"));

        handle_color(ColorCommand::Remove { name: "Gym".to_string() }, &store).unwrap();
        assert_eq!(name_colors::query_color("Gym", &store).unwrap(), None);

        // Showing a name assigns and persists its derived color.
        handle_color(ColorCommand::Show { name: "Swim".to_string() }, &store).unwrap();
        assert!(name_colors::query_color("Swim", &store).unwrap().is_some());
    }

    #[test]
    fn month_and_list_run_against_the_store() {
        let store = SqliteStore::open_in_memory().unwrap();
        let fields = EventFields {
            date: Some(date(2025, 1, 6)),
            ..Default::default()
        };
        handle_event_add("Dentist".to_string(), fields, &store).unwrap();

        let month = YearMonth::new(2025, 1);
        handle_month(month, &store, &Config::default()).unwrap();
        handle_event_list(Some(2025), &store).unwrap();
        assert!(name_colors::query_color("Dentist", &store).unwrap().is_some());
    }
}
