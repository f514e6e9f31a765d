//! Month assembly: places single events and expanded templates under their days.

use std::collections::{BTreeMap, BTreeSet};

use crate::calendar::{GridCell, YearMonth, iso, month_grid};
use crate::recurrence::{Occurrence, occurrences};
use crate::registry::NameColorRegistry;
use crate::types::EventRecord;

/// An event as shown on a given day.
#[derive(Clone, Debug, PartialEq)]
pub struct DayEntry {
    pub record: EventRecord,
    pub color: String,
    /// Set when the entry was produced by a recurring template.
    pub origin: Option<Occurrence>,
}

/// Day entries keyed by `YYYY-MM-DD`.
pub type DayGroups = BTreeMap<String, Vec<DayEntry>>;

/// Groups `records` by day for the given month.
///
/// Only days inside the month appear. Records with neither a date nor a rule
/// are skipped. Each day is ordered by name, then note.
pub fn assemble(
    records: &[EventRecord],
    year: i32,
    month: u32,
    registry: &mut NameColorRegistry<'_>,
) -> DayGroups {
    let Some(month) = YearMonth::new(year, month) else {
        return DayGroups::new();
    };
    let mut days = DayGroups::new();

    for record in records {
        if record.is_template() {
            for occurrence in occurrences(record, month.first_day(), month.last_day()) {
                let entry = DayEntry {
                    record: occurrence.materialize(record),
                    color: registry.resolve(record),
                    origin: Some(occurrence),
                };
                days.entry(iso(occurrence.date)).or_default().push(entry);
            }
        } else if let Some(date) = record.date {
            if month.contains(date) {
                let entry = DayEntry {
                    record: record.clone(),
                    color: registry.resolve(record),
                    origin: None,
                };
                days.entry(iso(date)).or_default().push(entry);
            }
        } else {
            log::debug!(
                "event=skip_unplaceable module=assemble status=skipped id={:?}",
                record.id
            );
        }
    }

    for entries in days.values_mut() {
        entries.sort_by(|a, b| {
            a.record.name.cmp(&b.record.name).then_with(|| {
                let note_a = a.record.note.as_deref().unwrap_or("");
                let note_b = b.record.note.as_deref().unwrap_or("");
                note_a.cmp(note_b)
            })
        });
    }
    days
}

/// Sum of `value` over every entry in the month.
pub fn month_total(days: &DayGroups) -> f64 {
    days.values()
        .flatten()
        .filter_map(|entry| entry.record.value)
        .sum()
}

/// Everything needed to draw one month.
#[derive(Clone, Debug, PartialEq)]
pub struct MonthView {
    pub month: YearMonth,
    pub grid: Vec<GridCell>,
    pub days: DayGroups,
    /// Names shown this month with their registry colors, sorted by name.
    /// Per-record color overrides do not change the legend.
    pub legend: Vec<(String, String)>,
    pub total: f64,
}

impl MonthView {
    pub fn build(
        records: &[EventRecord],
        month: YearMonth,
        registry: &mut NameColorRegistry<'_>,
    ) -> Self {
        let days = assemble(records, month.year(), month.month(), registry);
        let names: BTreeSet<&str> = days
            .values()
            .flatten()
            .map(|entry| entry.record.name.as_str())
            .collect();
        let legend = names
            .into_iter()
            .map(|name| (name.to_string(), registry.color_for(name)))
            .collect();
        let total = month_total(&days);
        MonthView {
            month,
            grid: month_grid(month),
            days,
            legend,
            total,
        }
    }

    pub fn entries_on(&self, cell: &GridCell) -> &[DayEntry] {
        self.days
            .get(&iso(cell.date))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::recurrence::parse_rule;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Vec<EventRecord> {
        vec![
            EventRecord::single("Rent", date(2025, 1, 6)).with_id(1).with_value(1200.0),
            EventRecord::single("Dentist", date(2025, 1, 6)).with_id(2),
            EventRecord::single("Dentist", date(2025, 2, 6)).with_id(3),
            EventRecord::recurring(
                "Gym",
                date(2025, 1, 1),
                parse_rule("FREQ=WEEKLY;BYDAY=MO,FR").into_rule(),
            )
            .with_id(4)
            .with_value(10.0),
            EventRecord::recurring("Gym", date(2025, 1, 6), parse_rule("FREQ=MONTHLY").into_rule())
                .with_id(5)
                .with_note("assessment"),
            EventRecord {
                date: None,
                ..EventRecord::single("Nowhere", date(2025, 1, 1))
            },
        ]
    }

    #[test]
    fn groups_singles_and_occurrences_by_day() {
        let mut registry = NameColorRegistry::new();
        let days = assemble(&sample(), 2025, 1, &mut registry);

        let monday = &days["2025-01-06"];
        let names: Vec<_> = monday.iter().map(|e| e.record.name.as_str()).collect();
        assert_eq!(names, vec!["Dentist", "Gym", "Gym", "Rent"]);
        // Missing note sorts before "assessment".
        assert_eq!(monday[1].record.note, None);
        assert_eq!(monday[2].record.note.as_deref(), Some("assessment"));
        assert_eq!(monday[1].origin, Some(Occurrence { template_id: Some(4), date: date(2025, 1, 6) }));
        assert_eq!(monday[1].record.date, Some(date(2025, 1, 6)));
        assert_eq!(monday[0].origin, None);

        assert!(days.contains_key("2025-01-03"));
        assert!(!days.contains_key("2025-01-01"));
    }

    #[test]
    fn never_places_days_outside_the_month() {
        let mut registry = NameColorRegistry::new();
        let days = assemble(&sample(), 2025, 2, &mut registry);
        assert!(days.keys().all(|key| key.starts_with("2025-02-")));
        assert!(days.contains_key("2025-02-06"));
        assert!(assemble(&sample(), 2025, 13, &mut registry).is_empty());
    }

    #[test]
    fn unplaceable_and_empty_templates_contribute_nothing() {
        let mut registry = NameColorRegistry::new();
        let records = vec![
            EventRecord {
                date: None,
                ..EventRecord::single("Nowhere", date(2025, 1, 1))
            },
            EventRecord::recurring("Later", date(2025, 6, 1), parse_rule("FREQ=DAILY").into_rule()),
        ];
        assert!(assemble(&records, 2025, 1, &mut registry).is_empty());
    }

    #[test]
    fn assembling_twice_gives_identical_output() {
        let mut registry = NameColorRegistry::new();
        let records = sample();
        let first = assemble(&records, 2025, 1, &mut registry);
        let second = assemble(&records, 2025, 1, &mut registry);
        assert_eq!(first, second);
    }

    #[test]
    fn entries_with_the_same_name_share_a_color() {
        let mut registry = NameColorRegistry::new();
        let days = assemble(&sample(), 2025, 1, &mut registry);
        let gym: Vec<_> = days
            .values()
            .flatten()
            .filter(|e| e.record.name == "Gym")
            .map(|e| e.color.clone())
            .collect();
        assert!(gym.len() > 2);
        assert!(gym.iter().all(|c| *c == gym[0]));
    }

    #[test]
    fn month_view_collects_grid_legend_and_total() {
        let mut registry = NameColorRegistry::new();
        registry.set_color("Rent", "#ff0000").unwrap();
        let month = YearMonth::new(2025, 1).unwrap();
        let view = MonthView::build(&sample(), month, &mut registry);

        assert_eq!(view.grid.len(), 42);
        let names: Vec<_> = view.legend.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["Dentist", "Gym", "Rent"]);
        assert!(view.legend.contains(&("Rent".to_string(), "#ff0000".to_string())));
        // Rent once plus nine Monday/Friday gym sessions.
        assert_eq!(view.total, 1200.0 + 9.0 * 10.0);

        let cell = view.grid.iter().find(|c| c.date == date(2025, 1, 6)).unwrap();
        assert_eq!(view.entries_on(cell).len(), 4);
    }

    #[test]
    fn legend_uses_registry_color_despite_record_overrides() {
        let mut registry = NameColorRegistry::new();
        registry.set_color("Rent", "#00ff00").unwrap();
        let records = vec![
            EventRecord::single("Rent", date(2025, 1, 1)).with_id(1),
            EventRecord::single("Rent", date(2025, 1, 20))
                .with_id(2)
                .with_color("#ff0000"),
        ];
        let view = MonthView::build(&records, YearMonth::new(2025, 1).unwrap(), &mut registry);

        assert_eq!(view.legend, vec![("Rent".to_string(), "#00ff00".to_string())]);
        assert_eq!(view.days["2025-01-20"][0].color, "#ff0000");
    }
}
