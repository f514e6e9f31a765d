//! Expansion of recurring templates into concrete dates inside a window.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::recurrence::Frequency;
use crate::types::{EventId, EventRecord};

/// One concrete date produced by a template. The template id is shared by all
/// of its occurrences, so `(template_id, date)` is the occurrence identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Occurrence {
    pub template_id: Option<EventId>,
    pub date: NaiveDate,
}

impl Occurrence {
    /// The displayable record for this occurrence: the template with `date` set.
    pub fn materialize(&self, template: &EventRecord) -> EventRecord {
        EventRecord {
            date: Some(self.date),
            ..template.clone()
        }
    }
}

/// Returns the dates in `[window_start, window_end]` on which `template` occurs,
/// in ascending order.
///
/// Records without a rule or start date, inverted windows, and bounds that end
/// before the start date all produce an empty list.
pub fn expand(template: &EventRecord, window_start: NaiveDate, window_end: NaiveDate) -> Vec<NaiveDate> {
    let (Some(rule), Some(start)) = (template.recurrence.as_ref(), template.start_date) else {
        return Vec::new();
    };
    let upper = match template.effective_until() {
        Some(until) => window_end.min(until),
        None => window_end,
    };
    let lower = start.max(window_start);
    if lower > upper {
        return Vec::new();
    }

    let interval = rule.interval.max(1);
    match rule.frequency {
        Frequency::Daily => expand_daily(start, interval, lower, upper),
        Frequency::Weekly => expand_weekly(start, interval, &rule.by_day, lower, upper),
        Frequency::Monthly => expand_monthly(start, interval, lower, upper),
        Frequency::Yearly => expand_monthly(start, interval.saturating_mul(12), lower, upper),
    }
}

/// Like [`expand`], but pairs each date with the template's id.
pub fn occurrences(template: &EventRecord, window_start: NaiveDate, window_end: NaiveDate) -> Vec<Occurrence> {
    expand(template, window_start, window_end)
        .into_iter()
        .map(|date| Occurrence {
            template_id: template.id,
            date,
        })
        .collect()
}

/// Smallest multiple of `step` that is >= `offset`. Both are non-negative.
fn align_up(offset: i64, step: i64) -> i64 {
    (offset + step - 1) / step * step
}

fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_days(Days::new(u64::try_from(days).ok()?))
}

fn expand_daily(start: NaiveDate, interval: u32, lower: NaiveDate, upper: NaiveDate) -> Vec<NaiveDate> {
    let step = i64::from(interval);
    let offset = lower.signed_duration_since(start).num_days();
    let mut dates = Vec::new();
    let mut cursor = add_days(start, align_up(offset, step));
    while let Some(date) = cursor.filter(|date| *date <= upper) {
        dates.push(date);
        cursor = add_days(date, step);
    }
    dates
}

/// The Sunday that opens the week containing `date`.
fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_sunday());
    date.checked_sub_days(Days::new(back)).unwrap_or(date)
}

fn expand_weekly(
    start: NaiveDate,
    interval: u32,
    by_day: &[Weekday],
    lower: NaiveDate,
    upper: NaiveDate,
) -> Vec<NaiveDate> {
    let weekdays = if by_day.is_empty() {
        vec![start.weekday()]
    } else {
        by_day.to_vec()
    };
    let anchor = week_start(start);
    let step = i64::from(interval) * 7;
    let offset = week_start(lower).signed_duration_since(anchor).num_days();

    let mut dates = Vec::new();
    let mut cursor = add_days(anchor, align_up(offset, step));
    while let Some(week) = cursor.filter(|week| *week <= upper) {
        dates.extend(
            week.iter_days()
                .take(7)
                .filter(|day| lower <= *day && *day <= upper)
                .filter(|day| weekdays.contains(&day.weekday())),
        );
        cursor = add_days(week, step);
    }
    dates
}

fn month_index(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 12 + i64::from(date.month0())
}

/// Same day-of-month as `start`, every `step` months. Months without that day
/// are skipped, so a day-31 anchor only lands in 31-day months.
fn expand_monthly(start: NaiveDate, step: u32, lower: NaiveDate, upper: NaiveDate) -> Vec<NaiveDate> {
    let step = i64::from(step);
    let anchor = month_index(start);
    let last = month_index(upper);
    let day = start.day();

    let mut dates = Vec::new();
    let mut index = anchor + align_up(month_index(lower) - anchor, step);
    while index <= last {
        let candidate = i32::try_from(index.div_euclid(12)).ok().and_then(|year| {
            let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        });
        if let Some(date) = candidate.filter(|date| lower <= *date && *date <= upper) {
            dates.push(date);
        }
        index += step;
    }
    dates
}
