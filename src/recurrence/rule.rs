//! Recurrence rules and their `FREQ=...;INTERVAL=...` text form.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, Weekday};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl Frequency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Frequency::Daily => "DAILY",
            Frequency::Weekly => "WEEKLY",
            Frequency::Monthly => "MONTHLY",
            Frequency::Yearly => "YEARLY",
        }
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "DAILY" => Ok(Frequency::Daily),
            "WEEKLY" => Ok(Frequency::Weekly),
            "MONTHLY" => Ok(Frequency::Monthly),
            "YEARLY" => Ok(Frequency::Yearly),
            other => Err(format!("unknown frequency '{other}'")),
        }
    }
}

/// A repeating pattern anchored at the owning record's start date.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecurrenceRule {
    pub frequency: Frequency,
    /// Step between occurrences, in units of `frequency`. Always >= 1.
    pub interval: u32,
    /// Weekdays for WEEKLY rules. Empty means the start date's weekday.
    pub by_day: Vec<Weekday>,
    /// Inclusive last eligible date.
    pub until: Option<NaiveDate>,
}

impl RecurrenceRule {
    pub fn new(frequency: Frequency) -> Self {
        RecurrenceRule {
            frequency,
            interval: 1,
            by_day: Vec::new(),
            until: None,
        }
    }

    pub fn daily() -> Self {
        Self::new(Frequency::Daily)
    }

    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval.max(1);
        self
    }

    pub fn with_by_day(mut self, days: impl IntoIterator<Item = Weekday>) -> Self {
        self.by_day.clear();
        for day in days {
            if !self.by_day.contains(&day) {
                self.by_day.push(day);
            }
        }
        self
    }

    pub fn with_until(mut self, until: Option<NaiveDate>) -> Self {
        self.until = until;
        self
    }
}

impl fmt::Display for RecurrenceRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FREQ={};INTERVAL={}", self.frequency, self.interval.max(1))?;
        if self.frequency == Frequency::Weekly && !self.by_day.is_empty() {
            let days = self
                .by_day
                .iter()
                .map(|day| weekday_code(*day))
                .collect::<Vec<_>>()
                .join(",");
            write!(f, ";BYDAY={days}")?;
        }
        if let Some(until) = self.until {
            write!(f, ";UNTIL={}", until.format("%Y-%m-%d"))?;
        }
        Ok(())
    }
}

impl FromStr for RecurrenceRule {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(parse_rule(s).into_rule())
    }
}

/// Outcome of parsing rule text. Unrecognized frequencies never fail; they
/// fall back to a daily rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedRule {
    Rule(RecurrenceRule),
    FallbackDaily { raw: String, until: Option<NaiveDate> },
}

impl ParsedRule {
    pub fn is_fallback(&self) -> bool {
        matches!(self, ParsedRule::FallbackDaily { .. })
    }

    pub fn into_rule(self) -> RecurrenceRule {
        match self {
            ParsedRule::Rule(rule) => rule,
            ParsedRule::FallbackDaily { until, .. } => RecurrenceRule::daily().with_until(until),
        }
    }
}

/// Parses `FREQ=WEEKLY;INTERVAL=2;BYDAY=MO,FR;UNTIL=2025-01-15` style text.
///
/// Keys are case-insensitive and may be preceded by `RRULE:`. Unknown keys are
/// ignored, a bad `INTERVAL` becomes 1, unknown `BYDAY` codes are dropped, and a
/// missing or unknown `FREQ` produces [`ParsedRule::FallbackDaily`].
pub fn parse_rule(text: &str) -> ParsedRule {
    let trimmed = text.trim();
    let body = strip_prefix_ignore_case(trimmed, "RRULE:").unwrap_or(trimmed);

    let mut frequency = None;
    let mut interval = 1;
    let mut by_day = Vec::new();
    let mut until = None;

    for part in body.split(';') {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        let value = value.trim();
        match key.trim().to_ascii_uppercase().as_str() {
            "FREQ" => frequency = value.parse::<Frequency>().ok(),
            "INTERVAL" => interval = parse_interval(value),
            "BYDAY" => by_day = value.split(',').filter_map(parse_weekday).collect(),
            "UNTIL" => until = parse_until(value),
            _ => {}
        }
    }

    match frequency {
        Some(frequency) => ParsedRule::Rule(
            RecurrenceRule::new(frequency)
                .with_interval(interval)
                .with_by_day(by_day)
                .with_until(until),
        ),
        None => {
            log::debug!("event=rule_fallback module=recurrence status=fallback raw={trimmed:?}");
            ParsedRule::FallbackDaily {
                raw: trimmed.to_string(),
                until,
            }
        }
    }
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

fn parse_interval(value: &str) -> u32 {
    match value.parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}

/// Accepts `MO`, `mo`, and ordinal forms such as `1MO` or `-1FR` (the ordinal is ignored).
pub fn parse_weekday(code: &str) -> Option<Weekday> {
    let code = code
        .trim()
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '+' || c == '-');
    match code.to_ascii_uppercase().as_str() {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

pub fn weekday_code(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn parse_until(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y%m%d"))
        .ok()
        .or_else(|| {
            // 20250115T000000Z: only the date part matters for all-day events.
            let date_part = value.get(..8)?;
            value
                .get(8..9)
                .filter(|t| t.eq_ignore_ascii_case("T"))
                .and_then(|_| NaiveDate::parse_from_str(date_part, "%Y%m%d").ok())
        })
}
