//! Calendar arithmetic: months, month grids and bounded navigation.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, Local, NaiveDate};
use serde::Deserialize;
use thiserror::Error;

/// Number of cells in a month grid (6 weeks of 7 days).
pub const GRID_CELLS: usize = 42;

const ISO_DATE: &str = "%Y-%m-%d";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid month '{0}', expected YYYY-MM")]
pub struct ParseYearMonthError(String);

/// A calendar month. Always holds a valid first and last day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub struct YearMonth {
    first: NaiveDate,
    last: NaiveDate,
}

impl YearMonth {
    /// Returns `None` when `month` is not in 1..=12 or the year is outside chrono's range.
    pub fn new(year: i32, month: u32) -> Option<Self> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)?;
        let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month))?;
        Some(YearMonth { first, last })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        let first = date.with_day(1).unwrap_or(date);
        let last = date
            .with_day(days_in_month(date.year(), date.month()))
            .unwrap_or(date);
        YearMonth { first, last }
    }

    pub fn current() -> Self {
        Self::from_date(Local::now().date_naive())
    }

    pub fn year(&self) -> i32 {
        self.first.year()
    }

    pub fn month(&self) -> u32 {
        self.first.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first
    }

    pub fn last_day(&self) -> NaiveDate {
        self.last
    }

    pub fn days_in_month(&self) -> u32 {
        self.last.day()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.first <= date && date <= self.last
    }

    /// The following month; saturates at the end of chrono's supported range.
    pub fn next(self) -> Self {
        self.last
            .succ_opt()
            .map(Self::from_date)
            .unwrap_or(self)
    }

    /// The preceding month; saturates at the start of chrono's supported range.
    pub fn prev(self) -> Self {
        self.first
            .pred_opt()
            .map(Self::from_date)
            .unwrap_or(self)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = ParseYearMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseYearMonthError(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(err)?;
        let year = year.parse::<i32>().map_err(|_| err())?;
        let month = month.parse::<u32>().map_err(|_| err())?;
        YearMonth::new(year, month).ok_or_else(err)
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ParseYearMonthError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Days in the given month, accounting for leap years. Returns 0 for an invalid month.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Formats a date as the `YYYY-MM-DD` key used for day groupings.
pub fn iso(date: NaiveDate) -> String {
    date.format(ISO_DATE).to_string()
}

pub fn parse_iso(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridCell {
    pub date: NaiveDate,
    pub in_month: bool,
}

/// Builds the 6x7 grid shown for a month. Weeks start on Sunday; cells before
/// the first and after the last day belong to the neighbouring months.
pub fn month_grid(month: YearMonth) -> Vec<GridCell> {
    let first = month.first_day();
    let lead = u64::from(first.weekday().num_days_from_sunday());
    let start = first.checked_sub_days(Days::new(lead)).unwrap_or(first);
    start
        .iter_days()
        .take(GRID_CELLS)
        .map(|date| GridCell {
            date,
            in_month: month.contains(date),
        })
        .collect()
}

/// Inclusive bounds on which months may be navigated to. `None` means unbounded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ViewRange {
    pub first_month: Option<YearMonth>,
    pub last_month: Option<YearMonth>,
}

impl ViewRange {
    pub fn clamp(&self, month: YearMonth) -> YearMonth {
        match (self.first_month, self.last_month) {
            (Some(first), _) if month < first => first,
            (_, Some(last)) if month > last => last,
            _ => month,
        }
    }

    pub fn can_go_prev(&self, month: YearMonth) -> bool {
        self.first_month.is_none_or(|first| month > first)
    }

    pub fn can_go_next(&self, month: YearMonth) -> bool {
        self.last_month.is_none_or(|last| month < last)
    }
}
