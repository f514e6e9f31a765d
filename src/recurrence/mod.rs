//! Recurrence rules and their expansion into calendar dates.

mod expand;
mod rule;

pub use expand::{Occurrence, expand, occurrences};
pub use rule::{
    Frequency, ParsedRule, RecurrenceRule, parse_rule, parse_weekday, weekday_code,
};
