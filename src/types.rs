use chrono::NaiveDate;

use crate::error::RecordError;
use crate::recurrence::RecurrenceRule;

pub type EventId = i64;

/// A calendar entry: either a single dated event or a recurring template
/// anchored at `start_date`.
#[derive(Clone, Debug, PartialEq)]
pub struct EventRecord {
    pub id: Option<EventId>,
    pub name: String,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
    pub value: Option<f64>,
    pub color: Option<String>,
    pub recurrence: Option<RecurrenceRule>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl EventRecord {
    pub fn single(name: impl Into<String>, date: NaiveDate) -> Self {
        EventRecord {
            id: None,
            name: name.into(),
            date: Some(date),
            note: None,
            value: None,
            color: None,
            recurrence: None,
            start_date: None,
            end_date: None,
        }
    }

    pub fn recurring(name: impl Into<String>, start: NaiveDate, rule: RecurrenceRule) -> Self {
        EventRecord {
            id: None,
            name: name.into(),
            date: None,
            note: None,
            value: None,
            color: None,
            recurrence: Some(rule),
            start_date: Some(start),
            end_date: None,
        }
    }

    pub fn with_id(mut self, id: EventId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn with_value(mut self, value: f64) -> Self {
        self.value = Some(value);
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_end_date(mut self, end: NaiveDate) -> Self {
        self.end_date = Some(end);
        self
    }

    pub fn is_template(&self) -> bool {
        self.recurrence.is_some()
    }

    /// The last eligible occurrence date. The rule's `until` and the record's
    /// `end_date` are the same bound; when both are set the earlier one wins.
    pub fn effective_until(&self) -> Option<NaiveDate> {
        let until = self.recurrence.as_ref().and_then(|rule| rule.until);
        match (until, self.end_date) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    pub fn validate(&self) -> Result<(), RecordError> {
        if self.name.trim().is_empty() {
            return Err(RecordError::EmptyName);
        }
        if self.is_template() {
            let start = self.start_date.ok_or(RecordError::MissingStartDate)?;
            if let Some(end) = self.effective_until() {
                if end < start {
                    return Err(RecordError::EndBeforeStart { start, end });
                }
            }
        } else if self.date.is_none() {
            return Err(RecordError::MissingDate);
        }
        Ok(())
    }
}

/// Which events to load from the store.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventQuery {
    All,
    ForYear(i32),
    ForMonth(crate::calendar::YearMonth),
}
