//! Month calendar engine: recurrence expansion, per-name colors and day grouping.

pub mod assemble;
pub mod calendar;
pub mod color;
pub mod config;
pub mod error;
pub mod logging;
pub mod recurrence;
pub mod registry;
pub mod store;
pub mod types;

pub use assemble::{DayEntry, DayGroups, MonthView, assemble, month_total};
pub use calendar::{ViewRange, YearMonth};
pub use error::{ConfigError, RecordError, RegistryError, StoreError, StoreResult};
pub use recurrence::{Frequency, Occurrence, ParsedRule, RecurrenceRule, expand, parse_rule};
pub use registry::NameColorRegistry;
pub use store::{SqliteStore, TableStore};
pub use types::{EventId, EventQuery, EventRecord};
