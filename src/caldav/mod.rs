//! Conversion between tasks and iCalendar text.
//!
//! The builder writes the VTODO and VEVENT feeds by hand so that the output
//! is stable line for line; the parser reads client uploads with the `ical`
//! crate.

mod builder;
mod feed;
mod parser;

pub use builder::{alarm_trigger, events_to_ical, format_time, priority_to_ical, todos_to_ical};
pub use feed::{CalendarComponent, delete_task, get_task, list_calendar, put_task};
pub use parser::{ical_to_priority, parse_duration, parse_time, parse_todo};

use chrono::{DateTime, Duration, Utc};

use crate::types::RepeatMode;

/// Product name written into `PRODID`.
pub const PROD_ID: &str = "Tasklane Todo App";

/// Calendar-wide settings of a feed.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub name: String,
    pub prod_id: String,
    /// Hex color without alpha, with or without a leading `#`.
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alarm {
    pub time: DateTime<Utc>,
    pub description: String,
}

/// One VTODO.
#[derive(Debug, Clone, Default)]
pub struct Todo {
    pub timestamp: DateTime<Utc>,
    pub uid: String,
    pub summary: String,
    pub description: String,
    pub completed: Option<DateTime<Utc>>,
    /// Internal scale: 0 unset, 1 lowest, 9 highest.
    pub priority: i64,
    pub related_to_uid: String,
    pub color: String,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub due_date: Option<DateTime<Utc>>,
    pub duration: Option<Duration>,
    pub repeat_after: i64,
    pub repeat_mode: RepeatMode,
    pub alarms: Vec<Alarm>,
    pub created: Option<DateTime<Utc>>,
    pub updated: DateTime<Utc>,
}

/// One VEVENT.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub summary: String,
    pub description: String,
    pub uid: String,
    pub alarms: Vec<Alarm>,
    pub color: String,
    pub timestamp: DateTime<Utc>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}
