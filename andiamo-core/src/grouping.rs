//! Month → day → events grouping for calendar views.
//!
//! Every event lands in exactly one day group, keyed by the calendar day of
//! its timestamp in the viewer's zone. Day groups are collected under their
//! month, and months iterate in chronological order.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, Local, NaiveDate, TimeZone};

use crate::event::Event;

/// How many days the "upcoming" projection keeps.
pub const UPCOMING_DAYS_LIMIT: usize = 7;

const MONTH_NAMES: [&str; 12] = [
    "janvier",
    "février",
    "mars",
    "avril",
    "mai",
    "juin",
    "juillet",
    "août",
    "septembre",
    "octobre",
    "novembre",
    "décembre",
];

/// Calendar month, ordered chronologically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-based month number
    pub month: u32,
}

impl MonthKey {
    pub fn of(day: NaiveDate) -> Self {
        MonthKey {
            year: day.year(),
            month: day.month(),
        }
    }

    /// Localized label, e.g. "juin 2024".
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{} {}", name, self.year)
    }
}

/// Renders as `{year}-{monthIndex}` with a zero-based month index.
impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.year, self.month.saturating_sub(1))
    }
}

/// Events sharing one calendar day.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup {
    pub date: NaiveDate,
    pub events: Vec<Event>,
}

/// Day groups within one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup {
    pub month_name: String,
    /// Ascending by day
    pub dates: Vec<DateGroup>,
    pub total_events: usize,
}

pub type GroupedEvents = BTreeMap<MonthKey, MonthGroup>;

/// Group events by month and day in the process-local zone.
pub fn group_by_month_and_day(events: &[Event]) -> GroupedEvents {
    group_by_month_and_day_in(events, &Local)
}

/// Group events by month and day in `tz`.
///
/// Same-day events are ordered by time of day; events with identical
/// timestamps keep their source order.
pub fn group_by_month_and_day_in<Tz: TimeZone>(events: &[Event], tz: &Tz) -> GroupedEvents {
    let mut days: BTreeMap<NaiveDate, Vec<Event>> = BTreeMap::new();
    for event in events {
        days.entry(event.day_in(tz)).or_default().push(event.clone());
    }

    let mut grouped = GroupedEvents::new();
    for (date, mut day_events) in days {
        day_events.sort_by_key(|e| e.date);

        let key = MonthKey::of(date);
        let month = grouped.entry(key).or_insert_with(|| MonthGroup {
            month_name: key.label(),
            dates: Vec::new(),
            total_events: 0,
        });
        month.total_events += day_events.len();
        month.dates.push(DateGroup {
            date,
            events: day_events,
        });
    }

    grouped
}

/// The nearest days, from `today` on, that have at least one event.
pub fn upcoming_dates(grouped: &GroupedEvents, today: NaiveDate) -> Vec<&DateGroup> {
    let mut upcoming: Vec<&DateGroup> = grouped
        .values()
        .flat_map(|month| month.dates.iter())
        .filter(|group| group.date >= today)
        .collect();

    upcoming.sort_by_key(|group| group.date);
    upcoming.truncate(UPCOMING_DAYS_LIMIT);
    upcoming
}
