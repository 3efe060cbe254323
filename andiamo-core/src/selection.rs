//! Selected-day state and the events visible for it.

use std::collections::HashSet;

use chrono::{Datelike, Duration, NaiveDate, TimeZone};

use crate::event::Event;

/// Days shown in the horizontal day picker.
pub const WEEK_STRIP_LEN: usize = 14;
/// How many days before today the picker starts.
pub const WEEK_STRIP_LEAD_DAYS: i64 = 3;

const WEEKDAY_LABELS: [&str; 7] = ["DIM", "LUN", "MAR", "MER", "JEU", "VEN", "SAM"];

/// The one calendar day the user is looking at, if any.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    selected: Option<NaiveDate>,
}

impl Selection {
    pub fn new() -> Self {
        Selection::default()
    }

    /// Start on the first event's day; unset when there are no events.
    pub fn initial_in<Tz: TimeZone>(events: &[Event], tz: &Tz) -> Self {
        Selection {
            selected: events.first().map(|e| e.day_in(tz)),
        }
    }

    /// Replace the selected day. Days without events are allowed.
    pub fn select_date(&mut self, day: NaiveDate) {
        self.selected = Some(day);
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    pub fn is_set(&self) -> bool {
        self.selected.is_some()
    }
}

/// Events whose calendar day in `tz` is `selected`.
///
/// Matches on the day, not on a time range, so every event of that day is
/// included whatever its hour. Returns nothing when `selected` is unset.
pub fn filtered_events<'a, Tz: TimeZone>(
    events: &'a [Event],
    selected: Option<NaiveDate>,
    tz: &Tz,
) -> Vec<&'a Event> {
    let Some(day) = selected else {
        return Vec::new();
    };

    events.iter().filter(|e| e.day_in(tz) == day).collect()
}

/// One cell of the day picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripDay {
    pub date: NaiveDate,
    pub label: &'static str,
    pub is_today: bool,
    pub has_events: bool,
}

/// Two weeks of days starting shortly before `today`.
pub fn week_strip(today: NaiveDate, event_days: &HashSet<NaiveDate>) -> Vec<StripDay> {
    let start = today - Duration::days(WEEK_STRIP_LEAD_DAYS);

    start
        .iter_days()
        .take(WEEK_STRIP_LEN)
        .map(|date| StripDay {
            date,
            label: WEEKDAY_LABELS[date.weekday().num_days_from_sunday() as usize],
            is_today: date == today,
            has_events: event_days.contains(&date),
        })
        .collect()
}
