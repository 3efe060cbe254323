//! Home feed state: fetched events, their grouping and the selected day.

use std::collections::HashSet;

use chrono::{NaiveDate, TimeZone, Utc};

use crate::event::Event;
use crate::grouping::{DateGroup, GroupedEvents, group_by_month_and_day_in, upcoming_dates};
use crate::selection::{Selection, StripDay, filtered_events, week_strip};

/// The event list of one feed load together with what is derived from it.
///
/// Grouping is computed when the list is set and reused until it is
/// replaced, so the two never disagree.
#[derive(Clone)]
pub struct Feed<Tz: TimeZone> {
    zone: Tz,
    events: Vec<Event>,
    grouped: GroupedEvents,
    selection: Selection,
}

impl<Tz: TimeZone> Feed<Tz> {
    pub fn new(events: Vec<Event>, zone: Tz) -> Self {
        let grouped = group_by_month_and_day_in(&events, &zone);
        let selection = Selection::initial_in(&events, &zone);

        Feed {
            zone,
            events,
            grouped,
            selection,
        }
    }

    pub fn empty(zone: Tz) -> Self {
        Self::new(Vec::new(), zone)
    }

    /// Swap in a new event list. A selection the user already made is kept.
    pub fn replace_events(&mut self, events: Vec<Event>) {
        self.grouped = group_by_month_and_day_in(&events, &self.zone);
        if !self.selection.is_set() {
            self.selection = Selection::initial_in(&events, &self.zone);
        }
        self.events = events;
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn grouped(&self) -> &GroupedEvents {
        &self.grouped
    }

    pub fn upcoming(&self, today: NaiveDate) -> Vec<&DateGroup> {
        upcoming_dates(&self.grouped, today)
    }

    pub fn select_date(&mut self, day: NaiveDate) {
        self.selection.select_date(day);
    }

    pub fn selected(&self) -> Option<NaiveDate> {
        self.selection.selected()
    }

    /// Events of the selected day.
    pub fn visible_events(&self) -> Vec<&Event> {
        filtered_events(&self.events, self.selection.selected(), &self.zone)
    }

    /// Days that have at least one event.
    pub fn event_days(&self) -> HashSet<NaiveDate> {
        self.grouped
            .values()
            .flat_map(|month| month.dates.iter().map(|g| g.date))
            .collect()
    }

    pub fn week_strip(&self, today: NaiveDate) -> Vec<StripDay> {
        week_strip(today, &self.event_days())
    }

    /// Today's calendar day in the feed's zone.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.zone).date_naive()
    }

    pub fn zone(&self) -> &Tz {
        &self.zone
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn event(id: i64, date: &str) -> Event {
        Event {
            id,
            name: format!("Event {id}"),
            description: None,
            image: None,
            date: DateTime::parse_from_rfc3339(date).unwrap().with_timezone(&Utc),
            lieu: None,
            category: None,
            price: None,
            attendees: None,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_feed_initial_state() {
        let feed = Feed::new(
            vec![event(7, "2024-06-02T09:00:00Z"), event(8, "2024-06-01T10:00:00Z")],
            Utc,
        );

        // First fetched event, not the earliest one
        assert_eq!(feed.selected(), Some(day(2024, 6, 2)));
        assert_eq!(feed.visible_events().len(), 1);
        assert_eq!(feed.grouped().len(), 1);
        assert_eq!(feed.event_days().len(), 2);
    }

    #[test]
    fn test_empty_feed() {
        let feed = Feed::empty(Utc);
        assert!(feed.is_empty());
        assert!(feed.selected().is_none());
        assert!(feed.visible_events().is_empty());
        assert!(feed.upcoming(day(2024, 6, 1)).is_empty());
        assert!(feed.week_strip(day(2024, 6, 1)).iter().all(|d| !d.has_events));
    }

    #[test]
    fn test_replace_events_regroups_and_keeps_selection() {
        let mut feed = Feed::new(vec![event(1, "2024-06-01T10:00:00Z")], Utc);
        feed.select_date(day(2024, 6, 3));

        feed.replace_events(vec![
            event(2, "2024-06-03T10:00:00Z"),
            event(3, "2024-07-01T10:00:00Z"),
        ]);

        assert_eq!(feed.selected(), Some(day(2024, 6, 3)));
        assert_eq!(feed.grouped().len(), 2);
        let ids: Vec<i64> = feed.visible_events().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_replace_into_empty_feed_initializes_selection() {
        let mut feed = Feed::empty(Utc);
        feed.replace_events(vec![event(4, "2024-06-05T10:00:00Z")]);
        assert_eq!(feed.selected(), Some(day(2024, 6, 5)));
    }
}
