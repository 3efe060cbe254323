//! Terminal rendering for andiamo types.
//!
//! Plain types get a `Render` impl; anything that depends on the viewer's
//! zone is a free function taking the zone.

use std::fmt::Display;

use andiamo_core::grouping::{DateGroup, MonthGroup};
use andiamo_core::selection::StripDay;
use andiamo_core::user::UserStats;
use andiamo_core::{Category, Event, Lieu, Role, User};
use chrono::{NaiveDate, TimeZone};
use owo_colors::OwoColorize;

/// Extension trait for TUI rendering with colors.
pub trait Render {
    fn render(&self) -> String;
}

impl Render for Role {
    fn render(&self) -> String {
        match self {
            Role::Admin => self.as_str().magenta().to_string(),
            Role::User => self.as_str().cyan().to_string(),
        }
    }
}

impl Render for User {
    fn render(&self) -> String {
        let id = format!("#{}", self.id);
        format!(
            "{} {} {} {}",
            id.dimmed(),
            self.display_name().bold(),
            format!("<{}>", self.email).dimmed(),
            self.role.render()
        )
    }
}

impl Render for Category {
    fn render(&self) -> String {
        let id = format!("#{}", self.id);
        format!("{} {}", id.dimmed(), self.name)
    }
}

impl Render for Lieu {
    fn render(&self) -> String {
        let id = format!("#{}", self.id);
        if self.adresse.is_empty() {
            format!("{} {}", id.dimmed(), self.nom.bold())
        } else {
            format!("{} {} {}", id.dimmed(), self.nom.bold(), self.adresse.dimmed())
        }
    }
}

impl Render for UserStats {
    fn render(&self) -> String {
        format!(
            "{} users ({} admins, {} regular)",
            self.total.bold(),
            self.admins.magenta(),
            self.users.cyan()
        )
    }
}

/// "Today", "Tomorrow", or e.g. "Sat Jun 1".
pub fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}

/// One event line: time span, title, venue.
pub fn render_event<Tz: TimeZone>(event: &Event, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    let start = event.date.with_timezone(zone).format("%H:%M");
    let end = event.display_end().with_timezone(zone).format("%H:%M");
    let span = format!("{start}-{end}");
    let id = format!("#{}", event.id);

    match event.venue_name() {
        Some(venue) => format!(
            "  {} {} {} {}",
            span.dimmed(),
            event,
            format!("@ {venue}").dimmed(),
            id.dimmed()
        ),
        None => format!("  {} {} {}", span.dimmed(), event, id.dimmed()),
    }
}

/// Event line with its full date, for flat listings.
pub fn render_event_with_date<Tz: TimeZone>(event: &Event, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    let id = format!("#{}", event.id);
    let when = event.date.with_timezone(zone).format("%a %b %-d %Y %H:%M").to_string();

    match event.venue_name() {
        Some(venue) => format!(
            "{} {} {} {}",
            id.dimmed(),
            when.dimmed(),
            event,
            format!("@ {venue}").dimmed()
        ),
        None => format!("{} {} {}", id.dimmed(), when.dimmed(), event),
    }
}

/// Full view of one event: when, where, price and description.
pub fn render_event_details<Tz: TimeZone>(event: &Event, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    let start = event.date.with_timezone(zone);
    let end = event.display_end().with_timezone(zone);
    let label = |text: &str| format!("{:<10}", text).dimmed().to_string();

    let mut lines = vec![event.to_string().bold().to_string(), String::new()];
    lines.push(format!("{} {}", label("Date"), start.format("%A, %B %-d, %Y")));
    lines.push(format!(
        "{} {} - {}",
        label("Time"),
        start.format("%H:%M"),
        end.format("%H:%M")
    ));

    if let Some(lieu) = &event.lieu {
        if !lieu.nom.is_empty() {
            lines.push(format!("{} {}", label("Venue"), lieu.nom));
        }
        if !lieu.adresse.is_empty() {
            lines.push(format!("{} {}", label("Address"), lieu.adresse));
        }
        if let Some(url) = lieu.map_url() {
            lines.push(format!("{} {}", label("Map"), url.as_str().underline()));
        }
    }

    lines.push(format!("{} {}", label("Price"), event.price_label()));
    if let Some(category) = event.category_label() {
        lines.push(format!("{} {}", label("Category"), category));
    }
    if let Some(attendees) = event.attendees_label() {
        lines.push(format!("{} {} people going", label("Attendees"), attendees));
    }

    let description = event
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("No description available.");
    lines.push(String::new());
    lines.push(description.to_string());

    lines.join("\n")
}

pub fn render_date_group<Tz: TimeZone>(
    group: &DateGroup,
    today: NaiveDate,
    zone: &Tz,
) -> Vec<String>
where
    Tz::Offset: Display,
{
    let mut lines = vec![format_date_label(group.date, today).bold().to_string()];
    lines.extend(group.events.iter().map(|e| render_event(e, zone)));
    lines
}

pub fn render_month<Tz: TimeZone>(month: &MonthGroup, today: NaiveDate, zone: &Tz) -> String
where
    Tz::Offset: Display,
{
    let count = format!(
        "({} {})",
        month.total_events,
        if month.total_events == 1 { "event" } else { "events" }
    );

    let mut lines = vec![format!(
        "📅 {} {}",
        month.month_name.bold().underline(),
        count.dimmed()
    )];
    for group in &month.dates {
        lines.push(String::new());
        lines.extend(render_date_group(group, today, zone));
    }
    lines.join("\n")
}

/// The two-week day picker, one column per day.
pub fn render_week_strip(strip: &[StripDay], selected: Option<NaiveDate>) -> String {
    let cell = |day: &StripDay, text: String| -> String {
        let padded = format!("{:^5}", text);
        if Some(day.date) == selected {
            padded.black().on_white().to_string()
        } else if day.is_today {
            padded.bold().to_string()
        } else if day.has_events {
            padded.green().to_string()
        } else {
            padded.dimmed().to_string()
        }
    };

    let labels: Vec<String> = strip.iter().map(|d| cell(d, d.label.to_string())).collect();
    let numbers: Vec<String> = strip
        .iter()
        .map(|d| cell(d, d.date.format("%-d").to_string()))
        .collect();
    let markers: Vec<String> = strip
        .iter()
        .map(|d| format!("{:^5}", if d.has_events { "•" } else { "" }).green().to_string())
        .collect();

    [labels.join(""), numbers.join(""), markers.join("")].join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_event_details_show_description_and_venue() {
        use andiamo_core::EventRecord;
        use chrono::Utc;

        let record: EventRecord = serde_json::from_value(serde_json::json!({
            "id": 5,
            "name": "Jazz night",
            "description": "Quartet on the terrace",
            "date": "2024-06-01T20:00:00Z",
            "lieu": { "id": 2, "nom": "Sunset", "adresse": "60 rue des Lombards" }
        }))
        .unwrap();
        let event = Event::from_record_in(record, &Utc).unwrap();

        let text = render_event_details(&event, &Utc);

        assert!(text.contains("Jazz night"));
        assert!(text.contains("Saturday, June 1, 2024"));
        assert!(text.contains("20:00 - 22:00"));
        assert!(text.contains("60 rue des Lombards"));
        assert!(text.contains("https://maps.apple.com/?q=60+rue+des+Lombards"));
        assert!(text.contains("Free"));
        assert!(text.contains("Quartet on the terrace"));
    }

    #[test]
    fn test_format_date_label() {
        let today = day(2024, 6, 1);
        assert_eq!(format_date_label(today, today), "Today");
        assert_eq!(format_date_label(day(2024, 6, 2), today), "Tomorrow");
        assert_eq!(format_date_label(day(2024, 6, 5), today), "Wed Jun 5");
        assert_eq!(format_date_label(day(2024, 5, 31), today), "Fri May 31");
    }
}
