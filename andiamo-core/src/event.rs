//! Backend records for events, venues and categories.
//!
//! `EventRecord` is the shape the backend sends, with the `date` left as the
//! raw string. `Event` is the normalized form the rest of the crate works
//! with: its `date` is a parsed instant, so grouping and filtering never see
//! an invalid timestamp.

use std::fmt;

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use url::Url;

use crate::error::{AndiamoError, AndiamoResult};

/// Events carry no end time; views assume this length.
pub const DISPLAY_DURATION_HOURS: i64 = 2;

/// Naive layouts accepted for `date` when the backend omits the offset.
const NAIVE_DATETIME_FORMATS: [&str; 3] =
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"];

/// Treat an explicit `null` like a missing string.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A venue ("lieu").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lieu {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub nom: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub adresse: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Lieu {
    /// Map search link for the venue address.
    pub fn map_url(&self) -> Option<Url> {
        let address = self.adresse.trim();
        if address.is_empty() {
            return None;
        }
        Url::parse_with_params("https://maps.apple.com/", &[("q", address)]).ok()
    }
}

/// A browsing category grouping venues.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

/// An event exactly as the backend returns it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub lieu: Option<Lieu>,

    // Display-only, passed through untouched
    #[serde(default)]
    pub category: Option<serde_json::Value>,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
    #[serde(default)]
    pub attendees: Option<serde_json::Value>,

    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

/// An event with a validated timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
    pub date: DateTime<Utc>,
    pub lieu: Option<Lieu>,
    pub category: Option<serde_json::Value>,
    pub price: Option<serde_json::Value>,
    pub attendees: Option<serde_json::Value>,
}

impl Event {
    /// Normalize a backend record, interpreting offset-less timestamps in `tz`.
    pub fn from_record_in<Tz: TimeZone>(record: EventRecord, tz: &Tz) -> AndiamoResult<Self> {
        let raw = record.date.unwrap_or_default();
        let date = parse_event_date(&raw, tz).ok_or_else(|| AndiamoError::MalformedDate {
            id: record.id,
            value: raw.clone(),
        })?;

        Ok(Event {
            id: record.id,
            name: record.name,
            description: record.description,
            image: record.image,
            date,
            lieu: record.lieu,
            category: record.category,
            price: record.price,
            attendees: record.attendees,
        })
    }

    /// Calendar day of this event as seen in `tz`.
    pub fn day_in<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDate {
        self.date.with_timezone(tz).date_naive()
    }

    /// Assumed end of the event, for display only.
    pub fn display_end(&self) -> DateTime<Utc> {
        self.date + Duration::hours(DISPLAY_DURATION_HOURS)
    }

    pub fn venue_name(&self) -> Option<&str> {
        self.lieu.as_ref().map(|l| l.nom.as_str()).filter(|n| !n.is_empty())
    }

    /// "€12.5", or "Free" when no price is set.
    pub fn price_label(&self) -> String {
        match self.price.as_ref().and_then(display_value) {
            Some(price) => format!("€{price}"),
            None => "Free".to_string(),
        }
    }

    pub fn category_label(&self) -> Option<String> {
        self.category.as_ref().and_then(display_value)
    }

    pub fn attendees_label(&self) -> Option<String> {
        self.attendees.as_ref().and_then(display_value)
    }
}

/// Text for a pass-through display field; null, zero, false and "" show nothing.
fn display_value(value: &serde_json::Value) -> Option<String> {
    use serde_json::Value;

    match value {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.trim().is_empty() {
            write!(f, "(untitled #{})", self.id)
        } else {
            f.write_str(&self.name)
        }
    }
}

/// Normalize a batch of records, dropping the ones whose date can't be parsed.
pub fn normalize_events<Tz: TimeZone>(records: Vec<EventRecord>, tz: &Tz) -> Vec<Event> {
    records
        .into_iter()
        .filter_map(|record| match Event::from_record_in(record, tz) {
            Ok(event) => Some(event),
            Err(e) => {
                tracing::warn!("Skipping event: {e}");
                None
            }
        })
        .collect()
}

/// Parse an ISO-8601 `date` value.
///
/// Accepts RFC 3339 with an offset, a naive date-time (read as wall-clock
/// time in `tz`), or a bare date (midnight UTC).
pub fn parse_event_date<Tz: TimeZone>(value: &str, tz: &Tz) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(resolve_local(&naive, tz));
        }
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Wall-clock time in `tz` to an instant.
///
/// Ambiguous times take the earlier offset. Times skipped by a DST jump are
/// moved forward past the gap.
fn resolve_local<Tz: TimeZone>(naive: &NaiveDateTime, tz: &Tz) -> DateTime<Utc> {
    match tz.from_local_datetime(naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt.with_timezone(&Utc),
        LocalResult::None => tz
            .from_local_datetime(&(*naive + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| naive.and_utc()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Paris;

    fn record(id: i64, date: Option<&str>) -> EventRecord {
        EventRecord {
            id,
            name: format!("Event {id}"),
            description: None,
            image: None,
            date: date.map(str::to_string),
            lieu: None,
            category: None,
            price: None,
            attendees: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let parsed = parse_event_date("2024-06-01T10:00:00+02:00", &Utc).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_uses_zone() {
        let parsed = parse_event_date("2024-06-01T10:00:00", &Paris).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());

        let with_millis = parse_event_date("2024-06-01T10:00:00.250", &Utc).unwrap();
        assert_eq!(with_millis.timestamp_subsec_millis(), 250);

        let minutes_only = parse_event_date("2024-06-01T10:30", &Utc).unwrap();
        assert_eq!(minutes_only, Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_naive_datetime_in_dst_gap() {
        // 02:30 does not exist in Paris on 2024-03-31; clocks jump to 03:00 CEST
        let parsed = parse_event_date("2024-03-31T02:30:00", &Paris).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 3, 31, 1, 30, 0).unwrap());

        let events = normalize_events(vec![record(1, Some("2024-03-31T02:30:00"))], &Paris);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].day_in(&Paris), NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_parse_ambiguous_time_takes_earlier_offset() {
        // 02:30 happens twice in Paris on 2024-10-27
        let parsed = parse_event_date("2024-10-27T02:30:00", &Paris).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 10, 27, 0, 30, 0).unwrap());
    }

    #[test]
    fn test_parse_bare_date_is_utc_midnight() {
        let parsed = parse_event_date("2024-06-01", &Paris).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_event_date("", &Utc).is_none());
        assert!(parse_event_date("not a date", &Utc).is_none());
        assert!(parse_event_date("2024-13-45T10:00:00Z", &Utc).is_none());
    }

    #[test]
    fn test_normalize_drops_malformed_dates() {
        let records = vec![
            record(1, Some("2024-06-01T10:00:00Z")),
            record(2, Some("yesterday")),
            record(3, None),
            record(4, Some("2024-06-02T09:00:00Z")),
        ];

        let events = normalize_events(records, &Utc);
        let ids: Vec<i64> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_from_record_reports_malformed_date() {
        let err = Event::from_record_in(record(7, Some("soon")), &Utc).unwrap_err();
        assert!(matches!(err, AndiamoError::MalformedDate { id: 7, .. }));
    }

    #[test]
    fn test_day_in_zone_crosses_midnight() {
        let event = Event::from_record_in(record(1, Some("2024-06-01T22:30:00Z")), &Utc).unwrap();
        assert_eq!(event.day_in(&Utc), NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
        assert_eq!(event.day_in(&Paris), NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
    }

    #[test]
    fn test_display_end_is_two_hours_later() {
        let event = Event::from_record_in(record(1, Some("2024-06-01T10:00:00Z")), &Utc).unwrap();
        assert_eq!(event.display_end(), Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap());
    }

    #[test]
    fn test_record_deserializes_backend_json() {
        let json = r#"{
            "id": 12,
            "name": "Concert",
            "description": null,
            "date": "2024-06-01T20:00:00",
            "lieu": { "id": 3, "nom": "Zénith", "adresse": "1 rue du Port" },
            "price": 25.5,
            "createdAt": "2024-05-01T08:00:00"
        }"#;

        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, 12);
        assert_eq!(record.lieu.as_ref().map(|l| l.nom.as_str()), Some("Zénith"));
        assert_eq!(record.created_at.as_deref(), Some("2024-05-01T08:00:00"));

        let event = Event::from_record_in(record, &Utc).unwrap();
        assert_eq!(event.venue_name(), Some("Zénith"));
        assert_eq!(event.to_string(), "Concert");
    }

    #[test]
    fn test_display_labels() {
        let mut event =
            Event::from_record_in(record(1, Some("2024-06-01T10:00:00Z")), &Utc).unwrap();
        assert_eq!(event.price_label(), "Free");
        assert!(event.category_label().is_none());

        event.price = Some(serde_json::json!(0));
        assert_eq!(event.price_label(), "Free");

        event.price = Some(serde_json::json!(12.5));
        event.category = Some(serde_json::json!("Jazz"));
        event.attendees = Some(serde_json::json!(40));
        assert_eq!(event.price_label(), "€12.5");
        assert_eq!(event.category_label().as_deref(), Some("Jazz"));
        assert_eq!(event.attendees_label().as_deref(), Some("40"));
    }

    #[test]
    fn test_map_url_encodes_address() {
        let lieu = Lieu {
            id: 1,
            nom: "Olympia".to_string(),
            adresse: "28 bd des Capucines, Paris".to_string(),
            image: None,
            category: None,
        };
        let url = lieu.map_url().unwrap();
        assert_eq!(url.host_str(), Some("maps.apple.com"));
        assert_eq!(
            url.query_pairs().next().map(|(k, v)| (k.into_owned(), v.into_owned())),
            Some(("q".to_string(), "28 bd des Capucines, Paris".to_string()))
        );

        let nowhere = Lieu { adresse: "  ".to_string(), ..lieu };
        assert!(nowhere.map_url().is_none());
    }

    #[test]
    fn test_null_strings_do_not_fail_the_batch() {
        let json = r#"[
            { "id": 1, "name": "Concert", "date": "2024-06-01T20:00:00Z" },
            { "id": 2, "name": null, "date": "2024-06-02T20:00:00Z",
              "lieu": { "id": 3, "nom": null, "adresse": null } }
        ]"#;

        let records: Vec<EventRecord> = serde_json::from_str(json).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name, "");

        let lieu = records[1].lieu.as_ref().unwrap();
        assert_eq!(lieu.nom, "");
        assert_eq!(lieu.adresse, "");

        let events = normalize_events(records, &Utc);
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].to_string(), "(untitled #2)");
        assert_eq!(events[1].venue_name(), None);
    }
}
