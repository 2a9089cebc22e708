//! Calendar events, as mirrored from the server

use std::fmt::{Display, Formatter};

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::category::{Category, CategoryId};

/// The identifier the server assigned to an event.
///
/// Events only ever get their identity server-side; the client never generates ids of its own.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub i64);

impl Display for EventId {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.0)
    }
}

/// A calendar event, as returned by the server.
///
/// This is a read cache: the canonical copy lives server-side, and the local copy is
/// replaced in full after every mutation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default = "default_reminder")]
    pub reminder_minutes: u32,
    /// The category embedded by the server, so that rendering does not need a second lookup
    #[serde(default)]
    pub category: Option<Category>,
}

pub(crate) fn default_reminder() -> u32 {
    30
}

/// The payload submitted when creating or updating an event.
///
/// The same shape is used for both POST (create) and PUT (update); the presence of an
/// editing cursor on the session decides which one is issued.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventDraft {
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "form_datetime")]
    pub start_time: NaiveDateTime,
    #[serde(with = "form_datetime")]
    pub end_time: NaiveDateTime,
    pub category_id: Option<CategoryId>,
    pub reminder_minutes: u32,
}

/// The partial payload sent when an event is dragged or resized in the calendar widget.
///
/// Only the two timestamps are transmitted; every other field is left untouched server-side.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "utc_datetime")]
    pub start_time: DateTime<Utc>,
    #[serde(with = "utc_datetime")]
    pub end_time: DateTime<Utc>,
}

/// Serde support for the `YYYY-MM-DDTHH:MM` shape produced by `datetime-local` form inputs
pub(crate) mod form_datetime {
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub const FORMAT: &str = "%Y-%m-%dT%H:%M";

    pub fn serialize<S: Serializer>(dt: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&s, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Serde support for RFC 3339 UTC timestamps (what the widget emits on drag/resize)
pub(crate) mod utc_datetime {
    use chrono::{DateTime, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn naive(y: i32, mo: u32, d: u32, h: u32, mi: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d).unwrap().and_hms_opt(h, mi, 0).unwrap()
    }

    #[test]
    fn draft_serializes_form_shaped_timestamps() {
        let draft = EventDraft {
            title: "Standup".to_string(),
            description: None,
            start_time: naive(2024, 1, 1, 9, 0),
            end_time: naive(2024, 1, 1, 9, 30),
            category_id: None,
            reminder_minutes: 15,
        };

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(json["start_time"], "2024-01-01T09:00");
        assert_eq!(json["end_time"], "2024-01-01T09:30");
        // An absent category is transmitted as an explicit null
        assert_eq!(json["category_id"], serde_json::Value::Null);
        assert_eq!(json["reminder_minutes"], 15);
    }

    #[test]
    fn time_window_contains_only_the_two_timestamps() {
        let window = TimeWindow {
            start_time: DateTime::<Utc>::from_utc(naive(2024, 1, 1, 10, 0), Utc),
            end_time: DateTime::<Utc>::from_utc(naive(2024, 1, 1, 11, 0), Utc),
        };

        let json = serde_json::to_value(&window).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(json["start_time"], "2024-01-01T10:00:00Z");
        assert_eq!(json["end_time"], "2024-01-01T11:00:00Z");
    }

    #[test]
    fn event_parses_server_timestamps() {
        let event: Event = serde_json::from_value(serde_json::json!({
            "id": 7,
            "title": "Dentist",
            "description": null,
            "start_time": "2024-03-05T14:30:00",
            "end_time": "2024-03-05T15:00:00",
            "category_id": null,
            "reminder_minutes": 30,
            "category": null
        }))
        .unwrap();

        assert_eq!(event.id, EventId(7));
        assert_eq!(event.start_time, naive(2024, 3, 5, 14, 30));
        assert_eq!(event.category, None);
    }
}
