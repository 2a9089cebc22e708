//! Pure projections from session state to view models.
//!
//! Nothing in this module touches a rendering surface: every function maps the in-memory
//! entity collections (plus, where relevant, the current wall-clock time) to a plain
//! view-model value. The [`ViewSurface`](crate::traits::ViewSurface) implementation then
//! writes these into the page. Keeping the mapping pure is what makes the calendar and
//! upcoming-list projections unit-testable without any UI toolkit.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::category::{Category, CategoryId, DEFAULT_COLOR};
use crate::event::{Event, EventId};
use crate::telegram::TelegramStatus;

/// How many entries the upcoming-events list shows at most
const UPCOMING_LIST_CAP: usize = 10;

/// The mutually exclusive top-level views. Exactly one is active at a time.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Section {
    Calendar,
    Events,
    Categories,
    Telegram,
    Settings,
}

impl Display for Section {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
        let name = match self {
            Section::Calendar => "calendar",
            Section::Events => "events",
            Section::Categories => "categories",
            Section::Telegram => "telegram",
            Section::Settings => "settings",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Section {
    type Err = String;
    /// Parses the `data-section` attribute values used by the navigation links
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "calendar" => Ok(Section::Calendar),
            "events" => Ok(Section::Events),
            "categories" => Ok(Section::Categories),
            "telegram" => Ok(Section::Telegram),
            "settings" => Ok(Section::Settings),
            other => Err(format!("Unknown section {:?}", other)),
        }
    }
}

/// One event in the shape the calendar widget expects
#[derive(Clone, Debug, PartialEq)]
pub struct CalendarEntry {
    pub id: EventId,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub background_color: String,
    pub border_color: String,
}

/// The color an event renders with: its category's color, or the fixed default
pub fn event_color(event: &Event) -> String {
    match &event.category {
        Some(category) => category.hex_color(),
        None => DEFAULT_COLOR.to_string(),
    }
}

/// Maps the event collection into the widget's event-source shape.
///
/// Sorted by id so that the output is deterministic regardless of map iteration order.
pub fn calendar_entries(events: &HashMap<EventId, Event>) -> Vec<CalendarEntry> {
    let mut entries: Vec<CalendarEntry> = events
        .values()
        .map(|event| {
            let color = event_color(event);
            CalendarEntry {
                id: event.id,
                title: event.title.clone(),
                start: event.start_time,
                end: event.end_time,
                border_color: color.clone(),
                background_color: color,
            }
        })
        .collect();
    entries.sort_by_key(|entry| entry.id.0);
    entries
}

/// One row of the upcoming-events list
#[derive(Clone, Debug, PartialEq)]
pub struct UpcomingEvent {
    pub id: EventId,
    pub title: String,
    /// Start time, formatted for display
    pub when: String,
    pub category_name: Option<String>,
    pub color: String,
}

/// The events-list view: either a literal placeholder, or the upcoming entries
#[derive(Clone, Debug, PartialEq)]
pub enum EventsListView {
    /// The collection is empty; the page shows a "no upcoming events" placeholder
    Empty,
    Upcoming(Vec<UpcomingEvent>),
}

/// Derives the upcoming-events list: events starting at or after `now`, ascending by
/// start time, capped at 10 entries.
///
/// This is recomputed in full on every render; there is no hidden state.
pub fn events_list(events: &HashMap<EventId, Event>, now: NaiveDateTime) -> EventsListView {
    if events.is_empty() {
        return EventsListView::Empty;
    }

    let mut upcoming: Vec<&Event> = events.values().filter(|event| event.start_time >= now).collect();
    upcoming.sort_by_key(|event| event.start_time);

    let entries = upcoming
        .into_iter()
        .take(UPCOMING_LIST_CAP)
        .map(|event| UpcomingEvent {
            id: event.id,
            title: event.title.clone(),
            when: event.start_time.format("%Y-%m-%d %H:%M").to_string(),
            category_name: event.category.as_ref().map(|c| c.name.clone()),
            color: event_color(event),
        })
        .collect();
    EventsListView::Upcoming(entries)
}

/// One card of the categories grid
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCard {
    pub id: CategoryId,
    pub name: String,
    pub color: String,
}

/// The categories view: either a literal placeholder, or the category cards
#[derive(Clone, Debug, PartialEq)]
pub enum CategoriesView {
    Empty,
    Cards(Vec<CategoryCard>),
}

pub fn categories_grid(categories: &HashMap<CategoryId, Category>) -> CategoriesView {
    if categories.is_empty() {
        return CategoriesView::Empty;
    }
    let mut cards: Vec<CategoryCard> = categories
        .values()
        .map(|category| CategoryCard {
            id: category.id,
            name: category.name.clone(),
            color: category.hex_color(),
        })
        .collect();
    cards.sort_by_key(|card| card.id.0);
    CategoriesView::Cards(cards)
}

/// One entry of the event form's category dropdown (the "no category" entry is the
/// renderer's concern, it is always present)
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryOption {
    pub id: CategoryId,
    pub name: String,
}

pub fn category_options(categories: &HashMap<CategoryId, Category>) -> Vec<CategoryOption> {
    let mut options: Vec<CategoryOption> = categories
        .values()
        .map(|category| CategoryOption { id: category.id, name: category.name.clone() })
        .collect();
    options.sort_by_key(|option| option.id.0);
    options
}

/// The values the event form is filled with
#[derive(Clone, Debug, PartialEq)]
pub struct EventFormView {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub category_id: Option<CategoryId>,
    pub reminder_minutes: u32,
}

impl EventFormView {
    /// The form defaults: empty fields, a start one hour from `now`, a one-hour duration,
    /// and the default reminder lead time
    pub fn defaults(now: NaiveDateTime) -> Self {
        let start = now + Duration::hours(1);
        Self {
            title: String::new(),
            description: String::new(),
            start_time: start,
            end_time: start + Duration::hours(1),
            category_id: None,
            reminder_minutes: 30,
        }
    }

    /// The defaults, with start/end preset to 09:00-10:00 on a clicked calendar date
    pub fn for_date(date: NaiveDate, now: NaiveDateTime) -> Self {
        let mut form = Self::defaults(now);
        form.start_time = date.and_hms_opt(9, 0, 0).unwrap(/* 09:00 is always a valid time of day */);
        form.end_time = date.and_hms_opt(10, 0, 0).unwrap(/* so is 10:00 */);
        form
    }

    /// The form as pre-filled when editing an existing event
    pub fn for_event(event: &Event) -> Self {
        Self {
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start_time: event.start_time,
            end_time: event.end_time,
            category_id: event.category_id,
            reminder_minutes: event.reminder_minutes,
        }
    }

    /// The `datetime-local` representation of the start time
    pub fn start_local(&self) -> String {
        format_datetime_local(self.start_time)
    }

    /// The `datetime-local` representation of the end time
    pub fn end_local(&self) -> String {
        format_datetime_local(self.end_time)
    }
}

/// Formats a timestamp the way `datetime-local` inputs expect it (`YYYY-MM-DDTHH:MM`)
pub fn format_datetime_local(dt: NaiveDateTime) -> String {
    dt.format(crate::event::form_datetime::FORMAT).to_string()
}

/// The values the category form is filled with
#[derive(Clone, Debug, PartialEq)]
pub struct CategoryFormView {
    pub name: String,
    pub color: String,
}

impl CategoryFormView {
    pub fn defaults() -> Self {
        Self { name: String::new(), color: DEFAULT_COLOR.to_string() }
    }

    pub fn for_category(category: &Category) -> Self {
        Self { name: category.name.clone(), color: category.hex_color() }
    }
}

/// The detail modal contents for one event
#[derive(Clone, Debug, PartialEq)]
pub struct EventDetailsView {
    pub id: EventId,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub category: String,
    pub reminder_minutes: u32,
}

impl EventDetailsView {
    pub fn for_event(event: &Event) -> Self {
        Self {
            id: event.id,
            title: event.title.clone(),
            description: event
                .description
                .clone()
                .filter(|d| d.is_empty() == false)
                .unwrap_or_else(|| "No description".to_string()),
            start: event.start_time.format("%Y-%m-%d %H:%M").to_string(),
            end: event.end_time.format("%Y-%m-%d %H:%M").to_string(),
            category: match &event.category {
                Some(category) => category.name.clone(),
                None => "No category".to_string(),
            },
            reminder_minutes: event.reminder_minutes,
        }
    }
}

/// The Telegram section: either the linked-status card, or the setup form
#[derive(Clone, Debug, PartialEq)]
pub enum TelegramPanel {
    Linked {
        chat_id: String,
        username: Option<String>,
        notifications_enabled: bool,
        daily_summary_enabled: bool,
    },
    NotLinked,
}

pub fn telegram_panel(status: &TelegramStatus) -> TelegramPanel {
    if status.linked {
        TelegramPanel::Linked {
            chat_id: status.telegram_chat_id.clone().unwrap_or_default(),
            username: status.telegram_username.clone(),
            notifications_enabled: status.notifications_enabled,
            daily_summary_enabled: status.daily_summary_enabled,
        }
    } else {
        TelegramPanel::NotLinked
    }
}
