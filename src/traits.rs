//! The seams between the session controller and its collaborators

use std::error::Error;

use async_trait::async_trait;

use crate::category::{Category, CategoryDraft, CategoryId};
use crate::event::{Event, EventDraft, EventId, TimeWindow};
use crate::settings::Settings;
use crate::telegram::{TelegramLinkRequest, TelegramStatus};
use crate::toast::ToastView;
use crate::user::User;
use crate::view::{
    CalendarEntry, CategoriesView, CategoryFormView, CategoryOption, EventDetailsView, EventFormView,
    EventsListView, Section, TelegramPanel,
};

/// The Remote Data Service: everything the backend API can do for this session.
///
/// [`Client`](crate::client::Client) is the HTTP implementation; tests substitute an
/// in-memory implementation. Every call is a single round-trip: no retries, no caching
/// at this layer.
#[async_trait]
pub trait RemoteSource {
    /// Whether the current session is authenticated
    async fn auth_status(&self) -> Result<bool, Box<dyn Error>>;
    /// The profile of the logged-in user, or `None` when not authenticated
    async fn current_user(&self) -> Result<Option<User>, Box<dyn Error>>;
    async fn logout(&self) -> Result<(), Box<dyn Error>>;

    async fn events(&self) -> Result<Vec<Event>, Box<dyn Error>>;
    async fn create_event(&self, draft: &EventDraft) -> Result<(), Box<dyn Error>>;
    async fn update_event(&self, id: EventId, draft: &EventDraft) -> Result<(), Box<dyn Error>>;
    /// Partial update: only the start/end timestamps change (widget drag/resize)
    async fn reschedule_event(&self, id: EventId, window: &TimeWindow) -> Result<(), Box<dyn Error>>;
    async fn delete_event(&self, id: EventId) -> Result<(), Box<dyn Error>>;

    async fn categories(&self) -> Result<Vec<Category>, Box<dyn Error>>;
    async fn create_category(&self, draft: &CategoryDraft) -> Result<(), Box<dyn Error>>;
    async fn update_category(&self, id: CategoryId, draft: &CategoryDraft) -> Result<(), Box<dyn Error>>;
    async fn delete_category(&self, id: CategoryId) -> Result<(), Box<dyn Error>>;

    async fn settings(&self) -> Result<Settings, Box<dyn Error>>;
    /// Replaces the settings singleton wholesale and returns the server's echo of the saved record
    async fn save_settings(&self, settings: &Settings) -> Result<Settings, Box<dyn Error>>;

    async fn telegram_status(&self) -> Result<TelegramStatus, Box<dyn Error>>;
    async fn link_telegram(&self, request: &TelegramLinkRequest) -> Result<(), Box<dyn Error>>;
    async fn unlink_telegram(&self) -> Result<(), Box<dyn Error>>;
    async fn send_test_notification(&self) -> Result<(), Box<dyn Error>>;
}

/// The View Renderer: projects session state into the page.
///
/// The session only ever hands over ready-made view models (see [`crate::view`]), so an
/// implementation is pure plumbing: write the values into the DOM structure it is bound to.
pub trait ViewSurface {
    /// Show the login region and hide the authenticated one (never both)
    fn show_login(&mut self);
    /// Show the authenticated region and hide the login one (never both). The name and
    /// avatar are only filled in when the profile is known.
    fn show_authenticated(&mut self, user: Option<&User>);
    /// Make `section` the single visible section
    fn show_section(&mut self, section: Section);

    fn render_events(&mut self, view: &EventsListView);
    fn render_categories(&mut self, view: &CategoriesView);
    /// Refresh the category dropdown of the event form
    fn render_category_options(&mut self, options: &[CategoryOption]);
    fn render_telegram(&mut self, panel: &TelegramPanel);
    fn fill_settings_form(&mut self, settings: &Settings);

    fn fill_event_form(&mut self, form: &EventFormView);
    fn show_category_form(&mut self, form: &CategoryFormView);
    fn hide_category_form(&mut self);
    /// Reset the Telegram link form to empty
    fn reset_telegram_form(&mut self);

    fn show_event_details(&mut self, details: &EventDetailsView);
    fn close_event_details(&mut self);

    /// Ask the user to confirm a destructive operation. Returning `false` aborts it.
    fn confirm(&mut self, message: &str) -> bool;
}

/// The Interactive Calendar Widget, an external collaborator.
///
/// It consumes a plain list of [`CalendarEntry`] and emits interaction callbacks; the
/// page binding forwards those to the matching [`Session`](crate::session::Session)
/// methods (`show_event_details`, `create_event_at`, `reschedule_event`).
pub trait CalendarWidget {
    /// Whether [`Self::initialize`] has already run. The session constructs the widget at
    /// most once per page lifetime.
    fn is_initialized(&self) -> bool;
    /// Build and render the widget with its initial event source
    fn initialize(&mut self, entries: Vec<CalendarEntry>);
    /// Replace the widget's event source
    fn set_entries(&mut self, entries: Vec<CalendarEntry>);
}

/// The single shared toast element.
///
/// Implementations must be shareable with the timer task that auto-hides the toast,
/// hence the `Send + Sync` bound.
pub trait ToastSurface: Send + Sync {
    fn show(&self, toast: &ToastView);
    fn hide(&self);
}
