//! The session controller.
//!
//! One [`Session`] is instantiated per page, owns the in-memory copies of the remote
//! entities, and mediates between the Remote Data Service, the View Renderer and the
//! calendar widget. The mutation discipline is uniform: every successful write is
//! followed by a full reload of the affected collection, so the local copy always equals
//! what the server returned rather than a locally patched version.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::category::{Category, CategoryDraft, CategoryId};
use crate::event::{Event, EventDraft, EventId, TimeWindow};
use crate::settings::Settings;
use crate::telegram::{TelegramLinkRequest, TelegramStatus};
use crate::toast::Notifier;
use crate::traits::{CalendarWidget, RemoteSource, ToastSurface, ViewSurface};
use crate::user::User;
use crate::view;
use crate::view::{CategoryFormView, EventDetailsView, EventFormView, Section};

/// The write operations that are guarded against duplicate submission.
///
/// While an operation is in flight, a second identical request (e.g. a double-clicked
/// submit button) is dropped instead of producing a duplicate side effect.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum PendingOp {
    SaveEvent,
    DeleteEvent,
    RescheduleEvent,
    SaveCategory,
    DeleteCategory,
    SaveSettings,
    LinkTelegram,
    UnlinkTelegram,
    TestNotification,
    Logout,
}

/// The Client Session Controller.
///
/// `R` is the Remote Data Service (HTTP client, or an in-memory mock in tests), `V` the
/// page renderer, `W` the calendar widget. The session is the only owner of the entity
/// caches and the UI state; the page binding forwards DOM events to its methods.
pub struct Session<R, V, W>
where
    R: RemoteSource,
    V: ViewSurface,
    W: CalendarWidget,
{
    remote: R,
    page: V,
    widget: W,
    notifier: Notifier,

    user: Option<User>,
    events: HashMap<EventId, Event>,
    categories: HashMap<CategoryId, Category>,
    settings: Settings,
    telegram: TelegramStatus,

    current_section: Section,
    editing_event: Option<EventId>,
    editing_category: Option<CategoryId>,
    pending: HashSet<PendingOp>,
}

impl<R, V, W> Session<R, V, W>
where
    R: RemoteSource,
    V: ViewSurface,
    W: CalendarWidget,
{
    pub fn new(remote: R, page: V, widget: W, toast: Arc<dyn ToastSurface>) -> Self {
        Self {
            remote,
            page,
            widget,
            notifier: Notifier::new(toast),
            user: None,
            events: HashMap::new(),
            categories: HashMap::new(),
            settings: Settings::default(),
            telegram: TelegramStatus::default(),
            current_section: Section::Calendar,
            editing_event: None,
            editing_category: None,
            pending: HashSet::new(),
        }
    }

    /// The Remote Data Service behind this session. Apart from tests, there are very few
    /// (if any) reasons to access it directly.
    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }
    pub fn events(&self) -> &HashMap<EventId, Event> {
        &self.events
    }
    pub fn categories(&self) -> &HashMap<CategoryId, Category> {
        &self.categories
    }
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
    pub fn telegram(&self) -> &TelegramStatus {
        &self.telegram
    }
    pub fn current_section(&self) -> Section {
        self.current_section
    }

    //
    // Authentication & bootstrap
    //

    /// The session bootstrap: check the authentication status, and either reveal the
    /// authenticated UI and load every entity collection, or show the login prompt.
    ///
    /// Any failure here (network error, malformed body...) degrades to the login prompt;
    /// no distinct error state is surfaced.
    pub async fn initialize(&mut self) {
        match self.remote.auth_status().await {
            Ok(true) => {
                // A missing profile does not demote the session: the server said we are
                // authenticated, so the page shows the authenticated UI either way
                self.load_user().await;
                self.page.show_authenticated(self.user.as_ref());
                self.show_section(self.current_section).await;
                self.load_all().await;
            }
            Ok(false) => self.page.show_login(),
            Err(err) => {
                log::warn!("Unable to check authentication: {}", err);
                self.page.show_login();
            }
        }
    }

    async fn load_user(&mut self) {
        match self.remote.current_user().await {
            Ok(Some(user)) => self.user = Some(user),
            Ok(None) => {}
            Err(err) => log::warn!("Unable to load the user profile: {}", err),
        }
    }

    /// Load every entity collection. The four loads are independent: they are issued
    /// concurrently, awaited jointly, and a failure of one does not affect the others.
    async fn load_all(&mut self) {
        let (events, categories, settings, telegram) = tokio::join!(
            self.remote.events(),
            self.remote.categories(),
            self.remote.settings(),
            self.remote.telegram_status(),
        );
        self.apply_events(events);
        self.apply_categories(categories);
        self.apply_settings(settings);
        self.apply_telegram(telegram);
    }

    pub async fn logout(&mut self) {
        if self.begin(PendingOp::Logout) == false {
            return;
        }
        match self.remote.logout().await {
            Ok(()) => {
                self.user = None;
                self.page.show_login();
                self.notifier.success("Logged out");
            }
            Err(err) => self.notifier.error(format!("Could not log out: {}", err)),
        }
        self.finish(PendingOp::Logout);
    }

    //
    // Section navigation
    //

    /// Make `section` the active one and trigger its refresh: the calendar section
    /// initializes the widget (once), every other section re-fetches its entity.
    pub async fn show_section(&mut self, section: Section) {
        self.page.show_section(section);
        self.current_section = section;

        match section {
            Section::Calendar => self.init_calendar(),
            Section::Events => self.load_events().await,
            Section::Categories => self.load_categories().await,
            Section::Telegram => self.load_telegram_status().await,
            Section::Settings => self.load_settings().await,
        }
    }

    /// Construct the calendar widget if it does not exist yet. The widget is built at
    /// most once per page lifetime; afterwards only its event source is replaced.
    fn init_calendar(&mut self) {
        if self.widget.is_initialized() {
            return;
        }
        self.widget.initialize(view::calendar_entries(&self.events));
    }

    fn refresh_calendar(&mut self) {
        if self.widget.is_initialized() {
            self.widget.set_entries(view::calendar_entries(&self.events));
        }
    }

    //
    // Events
    //

    pub async fn load_events(&mut self) {
        let result = self.remote.events().await;
        self.apply_events(result);
    }

    fn apply_events(&mut self, result: Result<Vec<Event>, Box<dyn std::error::Error>>) {
        match result {
            Ok(events) => {
                self.events = events.into_iter().map(|e| (e.id, e)).collect();
                self.refresh_calendar();
                self.render_events_list();
                self.render_category_options();
            }
            // The previous local copy stays available (stale, but better than nothing)
            Err(err) => log::warn!("Unable to load events: {}", err),
        }
    }

    fn render_events_list(&mut self) {
        let list = view::events_list(&self.events, Utc::now().naive_utc());
        self.page.render_events(&list);
    }

    fn render_category_options(&mut self) {
        let options = view::category_options(&self.categories);
        self.page.render_category_options(&options);
    }

    /// "Add event" entry point: switch to the events section with a fresh form
    pub async fn add_event(&mut self) {
        self.show_section(Section::Events).await;
        self.reset_event_form();
    }

    /// Calendar date-click entry point: a fresh form preset to 09:00-10:00 on `date`
    pub async fn create_event_at(&mut self, date: NaiveDate) {
        self.show_section(Section::Events).await;
        self.editing_event = None;
        let form = EventFormView::for_date(date, Utc::now().naive_utc());
        self.page.fill_event_form(&form);
    }

    /// Clear the editing cursor and reset the form to its defaults
    pub fn reset_event_form(&mut self) {
        self.editing_event = None;
        let form = EventFormView::defaults(Utc::now().naive_utc());
        self.page.fill_event_form(&form);
    }

    /// Submit the event form. A non-null editing cursor selects an update addressed to
    /// that event's id; otherwise this is a create. On success the collection is reloaded
    /// in full and the form reset; on failure the form stays populated for correction.
    pub async fn save_event(&mut self, draft: EventDraft) {
        if self.begin(PendingOp::SaveEvent) == false {
            return;
        }
        let updating = self.editing_event.is_some();
        let result = match self.editing_event {
            Some(id) => self.remote.update_event(id, &draft).await,
            None => self.remote.create_event(&draft).await,
        };
        match result {
            Ok(()) => {
                self.load_events().await;
                self.reset_event_form();
                self.notifier.success(if updating { "Event updated" } else { "Event created" });
            }
            Err(err) => self.notifier.error(format!("Could not save the event: {}", err)),
        }
        self.finish(PendingOp::SaveEvent);
    }

    /// Open the detail modal for a cached event
    pub fn show_event_details(&mut self, id: EventId) {
        let details = match self.events.get(&id) {
            None => return,
            Some(event) => EventDetailsView::for_event(event),
        };
        self.page.show_event_details(&details);
    }

    /// Start editing an event: set the cursor, switch to the events section, close the
    /// modal and fill the form from the cached copy
    pub async fn edit_event(&mut self, id: EventId) {
        let event = match self.events.get(&id) {
            None => return,
            Some(event) => event.clone(),
        };
        self.editing_event = Some(id);
        self.show_section(Section::Events).await;
        self.page.close_event_details();
        self.page.fill_event_form(&EventFormView::for_event(&event));
    }

    /// Delete an event, after interactive confirmation. Declining issues no call at all.
    pub async fn delete_event(&mut self, id: EventId) {
        if self.page.confirm("Delete this event?") == false {
            return;
        }
        if self.begin(PendingOp::DeleteEvent) == false {
            return;
        }
        match self.remote.delete_event(id).await {
            Ok(()) => {
                self.load_events().await;
                self.page.close_event_details();
                self.notifier.success("Event deleted");
            }
            Err(err) => self.notifier.error(format!("Could not delete the event: {}", err)),
        }
        self.finish(PendingOp::DeleteEvent);
    }

    /// Widget drag/resize callback: push the new start/end to the server. On failure the
    /// events are reloaded so the widget reverts to the server's version (pessimistic
    /// rollback, no local undo).
    pub async fn reschedule_event(&mut self, id: EventId, window: TimeWindow) {
        if self.begin(PendingOp::RescheduleEvent) == false {
            return;
        }
        match self.remote.reschedule_event(id, &window).await {
            Ok(()) => {
                self.load_events().await;
                self.notifier.success("Event updated");
            }
            Err(err) => {
                log::warn!("Unable to reschedule event {}: {}", id, err);
                self.notifier.error(format!("Could not move the event: {}", err));
                self.load_events().await;
            }
        }
        self.finish(PendingOp::RescheduleEvent);
    }

    //
    // Categories
    //

    pub async fn load_categories(&mut self) {
        let result = self.remote.categories().await;
        self.apply_categories(result);
    }

    fn apply_categories(&mut self, result: Result<Vec<Category>, Box<dyn std::error::Error>>) {
        match result {
            Ok(categories) => {
                self.categories = categories.into_iter().map(|c| (c.id, c)).collect();
                let grid = view::categories_grid(&self.categories);
                self.page.render_categories(&grid);
                self.render_category_options();
            }
            Err(err) => log::warn!("Unable to load categories: {}", err),
        }
    }

    /// Open the category form for a new category
    pub fn show_category_form(&mut self) {
        self.editing_category = None;
        self.page.show_category_form(&CategoryFormView::defaults());
    }

    pub fn hide_category_form(&mut self) {
        self.editing_category = None;
        self.page.hide_category_form();
    }

    pub fn edit_category(&mut self, id: CategoryId) {
        let form = match self.categories.get(&id) {
            None => return,
            Some(category) => CategoryFormView::for_category(category),
        };
        self.editing_category = Some(id);
        self.page.show_category_form(&form);
    }

    pub async fn save_category(&mut self, draft: CategoryDraft) {
        if self.begin(PendingOp::SaveCategory) == false {
            return;
        }
        let updating = self.editing_category.is_some();
        let result = match self.editing_category {
            Some(id) => self.remote.update_category(id, &draft).await,
            None => self.remote.create_category(&draft).await,
        };
        match result {
            Ok(()) => {
                self.editing_category = None;
                self.load_categories().await;
                self.page.hide_category_form();
                self.notifier.success(if updating { "Category updated" } else { "Category created" });
            }
            Err(err) => self.notifier.error(format!("Could not save the category: {}", err)),
        }
        self.finish(PendingOp::SaveCategory);
    }

    pub async fn delete_category(&mut self, id: CategoryId) {
        if self.page.confirm("Delete this category?") == false {
            return;
        }
        if self.begin(PendingOp::DeleteCategory) == false {
            return;
        }
        match self.remote.delete_category(id).await {
            Ok(()) => {
                self.load_categories().await;
                self.notifier.success("Category deleted");
            }
            Err(err) => self.notifier.error(format!("Could not delete the category: {}", err)),
        }
        self.finish(PendingOp::DeleteCategory);
    }

    //
    // Settings
    //

    pub async fn load_settings(&mut self) {
        let result = self.remote.settings().await;
        self.apply_settings(result);
    }

    fn apply_settings(&mut self, result: Result<Settings, Box<dyn std::error::Error>>) {
        match result {
            Ok(settings) => {
                self.settings = settings;
                self.page.fill_settings_form(&self.settings);
            }
            Err(err) => log::warn!("Unable to load settings: {}", err),
        }
    }

    /// Save the settings singleton wholesale. The local copy is taken from the server's
    /// echo of the saved record, not from the submitted payload: if the server normalized
    /// a field, the form reflects that immediately.
    pub async fn save_settings(&mut self, settings: Settings) {
        if self.begin(PendingOp::SaveSettings) == false {
            return;
        }
        match self.remote.save_settings(&settings).await {
            Ok(saved) => {
                self.settings = saved;
                self.page.fill_settings_form(&self.settings);
                self.notifier.success("Settings saved");
            }
            Err(err) => self.notifier.error(format!("Could not save settings: {}", err)),
        }
        self.finish(PendingOp::SaveSettings);
    }

    //
    // Telegram link
    //

    pub async fn load_telegram_status(&mut self) {
        let result = self.remote.telegram_status().await;
        self.apply_telegram(result);
    }

    fn apply_telegram(&mut self, result: Result<TelegramStatus, Box<dyn std::error::Error>>) {
        match result {
            Ok(status) => {
                self.telegram = status;
                let panel = view::telegram_panel(&self.telegram);
                self.page.render_telegram(&panel);
            }
            Err(err) => log::warn!("Unable to load the Telegram status: {}", err),
        }
    }

    pub async fn link_telegram(&mut self, request: TelegramLinkRequest) {
        if self.begin(PendingOp::LinkTelegram) == false {
            return;
        }
        match self.remote.link_telegram(&request).await {
            Ok(()) => {
                self.load_telegram_status().await;
                self.page.reset_telegram_form();
                self.notifier.success("Telegram account linked");
            }
            Err(err) => self.notifier.error(format!("Could not link Telegram: {}", err)),
        }
        self.finish(PendingOp::LinkTelegram);
    }

    pub async fn unlink_telegram(&mut self) {
        if self.page.confirm("Unlink your Telegram account?") == false {
            return;
        }
        if self.begin(PendingOp::UnlinkTelegram) == false {
            return;
        }
        match self.remote.unlink_telegram().await {
            Ok(()) => {
                self.load_telegram_status().await;
                self.notifier.success("Telegram account unlinked");
            }
            Err(err) => self.notifier.error(format!("Could not unlink Telegram: {}", err)),
        }
        self.finish(PendingOp::UnlinkTelegram);
    }

    pub async fn send_test_notification(&mut self) {
        if self.begin(PendingOp::TestNotification) == false {
            return;
        }
        match self.remote.send_test_notification().await {
            Ok(()) => self.notifier.success("Test notification sent"),
            Err(err) => self.notifier.error(format!("Could not send the test notification: {}", err)),
        }
        self.finish(PendingOp::TestNotification);
    }

    //
    // In-flight guard
    //

    fn begin(&mut self, op: PendingOp) -> bool {
        if self.pending.insert(op) == false {
            log::debug!("{:?} is already in flight, dropping the duplicate request", op);
            return false;
        }
        true
    }

    fn finish(&mut self, op: PendingOp) {
        self.pending.remove(&op);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoRemote;

    #[async_trait::async_trait]
    impl RemoteSource for NoRemote {
        async fn auth_status(&self) -> Result<bool, Box<dyn std::error::Error>> {
            Ok(false)
        }
        async fn current_user(&self) -> Result<Option<User>, Box<dyn std::error::Error>> {
            Ok(None)
        }
        async fn logout(&self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn events(&self) -> Result<Vec<Event>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
        async fn create_event(&self, _: &EventDraft) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn update_event(&self, _: EventId, _: &EventDraft) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn reschedule_event(&self, _: EventId, _: &TimeWindow) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn delete_event(&self, _: EventId) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn categories(&self) -> Result<Vec<Category>, Box<dyn std::error::Error>> {
            Ok(Vec::new())
        }
        async fn create_category(&self, _: &CategoryDraft) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn update_category(&self, _: CategoryId, _: &CategoryDraft) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn delete_category(&self, _: CategoryId) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn settings(&self) -> Result<Settings, Box<dyn std::error::Error>> {
            Ok(Settings::default())
        }
        async fn save_settings(&self, s: &Settings) -> Result<Settings, Box<dyn std::error::Error>> {
            Ok(s.clone())
        }
        async fn telegram_status(&self) -> Result<TelegramStatus, Box<dyn std::error::Error>> {
            Ok(TelegramStatus::default())
        }
        async fn link_telegram(&self, _: &TelegramLinkRequest) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn unlink_telegram(&self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
        async fn send_test_notification(&self) -> Result<(), Box<dyn std::error::Error>> {
            Ok(())
        }
    }

    struct NoPage;
    impl ViewSurface for NoPage {
        fn show_login(&mut self) {}
        fn show_authenticated(&mut self, _: Option<&User>) {}
        fn show_section(&mut self, _: Section) {}
        fn render_events(&mut self, _: &crate::view::EventsListView) {}
        fn render_categories(&mut self, _: &crate::view::CategoriesView) {}
        fn render_category_options(&mut self, _: &[crate::view::CategoryOption]) {}
        fn render_telegram(&mut self, _: &crate::view::TelegramPanel) {}
        fn fill_settings_form(&mut self, _: &Settings) {}
        fn fill_event_form(&mut self, _: &EventFormView) {}
        fn show_category_form(&mut self, _: &CategoryFormView) {}
        fn hide_category_form(&mut self) {}
        fn reset_telegram_form(&mut self) {}
        fn show_event_details(&mut self, _: &EventDetailsView) {}
        fn close_event_details(&mut self) {}
        fn confirm(&mut self, _: &str) -> bool {
            true
        }
    }

    struct NoWidget;
    impl CalendarWidget for NoWidget {
        fn is_initialized(&self) -> bool {
            false
        }
        fn initialize(&mut self, _: Vec<crate::view::CalendarEntry>) {}
        fn set_entries(&mut self, _: Vec<crate::view::CalendarEntry>) {}
    }

    struct NoToast;
    impl ToastSurface for NoToast {
        fn show(&self, _: &crate::toast::ToastView) {}
        fn hide(&self) {}
    }

    fn session() -> Session<NoRemote, NoPage, NoWidget> {
        Session::new(NoRemote, NoPage, NoWidget, Arc::new(NoToast))
    }

    #[test]
    fn initial_section_is_the_calendar() {
        assert_eq!(session().current_section(), Section::Calendar);
    }

    #[test]
    fn an_in_flight_operation_blocks_its_duplicate_but_nothing_else() {
        let mut session = session();

        assert!(session.begin(PendingOp::SaveEvent));
        assert_eq!(session.begin(PendingOp::SaveEvent), false);
        // A different operation is not blocked
        assert!(session.begin(PendingOp::SaveCategory));

        session.finish(PendingOp::SaveEvent);
        assert!(session.begin(PendingOp::SaveEvent));
    }
}
