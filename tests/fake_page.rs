//! Recording implementations of the UI collaborators, so that scenarios can assert on
//! what the session asked the page to display.
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Mutex;

use agenda_client::toast::ToastView;
use agenda_client::traits::{CalendarWidget, ToastSurface, ViewSurface};
use agenda_client::view::{
    CalendarEntry, CategoriesView, CategoryFormView, CategoryOption, EventDetailsView, EventFormView,
    EventsListView, Section, TelegramPanel,
};
use agenda_client::{Settings, User};

#[derive(Default)]
pub struct PageState {
    pub login_shown: u32,
    pub authenticated_shown: u32,
    pub authenticated_user: Option<User>,
    pub visible_section: Option<Section>,

    pub events_view: Option<EventsListView>,
    pub categories_view: Option<CategoriesView>,
    pub category_options: Vec<CategoryOption>,
    pub telegram_panel: Option<TelegramPanel>,
    pub settings_form: Option<Settings>,

    pub event_form: Option<EventFormView>,
    pub category_form: Option<CategoryFormView>,
    pub category_form_visible: bool,
    pub telegram_form_resets: u32,

    pub details: Option<EventDetailsView>,
    pub details_open: bool,

    /// What `confirm` answers, and how often it was asked
    pub confirm_answer: bool,
    pub confirms_asked: u32,
}

/// A page renderer that just records everything it is told to display
pub struct FakePage {
    pub state: Rc<RefCell<PageState>>,
}

impl FakePage {
    pub fn new() -> (Self, Rc<RefCell<PageState>>) {
        let state = Rc::new(RefCell::new(PageState { confirm_answer: true, ..PageState::default() }));
        (Self { state: state.clone() }, state)
    }
}

impl ViewSurface for FakePage {
    fn show_login(&mut self) {
        let mut state = self.state.borrow_mut();
        state.login_shown += 1;
        state.authenticated_user = None;
    }

    fn show_authenticated(&mut self, user: Option<&User>) {
        let mut state = self.state.borrow_mut();
        state.authenticated_shown += 1;
        state.authenticated_user = user.cloned();
    }

    fn show_section(&mut self, section: Section) {
        self.state.borrow_mut().visible_section = Some(section);
    }

    fn render_events(&mut self, view: &EventsListView) {
        self.state.borrow_mut().events_view = Some(view.clone());
    }

    fn render_categories(&mut self, view: &CategoriesView) {
        self.state.borrow_mut().categories_view = Some(view.clone());
    }

    fn render_category_options(&mut self, options: &[CategoryOption]) {
        self.state.borrow_mut().category_options = options.to_vec();
    }

    fn render_telegram(&mut self, panel: &TelegramPanel) {
        self.state.borrow_mut().telegram_panel = Some(panel.clone());
    }

    fn fill_settings_form(&mut self, settings: &Settings) {
        self.state.borrow_mut().settings_form = Some(settings.clone());
    }

    fn fill_event_form(&mut self, form: &EventFormView) {
        self.state.borrow_mut().event_form = Some(form.clone());
    }

    fn show_category_form(&mut self, form: &CategoryFormView) {
        let mut state = self.state.borrow_mut();
        state.category_form = Some(form.clone());
        state.category_form_visible = true;
    }

    fn hide_category_form(&mut self) {
        self.state.borrow_mut().category_form_visible = false;
    }

    fn reset_telegram_form(&mut self) {
        self.state.borrow_mut().telegram_form_resets += 1;
    }

    fn show_event_details(&mut self, details: &EventDetailsView) {
        let mut state = self.state.borrow_mut();
        state.details = Some(details.clone());
        state.details_open = true;
    }

    fn close_event_details(&mut self) {
        self.state.borrow_mut().details_open = false;
    }

    fn confirm(&mut self, _message: &str) -> bool {
        let mut state = self.state.borrow_mut();
        state.confirms_asked += 1;
        state.confirm_answer
    }
}

#[derive(Default)]
pub struct WidgetState {
    pub initialized: bool,
    pub init_count: u32,
    pub entries: Vec<CalendarEntry>,
}

/// A calendar widget stand-in that records its event source
pub struct FakeWidget {
    pub state: Rc<RefCell<WidgetState>>,
}

impl FakeWidget {
    pub fn new() -> (Self, Rc<RefCell<WidgetState>>) {
        let state = Rc::new(RefCell::new(WidgetState::default()));
        (Self { state: state.clone() }, state)
    }
}

impl CalendarWidget for FakeWidget {
    fn is_initialized(&self) -> bool {
        self.state.borrow().initialized
    }

    fn initialize(&mut self, entries: Vec<CalendarEntry>) {
        let mut state = self.state.borrow_mut();
        state.initialized = true;
        state.init_count += 1;
        state.entries = entries;
    }

    fn set_entries(&mut self, entries: Vec<CalendarEntry>) {
        self.state.borrow_mut().entries = entries;
    }
}

/// A toast element stand-in that records everything shown on it
#[derive(Default)]
pub struct FakeToast {
    pub shown: Mutex<Vec<ToastView>>,
}

impl FakeToast {
    pub fn last(&self) -> Option<ToastView> {
        self.shown.lock().unwrap().last().cloned()
    }
}

impl ToastSurface for FakeToast {
    fn show(&self, toast: &ToastView) {
        self.shown.lock().unwrap().push(toast.clone());
    }

    fn hide(&self) {}
}
