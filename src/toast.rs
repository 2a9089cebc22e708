//! The transient notification toast.
//!
//! There is a single shared toast element per page. Showing a new toast replaces the
//! current one and restarts the auto-hide timer (last-write-wins, no queue).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::traits::ToastSurface;

/// How long a toast stays visible
const AUTO_HIDE: Duration = Duration::from_millis(4000);

/// The severity of a toast, selecting its icon and style class
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Info
    }
}

impl Severity {
    /// The icon class for this severity
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Success => "fa-check-circle",
            Severity::Error => "fa-exclamation-circle",
            Severity::Warning => "fa-exclamation-triangle",
            Severity::Info => "fa-info-circle",
        }
    }

    /// The style class for this severity
    pub fn style_class(&self) -> &'static str {
        match self {
            Severity::Success => "toast-success",
            Severity::Error => "toast-error",
            Severity::Warning => "toast-warning",
            Severity::Info => "toast-info",
        }
    }
}

/// What the toast element displays
#[derive(Clone, Debug, PartialEq)]
pub struct ToastView {
    pub message: String,
    pub severity: Severity,
}

impl ToastView {
    pub fn new<S: ToString>(message: S, severity: Severity) -> Self {
        Self { message: message.to_string(), severity }
    }

    pub fn icon(&self) -> &'static str {
        self.severity.icon()
    }

    pub fn style_class(&self) -> &'static str {
        self.severity.style_class()
    }
}

/// Owns the toast element and its auto-hide timer.
///
/// Each notification bumps a generation counter; the spawned hide task only hides the
/// toast if no newer notification has replaced it in the meantime, which is what resets
/// the 4-second timer on a second call.
pub struct Notifier {
    surface: Arc<dyn ToastSurface>,
    generation: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new(surface: Arc<dyn ToastSurface>) -> Self {
        Self { surface, generation: Arc::new(AtomicU64::new(0)) }
    }

    /// Show `message` with the given severity, replacing whatever toast is currently
    /// visible, and hide it 4 seconds from now unless another toast supersedes it.
    pub fn notify<S: ToString>(&self, message: S, severity: Severity) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.surface.show(&ToastView::new(message, severity));

        let surface = Arc::clone(&self.surface);
        let counter = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(AUTO_HIDE).await;
            if counter.load(Ordering::SeqCst) == generation {
                surface.hide();
            }
        });
    }

    pub fn success<S: ToString>(&self, message: S) {
        self.notify(message, Severity::Success)
    }

    pub fn error<S: ToString>(&self, message: S) {
        self.notify(message, Severity::Error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Records what the page's toast element would display
    #[derive(Default)]
    struct RecordingToast {
        state: Mutex<ToastState>,
    }

    #[derive(Default)]
    struct ToastState {
        visible: Option<ToastView>,
        hides: u32,
    }

    impl ToastSurface for RecordingToast {
        fn show(&self, toast: &ToastView) {
            self.state.lock().unwrap().visible = Some(toast.clone());
        }
        fn hide(&self) {
            let mut state = self.state.lock().unwrap();
            state.visible = None;
            state.hides += 1;
        }
    }

    #[test]
    fn severities_map_to_distinct_icons_and_styles() {
        assert_eq!(Severity::Success.icon(), "fa-check-circle");
        assert_eq!(Severity::Success.style_class(), "toast-success");
        assert_eq!(Severity::Error.icon(), "fa-exclamation-circle");
        assert_eq!(Severity::Error.style_class(), "toast-error");
        assert_ne!(Severity::Success.icon(), Severity::Error.icon());
        assert_eq!(Severity::default(), Severity::Info);
    }

    #[tokio::test(start_paused = true)]
    async fn toast_hides_after_four_seconds() {
        let surface = Arc::new(RecordingToast::default());
        let notifier = Notifier::new(surface.clone() as Arc<dyn ToastSurface>);

        notifier.success("saved");
        tokio::task::yield_now().await;
        assert!(surface.state.lock().unwrap().visible.is_some());

        tokio::time::sleep(Duration::from_millis(3999)).await;
        assert!(surface.state.lock().unwrap().visible.is_some());

        tokio::time::sleep(Duration::from_millis(2)).await;
        assert!(surface.state.lock().unwrap().visible.is_none());
        assert_eq!(surface.state.lock().unwrap().hides, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn second_toast_replaces_content_and_resets_the_timer() {
        let surface = Arc::new(RecordingToast::default());
        let notifier = Notifier::new(surface.clone() as Arc<dyn ToastSurface>);

        notifier.error("first");
        tokio::time::sleep(Duration::from_millis(3000)).await;
        notifier.success("second");
        tokio::task::yield_now().await;

        {
            let state = surface.state.lock().unwrap();
            let visible = state.visible.as_ref().unwrap();
            assert_eq!(visible.message, "second");
            assert_eq!(visible.severity, Severity::Success);
        }

        // The first toast's timer elapses, but must not hide the second toast
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(surface.state.lock().unwrap().visible.is_some());
        assert_eq!(surface.state.lock().unwrap().hides, 0);

        // The second toast's own timer does
        tokio::time::sleep(Duration::from_millis(2600)).await;
        assert!(surface.state.lock().unwrap().visible.is_none());
        assert_eq!(surface.state.lock().unwrap().hides, 1);
    }
}
