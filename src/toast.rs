use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

pub const CONTAINER_ID: &str = "toastContainer";
pub const CONTAINER_CLASS: &str = "toast-container position-fixed bottom-0 end-0 p-3";
pub const CONTAINER_Z_INDEX: &str = "1060";
pub const DEFAULT_DURATION: Duration = Duration::from_millis(5000);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
    Warning,
    #[default]
    Info,
}

impl ToastKind {
    /// Lenient parse for the exported JS API; unknown names read as `Info`.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "error" | "danger" => Self::Error,
            "warning" => Self::Warning,
            _ => Self::Info,
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Success => "check-circle",
            Self::Error => "exclamation-triangle",
            Self::Warning => "exclamation-circle",
            Self::Info => "info-circle",
        }
    }

    /// Bootstrap contextual color used as `bg-<color>`.
    pub fn color(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub duration: Duration,
}

impl Toast {
    pub fn new(message: impl Into<String>, kind: ToastKind) -> Self {
        Self {
            message: message.into(),
            kind,
            duration: DEFAULT_DURATION,
        }
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    pub fn draft_saved() -> Self {
        Self::new("Draft saved automatically", ToastKind::Success)
            .with_duration(Duration::from_millis(2000))
    }

    pub fn draft_loaded() -> Self {
        Self::new("Previous draft loaded", ToastKind::Info)
            .with_duration(Duration::from_millis(3000))
    }

    pub fn copied() -> Self {
        Self::new("Copied to clipboard", ToastKind::Success)
            .with_duration(Duration::from_millis(2000))
    }

    pub fn copy_failed() -> Self {
        Self::new("Failed to copy text", ToastKind::Error)
    }

    pub fn class_name(&self) -> String {
        format!(
            "toast align-items-center text-white bg-{} border-0",
            self.kind.color()
        )
    }

    pub fn icon_class(&self) -> String {
        format!("fas fa-{} me-2", self.kind.icon())
    }
}

pub trait Notifier {
    fn notify(&self, toast: Toast);
}

impl<N: Notifier + ?Sized> Notifier for Rc<N> {
    fn notify(&self, toast: Toast) {
        (**self).notify(toast)
    }
}

/// Collects toasts instead of showing them.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    shown: RefCell<Vec<Toast>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.shown.borrow_mut())
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, toast: Toast) {
        self.shown.borrow_mut().push(toast);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_icon_and_color() {
        let toast = Toast::new("hi", ToastKind::Error);
        assert_eq!(toast.class_name(), "toast align-items-center text-white bg-danger border-0");
        assert_eq!(toast.icon_class(), "fas fa-exclamation-triangle me-2");
        assert_eq!(ToastKind::Warning.icon(), "exclamation-circle");
        assert_eq!(toast.duration, DEFAULT_DURATION);
    }

    #[test]
    fn unknown_kind_reads_as_info() {
        assert_eq!(ToastKind::parse("SUCCESS"), ToastKind::Success);
        assert_eq!(ToastKind::parse("purple"), ToastKind::Info);
        assert_eq!(ToastKind::parse(""), ToastKind::Info);
    }

    #[test]
    fn recording_notifier_keeps_arrival_order() {
        let notifier = RecordingNotifier::new();
        notifier.notify(Toast::draft_loaded());
        notifier.notify(Toast::draft_saved());
        let shown = notifier.take();
        assert_eq!(shown[0].message, "Previous draft loaded");
        assert_eq!(shown[1].duration, Duration::from_millis(2000));
        assert!(notifier.take().is_empty());
    }
}
