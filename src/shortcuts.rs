/// Key plus modifiers, as read off a `keydown` event.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KeyChord {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
}

impl KeyChord {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Self::default()
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shortcut {
    SubmitFocusedForm,
    DismissModal,
    GoToDashboard,
}

impl Shortcut {
    pub const FOCUSED_FORM: &'static str = "form:focus-within";
    pub const SUBMIT_BUTTON: &'static str = "button[type=\"submit\"]";
    pub const OPEN_MODAL: &'static str = ".modal.show";
    pub const DASHBOARD_LINK: &'static str = "a[href*=\"dashboard\"]";

    /// Whether the browser's own handling of the key should be suppressed.
    pub fn prevents_default(self) -> bool {
        matches!(self, Self::GoToDashboard)
    }
}

pub fn resolve(chord: &KeyChord) -> Option<Shortcut> {
    if (chord.ctrl || chord.meta) && chord.key == "Enter" {
        return Some(Shortcut::SubmitFocusedForm);
    }
    if chord.key == "Escape" {
        return Some(Shortcut::DismissModal);
    }
    if chord.alt && chord.key == "d" {
        return Some(Shortcut::GoToDashboard);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_with_either_primary_modifier() {
        assert_eq!(resolve(&KeyChord::new("Enter").ctrl()), Some(Shortcut::SubmitFocusedForm));
        assert_eq!(resolve(&KeyChord::new("Enter").meta()), Some(Shortcut::SubmitFocusedForm));
        assert_eq!(resolve(&KeyChord::new("Enter")), None);
    }

    #[test]
    fn escape_and_dashboard() {
        assert_eq!(resolve(&KeyChord::new("Escape")), Some(Shortcut::DismissModal));
        assert_eq!(resolve(&KeyChord::new("Escape").ctrl()), Some(Shortcut::DismissModal));
        let dashboard = resolve(&KeyChord::new("d").alt()).unwrap();
        assert_eq!(dashboard, Shortcut::GoToDashboard);
        assert!(dashboard.prevents_default());
        assert_eq!(resolve(&KeyChord::new("d")), None);
        assert_eq!(resolve(&KeyChord::new("D").alt()), None);
    }

    #[test]
    fn first_match_wins() {
        let chord = KeyChord::new("Enter").ctrl().alt();
        assert_eq!(resolve(&chord), Some(Shortcut::SubmitFocusedForm));
        assert!(!Shortcut::SubmitFocusedForm.prevents_default());
    }
}
