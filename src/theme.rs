use crate::error::Result;
use crate::storage::{theme_key, KeyValueStore};
use std::cell::Cell;
use std::fmt;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Unknown or empty names fall back to light.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    /// Icon offering the switch to the other theme.
    pub fn icon_class(self) -> &'static str {
        match self {
            Self::Light => "fas fa-moon",
            Self::Dark => "fas fa-sun",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current theme for the page lifetime, mirrored into storage on every
/// change.
pub struct ThemeState<S> {
    store: S,
    key: String,
    current: Cell<Theme>,
}

impl<S: KeyValueStore> ThemeState<S> {
    pub fn load(store: S, namespace: &str) -> Self {
        let key = theme_key(namespace);
        let current = match store.get(&key) {
            Ok(Some(saved)) => Theme::parse(&saved),
            Ok(None) => Theme::default(),
            Err(err) => {
                log::warn!("could not read saved theme: {err}");
                Theme::default()
            }
        };
        Self {
            store,
            key,
            current: Cell::new(current),
        }
    }

    pub fn current(&self) -> Theme {
        self.current.get()
    }

    /// Flips the theme. The in-memory state changes even if persisting fails.
    pub fn toggle(&self) -> Result<Theme> {
        let next = self.current.get().toggled();
        self.current.set(next);
        self.store.set(&self.key, next.as_str())?;
        Ok(next)
    }
}
