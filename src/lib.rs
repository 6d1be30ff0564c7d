//! Page enhancements for IntelliTutor: autosaving drafts, validation
//! feedback, search highlighting, toasts, theme and keyboard shortcuts,
//! layered over server-rendered HTML and Bootstrap.

pub mod animation;
pub mod app;
pub mod autosave;
pub mod config;
pub mod debounce;
pub mod error;
pub mod format;
pub mod page;
pub mod search;
pub mod shortcuts;
pub mod storage;
pub mod theme;
pub mod toast;
pub mod validation;

pub use app::{page, Page};
pub use error::{EnhanceError, Result};
