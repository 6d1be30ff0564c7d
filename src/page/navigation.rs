use super::widgets::Widgets;
use super::{listen, select_one};
use crate::shortcuts::{resolve, KeyChord, Shortcut};
use crate::storage::KeyValueStore;
use crate::theme::{Theme, ThemeState};
use leptos::prelude::{document, window};
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{HtmlElement, KeyboardEvent};

const THEME_TOGGLE_ID: &str = "themeToggle";

fn click(target: Option<web_sys::Element>) {
    if let Some(element) = target.and_then(|el| el.dyn_into::<HtmlElement>().ok()) {
        element.click();
    }
}

fn run(shortcut: Shortcut, widgets: &dyn Widgets) {
    match shortcut {
        Shortcut::SubmitFocusedForm => {
            let button = select_one(Shortcut::FOCUSED_FORM)
                .and_then(|form| form.query_selector(Shortcut::SUBMIT_BUTTON).ok().flatten());
            click(button);
        }
        Shortcut::DismissModal => {
            if let Some(modal) = select_one(Shortcut::OPEN_MODAL) {
                widgets.hide_modal(&modal);
            }
        }
        Shortcut::GoToDashboard => click(select_one(Shortcut::DASHBOARD_LINK)),
    }
}

pub fn init_shortcuts(widgets: Rc<dyn Widgets>) {
    listen(&window(), "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let chord = KeyChord {
            key: event.key(),
            ctrl: event.ctrl_key(),
            meta: event.meta_key(),
            alt: event.alt_key(),
        };
        if let Some(shortcut) = resolve(&chord) {
            if shortcut.prevents_default() {
                event.prevent_default();
            }
            run(shortcut, widgets.as_ref());
        }
    });
}

pub fn apply_theme(theme: Theme) {
    let document = document();
    if let Some(body) = document.body() {
        let _ = body.set_attribute("data-theme", theme.as_str());
    }
    let icon = document
        .get_element_by_id(THEME_TOGGLE_ID)
        .and_then(|toggle| toggle.query_selector("i").ok().flatten());
    if let Some(icon) = icon {
        icon.set_class_name(theme.icon_class());
    }
}

pub fn init_theme<S: KeyValueStore + 'static>(state: Rc<ThemeState<S>>) {
    apply_theme(state.current());
    let Some(toggle) = document().get_element_by_id(THEME_TOGGLE_ID) else {
        return;
    };
    listen(&toggle, "click", move |_| match state.toggle() {
        Ok(theme) => apply_theme(theme),
        Err(err) => {
            log::error!("theme not saved: {err}");
            apply_theme(state.current());
        }
    });
}
