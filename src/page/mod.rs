//! Browser bindings. Everything below talks to the DOM; the rules it applies
//! live in the pure modules at the crate root.

pub mod browser;
pub mod clipboard;
pub mod content;
pub mod forms;
pub mod navigation;
pub mod toasts;
pub mod widgets;

use crate::error::EnhanceError;
use leptos::prelude::document;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, EventTarget, NodeList};

pub(crate) fn js_reason(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{err:?}")
}

pub(crate) fn dom_error(err: JsValue) -> EnhanceError {
    EnhanceError::Dom(js_reason(&err))
}

fn elements(list: Result<NodeList, JsValue>) -> Vec<Element> {
    let Ok(list) = list else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|idx| list.item(idx))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

pub(crate) fn select_all(selector: &str) -> Vec<Element> {
    elements(document().query_selector_all(selector))
}

pub(crate) fn select_within(root: &Element, selector: &str) -> Vec<Element> {
    elements(root.query_selector_all(selector))
}

pub(crate) fn select_one(selector: &str) -> Option<Element> {
    document().query_selector(selector).ok().flatten()
}

/// Attaches `handler` for the page lifetime.
pub(crate) fn listen(target: &EventTarget, event: &str, handler: impl FnMut(Event) + 'static) {
    let closure = Closure::<dyn FnMut(Event)>::new(handler);
    if let Err(err) =
        target.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())
    {
        log::warn!("could not listen for {event}: {}", js_reason(&err));
    }
    closure.forget();
}
