use super::{js_reason, listen};
use crate::error::{EnhanceError, Result};
use leptos::prelude::{set_timeout, window};
use std::time::Duration;
use wasm_bindgen::prelude::*;
use web_sys::{Element, HtmlElement};

/// The widget library behind tooltips, toasts and modals.
pub trait Widgets {
    fn attach_tooltip(&self, element: &Element) -> Result<()>;
    /// Shows `element` and removes it from the document once it hides.
    fn show_toast(&self, element: &HtmlElement, duration: Duration) -> Result<()>;
    /// Hides the modal instance bound to `element`; false if there is none.
    fn hide_modal(&self, element: &Element) -> bool;
}

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = bootstrap, js_name = Tooltip)]
    type BsTooltip;

    #[wasm_bindgen(constructor, js_namespace = bootstrap, js_class = "Tooltip", catch)]
    fn new(element: &Element) -> std::result::Result<BsTooltip, JsValue>;

    #[wasm_bindgen(js_namespace = bootstrap, js_name = Toast)]
    type BsToast;

    #[wasm_bindgen(constructor, js_namespace = bootstrap, js_class = "Toast", catch)]
    fn new(element: &Element, options: &JsValue) -> std::result::Result<BsToast, JsValue>;

    #[wasm_bindgen(method, js_class = "Toast")]
    fn show(this: &BsToast);

    #[wasm_bindgen(js_namespace = bootstrap, js_name = Modal)]
    type BsModal;

    #[wasm_bindgen(static_method_of = BsModal, js_class = "Modal", js_name = getInstance, catch)]
    fn get_instance(element: &Element) -> std::result::Result<Option<BsModal>, JsValue>;

    #[wasm_bindgen(method, js_class = "Modal")]
    fn hide(this: &BsModal);
}

fn widget_error(err: JsValue) -> EnhanceError {
    EnhanceError::Widget(js_reason(&err))
}

pub fn bootstrap_available() -> bool {
    js_sys::Reflect::get(&window(), &JsValue::from_str("bootstrap"))
        .map(|value| !value.is_undefined() && !value.is_null())
        .unwrap_or(false)
}

/// Bootstrap 5 through its global `bootstrap` namespace.
#[derive(Clone, Copy, Debug, Default)]
pub struct Bootstrap;

impl Widgets for Bootstrap {
    fn attach_tooltip(&self, element: &Element) -> Result<()> {
        BsTooltip::new(element).map(drop).map_err(widget_error)
    }

    fn show_toast(&self, element: &HtmlElement, duration: Duration) -> Result<()> {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &JsValue::from_str("delay"),
            &JsValue::from_f64(duration.as_millis() as f64),
        )
        .map_err(widget_error)?;
        let toast = BsToast::new(element, &options).map_err(widget_error)?;

        let hidden = element.clone();
        listen(element, "hidden.bs.toast", move |_| hidden.remove());
        toast.show();
        Ok(())
    }

    fn hide_modal(&self, element: &Element) -> bool {
        match BsModal::get_instance(element) {
            Ok(Some(modal)) => {
                modal.hide();
                true
            }
            Ok(None) => false,
            Err(err) => {
                log::warn!("modal lookup failed: {}", js_reason(&err));
                false
            }
        }
    }
}

/// Used when the page loads without Bootstrap's script: toasts still show
/// and expire, tooltips fall back to the native `title`.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlainWidgets;

impl Widgets for PlainWidgets {
    fn attach_tooltip(&self, _element: &Element) -> Result<()> {
        Ok(())
    }

    fn show_toast(&self, element: &HtmlElement, duration: Duration) -> Result<()> {
        element
            .class_list()
            .add_1("show")
            .map_err(|err| EnhanceError::Dom(js_reason(&err)))?;
        let element = element.clone();
        set_timeout(move || element.remove(), duration);
        Ok(())
    }

    fn hide_modal(&self, _element: &Element) -> bool {
        log::debug!("no widget library loaded, modal left open");
        false
    }
}
