use super::dom_error;
use super::widgets::Widgets;
use crate::error::{EnhanceError, Result};
use crate::toast::{Notifier, Toast, CONTAINER_CLASS, CONTAINER_ID, CONTAINER_Z_INDEX};
use leptos::prelude::document;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Renders toasts into the shared corner container.
pub struct ToastRenderer {
    widgets: Rc<dyn Widgets>,
}

impl ToastRenderer {
    pub fn new(widgets: Rc<dyn Widgets>) -> Self {
        Self { widgets }
    }

    fn render(&self, toast: &Toast) -> Result<()> {
        let document = document();
        let container = container(&document)?;

        let element = html(&document, "div")?;
        element.set_class_name(&toast.class_name());
        element.set_attribute("role", "alert").map_err(dom_error)?;
        element.set_attribute("aria-live", "assertive").map_err(dom_error)?;
        element.set_attribute("aria-atomic", "true").map_err(dom_error)?;

        let row = html(&document, "div")?;
        row.set_class_name("d-flex");

        let body = html(&document, "div")?;
        body.set_class_name("toast-body");
        let icon = html(&document, "i")?;
        icon.set_class_name(&toast.icon_class());
        body.append_child(&icon).map_err(dom_error)?;
        body.append_child(&document.create_text_node(&toast.message))
            .map_err(dom_error)?;

        let close = html(&document, "button")?;
        close.set_class_name("btn-close btn-close-white me-2 m-auto");
        close.set_attribute("type", "button").map_err(dom_error)?;
        close.set_attribute("data-bs-dismiss", "toast").map_err(dom_error)?;
        close.set_attribute("aria-label", "Close").map_err(dom_error)?;

        row.append_child(&body).map_err(dom_error)?;
        row.append_child(&close).map_err(dom_error)?;
        element.append_child(&row).map_err(dom_error)?;
        container.append_child(&element).map_err(dom_error)?;

        self.widgets.show_toast(&element, toast.duration)
    }
}

impl Notifier for ToastRenderer {
    fn notify(&self, toast: Toast) {
        if let Err(err) = self.render(&toast) {
            log::warn!("toast `{}` not shown: {err}", toast.message);
        }
    }
}

fn html(document: &Document, tag: &str) -> Result<HtmlElement> {
    document
        .create_element(tag)
        .map_err(dom_error)?
        .dyn_into::<HtmlElement>()
        .map_err(|_| EnhanceError::Dom(format!("<{tag}> is not an HTML element")))
}

fn container(document: &Document) -> Result<HtmlElement> {
    if let Some(existing) = document.get_element_by_id(CONTAINER_ID) {
        if let Ok(existing) = existing.dyn_into::<HtmlElement>() {
            return Ok(existing);
        }
    }
    let body = document
        .body()
        .ok_or_else(|| EnhanceError::Dom("document has no body".to_string()))?;
    let container = html(document, "div")?;
    container.set_id(CONTAINER_ID);
    container.set_class_name(CONTAINER_CLASS);
    container
        .style()
        .set_property("z-index", CONTAINER_Z_INDEX)
        .map_err(dom_error)?;
    body.append_child(&container).map_err(dom_error)?;
    Ok(container)
}
