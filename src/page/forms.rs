use super::browser::BrowserScheduler;
use super::{js_reason, listen, select_all, select_within};
use crate::autosave::{AutosaveSession, FormFields, LoadOutcome};
use crate::validation::{
    field_error_message, FieldInfo, FieldStatus, Validity, INVALID_CLASS, VALID_CLASS,
    WAS_VALIDATED_CLASS,
};
use crate::Page;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Element, FormData, HtmlElement, HtmlFormElement, HtmlInputElement, HtmlSelectElement,
    HtmlTextAreaElement, ValidityState,
};

const FIELD_SELECTOR: &str = "input, textarea, select";

/// A form control that takes part in constraint validation.
#[derive(Clone)]
pub(crate) enum Field {
    Input(HtmlInputElement),
    TextArea(HtmlTextAreaElement),
    Select(HtmlSelectElement),
}

impl Field {
    pub(crate) fn from_element(element: Element) -> Option<Self> {
        element
            .dyn_into::<HtmlInputElement>()
            .map(Self::Input)
            .or_else(|el| el.dyn_into::<HtmlTextAreaElement>().map(Self::TextArea))
            .or_else(|el| el.dyn_into::<HtmlSelectElement>().map(Self::Select))
            .ok()
    }

    fn element(&self) -> &HtmlElement {
        match self {
            Self::Input(el) => el.as_ref(),
            Self::TextArea(el) => el.as_ref(),
            Self::Select(el) => el.as_ref(),
        }
    }

    fn check_validity(&self) -> bool {
        match self {
            Self::Input(el) => el.check_validity(),
            Self::TextArea(el) => el.check_validity(),
            Self::Select(el) => el.check_validity(),
        }
    }

    fn validity_state(&self) -> ValidityState {
        match self {
            Self::Input(el) => el.validity(),
            Self::TextArea(el) => el.validity(),
            Self::Select(el) => el.validity(),
        }
    }

    fn info(&self) -> FieldInfo {
        let (name, input_type, min_length, max_length) = match self {
            Self::Input(el) => (el.name(), el.type_(), el.min_length(), el.max_length()),
            Self::TextArea(el) => (el.name(), el.type_(), el.min_length(), el.max_length()),
            Self::Select(el) => (el.name(), el.type_(), -1, -1),
        };
        FieldInfo {
            name: Some(name).filter(|n| !n.is_empty()),
            input_type,
            min_length,
            max_length,
        }
    }
}

fn validity(state: &ValidityState) -> Validity {
    Validity {
        value_missing: state.value_missing(),
        type_mismatch: state.type_mismatch(),
        too_short: state.too_short(),
        too_long: state.too_long(),
    }
}

fn show_field_error(field: &Field) {
    let Some(parent) = field.element().parent_element() else {
        return;
    };
    let Ok(Some(feedback)) = parent.query_selector(".invalid-feedback") else {
        return;
    };
    let message = field_error_message(&field.info(), &validity(&field.validity_state()));
    feedback.set_text_content(Some(&message));
}

fn validate_field(field: &Field) {
    let status = FieldStatus::from_check(field.check_validity());
    let classes = field.element().class_list();
    let _ = classes.remove_2(VALID_CLASS, INVALID_CLASS);
    let _ = classes.add_1(status.class());
    if status == FieldStatus::Invalid {
        show_field_error(field);
    }
}

fn fields_of(form: &Element) -> Vec<Field> {
    select_within(form, FIELD_SELECTOR)
        .into_iter()
        .filter_map(Field::from_element)
        .collect()
}

pub fn init_validation() {
    for element in select_all(".needs-validation") {
        if let Ok(form) = element.dyn_into::<HtmlFormElement>() {
            enable_validation(&form);
        }
    }
}

/// Blocks invalid submissions of `form` and keeps its fields' status classes
/// and feedback text current.
pub fn enable_validation(form: &HtmlFormElement) {
    let submitted = form.clone();
    listen(form, "submit", move |event| {
        if !submitted.check_validity() {
            event.prevent_default();
            event.stop_propagation();
            let first_invalid = submitted
                .query_selector(":invalid")
                .ok()
                .flatten()
                .and_then(Field::from_element);
            if let Some(field) = first_invalid {
                let _ = field.element().focus();
                show_field_error(&field);
            }
        }
        let _ = submitted.class_list().add_1(WAS_VALIDATED_CLASS);
    });

    for field in fields_of(form) {
        let blurred = field.clone();
        listen(field.element(), "blur", move |_| validate_field(&blurred));

        // Typing only clears an existing error; a half-typed value is not
        // flagged until blur.
        let typed = field.clone();
        listen(field.element(), "input", move |_| {
            if typed.element().class_list().contains(INVALID_CLASS) {
                validate_field(&typed);
            }
        });
    }
}

/// Live view of a `<form>`'s successful controls.
pub struct HtmlForm {
    form: HtmlFormElement,
}

impl HtmlForm {
    pub fn new(form: HtmlFormElement) -> Self {
        Self { form }
    }
}

impl FormFields for HtmlForm {
    fn entries(&self) -> Vec<(String, String)> {
        let data = match FormData::new_with_form(&self.form) {
            Ok(data) => data,
            Err(err) => {
                log::warn!("cannot read form data: {}", js_reason(&err));
                return Vec::new();
            }
        };
        let Ok(Some(iter)) = js_sys::try_iter(&data) else {
            return Vec::new();
        };
        iter.filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let pair = entry.dyn_into::<js_sys::Array>().ok()?;
                // File inputs carry Blobs, which have no draft worth keeping.
                Some((pair.get(0).as_string()?, pair.get(1).as_string()?))
            })
            .collect()
    }

    fn set_field(&self, name: &str, value: &str) -> bool {
        let escaped = name.replace('\\', "\\\\").replace('"', "\\\"");
        let Ok(Some(field)) = self.form.query_selector(&format!("[name=\"{escaped}\"]")) else {
            return false;
        };
        js_sys::Reflect::set(&field, &JsValue::from_str("value"), &JsValue::from_str(value))
            .is_ok()
    }
}

pub fn init_autosave(page: &Page) {
    for element in select_all("[data-autosave]") {
        let form_id = element.get_attribute("data-autosave").unwrap_or_default();
        match element.dyn_into::<HtmlFormElement>() {
            Ok(form) => enable_autosave(page, &form, &form_id),
            Err(_) => log::warn!("data-autosave=\"{form_id}\" is not on a <form>, skipped"),
        }
    }
}

/// Restores the draft stored for `form_id`, saves on input and clears the
/// draft shortly after a submission that validation let through.
pub fn enable_autosave(page: &Page, form: &HtmlFormElement, form_id: &str) {
    let (session, outcome) = AutosaveSession::initialize(
        Rc::clone(&page.autosave),
        Rc::new(HtmlForm::new(form.clone())),
        form_id,
        BrowserScheduler,
        page.config.autosave_debounce(),
        page.config.autosave_clear_delay(),
    );
    if let LoadOutcome::Loaded { applied, skipped } = outcome {
        log::debug!("restored draft {form_id}: {applied} field(s), {skipped} unmatched");
    }
    let session = Rc::new(session);

    for field in select_within(form, FIELD_SELECTOR) {
        let session = Rc::clone(&session);
        listen(&field, "input", move |_| session.on_input());
    }
    // Validation listeners run first; a blocked submission keeps the draft.
    listen(form, "submit", move |event| {
        if !event.default_prevented() {
            session.on_submit();
        }
    });
}
