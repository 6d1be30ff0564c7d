use super::{dom_error, js_reason};
use crate::error::{EnhanceError, Result};
use crate::toast::{Notifier, Toast};
use js_sys::{Function, Promise, Reflect};
use leptos::prelude::{document, window};
use leptos::task::spawn_local;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, HtmlTextAreaElement};

/// `navigator.clipboard.writeText(text)`, or `None` when the async clipboard
/// API is missing (plain http, older browsers).
fn async_write(text: &str) -> Option<std::result::Result<Promise, JsValue>> {
    let navigator = window().navigator();
    let clipboard = Reflect::get(&navigator, &JsValue::from_str("clipboard"))
        .ok()
        .filter(|value| !value.is_undefined() && !value.is_null())?;
    let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
        .ok()?
        .dyn_into::<Function>()
        .ok()?;
    Some(
        write_text
            .call1(&clipboard, &JsValue::from_str(text))
            .and_then(|value| value.dyn_into::<Promise>()),
    )
}

fn copy_with_textarea(text: &str) -> Result<()> {
    let document = document();
    let body = document
        .body()
        .ok_or_else(|| EnhanceError::Dom("document has no body".to_string()))?;
    let area = document
        .create_element("textarea")
        .map_err(dom_error)?
        .dyn_into::<HtmlTextAreaElement>()
        .map_err(|_| EnhanceError::Dom("textarea cast failed".to_string()))?;
    area.set_value(text);
    body.append_child(&area).map_err(dom_error)?;
    area.select();

    let copied = document
        .dyn_into::<HtmlDocument>()
        .map_err(|_| EnhanceError::Clipboard("not an HTML document".to_string()))
        .and_then(|html| {
            html.exec_command("copy")
                .map_err(|err| EnhanceError::Clipboard(js_reason(&err)))
        });
    area.remove();

    if copied? {
        Ok(())
    } else {
        Err(EnhanceError::Clipboard("copy command was rejected".to_string()))
    }
}

fn report<N: Notifier>(notifier: &N, outcome: Result<()>) {
    match outcome {
        Ok(()) => notifier.notify(Toast::copied()),
        Err(err) => {
            log::error!("failed to copy text: {err}");
            notifier.notify(Toast::copy_failed());
        }
    }
}

pub fn copy_to_clipboard<N: Notifier + 'static>(text: &str, notifier: Rc<N>) {
    match async_write(text) {
        Some(Ok(promise)) => spawn_local(async move {
            let outcome = JsFuture::from(promise)
                .await
                .map(drop)
                .map_err(|err| EnhanceError::Clipboard(js_reason(&err)));
            report(&notifier, outcome);
        }),
        Some(Err(err)) => report(&notifier, Err(EnhanceError::Clipboard(js_reason(&err)))),
        None => report(&notifier, copy_with_textarea(text)),
    }
}
