use crate::autosave::Autosave;
use crate::config::PageConfig;
use crate::debounce::Debouncer;
use crate::format::{format_date, format_number, parse_date, NumberFormat};
use crate::page::browser::{self, BrowserScheduler, LocalStore};
use crate::page::toasts::ToastRenderer;
use crate::page::widgets::{bootstrap_available, Bootstrap, PlainWidgets, Widgets};
use crate::page::{clipboard, content, forms, js_reason, listen, navigation, select_all};
use crate::storage::{KeyValueStore, MemoryStore};
use crate::theme::ThemeState;
use crate::toast::{Notifier, Toast, ToastKind};
use js_sys::{Function, Object, Reflect};
use leptos::prelude::{document, window};
use std::cell::OnceCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;

pub type SharedStore = Rc<dyn KeyValueStore>;

/// Process-wide page state, built once on first use and kept for the page
/// lifetime.
pub struct Page {
    pub config: PageConfig,
    pub widgets: Rc<dyn Widgets>,
    pub notifier: Rc<ToastRenderer>,
    pub autosave: Rc<Autosave<SharedStore, Rc<ToastRenderer>>>,
    pub theme: Rc<ThemeState<SharedStore>>,
}

impl Page {
    fn detect() -> Self {
        let raw_config = document()
            .body()
            .and_then(|body| body.get_attribute("data-intellitutor-config"));
        let config = PageConfig::from_attribute(raw_config.as_deref());
        browser::set_debug_logging(config.debug);

        let store: SharedStore = match LocalStore::open() {
            Some(local) => Rc::new(local),
            None => {
                log::warn!("falling back to in-memory storage, drafts will not survive a reload");
                Rc::new(MemoryStore::new())
            }
        };
        let widgets: Rc<dyn Widgets> = if bootstrap_available() {
            Rc::new(Bootstrap)
        } else {
            log::info!("bootstrap not found, using plain widgets");
            Rc::new(PlainWidgets)
        };
        let notifier = Rc::new(ToastRenderer::new(Rc::clone(&widgets)));
        let autosave = Rc::new(Autosave::new(
            Rc::clone(&store),
            Rc::clone(&notifier),
            config.namespace.clone(),
        ));
        let theme = Rc::new(ThemeState::load(Rc::clone(&store), &config.namespace));

        Self {
            config,
            widgets,
            notifier,
            autosave,
            theme,
        }
    }
}

thread_local! {
    static PAGE: OnceCell<Rc<Page>> = const { OnceCell::new() };
}

pub fn page() -> Rc<Page> {
    PAGE.with(|cell| Rc::clone(cell.get_or_init(|| Rc::new(Page::detect()))))
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    browser::init_logging();

    let document = document();
    if document.ready_state() == "loading" {
        listen(&document, "DOMContentLoaded", |_| initialize_intellitutor());
    } else {
        initialize_intellitutor();
    }
}

#[wasm_bindgen(js_name = initializeIntelliTutor)]
pub fn initialize_intellitutor() {
    let page = page();
    publish_api();

    for element in select_all("[data-bs-toggle=\"tooltip\"]") {
        if let Err(err) = page.widgets.attach_tooltip(&element) {
            log::warn!("tooltip not attached: {err}");
        }
    }
    content::init_progress_animations(&page.config);
    forms::init_validation();
    forms::init_autosave(&page);
    navigation::init_shortcuts(Rc::clone(&page.widgets));
    navigation::init_theme(Rc::clone(&page.theme));
    content::init_search(&page.config);
    content::init_smooth_scroll();
    content::init_lazy_images();
    log::debug!("page enhancements ready");
}

#[wasm_bindgen(js_name = showToast)]
pub fn show_toast(message: &str, kind: Option<String>, duration_ms: Option<u32>) {
    let page = page();
    let kind = kind.as_deref().map(ToastKind::parse).unwrap_or_default();
    let duration = duration_ms
        .map(|ms| Duration::from_millis(u64::from(ms)))
        .unwrap_or_else(|| page.config.toast_duration());
    page.notifier
        .notify(Toast::new(message, kind).with_duration(duration));
}

#[wasm_bindgen(js_name = copyToClipboard)]
pub fn copy_to_clipboard(text: &str) {
    clipboard::copy_to_clipboard(text, Rc::clone(&page().notifier));
}

#[wasm_bindgen(js_name = formatDate)]
pub fn format_date_js(value: &str) -> Result<String, JsValue> {
    parse_date(value)
        .map(|stamp| format_date(&stamp.wall_clock(browser::local_offset)))
        .map_err(|err| JsValue::from_str(&err.to_string()))
}

#[wasm_bindgen(js_name = formatNumber)]
pub fn format_number_js(value: f64, options: JsValue) -> Result<String, JsValue> {
    let options = if options.is_undefined() || options.is_null() {
        NumberFormat::default()
    } else {
        serde_wasm_bindgen::from_value::<NumberFormat>(options)
            .map_err(|err| JsValue::from_str(&err.to_string()))?
    };
    format_number(value, &options).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Wraps `func` so that a burst of calls runs it once, with the last
/// argument, `wait_ms` after the burst ends.
#[wasm_bindgen(js_name = debounce)]
pub fn debounce_js(func: Function, wait_ms: u32) -> Function {
    let debouncer = Debouncer::new(BrowserScheduler, Duration::from_millis(u64::from(wait_ms)));
    let wrapper = Closure::<dyn FnMut(JsValue)>::new(move |arg: JsValue| {
        let func = func.clone();
        debouncer.call(move || {
            if let Err(err) = func.call1(&JsValue::NULL, &arg) {
                log::error!("debounced call threw: {}", js_reason(&err));
            }
        });
    });
    wrapper.into_js_value().unchecked_into()
}

fn set_api(api: &Object, name: &str, value: JsValue) {
    if let Err(err) = Reflect::set(api, &JsValue::from_str(name), &value) {
        log::warn!("could not export {name}: {}", js_reason(&err));
    }
}

/// Publishes `window.IntelliTutor` for inline page scripts.
fn publish_api() {
    let api = Object::new();

    let show = Closure::<dyn Fn(String, JsValue, JsValue)>::new(
        |message: String, kind: JsValue, duration: JsValue| {
            let duration_ms = duration.as_f64().filter(|ms| *ms >= 0.0).map(|ms| ms as u32);
            show_toast(&message, kind.as_string(), duration_ms);
        },
    );
    set_api(&api, "showToast", show.into_js_value());

    let copy = Closure::<dyn Fn(String)>::new(|text: String| copy_to_clipboard(&text));
    set_api(&api, "copyToClipboard", copy.into_js_value());

    let date = Closure::<dyn Fn(String) -> Result<String, JsValue>>::new(|value: String| {
        format_date_js(&value)
    });
    set_api(&api, "formatDate", date.into_js_value());

    let number = Closure::<dyn Fn(f64, JsValue) -> Result<String, JsValue>>::new(
        |value: f64, options: JsValue| format_number_js(value, options),
    );
    set_api(&api, "formatNumber", number.into_js_value());

    let debounce = Closure::<dyn Fn(Function, u32) -> Function>::new(debounce_js);
    set_api(&api, "debounce", debounce.into_js_value());

    set_api(&window(), "IntelliTutor", api.into());
}
