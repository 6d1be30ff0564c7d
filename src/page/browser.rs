use super::js_reason;
use crate::debounce::{Scheduler, Task};
use crate::error::{EnhanceError, Result};
use crate::storage::KeyValueStore;
use chrono::{DateTime, FixedOffset, Offset, Utc};
use leptos::prelude::window;
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{console, Storage};

/// `window.localStorage`.
pub struct LocalStore {
    storage: Storage,
}

impl LocalStore {
    /// `None` when the browser refuses storage access.
    pub fn open() -> Option<Self> {
        match window().local_storage() {
            Ok(Some(storage)) => Some(Self { storage }),
            Ok(None) => None,
            Err(err) => {
                log::warn!("localStorage unavailable: {}", js_reason(&err));
                None
            }
        }
    }
}

fn storage_error(key: &str, err: JsValue) -> EnhanceError {
    EnhanceError::Storage {
        key: key.to_string(),
        reason: js_reason(&err),
    }
}

impl KeyValueStore for LocalStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.storage
            .get_item(key)
            .map_err(|err| storage_error(key, err))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.storage
            .set_item(key, value)
            .map_err(|err| storage_error(key, err))
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.storage
            .remove_item(key)
            .map_err(|err| storage_error(key, err))
    }
}

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// An armed `setTimeout`. The JS callback is released when it fires or when
/// the timer is cancelled, so rescheduling on every keystroke frees the
/// superseded tasks.
pub struct BrowserTimer {
    id: i32,
    callback: Callback,
}

impl BrowserTimer {
    /// `false` once the callback has run or been cancelled.
    pub fn is_armed(&self) -> bool {
        self.callback.borrow().is_some()
    }
}

/// `setTimeout` / `clearTimeout`.
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserScheduler;

impl Scheduler for BrowserScheduler {
    type Handle = BrowserTimer;

    fn schedule(&self, delay: Duration, task: Task) -> Option<BrowserTimer> {
        let callback: Callback = Rc::new(RefCell::new(None));
        let fired = Rc::clone(&callback);
        let mut task = Some(task);
        let closure = Closure::<dyn FnMut()>::new(move || {
            if let Some(task) = task.take() {
                task();
            }
            // wasm-bindgen defers freeing a closure dropped during its own call.
            let _released = fired.borrow_mut().take();
        });

        let millis = i32::try_from(delay.as_millis()).unwrap_or(i32::MAX);
        match window().set_timeout_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            millis,
        ) {
            Ok(id) => {
                *callback.borrow_mut() = Some(closure);
                Some(BrowserTimer { id, callback })
            }
            Err(err) => {
                log::error!("setTimeout failed: {}", js_reason(&err));
                None
            }
        }
    }

    fn cancel(&self, handle: BrowserTimer) {
        window().clear_timeout_with_handle(handle.id);
        handle.callback.borrow_mut().take();
    }
}

/// The viewer's UTC offset at `instant`, as the browser's `Date` reports it.
pub fn local_offset(instant: &DateTime<Utc>) -> FixedOffset {
    let date = js_sys::Date::new(&JsValue::from_f64(instant.timestamp_millis() as f64));
    // getTimezoneOffset is UTC minus local, in minutes.
    let minutes = -(date.get_timezone_offset() as i32);
    FixedOffset::east_opt(minutes * 60).unwrap_or_else(|| Utc.fix())
}

/// Routes the `log` facade to the browser console.
struct ConsoleLogger;

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let line = JsValue::from_str(&format!(
            "[intellitutor] {} {}: {}",
            record.level(),
            record.target(),
            record.args()
        ));
        match record.level() {
            Level::Error => console::error_1(&line),
            Level::Warn => console::warn_1(&line),
            Level::Info => console::info_1(&line),
            Level::Debug | Level::Trace => console::debug_1(&line),
        }
    }

    fn flush(&self) {}
}

static LOGGER: ConsoleLogger = ConsoleLogger;

pub fn init_logging() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Info);
    }
}

pub fn set_debug_logging(debug: bool) {
    log::set_max_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
}
