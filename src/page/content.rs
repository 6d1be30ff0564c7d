use super::browser::BrowserScheduler;
use super::{dom_error, js_reason, listen, select_all, select_within};
use crate::animation::{parse_counter_target, CounterAnimation, ProgressPlan};
use crate::config::PageConfig;
use crate::debounce::Debouncer;
use crate::error::Result;
use crate::search::{decide, Highlighter, Segment, HIGHLIGHT_CLASS, HIGHLIGHT_TAG};
use leptos::prelude::{document, set_interval_with_handle, set_timeout, window, IntervalHandle};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    Element, HtmlElement, HtmlImageElement, HtmlInputElement, IntersectionObserver,
    IntersectionObserverEntry, Node, ScrollBehavior, ScrollIntoViewOptions,
    ScrollLogicalPosition,
};

const SHOW_TEXT: u32 = 0x4;

pub fn init_progress_animations(config: &PageConfig) {
    for bar in select_all(".progress-bar") {
        let Ok(bar) = bar.dyn_into::<HtmlElement>() else {
            continue;
        };
        let style = bar.style();
        let plan = ProgressPlan::new(
            style.get_property_value("width").unwrap_or_default(),
            config.progress_delay(),
            Duration::from_millis(u64::from(config.progress_transition_ms)),
        );
        let _ = style.set_property("width", ProgressPlan::START_WIDTH);

        let delay = plan.delay;
        set_timeout(
            move || {
                let style = bar.style();
                let _ = style.set_property("transition", &plan.transition);
                let _ = style.set_property("width", &plan.target_width);
            },
            delay,
        );
    }

    for counter in select_all("[data-counter]") {
        if let Err(err) = animate_counter(&counter, config) {
            log::warn!("counter left as is: {err}");
        }
    }
}

pub fn animate_counter(element: &Element, config: &PageConfig) -> Result<()> {
    let raw = element.get_attribute("data-counter").unwrap_or_default();
    let target = parse_counter_target(&raw)?;
    let animation = RefCell::new(CounterAnimation::new(
        target,
        Duration::from_millis(u64::from(config.counter_duration_ms)),
        config.counter_tick(),
    ));

    let slot: Rc<Cell<Option<IntervalHandle>>> = Rc::new(Cell::new(None));
    let element = element.clone();
    let tick_slot = Rc::clone(&slot);
    let handle = set_interval_with_handle(
        move || {
            let frame = animation.borrow_mut().tick();
            element.set_text_content(Some(&frame.display.to_string()));
            if frame.done {
                if let Some(handle) = tick_slot.take() {
                    handle.clear();
                }
            }
        },
        config.counter_tick(),
    )
    .map_err(dom_error)?;
    slot.set(Some(handle));
    Ok(())
}

pub fn init_search(config: &PageConfig) {
    for element in select_all("[data-search]") {
        if let Ok(input) = element.dyn_into::<HtmlInputElement>() {
            enable_search(&input, config);
        }
    }
}

/// Filters the elements named by the input's `data-search` selector once
/// typing pauses, using the value the input holds at that moment.
pub fn enable_search(input: &HtmlInputElement, config: &PageConfig) {
    let selector: Rc<str> = Rc::from(input.get_attribute("data-search").unwrap_or_default());
    let debouncer = Debouncer::new(BrowserScheduler, config.search_debounce());
    let source = input.clone();
    listen(input, "input", move |_| {
        let source = source.clone();
        let selector = Rc::clone(&selector);
        debouncer.call(move || filter_elements(&source.value(), &selector));
    });
}

/// Shows the elements under `selector` whose text contains `term`, hides the
/// rest, and marks each occurrence inside the shown ones.
pub fn filter_elements(term: &str, selector: &str) {
    let highlighter = Highlighter::new(term);
    for element in select_all(selector) {
        let text = element.text_content().unwrap_or_default();
        let decision = decide(&text, term);
        if let Some(html) = element.dyn_ref::<HtmlElement>() {
            let _ = html
                .style()
                .set_property("display", decision.visibility.display());
        }

        remove_highlight(&element);
        if decision.highlight {
            if let Err(err) = highlight_text(&element, &highlighter) {
                log::debug!("highlight skipped: {err}");
            }
        }
    }
}

fn highlight_text(element: &Element, highlighter: &Highlighter) -> Result<()> {
    let document = document();
    let walker = document
        .create_tree_walker_with_what_to_show(element, SHOW_TEXT)
        .map_err(dom_error)?;
    let mut text_nodes: Vec<Node> = Vec::new();
    while let Ok(Some(node)) = walker.next_node() {
        text_nodes.push(node);
    }

    for node in text_nodes {
        let text = node.text_content().unwrap_or_default();
        let Some(segments) = highlighter.segments(&text) else {
            continue;
        };
        let Some(parent) = node.parent_node() else {
            continue;
        };
        let fragment = document.create_document_fragment();
        for segment in segments {
            match segment {
                Segment::Plain(run) => {
                    fragment
                        .append_child(&document.create_text_node(run))
                        .map_err(dom_error)?;
                }
                Segment::Mark(run) => {
                    let mark = document.create_element(HIGHLIGHT_TAG).map_err(dom_error)?;
                    mark.set_class_name(HIGHLIGHT_CLASS);
                    mark.set_text_content(Some(run));
                    fragment.append_child(&mark).map_err(dom_error)?;
                }
            }
        }
        parent.replace_child(&fragment, &node).map_err(dom_error)?;
    }
    Ok(())
}

fn remove_highlight(element: &Element) {
    let marks = select_within(element, &format!("{HIGHLIGHT_TAG}.{HIGHLIGHT_CLASS}"));
    if marks.is_empty() {
        return;
    }
    let document = document();
    for mark in marks {
        let Some(parent) = mark.parent_node() else {
            continue;
        };
        let text = document.create_text_node(&mark.text_content().unwrap_or_default());
        if let Err(err) = parent.replace_child(&text, &mark) {
            log::debug!("could not unwrap highlight: {}", js_reason(&err));
        }
    }
    element.normalize();
}

fn load_image(element: &Element) {
    if let Some(src) = element.get_attribute("data-src") {
        match element.dyn_ref::<HtmlImageElement>() {
            Some(image) => image.set_src(&src),
            None => {
                let _ = element.set_attribute("src", &src);
            }
        }
    }
    let _ = element.class_list().remove_1("lazy");
}

pub fn init_lazy_images() {
    let images = select_all("img[data-src]");
    if images.is_empty() {
        return;
    }
    let supported = js_sys::Reflect::has(&window(), &JsValue::from_str("IntersectionObserver"))
        .unwrap_or(false);
    if !supported {
        images.iter().for_each(load_image);
        return;
    }

    let callback = Closure::<dyn FnMut(js_sys::Array, IntersectionObserver)>::new(
        |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let entry: IntersectionObserverEntry = entry.unchecked_into();
                if entry.is_intersecting() {
                    let target = entry.target();
                    load_image(&target);
                    observer.unobserve(&target);
                }
            }
        },
    );
    match IntersectionObserver::new(callback.as_ref().unchecked_ref()) {
        Ok(observer) => {
            for image in &images {
                observer.observe(image);
            }
            callback.forget();
        }
        Err(err) => {
            log::warn!("IntersectionObserver failed, loading eagerly: {}", js_reason(&err));
            images.iter().for_each(load_image);
        }
    }
}

pub fn init_smooth_scroll() {
    for anchor in select_all("a[href^=\"#\"]") {
        let link = anchor.clone();
        listen(&anchor, "click", move |event| {
            event.prevent_default();
            let href = link.get_attribute("href").unwrap_or_default();
            let Ok(Some(target)) = document().query_selector(&href) else {
                return;
            };
            let options = ScrollIntoViewOptions::new();
            options.set_behavior(ScrollBehavior::Smooth);
            options.set_block(ScrollLogicalPosition::Start);
            target.scroll_into_view_with_scroll_into_view_options(&options);
        });
    }
}
