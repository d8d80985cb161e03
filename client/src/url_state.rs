//! Browser location as reactive state.
//!
//! `path` and `query` mirror `window.location`. They change only through [`BrowserNavigation::go`]
//! (pushState) or a `popstate` event, so the URL stays the single store of the city filter.

use std::cell::RefCell;

use gatherings_shared::filter::{MAP_PATH, Navigation};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Map,
    NotFound,
}

impl Route {
    pub fn from_path(path: &str) -> Self {
        match path.trim_end_matches('/') {
            "" => Self::Landing,
            p if p == MAP_PATH => Self::Map,
            _ => Self::NotFound,
        }
    }
}

/// Split an href into path and query (without `?`); any fragment is dropped.
pub fn split_href(href: &str) -> (&str, &str) {
    let href = href.split('#').next().unwrap_or_default();
    match href.split_once('?') {
        Some((path, query)) => (path, query),
        None => (href, ""),
    }
}

#[derive(Clone, Copy)]
pub struct BrowserNavigation {
    path: RwSignal<String>,
    query: RwSignal<String>,
}

fn read_location() -> (String, String) {
    let Some(location) = web_sys::window().map(|w| w.location()) else {
        return ("/".to_string(), String::new());
    };
    let path = location.pathname().unwrap_or_else(|_| "/".to_string());
    let search = location.search().unwrap_or_default();
    (path, search.trim_start_matches('?').to_string())
}

impl BrowserNavigation {
    pub fn from_location() -> Self {
        let (path, query) = read_location();
        Self {
            path: RwSignal::new(path),
            query: RwSignal::new(query),
        }
    }

    pub fn route(&self) -> Route {
        self.path.with(|p| Route::from_path(p))
    }

    /// Re-read the address bar after back/forward.
    pub fn sync_from_location(&self) {
        let (path, query) = read_location();
        if self.path.get_untracked() != path {
            self.path.set(path);
        }
        if self.query.get_untracked() != query {
            self.query.set(query);
        }
    }

    /// Push `href` as a new history entry and update the mirrored state.
    pub fn go(&self, href: &str) {
        let pushed = web_sys::window()
            .and_then(|w| w.history().ok())
            .map(|h| h.push_state_with_url(&JsValue::NULL, "", Some(href)));
        if !matches!(pushed, Some(Ok(()))) {
            web_sys::console::warn_1(&format!("history.pushState failed for {href}").into());
            return;
        }
        let (path, query) = split_href(href);
        self.path.set(path.to_string());
        self.query.set(query.to_string());
    }
}

impl Navigation for BrowserNavigation {
    fn query(&self) -> String {
        self.query.get()
    }

    fn push(&mut self, href: &str) {
        self.go(href);
    }
}

struct PopStateBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn(web_sys::PopStateEvent)>,
}

thread_local! {
    static POPSTATE_BINDING: RefCell<Option<PopStateBinding>> = const { RefCell::new(None) };
}

/// Keep `nav` in step with back/forward navigation. Rebinding replaces the previous listener.
pub fn bind_popstate(nav: BrowserNavigation) {
    let Some(window) = web_sys::window() else {
        return;
    };

    unbind_popstate();

    let handler = Closure::<dyn Fn(web_sys::PopStateEvent)>::new(move |_: web_sys::PopStateEvent| {
        nav.sync_from_location();
    });
    if window
        .add_event_listener_with_callback("popstate", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        POPSTATE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(PopStateBinding {
                window: window.clone(),
                handler,
            });
        });
    }
}

pub fn unbind_popstate() {
    POPSTATE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("popstate", old.handler.as_ref().unchecked_ref());
        }
    });
}
