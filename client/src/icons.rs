use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use web_sys::HtmlImageElement;

static LOGO_WARNED: AtomicBool = AtomicBool::new(false);

enum LogoState {
    Loading,
    Ready(HtmlImageElement),
    Failed,
}

/// Decoded event logos keyed by URL. Each URL is fetched once; a missing logo
/// leaves the icon drawn without it.
#[derive(Clone)]
pub struct LogoCache {
    entries: Rc<RefCell<HashMap<&'static str, LogoState>>>,
    on_ready: Rc<dyn Fn()>,
}

fn warn_logo_once(message: &str) {
    if LOGO_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&message.into());
    }
}

impl LogoCache {
    pub fn new(on_ready: impl Fn() + 'static) -> Self {
        Self {
            entries: Rc::new(RefCell::new(HashMap::new())),
            on_ready: Rc::new(on_ready),
        }
    }

    /// The decoded logo, or `None` while it loads (starting the load on first ask).
    pub fn get(&self, url: &'static str) -> Option<HtmlImageElement> {
        if url.is_empty() {
            return None;
        }
        if let Some(state) = self.entries.borrow().get(url) {
            return match state {
                LogoState::Ready(img) => Some(img.clone()),
                LogoState::Loading | LogoState::Failed => None,
            };
        }
        self.entries.borrow_mut().insert(url, LogoState::Loading);
        self.load(url);
        None
    }

    fn load(&self, url: &'static str) {
        let entries = self.entries.clone();
        let on_ready = self.on_ready.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let Ok(image) = HtmlImageElement::new() else {
                entries.borrow_mut().insert(url, LogoState::Failed);
                warn_logo_once("Failed to create logo image element.");
                return;
            };
            image.set_src(url);
            let state = match wasm_bindgen_futures::JsFuture::from(image.decode()).await {
                Ok(_) => LogoState::Ready(image),
                Err(err) => {
                    warn_logo_once(&format!("Failed to decode event logo {url}: {err:?}"));
                    LogoState::Failed
                }
            };
            let ready = matches!(state, LogoState::Ready(_));
            entries.borrow_mut().insert(url, state);
            if ready {
                on_ready();
            }
        });
    }
}
