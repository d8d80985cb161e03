use std::cell::RefCell;
use std::collections::{HashSet, VecDeque};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

use gatherings_shared::map_config::TILE_LAYER_URL;
use gatherings_shared::tiles::{TileCache, TileKey, TilePlacement, visible_tiles};
use gatherings_shared::viewport::{ScreenSize, Viewport};
use js_sys::Reflect;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

const MAX_CONCURRENT_LOADS: usize = 6;
const TILE_CACHE_CAPACITY: usize = 256;
/// How many zoom levels up to look for a stand-in while a tile loads.
const FALLBACK_LEVELS: u8 = 4;
const ONLOAD_HANDLE_KEY: &str = "__gatheringsTileOnload";
const ONERROR_HANDLE_KEY: &str = "__gatheringsTileOnerror";

static TILE_ERROR_WARNED: AtomicBool = AtomicBool::new(false);

type LoadedCallback = Rc<dyn Fn()>;

struct LayerState {
    cache: TileCache<HtmlImageElement>,
    queue: VecDeque<TileKey>,
    in_flight: HashSet<TileKey>,
    failed: HashSet<TileKey>,
}

/// Raster basemap: loads tiles through a bounded queue and paints them onto a 2D context.
#[derive(Clone)]
pub struct TileLayer {
    state: Rc<RefCell<LayerState>>,
    on_loaded: LoadedCallback,
    retina: bool,
}

impl TileLayer {
    /// `on_loaded` fires after each tile arrives so the caller can repaint.
    pub fn new(on_loaded: impl Fn() + 'static) -> Self {
        let retina = web_sys::window()
            .map(|w| w.device_pixel_ratio() > 1.0)
            .unwrap_or(false);
        Self {
            state: Rc::new(RefCell::new(LayerState {
                cache: TileCache::new(TILE_CACHE_CAPACITY),
                queue: VecDeque::new(),
                in_flight: HashSet::new(),
                failed: HashSet::new(),
            })),
            on_loaded: Rc::new(on_loaded),
            retina,
        }
    }

    /// Paint the tiles covering `vp`, using scaled ancestors for tiles still loading,
    /// and queue whatever is missing (nearest to the center first).
    pub fn draw(&self, ctx: &CanvasRenderingContext2d, vp: &Viewport, size: ScreenSize) {
        let placements = visible_tiles(vp, size);
        let mut missing = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for placement in &placements {
                if let Some(img) = state.cache.touch(&placement.key) {
                    draw_full(ctx, img, placement);
                    continue;
                }
                if !state.failed.contains(&placement.key) {
                    missing.push(placement.key);
                }
                draw_fallback(ctx, &mut state.cache, placement);
            }
            let LayerState {
                queue, in_flight, ..
            } = &mut *state;
            queue.clear();
            queue.extend(missing.into_iter().filter(|k| !in_flight.contains(k)));
        }
        pump_queue(self.state.clone(), self.on_loaded.clone(), self.retina);
    }
}

fn draw_full(ctx: &CanvasRenderingContext2d, img: &HtmlImageElement, p: &TilePlacement) {
    // Half a pixel of overlap hides seams between neighbours at fractional zoom.
    let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
        img,
        p.sx,
        p.sy,
        p.size + 0.5,
        p.size + 0.5,
    );
}

fn draw_fallback(
    ctx: &CanvasRenderingContext2d,
    cache: &mut TileCache<HtmlImageElement>,
    p: &TilePlacement,
) {
    for levels in 1..=FALLBACK_LEVELS {
        let Some((ancestor, ox, oy, part)) = p.key.ancestor_crop(levels) else {
            return;
        };
        let Some(img) = cache.touch(&ancestor) else {
            continue;
        };
        // Retina tiles are twice the nominal size.
        let k = f64::from(img.natural_width().max(1)) / 256.0;
        let _ = ctx
            .draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                img,
                ox * k,
                oy * k,
                part * k,
                part * k,
                p.sx,
                p.sy,
                p.size + 0.5,
                p.size + 0.5,
            );
        return;
    }
}

fn pump_queue(state: Rc<RefCell<LayerState>>, on_loaded: LoadedCallback, retina: bool) {
    loop {
        let job = {
            let mut s = state.borrow_mut();
            if s.in_flight.len() >= MAX_CONCURRENT_LOADS {
                break;
            }
            let Some(key) = s.queue.pop_front() else {
                break;
            };
            s.in_flight.insert(key);
            key
        };
        load_tile(state.clone(), on_loaded.clone(), job, retina);
    }
}

fn warn_tile_error_once(url: &str) {
    if TILE_ERROR_WARNED
        .compare_exchange(false, true, Ordering::Relaxed, Ordering::Relaxed)
        .is_ok()
    {
        web_sys::console::warn_1(&format!("Map tile failed to load: {url}").into());
    }
}

fn finish(
    state: &Rc<RefCell<LayerState>>,
    on_loaded: &LoadedCallback,
    key: TileKey,
    result: Option<HtmlImageElement>,
    retina: bool,
) {
    {
        let mut s = state.borrow_mut();
        s.in_flight.remove(&key);
        match result {
            Some(img) => s.cache.insert(key, img),
            None => {
                s.failed.insert(key);
            }
        }
    }
    on_loaded();
    pump_queue(state.clone(), on_loaded.clone(), retina);
}

fn load_tile(state: Rc<RefCell<LayerState>>, on_loaded: LoadedCallback, key: TileKey, retina: bool) {
    let url = key.url(TILE_LAYER_URL, retina);
    let Ok(img) = HtmlImageElement::new() else {
        finish(&state, &on_loaded, key, None, retina);
        return;
    };
    img.set_cross_origin(Some("anonymous"));

    let img_for_load = img.clone();
    let state_load = state.clone();
    let on_loaded_load = on_loaded.clone();
    let onload = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_load);
        let img = img_for_load.clone();
        let state = state_load.clone();
        let on_loaded = on_loaded_load.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = JsFuture::from(img.decode()).await;
            finish(&state, &on_loaded, key, Some(img), retina);
        });
    });

    let img_for_error = img.clone();
    let url_for_error = url.clone();
    let onerror = Closure::<dyn FnMut()>::new(move || {
        clear_image_handlers(&img_for_error);
        warn_tile_error_once(&url_for_error);
        finish(&state, &on_loaded, key, None, retina);
    });

    let onload_js = onload.into_js_value();
    let onerror_js = onerror.into_js_value();
    img.set_onload(Some(onload_js.unchecked_ref()));
    img.set_onerror(Some(onerror_js.unchecked_ref()));
    let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY), &onload_js);
    let _ = Reflect::set(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY), &onerror_js);
    img.set_src(&url);
}

fn clear_image_handlers(img: &HtmlImageElement) {
    img.set_onload(None);
    img.set_onerror(None);
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONLOAD_HANDLE_KEY));
    let _ = Reflect::delete_property(img.as_ref(), &JsValue::from_str(ONERROR_HANDLE_KEY));
}
