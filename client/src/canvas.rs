use std::cell::{Cell, RefCell};
use std::f64::consts::{FRAC_PI_2, TAU};
use std::rc::{Rc, Weak};

use gatherings_shared::catalog::EventRecord;
use gatherings_shared::cluster::{
    Cluster, ClusterClick, ClusterIcon, cluster_click, cluster_markers, convex_hull,
    spider_offsets, unclustered,
};
use gatherings_shared::geo::{LatLng, meters_per_pixel};
use gatherings_shared::geolocate::UserLocation;
use gatherings_shared::map_config::MAX_CLUSTER_RADIUS_PX;
use gatherings_shared::marker::{IconRect, cluster_rect, marker_rect};
use gatherings_shared::viewport::{ScreenSize, Viewport};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, MouseEvent, PointerEvent,
    WheelEvent,
};

use crate::animation::{ActiveFlight, FlightPurpose, FlightSlot};
use crate::app::{ClusterMarkers, FilteredEvents, Flights, GeoSignal, MapSize, OpenPopup};
use crate::colors::{
    ACCENT_DARK, CLUSTER_RING, MAP_BACKGROUND, MARKER_BORDER, USER_DOT, accent_css,
    rgba_css,
};
use crate::icons::LogoCache;
use crate::render_loop::RenderScheduler;
use crate::tiles::TileLayer;

/// Wheel travel (in pixels) for one full zoom level.
const WHEEL_PX_PER_ZOOM: f64 = 100.0;
/// Pointer travel below this still counts as a click.
const CLICK_SLOP_PX: f64 = 5.0;
/// Icons this far outside the screen are still drawn so they don't pop in at the edges.
const CULL_MARGIN_PX: f64 = 60.0;
const CLUSTER_LOGO_PX: f64 = 20.0;
const SPIDERFIED_CLUSTER_ALPHA: f64 = 0.3;

/// What sits under the pointer. Marker and leg indices point into the filtered
/// events; cluster indices into the current clustering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Hit {
    Marker(usize),
    Cluster(usize),
    Leg(usize),
}

/// Topmost hit at `(x, y)`; later entries were drawn over earlier ones.
fn hit_test(hits: &[(IconRect, Hit)], x: f64, y: f64) -> Option<Hit> {
    hits.iter()
        .rev()
        .find(|(rect, _)| rect.contains(x, y))
        .map(|(_, hit)| *hit)
}

/// A cluster fanned out at maximum zoom.
#[derive(Debug, Clone, PartialEq)]
struct Spider {
    members: Vec<usize>,
    center: LatLng,
    zoom_floor: f64,
}

impl Spider {
    /// Still showing the same cluster at the same zoom step.
    fn is_current(&self, clusters: &[Cluster], zoom: f64) -> bool {
        self.zoom_floor == zoom.floor() && clusters.iter().any(|c| c.members == self.members)
    }
}

struct ResizeBinding {
    window: web_sys::Window,
    handler: Closure<dyn Fn()>,
}

thread_local! {
    static RESIZE_BINDING: RefCell<Option<ResizeBinding>> = const { RefCell::new(None) };
}

fn unbind_resize() {
    RESIZE_BINDING.with(|slot| {
        if let Some(old) = slot.borrow_mut().take() {
            let _ = old
                .window
                .remove_event_listener_with_callback("resize", old.handler.as_ref().unchecked_ref());
        }
    });
}

fn bind_resize(redraw: impl Fn() + 'static) {
    let Some(window) = web_sys::window() else {
        return;
    };
    unbind_resize();
    let handler = Closure::<dyn Fn()>::new(redraw);
    if window
        .add_event_listener_with_callback("resize", handler.as_ref().unchecked_ref())
        .is_ok()
    {
        RESIZE_BINDING.with(|slot| {
            *slot.borrow_mut() = Some(ResizeBinding {
                window: window.clone(),
                handler,
            });
        });
    }
}

fn device_pixel_ratio() -> f64 {
    web_sys::window()
        .map(|w| w.device_pixel_ratio())
        .unwrap_or(1.0)
        .max(1.0)
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, client_x: i32, client_y: i32) -> (f64, f64) {
    let (cx, cy) = (f64::from(client_x), f64::from(client_y));
    canvas_ref
        .get_untracked()
        .map(|el| {
            let rect = el.get_bounding_client_rect();
            (cx - rect.left(), cy - rect.top())
        })
        .unwrap_or((cx, cy))
}

/// Canvas 2D map surface: basemap tiles, markers, clusters, spider legs, and the user's position.
#[component]
pub fn MapCanvas() -> impl IntoView {
    let viewport: RwSignal<Viewport> = expect_context();
    let MapSize(map_size) = expect_context();
    let FilteredEvents(filtered) = expect_context();
    let ClusterMarkers(cluster_on) = expect_context();
    let Flights(flights) = expect_context();
    let GeoSignal(geo) = expect_context();
    let OpenPopup(popup) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();

    let zoom_floor = Memo::new(move |_| viewport.get().zoom.floor());
    let clusters = Memo::new(move |_| {
        let grouped = cluster_on.get();
        let zoom = zoom_floor.get();
        filtered.with(|events| {
            if grouped {
                cluster_markers(events, zoom, MAX_CLUSTER_RADIUS_PX)
            } else {
                unclustered(events)
            }
        })
    });

    // Drag state
    let is_dragging = Rc::new(Cell::new(false));
    let dragged = Rc::new(Cell::new(false));
    let drag_start = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last_pos = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let pinch_dist = Rc::new(Cell::new(0.0f64));

    let hovered: Rc<Cell<Option<Hit>>> = Rc::new(Cell::new(None));
    let hits: Rc<RefCell<Vec<(IconRect, Hit)>>> = Rc::new(RefCell::new(Vec::new()));
    let spider: Rc<RefCell<Option<Spider>>> = Rc::new(RefCell::new(None));

    // Image loaders repaint through a weak handle so they don't keep the scheduler alive.
    let sched_slot: Rc<RefCell<Weak<RenderScheduler>>> = Rc::new(RefCell::new(Weak::new()));
    let redraw = {
        let slot = sched_slot.clone();
        move || {
            if let Some(s) = slot.borrow().upgrade() {
                s.mark_dirty();
            }
        }
    };
    let tiles = TileLayer::new(redraw.clone());
    let logos = LogoCache::new(redraw.clone());

    let cached_ctx: Rc<RefCell<Option<CanvasRenderingContext2d>>> = Rc::new(RefCell::new(None));

    let hovered_render = hovered.clone();
    let hits_render = hits.clone();
    let spider_render = spider.clone();
    let scheduler = Rc::new(RenderScheduler::new(move || {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return false;
        };
        let w = f64::from(parent.client_width());
        let h = f64::from(parent.client_height());
        if w <= 0.0 || h <= 0.0 {
            return false;
        }
        let size = ScreenSize::new(w, h);
        if map_size.get_untracked() != size {
            map_size.set(size);
        }

        let dpr = device_pixel_ratio();
        let pw = (w * dpr).round().max(1.0) as u32;
        let ph = (h * dpr).round().max(1.0) as u32;
        if canvas.width() != pw || canvas.height() != ph {
            canvas.set_width(pw);
            canvas.set_height(ph);
            // Resizing resets the context's transform.
            *cached_ctx.borrow_mut() = None;
        }
        let ctx = {
            let mut slot = cached_ctx.borrow_mut();
            if slot.is_none() {
                let Some(ctx) = canvas
                    .get_context("2d")
                    .ok()
                    .flatten()
                    .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
                else {
                    return false;
                };
                ctx.scale(dpr, dpr).ok();
                *slot = Some(ctx);
            }
            let Some(ctx) = slot.clone() else {
                return false;
            };
            ctx
        };

        let mut flying = false;
        if flights.with_untracked(FlightSlot::is_flying) {
            let mut step = None;
            flights.update(|f| step = f.step(js_sys::Date::now()));
            if let Some((vp, landed)) = step {
                viewport.set(vp);
                flying = landed.is_none();
            }
        }
        let vp = viewport.get_untracked();

        ctx.set_fill_style_str(MAP_BACKGROUND);
        ctx.fill_rect(0.0, 0.0, w, h);
        tiles.draw(&ctx, &vp, size);

        let hover = hovered_render.get();
        let mut drawn: Vec<(IconRect, Hit)> = Vec::new();
        filtered.with_untracked(|events| {
            clusters.with_untracked(|clusters| {
                let mut spider_slot = spider_render.borrow_mut();
                if spider_slot
                    .as_ref()
                    .is_some_and(|s| !s.is_current(clusters, vp.zoom))
                {
                    *spider_slot = None;
                }
                let spider = spider_slot.as_ref();

                if let Some(Hit::Cluster(ci)) = hover
                    && let Some(c) = clusters.get(ci)
                {
                    draw_hull(&ctx, c, events, &vp, size);
                }

                for (ci, c) in clusters.iter().enumerate() {
                    let (sx, sy) = vp.latlng_to_screen(c.center, size);
                    if c.is_single() {
                        let i = c.members[0];
                        let Some(record) = events.get(i) else {
                            continue;
                        };
                        let rect = marker_rect(sx, sy);
                        if !rect.is_visible(size, CULL_MARGIN_PX) {
                            continue;
                        }
                        let logo = logos.get(record.logo_url);
                        draw_marker(&ctx, logo.as_ref(), rect, hover == Some(Hit::Marker(i)));
                        drawn.push((rect, Hit::Marker(i)));
                        continue;
                    }

                    let rect = cluster_rect(sx, sy);
                    if !rect.is_visible(size, CULL_MARGIN_PX) {
                        continue;
                    }
                    let icon = c.icon(events);
                    let images: Vec<HtmlImageElement> =
                        icon.logos.iter().filter_map(|url| logos.get(*url)).collect();
                    let fanned = spider.is_some_and(|s| s.members == c.members);
                    let alpha = if fanned { SPIDERFIED_CLUSTER_ALPHA } else { 1.0 };
                    draw_cluster(&ctx, &icon, &images, rect, hover == Some(Hit::Cluster(ci)), alpha);
                    if !fanned {
                        drawn.push((rect, Hit::Cluster(ci)));
                    }
                }

                if let Some(s) = spider {
                    let (cx, cy) = vp.latlng_to_screen(s.center, size);
                    let offsets = spider_offsets(s.members.len());
                    draw_legs(&ctx, (cx, cy), &offsets);
                    for (&i, &(ox, oy)) in s.members.iter().zip(&offsets) {
                        let Some(record) = events.get(i) else {
                            continue;
                        };
                        let rect = marker_rect(cx + ox, cy + oy);
                        let logo = logos.get(record.logo_url);
                        draw_marker(&ctx, logo.as_ref(), rect, hover == Some(Hit::Leg(i)));
                        drawn.push((rect, Hit::Leg(i)));
                    }
                }
            });
        });

        if let Some(location) = geo.with_untracked(|g| g.location()) {
            draw_user_location(&ctx, &location, &vp, size);
        }

        *hits_render.borrow_mut() = drawn;
        flying
    }));
    *sched_slot.borrow_mut() = Rc::downgrade(&scheduler);

    // Repaint on anything the frame depends on.
    let sched_state = scheduler.clone();
    Effect::new(move || {
        let _ = canvas_ref.get();
        viewport.track();
        clusters.track();
        flights.track();
        geo.track();
        sched_state.mark_dirty();
    });

    let sched_resize = scheduler.clone();
    Effect::new(move || {
        let weak = Rc::downgrade(&sched_resize);
        bind_resize(move || {
            if let Some(s) = weak.upgrade() {
                s.mark_dirty();
            }
        });
        on_cleanup(unbind_resize);
    });

    // --- Input handlers ---

    let interrupt_flight = move || {
        if flights.with_untracked(FlightSlot::is_flying) {
            flights.update(|f| {
                f.cancel();
            });
        }
    };

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        interrupt_flight();
        let (x, y) = local_point(canvas_ref, e.client_x(), e.client_y());
        let size = map_size.get_untracked();
        viewport.update(|vp| {
            let next = vp.zoom - e.delta_y() / WHEEL_PX_PER_ZOOM;
            vp.zoom_around(next, x, y, size);
        });
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let dragged = dragged.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            let pos = (f64::from(e.client_x()), f64::from(e.client_y()));
            is_dragging.set(true);
            dragged.set(false);
            drag_start.set(pos);
            last_pos.set(pos);

            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let dragged = dragged.clone();
        let drag_start = drag_start.clone();
        let last_pos = last_pos.clone();
        let hovered = hovered.clone();
        let hits = hits.clone();
        let scheduler = scheduler.clone();
        move |e: PointerEvent| {
            let pos = (f64::from(e.client_x()), f64::from(e.client_y()));
            if is_dragging.get() {
                let (sx, sy) = drag_start.get();
                if !dragged.get()
                    && ((pos.0 - sx).abs() >= CLICK_SLOP_PX || (pos.1 - sy).abs() >= CLICK_SLOP_PX)
                {
                    dragged.set(true);
                    interrupt_flight();
                }
                let (lx, ly) = last_pos.get();
                last_pos.set(pos);
                if dragged.get() {
                    viewport.update(|vp| vp.pan(pos.0 - lx, pos.1 - ly));
                }
                return;
            }

            let (x, y) = local_point(canvas_ref, e.client_x(), e.client_y());
            let hit = hit_test(&hits.borrow(), x, y);
            if hit != hovered.get() {
                hovered.set(hit);
                scheduler.mark_dirty();
                if let Some(target) = e.target()
                    && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
                {
                    let cursor = if hit.is_some() { "pointer" } else { "grab" };
                    el.style().set_property("cursor", cursor).ok();
                }
            }
        }
    };

    let on_pointer_up = {
        let is_dragging = is_dragging.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }
        }
    };

    let on_pointer_leave = {
        let hovered = hovered.clone();
        let scheduler = scheduler.clone();
        move |_: PointerEvent| {
            if hovered.take().is_some() {
                scheduler.mark_dirty();
            }
        }
    };

    let on_click = {
        let dragged = dragged.clone();
        let hits = hits.clone();
        let spider = spider.clone();
        let scheduler = scheduler.clone();
        move |e: MouseEvent| {
            if dragged.get() {
                return;
            }
            let (x, y) = local_point(canvas_ref, e.client_x(), e.client_y());
            let hit = hit_test(&hits.borrow(), x, y);
            match hit {
                Some(Hit::Marker(i) | Hit::Leg(i)) => {
                    let record: Option<EventRecord> =
                        filtered.with_untracked(|events| events.get(i).copied());
                    popup.set(record);
                }
                Some(Hit::Cluster(ci)) => {
                    let Some(cluster) = clusters.with_untracked(|c| c.get(ci).cloned()) else {
                        return;
                    };
                    let vp = viewport.get_untracked();
                    let size = map_size.get_untracked();
                    match cluster_click(&cluster, vp, size) {
                        ClusterClick::ZoomTo(target) => {
                            let next = ActiveFlight::new(
                                vp,
                                target,
                                size,
                                js_sys::Date::now(),
                                FlightPurpose::ClusterZoom,
                            );
                            flights.update(|f| {
                                f.replace(next);
                            });
                        }
                        ClusterClick::Spiderfy => {
                            *spider.borrow_mut() = Some(Spider {
                                members: cluster.members,
                                center: cluster.center,
                                zoom_floor: vp.zoom.floor(),
                            });
                            popup.set(None);
                            scheduler.mark_dirty();
                        }
                    }
                }
                None => {
                    if popup.get_untracked().is_some() {
                        popup.set(None);
                    }
                    if spider.borrow_mut().take().is_some() {
                        scheduler.mark_dirty();
                    }
                }
            }
        }
    };

    let on_touch_start = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = f64::from(t1.client_x() - t0.client_x());
                let dy = f64::from(t1.client_y() - t0.client_y());
                pinch_dist.set((dx * dx + dy * dy).sqrt());
            }
        }
    };

    let on_touch_move = {
        let pinch_dist = pinch_dist.clone();
        move |e: web_sys::TouchEvent| {
            let touches = e.touches();
            if touches.length() == 2 {
                e.prevent_default();
                let (Some(t0), Some(t1)) = (touches.get(0), touches.get(1)) else {
                    return;
                };
                let dx = f64::from(t1.client_x() - t0.client_x());
                let dy = f64::from(t1.client_y() - t0.client_y());
                let new_dist = (dx * dx + dy * dy).sqrt();
                let old_dist = pinch_dist.get();

                if old_dist > 0.0 && new_dist > 0.0 {
                    interrupt_flight();
                    let (mx, my) = local_point(
                        canvas_ref,
                        (t0.client_x() + t1.client_x()) / 2,
                        (t0.client_y() + t1.client_y()) / 2,
                    );
                    let size = map_size.get_untracked();
                    viewport.update(|vp| {
                        let next = vp.zoom + (new_dist / old_dist).log2();
                        vp.zoom_around(next, mx, my, size);
                    });
                }

                pinch_dist.set(new_dist);
            }
        }
    };

    view! {
        <div
            style="position: absolute; inset: 0; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
            on:pointerleave=on_pointer_leave
            on:click=on_click
            on:touchstart=on_touch_start
            on:touchmove=on_touch_move
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; cursor: grab;"
            />
        </div>
    }
}

// --- Canvas 2D drawing ---

fn circle_path(ctx: &CanvasRenderingContext2d, cx: f64, cy: f64, r: f64) {
    ctx.begin_path();
    let _ = ctx.arc(cx, cy, r, 0.0, TAU);
}

fn pill_path(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64) {
    let r = h / 2.0;
    ctx.begin_path();
    ctx.move_to(x + r, y);
    ctx.line_to(x + w - r, y);
    let _ = ctx.arc(x + w - r, y + r, r, -FRAC_PI_2, FRAC_PI_2);
    ctx.line_to(x + r, y + h);
    let _ = ctx.arc(x + r, y + r, r, FRAC_PI_2, 3.0 * FRAC_PI_2);
    ctx.close_path();
}

/// Logo clipped to a circle; an accent disc while the logo is loading or missing.
fn draw_logo(
    ctx: &CanvasRenderingContext2d,
    logo: Option<&HtmlImageElement>,
    cx: f64,
    cy: f64,
    r: f64,
) {
    ctx.save();
    circle_path(ctx, cx, cy, r);
    ctx.clip();
    match logo {
        Some(img) => {
            ctx.set_fill_style_str(MARKER_BORDER);
            ctx.fill();
            let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img,
                cx - r,
                cy - r,
                r * 2.0,
                r * 2.0,
            );
        }
        None => {
            ctx.set_fill_style_str(&accent_css(0.85));
            ctx.fill();
        }
    }
    ctx.restore();
}

fn draw_marker(
    ctx: &CanvasRenderingContext2d,
    logo: Option<&HtmlImageElement>,
    rect: IconRect,
    hovered: bool,
) {
    let (cx, cy) = rect.center();
    let r = rect.size / 2.0;

    ctx.save();
    if hovered {
        ctx.set_shadow_color(&accent_css(0.6));
        ctx.set_shadow_blur(12.0);
    } else {
        ctx.set_shadow_color("rgba(0, 0, 0, 0.3)");
        ctx.set_shadow_blur(6.0);
        ctx.set_shadow_offset_y(2.0);
    }
    circle_path(ctx, cx, cy, r);
    ctx.set_fill_style_str(MARKER_BORDER);
    ctx.fill();
    ctx.restore();

    draw_logo(ctx, logo, cx, cy, r - 2.0);

    if hovered {
        circle_path(ctx, cx, cy, r - 1.0);
        ctx.set_stroke_style_str(&accent_css(1.0));
        ctx.set_line_width(2.0);
        ctx.stroke();
    }
}

fn draw_cluster(
    ctx: &CanvasRenderingContext2d,
    icon: &ClusterIcon,
    logos: &[HtmlImageElement],
    rect: IconRect,
    hovered: bool,
    alpha: f64,
) {
    let (cx, cy) = rect.center();
    let r = rect.size / 2.0;
    let (rr, rg, rb) = CLUSTER_RING;

    ctx.save();
    ctx.set_global_alpha(alpha);

    circle_path(ctx, cx, cy, r);
    ctx.set_fill_style_str(&rgba_css(rr, rg, rb, if hovered { 0.35 } else { 0.2 }));
    ctx.fill();
    circle_path(ctx, cx, cy, r - 6.0);
    ctx.set_fill_style_str(MARKER_BORDER);
    ctx.fill();
    ctx.set_stroke_style_str(&rgba_css(rr, rg, rb, 0.9));
    ctx.set_line_width(2.0);
    ctx.stroke();

    // Overlapping stack of member logos above the pill.
    let step = CLUSTER_LOGO_PX * 0.7;
    let lr = CLUSTER_LOGO_PX / 2.0;
    let first_x = cx - step * (logos.len().saturating_sub(1)) as f64 / 2.0;
    for (i, img) in logos.iter().enumerate() {
        let lx = first_x + step * i as f64;
        let ly = cy - 6.0;
        circle_path(ctx, lx, ly, lr + 1.5);
        ctx.set_fill_style_str(MARKER_BORDER);
        ctx.fill();
        draw_logo(ctx, Some(img), lx, ly, lr);
    }

    ctx.set_font("600 10px system-ui, sans-serif");
    let text_w = ctx
        .measure_text(&icon.label)
        .map(|m| m.width())
        .unwrap_or(icon.label.len() as f64 * 6.0);
    let pill_w = text_w + 10.0;
    let pill_h = 14.0;
    let pill_y = if logos.is_empty() { cy - pill_h / 2.0 } else { cy + 6.0 };
    let (dr, dg, db) = ACCENT_DARK;
    pill_path(ctx, cx - pill_w / 2.0, pill_y, pill_w, pill_h);
    ctx.set_fill_style_str(&rgba_css(dr, dg, db, 1.0));
    ctx.fill();
    ctx.set_fill_style_str("#ffffff");
    ctx.set_text_align("center");
    ctx.set_text_baseline("middle");
    ctx.fill_text(&icon.label, cx, pill_y + pill_h / 2.0).ok();

    ctx.restore();
}

fn draw_hull(
    ctx: &CanvasRenderingContext2d,
    cluster: &Cluster,
    events: &[EventRecord],
    vp: &Viewport,
    size: ScreenSize,
) {
    let hull = convex_hull(cluster.records(events).map(EventRecord::position));
    let mut points = hull.iter().map(|p| vp.latlng_to_screen(*p, size));
    let Some((x0, y0)) = points.next() else {
        return;
    };
    ctx.begin_path();
    ctx.move_to(x0, y0);
    for (x, y) in points {
        ctx.line_to(x, y);
    }
    ctx.close_path();
    ctx.set_fill_style_str(&accent_css(0.15));
    ctx.fill();
    ctx.set_stroke_style_str(&accent_css(0.8));
    ctx.set_line_width(2.0);
    ctx.stroke();
}

fn draw_legs(ctx: &CanvasRenderingContext2d, (cx, cy): (f64, f64), offsets: &[(f64, f64)]) {
    ctx.begin_path();
    for &(ox, oy) in offsets {
        ctx.move_to(cx, cy);
        ctx.line_to(cx + ox, cy + oy);
    }
    ctx.set_stroke_style_str("rgba(34, 34, 34, 0.5)");
    ctx.set_line_width(1.5);
    ctx.stroke();
}

fn draw_user_location(
    ctx: &CanvasRenderingContext2d,
    location: &UserLocation,
    vp: &Viewport,
    size: ScreenSize,
) {
    let (x, y) = vp.latlng_to_screen(location.position(), size);
    let (r, g, b) = USER_DOT;

    let accuracy_px = location.accuracy_meters / meters_per_pixel(location.latitude, vp.zoom);
    if accuracy_px > 8.0 {
        circle_path(ctx, x, y, accuracy_px);
        ctx.set_fill_style_str(&rgba_css(r, g, b, 0.12));
        ctx.fill();
        ctx.set_stroke_style_str(&rgba_css(r, g, b, 0.5));
        ctx.set_line_width(1.0);
        ctx.stroke();
    }

    circle_path(ctx, x, y, 7.0);
    ctx.set_fill_style_str(&rgba_css(r, g, b, 1.0));
    ctx.fill();
    ctx.set_stroke_style_str(MARKER_BORDER);
    ctx.set_line_width(2.0);
    ctx.stroke();
}
