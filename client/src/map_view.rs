use gatherings_shared::catalog::EventRecord;
use gatherings_shared::filter::FilterController;
use gatherings_shared::geolocate::GeolocationController;
use gatherings_shared::map_config::TILE_ATTRIBUTION_HTML;
use gatherings_shared::marker::{Popup, popup_tip};
use gatherings_shared::viewport::{ScreenSize, Viewport, ViewportTarget};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::animation::{ActiveFlight, FlightPurpose, FlightSlot};
use crate::app::{
    CatalogStore, FilteredEvents, Flights, GeoSignal, MapSize, OpenPopup,
};
use crate::canvas::MapCanvas;
use crate::geolocation::request_position;
use crate::url_state::BrowserNavigation;

const CONTROL_STYLE: &str = "width: 34px; height: 34px; display: flex; align-items: center; justify-content: center; background: #ffffff; border: none; border-bottom: 1px solid #e5e7eb; font-size: 1.1rem; color: #111827; cursor: pointer;";

fn hover_background(e: &leptos::ev::MouseEvent, color: &str) {
    if let Some(el) = e
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
    {
        el.style().set_property("background", color).ok();
    }
}

/// The map surface with its controllers and HTML overlays (controls, popup, attribution).
///
/// Map state lives here so leaving the page drops it, including any resolved user location.
#[component]
pub fn MapView() -> impl IntoView {
    let CatalogStore(catalog) = expect_context();
    let nav: BrowserNavigation = expect_context();

    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());
    let map_size = RwSignal::new(ScreenSize::new(0.0, 0.0));
    let flights = RwSignal::new(FlightSlot::default());
    let geo = RwSignal::new(GeolocationController::new());
    let popup: RwSignal<Option<EventRecord>> = RwSignal::new(None);
    let filtered = Memo::new(move |_| {
        catalog.with_value(|c| {
            FilterController::new(nav)
                .filtered_events(c.events())
                .into_iter()
                .copied()
                .collect::<Vec<_>>()
        })
    });

    provide_context(viewport);
    provide_context(MapSize(map_size));
    provide_context(Flights(flights));
    provide_context(GeoSignal(geo));
    provide_context(OpenPopup(popup));
    provide_context(FilteredEvents(filtered));

    let has_size = Memo::new(move |_| map_size.with(|s| s.width > 0.0 && s.height > 0.0));

    // Refit whenever the filtered subset changes; a newer target replaces the flight in the air.
    Effect::new(move || {
        let target = filtered.with(|events| ViewportTarget::for_events(events));
        if !has_size.get() {
            return;
        }
        let size = map_size.get_untracked();
        let next = ActiveFlight::new(
            viewport.get_untracked(),
            target.resolve(size),
            size,
            js_sys::Date::now(),
            FlightPurpose::FitEvents,
        );
        flights.update(|f| {
            f.replace(next);
        });
    });

    // A popup never outlives its marker.
    Effect::new(move || {
        filtered.with(|events| {
            if let Some(open) = popup.get_untracked()
                && !events.contains(&open)
            {
                popup.set(None);
            }
        });
    });

    // Fly to a freshly resolved location exactly once.
    Effect::new(move || {
        let Some(target) = geo.with(|g| g.pending_recenter()) else {
            return;
        };
        if !has_size.get() {
            return;
        }
        geo.update(|g| g.recenter_complete());
        let size = map_size.get_untracked();
        let next = ActiveFlight::new(
            viewport.get_untracked(),
            target,
            size,
            js_sys::Date::now(),
            FlightPurpose::Recenter,
        );
        flights.update(|f| {
            f.replace(next);
        });
    });

    let zoom_by = move |delta: f64| {
        flights.update(|f| {
            f.cancel();
        });
        viewport.update(|vp| *vp = Viewport::new(vp.center, vp.zoom.round() + delta));
    };

    let locating = Memo::new(move |_| geo.with(GeolocationController::is_requesting));
    let geo_error = Memo::new(move |_| geo.with(|g| g.error().map(|e| e.to_string())));

    let popup_style = move || {
        let Some(record) = popup.get() else {
            return "display: none;".to_string();
        };
        let (sx, sy) = viewport
            .get()
            .latlng_to_screen(record.position(), map_size.get());
        let (tx, ty) = popup_tip(sx, sy);
        format!(
            "position: absolute; left: {tx}px; top: {ty}px; transform: translate(-50%, calc(-100% - 8px)); min-width: 180px; max-width: 260px; background: #ffffff; border-radius: 8px; box-shadow: 0 4px 16px rgba(0,0,0,0.2); padding: 12px 14px; font-size: 0.85rem; color: #374151; z-index: 5;"
        )
    };

    view! {
        <div style="position: relative; width: 100%; height: 100%; overflow: hidden; background: #f2efe9;">
            <MapCanvas />

            <Show when=move || !has_size.get()>
                <div style="position: absolute; inset: 0; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 12px; background: #f9fafb; z-index: 10;">
                    <div style="width: 36px; height: 36px; border: 3px solid #e5e7eb; border-top-color: #3b82f6; border-radius: 50%; animation: spin 0.9s linear infinite;" />
                    <p style="margin: 0; font-size: 0.9rem; color: #6b7280;">"Initializing map..."</p>
                </div>
            </Show>

            <div style="position: absolute; top: 12px; right: 12px; display: flex; flex-direction: column; border-radius: 6px; overflow: hidden; box-shadow: 0 1px 5px rgba(0,0,0,0.25); z-index: 4;">
                <button
                    style=CONTROL_STYLE
                    title="Zoom in"
                    on:click=move |_| zoom_by(1.0)
                    on:mouseenter=|e| hover_background(&e, "#f3f4f6")
                    on:mouseleave=|e| hover_background(&e, "#ffffff")
                >"+"</button>
                <button
                    style=CONTROL_STYLE
                    title="Zoom out"
                    on:click=move |_| zoom_by(-1.0)
                    on:mouseenter=|e| hover_background(&e, "#f3f4f6")
                    on:mouseleave=|e| hover_background(&e, "#ffffff")
                >"\u{2212}"</button>
            </div>

            <div style="position: absolute; top: 96px; right: 12px; display: flex; flex-direction: column; align-items: flex-end; gap: 6px; z-index: 4;">
                <button
                    style="padding: 7px 12px; background: #ffffff; border: none; border-radius: 6px; box-shadow: 0 1px 5px rgba(0,0,0,0.25); font-size: 0.8rem; color: #111827; cursor: pointer;"
                    prop:disabled=move || locating.get()
                    on:click=move |_| request_position(geo)
                >
                    {move || if locating.get() { "Locating..." } else { "Locate me" }}
                </button>
                {move || geo_error.get().map(|message| view! {
                    <p style="margin: 0; max-width: 220px; padding: 6px 10px; background: #fef2f2; border: 1px solid #fecaca; border-radius: 6px; font-size: 0.75rem; color: #b91c1c;">
                        {message}
                    </p>
                })}
            </div>

            <div style=popup_style>
                {move || popup.get().map(|record| {
                    let content = Popup::for_record(&record);
                    view! {
                        <button
                            style="position: absolute; top: 4px; right: 6px; border: none; background: transparent; font-size: 1rem; color: #9ca3af; cursor: pointer;"
                            title="Close"
                            on:click=move |_| popup.set(None)
                        >"\u{00d7}"</button>
                        <strong style="display: block; margin: 0 16px 6px 0; font-size: 0.95rem; color: #111827;">{content.title}</strong>
                        <p style="margin: 0 0 2px;">{content.location}</p>
                        <p style="margin: 0;">{content.city}</p>
                    }
                })}
            </div>

            <div
                style="position: absolute; right: 0; bottom: 0; padding: 2px 6px; background: rgba(255,255,255,0.8); font-size: 0.7rem; color: #374151; z-index: 4;"
                inner_html=TILE_ATTRIBUTION_HTML
            />
        </div>
    }
}
