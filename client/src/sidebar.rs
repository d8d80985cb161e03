use gatherings_shared::filter::{FilterController, available_cities, narrow_cities};
use leptos::prelude::*;
use wasm_bindgen::JsCast;

use crate::app::{CatalogStore, ClusterMarkers};
use crate::url_state::BrowserNavigation;

/// Message shown when the search narrows the city list to nothing.
pub fn empty_search_message(query: &str) -> String {
    format!("No locations found matching \"{query}\"")
}

fn set_background(e: &leptos::ev::MouseEvent, color: &str) {
    if let Some(el) = e
        .target()
        .and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok())
    {
        el.style().set_property("background", color).ok();
    }
}

/// City filter: search box, one checkbox per catalog city, and display settings.
#[component]
pub fn FilterBar() -> impl IntoView {
    let CatalogStore(catalog) = expect_context();
    let nav: BrowserNavigation = expect_context();
    let ClusterMarkers(cluster_on) = expect_context();

    let cities: Vec<&'static str> = catalog.with_value(|c| available_cities(c.events()));
    let search_query = RwSignal::new(String::new());
    let visible = Memo::new(move |_| {
        search_query.with(|q| {
            narrow_cities(&cities, q)
                .into_iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
    });

    let on_input = move |e: leptos::ev::Event| {
        let Some(target) = e.target() else {
            return;
        };
        let Ok(input) = target.dyn_into::<web_sys::HtmlInputElement>() else {
            return;
        };
        search_query.set(input.value());
    };

    view! {
        <div style="display: flex; flex-direction: column; height: 100%; background: #ffffff; border-right: 1px solid #e5e7eb;">
            <div style="padding: 18px 20px 12px; border-bottom: 1px solid #e5e7eb;">
                <h2 style="margin: 0; font-size: 1.1rem; font-weight: 700; color: #111827;">"Gatherings"</h2>
                <p style="margin: 4px 0 0; font-size: 0.8rem; color: #6b7280;">"Filter events by location"</p>
            </div>
            <div style="padding: 12px 20px;">
                <input
                    type="text"
                    placeholder="Search locations..."
                    style="width: 100%; box-sizing: border-box; padding: 8px 12px; border: 1px solid #d1d5db; border-radius: 6px; font-size: 0.9rem; outline: none; transition: border-color 0.2s ease, box-shadow 0.2s ease;"
                    prop:value=move || search_query.get()
                    on:input=on_input
                    on:focus=|e| {
                        if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                            el.style().set_property("border-color", "#3b82f6").ok();
                            el.style().set_property("box-shadow", "0 0 0 3px rgba(59,130,246,0.15)").ok();
                        }
                    }
                    on:blur=|e| {
                        if let Some(el) = e.target().and_then(|t| t.dyn_into::<web_sys::HtmlElement>().ok()) {
                            el.style().set_property("border-color", "#d1d5db").ok();
                            el.style().set_property("box-shadow", "none").ok();
                        }
                    }
                />
            </div>
            <div style="flex: 1; overflow-y: auto; padding: 0 12px 12px;">
                <Show
                    when=move || !visible.with(Vec::is_empty)
                    fallback=move || view! {
                        <p style="padding: 8px; font-size: 0.85rem; color: #6b7280;">
                            {move || empty_search_message(&search_query.get())}
                        </p>
                    }
                >
                    <For
                        each=move || visible.get()
                        key=|city| city.clone()
                        children=move |city| view! { <CityRow city=city nav=nav /> }
                    />
                </Show>
            </div>
            <div
                style="display: flex; align-items: center; justify-content: space-between; padding: 12px 20px; border-top: 1px solid #e5e7eb; cursor: pointer;"
                on:click=move |_| cluster_on.update(|v| *v = !*v)
                on:mouseenter=|e| set_background(&e, "#f3f4f6")
                on:mouseleave=|e| set_background(&e, "transparent")
            >
                <span style="font-size: 0.85rem; color: #374151;">"Group nearby events"</span>
                <span style=move || {
                    if cluster_on.get() {
                        "display: inline-block; width: 8px; height: 8px; border-radius: 50%; background: #3b82f6; box-shadow: 0 0 5px rgba(59,130,246,0.4);"
                    } else {
                        "display: inline-block; width: 8px; height: 8px; border-radius: 50%; background: #d1d5db;"
                    }
                } />
            </div>
        </div>
    }
}

#[component]
fn CityRow(city: String, nav: BrowserNavigation) -> impl IntoView {
    let checked_city = city.clone();
    let checked = move || FilterController::new(nav).is_selected(&checked_city);
    let toggle_city = city.clone();
    let on_change = move |_: leptos::ev::Event| {
        FilterController::new(nav).toggle_city(&toggle_city);
    };

    view! {
        <label
            style="display: flex; align-items: center; gap: 10px; padding: 7px 8px; border-radius: 4px; cursor: pointer; font-size: 0.9rem; color: #1f2937;"
            on:mouseenter=|e| set_background(&e, "#f3f4f6")
            on:mouseleave=|e| set_background(&e, "transparent")
        >
            <input
                type="checkbox"
                style="margin: 0; accent-color: #3b82f6;"
                prop:checked=checked
                on:change=on_change
            />
            <span>{city}</span>
        </label>
    }
}
