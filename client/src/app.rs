use gatherings_shared::catalog::{Catalog, EventRecord};
use gatherings_shared::filter::MAP_PATH;
use gatherings_shared::geolocate::GeolocationController;
use gatherings_shared::viewport::ScreenSize;
use gloo_storage::Storage;
use leptos::prelude::*;

use crate::animation::FlightSlot;
use crate::map_view::MapView;
use crate::sidebar::FilterBar;
use crate::url_state::{BrowserNavigation, Route, bind_popstate, unbind_popstate};

const SETTINGS_KEY: &str = "gatherings_settings";
const SIDEBAR_WIDTH: f64 = 300.0;

/// Newtype wrappers so signals of the same inner type don't overwrite each other in context.
#[derive(Clone, Copy)]
pub(crate) struct SidebarOpen(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct ClusterMarkers(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct CatalogStore(pub StoredValue<Catalog>);

// Map-page state, provided by `MapView`.
#[derive(Clone, Copy)]
pub(crate) struct MapSize(pub RwSignal<ScreenSize>);
#[derive(Clone, Copy)]
pub(crate) struct Flights(pub RwSignal<FlightSlot>);
#[derive(Clone, Copy)]
pub(crate) struct GeoSignal(pub RwSignal<GeolocationController>);
#[derive(Clone, Copy)]
pub(crate) struct OpenPopup(pub RwSignal<Option<EventRecord>>);
#[derive(Clone, Copy)]
pub(crate) struct FilteredEvents(pub Memo<Vec<EventRecord>>);

/// UI preferences kept across visits. The city filter lives in the URL, not here.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
struct Settings {
    sidebar_open: bool,
    cluster_markers: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            sidebar_open: true,
            cluster_markers: true,
        }
    }
}

/// Root application component. Provides global reactive state via context and picks the page.
#[component]
pub fn App() -> impl IntoView {
    let catalog = Catalog::builtin();
    for skipped in catalog.skipped() {
        web_sys::console::warn_1(&format!("Skipping event record: {skipped}").into());
    }
    let catalog = StoredValue::new(catalog);
    let nav = BrowserNavigation::from_location();

    let saved: Settings = gloo_storage::LocalStorage::get(SETTINGS_KEY).unwrap_or_default();
    let sidebar_open = RwSignal::new(saved.sidebar_open);
    let cluster_markers = RwSignal::new(saved.cluster_markers);

    provide_context(CatalogStore(catalog));
    provide_context(nav);
    provide_context(SidebarOpen(sidebar_open));
    provide_context(ClusterMarkers(cluster_markers));

    Effect::new(move || {
        let settings = Settings {
            sidebar_open: sidebar_open.get(),
            cluster_markers: cluster_markers.get(),
        };
        let _ = gloo_storage::LocalStorage::set(SETTINGS_KEY, &settings);
    });

    Effect::new(move || {
        bind_popstate(nav);
        on_cleanup(unbind_popstate);
    });

    let route = Memo::new(move |_| nav.route());

    view! {
        <div style="width: 100%; height: 100%; font-family: 'Inter', system-ui, sans-serif;">
            {move || match route.get() {
                Route::Landing => view! { <Landing /> }.into_any(),
                Route::Map => view! { <MapPage /> }.into_any(),
                Route::NotFound => view! { <NotFound /> }.into_any(),
            }}
        </div>
    }
}

/// In-app link: pushes a history entry instead of reloading the page.
#[component]
fn AppLink(href: &'static str, style: &'static str, children: Children) -> impl IntoView {
    let nav: BrowserNavigation = expect_context();
    let on_click = move |e: leptos::ev::MouseEvent| {
        // Let modified clicks open a new tab as usual.
        if e.ctrl_key() || e.meta_key() || e.shift_key() || e.button() != 0 {
            return;
        }
        e.prevent_default();
        nav.go(href);
    };
    view! {
        <a href=href style=style on:click=on_click>
            {children()}
        </a>
    }
}

#[component]
fn Landing() -> impl IntoView {
    view! {
        <main style="min-height: 100%; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 16px; padding: 24px; box-sizing: border-box; background: linear-gradient(180deg, #eff6ff 0%, #ffffff 100%); text-align: center;">
            <h1 style="margin: 0; font-size: 2.4rem; font-weight: 800; color: #111827;">"Interactive World Map"</h1>
            <p style="margin: 0; font-size: 1.05rem; color: #4b5563;">"Explore events around the globe with interactive markers"</p>
            <AppLink
                href=MAP_PATH
                style="margin-top: 8px; padding: 10px 22px; background: #3b82f6; color: #ffffff; border-radius: 8px; font-weight: 600; text-decoration: none; box-shadow: 0 4px 12px rgba(59,130,246,0.3);"
            >
                "View Map"
            </AppLink>
        </main>
    }
}

#[component]
fn MapPage() -> impl IntoView {
    let SidebarOpen(sidebar_open) = expect_context();

    let sidebar_style = move || {
        if sidebar_open.get() {
            format!("width: {SIDEBAR_WIDTH}px; flex-shrink: 0; height: 100%; transition: width 0.2s ease; overflow: hidden;")
        } else {
            "width: 0; flex-shrink: 0; height: 100%; transition: width 0.2s ease; overflow: hidden;".to_string()
        }
    };

    view! {
        <div style="display: flex; flex-direction: column; width: 100%; height: 100%;">
            <header style="display: flex; align-items: center; justify-content: space-between; gap: 12px; padding: 12px 20px; background: #ffffff; border-bottom: 1px solid #e5e7eb;">
                <div>
                    <h1 style="margin: 0; font-size: 1.25rem; font-weight: 700; color: #111827;">"Interactive World Map"</h1>
                    <p style="margin: 2px 0 0; font-size: 0.85rem; color: #6b7280;">"Explore events around the globe"</p>
                </div>
                <button
                    style="padding: 6px 12px; background: #f3f4f6; border: 1px solid #e5e7eb; border-radius: 6px; font-size: 0.8rem; color: #374151; cursor: pointer;"
                    on:click=move |_| sidebar_open.update(|v| *v = !*v)
                >
                    {move || if sidebar_open.get() { "Hide filters" } else { "Show filters" }}
                </button>
            </header>
            <div style="flex: 1; display: flex; min-height: 0;">
                <aside style=sidebar_style>
                    <div style=format!("width: {SIDEBAR_WIDTH}px; height: 100%;")>
                        <FilterBar />
                    </div>
                </aside>
                <section style="flex: 1; min-width: 0; position: relative;">
                    <MapView />
                </section>
            </div>
        </div>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    view! {
        <main style="min-height: 100%; display: flex; flex-direction: column; align-items: center; justify-content: center; gap: 12px; padding: 24px; box-sizing: border-box; text-align: center;">
            <h1 style="margin: 0; font-size: 1.6rem; color: #111827;">"Page not found"</h1>
            <AppLink href="/" style="color: #2563eb; text-decoration: underline;">
                "Back to home"
            </AppLink>
        </main>
    }
}
