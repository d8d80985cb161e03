use gatherings_shared::geolocate::{GeoError, GeolocationController, GeolocationOptions, UserLocation};
use js_sys::{Function, Object, Reflect};
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

fn get_f64(target: &JsValue, key: &str) -> Option<f64> {
    Reflect::get(target, &JsValue::from_str(key))
        .ok()
        .and_then(|v| v.as_f64())
}

fn options_object(opts: GeolocationOptions) -> Object {
    let obj = Object::new();
    let _ = Reflect::set(
        &obj,
        &JsValue::from_str("enableHighAccuracy"),
        &JsValue::from_bool(opts.high_accuracy),
    );
    let _ = Reflect::set(
        &obj,
        &JsValue::from_str("timeout"),
        &JsValue::from_f64(f64::from(opts.timeout_ms)),
    );
    let _ = Reflect::set(
        &obj,
        &JsValue::from_str("maximumAge"),
        &JsValue::from_f64(f64::from(opts.max_cached_age_ms)),
    );
    obj
}

fn parse_position(pos: &JsValue) -> Option<UserLocation> {
    let coords = Reflect::get(pos, &JsValue::from_str("coords")).ok()?;
    Some(UserLocation {
        latitude: get_f64(&coords, "latitude")?,
        longitude: get_f64(&coords, "longitude")?,
        accuracy_meters: get_f64(&coords, "accuracy").unwrap_or(0.0),
    })
}

fn fail(geo: RwSignal<GeolocationController>, error: GeoError) {
    web_sys::console::warn_1(&format!("Geolocation failed: {error}").into());
    geo.update(|g| g.fail(error));
}

/// Ask the browser for the current position. Ignored while a request is already running.
pub fn request_position(geo: RwSignal<GeolocationController>) {
    let mut start = false;
    geo.update(|g| start = g.request());
    if !start {
        return;
    }

    let Some(window) = web_sys::window() else {
        fail(geo, GeoError::Unsupported);
        return;
    };
    let geolocation = Reflect::get(window.navigator().as_ref(), &JsValue::from_str("geolocation"))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null());
    let Some(geolocation) = geolocation else {
        fail(geo, GeoError::Unsupported);
        return;
    };
    let Ok(get_current) = Reflect::get(&geolocation, &JsValue::from_str("getCurrentPosition"))
        .and_then(|f| f.dyn_into::<Function>())
    else {
        fail(geo, GeoError::Unsupported);
        return;
    };

    // The browser calls exactly one of these.
    let on_success = Closure::once_into_js(move |pos: JsValue| match parse_position(&pos) {
        Some(location) => geo.update(|g| g.resolve(location)),
        None => fail(geo, GeoError::PositionUnavailable),
    });
    let on_error = Closure::once_into_js(move |err: JsValue| {
        let code = get_f64(&err, "code").unwrap_or(0.0) as u16;
        fail(geo, GeoError::from_code(code));
    });

    let opts = options_object(GeolocationOptions::default());
    if get_current
        .call3(&geolocation, &on_success, &on_error, &opts)
        .is_err()
    {
        fail(geo, GeoError::Unknown);
    }
}
