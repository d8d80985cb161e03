use crate::geo::LatLng;

/// CARTO Voyager raster basemap.
pub const TILE_LAYER_URL: &str =
    "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png";
pub const TILE_SUBDOMAINS: &[&str] = &["a", "b", "c", "d"];
pub const TILE_ATTRIBUTION_HTML: &str = r#"&copy; <a href="https://www.openstreetmap.org/copyright">OpenStreetMap</a> contributors &copy; <a href="https://carto.com/attributions">CARTO</a>"#;

pub const DEFAULT_CENTER: LatLng = LatLng::new(13.0, 80.2);
pub const DEFAULT_ZOOM: f64 = 13.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 18.0;

// Viewport fitting
pub const FIT_PADDING_PX: f64 = 50.0;
pub const FIT_MAX_ZOOM: f64 = 15.0;
pub const FLY_DURATION_SECS: f64 = 1.5;

// Clustering
pub const MAX_CLUSTER_RADIUS_PX: f64 = 80.0;
pub const CLUSTER_ICON_SIZE_PX: f64 = 60.0;
pub const CLUSTER_ICON_LOGOS: usize = 3;

// Markers
pub const MARKER_ICON_SIZE_PX: f64 = 40.0;
pub const MARKER_ANCHOR_PX: (f64, f64) = (20.0, 40.0);
pub const POPUP_ANCHOR_PX: (f64, f64) = (0.0, -40.0);

// Geolocation
pub const GEO_HIGH_ACCURACY: bool = true;
pub const GEO_TIMEOUT_MS: u32 = 10_000;
pub const GEO_MAX_CACHED_AGE_MS: u32 = 0;
pub const LOCATE_ZOOM: f64 = 14.0;
