pub mod catalog;
pub mod cluster;
pub mod filter;
pub mod flight;
pub mod geo;
pub mod geolocate;
pub mod map_config;
pub mod marker;
pub mod tiles;
pub mod viewport;

pub use catalog::{Catalog, CatalogError, EVENTS, EventRecord};
pub use cluster::{Cluster, ClusterClick, ClusterIcon};
pub use filter::{CitySelection, FilterController, Navigation};
pub use flight::{Flight, FlightFrame};
pub use geo::{LatLng, LatLngBounds, Point};
pub use geolocate::{GeoError, GeoState, GeolocationController, GeolocationOptions, UserLocation};
pub use tiles::{TileCache, TileKey, TilePlacement};
pub use viewport::{ScreenSize, Viewport, ViewportTarget};
