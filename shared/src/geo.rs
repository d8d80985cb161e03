use std::f64::consts::PI;

use serde::{Deserialize, Serialize};

/// Pixel size of one raster tile at zoom 0.
pub const TILE_SIZE: f64 = 256.0;

/// Latitude limit of the square Web Mercator world.
pub const MAX_LATITUDE: f64 = 85.051_128_779_806_59;

pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.lat) && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A point in world pixel space (origin top-left of the zoom-level world).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: Point) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Smallest rectangle covering a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn from_point(p: LatLng) -> Self {
        Self {
            south_west: p,
            north_east: p,
        }
    }

    /// Returns `None` for an empty iterator.
    pub fn covering(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self::from_point(first);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south_west.lat = self.south_west.lat.min(p.lat);
        self.south_west.lng = self.south_west.lng.min(p.lng);
        self.north_east.lat = self.north_east.lat.max(p.lat);
        self.north_east.lng = self.north_east.lng.max(p.lng);
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south_west.lat
            && p.lat <= self.north_east.lat
            && p.lng >= self.south_west.lng
            && p.lng <= self.north_east.lng
    }

    pub fn north_west(&self) -> LatLng {
        LatLng::new(self.north_east.lat, self.south_west.lng)
    }

    pub fn south_east(&self) -> LatLng {
        LatLng::new(self.south_west.lat, self.north_east.lng)
    }
}

/// World size in pixels at a (possibly fractional) zoom level.
pub fn world_size(zoom: f64) -> f64 {
    TILE_SIZE * zoom.exp2()
}

/// Spherical Mercator projection to world pixels at `zoom`.
pub fn project(p: LatLng, zoom: f64) -> Point {
    let size = world_size(zoom);
    let lat = p.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (p.lng + 180.0) / 360.0 * size;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * size;
    Point::new(x, y)
}

/// Ground distance covered by one screen pixel at `lat`.
pub fn meters_per_pixel(lat: f64, zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians().cos() / world_size(zoom)
}

pub fn unproject(pt: Point, zoom: f64) -> LatLng {
    let size = world_size(zoom);
    let lng = pt.x / size * 360.0 - 180.0;
    let n = PI - 2.0 * PI * pt.y / size;
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, eps: f64) {
        let diff = (actual - expected).abs();
        assert!(diff < eps, "expected {expected}, got {actual} (diff: {diff})");
    }

    #[test]
    fn origin_projects_to_world_center() {
        let p = project(LatLng::new(0.0, 0.0), 0.0);
        assert_close(p.x, 128.0, 1e-9);
        assert_close(p.y, 128.0, 1e-9);
    }

    #[test]
    fn unproject_inverts_project() {
        let chennai = LatLng::new(13.0475, 80.2144);
        let back = unproject(project(chennai, 11.0), 11.0);
        assert_close(back.lat, chennai.lat, 1e-9);
        assert_close(back.lng, chennai.lng, 1e-9);
    }

    #[test]
    fn projection_clamps_polar_latitudes() {
        let pole = project(LatLng::new(90.0, 0.0), 0.0);
        assert_close(pole.y, 0.0, 1e-6);
    }

    #[test]
    fn bounds_cover_all_points() {
        let pts = [
            LatLng::new(13.0, 80.0),
            LatLng::new(-33.25, 18.4),
            LatLng::new(41.8, -87.6),
        ];
        let bounds = LatLngBounds::covering(pts).unwrap();
        assert!(pts.iter().all(|p| bounds.contains(*p)));
        assert_eq!(bounds.south_west, LatLng::new(-33.25, -87.6));
        assert_eq!(bounds.north_east, LatLng::new(41.8, 80.0));
    }

    #[test]
    fn bounds_of_nothing_is_none() {
        assert!(LatLngBounds::covering(std::iter::empty()).is_none());
    }

    #[test]
    fn pixel_ground_size_shrinks_with_zoom_and_latitude() {
        assert_close(meters_per_pixel(0.0, 0.0), 156_543.033_9, 1e-3);
        assert_close(meters_per_pixel(0.0, 1.0), 78_271.516_9, 1e-3);
        assert!(meters_per_pixel(60.0, 10.0) < meters_per_pixel(0.0, 10.0));
    }

    #[test]
    fn coordinate_range_check() {
        assert!(LatLng::new(90.0, -180.0).is_valid());
        assert!(!LatLng::new(90.5, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 181.0).is_valid());
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
    }
}
