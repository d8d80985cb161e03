use serde::{Deserialize, Serialize};

use crate::catalog::EventRecord;
use crate::geo::{LatLng, LatLngBounds, Point, project, unproject};
use crate::map_config::{
    DEFAULT_CENTER, DEFAULT_ZOOM, FIT_MAX_ZOOM, FIT_PADDING_PX, MAX_ZOOM, MIN_ZOOM,
};

/// The map's center coordinate and zoom level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center: LatLng,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}

/// Screen size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub width: f64,
    pub height: f64,
}

impl ScreenSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

pub fn clamp_zoom(zoom: f64) -> f64 {
    zoom.clamp(MIN_ZOOM, MAX_ZOOM)
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center,
            zoom: clamp_zoom(zoom),
        }
    }

    /// World pixel at the top-left corner of the screen.
    fn origin(&self, size: ScreenSize) -> Point {
        let c = project(self.center, self.zoom);
        Point::new(c.x - size.width / 2.0, c.y - size.height / 2.0)
    }

    pub fn latlng_to_screen(&self, p: LatLng, size: ScreenSize) -> (f64, f64) {
        let origin = self.origin(size);
        let w = project(p, self.zoom);
        (w.x - origin.x, w.y - origin.y)
    }

    pub fn screen_to_latlng(&self, sx: f64, sy: f64, size: ScreenSize) -> LatLng {
        let origin = self.origin(size);
        unproject(Point::new(origin.x + sx, origin.y + sy), self.zoom)
    }

    /// Pan by a screen-space delta (content follows the pointer).
    pub fn pan(&mut self, dx: f64, dy: f64) {
        let c = project(self.center, self.zoom);
        self.center = unproject(Point::new(c.x - dx, c.y - dy), self.zoom);
    }

    /// Change zoom while keeping the point under `(sx, sy)` fixed.
    pub fn zoom_around(&mut self, new_zoom: f64, sx: f64, sy: f64, size: ScreenSize) {
        let new_zoom = clamp_zoom(new_zoom);
        let anchor = self.screen_to_latlng(sx, sy, size);
        let anchor_px = project(anchor, new_zoom);
        let center_px = Point::new(
            anchor_px.x - (sx - size.width / 2.0),
            anchor_px.y - (sy - size.height / 2.0),
        );
        self.zoom = new_zoom;
        self.center = unproject(center_px, new_zoom);
    }

    /// Geographic bounds of the visible screen.
    pub fn visible_bounds(&self, size: ScreenSize) -> LatLngBounds {
        let nw = self.screen_to_latlng(0.0, 0.0, size);
        let se = self.screen_to_latlng(size.width, size.height, size);
        LatLngBounds {
            south_west: LatLng::new(se.lat, nw.lng),
            north_east: LatLng::new(nw.lat, se.lng),
        }
    }
}

/// Where the viewport should head for the current filtered subset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewportTarget {
    /// Fit `bounds` inside the screen less `padding_px` per side, no closer than `max_zoom`.
    Fit {
        bounds: LatLngBounds,
        padding_px: f64,
        max_zoom: f64,
    },
    /// Go back to a fixed view.
    Reset(Viewport),
}

impl ViewportTarget {
    /// Pure function of the subset; no memory of earlier viewports.
    pub fn for_events<'a>(events: impl IntoIterator<Item = &'a EventRecord>) -> Self {
        match LatLngBounds::covering(events.into_iter().map(EventRecord::position)) {
            Some(bounds) => Self::Fit {
                bounds,
                padding_px: FIT_PADDING_PX,
                max_zoom: FIT_MAX_ZOOM,
            },
            None => Self::Reset(Viewport::default()),
        }
    }

    pub fn resolve(&self, size: ScreenSize) -> Viewport {
        match *self {
            Self::Fit {
                bounds,
                padding_px,
                max_zoom,
            } => fit_bounds(bounds, size, padding_px, max_zoom),
            Self::Reset(vp) => vp,
        }
    }
}

/// Largest integer zoom at which `bounds` fits in the padded screen, capped at `max_zoom`.
pub fn bounds_zoom(bounds: LatLngBounds, size: ScreenSize, padding_px: f64, max_zoom: f64) -> f64 {
    let avail_w = (size.width - 2.0 * padding_px).max(1.0);
    let avail_h = (size.height - 2.0 * padding_px).max(1.0);

    let nw = project(bounds.north_west(), 0.0);
    let se = project(bounds.south_east(), 0.0);
    let span_w = (se.x - nw.x).abs();
    let span_h = (se.y - nw.y).abs();

    let fit = if span_w <= f64::EPSILON && span_h <= f64::EPSILON {
        max_zoom
    } else {
        let scale = (avail_w / span_w.max(f64::EPSILON)).min(avail_h / span_h.max(f64::EPSILON));
        scale.log2().floor()
    };
    fit.min(max_zoom).clamp(MIN_ZOOM, MAX_ZOOM)
}

pub fn fit_bounds(bounds: LatLngBounds, size: ScreenSize, padding_px: f64, max_zoom: f64) -> Viewport {
    let zoom = bounds_zoom(bounds, size, padding_px, max_zoom);
    let nw = project(bounds.north_west(), zoom);
    let se = project(bounds.south_east(), zoom);
    let center = unproject(Point::new((nw.x + se.x) / 2.0, (nw.y + se.y) / 2.0), zoom);
    Viewport { center, zoom }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EVENTS;

    const SCREEN: ScreenSize = ScreenSize::new(1200.0, 800.0);

    fn chennai() -> Vec<&'static EventRecord> {
        EVENTS.iter().filter(|e| e.city == "Chennai").collect()
    }

    #[test]
    fn empty_subset_resets_to_default_view() {
        let target = ViewportTarget::for_events(std::iter::empty());
        assert_eq!(target, ViewportTarget::Reset(Viewport::default()));
        let vp = target.resolve(SCREEN);
        assert_eq!(vp.center, DEFAULT_CENTER);
        assert_eq!(vp.zoom, DEFAULT_ZOOM);
    }

    #[test]
    fn fit_target_covers_members_with_padding() {
        let subset = chennai();
        let ViewportTarget::Fit {
            bounds,
            padding_px,
            max_zoom,
        } = ViewportTarget::for_events(subset.iter().copied())
        else {
            panic!("expected a fit target");
        };
        assert!(padding_px > 0.0);
        assert_eq!(max_zoom, FIT_MAX_ZOOM);
        assert!(subset.iter().all(|e| bounds.contains(e.position())));
    }

    #[test]
    fn fitted_view_keeps_every_member_inside_padding() {
        let subset = chennai();
        let vp = ViewportTarget::for_events(subset.iter().copied()).resolve(SCREEN);
        for e in &subset {
            let (sx, sy) = vp.latlng_to_screen(e.position(), SCREEN);
            assert!(sx >= FIT_PADDING_PX - 1e-6 && sx <= SCREEN.width - FIT_PADDING_PX + 1e-6);
            assert!(sy >= FIT_PADDING_PX - 1e-6 && sy <= SCREEN.height - FIT_PADDING_PX + 1e-6);
        }
    }

    #[test]
    fn single_point_is_capped_at_max_fit_zoom() {
        let one = &EVENTS[0];
        let vp = ViewportTarget::for_events([one]).resolve(SCREEN);
        assert_eq!(vp.zoom, FIT_MAX_ZOOM);
        assert!((vp.center.lat - one.latitude).abs() < 1e-9);
        assert!((vp.center.lng - one.longitude).abs() < 1e-9);
    }

    #[test]
    fn worldwide_subset_zooms_out_but_not_below_min() {
        let vp = ViewportTarget::for_events(EVENTS.iter()).resolve(SCREEN);
        assert!(vp.zoom >= MIN_ZOOM);
        assert!(vp.zoom < 4.0);
        assert_eq!(vp.zoom, vp.zoom.floor());
    }

    #[test]
    fn chennai_scenario_excludes_thailand() {
        let subset = chennai();
        assert_eq!(subset.len(), 4);
        let ViewportTarget::Fit { bounds, .. } = ViewportTarget::for_events(subset.iter().copied())
        else {
            panic!("expected a fit target");
        };
        for far in EVENTS.iter().filter(|e| e.city == "Bangkok" || e.city == "Chiang Mai") {
            assert!(!bounds.contains(far.position()), "{}", far.name);
        }
        assert_eq!(bounds.south_west, LatLng::new(12.9249, 80.1000));
        assert_eq!(bounds.north_east, LatLng::new(13.0475, 80.224_166));
    }

    #[test]
    fn screen_round_trip() {
        let vp = Viewport::new(LatLng::new(13.0, 80.2), 12.0);
        let p = LatLng::new(13.05, 80.25);
        let (sx, sy) = vp.latlng_to_screen(p, SCREEN);
        let back = vp.screen_to_latlng(sx, sy, SCREEN);
        assert!((back.lat - p.lat).abs() < 1e-9);
        assert!((back.lng - p.lng).abs() < 1e-9);
    }

    #[test]
    fn center_projects_to_screen_middle() {
        let vp = Viewport::default();
        let (sx, sy) = vp.latlng_to_screen(vp.center, SCREEN);
        assert!((sx - 600.0).abs() < 1e-6);
        assert!((sy - 400.0).abs() < 1e-6);
    }

    #[test]
    fn zoom_around_keeps_anchor_fixed() {
        let mut vp = Viewport::new(LatLng::new(13.0, 80.2), 10.0);
        let anchor = vp.screen_to_latlng(200.0, 150.0, SCREEN);
        vp.zoom_around(12.5, 200.0, 150.0, SCREEN);
        let (sx, sy) = vp.latlng_to_screen(anchor, SCREEN);
        assert!((sx - 200.0).abs() < 1e-6);
        assert!((sy - 150.0).abs() < 1e-6);
        assert_eq!(vp.zoom, 12.5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut vp = Viewport::default();
        vp.zoom_around(40.0, 0.0, 0.0, SCREEN);
        assert_eq!(vp.zoom, MAX_ZOOM);
        vp.zoom_around(-3.0, 0.0, 0.0, SCREEN);
        assert_eq!(vp.zoom, MIN_ZOOM);
    }

    #[test]
    fn pan_moves_content_with_pointer() {
        let mut vp = Viewport::new(LatLng::new(0.0, 0.0), 5.0);
        let p = LatLng::new(1.0, 1.0);
        let (x0, y0) = vp.latlng_to_screen(p, SCREEN);
        vp.pan(30.0, -20.0);
        let (x1, y1) = vp.latlng_to_screen(p, SCREEN);
        assert!((x1 - x0 - 30.0).abs() < 1e-6);
        assert!((y1 - y0 + 20.0).abs() < 1e-6);
    }
}
