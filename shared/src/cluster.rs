//! Marker clustering and the aggregate-icon policy.
//!
//! Markers whose projected positions lie within a pixel radius of an existing cluster
//! at the given zoom join that cluster; the rest start new ones. Input order decides
//! which marker seeds a cluster, so results are stable for a given subset and zoom.

use std::collections::HashMap;
use std::f64::consts::TAU;

use crate::catalog::EventRecord;
use crate::geo::{LatLng, LatLngBounds, Point, project};
use crate::map_config::{CLUSTER_ICON_LOGOS, FIT_PADDING_PX, MAX_ZOOM};
use crate::viewport::{ScreenSize, Viewport, fit_bounds};

/// A group of markers drawn as one icon. `members` index into the clustered slice.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    pub members: Vec<usize>,
    pub center: LatLng,
    pub bounds: LatLngBounds,
}

impl Cluster {
    fn seed(index: usize, position: LatLng) -> Self {
        Self {
            members: vec![index],
            center: position,
            bounds: LatLngBounds::from_point(position),
        }
    }

    fn absorb(&mut self, index: usize, position: LatLng) {
        let n = self.members.len() as f64;
        self.center = LatLng::new(
            (self.center.lat * n + position.lat) / (n + 1.0),
            (self.center.lng * n + position.lng) / (n + 1.0),
        );
        self.bounds.extend(position);
        self.members.push(index);
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// A lone marker is drawn with its own icon rather than an aggregate.
    pub fn is_single(&self) -> bool {
        self.members.len() == 1
    }

    pub fn records<'a>(&'a self, events: &'a [EventRecord]) -> impl Iterator<Item = &'a EventRecord> {
        self.members.iter().filter_map(|&i| events.get(i))
    }

    pub fn icon(&self, events: &[EventRecord]) -> ClusterIcon {
        ClusterIcon::for_members(self.records(events))
    }
}

/// What an aggregate icon shows: a count label and a few member logos.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterIcon {
    pub count: usize,
    pub label: String,
    pub logos: Vec<&'static str>,
}

impl ClusterIcon {
    pub fn for_members<'a>(members: impl IntoIterator<Item = &'a EventRecord>) -> Self {
        let mut count = 0;
        let mut logos = Vec::with_capacity(CLUSTER_ICON_LOGOS);
        for record in members {
            // Logos come from the first few members only; blanks leave a gap unfilled.
            if count < CLUSTER_ICON_LOGOS && !record.logo_url.is_empty() {
                logos.push(record.logo_url);
            }
            count += 1;
        }
        Self {
            count,
            label: format!("{count} Events"),
            logos,
        }
    }
}

fn cell_of(p: Point, cell: f64) -> (i64, i64) {
    ((p.x / cell).floor() as i64, (p.y / cell).floor() as i64)
}

/// Group `events` at the integer zoom below `zoom`.
pub fn cluster_markers(events: &[EventRecord], zoom: f64, radius_px: f64) -> Vec<Cluster> {
    let zoom = zoom.floor();
    let radius = radius_px.max(1.0);
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut centers: Vec<Point> = Vec::new();
    let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();

    for (index, record) in events.iter().enumerate() {
        let position = record.position();
        let px = project(position, zoom);
        let (cx, cy) = cell_of(px, radius);

        let mut nearest: Option<(usize, f64)> = None;
        for dy in -1..=1 {
            for dx in -1..=1 {
                let Some(bucket) = grid.get(&(cx + dx, cy + dy)) else {
                    continue;
                };
                for &ci in bucket {
                    let d = centers[ci].distance_to(px);
                    if d <= radius && nearest.is_none_or(|(_, best)| d < best) {
                        nearest = Some((ci, d));
                    }
                }
            }
        }

        match nearest {
            Some((ci, _)) => {
                let old_cell = cell_of(centers[ci], radius);
                clusters[ci].absorb(index, position);
                centers[ci] = project(clusters[ci].center, zoom);
                let new_cell = cell_of(centers[ci], radius);
                if new_cell != old_cell {
                    if let Some(bucket) = grid.get_mut(&old_cell) {
                        bucket.retain(|&c| c != ci);
                    }
                    grid.entry(new_cell).or_default().push(ci);
                }
            }
            None => {
                let ci = clusters.len();
                clusters.push(Cluster::seed(index, position));
                centers.push(px);
                grid.entry((cx, cy)).or_default().push(ci);
            }
        }
    }
    clusters
}

/// Every marker on its own, for when grouping is switched off.
pub fn unclustered(events: &[EventRecord]) -> Vec<Cluster> {
    events
        .iter()
        .enumerate()
        .map(|(i, e)| Cluster::seed(i, e.position()))
        .collect()
}

/// Result of clicking an aggregate icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClusterClick {
    ZoomTo(Viewport),
    /// Already as close as the map goes; fan the members out instead.
    Spiderfy,
}

pub fn cluster_click(cluster: &Cluster, current: Viewport, size: ScreenSize) -> ClusterClick {
    let zoom = current.zoom.floor();
    if zoom >= MAX_ZOOM {
        return ClusterClick::Spiderfy;
    }
    let fitted = fit_bounds(cluster.bounds, size, FIT_PADDING_PX, MAX_ZOOM);
    if fitted.zoom > zoom {
        ClusterClick::ZoomTo(fitted)
    } else {
        ClusterClick::ZoomTo(Viewport {
            center: fitted.center,
            zoom: zoom + 1.0,
        })
    }
}

const SPIRAL_SWITCHOVER: usize = 9;
const CIRCLE_FOOT_SEPARATION: f64 = 25.0;
const CIRCLE_MIN_LEG: f64 = 35.0;
const SPIRAL_FOOT_SEPARATION: f64 = 28.0;
const SPIRAL_START_LEG: f64 = 11.0;
const SPIRAL_LENGTH_FACTOR: f64 = 5.0 * TAU;

/// Screen offsets from the cluster center for `count` fanned-out markers.
pub fn spider_offsets(count: usize) -> Vec<(f64, f64)> {
    if count == 0 {
        return Vec::new();
    }
    if count < SPIRAL_SWITCHOVER {
        circle_offsets(count)
    } else {
        spiral_offsets(count)
    }
}

fn circle_offsets(count: usize) -> Vec<(f64, f64)> {
    let circumference = CIRCLE_FOOT_SEPARATION * (2.0 + count as f64);
    let leg = (circumference / TAU).max(CIRCLE_MIN_LEG);
    let step = TAU / count as f64;
    (0..count)
        .map(|i| {
            let angle = i as f64 * step;
            ((leg * angle.cos()).round(), (leg * angle.sin()).round())
        })
        .collect()
}

fn spiral_offsets(count: usize) -> Vec<(f64, f64)> {
    let mut out = vec![(0.0, 0.0); count];
    let mut leg = SPIRAL_START_LEG;
    let mut angle = 0.0_f64;
    for i in (0..=count).rev() {
        if i < count {
            out[i] = ((leg * angle.cos()).round(), (leg * angle.sin()).round());
        }
        angle += SPIRAL_FOOT_SEPARATION / leg + i as f64 * 0.0005;
        leg += SPIRAL_LENGTH_FACTOR / angle;
    }
    out
}

fn cross(o: LatLng, a: LatLng, b: LatLng) -> f64 {
    (a.lng - o.lng) * (b.lat - o.lat) - (a.lat - o.lat) * (b.lng - o.lng)
}

/// Convex hull of the members, counter-clockwise. Fewer than three distinct
/// points come back as-is (deduplicated).
pub fn convex_hull(points: impl IntoIterator<Item = LatLng>) -> Vec<LatLng> {
    let mut pts: Vec<LatLng> = points.into_iter().collect();
    pts.sort_by(|a, b| a.lng.total_cmp(&b.lng).then(a.lat.total_cmp(&b.lat)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<LatLng> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<LatLng> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EVENTS;
    use crate::map_config::MAX_CLUSTER_RADIUS_PX;

    fn at(lat: f64, lng: f64, logo: &'static str) -> EventRecord {
        EventRecord {
            name: "e",
            latitude: lat,
            longitude: lng,
            location_label: "",
            city: "X",
            logo_url: logo,
        }
    }

    #[test]
    fn chennai_collapses_into_one_cluster_when_zoomed_out() {
        let clusters = cluster_markers(EVENTS, 5.0, MAX_CLUSTER_RADIUS_PX);
        let chennai = clusters
            .iter()
            .find(|c| c.records(EVENTS).any(|e| e.city == "Chennai"))
            .unwrap();
        assert_eq!(chennai.len(), 4);
        assert!(chennai.records(EVENTS).all(|e| e.city == "Chennai"));
    }

    #[test]
    fn every_marker_lands_in_exactly_one_cluster() {
        for zoom in [2.0, 5.0, 9.0, 13.0, 18.0] {
            let clusters = cluster_markers(EVENTS, zoom, MAX_CLUSTER_RADIUS_PX);
            let mut seen: Vec<usize> = clusters.iter().flat_map(|c| c.members.clone()).collect();
            seen.sort_unstable();
            assert_eq!(seen, (0..EVENTS.len()).collect::<Vec<_>>(), "zoom {zoom}");
        }
    }

    #[test]
    fn markers_split_apart_when_zoomed_in() {
        let clusters = cluster_markers(EVENTS, 14.0, MAX_CLUSTER_RADIUS_PX);
        assert!(clusters.iter().all(Cluster::is_single));
    }

    #[test]
    fn fractional_zoom_uses_floor() {
        assert_eq!(
            cluster_markers(EVENTS, 9.99, MAX_CLUSTER_RADIUS_PX),
            cluster_markers(EVENTS, 9.0, MAX_CLUSTER_RADIUS_PX)
        );
    }

    #[test]
    fn cluster_bounds_cover_members() {
        for c in cluster_markers(EVENTS, 4.0, MAX_CLUSTER_RADIUS_PX) {
            assert!(c.records(EVENTS).all(|e| c.bounds.contains(e.position())));
        }
    }

    #[test]
    fn icon_takes_logos_from_first_three_members() {
        let events = [
            at(0.0, 0.0, "/a.png"),
            at(0.0, 0.0, ""),
            at(0.0, 0.0, "/b.png"),
            at(0.0, 0.0, "/a.png"),
            at(0.0, 0.0, "/c.png"),
        ];
        let icon = ClusterIcon::for_members(&events);
        assert_eq!(icon.count, 5);
        assert_eq!(icon.label, "5 Events");
        assert_eq!(icon.logos, vec!["/a.png", "/b.png"]);
    }

    #[test]
    fn click_below_max_zoom_zooms_in() {
        let c = cluster_markers(EVENTS, 5.0, MAX_CLUSTER_RADIUS_PX)
            .into_iter()
            .find(|c| c.len() == 4)
            .unwrap();
        let here = Viewport::new(c.center, 5.0);
        let ClusterClick::ZoomTo(next) = cluster_click(&c, here, ScreenSize::new(1000.0, 700.0))
        else {
            panic!("expected zoom");
        };
        assert!(next.zoom > 5.0);
    }

    #[test]
    fn click_at_max_zoom_spiderfies() {
        let events = [at(1.0, 1.0, ""), at(1.0, 1.0, "")];
        let c = &cluster_markers(&events, MAX_ZOOM, MAX_CLUSTER_RADIUS_PX)[0];
        assert_eq!(c.len(), 2);
        let here = Viewport::new(c.center, MAX_ZOOM);
        assert_eq!(
            cluster_click(c, here, ScreenSize::new(800.0, 600.0)),
            ClusterClick::Spiderfy
        );
    }

    #[test]
    fn small_spider_is_a_circle() {
        let offsets = spider_offsets(4);
        assert_eq!(offsets.len(), 4);
        assert_eq!(offsets[0], (35.0, 0.0));
        for (x, y) in offsets {
            assert!(((x * x + y * y).sqrt() - 35.0).abs() <= 1.0);
        }
    }

    #[test]
    fn large_spider_is_a_spiral_with_first_member_outermost() {
        let offsets = spider_offsets(12);
        assert_eq!(offsets.len(), 12);
        let r = |(x, y): (f64, f64)| (x * x + y * y).sqrt();
        assert!(r(offsets[0]) > r(offsets[11]));
    }

    #[test]
    fn hull_drops_interior_points() {
        let hull = convex_hull([
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(2.0, 2.0),
            LatLng::new(2.0, 0.0),
            LatLng::new(1.0, 1.0),
        ]);
        assert_eq!(hull.len(), 4);
        assert!(!hull.contains(&LatLng::new(1.0, 1.0)));
    }

    #[test]
    fn hull_of_two_points_is_the_pair() {
        let hull = convex_hull([LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0), LatLng::new(0.0, 0.0)]);
        assert_eq!(hull.len(), 2);
    }
}
