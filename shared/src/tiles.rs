//! Slippy-map tile addressing, URL templating, and a small least-recently-drawn cache.

use std::collections::HashMap;

use crate::geo::{Point, TILE_SIZE, project};
use crate::map_config::{MAX_ZOOM, MIN_ZOOM, TILE_SUBDOMAINS};
use crate::viewport::{ScreenSize, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TileKey {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

impl TileKey {
    /// Subdomain picked the same way for every request of this tile so browser caching holds.
    pub fn subdomain(&self) -> &'static str {
        let n = TILE_SUBDOMAINS.len().max(1) as u64;
        let idx = (u64::from(self.x) + u64::from(self.y)) % n;
        TILE_SUBDOMAINS.get(idx as usize).copied().unwrap_or("a")
    }

    /// The ancestor `levels` up and the square of it (in zoom-0 tile pixels) this tile covers.
    pub fn ancestor_crop(&self, levels: u8) -> Option<(TileKey, f64, f64, f64)> {
        if levels == 0 || levels > self.z {
            return None;
        }
        let span = 1_u32 << levels;
        let ancestor = TileKey {
            z: self.z - levels,
            x: self.x >> levels,
            y: self.y >> levels,
        };
        let part = TILE_SIZE / f64::from(span);
        let ox = f64::from(self.x % span) * part;
        let oy = f64::from(self.y % span) * part;
        Some((ancestor, ox, oy, part))
    }

    pub fn url(&self, template: &str, retina: bool) -> String {
        template
            .replace("{s}", self.subdomain())
            .replace("{z}", &self.z.to_string())
            .replace("{x}", &self.x.to_string())
            .replace("{y}", &self.y.to_string())
            .replace("{r}", if retina { "@2x" } else { "" })
    }
}

/// A tile to draw and where its top-left corner lands on screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePlacement {
    pub key: TileKey,
    pub sx: f64,
    pub sy: f64,
    pub size: f64,
}

/// Integer zoom of the tile pyramid used for a fractional map zoom.
pub fn tile_zoom(zoom: f64) -> u8 {
    zoom.round().clamp(MIN_ZOOM, MAX_ZOOM) as u8
}

/// Tiles covering the screen, nearest to the center first.
pub fn visible_tiles(viewport: &Viewport, size: ScreenSize) -> Vec<TilePlacement> {
    let z = tile_zoom(viewport.zoom);
    let scale = (viewport.zoom - f64::from(z)).exp2();
    let tile_px = TILE_SIZE * scale;
    let count = 1_i64 << z;

    // Work in tile-zoom pixel space, then scale to the displayed zoom.
    let center: Point = project(viewport.center, f64::from(z));
    let half_w = size.width / 2.0 / scale;
    let half_h = size.height / 2.0 / scale;
    let min_tx = ((center.x - half_w) / TILE_SIZE).floor() as i64;
    let max_tx = ((center.x + half_w) / TILE_SIZE).floor() as i64;
    let min_ty = (((center.y - half_h) / TILE_SIZE).floor() as i64).max(0);
    let max_ty = (((center.y + half_h) / TILE_SIZE).floor() as i64).min(count - 1);

    let mut out = Vec::new();
    for ty in min_ty..=max_ty {
        for tx in min_tx..=max_tx {
            let sx = (tx as f64 * TILE_SIZE - center.x) * scale + size.width / 2.0;
            let sy = (ty as f64 * TILE_SIZE - center.y) * scale + size.height / 2.0;
            out.push(TilePlacement {
                key: TileKey {
                    z,
                    x: tx.rem_euclid(count) as u32,
                    y: ty as u32,
                },
                sx,
                sy,
                size: tile_px,
            });
        }
    }

    let cx = size.width / 2.0;
    let cy = size.height / 2.0;
    let dist = |p: &TilePlacement| {
        let dx = p.sx + p.size / 2.0 - cx;
        let dy = p.sy + p.size / 2.0 - cy;
        dx * dx + dy * dy
    };
    out.sort_by(|a, b| dist(a).total_cmp(&dist(b)));
    out
}

/// Bounded map from tile to loaded value, evicting whatever was drawn longest ago.
#[derive(Debug)]
pub struct TileCache<V> {
    entries: HashMap<TileKey, (V, u64)>,
    capacity: usize,
    tick: u64,
}

impl<V> TileCache<V> {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
            tick: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &TileKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Fetch and mark as recently drawn.
    pub fn touch(&mut self, key: &TileKey) -> Option<&V> {
        self.tick += 1;
        let tick = self.tick;
        self.entries.get_mut(key).map(|(v, used)| {
            *used = tick;
            &*v
        })
    }

    pub fn insert(&mut self, key: TileKey, value: V) {
        self.tick += 1;
        self.entries.insert(key, (value, self.tick));
        while self.entries.len() > self.capacity {
            let Some(oldest) = self
                .entries
                .iter()
                .min_by_key(|(_, (_, used))| *used)
                .map(|(k, _)| *k)
            else {
                break;
            };
            self.entries.remove(&oldest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;
    use crate::map_config::TILE_LAYER_URL;

    #[test]
    fn url_fills_every_placeholder() {
        let key = TileKey { z: 13, x: 5921, y: 3770 };
        assert_eq!(
            key.url(TILE_LAYER_URL, true),
            "https://d.basemaps.cartocdn.com/rastertiles/voyager/13/5921/3770@2x.png"
        );
        assert_eq!(
            key.url(TILE_LAYER_URL, false),
            "https://d.basemaps.cartocdn.com/rastertiles/voyager/13/5921/3770.png"
        );
    }

    #[test]
    fn subdomain_rotates_with_position() {
        let s = |x, y| TileKey { z: 3, x, y }.subdomain();
        assert_eq!(s(0, 0), "a");
        assert_eq!(s(1, 0), "b");
        assert_eq!(s(1, 1), "c");
        assert_eq!(s(2, 1), "d");
        assert_eq!(s(2, 2), "a");
    }

    #[test]
    fn ancestor_crop_locates_child_quadrant() {
        let key = TileKey { z: 6, x: 11, y: 6 };
        let (parent, ox, oy, part) = key.ancestor_crop(1).unwrap();
        assert_eq!(parent, TileKey { z: 5, x: 5, y: 3 });
        assert_eq!((ox, oy, part), (128.0, 0.0, 128.0));

        let (grand, ox, oy, part) = key.ancestor_crop(2).unwrap();
        assert_eq!(grand, TileKey { z: 4, x: 2, y: 1 });
        assert_eq!((ox, oy, part), (192.0, 128.0, 64.0));

        assert!(key.ancestor_crop(0).is_none());
        assert!(key.ancestor_crop(7).is_none());
    }

    #[test]
    fn visible_tiles_cover_the_screen() {
        let vp = Viewport::new(LatLng::new(13.0, 80.2), 13.0);
        let size = ScreenSize::new(1024.0, 768.0);
        let tiles = visible_tiles(&vp, size);
        assert!(!tiles.is_empty());
        assert!(tiles.iter().all(|t| t.key.z == 13 && t.size == 256.0));
        let left = tiles.iter().map(|t| t.sx).fold(f64::MAX, f64::min);
        let right = tiles.iter().map(|t| t.sx + t.size).fold(f64::MIN, f64::max);
        let top = tiles.iter().map(|t| t.sy).fold(f64::MAX, f64::min);
        let bottom = tiles.iter().map(|t| t.sy + t.size).fold(f64::MIN, f64::max);
        assert!(left <= 0.0 && right >= size.width);
        assert!(top <= 0.0 && bottom >= size.height);

        let first = tiles[0];
        assert!(first.sx <= size.width / 2.0 && first.sx + first.size >= size.width / 2.0);
    }

    #[test]
    fn tiles_wrap_horizontally_and_stop_vertically() {
        let vp = Viewport::new(LatLng::new(0.0, 179.0), 2.0);
        let tiles = visible_tiles(&vp, ScreenSize::new(2000.0, 2000.0));
        assert!(tiles.iter().all(|t| t.key.x < 4 && t.key.y < 4));
        assert!(tiles.iter().any(|t| t.key.x == 0));
    }

    #[test]
    fn fractional_zoom_scales_tiles() {
        let vp = Viewport::new(LatLng::new(0.0, 0.0), 4.4);
        let tiles = visible_tiles(&vp, ScreenSize::new(800.0, 600.0));
        assert!(tiles.iter().all(|t| t.key.z == 4));
        assert!((tiles[0].size - 256.0 * 0.4_f64.exp2()).abs() < 1e-9);
    }

    #[test]
    fn cache_evicts_least_recently_drawn() {
        let k = |x| TileKey { z: 1, x, y: 0 };
        let mut cache = TileCache::new(2);
        cache.insert(k(0), "zero");
        cache.insert(k(1), "one");
        assert_eq!(cache.touch(&k(0)), Some(&"zero"));
        cache.insert(k(2), "two");
        assert_eq!(cache.len(), 2);
        assert!(cache.contains(&k(0)));
        assert!(!cache.contains(&k(1)));
        assert!(cache.contains(&k(2)));
    }
}
