use crate::catalog::EventRecord;
use crate::map_config::{CLUSTER_ICON_SIZE_PX, MARKER_ANCHOR_PX, MARKER_ICON_SIZE_PX, POPUP_ANCHOR_PX};
use crate::viewport::ScreenSize;

/// Text shown when a marker is clicked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub title: &'static str,
    pub location: String,
    pub city: String,
}

impl Popup {
    pub fn for_record(record: &EventRecord) -> Self {
        Self {
            title: record.name,
            location: format!("Location: {}", record.location_label),
            city: format!("City: {}", record.city),
        }
    }
}

/// Screen rectangle covered by an icon: top-left corner plus size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IconRect {
    pub x: f64,
    pub y: f64,
    pub size: f64,
}

impl IconRect {
    pub fn contains(&self, px: f64, py: f64) -> bool {
        px >= self.x && px <= self.x + self.size && py >= self.y && py <= self.y + self.size
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.size / 2.0, self.y + self.size / 2.0)
    }

    /// Whether any part of the icon falls within the screen grown by `margin` on each side.
    pub fn is_visible(&self, size: ScreenSize, margin: f64) -> bool {
        self.x + self.size >= -margin
            && self.y + self.size >= -margin
            && self.x <= size.width + margin
            && self.y <= size.height + margin
    }
}

/// Marker icon placed so that its anchor (bottom-center) sits on the event.
pub fn marker_rect(sx: f64, sy: f64) -> IconRect {
    IconRect {
        x: sx - MARKER_ANCHOR_PX.0,
        y: sy - MARKER_ANCHOR_PX.1,
        size: MARKER_ICON_SIZE_PX,
    }
}

/// Cluster icons are centered on the cluster position.
pub fn cluster_rect(sx: f64, sy: f64) -> IconRect {
    let half = CLUSTER_ICON_SIZE_PX / 2.0;
    IconRect {
        x: sx - half,
        y: sy - half,
        size: CLUSTER_ICON_SIZE_PX,
    }
}

/// Screen point the popup's tip points at, for a marker at `(sx, sy)`.
pub fn popup_tip(sx: f64, sy: f64) -> (f64, f64) {
    (sx + POPUP_ANCHOR_PX.0, sy + POPUP_ANCHOR_PX.1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::EVENTS;

    #[test]
    fn popup_lists_location_and_city() {
        let popup = Popup::for_record(&EVENTS[0]);
        assert_eq!(popup.title, "Tech Summit Chennai 2024");
        assert_eq!(popup.location, "Location: T Nagar");
        assert_eq!(popup.city, "City: Chennai");
    }

    #[test]
    fn marker_anchor_is_bottom_center() {
        let rect = marker_rect(100.0, 200.0);
        assert_eq!(rect, IconRect { x: 80.0, y: 160.0, size: 40.0 });
        assert!(rect.contains(100.0, 199.0));
        assert!(!rect.contains(100.0, 201.0));
    }

    #[test]
    fn cluster_icon_is_centered() {
        let rect = cluster_rect(100.0, 100.0);
        assert_eq!(rect.center(), (100.0, 100.0));
        assert!(rect.contains(129.0, 71.0));
    }

    #[test]
    fn icons_off_screen_are_culled() {
        let screen = ScreenSize::new(800.0, 600.0);
        assert!(marker_rect(400.0, 300.0).is_visible(screen, 0.0));
        assert!(!marker_rect(-100.0, 300.0).is_visible(screen, 0.0));
        assert!(marker_rect(-100.0, 300.0).is_visible(screen, 100.0));
        assert!(!cluster_rect(400.0, 1000.0).is_visible(screen, 100.0));
    }

    #[test]
    fn popup_sits_above_the_icon() {
        assert_eq!(popup_tip(50.0, 90.0), (50.0, 50.0));
    }
}
