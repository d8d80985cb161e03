use gatherings_shared::flight::{Flight, FlightFrame};
use gatherings_shared::map_config::FLY_DURATION_SECS;
use gatherings_shared::viewport::{ScreenSize, Viewport};

/// Duration of the short zoom used when a cluster is clicked.
pub const CLUSTER_ZOOM_SECS: f64 = 0.5;

/// Why a flight was started; decides how long it takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlightPurpose {
    FitEvents,
    Recenter,
    ClusterZoom,
}

#[derive(Debug, Clone)]
pub struct ActiveFlight {
    flight: Flight,
    pub purpose: FlightPurpose,
}

impl ActiveFlight {
    pub fn new(
        from: Viewport,
        to: Viewport,
        size: ScreenSize,
        now_ms: f64,
        purpose: FlightPurpose,
    ) -> Self {
        let secs = match purpose {
            FlightPurpose::ClusterZoom => CLUSTER_ZOOM_SECS,
            FlightPurpose::FitEvents | FlightPurpose::Recenter => FLY_DURATION_SECS,
        };
        Self {
            flight: Flight::new(from, to, size, now_ms, secs),
            purpose,
        }
    }

    pub fn frame(&self, now_ms: f64) -> FlightFrame {
        self.flight.sample(now_ms)
    }
}

/// At most one flight runs at a time; a new one replaces whatever is in the air.
#[derive(Debug, Clone, Default)]
pub struct FlightSlot {
    active: Option<ActiveFlight>,
}

impl FlightSlot {
    pub fn is_flying(&self) -> bool {
        self.active.is_some()
    }

    /// Start `next`, returning the purpose of the flight it displaced.
    pub fn replace(&mut self, next: ActiveFlight) -> Option<FlightPurpose> {
        self.active.replace(next).map(|f| f.purpose)
    }

    /// Drop the running flight (the user grabbed the map).
    pub fn cancel(&mut self) -> Option<FlightPurpose> {
        self.active.take().map(|f| f.purpose)
    }

    /// Advance to `now_ms`. Returns the viewport to show and, when the flight
    /// just landed, its purpose.
    pub fn step(&mut self, now_ms: f64) -> Option<(Viewport, Option<FlightPurpose>)> {
        let active = self.active.as_ref()?;
        let frame = active.frame(now_ms);
        if frame.finished {
            let purpose = self.active.take().map(|f| f.purpose);
            Some((frame.viewport, purpose))
        } else {
            Some((frame.viewport, None))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gatherings_shared::geo::LatLng;

    const SIZE: ScreenSize = ScreenSize::new(1000.0, 700.0);

    fn view(lat: f64, lng: f64, zoom: f64) -> Viewport {
        Viewport::new(LatLng::new(lat, lng), zoom)
    }

    #[test]
    fn newer_flight_supersedes_older_one() {
        let mut slot = FlightSlot::default();
        let a = ActiveFlight::new(view(0.0, 0.0, 3.0), view(13.0, 80.2, 12.0), SIZE, 0.0, FlightPurpose::Recenter);
        assert_eq!(slot.replace(a), None);

        let (mid, _) = slot.step(400.0).unwrap();
        let b = ActiveFlight::new(mid, view(41.8, -87.6, 10.0), SIZE, 400.0, FlightPurpose::FitEvents);
        assert_eq!(slot.replace(b), Some(FlightPurpose::Recenter));

        let (start, landed) = slot.step(400.0).unwrap();
        assert!(landed.is_none());
        assert!((start.center.lat - mid.center.lat).abs() < 1e-9);
    }

    #[test]
    fn landing_reports_purpose_once() {
        let mut slot = FlightSlot::default();
        let target = view(13.0, 80.2, 14.0);
        slot.replace(ActiveFlight::new(view(13.1, 80.1, 12.0), target, SIZE, 0.0, FlightPurpose::Recenter));
        let (vp, landed) = slot.step(10_000.0).unwrap();
        assert_eq!(vp, target);
        assert_eq!(landed, Some(FlightPurpose::Recenter));
        assert!(!slot.is_flying());
        assert!(slot.step(10_001.0).is_none());
    }

    #[test]
    fn cluster_zoom_is_short() {
        let mut slot = FlightSlot::default();
        let target = view(13.0, 80.2, 9.0);
        slot.replace(ActiveFlight::new(view(13.0, 80.0, 6.0), target, SIZE, 0.0, FlightPurpose::ClusterZoom));
        let (vp, landed) = slot.step(600.0).unwrap();
        assert_eq!(vp, target);
        assert_eq!(landed, Some(FlightPurpose::ClusterZoom));
    }

    #[test]
    fn cancel_clears_the_slot() {
        let mut slot = FlightSlot::default();
        slot.replace(ActiveFlight::new(view(0.0, 0.0, 3.0), view(1.0, 1.0, 5.0), SIZE, 0.0, FlightPurpose::FitEvents));
        assert_eq!(slot.cancel(), Some(FlightPurpose::FitEvents));
        assert_eq!(slot.cancel(), None);
    }
}
