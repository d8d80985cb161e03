//! Geolocation request lifecycle, independent of the browser API that resolves it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::LatLng;
use crate::map_config::{GEO_HIGH_ACCURACY, GEO_MAX_CACHED_AGE_MS, GEO_TIMEOUT_MS, LOCATE_ZOOM};
use crate::viewport::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy_meters: f64,
}

impl UserLocation {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }

    /// Where the map goes once the position arrives.
    pub fn recenter_view(&self) -> Viewport {
        Viewport::new(self.position(), LOCATE_ZOOM)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeoError {
    #[error("Location permission denied. Please enable location access.")]
    PermissionDenied,
    #[error("Location information unavailable.")]
    PositionUnavailable,
    #[error("Location request timed out.")]
    Timeout,
    #[error("An unknown error occurred while getting your location.")]
    Unknown,
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,
}

impl GeoError {
    /// Map a `GeolocationPositionError.code`.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => Self::PermissionDenied,
            2 => Self::PositionUnavailable,
            3 => Self::Timeout,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u32,
    pub max_cached_age_ms: u32,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: GEO_HIGH_ACCURACY,
            timeout_ms: GEO_TIMEOUT_MS,
            max_cached_age_ms: GEO_MAX_CACHED_AGE_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum GeoState {
    #[default]
    Idle,
    Requesting,
    Resolved(UserLocation),
    Failed(GeoError),
}

/// Single-flight request tracking plus a one-shot recenter flag.
///
/// The last known location stays visible while a new request is running.
#[derive(Debug, Clone, Default)]
pub struct GeolocationController {
    state: GeoState,
    location: Option<UserLocation>,
    recenter_pending: bool,
}

impl GeolocationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &GeoState {
        &self.state
    }

    pub fn is_requesting(&self) -> bool {
        matches!(self.state, GeoState::Requesting)
    }

    pub fn location(&self) -> Option<UserLocation> {
        self.location
    }

    pub fn error(&self) -> Option<&GeoError> {
        match &self.state {
            GeoState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Returns `true` when the caller should issue a platform request.
    /// A request already in flight makes this a no-op.
    pub fn request(&mut self) -> bool {
        if self.is_requesting() {
            return false;
        }
        self.state = GeoState::Requesting;
        true
    }

    pub fn resolve(&mut self, location: UserLocation) {
        if !self.is_requesting() {
            return;
        }
        self.location = Some(location);
        self.recenter_pending = true;
        self.state = GeoState::Resolved(location);
    }

    pub fn fail(&mut self, error: GeoError) {
        if !self.is_requesting() {
            return;
        }
        self.state = GeoState::Failed(error);
    }

    /// The view to recenter on, if a resolved location has not been flown to yet.
    pub fn pending_recenter(&self) -> Option<Viewport> {
        if self.recenter_pending {
            self.location.map(|l| l.recenter_view())
        } else {
            None
        }
    }

    pub fn recenter_complete(&mut self) {
        self.recenter_pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HERE: UserLocation = UserLocation {
        latitude: 13.08,
        longitude: 80.27,
        accuracy_meters: 25.0,
    };

    #[test]
    fn second_request_while_requesting_is_suppressed() {
        let mut geo = GeolocationController::new();
        assert!(geo.request());
        assert!(!geo.request());
        assert!(geo.is_requesting());
    }

    #[test]
    fn resolve_arms_exactly_one_recenter() {
        let mut geo = GeolocationController::new();
        geo.request();
        geo.resolve(HERE);
        assert_eq!(geo.state(), &GeoState::Resolved(HERE));

        let view = geo.pending_recenter().unwrap();
        assert_eq!(view.center, HERE.position());
        assert_eq!(view.zoom, LOCATE_ZOOM);

        geo.recenter_complete();
        assert!(geo.pending_recenter().is_none());
        assert!(geo.pending_recenter().is_none());
        assert_eq!(geo.location(), Some(HERE));
    }

    #[test]
    fn failure_is_classified_and_retry_is_allowed() {
        let mut geo = GeolocationController::new();
        geo.request();
        geo.fail(GeoError::from_code(1));
        assert_eq!(geo.error(), Some(&GeoError::PermissionDenied));
        assert!(geo.pending_recenter().is_none());
        assert!(geo.request());
        assert!(geo.error().is_none());
    }

    #[test]
    fn can_request_again_after_resolving() {
        let mut geo = GeolocationController::new();
        geo.request();
        geo.resolve(HERE);
        geo.recenter_complete();
        assert!(geo.request());
        assert_eq!(geo.location(), Some(HERE));
    }

    #[test]
    fn outcomes_without_a_request_are_ignored() {
        let mut geo = GeolocationController::new();
        geo.resolve(HERE);
        geo.fail(GeoError::Timeout);
        assert_eq!(geo.state(), &GeoState::Idle);
        assert!(geo.pending_recenter().is_none());
    }

    #[test]
    fn error_codes_map_to_causes() {
        assert_eq!(GeoError::from_code(2), GeoError::PositionUnavailable);
        assert_eq!(GeoError::from_code(3), GeoError::Timeout);
        assert_eq!(GeoError::from_code(0), GeoError::Unknown);
        assert_eq!(GeoError::from_code(9), GeoError::Unknown);
        assert_eq!(
            GeoError::Timeout.to_string(),
            "Location request timed out."
        );
    }

    #[test]
    fn default_options_match_map_config() {
        let opts = GeolocationOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout_ms, 10_000);
        assert_eq!(opts.max_cached_age_ms, 0);
    }
}
