use thiserror::Error;

use crate::geo::LatLng;

/// One gathering shown on the map. Records are positionally indexed; there is no id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EventRecord {
    pub name: &'static str,
    pub latitude: f64,
    pub longitude: f64,
    pub location_label: &'static str,
    /// Grouping key for the city filter. Matched exactly and case-sensitively.
    pub city: &'static str,
    pub logo_url: &'static str,
}

impl EventRecord {
    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("event #{index} \"{name}\" has latitude {latitude} outside [-90, 90]")]
    LatitudeOutOfRange {
        index: usize,
        name: &'static str,
        latitude: f64,
    },
    #[error("event #{index} \"{name}\" has longitude {longitude} outside [-180, 180]")]
    LongitudeOutOfRange {
        index: usize,
        name: &'static str,
        longitude: f64,
    },
    #[error("event #{index} \"{name}\" has no city")]
    MissingCity { index: usize, name: &'static str },
}

pub fn check_record(index: usize, record: &EventRecord) -> Result<(), CatalogError> {
    if !(-90.0..=90.0).contains(&record.latitude) {
        return Err(CatalogError::LatitudeOutOfRange {
            index,
            name: record.name,
            latitude: record.latitude,
        });
    }
    if !(-180.0..=180.0).contains(&record.longitude) {
        return Err(CatalogError::LongitudeOutOfRange {
            index,
            name: record.name,
            longitude: record.longitude,
        });
    }
    if record.city.is_empty() {
        return Err(CatalogError::MissingCity {
            index,
            name: record.name,
        });
    }
    Ok(())
}

/// The loaded, validated event list. Order matches the source list minus skipped records.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    events: Vec<EventRecord>,
    skipped: Vec<CatalogError>,
}

impl Catalog {
    /// Load records, skipping any that break the coordinate or city invariants.
    pub fn load(records: &[EventRecord]) -> Self {
        let mut events = Vec::with_capacity(records.len());
        let mut skipped = Vec::new();
        for (index, record) in records.iter().enumerate() {
            match check_record(index, record) {
                Ok(()) => events.push(*record),
                Err(e) => skipped.push(e),
            }
        }
        Self { events, skipped }
    }

    pub fn builtin() -> Self {
        Self::load(EVENTS)
    }

    pub fn events(&self) -> &[EventRecord] {
        &self.events
    }

    pub fn skipped(&self) -> &[CatalogError] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Compiled-in event list.
pub const EVENTS: &[EventRecord] = &[
    // Chennai: four venues close together
    EventRecord {
        name: "Tech Summit Chennai 2024",
        latitude: 13.0475,
        longitude: 80.2144,
        location_label: "T Nagar",
        city: "Chennai",
        logo_url: "/logos/logo3.png",
    },
    EventRecord {
        name: "Startup Expo Chennai",
        latitude: 13.0358,
        longitude: 80.1556,
        location_label: "Porur",
        city: "Chennai",
        logo_url: "/logos/logo2.png",
    },
    EventRecord {
        name: "Digital Innovation Fest",
        latitude: 12.9249,
        longitude: 80.1000,
        location_label: "Tambaram",
        city: "Chennai",
        logo_url: "/logos/logo3.png",
    },
    EventRecord {
        name: "Digital Innovation Fest 2",
        latitude: 13.023_611_1,
        longitude: 80.224_166,
        location_label: "Jeenis Road",
        city: "Chennai",
        logo_url: "/logos/logo2.png",
    },
    // Thailand
    EventRecord {
        name: "Thailand Tech Conference",
        latitude: 18.7883,
        longitude: 98.9853,
        location_label: "Old City",
        city: "Chiang Mai",
        logo_url: "/logos/logo3.png",
    },
    EventRecord {
        name: "Bangkok Innovation Summit",
        latitude: 13.7563,
        longitude: 100.5018,
        location_label: "Sukhumvit",
        city: "Bangkok",
        logo_url: "/logos/logo3.png",
    },
    // USA
    EventRecord {
        name: "Chicago Developer Conference",
        latitude: 41.8781,
        longitude: -87.6298,
        location_label: "Downtown",
        city: "Chicago",
        logo_url: "/logos/logo2.png",
    },
    EventRecord {
        name: "San Francisco Tech Expo",
        latitude: 37.7749,
        longitude: -122.4194,
        location_label: "Financial District",
        city: "San Francisco",
        logo_url: "/logos/logo3.png",
    },
    EventRecord {
        name: "Fil-Africa Conference",
        latitude: -33.25,
        longitude: 18.416_666_666_666_668,
        location_label: "Swartland",
        city: "Cape Town",
        logo_url: "/logos/logo2.png",
    },
];
