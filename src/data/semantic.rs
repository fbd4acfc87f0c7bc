use super::raw::{RawAttraction, RawBusRoute, RawBusStop, RawHawkerCenter, RawStationExit};

/// A point on the map. The only coordinate representation used past the loaders.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapCoords {
    pub lat: f64,
    pub lon: f64,
}

impl MapCoords {
    pub fn new(lat: f64, lon: f64) -> Self {
        MapCoords { lat, lon }
    }

    pub fn from_lon_lat(pair: [f64; 2]) -> Self {
        MapCoords { lat: pair[1], lon: pair[0] }
    }

    pub fn from_lat_lon(pair: [f64; 2]) -> Self {
        MapCoords { lat: pair[0], lon: pair[1] }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StationExit {
    pub station: String,
    pub lines: Vec<String>,
    pub position: MapCoords,
    pub exit_label: String,
}

impl StationExit {
    pub fn serves_line(&self, line: &str) -> bool {
        self.lines.iter().any(|served| served == line)
    }
}

impl From<RawStationExit> for StationExit {
    fn from(value: RawStationExit) -> Self {
        StationExit {
            station: value.station.trim().to_string(),
            lines: value.line,
            position: MapCoords::from_lon_lat(value.coordinates),
            exit_label: value.exit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BusStop {
    pub code: String,
    pub description: String,
    pub road_name: String,
    pub position: MapCoords,
}

impl From<RawBusStop> for BusStop {
    fn from(value: RawBusStop) -> Self {
        BusStop {
            code: value.code,
            description: value.description,
            road_name: value.road_name,
            position: MapCoords::new(value.latitude, value.longitude),
        }
    }
}

/// One call of a bus service at a stop. Routes form a many-to-many join between
/// services and stops.
#[derive(Debug, Clone, PartialEq)]
pub struct BusRoute {
    pub service_no: String,
    pub bus_stop_code: String,
}

impl From<RawBusRoute> for BusRoute {
    fn from(value: RawBusRoute) -> Self {
        BusRoute {
            service_no: value.service_no.trim().to_string(),
            bus_stop_code: value.bus_stop_code.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attraction {
    pub title: String,
    pub category: String,
    pub address: String,
    pub overview: String,
    pub website: String,
    pub position: MapCoords,
}

impl From<RawAttraction> for Attraction {
    fn from(value: RawAttraction) -> Self {
        Attraction {
            title: value.title,
            category: value.category.trim().to_string(),
            address: value.address,
            overview: value.overview,
            website: value.website,
            position: MapCoords::from_lon_lat(value.coordinates),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HawkerCenter {
    pub name: String,
    pub address: String,
    pub description: String,
    pub position: MapCoords,
}

impl From<RawHawkerCenter> for HawkerCenter {
    fn from(value: RawHawkerCenter) -> Self {
        HawkerCenter {
            name: value.name,
            address: value.address,
            description: value.description,
            position: MapCoords::from_lat_lon(value.coordinates),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hawker_and_attraction_coordinates_share_one_order() {
        let attraction: Attraction = RawAttraction {
            title: "Merlion Park".to_string(),
            category: "Landmark".to_string(),
            address: String::new(),
            overview: String::new(),
            website: String::new(),
            coordinates: [103.8545, 1.2868],
        }.into();
        let hawker: HawkerCenter = RawHawkerCenter {
            name: "Lau Pa Sat".to_string(),
            address: String::new(),
            description: String::new(),
            coordinates: [1.2806, 103.8504],
        }.into();

        assert_eq!(attraction.position, MapCoords::new(1.2868, 103.8545));
        assert_eq!(hawker.position, MapCoords::new(1.2806, 103.8504));
    }
}
