use self::semantic::{Attraction, BusRoute, BusStop, HawkerCenter, StationExit};
use crate::datasets::Loaded;

pub mod raw;
pub mod semantic;

/// Every collection the map can show, as delivered by the loaders. A collection that
/// failed to load stays `Unavailable` and the controls depending on it stay disabled.
#[derive(Debug, Clone)]
pub struct Collections {
    pub station_exits: Loaded<StationExit>,
    pub bus_stops: Loaded<BusStop>,
    pub bus_routes: Loaded<BusRoute>,
    pub attractions: Loaded<Attraction>,
    pub hawker_centers: Loaded<HawkerCenter>,
}

impl Default for Collections {
    fn default() -> Self {
        Collections {
            station_exits: Loaded::unavailable("not loaded"),
            bus_stops: Loaded::unavailable("not loaded"),
            bus_routes: Loaded::unavailable("not loaded"),
            attractions: Loaded::unavailable("not loaded"),
            hawker_centers: Loaded::unavailable("not loaded"),
        }
    }
}
