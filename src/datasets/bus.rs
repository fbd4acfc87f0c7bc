use std::collections::HashSet;

use log::warn;

use crate::data::{raw::{RawBusRoute, RawBusStop}, semantic::{BusRoute, BusStop}};
use crate::errors::Result;

use super::{keep_finite, Dataset};

pub const STOPS_DATASET_NAME: &str = "bus_stops";
pub const ROUTES_DATASET_NAME: &str = "bus_routes";

pub struct BusStopsDataset<'a> {
    file_name: &'a str,
}

impl<'a> BusStopsDataset<'a> {
    pub fn new(file_name: &'a str) -> Self {
        BusStopsDataset { file_name }
    }
}

impl Dataset for BusStopsDataset<'_> {
    type Record = RawBusStop;
    type Output = BusStop;

    fn dataset_name(&self) -> &str {
        STOPS_DATASET_NAME
    }

    fn file_name(&self) -> &str {
        self.file_name
    }

    /// A stop code identifies exactly one stop, so later duplicates are dropped. Stops
    /// without usable coordinates go first and never shadow a later record.
    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>> {
        let located = keep_finite(
            STOPS_DATASET_NAME,
            records.into_iter().map(BusStop::from).collect(),
            |stop: &BusStop| stop.position,
        );
        let mut seen: HashSet<String> = HashSet::new();
        let mut stops = Vec::with_capacity(located.len());
        for stop in located {
            if seen.insert(stop.code.clone()) {
                stops.push(stop);
            } else {
                warn!(dataset = STOPS_DATASET_NAME, code = stop.code.as_str(); "Dropping duplicate bus stop code");
            }
        }
        Ok(stops)
    }
}

pub struct BusRoutesDataset<'a> {
    file_name: &'a str,
}

impl<'a> BusRoutesDataset<'a> {
    pub fn new(file_name: &'a str) -> Self {
        BusRoutesDataset { file_name }
    }
}

impl Dataset for BusRoutesDataset<'_> {
    type Record = RawBusRoute;
    type Output = BusRoute;

    fn dataset_name(&self) -> &str {
        ROUTES_DATASET_NAME
    }

    fn file_name(&self) -> &str {
        self.file_name
    }

    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>> {
        Ok(records.into_iter()
            .map(BusRoute::from)
            .filter(|route| !route.service_no.is_empty() && !route.bus_stop_code.is_empty())
            .collect())
    }
}
