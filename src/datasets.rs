pub mod attractions;
pub mod bus;
pub mod hawkers;
pub mod stations;

use std::{collections::HashMap, fs, path::PathBuf, thread};

use log::{error, info, warn};
use serde::{de::DeserializeOwned, Deserialize};

use crate::data::Collections;
use crate::errors::Result;

use self::attractions::AttractionsDataset;
use self::bus::{BusRoutesDataset, BusStopsDataset};
use self::hawkers::HawkerCentersDataset;
use self::stations::StationExitsDataset;

/// Where the static JSON files come from.
pub trait DataSource: Sync {
    fn fetch(&self, path: &str) -> Result<Vec<u8>>;
}

/// Files under a root directory, addressed by relative path.
pub struct DirSource {
    root: PathBuf,
}

impl DirSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        DirSource { root: root.into() }
    }
}

impl DataSource for DirSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.root.join(path))?)
    }
}

/// Files held in memory, keyed by relative path.
#[derive(Default)]
pub struct StaticSource {
    files: HashMap<String, Vec<u8>>,
}

impl StaticSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: &str, contents: impl Into<Vec<u8>>) -> Self {
        self.files.insert(path.to_string(), contents.into());
        self
    }
}

impl DataSource for StaticSource {
    fn fetch(&self, path: &str) -> Result<Vec<u8>> {
        self.files.get(path)
            .cloned()
            .ok_or_else(|| format!("No such file: {}", path).into())
    }
}

/// Outcome of loading one collection. There is no retry: a collection that failed stays
/// unavailable for the life of the process.
#[derive(Debug, Clone)]
pub enum Loaded<T> {
    Ready(Vec<T>),
    Unavailable { reason: String },
}

impl<T> Loaded<T> {
    pub fn unavailable(reason: &str) -> Self {
        Loaded::Unavailable { reason: reason.to_string() }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Loaded::Ready(_))
    }

    /// The loaded records, or nothing when the collection is unavailable.
    pub fn records(&self) -> &[T] {
        match self {
            Loaded::Ready(records) => records,
            Loaded::Unavailable { .. } => &[],
        }
    }
}

/// One static collection: where it lives, how its wire records parse, and how they
/// become semantic records.
pub trait Dataset {
    type Record: DeserializeOwned;
    type Output;

    fn dataset_name(&self) -> &str;
    fn file_name(&self) -> &str;

    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>>;

    fn extract(&self, source: &dyn DataSource) -> Result<Vec<Self::Record>> {
        let bytes = source.fetch(self.file_name())?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn process(&self, source: &dyn DataSource) -> Loaded<Self::Output> {
        info!(dataset = self.dataset_name(), file = self.file_name(); "Starting dataset load");

        info!(dataset = self.dataset_name(); "Extracting");
        let records = match self.extract(source) {
            Ok(records) => records,
            Err(err) => {
                error!(dataset = self.dataset_name(), err = err.message.as_str(); "Extraction failed with error");
                return Loaded::Unavailable { reason: err.message };
            },
        };

        info!(dataset = self.dataset_name(), records = records.len(); "Transforming");
        let output = match self.transform(records) {
            Ok(output) => output,
            Err(err) => {
                error!(dataset = self.dataset_name(), err = err.message.as_str(); "Transformation failed with error");
                return Loaded::Unavailable { reason: err.message };
            },
        };

        info!(dataset = self.dataset_name(), records = output.len(); "Dataset ready");
        Loaded::Ready(output)
    }
}

/// Relative paths of the five collections.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct DatasetFiles {
    pub station_exits: String,
    pub bus_stops: String,
    pub bus_routes: String,
    pub attractions: String,
    pub hawker_centers: String,
}

impl Default for DatasetFiles {
    fn default() -> Self {
        DatasetFiles {
            station_exits: "cleaned_mrt_stations.json".to_string(),
            bus_stops: "bus_stops.json".to_string(),
            bus_routes: "bus_routes.json".to_string(),
            attractions: "attractions.json".to_string(),
            hawker_centers: "hawker_centres.json".to_string(),
        }
    }
}

/// Loads every collection once. Bus stops and bus routes are fetched side by side since
/// the service index needs both; the rest load one after another.
pub fn load_all(source: &dyn DataSource, files: &DatasetFiles) -> Collections {
    let (bus_stops, bus_routes) = thread::scope(|scope| {
        let stops = scope.spawn(|| BusStopsDataset::new(&files.bus_stops).process(source));
        let routes = scope.spawn(|| BusRoutesDataset::new(&files.bus_routes).process(source));
        (join_load(stops.join()), join_load(routes.join()))
    });

    let collections = Collections {
        station_exits: StationExitsDataset::new(&files.station_exits).process(source),
        bus_stops,
        bus_routes,
        attractions: AttractionsDataset::new(&files.attractions).process(source),
        hawker_centers: HawkerCentersDataset::new(&files.hawker_centers).process(source),
    };

    let unavailable = [
        collections.station_exits.is_ready(),
        collections.bus_stops.is_ready(),
        collections.bus_routes.is_ready(),
        collections.attractions.is_ready(),
        collections.hawker_centers.is_ready(),
    ].iter().filter(|ready| !**ready).count();
    if unavailable > 0 {
        warn!(unavailable = unavailable; "Some datasets are unavailable, their controls stay disabled");
    }
    collections
}

fn join_load<T>(joined: thread::Result<Loaded<T>>) -> Loaded<T> {
    joined.unwrap_or_else(|_| {
        error!("Dataset loader thread panicked");
        Loaded::unavailable("loader thread panicked")
    })
}

/// Keeps records whose position is a real point, logging the ones dropped.
pub(crate) fn keep_finite<T>(dataset_name: &str, records: Vec<T>, position: impl Fn(&T) -> crate::data::semantic::MapCoords) -> Vec<T> {
    let before = records.len();
    let kept: Vec<T> = records.into_iter().filter(|record| position(record).is_finite()).collect();
    if kept.len() < before {
        warn!(dataset = dataset_name, dropped = before - kept.len(); "Dropped records without usable coordinates");
    }
    kept
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_every_collection() {
        let collections = load_all(&fixtures::source(), &DatasetFiles::default());

        assert_eq!(collections.station_exits.records().len(), 4);
        assert_eq!(collections.bus_stops.records().len(), 3);
        assert_eq!(collections.bus_routes.records().len(), 5);
        assert_eq!(collections.attractions.records().len(), 2);
        assert_eq!(collections.hawker_centers.records().len(), 1);
    }

    #[test]
    fn missing_file_leaves_only_that_collection_unavailable() {
        let source = StaticSource::new()
            .with_file("bus_stops.json", fixtures::BUS_STOPS)
            .with_file("bus_routes.json", fixtures::BUS_ROUTES);
        let collections = load_all(&source, &DatasetFiles::default());

        assert!(collections.bus_stops.is_ready());
        assert!(collections.bus_routes.is_ready());
        assert!(!collections.station_exits.is_ready());
        assert!(collections.attractions.records().is_empty());
        match &collections.hawker_centers {
            Loaded::Unavailable { reason } => assert!(reason.contains("hawker_centres.json")),
            Loaded::Ready(_) => panic!("hawker centres should be unavailable"),
        }
    }

    #[test]
    fn malformed_json_is_unavailable() {
        let source = StaticSource::new().with_file("bus_stops.json", "[{\"BusStopCode\": ");
        let loaded = BusStopsDataset::new("bus_stops.json").process(&source);

        assert!(!loaded.is_ready());
        assert!(loaded.records().is_empty());
    }
}
