use crate::data::{raw::RawStationExit, semantic::StationExit};
use crate::errors::Result;

use super::{keep_finite, Dataset};

pub const DATASET_NAME: &str = "station_exits";

pub struct StationExitsDataset<'a> {
    file_name: &'a str,
}

impl<'a> StationExitsDataset<'a> {
    pub fn new(file_name: &'a str) -> Self {
        StationExitsDataset { file_name }
    }
}

impl Dataset for StationExitsDataset<'_> {
    type Record = RawStationExit;
    type Output = StationExit;

    fn dataset_name(&self) -> &str {
        DATASET_NAME
    }

    fn file_name(&self) -> &str {
        self.file_name
    }

    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>> {
        let exits = records.into_iter().map(StationExit::from).collect();
        Ok(keep_finite(DATASET_NAME, exits, |exit: &StationExit| exit.position))
    }
}
