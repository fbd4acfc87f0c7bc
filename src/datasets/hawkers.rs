use crate::data::{raw::RawHawkerCenter, semantic::HawkerCenter};
use crate::errors::Result;

use super::{keep_finite, Dataset};

pub const DATASET_NAME: &str = "hawker_centers";

pub struct HawkerCentersDataset<'a> {
    file_name: &'a str,
}

impl<'a> HawkerCentersDataset<'a> {
    pub fn new(file_name: &'a str) -> Self {
        HawkerCentersDataset { file_name }
    }
}

impl Dataset for HawkerCentersDataset<'_> {
    type Record = RawHawkerCenter;
    type Output = HawkerCenter;

    fn dataset_name(&self) -> &str {
        DATASET_NAME
    }

    fn file_name(&self) -> &str {
        self.file_name
    }

    // The file stores [lat, lon]; `HawkerCenter::from` swaps it into the canonical order.
    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>> {
        let hawkers = records.into_iter().map(HawkerCenter::from).collect();
        Ok(keep_finite(DATASET_NAME, hawkers, |hawker: &HawkerCenter| hawker.position))
    }
}
