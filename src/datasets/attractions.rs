use crate::data::{raw::RawAttraction, semantic::Attraction};
use crate::errors::Result;

use super::{keep_finite, Dataset};

pub const DATASET_NAME: &str = "attractions";

pub struct AttractionsDataset<'a> {
    file_name: &'a str,
}

impl<'a> AttractionsDataset<'a> {
    pub fn new(file_name: &'a str) -> Self {
        AttractionsDataset { file_name }
    }
}

impl Dataset for AttractionsDataset<'_> {
    type Record = RawAttraction;
    type Output = Attraction;

    fn dataset_name(&self) -> &str {
        DATASET_NAME
    }

    fn file_name(&self) -> &str {
        self.file_name
    }

    fn transform(&self, records: Vec<Self::Record>) -> Result<Vec<Self::Output>> {
        let attractions = records.into_iter().map(Attraction::from).collect();
        Ok(keep_finite(DATASET_NAME, attractions, |attraction: &Attraction| attraction.position))
    }
}
