//! Records exactly as they appear in the static JSON files. Nothing here is used past
//! the dataset loaders; see `semantic` for the canonical types.

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone)]
pub struct RawStationExit {
    pub station: String,
    #[serde(deserialize_with = "line_list::deserialize")]
    pub line: Vec<String>,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
    #[serde(default, alias = "exist", alias = "exit_label")]
    pub exit: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawBusStop {
    #[serde(rename = "BusStopCode", alias = "code")]
    pub code: String,
    #[serde(rename = "Description", alias = "description", default)]
    pub description: String,
    #[serde(rename = "RoadName", alias = "road_name", default)]
    pub road_name: String,
    #[serde(rename = "Latitude", alias = "lat")]
    pub latitude: f64,
    #[serde(rename = "Longitude", alias = "lon")]
    pub longitude: f64,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawBusRoute {
    #[serde(rename = "ServiceNo", alias = "service_no")]
    pub service_no: String,
    #[serde(rename = "BusStopCode", alias = "bus_stop_code")]
    pub bus_stop_code: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawAttraction {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub website: String,
    /// `[lon, lat]`
    pub coordinates: [f64; 2],
}

#[derive(Deserialize, Debug, Clone)]
pub struct RawHawkerCenter {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub description: String,
    /// `[lat, lon]`, unlike every other file.
    pub coordinates: [f64; 2],
}

/// Station exits list their lines either as one string ("North South Line / East West
/// Line") or as a JSON array. Both end up as a list of trimmed names.
mod line_list {
    use serde::de::{self, SeqAccess, Visitor};
    use serde::Deserializer;

    const SEPARATORS: &[char] = &[',', '/', ';'];

    struct LineListVisitor;

    impl<'de> Visitor<'de> for LineListVisitor {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a line name, a separated list of line names, or an array of line names")
        }

        fn visit_str<E>(self, string: &str) -> Result<Self::Value, E> where E: de::Error {
            Ok(split_lines(string))
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error> where A: SeqAccess<'de> {
            let mut lines = Vec::new();
            while let Some(line) = seq.next_element::<String>()? {
                lines.extend(split_lines(&line));
            }
            Ok(lines)
        }
    }

    fn split_lines(string: &str) -> Vec<String> {
        string.split(SEPARATORS)
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
        where D: Deserializer<'de> {
        deserializer.deserialize_any(LineListVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn station_line_accepts_string_and_array() {
        let from_string: RawStationExit = serde_json::from_str(
            r#"{"station": "Bishan", "line": "North South Line / Circle Line", "coordinates": [103.848, 1.351], "exist": "A"}"#
        ).unwrap();
        assert_eq!(from_string.line, vec!["North South Line", "Circle Line"]);
        assert_eq!(from_string.exit, "A");

        let from_array: RawStationExit = serde_json::from_str(
            r#"{"station": "Bishan", "line": ["North South Line", "Circle Line"], "coordinates": [103.848, 1.351]}"#
        ).unwrap();
        assert_eq!(from_array.line, vec!["North South Line", "Circle Line"]);
        assert_eq!(from_array.exit, "");
    }

    #[test]
    fn bus_stop_reads_datamall_keys() {
        let stop: RawBusStop = serde_json::from_str(
            r#"{"BusStopCode": "01012", "RoadName": "Victoria St", "Description": "Hotel Grand Pacific", "Latitude": 1.29684, "Longitude": 103.85253}"#
        ).unwrap();
        assert_eq!(stop.code, "01012");
        assert_eq!(stop.road_name, "Victoria St");
    }

    #[test]
    fn attraction_tolerates_missing_website() {
        let attraction: RawAttraction = serde_json::from_str(
            r#"{"title": "Gardens by the Bay", "category": "Nature", "coordinates": [103.8636, 1.2816]}"#
        ).unwrap();
        assert_eq!(attraction.website, "");
        assert_eq!(attraction.overview, "");
    }
}
