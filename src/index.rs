//! Lookup structures derived once from the loaded collections.

use std::{cmp::Ordering, collections::{BTreeSet, HashMap, HashSet}, sync::OnceLock};

use regex::Regex;

use crate::data::semantic::{Attraction, BusRoute, BusStop, StationExit};
use crate::filter::{filter_by_field, RouteField};

/// Bus stop code to the set of services calling at it.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ServiceIndex {
    by_stop: HashMap<String, BTreeSet<String>>,
}

impl ServiceIndex {
    pub fn build(routes: &[BusRoute]) -> Self {
        let mut index = ServiceIndex::default();
        for route in routes {
            index.insert(route);
        }
        index
    }

    pub fn insert(&mut self, route: &BusRoute) {
        self.by_stop.entry(route.bus_stop_code.clone())
            .or_default()
            .insert(route.service_no.clone());
    }

    pub fn services(&self, stop_code: &str) -> Option<&BTreeSet<String>> {
        self.by_stop.get(stop_code)
    }

    /// Services at a stop in the order a rider reads them: 2, 10, 10e, 12.
    pub fn services_at(&self, stop_code: &str) -> Vec<&str> {
        let mut services: Vec<&str> = self.by_stop.get(stop_code)
            .map(|set| set.iter().map(String::as_str).collect())
            .unwrap_or_default();
        services.sort_by(|a, b| compare_numeric_aware(a, b));
        services
    }

    pub fn len(&self) -> usize {
        self.by_stop.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_stop.is_empty()
    }
}

/// Bus stops by code.
#[derive(Debug, Default)]
pub struct BusStopDirectory<'a> {
    by_code: HashMap<&'a str, &'a BusStop>,
}

impl<'a> BusStopDirectory<'a> {
    pub fn build(stops: &'a [BusStop]) -> Self {
        let mut by_code = HashMap::with_capacity(stops.len());
        for stop in stops {
            by_code.entry(stop.code.as_str()).or_insert(stop);
        }
        BusStopDirectory { by_code }
    }

    pub fn get(&self, code: &str) -> Option<&'a BusStop> {
        self.by_code.get(code).copied()
    }

    /// Stops a service calls at, in route order, each stop once. Codes with no matching
    /// stop are skipped.
    pub fn stops_for_service(&self, routes: &[BusRoute], service_no: &str) -> Vec<&'a BusStop> {
        if service_no.is_empty() {
            return Vec::new();
        }
        let mut seen: HashSet<&str> = HashSet::new();
        filter_by_field(routes, RouteField::ServiceNo, service_no)
            .into_iter()
            .filter_map(|route| self.get(&route.bus_stop_code))
            .filter(|stop| seen.insert(stop.code.as_str()))
            .collect()
    }
}

/// Options for the selection controls.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionOptions {
    pub lines: Vec<String>,
    pub services: Vec<String>,
    pub categories: Vec<String>,
}

impl SelectionOptions {
    pub fn build(exits: &[StationExit], routes: &[BusRoute], attractions: &[Attraction]) -> Self {
        SelectionOptions {
            lines: distinct_lines(exits),
            services: distinct_services(routes),
            categories: distinct_categories(attractions),
        }
    }
}

pub fn distinct_lines(exits: &[StationExit]) -> Vec<String> {
    let lines: BTreeSet<&str> = exits.iter()
        .flat_map(|exit| exit.lines.iter().map(String::as_str))
        .filter(|line| !line.is_empty())
        .collect();
    lines.into_iter().map(str::to_string).collect()
}

pub fn distinct_services(routes: &[BusRoute]) -> Vec<String> {
    let services: HashSet<&str> = routes.iter()
        .map(|route| route.service_no.as_str())
        .filter(|service| !service.is_empty())
        .collect();
    let mut services: Vec<String> = services.into_iter().map(str::to_string).collect();
    services.sort_by(|a, b| compare_numeric_aware(a, b));
    services
}

pub fn distinct_categories(attractions: &[Attraction]) -> Vec<String> {
    let categories: BTreeSet<&str> = attractions.iter()
        .map(|attraction| attraction.category.as_str())
        .filter(|category| !category.is_empty())
        .collect();
    categories.into_iter().map(str::to_string).collect()
}

fn chunks(value: &str) -> impl Iterator<Item = &str> {
    static CHUNK: OnceLock<Regex> = OnceLock::new();
    CHUNK.get_or_init(|| Regex::new(r"\d+|\D+").expect("chunk pattern is valid"))
        .find_iter(value)
        .map(|found| found.as_str())
}

fn compare_digits(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Orders strings the way people read service numbers: runs of digits compare by value,
/// everything else compares case-insensitively.
pub fn compare_numeric_aware(a: &str, b: &str) -> Ordering {
    let mut left = chunks(a);
    let mut right = chunks(b);
    loop {
        let ordering = match (left.next(), right.next()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(l), Some(r)) => {
                let l_digits = l.starts_with(|c: char| c.is_ascii_digit());
                let r_digits = r.starts_with(|c: char| c.is_ascii_digit());
                match (l_digits, r_digits) {
                    (true, true) => compare_digits(l, r),
                    (true, false) => Ordering::Less,
                    (false, true) => Ordering::Greater,
                    (false, false) => l.to_lowercase().cmp(&r.to_lowercase()),
                }
            },
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
}
