//! Proximity queries over bus stops.
//!
//! Uses the haversine formula for distances on Earth's surface. Stops are scanned
//! linearly; the candidate set is a few thousand points.

use geo::{HaversineDistance, Point};

use crate::data::semantic::{BusStop, MapCoords};

/// Walking distance rings drawn around a focused point.
pub const INNER_RADIUS_M: f64 = 400.0;
pub const OUTER_RADIUS_M: f64 = 800.0;

const METERS_PER_DEGREE: f64 = 111_320.0;

fn to_point(coords: &MapCoords) -> Point {
    Point::new(coords.lon, coords.lat)
}

/// Great-circle distance in meters.
pub fn great_circle_distance(a: &MapCoords, b: &MapCoords) -> f64 {
    to_point(a).haversine_distance(&to_point(b))
}

fn within(center: MapCoords, radius_m: f64, stops: &[BusStop]) -> impl Iterator<Item = (&BusStop, f64)> + '_ {
    let stops: &[BusStop] = if radius_m >= 0.0 && radius_m.is_finite() { stops } else { &[] };
    stops.iter()
        .map(move |stop| (stop, great_circle_distance(&center, &stop.position)))
        .filter(move |(_, distance)| *distance <= radius_m)
}

/// Stops within `radius_m` of `center`, in input order. A negative or non-finite radius
/// matches nothing.
pub fn nearby<'a>(center: &MapCoords, radius_m: f64, stops: &'a [BusStop]) -> Vec<&'a BusStop> {
    within(*center, radius_m, stops).map(|(stop, _)| stop).collect()
}

/// Like `nearby`, paired with each stop's distance and closest first.
pub fn nearby_with_distance<'a>(center: &MapCoords, radius_m: f64, stops: &'a [BusStop]) -> Vec<(&'a BusStop, f64)> {
    let mut found: Vec<(&BusStop, f64)> = within(*center, radius_m, stops).collect();
    found.sort_by(|a, b| a.1.total_cmp(&b.1));
    found
}

/// Convert meters to degrees at the equator, good enough for drawing at Singapore's
/// latitude.
pub fn meters_to_degrees_approx(meters: f64) -> f64 {
    meters / METERS_PER_DEGREE
}

/// Axis-aligned box in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl Bounds {
    pub fn of_point(point: &MapCoords) -> Self {
        Bounds {
            south: point.lat,
            west: point.lon,
            north: point.lat,
            east: point.lon,
        }
    }

    /// Smallest box holding every point, or `None` when there are none.
    pub fn around<'a>(points: impl IntoIterator<Item = &'a MapCoords>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Bounds::of_point(points.next()?);
        for point in points {
            bounds.extend(point);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: &MapCoords) {
        self.south = self.south.min(point.lat);
        self.west = self.west.min(point.lon);
        self.north = self.north.max(point.lat);
        self.east = self.east.max(point.lon);
    }

    pub fn center(&self) -> MapCoords {
        MapCoords::new((self.south + self.north) / 2.0, (self.west + self.east) / 2.0)
    }

    pub fn contains(&self, point: &MapCoords) -> bool {
        self.south <= point.lat && point.lat <= self.north
            && self.west <= point.lon && point.lon <= self.east
    }
}
