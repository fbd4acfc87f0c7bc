//! The surface overlays are drawn on, and what can be drawn.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::data::semantic::MapCoords;
use crate::spatial::Bounds;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::rgb(0xff, 0xff, 0xff);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Color { r, g, b, a: 0xff }
    }

    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl<'de> Deserialize<'de> for Color {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
        where D: serde::Deserializer<'de> {
        deserializer.deserialize_str(serialize_color::ColorVisitor)
    }
}

mod serialize_color {
    use serde::de;
    use serde::de::Visitor;

    use super::Color;

    pub struct ColorVisitor;

    impl<'de> Visitor<'de> for ColorVisitor {
        type Value = Color;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(formatter, "a '#RRGGBB' or '#RRGGBBAA' colour string")
        }

        fn visit_str<E>(self, string: &str) -> Result<Self::Value, E> where E: de::Error {
            if !string.is_ascii() || !string.starts_with('#') || (string.len() != 7 && string.len() != 9) {
                return Err(de::Error::invalid_value(de::Unexpected::Str(string), &self))
            }
            let r = parse_hex_byte(&self, &string[1..3])?;
            let g = parse_hex_byte(&self, &string[3..5])?;
            let b = parse_hex_byte(&self, &string[5..7])?;
            let a = if string.len() == 9 {
                parse_hex_byte(&self, &string[7..9])?
            } else {
                0xff
            };
            Ok(Color { r, g, b, a })
        }
    }

    fn parse_hex_byte<E>(visitor: &ColorVisitor, string: &str) -> Result<u8, E> where E: de::Error {
        u8::from_str_radix(string, 16).map_err(|_| {
            de::Error::invalid_value(de::Unexpected::Str(string), visitor)
        })
    }
}

/// What a marker stands for when it is clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerTarget {
    Attraction(usize),
    Hawker(usize),
}

/// A circle marker with a fixed on-screen size.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub position: MapCoords,
    pub radius_px: f32,
    pub color: Color,
    pub fill_opacity: f32,
    pub weight: f32,
    pub popup: String,
    pub target: Option<MarkerTarget>,
}

impl Marker {
    pub fn new(position: MapCoords, color: Color, popup: String) -> Self {
        Marker {
            position,
            radius_px: 15.0,
            color,
            fill_opacity: 0.8,
            weight: 2.0,
            popup,
            target: None,
        }
    }

    pub fn with_radius(mut self, radius_px: f32) -> Self {
        self.radius_px = radius_px;
        self
    }

    pub fn with_target(mut self, target: MarkerTarget) -> Self {
        self.target = Some(target);
        self
    }
}

/// A circle with a radius on the ground, in meters.
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub center: MapCoords,
    pub radius_m: f64,
    pub color: Color,
    pub fill_opacity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Overlay {
    Marker(Marker),
    Ring(Ring),
    /// Markers the surface merges into count badges when they crowd together. A badge
    /// takes the colour of its first marker.
    Cluster(Vec<Marker>),
    /// Markers drawn individually.
    Layer(Vec<Marker>),
}

impl Overlay {
    pub fn markers(&self) -> &[Marker] {
        match self {
            Overlay::Marker(marker) => std::slice::from_ref(marker),
            Overlay::Cluster(markers) | Overlay::Layer(markers) => markers,
            Overlay::Ring(_) => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayId(pub u64);

/// The mapping collaborator. Overlays stay on the surface until removed by id.
pub trait MapSurface {
    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId;
    /// Removing an id that is not on the surface does nothing.
    fn remove_overlay(&mut self, id: OverlayId);
    fn fit_bounds(&mut self, bounds: &Bounds, padding_px: f32, max_zoom: f64);
}

/// Keeps overlays in memory without drawing anything.
#[derive(Debug, Default)]
pub struct RecordingMap {
    next_id: u64,
    overlays: BTreeMap<OverlayId, Overlay>,
    pub fits: Vec<Bounds>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlays(&self) -> impl Iterator<Item = (&OverlayId, &Overlay)> {
        self.overlays.iter()
    }

    pub fn overlay(&self, id: OverlayId) -> Option<&Overlay> {
        self.overlays.get(&id)
    }

    pub fn overlay_count(&self) -> usize {
        self.overlays.len()
    }

    pub fn rings(&self) -> Vec<&Ring> {
        self.overlays.values()
            .filter_map(|overlay| match overlay {
                Overlay::Ring(ring) => Some(ring),
                _ => None,
            })
            .collect()
    }
}

impl MapSurface for RecordingMap {
    fn add_overlay(&mut self, overlay: Overlay) -> OverlayId {
        let id = OverlayId(self.next_id);
        self.next_id += 1;
        self.overlays.insert(id, overlay);
        id
    }

    fn remove_overlay(&mut self, id: OverlayId) {
        self.overlays.remove(&id);
    }

    fn fit_bounds(&mut self, bounds: &Bounds, _padding_px: f32, _max_zoom: f64) {
        self.fits.push(*bounds);
    }
}
