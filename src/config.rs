use std::{collections::HashMap, fs::File, path::Path};

use serde::Deserialize;

use crate::data::semantic::MapCoords;
use crate::datasets::DatasetFiles;
use crate::errors::Result;
use crate::map::Color;
use crate::spatial::{INNER_RADIUS_M, OUTER_RADIUS_M};
use crate::ui::{Control, UiEvent};

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct UserConfig {
    pub data_path: String,
    pub dest_path: String,
    pub width_px: u32,
    pub height_px: u32,
    pub files: DatasetFiles,
    pub view: ViewConfig,
    pub focus: FocusConfig,
    pub line_colors: HashMap<String, Color>,
    pub controls: Vec<Control>,
    pub font_path: Option<String>,
    pub session: Vec<UiEvent>,
}

impl Default for UserConfig {
    fn default() -> Self {
        UserConfig {
            data_path: "data".to_string(),
            dest_path: "output/map.png".to_string(),
            width_px: 1600,
            height_px: 1000,
            files: DatasetFiles::default(),
            view: ViewConfig::default(),
            focus: FocusConfig::default(),
            line_colors: default_line_colors(),
            controls: Control::ALL.to_vec(),
            font_path: None,
            session: Vec::new(),
        }
    }
}

/// Initial view and the limits used when zooming to a selection.
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ViewConfig {
    pub center_lat: f64,
    pub center_lon: f64,
    pub zoom: f64,
    pub fit_padding_px: f32,
    pub fit_max_zoom: f64,
}

impl ViewConfig {
    pub fn center(&self) -> MapCoords {
        MapCoords::new(self.center_lat, self.center_lon)
    }
}

impl Default for ViewConfig {
    fn default() -> Self {
        ViewConfig {
            center_lat: 1.3521,
            center_lon: 103.8198,
            zoom: 12.0,
            fit_padding_px: 50.0,
            fit_max_zoom: 15.0,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct FocusConfig {
    pub inner_radius_m: f64,
    pub outer_radius_m: f64,
    pub inner_color: Color,
    pub outer_color: Color,
    pub ring_opacity: f32,
    pub stop_color: Color,
    pub attraction_color: Color,
    pub hawker_color: Color,
    pub service_color: Color,
}

impl Default for FocusConfig {
    fn default() -> Self {
        FocusConfig {
            inner_radius_m: INNER_RADIUS_M,
            outer_radius_m: OUTER_RADIUS_M,
            inner_color: Color::rgb(0x1E, 0x88, 0xE5),
            outer_color: Color::rgb(0x90, 0xCA, 0xF9),
            ring_opacity: 0.15,
            stop_color: Color::rgb(0x43, 0x43, 0x43),
            attraction_color: Color::rgb(0xE9, 0x1E, 0x63),
            hawker_color: Color::rgb(0xFF, 0x98, 0x00),
            service_color: Color::rgb(0x00, 0x79, 0x6B),
        }
    }
}

pub fn default_line_colors() -> HashMap<String, Color> {
    [
        ("Downtown Line", Color::rgb(0x00, 0x72, 0xCE)),
        ("North East Line", Color::rgb(0x9B, 0x26, 0xB6)),
        ("North South Line", Color::rgb(0xD4, 0x2E, 0x12)),
        ("Thomson East-Coast Line", Color::rgb(0x9D, 0x5B, 0x25)),
        ("East West Line", Color::rgb(0x00, 0x96, 0x45)),
        ("Circle Line", Color::rgb(0xFF, 0xDB, 0x58)),
    ].into_iter()
        .map(|(line, color)| (line.to_string(), color))
        .collect()
}

/// Colour of a line, black for lines without one.
pub fn line_color(palette: &HashMap<String, Color>, line: &str) -> Color {
    palette.get(line).copied().unwrap_or(Color::BLACK)
}

pub fn load_user_config(path: &Path) -> Result<UserConfig> {
    let file = File::open(path)
        .map_err(|err| format!("Could not open config file {}: {}", path.display(), err))?;
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_keys_fall_back_to_defaults() {
        let config: UserConfig = serde_json::from_str(r##"{
            "data_path": "fixtures",
            "line_colors": {"Circle Line": "#FFDB58"},
            "controls": ["line_select"],
            "session": [{"event": "line_selected", "value": "Circle Line"}]
        }"##).unwrap();

        assert_eq!(config.data_path, "fixtures");
        assert_eq!(config.view.fit_max_zoom, 15.0);
        assert_eq!(config.focus.inner_radius_m, 400.0);
        assert_eq!(config.files.bus_routes, "bus_routes.json");
        assert_eq!(config.controls, vec![Control::LineSelect]);
        assert_eq!(config.session.len(), 1);
        assert_eq!(line_color(&config.line_colors, "Circle Line"), Color::rgb(0xFF, 0xDB, 0x58));
        assert_eq!(line_color(&config.line_colors, "Jurong Region Line"), Color::BLACK);
    }

    #[test]
    fn default_palette_covers_six_lines() {
        let palette = default_line_colors();
        assert_eq!(palette.len(), 6);
        assert_eq!(line_color(&palette, "East West Line").to_hex(), "#009645");
    }

    #[test]
    fn shipped_config_only_names_files_that_exist() {
        let root = Path::new(env!("CARGO_MANIFEST_DIR"));
        let config = load_user_config(&root.join("config/singapore.json")).unwrap();
        if let Some(font_path) = &config.font_path {
            assert!(root.join(font_path).is_file(), "missing font {}", font_path);
        }
        assert!(!config.session.is_empty());
    }
}
