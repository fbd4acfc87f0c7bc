//! The state behind the map page and the handlers that change it.

mod panels;

use std::collections::HashMap;

use log::{debug, info};

use crate::config::{line_color, FocusConfig, UserConfig, ViewConfig};
use crate::data::{semantic::MapCoords, Collections};
use crate::filter::{filter_by_field, filter_indices_by_field, group_by, AttractionField, StationField};
use crate::index::{BusStopDirectory, SelectionOptions, ServiceIndex};
use crate::map::{Color, MapSurface, Marker, MarkerTarget, Overlay, OverlayId, Ring};
use crate::spatial::{self, Bounds};
use crate::ui::{Control, Controls, Sidebar, UiEvent, UiEventSource};

/// What the user currently has selected.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SelectionState {
    pub line: Option<String>,
    pub service: Option<String>,
    pub category: Option<String>,
    pub hawkers_visible: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusTarget {
    Attraction(usize),
    Hawker(usize),
}

/// A focused point and every overlay drawn for it.
#[derive(Debug, Clone, PartialEq)]
pub struct FocusedPoint {
    pub target: FocusTarget,
    pub position: MapCoords,
    highlight: OverlayId,
    rings: [OverlayId; 2],
    nearby_stops: Option<OverlayId>,
}

impl FocusedPoint {
    fn overlays(&self) -> impl Iterator<Item = OverlayId> + '_ {
        std::iter::once(self.highlight)
            .chain(self.rings)
            .chain(self.nearby_stops)
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub enum Focus {
    #[default]
    None,
    Focused(FocusedPoint),
}

#[derive(Debug, Default)]
struct Layers {
    line: Option<OverlayId>,
    service: Option<OverlayId>,
    attractions: Option<OverlayId>,
    hawkers: Option<OverlayId>,
}

impl Layers {
    fn take_all(&mut self) -> impl Iterator<Item = OverlayId> {
        [self.line.take(), self.service.take(), self.attractions.take(), self.hawkers.take()]
            .into_iter()
            .flatten()
    }
}

/// Owns the loaded data, the derived indexes, and everything the user has put on the
/// map. All mutation goes through the event handlers.
pub struct App<M: MapSurface> {
    map: M,
    collections: Collections,
    service_index: ServiceIndex,
    options: SelectionOptions,
    controls: Controls,
    sidebar: Sidebar,
    selection: SelectionState,
    layers: Layers,
    focus: Focus,
    view: ViewConfig,
    style: FocusConfig,
    line_colors: HashMap<String, Color>,
}

impl<M: MapSurface> App<M> {
    pub fn new(map: M, collections: Collections, config: &UserConfig) -> Self {
        let bus_ready = collections.bus_stops.is_ready() && collections.bus_routes.is_ready();
        let service_index = if bus_ready {
            ServiceIndex::build(collections.bus_routes.records())
        } else {
            ServiceIndex::default()
        };
        info!(stops = service_index.len(); "Built service index");

        let options = SelectionOptions::build(
            collections.station_exits.records(),
            if bus_ready { collections.bus_routes.records() } else { &[] },
            collections.attractions.records(),
        );

        let mut controls = Controls::with_present(&config.controls);
        controls.set_options(Control::LineSelect, options.lines.clone());
        controls.set_options(Control::ServiceSelect, options.services.clone());
        controls.set_options(Control::CategorySelect, options.categories.clone());
        let gates = [
            (Control::LineSelect, collections.station_exits.is_ready()),
            (Control::ServiceSelect, bus_ready),
            (Control::CategorySelect, collections.attractions.is_ready()),
            (Control::HawkerToggle, collections.hawker_centers.is_ready()),
            (Control::ClearButton, true),
        ];
        for (control, ready) in gates {
            if ready {
                controls.enable(control);
            }
        }

        App {
            map,
            collections,
            service_index,
            options,
            controls,
            sidebar: Sidebar::default(),
            selection: SelectionState::default(),
            layers: Layers::default(),
            focus: Focus::None,
            view: config.view.clone(),
            style: config.focus.clone(),
            line_colors: config.line_colors.clone(),
        }
    }

    pub fn map(&self) -> &M {
        &self.map
    }

    pub fn into_map(self) -> M {
        self.map
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    pub fn service_index(&self) -> &ServiceIndex {
        &self.service_index
    }

    pub fn options(&self) -> &SelectionOptions {
        &self.options
    }

    pub fn controls(&self) -> &Controls {
        &self.controls
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    /// Handles events until the source runs dry.
    pub fn run(&mut self, events: &mut dyn UiEventSource) {
        while let Some(event) = events.next_event() {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: UiEvent) {
        if let Some(control) = event.control() {
            if !self.controls.is_present(control) {
                debug!(control = format!("{:?}", control).as_str(); "Ignoring event from a control missing on the page");
                return;
            }
            if !self.controls.is_enabled(control) {
                debug!(control = format!("{:?}", control).as_str(); "Ignoring event from a disabled control");
                return;
            }
        }
        match event {
            UiEvent::LineSelected(line) => self.select_line(&line),
            UiEvent::ServiceSelected(service) => self.select_service(&service),
            UiEvent::CategorySelected(category) => self.select_category(&category),
            UiEvent::AttractionClicked(index) => self.focus_attraction(index),
            UiEvent::HawkerClicked(index) => self.focus_hawker(index),
            UiEvent::MapClicked => self.clear_focus(),
            UiEvent::ToggleHawkers => self.toggle_hawkers(),
            UiEvent::ClearMap => self.clear_map(),
        }
    }

    fn remove_layer(&mut self, layer: Option<OverlayId>) {
        if let Some(id) = layer {
            self.map.remove_overlay(id);
        }
    }

    fn fit_to(&mut self, markers: &[Marker]) {
        if let Some(bounds) = Bounds::around(markers.iter().map(|marker| &marker.position)) {
            self.map.fit_bounds(&bounds, self.view.fit_padding_px, self.view.fit_max_zoom);
        }
    }

    /// Shows every exit of the stations on `line`. An empty line just clears the layer.
    pub fn select_line(&mut self, line: &str) {
        self.controls.set_value(Control::LineSelect, line);
        let previous = self.layers.line.take();
        self.remove_layer(previous);
        if line.is_empty() {
            self.selection.line = None;
            return;
        }
        self.selection.line = Some(line.to_string());

        let color = line_color(&self.line_colors, line);
        let exits = filter_by_field(self.collections.station_exits.records(), StationField::Line, line);
        let stations = group_by(exits, |exit| exit.station.clone());
        let markers: Vec<Marker> = stations.iter()
            .flat_map(|group| group.members.iter())
            .map(|exit| Marker::new(exit.position, color, panels::exit_popup(exit)))
            .collect();
        info!(line = line, stations = stations.len(), exits = markers.len(); "Showing line");
        if markers.is_empty() {
            return;
        }

        self.fit_to(&markers);
        self.layers.line = Some(self.map.add_overlay(Overlay::Cluster(markers)));
    }

    /// Shows the stops a bus service calls at.
    pub fn select_service(&mut self, service: &str) {
        self.controls.set_value(Control::ServiceSelect, service);
        let previous = self.layers.service.take();
        self.remove_layer(previous);
        if service.is_empty() {
            self.selection.service = None;
            return;
        }
        self.selection.service = Some(service.to_string());

        let markers: Vec<Marker> = {
            let directory = BusStopDirectory::build(self.collections.bus_stops.records());
            directory.stops_for_service(self.collections.bus_routes.records(), service)
                .into_iter()
                .map(|stop| {
                    Marker::new(stop.position, self.style.service_color, panels::stop_popup(stop, &self.service_index))
                        .with_radius(8.0)
                })
                .collect()
        };
        info!(service = service, stops = markers.len(); "Showing bus service");
        if markers.is_empty() {
            return;
        }

        self.fit_to(&markers);
        self.layers.service = Some(self.map.add_overlay(Overlay::Cluster(markers)));
    }

    /// Shows the attractions in a category. Their markers can be clicked to focus them.
    pub fn select_category(&mut self, category: &str) {
        self.controls.set_value(Control::CategorySelect, category);
        let previous = self.layers.attractions.take();
        self.remove_layer(previous);
        if category.is_empty() {
            self.selection.category = None;
            return;
        }
        self.selection.category = Some(category.to_string());

        let attractions = self.collections.attractions.records();
        let markers: Vec<Marker> = filter_indices_by_field(attractions, AttractionField::Category, category)
            .into_iter()
            .map(|index| {
                let attraction = &attractions[index];
                Marker::new(attraction.position, self.style.attraction_color, panels::attraction_popup(attraction))
                    .with_radius(10.0)
                    .with_target(MarkerTarget::Attraction(index))
            })
            .collect();
        info!(category = category, attractions = markers.len(); "Showing attractions");
        if markers.is_empty() {
            return;
        }

        self.fit_to(&markers);
        self.layers.attractions = Some(self.map.add_overlay(Overlay::Layer(markers)));
    }

    pub fn toggle_hawkers(&mut self) {
        if self.selection.hawkers_visible {
            self.hide_hawkers();
            return;
        }
        let markers: Vec<Marker> = self.collections.hawker_centers.records()
            .iter()
            .enumerate()
            .map(|(index, hawker)| {
                Marker::new(hawker.position, self.style.hawker_color, panels::hawker_popup(hawker))
                    .with_radius(8.0)
                    .with_target(MarkerTarget::Hawker(index))
            })
            .collect();
        info!(hawkers = markers.len(); "Showing hawker centres");
        self.layers.hawkers = Some(self.map.add_overlay(Overlay::Layer(markers)));
        self.selection.hawkers_visible = true;
    }

    fn hide_hawkers(&mut self) {
        self.clear_focus();
        let previous = self.layers.hawkers.take();
        self.remove_layer(previous);
        self.selection.hawkers_visible = false;
    }

    pub fn focus_attraction(&mut self, index: usize) {
        let Some(attraction) = self.collections.attractions.records().get(index) else {
            debug!(index = index; "Ignoring click on an unknown attraction");
            return;
        };
        let shown = self.layers.attractions.is_some()
            && self.selection.category.as_deref() == Some(attraction.category.as_str());
        if !shown {
            debug!(index = index; "Ignoring click on an attraction that is not on the map");
            return;
        }
        let position = attraction.position;
        let popup = panels::attraction_popup(attraction);
        let detail = panels::attraction_detail(attraction);
        self.focus_on(FocusTarget::Attraction(index), position, self.style.attraction_color, popup, detail);
    }

    pub fn focus_hawker(&mut self, index: usize) {
        let Some(hawker) = self.collections.hawker_centers.records().get(index) else {
            debug!(index = index; "Ignoring click on an unknown hawker centre");
            return;
        };
        if self.layers.hawkers.is_none() {
            debug!(index = index; "Ignoring click on a hawker centre while the layer is hidden");
            return;
        }
        let position = hawker.position;
        let popup = panels::hawker_popup(hawker);
        let detail = panels::hawker_detail(hawker);
        self.focus_on(FocusTarget::Hawker(index), position, self.style.hawker_color, popup, detail);
    }

    fn focus_on(&mut self, target: FocusTarget, position: MapCoords, color: Color, popup: String, detail: String) {
        self.clear_focus();

        let highlight = self.map.add_overlay(Overlay::Marker(
            Marker::new(position, color, popup).with_radius(18.0)
        ));
        let outer = self.map.add_overlay(Overlay::Ring(Ring {
            center: position,
            radius_m: self.style.outer_radius_m,
            color: self.style.outer_color,
            fill_opacity: self.style.ring_opacity,
        }));
        let inner = self.map.add_overlay(Overlay::Ring(Ring {
            center: position,
            radius_m: self.style.inner_radius_m,
            color: self.style.inner_color,
            fill_opacity: self.style.ring_opacity,
        }));

        let nearby = spatial::nearby_with_distance(&position, self.style.outer_radius_m, self.collections.bus_stops.records());
        let stop_markers: Vec<Marker> = nearby.iter()
            .map(|(stop, _)| {
                Marker::new(stop.position, self.style.stop_color, panels::stop_popup(stop, &self.service_index))
                    .with_radius(6.0)
            })
            .collect();
        let panel = format!(
            "{}{}",
            detail,
            panels::nearby_stops(&nearby, self.style.inner_radius_m, self.style.outer_radius_m, &self.service_index),
        );
        info!(focus = format!("{:?}", target).as_str(), nearby_stops = stop_markers.len(); "Focused point");

        let nearby_stops = if stop_markers.is_empty() {
            None
        } else {
            Some(self.map.add_overlay(Overlay::Layer(stop_markers)))
        };
        self.sidebar.show(panel);
        self.focus = Focus::Focused(FocusedPoint {
            target,
            position,
            highlight,
            rings: [outer, inner],
            nearby_stops,
        });
    }

    /// Removes the focused point and everything drawn for it. Does nothing when no point
    /// is focused.
    pub fn clear_focus(&mut self) {
        if let Focus::Focused(point) = std::mem::take(&mut self.focus) {
            for id in point.overlays() {
                self.map.remove_overlay(id);
            }
            self.sidebar.clear();
            debug!("Cleared focus");
        }
    }

    pub fn clear_map(&mut self) {
        self.clear_focus();
        let layers: Vec<OverlayId> = self.layers.take_all().collect();
        for id in layers {
            self.map.remove_overlay(id);
        }
        self.selection = SelectionState::default();
        self.controls.reset_values();
        self.sidebar.clear();
        info!("Cleared map");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasets::{fixtures, load_all, DatasetFiles, StaticSource};
    use crate::map::RecordingMap;
    use crate::ui::ScriptedEvents;

    fn app() -> App<RecordingMap> {
        let collections = load_all(&fixtures::source(), &DatasetFiles::default());
        App::new(RecordingMap::new(), collections, &UserConfig::default())
    }

    fn only_overlay(app: &App<RecordingMap>) -> &Overlay {
        assert_eq!(app.map().overlay_count(), 1);
        app.map().overlays().next().unwrap().1
    }

    #[test]
    fn controls_are_enabled_and_filled_after_load() {
        let app = app();

        for control in Control::ALL {
            assert!(app.controls().is_enabled(control), "{:?} should be enabled", control);
        }
        assert_eq!(app.options().lines, vec!["Circle Line", "Downtown Line", "North South Line"]);
        assert_eq!(app.options().services, vec!["2", "10e", "12"]);
        assert_eq!(app.controls().get(Control::CategorySelect).unwrap().options, vec!["Nature", "Shopping"]);
        assert_eq!(app.service_index().services_at("A1"), vec!["2", "12"]);
    }

    #[test]
    fn unavailable_data_keeps_controls_disabled() {
        let source = StaticSource::new().with_file("bus_stops.json", fixtures::BUS_STOPS);
        let collections = load_all(&source, &DatasetFiles::default());
        let mut app = App::new(RecordingMap::new(), collections, &UserConfig::default());

        assert!(!app.controls().is_enabled(Control::LineSelect));
        assert!(!app.controls().is_enabled(Control::ServiceSelect));
        assert!(app.controls().is_enabled(Control::ClearButton));
        assert!(app.service_index().is_empty());

        app.handle(UiEvent::LineSelected("Circle Line".to_string()));
        app.handle(UiEvent::ToggleHawkers);
        assert_eq!(app.map().overlay_count(), 0);
        assert_eq!(app.selection(), &SelectionState::default());
    }

    #[test]
    fn line_selection_clusters_exits_and_fits_view() {
        let mut app = app();
        app.handle(UiEvent::LineSelected("North South Line".to_string()));

        match only_overlay(&app) {
            Overlay::Cluster(markers) => {
                assert_eq!(markers.len(), 3);
                assert!(markers.iter().all(|marker| marker.color == Color::rgb(0xD4, 0x2E, 0x12)));
                assert_eq!(markers[0].popup, "<strong>Bishan</strong><br>Exit: A");
                assert_eq!(markers[2].popup, "<strong>Orchard</strong><br>Exit: C");
            },
            other => panic!("expected a cluster, got {:?}", other),
        }
        assert_eq!(app.map().fits.len(), 1);
        assert_eq!(app.controls().get(Control::LineSelect).unwrap().value, "North South Line");

        app.handle(UiEvent::LineSelected("Circle Line".to_string()));
        assert_eq!(only_overlay(&app).markers().len(), 3);

        app.handle(UiEvent::LineSelected(String::new()));
        assert_eq!(app.map().overlay_count(), 0);
        assert_eq!(app.selection().line, None);
    }

    #[test]
    fn line_without_exits_draws_nothing_and_keeps_view() {
        let mut app = app();
        app.handle(UiEvent::LineSelected("Thomson East-Coast Line".to_string()));

        assert_eq!(app.map().overlay_count(), 0);
        assert!(app.map().fits.is_empty());
        assert_eq!(app.selection().line.as_deref(), Some("Thomson East-Coast Line"));
    }

    #[test]
    fn unknown_line_colour_falls_back_to_black() {
        let mut config = UserConfig::default();
        config.line_colors.clear();
        let collections = load_all(&fixtures::source(), &DatasetFiles::default());
        let mut app = App::new(RecordingMap::new(), collections, &config);
        app.handle(UiEvent::LineSelected("Downtown Line".to_string()));

        assert!(only_overlay(&app).markers().iter().all(|marker| marker.color == Color::BLACK));
    }

    #[test]
    fn service_selection_shows_its_stops() {
        let mut app = app();
        app.handle(UiEvent::ServiceSelected("12".to_string()));

        let markers = only_overlay(&app).markers();
        assert_eq!(markers.len(), 2);
        assert!(markers[0].popup.contains("(A1)"));
        assert!(markers[0].popup.ends_with("Services: 2, 12"));

        app.handle(UiEvent::ServiceSelected("999".to_string()));
        assert_eq!(app.map().overlay_count(), 0);
    }

    #[test]
    fn focusing_an_attraction_draws_rings_and_nearby_stops() {
        let mut app = app();
        app.handle(UiEvent::CategorySelected("Shopping".to_string()));
        let attraction_layer = app.map().overlay_count();
        app.handle(UiEvent::AttractionClicked(0));

        // highlight, two rings and the nearby stops
        assert_eq!(app.map().overlay_count(), attraction_layer + 4);
        let mut radii: Vec<f64> = app.map().rings().iter().map(|ring| ring.radius_m).collect();
        radii.sort_by(f64::total_cmp);
        assert_eq!(radii, vec![400.0, 800.0]);
        assert!(app.sidebar().html.starts_with("<h3>Orchard Walk</h3>"));
        assert!(app.sidebar().html.contains("Opp Orchard Stn (A1)"));
        assert!(!app.sidebar().html.contains("(C3)"));
        match app.focus() {
            Focus::Focused(point) => assert_eq!(point.target, FocusTarget::Attraction(0)),
            Focus::None => panic!("attraction should be focused"),
        }
    }

    #[test]
    fn refocusing_releases_the_previous_focus() {
        let mut app = app();
        app.handle(UiEvent::CategorySelected("Shopping".to_string()));
        app.handle(UiEvent::AttractionClicked(0));
        let focused = app.map().overlay_count();
        app.handle(UiEvent::CategorySelected("Nature".to_string()));
        app.handle(UiEvent::AttractionClicked(1));

        // Bishan Park has no stop within 800 m.
        assert_eq!(app.map().overlay_count(), focused - 1);
        assert_eq!(app.map().rings().len(), 2);
        assert!(app.sidebar().html.contains("Bishan Park"));
    }

    #[test]
    fn clearing_focus_twice_leaves_nothing_behind() {
        let mut app = app();
        app.handle(UiEvent::CategorySelected("Shopping".to_string()));
        app.handle(UiEvent::AttractionClicked(0));
        assert_eq!(app.map().overlay_count(), 5);

        app.handle(UiEvent::MapClicked);
        app.handle(UiEvent::MapClicked);
        app.clear_focus();

        // Only the attraction layer is left.
        assert_eq!(app.map().overlay_count(), 1);
        assert_eq!(app.focus(), &Focus::None);
        assert!(app.sidebar().is_empty());
    }

    #[test]
    fn hiding_hawkers_clears_focus() {
        let mut app = app();
        app.handle(UiEvent::ToggleHawkers);
        assert!(app.selection().hawkers_visible);
        assert_eq!(only_overlay(&app).markers()[0].target, Some(MarkerTarget::Hawker(0)));

        app.handle(UiEvent::HawkerClicked(0));
        assert!(matches!(app.focus(), Focus::Focused(FocusedPoint { target: FocusTarget::Hawker(0), .. })));

        app.handle(UiEvent::ToggleHawkers);
        assert_eq!(app.map().overlay_count(), 0);
        assert_eq!(app.focus(), &Focus::None);
        assert!(!app.selection().hawkers_visible);
    }

    #[test]
    fn clicks_on_unknown_points_are_ignored() {
        let mut app = app();
        app.handle(UiEvent::AttractionClicked(42));
        app.handle(UiEvent::HawkerClicked(7));

        assert_eq!(app.map().overlay_count(), 0);
        assert_eq!(app.focus(), &Focus::None);
    }

    #[test]
    fn clicks_on_markers_not_on_the_map_are_ignored() {
        let mut config = UserConfig::default();
        config.controls = vec![Control::LineSelect];
        let collections = load_all(&fixtures::source(), &DatasetFiles::default());
        let mut app = App::new(RecordingMap::new(), collections, &config);

        app.handle(UiEvent::HawkerClicked(0));
        app.handle(UiEvent::AttractionClicked(1));
        assert_eq!(app.focus(), &Focus::None);
        assert_eq!(app.map().overlay_count(), 0);
        assert!(app.sidebar().is_empty());
    }

    #[test]
    fn clicks_on_attractions_outside_the_selected_category_are_ignored() {
        let mut app = app();
        app.handle(UiEvent::CategorySelected("Shopping".to_string()));
        app.handle(UiEvent::AttractionClicked(1));
        assert_eq!(app.focus(), &Focus::None);
        assert_eq!(app.map().overlay_count(), 1);

        app.handle(UiEvent::ToggleHawkers);
        app.handle(UiEvent::ToggleHawkers);
        app.handle(UiEvent::HawkerClicked(0));
        assert_eq!(app.focus(), &Focus::None);
    }

    #[test]
    fn missing_controls_are_no_ops() {
        let mut config = UserConfig::default();
        config.controls = vec![Control::LineSelect];
        let collections = load_all(&fixtures::source(), &DatasetFiles::default());
        let mut app = App::new(RecordingMap::new(), collections, &config);

        app.handle(UiEvent::ToggleHawkers);
        app.handle(UiEvent::CategorySelected("Nature".to_string()));
        assert_eq!(app.map().overlay_count(), 0);

        app.handle(UiEvent::LineSelected("Circle Line".to_string()));
        app.handle(UiEvent::ClearMap);
        assert_eq!(app.map().overlay_count(), 1);
    }

    #[test]
    fn clear_map_resets_everything() {
        let mut app = app();
        let mut session = ScriptedEvents::new(vec![
            UiEvent::LineSelected("Circle Line".to_string()),
            UiEvent::ServiceSelected("12".to_string()),
            UiEvent::CategorySelected("Nature".to_string()),
            UiEvent::ToggleHawkers,
            UiEvent::HawkerClicked(0),
        ]);
        app.run(&mut session);
        assert!(app.map().overlay_count() >= 5);

        app.handle(UiEvent::ClearMap);

        assert_eq!(app.map().overlay_count(), 0);
        assert_eq!(app.selection(), &SelectionState::default());
        assert_eq!(app.focus(), &Focus::None);
        assert!(app.sidebar().is_empty());
        assert_eq!(app.controls().get(Control::LineSelect).unwrap().value, "");

        app.handle(UiEvent::ClearMap);
        assert_eq!(app.map().overlay_count(), 0);
    }
}
