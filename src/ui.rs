//! The page around the map: selection controls, buttons, and the sidebar.

use std::collections::{HashMap, VecDeque};

use serde::Deserialize;

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Control {
    LineSelect,
    ServiceSelect,
    CategorySelect,
    HawkerToggle,
    ClearButton,
}

impl Control {
    pub const ALL: [Control; 5] = [
        Control::LineSelect,
        Control::ServiceSelect,
        Control::CategorySelect,
        Control::HawkerToggle,
        Control::ClearButton,
    ];
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event", content = "value", rename_all = "snake_case")]
pub enum UiEvent {
    LineSelected(String),
    ServiceSelected(String),
    CategorySelected(String),
    /// Index into the attractions collection.
    AttractionClicked(usize),
    /// Index into the hawker centre collection.
    HawkerClicked(usize),
    MapClicked,
    ToggleHawkers,
    ClearMap,
}

impl UiEvent {
    /// The control an event comes from, if any. Marker and map clicks come from the map.
    pub fn control(&self) -> Option<Control> {
        match self {
            UiEvent::LineSelected(_) => Some(Control::LineSelect),
            UiEvent::ServiceSelected(_) => Some(Control::ServiceSelect),
            UiEvent::CategorySelected(_) => Some(Control::CategorySelect),
            UiEvent::ToggleHawkers => Some(Control::HawkerToggle),
            UiEvent::ClearMap => Some(Control::ClearButton),
            UiEvent::AttractionClicked(_) | UiEvent::HawkerClicked(_) | UiEvent::MapClicked => None,
        }
    }
}

pub trait UiEventSource {
    fn next_event(&mut self) -> Option<UiEvent>;
}

/// Replays a fixed list of events.
#[derive(Debug, Default)]
pub struct ScriptedEvents {
    events: VecDeque<UiEvent>,
}

impl ScriptedEvents {
    pub fn new(events: impl IntoIterator<Item = UiEvent>) -> Self {
        ScriptedEvents { events: events.into_iter().collect() }
    }
}

impl UiEventSource for ScriptedEvents {
    fn next_event(&mut self) -> Option<UiEvent> {
        self.events.pop_front()
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct ControlState {
    pub enabled: bool,
    pub value: String,
    pub options: Vec<String>,
}

/// The controls present on the page. Every control starts disabled and is enabled once
/// the data behind it has loaded; it is never disabled again.
#[derive(Debug, Default, Clone)]
pub struct Controls {
    states: HashMap<Control, ControlState>,
}

impl Controls {
    pub fn with_present(present: &[Control]) -> Self {
        Controls {
            states: present.iter().map(|control| (*control, ControlState::default())).collect(),
        }
    }

    pub fn is_present(&self, control: Control) -> bool {
        self.states.contains_key(&control)
    }

    pub fn is_enabled(&self, control: Control) -> bool {
        self.states.get(&control).is_some_and(|state| state.enabled)
    }

    pub fn get(&self, control: Control) -> Option<&ControlState> {
        self.states.get(&control)
    }

    pub fn enable(&mut self, control: Control) {
        if let Some(state) = self.states.get_mut(&control) {
            state.enabled = true;
        }
    }

    pub fn set_options(&mut self, control: Control, options: Vec<String>) {
        if let Some(state) = self.states.get_mut(&control) {
            state.options = options;
        }
    }

    pub fn set_value(&mut self, control: Control, value: &str) {
        if let Some(state) = self.states.get_mut(&control) {
            state.value = value.to_string();
        }
    }

    pub fn reset_values(&mut self) {
        for state in self.states.values_mut() {
            state.value.clear();
        }
    }
}

/// Detail panel next to the map.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Sidebar {
    pub html: String,
}

impl Sidebar {
    pub fn show(&mut self, html: String) {
        self.html = html;
    }

    pub fn clear(&mut self) {
        self.html.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_empty()
    }
}

/// Escapes text for use inside popup and sidebar HTML.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
