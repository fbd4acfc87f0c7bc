//! HTML for popups and the sidebar. Every piece of data text is escaped.

use std::fmt::Write;

use crate::data::semantic::{Attraction, BusStop, HawkerCenter, StationExit};
use crate::index::ServiceIndex;
use crate::ui::escape_html;

pub fn exit_popup(exit: &StationExit) -> String {
    format!(
        "<strong>{}</strong><br>Exit: {}",
        escape_html(&exit.station),
        escape_html(&exit.exit_label),
    )
}

pub fn stop_popup(stop: &BusStop, services: &ServiceIndex) -> String {
    format!(
        "<strong>{}</strong><br>{} ({})<br>Services: {}",
        escape_html(&stop.description),
        escape_html(&stop.road_name),
        escape_html(&stop.code),
        escape_html(&services.services_at(&stop.code).join(", ")),
    )
}

pub fn attraction_popup(attraction: &Attraction) -> String {
    format!(
        "<strong>{}</strong><br>{}",
        escape_html(&attraction.title),
        escape_html(&attraction.category),
    )
}

pub fn hawker_popup(hawker: &HawkerCenter) -> String {
    format!(
        "<strong>{}</strong><br>{}",
        escape_html(&hawker.name),
        escape_html(&hawker.address),
    )
}

fn website_link(website: &str) -> String {
    if website.is_empty() {
        String::new()
    } else {
        let website = escape_html(website);
        format!("<a href=\"{}\" target=\"_blank\">{}</a>", website, website)
    }
}

pub fn attraction_detail(attraction: &Attraction) -> String {
    format!(
        "<h3>{}</h3><p class=\"category\">{}</p><p class=\"address\">{}</p><p class=\"overview\">{}</p><p class=\"website\">{}</p>",
        escape_html(&attraction.title),
        escape_html(&attraction.category),
        escape_html(&attraction.address),
        escape_html(&attraction.overview),
        website_link(&attraction.website),
    )
}

pub fn hawker_detail(hawker: &HawkerCenter) -> String {
    format!(
        "<h3>{}</h3><p class=\"address\">{}</p><p class=\"description\">{}</p>",
        escape_html(&hawker.name),
        escape_html(&hawker.address),
        escape_html(&hawker.description),
    )
}

/// Nearby stops split into the inner and outer ring. `nearby` is closest first.
pub fn nearby_stops(nearby: &[(&BusStop, f64)], inner_radius_m: f64, outer_radius_m: f64, services: &ServiceIndex) -> String {
    let mut html = String::new();
    let (inner, outer): (Vec<_>, Vec<_>) = nearby.iter().partition(|(_, distance)| *distance <= inner_radius_m);
    for (radius, stops) in [(inner_radius_m, inner), (outer_radius_m, outer)] {
        let _ = write!(html, "<h4>Bus stops within {:.0} m</h4>", radius);
        if stops.is_empty() {
            html.push_str("<p>None</p>");
            continue;
        }
        html.push_str("<ul>");
        for (stop, distance) in stops {
            let _ = write!(
                html,
                "<li>{} ({}) {:.0} m: {}</li>",
                escape_html(&stop.description),
                escape_html(&stop.code),
                distance,
                escape_html(&services.services_at(&stop.code).join(", ")),
            );
        }
        html.push_str("</ul>");
    }
    html
}
