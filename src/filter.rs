use std::{collections::HashMap, hash::Hash};

use crate::data::semantic::{Attraction, BusRoute, StationExit};

/// Records that can be narrowed down by one of their fields.
pub trait Filterable {
    type Field: Copy;

    fn field_matches(&self, field: Self::Field, value: &str) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StationField {
    /// Membership in the exit's list of lines.
    Line,
    Station,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteField {
    ServiceNo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttractionField {
    Category,
}

impl Filterable for StationExit {
    type Field = StationField;

    fn field_matches(&self, field: StationField, value: &str) -> bool {
        match field {
            StationField::Line => self.serves_line(value),
            StationField::Station => self.station == value,
        }
    }
}

impl Filterable for BusRoute {
    type Field = RouteField;

    fn field_matches(&self, field: RouteField, value: &str) -> bool {
        match field {
            RouteField::ServiceNo => self.service_no == value,
        }
    }
}

impl Filterable for Attraction {
    type Field = AttractionField;

    fn field_matches(&self, field: AttractionField, value: &str) -> bool {
        match field {
            AttractionField::Category => self.category == value,
        }
    }
}

/// Records whose `field` matches `value`, in input order. An empty `value` means no
/// filter and returns every record.
pub fn filter_by_field<'a, T: Filterable>(records: &'a [T], field: T::Field, value: &str) -> Vec<&'a T> {
    if value.is_empty() {
        return records.iter().collect();
    }
    records.iter()
        .filter(|record| record.field_matches(field, value))
        .collect()
}

/// Positions of the records `filter_by_field` would return.
pub fn filter_indices_by_field<T: Filterable>(records: &[T], field: T::Field, value: &str) -> Vec<usize> {
    records.iter()
        .enumerate()
        .filter(|(_, record)| value.is_empty() || record.field_matches(field, value))
        .map(|(position, _)| position)
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Group<K, T> {
    pub key: K,
    pub members: Vec<T>,
}

/// Groups records by key. Keys keep the order they were first seen in, members keep
/// their input order.
pub fn group_by<K, T, F>(records: impl IntoIterator<Item = T>, key_fn: F) -> Vec<Group<K, T>>
where
    K: Eq + Hash + Clone,
    F: Fn(&T) -> K,
{
    let mut groups: Vec<Group<K, T>> = Vec::new();
    let mut positions: HashMap<K, usize> = HashMap::new();
    for record in records {
        let key = key_fn(&record);
        match positions.get(&key) {
            Some(&position) => groups[position].members.push(record),
            None => {
                positions.insert(key.clone(), groups.len());
                groups.push(Group { key, members: vec![record] });
            },
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::semantic::MapCoords;

    fn exit(station: &str, lines: &[&str], label: &str) -> StationExit {
        StationExit {
            station: station.to_string(),
            lines: lines.iter().map(|line| line.to_string()).collect(),
            position: MapCoords::new(1.3, 103.8),
            exit_label: label.to_string(),
        }
    }

    fn exits() -> Vec<StationExit> {
        vec![
            exit("Bishan", &["North South Line", "Circle Line"], "A"),
            exit("Orchard", &["North South Line"], "A"),
            exit("Bishan", &["North South Line", "Circle Line"], "B"),
            exit("Botanic Gardens", &["Circle Line", "Downtown Line"], "A"),
            exit("Orchard", &["North South Line"], "B"),
        ]
    }

    #[test]
    fn empty_value_returns_everything_in_order() {
        let exits = exits();
        let all = filter_by_field(&exits, StationField::Line, "");

        assert_eq!(all.len(), exits.len());
        assert!(all.iter().zip(exits.iter()).all(|(a, b)| std::ptr::eq(*a, b)));
    }

    #[test]
    fn line_filter_uses_membership() {
        let exits = exits();
        let circle = filter_by_field(&exits, StationField::Line, "Circle Line");

        let names: Vec<&str> = circle.iter().map(|exit| exit.station.as_str()).collect();
        assert_eq!(names, vec!["Bishan", "Bishan", "Botanic Gardens"]);
        assert!(filter_by_field(&exits, StationField::Line, "Circle").is_empty());
        assert!(filter_by_field(&exits, StationField::Line, "Thomson East-Coast Line").is_empty());
    }

    #[test]
    fn indices_agree_with_filtered_records() {
        let exits = exits();
        let indices = filter_indices_by_field(&exits, StationField::Station, "Orchard");

        assert_eq!(indices, vec![1, 4]);
        assert_eq!(filter_indices_by_field(&exits, StationField::Station, "").len(), exits.len());
    }

    #[test]
    fn filter_does_not_touch_input() {
        let exits = exits();
        let before = exits.clone();
        let _ = filter_by_field(&exits, StationField::Station, "Orchard");
        assert_eq!(exits, before);
    }

    #[test]
    fn group_by_keeps_first_seen_order() {
        let exits = exits();
        let north_south = filter_by_field(&exits, StationField::Line, "North South Line");
        let groups = group_by(north_south.iter().copied(), |exit| exit.station.clone());

        let keys: Vec<&str> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(keys, vec!["Bishan", "Orchard"]);
        let bishan: Vec<&str> = groups[0].members.iter().map(|exit| exit.exit_label.as_str()).collect();
        assert_eq!(bishan, vec!["A", "B"]);
    }

    #[test]
    fn flattened_groups_hold_every_record_once() {
        let exits = exits();
        let groups = group_by(exits.iter(), |exit| exit.station.clone());
        let flattened: Vec<&StationExit> = groups.into_iter().flat_map(|group| group.members).collect();

        assert_eq!(flattened.len(), exits.len());
        for exit in &exits {
            assert_eq!(flattened.iter().filter(|other| std::ptr::eq(**other, exit)).count(), 1);
        }
    }

    #[test]
    fn group_by_on_nothing_is_empty() {
        let groups: Vec<Group<String, &StationExit>> = group_by(Vec::<&StationExit>::new(), |exit| exit.station.clone());
        assert!(groups.is_empty());
    }
}
