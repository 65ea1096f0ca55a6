use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::modules::grid::{Coord, Properties, Tile, TileKind};

/// Last-known state of one coordinate, as carried in reports and knowledge pushes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TileSummary {
    #[serde(rename = "type")]
    pub kind: TileKind,
    pub position: Coord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
}

impl TileSummary {
    pub fn new(kind: TileKind, position: Coord) -> Self {
        Self {
            kind,
            position,
            properties: None,
        }
    }

    pub fn obstacle(position: Coord) -> Self {
        Self::new(TileKind::Obstacle, position)
    }

    /// Summary of a sensed tile. HSS emitters are never revealed and read as EMPTY;
    /// only TARGET tiles keep their properties.
    pub fn sensed(tile: &Tile) -> Self {
        let kind = match tile.kind {
            TileKind::Hss => TileKind::Empty,
            other => other,
        };
        let properties = (tile.kind == TileKind::Target).then(|| tile.properties.clone());
        Self {
            kind,
            position: tile.position,
            properties,
        }
    }
}

/// Coordinate-keyed belief about tile contents. Entries are only ever added or
/// overwritten, never removed.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<TileSummary>", into = "Vec<TileSummary>")]
pub struct KnowledgeStore {
    tiles: HashMap<Coord, TileSummary>,
}

impl KnowledgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or overwrites the entry at the summary's position.
    pub fn insert(&mut self, summary: TileSummary) {
        self.tiles.insert(summary.position, summary);
    }

    /// Inserts only when nothing is known about the coordinate yet.
    /// Returns whether the entry was added.
    pub fn insert_if_absent(&mut self, summary: TileSummary) -> bool {
        if self.tiles.contains_key(&summary.position) {
            return false;
        }
        self.tiles.insert(summary.position, summary);
        true
    }

    pub fn record_obstacle(&mut self, at: Coord) {
        self.insert(TileSummary::obstacle(at));
    }

    pub fn get(&self, at: Coord) -> Option<&TileSummary> {
        self.tiles.get(&at)
    }

    /// Unknown coordinates are not obstacles.
    pub fn is_known_obstacle(&self, at: Coord) -> bool {
        self.tiles
            .get(&at)
            .is_some_and(|t| t.kind == TileKind::Obstacle)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TileSummary> {
        self.tiles.values()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.values().filter(|t| t.kind == kind).count()
    }
}

impl From<Vec<TileSummary>> for KnowledgeStore {
    fn from(entries: Vec<TileSummary>) -> Self {
        let mut store = KnowledgeStore::new();
        for entry in entries {
            store.insert(entry);
        }
        store
    }
}

impl From<KnowledgeStore> for Vec<TileSummary> {
    fn from(store: KnowledgeStore) -> Self {
        let mut entries: Vec<TileSummary> = store.tiles.into_values().collect();
        entries.sort_by_key(|t| t.position);
        entries
    }
}

/// Circular danger region. Precise zones come from a confirmed emitter location,
/// legacy zones are an approximate center. Both are closed disks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ThreatZone {
    Precise { hss_location: Coord, radius: f64 },
    Legacy { center: Coord, radius: f64 },
}

impl ThreatZone {
    pub fn precise(hss_location: Coord, radius: f64) -> Self {
        ThreatZone::Precise {
            hss_location,
            radius,
        }
    }

    pub fn legacy(center: Coord, radius: f64) -> Self {
        ThreatZone::Legacy { center, radius }
    }

    pub fn center(&self) -> Coord {
        match self {
            ThreatZone::Precise { hss_location, .. } => *hss_location,
            ThreatZone::Legacy { center, .. } => *center,
        }
    }

    pub fn radius(&self) -> f64 {
        match self {
            ThreatZone::Precise { radius, .. } | ThreatZone::Legacy { radius, .. } => *radius,
        }
    }

    pub fn is_precise(&self) -> bool {
        matches!(self, ThreatZone::Precise { .. })
    }

    /// Squared-distance disk test, boundary inclusive.
    pub fn contains(&self, at: Coord) -> bool {
        let radius = self.radius();
        self.center().distance_sq(at) as f64 <= radius * radius
    }
}

pub fn in_any_zone(zones: &[ThreatZone], at: Coord) -> bool {
    zones.iter().any(|zone| zone.contains(at))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sensed_hss_reads_as_empty_without_properties() {
        let mut tile = Tile::new(TileKind::Hss, Coord::new(4, 4));
        tile.properties.insert("kill_zone_radius".into(), json!(6));
        let summary = TileSummary::sensed(&tile);
        assert_eq!(summary.kind, TileKind::Empty);
        assert!(summary.properties.is_none());
    }

    #[test]
    fn sensed_target_keeps_properties() {
        let mut tile = Tile::new(TileKind::Target, Coord::new(1, 2));
        tile.properties.insert("target_id".into(), json!("Target-1"));
        let summary = TileSummary::sensed(&tile);
        assert_eq!(summary.kind, TileKind::Target);
        assert_eq!(
            summary.properties.as_ref().and_then(|p| p.get("target_id")),
            Some(&json!("Target-1"))
        );

        let mut base = Tile::new(TileKind::Base, Coord::new(0, 0));
        base.properties.insert("note".into(), json!("ignored"));
        assert!(TileSummary::sensed(&base).properties.is_none());
    }

    #[test]
    fn store_overwrites_and_never_forgets() {
        let mut store = KnowledgeStore::new();
        store.insert(TileSummary::new(TileKind::Empty, Coord::new(1, 1)));
        store.record_obstacle(Coord::new(1, 1));
        assert_eq!(store.len(), 1);
        assert!(store.is_known_obstacle(Coord::new(1, 1)));
        assert!(!store.is_known_obstacle(Coord::new(2, 2)));

        assert!(!store.insert_if_absent(TileSummary::new(TileKind::Empty, Coord::new(1, 1))));
        assert!(store.is_known_obstacle(Coord::new(1, 1)));
        assert!(store.insert_if_absent(TileSummary::new(TileKind::Base, Coord::new(0, 0))));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn store_serializes_as_sorted_tile_list() {
        let mut store = KnowledgeStore::new();
        store.record_obstacle(Coord::new(3, 0));
        store.insert(TileSummary::new(TileKind::Base, Coord::new(0, 1)));

        let value = serde_json::to_value(&store).unwrap();
        assert_eq!(
            value,
            json!([
                {"type": "BASE", "position": {"x": 0, "y": 1}},
                {"type": "OBSTACLE", "position": {"x": 3, "y": 0}}
            ])
        );

        let back: KnowledgeStore = serde_json::from_value(value).unwrap();
        assert_eq!(back, store);
    }

    #[test]
    fn zone_shapes_share_disk_membership() {
        let zones: Vec<ThreatZone> = serde_json::from_value(json!([
            {"hss_location": {"x": 5, "y": 5}, "radius": 2, "confidence": "CONFIRMED"},
            {"center": {"x": 20, "y": 20}, "radius": 1.5}
        ]))
        .unwrap();

        assert!(zones[0].is_precise());
        assert!(!zones[1].is_precise());

        assert!(zones[0].contains(Coord::new(5, 7)), "boundary is inside");
        assert!(zones[0].contains(Coord::new(6, 6)));
        assert!(!zones[0].contains(Coord::new(7, 7)));

        assert!(zones[1].contains(Coord::new(21, 21)));
        assert!(!zones[1].contains(Coord::new(22, 20)));

        assert!(in_any_zone(&zones, Coord::new(4, 5)));
        assert!(!in_any_zone(&zones, Coord::new(0, 0)));
    }
}
