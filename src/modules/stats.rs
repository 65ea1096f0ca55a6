use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::modules::drone::DroneEvent;
use crate::modules::view::DATA_DIR;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStats {
    pub move_count: u64,
    pub collision_count: u64,
    pub replan_count: u64,
    pub no_path_count: u64,
    pub scan_count: u64,
    pub opportunistic_scan_count: u64,
    pub recharge_count: u64,
    pub arrival_count: u64,
    pub destroyed: bool,
}

impl ActionStats {
    pub fn record(&mut self, event: &DroneEvent) {
        match event {
            DroneEvent::Moved { .. } => self.move_count = self.move_count.saturating_add(1),
            DroneEvent::Collided { .. } => {
                self.collision_count = self.collision_count.saturating_add(1)
            }
            DroneEvent::PathPlanned { .. } => self.replan_count = self.replan_count.saturating_add(1),
            DroneEvent::NoPath { .. } => self.no_path_count = self.no_path_count.saturating_add(1),
            DroneEvent::Scanned { opportunistic, .. } => {
                self.scan_count = self.scan_count.saturating_add(1);
                if *opportunistic {
                    self.opportunistic_scan_count = self.opportunistic_scan_count.saturating_add(1);
                }
            }
            DroneEvent::Recharged { .. } => {
                self.recharge_count = self.recharge_count.saturating_add(1)
            }
            DroneEvent::Arrived { .. } => self.arrival_count = self.arrival_count.saturating_add(1),
            DroneEvent::Destroyed => self.destroyed = true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionStatsStore {
    pub per_drone: BTreeMap<String, ActionStats>,
}

impl ActionStatsStore {
    pub fn record(&mut self, drone_id: &str, event: &DroneEvent) {
        self.per_drone
            .entry(drone_id.to_string())
            .or_default()
            .record(event);
    }

    /// Kill-zone losses never pass through the drone's own event stream.
    pub fn mark_destroyed(&mut self, drone_id: &str) {
        self.per_drone
            .entry(drone_id.to_string())
            .or_default()
            .destroyed = true;
    }
}

fn stats_path_in(root: &Path) -> PathBuf {
    root.join("action_stats.json")
}

pub fn load_action_stats_in(root: &Path) -> io::Result<ActionStatsStore> {
    let path = stats_path_in(root);
    if !path.exists() {
        return Ok(ActionStatsStore::default());
    }

    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(ActionStatsStore::default());
    }

    let store: ActionStatsStore = serde_json::from_slice(&bytes)?;
    Ok(store)
}

pub fn save_action_stats_in(root: &Path, store: &ActionStatsStore) -> io::Result<()> {
    fs::create_dir_all(root)?;
    let json = serde_json::to_vec_pretty(store)?;
    fs::write(stats_path_in(root), json)?;
    Ok(())
}

pub fn load_action_stats() -> io::Result<ActionStatsStore> {
    load_action_stats_in(Path::new(DATA_DIR))
}

pub fn save_action_stats(store: &ActionStatsStore) -> io::Result<()> {
    save_action_stats_in(Path::new(DATA_DIR), store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::grid::Coord;

    #[test]
    fn counts_follow_drone_events() {
        let mut store = ActionStatsStore::default();
        let events = [
            DroneEvent::PathPlanned {
                target: Coord::new(3, 0),
                hops: 3,
            },
            DroneEvent::Moved {
                from: Coord::new(0, 0),
                to: Coord::new(1, 0),
            },
            DroneEvent::Scanned {
                at: Coord::new(1, 0),
                tiles: 9,
                opportunistic: true,
            },
            DroneEvent::Collided { at: Coord::new(2, 0) },
        ];
        for event in &events {
            store.record("D-1", event);
        }
        store.mark_destroyed("D-2");

        let d1 = &store.per_drone["D-1"];
        assert_eq!(d1.move_count, 1);
        assert_eq!(d1.scan_count, 1);
        assert_eq!(d1.opportunistic_scan_count, 1);
        assert_eq!(d1.collision_count, 1);
        assert_eq!(d1.replan_count, 1);
        assert!(!d1.destroyed);
        assert!(store.per_drone["D-2"].destroyed);
    }

    #[test]
    fn persists_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            load_action_stats_in(dir.path()).unwrap(),
            ActionStatsStore::default()
        );

        let mut store = ActionStatsStore::default();
        store.record("D-4", &DroneEvent::Recharged { battery: 50.0 });
        save_action_stats_in(dir.path(), &store).unwrap();

        let back = load_action_stats_in(dir.path()).unwrap();
        assert_eq!(back.per_drone["D-4"].recharge_count, 1);
    }
}
