use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::modules::command::ScanMode;
use crate::modules::controller::Controller;
use crate::modules::drone::DroneStatus;
use crate::modules::grid::{Coord, GridAccessor, TileKind};
use crate::modules::knowledge::ThreatZone;
use crate::modules::simulation::Simulation;

pub const DATA_DIR: &str = ".dronefleet";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DroneSnapshot {
    pub id: String,
    pub status: DroneStatus,
    pub position: Coord,
    pub battery: f64,
    pub scan_mode: ScanMode,
    pub command: String,
    pub path_len: usize,
    pub known_tiles: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FleetSnapshot {
    pub tick: u64,
    pub captured_at: String,
    pub width: i32,
    pub height: i32,
    pub missiles_left: u32,
    pub targets_remaining: usize,
    pub drones: Vec<DroneSnapshot>,
    #[serde(default)]
    pub known_targets: BTreeMap<String, Coord>,
    #[serde(default)]
    pub threat_zones: Vec<ThreatZone>,
    /// Ground truth with drones overlaid: `D` active, `x` destroyed.
    #[serde(default)]
    pub map: Vec<String>,
}

impl FleetSnapshot {
    pub fn capture<C: Controller>(sim: &Simulation<C>) -> Self {
        let grid = sim.grid();
        let drones: Vec<DroneSnapshot> = sim
            .drones()
            .iter()
            .map(|d| DroneSnapshot {
                id: d.id().to_string(),
                status: d.status(),
                position: d.position(),
                battery: (d.battery() * 100.0).round() / 100.0,
                scan_mode: d.scan_mode(),
                command: d.command().label().to_string(),
                path_len: d.path().count(),
                known_tiles: d.knowledge().len(),
            })
            .collect();

        let map = grid
            .render_with(|at| {
                let mut here = drones.iter().filter(|d| d.position == at);
                let first = here.next()?;
                let alive = first.status != DroneStatus::Destroyed
                    || here.any(|d| d.status != DroneStatus::Destroyed);
                Some(if alive { 'D' } else { 'x' })
            })
            .lines()
            .map(str::to_string)
            .collect();

        let world = sim.controller().world();
        Self {
            tick: sim.tick(),
            captured_at: Utc::now().to_rfc3339(),
            width: grid.width(),
            height: grid.height(),
            missiles_left: sim.missiles().remaining(),
            targets_remaining: grid.count(TileKind::Target),
            drones,
            known_targets: world.known_targets().clone(),
            threat_zones: world.threat_zones().to_vec(),
            map,
        }
    }

    pub fn active_drones(&self) -> usize {
        self.drones
            .iter()
            .filter(|d| d.status != DroneStatus::Destroyed)
            .count()
    }
}

pub fn snapshot_file_path_in(root: &Path) -> PathBuf {
    root.join("fleet_snapshot.json")
}

pub fn snapshots_dir_in(root: &Path) -> PathBuf {
    root.join("fleet_snapshots")
}

pub fn save_snapshot_in(root: &Path, snapshot: &FleetSnapshot) -> io::Result<PathBuf> {
    fs::create_dir_all(root)?;
    let path = snapshot_file_path_in(root);
    let json = serde_json::to_vec_pretty(snapshot)?;
    fs::write(&path, json)?;
    Ok(path)
}

pub fn save_snapshot_tick_in(root: &Path, snapshot: &FleetSnapshot) -> io::Result<PathBuf> {
    let dir = snapshots_dir_in(root);
    fs::create_dir_all(&dir)?;
    let path = dir.join(format!("tick_{:06}.json", snapshot.tick));
    let json = serde_json::to_vec_pretty(snapshot)?;
    fs::write(&path, json)?;
    Ok(path)
}

/// The last saved snapshot, falling back to the newest per-tick file.
pub fn load_snapshot_in(root: &Path) -> io::Result<Option<FleetSnapshot>> {
    let path = snapshot_file_path_in(root);
    if !path.exists() {
        return load_latest_snapshot_in(root);
    }
    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return load_latest_snapshot_in(root);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

pub fn load_latest_snapshot_in(root: &Path) -> io::Result<Option<FleetSnapshot>> {
    let mut latest: Option<PathBuf> = None;
    if let Ok(entries) = fs::read_dir(snapshots_dir_in(root)) {
        for entry in entries.flatten() {
            let path = entry.path();
            let is_json = path.extension().and_then(|s| s.to_str()) == Some("json");
            if path.is_file() && is_json && latest.as_ref().is_none_or(|l| path > *l) {
                latest = Some(path);
            }
        }
    }

    let Some(path) = latest else {
        return Ok(None);
    };
    let bytes = fs::read(&path)?;
    if bytes.is_empty() {
        return Ok(None);
    }
    Ok(Some(serde_json::from_slice(&bytes)?))
}

pub fn save_snapshot(snapshot: &FleetSnapshot) -> io::Result<PathBuf> {
    save_snapshot_in(Path::new(DATA_DIR), snapshot)
}

pub fn save_snapshot_tick(snapshot: &FleetSnapshot) -> io::Result<PathBuf> {
    save_snapshot_tick_in(Path::new(DATA_DIR), snapshot)
}

pub fn load_snapshot() -> io::Result<Option<FleetSnapshot>> {
    load_snapshot_in(Path::new(DATA_DIR))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::config::SimConfig;
    use crate::modules::controller::{Script, ScriptedController};
    use crate::modules::drone::{Drone, DroneConfig};
    use crate::modules::grid::Grid;

    fn sample() -> Simulation<ScriptedController> {
        let grid = Grid::parse("B..T\n..H.\n", 1).unwrap();
        let fleet = vec![
            Drone::new("D-1", Coord::new(0, 0), DroneConfig::default()),
            Drone::new("D-2", Coord::new(1, 0), DroneConfig::default()),
        ];
        Simulation::with_fleet(
            grid,
            fleet,
            ScriptedController::new(Script::default()),
            &SimConfig::default(),
        )
    }

    #[test]
    fn capture_overlays_drones_on_ground_truth() {
        let snapshot = FleetSnapshot::capture(&sample());
        assert_eq!(snapshot.map, vec!["DD.T".to_string(), "..H.".to_string()]);
        assert_eq!(snapshot.targets_remaining, 1);
        assert_eq!(snapshot.missiles_left, 5);
        assert_eq!(snapshot.active_drones(), 2);
        assert_eq!(snapshot.drones[0].command, "STANDBY");
    }

    #[test]
    fn latest_tick_file_wins_when_no_main_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let mut snapshot = FleetSnapshot::capture(&sample());
        for tick in [3, 12, 7] {
            snapshot.tick = tick;
            save_snapshot_tick_in(dir.path(), &snapshot).unwrap();
        }
        let loaded = load_snapshot_in(dir.path()).unwrap().unwrap();
        assert_eq!(loaded.tick, 12);

        snapshot.tick = 1;
        save_snapshot_in(dir.path(), &snapshot).unwrap();
        assert_eq!(load_snapshot_in(dir.path()).unwrap().map(|s| s.tick), Some(1));
    }

    #[test]
    fn missing_directory_has_no_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_snapshot_in(&dir.path().join("nothing")).unwrap().is_none());
    }
}
