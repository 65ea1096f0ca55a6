use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::modules::command::{CommandMessage, ScanMode};
use crate::modules::drone::{Drone, Report};
use crate::modules::grid::{Coord, TileKind};
use crate::modules::knowledge::{KnowledgeStore, ThreatZone};

/// Radius assumed around a loss whose emitter could not be identified.
pub const ESTIMATED_THREAT_RADIUS: f64 = 8.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cause", rename_all = "snake_case")]
pub enum LossCause {
    Battery,
    KillZone { hss_location: Coord, radius: i32 },
    Unexplained,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DroneLoss {
    pub drone_id: String,
    pub position: Coord,
    #[serde(flatten)]
    pub cause: LossCause,
}

/// One planning round handed back to the fleet.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub commands: Vec<CommandMessage>,
}

/// Controller-side picture of the world assembled from reports and losses.
#[derive(Clone, Debug, Default, Serialize)]
pub struct WorldModel {
    known_tiles: KnowledgeStore,
    known_targets: BTreeMap<String, Coord>,
    threat_zones: Vec<ThreatZone>,
    losses: Vec<DroneLoss>,
}

impl WorldModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn known_tiles(&self) -> &KnowledgeStore {
        &self.known_tiles
    }

    pub fn known_targets(&self) -> &BTreeMap<String, Coord> {
        &self.known_targets
    }

    pub fn threat_zones(&self) -> &[ThreatZone] {
        &self.threat_zones
    }

    pub fn losses(&self) -> &[DroneLoss] {
        &self.losses
    }

    /// First sighting wins: tiles already known are not overwritten.
    pub fn absorb(&mut self, reports: &[Report]) {
        for report in reports {
            for summary in &report.scan_results {
                self.known_tiles.insert_if_absent(summary.clone());

                if summary.kind != TileKind::Target {
                    continue;
                }
                let Some(target_id) = summary
                    .properties
                    .as_ref()
                    .and_then(|p| p.get("target_id"))
                    .and_then(|v| v.as_str())
                else {
                    continue;
                };
                if !self.known_targets.contains_key(target_id) {
                    info!(target_id, at = %summary.position, reported_by = %report.drone_id, "new target found");
                    self.known_targets
                        .insert(target_id.to_string(), summary.position);
                }
            }
        }
    }

    pub fn record_loss(&mut self, loss: &DroneLoss) {
        match &loss.cause {
            LossCause::Battery => {}
            LossCause::KillZone {
                hss_location,
                radius,
            } => {
                let known = self
                    .threat_zones
                    .iter()
                    .any(|zone| zone.is_precise() && zone.center() == *hss_location);
                if !known {
                    info!(hss = %hss_location, radius, lost = %loss.drone_id, "threat emitter located");
                    self.threat_zones
                        .push(ThreatZone::precise(*hss_location, f64::from(*radius)));
                }
            }
            LossCause::Unexplained => {
                warn!(drone = %loss.drone_id, at = %loss.position, "loss without known emitter, marking estimated zone");
                self.threat_zones
                    .push(ThreatZone::legacy(loss.position, ESTIMATED_THREAT_RADIUS));
            }
        }
        self.losses.push(loss.clone());
    }
}

/// The decision-maker behind the fleet. Implementations see reports and losses
/// as they happen and answer planning calls with commands.
pub trait Controller {
    fn plan(&mut self, tick: u64, drones: &[Drone], missiles_left: u32) -> Option<Plan>;

    fn world(&self) -> &WorldModel;

    fn world_mut(&mut self) -> &mut WorldModel;

    fn collect_reports(&mut self, reports: &[Report]) {
        self.world_mut().absorb(reports);
    }

    fn drone_lost(&mut self, loss: &DroneLoss) {
        self.world_mut().record_loss(loss);
    }
}

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub rounds: Vec<Plan>,
}

impl Script {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScriptError> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|source| ScriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Fixed opening used when no script is supplied: two ACTIVE explorers and
    /// two manual scans.
    pub fn mock() -> Self {
        let commands = vec![
            CommandMessage::set_scan_mode(ScanMode::Active).for_drone("D-1"),
            CommandMessage::set_scan_mode(ScanMode::Active).for_drone("D-2"),
            CommandMessage::move_to(Coord::new(25, 75)).for_drone("D-1"),
            CommandMessage::move_to(Coord::new(75, 75)).for_drone("D-2"),
            CommandMessage::scan().for_drone("D-3"),
            CommandMessage::scan().for_drone("D-4"),
        ];
        Self {
            rounds: vec![Plan {
                reasoning: Some("mock opening: explore with D-1 and D-2, scan with D-3 and D-4".into()),
                commands,
            }],
        }
    }
}

/// Replays a script one round per planning call.
#[derive(Debug, Default)]
pub struct ScriptedController {
    rounds: VecDeque<Plan>,
    repeat_last: bool,
    last: Option<Plan>,
    world: WorldModel,
}

impl ScriptedController {
    /// Issues nothing once the script runs out.
    pub fn new(script: Script) -> Self {
        Self {
            rounds: script.rounds.into(),
            ..Self::default()
        }
    }

    /// Keeps answering with the final round after the script runs out.
    pub fn repeating(script: Script) -> Self {
        Self {
            repeat_last: true,
            ..Self::new(script)
        }
    }

    pub fn rounds_left(&self) -> usize {
        self.rounds.len()
    }
}

impl Controller for ScriptedController {
    fn plan(&mut self, tick: u64, drones: &[Drone], missiles_left: u32) -> Option<Plan> {
        let active = drones.iter().filter(|d| d.is_active()).count();
        let next = match self.rounds.pop_front() {
            Some(round) => {
                if self.repeat_last {
                    self.last = Some(round.clone());
                }
                Some(round)
            }
            None if self.repeat_last => self.last.clone(),
            None => None,
        };
        match &next {
            Some(plan) => info!(
                tick,
                active,
                missiles_left,
                commands = plan.commands.len(),
                "controller issued round"
            ),
            None => info!(tick, active, "script exhausted, no commands"),
        }
        next
    }

    fn world(&self) -> &WorldModel {
        &self.world
    }

    fn world_mut(&mut self) -> &mut WorldModel {
        &mut self.world
    }
}
