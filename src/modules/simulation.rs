use std::fmt;

use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Serialize;
use tracing::{debug, warn};

use crate::modules::command::{CommandMessage, CommandType};
use crate::modules::config::SimConfig;
use crate::modules::controller::{Controller, DroneLoss, LossCause};
use crate::modules::drone::{Drone, DroneEvent, DroneStatus, Report};
use crate::modules::grid::{Grid, TileKind};
use crate::modules::missile::{FireOutcome, MissileSystem};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    AllTargetsDestroyed,
    AllDronesLost,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::AllTargetsDestroyed => write!(f, "SUCCESS: all targets destroyed"),
            Outcome::AllDronesLost => write!(f, "FAILURE: all drones lost"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FleetEvent {
    Drone {
        drone_id: String,
        #[serde(flatten)]
        event: DroneEvent,
    },
    Lost(DroneLoss),
    CommandIssued {
        drone_id: String,
        command_type: CommandType,
    },
    CommandSkipped {
        drone_id: Option<String>,
        command_type: CommandType,
        reason: &'static str,
    },
    Strike(FireOutcome),
}

#[derive(Clone, Debug, Default)]
pub struct TickResult {
    pub tick: u64,
    pub events: Vec<FleetEvent>,
    pub reports: Vec<Report>,
    /// Controller reasoning for the round issued this tick, if any.
    pub reasoning: Option<String>,
    pub planned: bool,
    pub outcome: Option<Outcome>,
}

/// Fleet engine: owns ground truth, the drones, the missile rack and the
/// controller, and advances them one tick at a time.
pub struct Simulation<C> {
    grid: Grid,
    drones: Vec<Drone>,
    missiles: MissileSystem,
    controller: C,
    tick: u64,
    report_interval: u64,
    rng: StdRng,
}

impl<C: Controller> Simulation<C> {
    /// Spawns `drone_count` drones named `D-1..D-n` at random base-area coordinates.
    pub fn new(grid: Grid, controller: C, config: &SimConfig) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let drones = (1..=config.drone_count)
            .map(|n| {
                Drone::spawn(
                    format!("D-{}", n),
                    &grid,
                    &mut rng,
                    config.spawn_min,
                    config.spawn_max,
                    config.drone.clone(),
                )
            })
            .collect();
        Self::assemble(grid, drones, controller, config, rng)
    }

    /// Uses a caller-built fleet instead of random spawns.
    pub fn with_fleet(grid: Grid, drones: Vec<Drone>, controller: C, config: &SimConfig) -> Self {
        let rng = StdRng::seed_from_u64(config.seed.unwrap_or_default());
        Self::assemble(grid, drones, controller, config, rng)
    }

    fn assemble(
        grid: Grid,
        drones: Vec<Drone>,
        controller: C,
        config: &SimConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            grid,
            drones,
            missiles: MissileSystem::new(config.initial_missiles),
            controller,
            tick: 0,
            report_interval: config.report_interval.max(1),
            rng,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn drones(&self) -> &[Drone] {
        &self.drones
    }

    pub fn drone(&self, id: &str) -> Option<&Drone> {
        self.drones.iter().find(|d| d.id() == id)
    }

    pub fn missiles(&self) -> &MissileSystem {
        &self.missiles
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_planning_tick(&self, tick: u64) -> bool {
        tick >= 1 && (tick - 1) % self.report_interval == 0
    }

    /// Hands out the opening commands at tick 0.
    pub fn start(&mut self) -> TickResult {
        let mut events = Vec::new();
        let reasoning = self.distribute(&mut events);
        TickResult {
            tick: self.tick,
            events,
            reasoning,
            planned: true,
            ..TickResult::default()
        }
    }

    pub fn step(&mut self) -> TickResult {
        self.tick += 1;
        let mut events = Vec::new();
        let mut losses = Vec::new();

        for drone in self.drones.iter_mut() {
            for event in drone.tick(&self.grid, &mut self.rng) {
                if event == DroneEvent::Destroyed {
                    losses.push(DroneLoss {
                        drone_id: drone.id().to_string(),
                        position: drone.position(),
                        cause: LossCause::Battery,
                    });
                }
                events.push(FleetEvent::Drone {
                    drone_id: drone.id().to_string(),
                    event,
                });
            }
        }

        for drone in self.drones.iter_mut().filter(|d| d.is_active()) {
            let Some((hss, radius)) = self.grid.kill_zone_at(drone.position()) else {
                continue;
            };
            warn!(drone = %drone.id(), at = %drone.position(), hss = %hss.position, "drone destroyed inside kill zone");
            drone.mark_destroyed();
            losses.push(DroneLoss {
                drone_id: drone.id().to_string(),
                position: drone.position(),
                cause: LossCause::KillZone {
                    hss_location: hss.position,
                    radius,
                },
            });
        }

        for loss in losses {
            self.controller.drone_lost(&loss);
            events.push(FleetEvent::Lost(loss));
        }

        let planned = self.is_planning_tick(self.tick);
        let mut reports = Vec::new();
        let mut reasoning = None;
        if planned {
            reports = self.drones.iter_mut().filter_map(Drone::report).collect();
            self.controller.collect_reports(&reports);
            reasoning = self.distribute(&mut events);
        }

        TickResult {
            tick: self.tick,
            events,
            reports,
            reasoning,
            planned,
            outcome: self.outcome(),
        }
    }

    /// Success wins over failure when both hold on the same tick.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.grid.count(TileKind::Target) == 0 {
            return Some(Outcome::AllTargetsDestroyed);
        }
        if self
            .drones
            .iter()
            .all(|d| d.status() == DroneStatus::Destroyed)
        {
            return Some(Outcome::AllDronesLost);
        }
        None
    }

    fn distribute(&mut self, events: &mut Vec<FleetEvent>) -> Option<String> {
        let Some(plan) = self
            .controller
            .plan(self.tick, &self.drones, self.missiles.remaining())
        else {
            debug!(tick = self.tick, "no commands this round");
            return None;
        };

        let known = self.controller.world().known_tiles().clone();
        let zones = self.controller.world().threat_zones().to_vec();
        for drone in self.drones.iter_mut().filter(|d| d.is_active()) {
            drone.sync_knowledge(known.clone(), zones.clone());
        }

        for command in plan.commands {
            let command_type = command.command_type;
            let outcome = match command_type {
                CommandType::MoveDrone | CommandType::ScanArea | CommandType::Standby => self
                    .active_drone(&command)
                    .map(|drone| {
                        drone.set_command(
                            command
                                .clone()
                                .with_known_tiles(known.clone())
                                .with_threat_zones(zones.clone()),
                        );
                        drone.id().to_string()
                    }),
                CommandType::SetScanMode => match command.scan_mode {
                    Some(mode) => self.active_drone(&command).map(|drone| {
                        drone.set_scan_mode(mode);
                        drone.id().to_string()
                    }),
                    None => Err("missing scan_mode"),
                },
                CommandType::FireMissile => {
                    match command.target_position {
                        Some(at) => {
                            let strike = self.missiles.fire(&mut self.grid, at);
                            events.push(FleetEvent::Strike(strike));
                        }
                        None => self.skip(events, &command, "missing target_position"),
                    }
                    continue;
                }
                CommandType::Unsupported => Err("unsupported command type"),
            };

            match outcome {
                Ok(drone_id) => events.push(FleetEvent::CommandIssued {
                    drone_id,
                    command_type,
                }),
                Err(reason) => self.skip(events, &command, reason),
            }
        }

        plan.reasoning
    }

    fn active_drone(&mut self, command: &CommandMessage) -> Result<&mut Drone, &'static str> {
        let id = command.drone_id.as_deref().ok_or("missing drone_id")?;
        let drone = self
            .drones
            .iter_mut()
            .find(|d| d.id() == id)
            .ok_or("unknown drone")?;
        if drone.is_active() {
            Ok(drone)
        } else {
            Err("drone destroyed")
        }
    }

    fn skip(&self, events: &mut Vec<FleetEvent>, command: &CommandMessage, reason: &'static str) {
        warn!(
            drone = command.drone_id.as_deref().unwrap_or("-"),
            command = %command.command_type,
            reason,
            "command skipped"
        );
        events.push(FleetEvent::CommandSkipped {
            drone_id: command.drone_id.clone(),
            command_type: command.command_type,
            reason,
        });
    }
}
