use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::modules::command::{CommandMessage, Order, ScanMode};
use crate::modules::grid::{Coord, GridAccessor, Tile, TileKind};
use crate::modules::knowledge::{KnowledgeStore, ThreatZone, TileSummary};
use crate::modules::planner::{Bounds, is_path_clear, plan_path};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DroneStatus {
    Active,
    /// Accepted on the wire; the control loop recharges while ACTIVE instead.
    Recharging,
    Destroyed,
}

impl fmt::Display for DroneStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DroneStatus::Active => write!(f, "ACTIVE"),
            DroneStatus::Recharging => write!(f, "RECHARGING"),
            DroneStatus::Destroyed => write!(f, "DESTROYED"),
        }
    }
}

/// Per-drone budget and sensor constants.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DroneConfig {
    pub battery_max: f64,
    /// Manhattan radius of a scan sweep.
    pub scan_radius: i32,
    pub cost_move: f64,
    pub cost_scan: f64,
    pub cost_report: f64,
    pub recharge_rate: f64,
    /// Probability that an ACTIVE-mode drone scans after a successful move.
    pub active_scan_chance: f64,
}

impl Default for DroneConfig {
    fn default() -> Self {
        Self {
            battery_max: 1000.0,
            scan_radius: 5,
            cost_move: 1.0,
            cost_scan: 5.0,
            cost_report: 2.0,
            recharge_rate: 50.0,
            active_scan_chance: 0.3,
        }
    }
}

/// Observable outcome of one step of a drone's control loop.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DroneEvent {
    Moved { from: Coord, to: Coord },
    Collided { at: Coord },
    Arrived { at: Coord },
    PathPlanned { target: Coord, hops: usize },
    NoPath { target: Coord },
    Scanned { at: Coord, tiles: usize, opportunistic: bool },
    Recharged { battery: f64 },
    Destroyed,
}

/// Outbound status message consumed by the controller.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub drone_id: String,
    pub status: DroneStatus,
    pub position: Coord,
    pub battery: f64,
    pub scan_results: Vec<TileSummary>,
}

fn round_battery(battery: f64) -> f64 {
    (battery * 100.0).round() / 100.0
}

#[derive(Clone, Debug)]
pub struct Drone {
    id: String,
    position: Coord,
    battery: f64,
    status: DroneStatus,
    scan_mode: ScanMode,
    command: Order,
    path: VecDeque<Coord>,
    scan_results: Vec<Tile>,
    knowledge: KnowledgeStore,
    threat_zones: Vec<ThreatZone>,
    config: DroneConfig,
}

impl Drone {
    /// A fully charged, PASSIVE drone on STANDBY.
    pub fn new(id: impl Into<String>, position: Coord, config: DroneConfig) -> Self {
        Self {
            id: id.into(),
            position,
            battery: config.battery_max,
            status: DroneStatus::Active,
            scan_mode: ScanMode::Passive,
            command: Order::Standby,
            path: VecDeque::new(),
            scan_results: Vec::new(),
            knowledge: KnowledgeStore::new(),
            threat_zones: Vec::new(),
            config,
        }
    }

    /// Places a drone at a random coordinate with both axes drawn from
    /// `spawn_min..=spawn_max`, clamped to the grid.
    pub fn spawn<G, R>(
        id: impl Into<String>,
        grid: &G,
        rng: &mut R,
        spawn_min: i32,
        spawn_max: i32,
        config: DroneConfig,
    ) -> Self
    where
        G: GridAccessor + ?Sized,
        R: Rng + ?Sized,
    {
        let axis = |rng: &mut R, limit: i32| {
            let hi = spawn_max.min(limit - 1).max(0);
            let lo = spawn_min.max(0).min(hi);
            rng.gen_range(lo..=hi)
        };
        let x = axis(&mut *rng, grid.width());
        let y = axis(&mut *rng, grid.height());
        Self::new(id, Coord::new(x, y), config)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn position(&self) -> Coord {
        self.position
    }

    pub fn battery(&self) -> f64 {
        self.battery
    }

    pub fn status(&self) -> DroneStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == DroneStatus::Active
    }

    pub fn scan_mode(&self) -> ScanMode {
        self.scan_mode
    }

    pub fn command(&self) -> Order {
        self.command
    }

    pub fn path(&self) -> impl Iterator<Item = &Coord> {
        self.path.iter()
    }

    pub fn scan_results(&self) -> &[Tile] {
        &self.scan_results
    }

    pub fn knowledge(&self) -> &KnowledgeStore {
        &self.knowledge
    }

    pub fn threat_zones(&self) -> &[ThreatZone] {
        &self.threat_zones
    }

    pub fn config(&self) -> &DroneConfig {
        &self.config
    }

    /// Applies a controller message. `scan_mode`, `known_tiles` and
    /// `threat_zones` replace the drone's own copies whenever present; the
    /// primary type then becomes the current order.
    pub fn set_command(&mut self, msg: CommandMessage) {
        let order = msg.order();
        if let Some(mode) = msg.scan_mode {
            self.set_scan_mode(mode);
        }
        if let Some(known) = msg.known_tiles {
            debug!(drone = %self.id, tiles = known.len(), "knowledge replaced");
            self.knowledge = known;
        }
        if let Some(zones) = msg.threat_zones {
            debug!(drone = %self.id, zones = zones.len(), "threat zones replaced");
            self.threat_zones = zones;
        }
        if order != self.command {
            self.path.clear();
        }
        self.command = order;
    }

    pub fn set_scan_mode(&mut self, mode: ScanMode) {
        if self.scan_mode != mode {
            debug!(drone = %self.id, mode = %mode, "scan mode updated");
        }
        self.scan_mode = mode;
    }

    /// Replaces knowledge and threat zones without touching the current order.
    pub fn sync_knowledge(&mut self, known: KnowledgeStore, zones: Vec<ThreatZone>) {
        self.knowledge = known;
        self.threat_zones = zones;
    }

    /// Terminal loss caused outside the control loop (kill zones).
    pub fn mark_destroyed(&mut self) {
        self.status = DroneStatus::Destroyed;
        self.path.clear();
    }

    /// One control-loop step. DESTROYED (or otherwise inactive) drones do nothing.
    pub fn tick<G, R>(&mut self, grid: &G, rng: &mut R) -> Vec<DroneEvent>
    where
        G: GridAccessor + ?Sized,
        R: Rng + ?Sized,
    {
        let mut events = Vec::new();
        if self.status != DroneStatus::Active {
            return events;
        }

        match self.command {
            Order::MoveDrone { target } => self.advance(target, grid, rng, &mut events),
            Order::ScanArea => self.scan(grid, false, &mut events),
            Order::Standby => self.recharge(grid, &mut events),
            Order::Idle => {}
        }

        if self.battery <= 0.0 {
            warn!(drone = %self.id, position = %self.position, "battery depleted, drone destroyed");
            self.mark_destroyed();
            events.push(DroneEvent::Destroyed);
        }
        events
    }

    fn advance<G, R>(&mut self, target: Coord, grid: &G, rng: &mut R, events: &mut Vec<DroneEvent>)
    where
        G: GridAccessor + ?Sized,
        R: Rng + ?Sized,
    {
        if self.position == target {
            self.path.clear();
            events.push(DroneEvent::Arrived { at: target });
            match self.scan_mode {
                ScanMode::Active => self.scan(grid, false, events),
                ScanMode::Passive => self.command = Order::Standby,
            }
            return;
        }

        if self.path.is_empty() || !is_path_clear(&self.path, &self.knowledge, &self.threat_zones) {
            let planned = plan_path(
                self.position,
                target,
                Bounds::of(grid),
                &self.knowledge,
                &self.threat_zones,
            );
            match planned {
                Some(path) if !path.is_empty() => {
                    events.push(DroneEvent::PathPlanned {
                        target,
                        hops: path.len(),
                    });
                    self.path = path.into();
                }
                _ => {
                    info!(drone = %self.id, to = %target, "no path to target, standing by");
                    events.push(DroneEvent::NoPath { target });
                    self.path.clear();
                    self.command = Order::Standby;
                    return;
                }
            }
        }

        let Some(next) = self.path.pop_front() else {
            return;
        };

        // off-grid cells count as walls
        let passable = grid
            .tile(next)
            .is_some_and(|tile| tile.kind != TileKind::Obstacle);
        if !passable {
            info!(drone = %self.id, at = %next, "collided with unknown obstacle, replanning");
            self.knowledge.record_obstacle(next);
            self.path.clear();
            events.push(DroneEvent::Collided { at: next });
            return;
        }

        let from = self.position;
        self.position = next;
        self.battery -= self.config.cost_move;
        events.push(DroneEvent::Moved { from, to: next });

        if self.scan_mode == ScanMode::Active && rng.gen_bool(self.config.active_scan_chance) {
            self.scan(grid, true, events);
        }
    }

    fn scan<G>(&mut self, grid: &G, opportunistic: bool, events: &mut Vec<DroneEvent>)
    where
        G: GridAccessor + ?Sized,
    {
        self.scan_results = grid.visible_tiles(self.position, self.config.scan_radius);
        self.battery -= self.config.cost_scan;
        self.command = Order::Standby;

        let targets = self
            .scan_results
            .iter()
            .filter(|t| t.kind == TileKind::Target)
            .count();
        if targets > 0 {
            info!(drone = %self.id, at = %self.position, targets, "targets in sensor range");
        }
        events.push(DroneEvent::Scanned {
            at: self.position,
            tiles: self.scan_results.len(),
            opportunistic,
        });
    }

    fn recharge<G>(&mut self, grid: &G, events: &mut Vec<DroneEvent>)
    where
        G: GridAccessor + ?Sized,
    {
        let docked = grid
            .tile(self.position)
            .is_some_and(|tile| tile.kind == TileKind::Base);
        if !docked || self.battery >= self.config.battery_max {
            return;
        }
        self.battery = (self.battery + self.config.recharge_rate).min(self.config.battery_max);
        debug!(drone = %self.id, battery = self.battery, "charging at base");
        events.push(DroneEvent::Recharged {
            battery: self.battery,
        });
    }

    /// Packages and clears the scan buffer. Every call costs `cost_report`,
    /// even when there is nothing new to say; DESTROYED drones report nothing.
    pub fn report(&mut self) -> Option<Report> {
        if self.status == DroneStatus::Destroyed {
            return None;
        }

        let scan_results: Vec<TileSummary> = self
            .scan_results
            .drain(..)
            .map(|tile| TileSummary::sensed(&tile))
            .collect();
        for summary in &scan_results {
            self.knowledge.insert(summary.clone());
        }

        let report = Report {
            drone_id: self.id.clone(),
            status: self.status,
            position: self.position,
            battery: round_battery(self.battery),
            scan_results,
        };
        self.battery -= self.config.cost_report;
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::grid::Grid;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand::rngs::mock::StepRng;

    fn never() -> StepRng {
        StepRng::new(u64::MAX, 0)
    }

    fn always() -> StepRng {
        StepRng::new(0, 0)
    }

    fn drone_at(x: i32, y: i32) -> Drone {
        Drone::new("D-1", Coord::new(x, y), DroneConfig::default())
    }

    #[test]
    fn passive_arrival_reverts_to_standby_without_cost() {
        let grid = Grid::new(10, 10);
        let mut drone = drone_at(5, 5);
        drone.battery = 100.0;
        drone.set_command(CommandMessage::move_to(Coord::new(5, 5)));

        let events = drone.tick(&grid, &mut never());

        assert_eq!(events, vec![DroneEvent::Arrived { at: Coord::new(5, 5) }]);
        assert_eq!(drone.command(), Order::Standby);
        assert_eq!(drone.battery(), 100.0);
        assert_eq!(drone.path().count(), 0);
    }

    #[test]
    fn active_arrival_scans_in_the_same_tick() {
        let grid = Grid::new(10, 10);
        let mut drone = drone_at(5, 5);
        drone.set_command(
            CommandMessage::move_to(Coord::new(5, 5)).with_scan_mode(ScanMode::Active),
        );

        let events = drone.tick(&grid, &mut never());

        assert!(matches!(events.last(), Some(DroneEvent::Scanned { opportunistic: false, .. })));
        assert!(!drone.scan_results().is_empty());
        assert_eq!(drone.battery(), 1000.0 - 5.0);
        assert_eq!(drone.command(), Order::Standby);
    }

    #[test]
    fn three_cardinal_hops_cost_three_moves() {
        let grid = Grid::new(4, 1);
        let mut drone = drone_at(0, 0);
        drone.set_command(CommandMessage::move_to(Coord::new(3, 0)));
        let mut rng = never();

        let first = drone.tick(&grid, &mut rng);
        assert_eq!(
            first[0],
            DroneEvent::PathPlanned {
                target: Coord::new(3, 0),
                hops: 3
            }
        );
        drone.tick(&grid, &mut rng);
        drone.tick(&grid, &mut rng);

        assert_eq!(drone.position(), Coord::new(3, 0));
        assert_eq!(drone.battery(), 1000.0 - 3.0);

        let arrival = drone.tick(&grid, &mut rng);
        assert_eq!(arrival, vec![DroneEvent::Arrived { at: Coord::new(3, 0) }]);
        assert_eq!(drone.battery(), 1000.0 - 3.0);
        assert_eq!(drone.command(), Order::Standby);
    }

    #[test]
    fn unknown_obstacle_is_discovered_and_never_entered() {
        let grid = Grid::parse(
            "\
.....
.###.
.....
",
            5,
        )
        .unwrap();
        let mut drone = drone_at(0, 1);
        drone.set_command(CommandMessage::move_to(Coord::new(4, 1)));
        let mut rng = StdRng::seed_from_u64(7);
        let mut collisions = 0;

        for _ in 0..20 {
            for event in drone.tick(&grid, &mut rng) {
                if let DroneEvent::Collided { at } = event {
                    collisions += 1;
                    assert!(drone.knowledge().is_known_obstacle(at));
                }
            }
            let here = grid.tile(drone.position()).map(|t| t.kind);
            assert_ne!(here, Some(TileKind::Obstacle));
        }

        assert!(collisions >= 1);
        assert_eq!(drone.position(), Coord::new(4, 1));
        assert_eq!(drone.command(), Order::Standby);
    }

    #[test]
    fn collision_costs_no_battery() {
        let grid = Grid::parse(".#.\n", 5).unwrap();
        let mut drone = drone_at(0, 0);
        drone.set_command(CommandMessage::move_to(Coord::new(2, 0)));

        let events = drone.tick(&grid, &mut never());

        assert!(events.contains(&DroneEvent::Collided { at: Coord::new(1, 0) }));
        assert_eq!(drone.position(), Coord::new(0, 0));
        assert_eq!(drone.battery(), 1000.0);
        assert_eq!(drone.path().count(), 0);

        // the only row is now walled off under the drone's own knowledge
        let events = drone.tick(&grid, &mut never());
        assert_eq!(events, vec![DroneEvent::NoPath { target: Coord::new(2, 0) }]);
        assert_eq!(drone.command(), Order::Standby);
    }

    #[test]
    fn pushed_obstacle_invalidates_cached_path() {
        let grid = Grid::new(6, 3);
        let mut drone = drone_at(0, 1);
        drone.set_command(CommandMessage::move_to(Coord::new(5, 1)));
        drone.tick(&grid, &mut never());
        assert!(drone.path().any(|c| *c == Coord::new(3, 1)));

        let mut known = KnowledgeStore::new();
        known.record_obstacle(Coord::new(3, 1));
        drone.sync_knowledge(known, Vec::new());

        let events = drone.tick(&grid, &mut never());
        assert!(matches!(events[0], DroneEvent::PathPlanned { .. }));
        assert!(drone.path().all(|c| *c != Coord::new(3, 1)));
    }

    #[test]
    fn pushed_threat_zone_invalidates_cached_path() {
        let grid = Grid::new(12, 3);
        let mut drone = drone_at(0, 1);
        drone.set_command(CommandMessage::move_to(Coord::new(11, 1)));
        drone.tick(&grid, &mut never());
        assert!(drone.path().any(|c| *c == Coord::new(6, 1)));

        let zone = ThreatZone::precise(Coord::new(6, 0), 1.0);
        drone.set_command(
            CommandMessage::move_to(Coord::new(11, 1)).with_threat_zones(vec![zone.clone()]),
        );
        let events = drone.tick(&grid, &mut never());

        assert!(matches!(events[0], DroneEvent::PathPlanned { .. }));
        assert!(drone.path().all(|c| !zone.contains(*c)));
        assert!(drone.path().any(|c| *c == Coord::new(6, 2)));
    }

    #[test]
    fn opportunistic_scan_only_in_active_mode() {
        let grid = Grid::new(10, 10);

        let mut active = drone_at(0, 0);
        active.set_command(
            CommandMessage::move_to(Coord::new(5, 5)).with_scan_mode(ScanMode::Active),
        );
        let events = active.tick(&grid, &mut always());
        assert!(matches!(events.last(), Some(DroneEvent::Scanned { opportunistic: true, .. })));
        assert_eq!(active.battery(), 1000.0 - 1.0 - 5.0);
        assert_eq!(active.command(), Order::Standby);

        let mut passive = drone_at(0, 0);
        passive.set_command(CommandMessage::move_to(Coord::new(5, 5)));
        let events = passive.tick(&grid, &mut always());
        assert!(matches!(events.last(), Some(DroneEvent::Moved { .. })));
        assert!(passive.scan_results().is_empty());

        let mut unlucky = drone_at(0, 0);
        unlucky.set_command(
            CommandMessage::move_to(Coord::new(5, 5)).with_scan_mode(ScanMode::Active),
        );
        unlucky.tick(&grid, &mut never());
        assert!(unlucky.scan_results().is_empty());
        assert!(matches!(unlucky.command(), Order::MoveDrone { .. }));
    }

    #[test]
    fn scan_reports_hss_as_empty() {
        let grid = Grid::parse("...\n.H.\n..T\n", 4).unwrap();
        let mut drone = drone_at(0, 0);
        drone.set_command(CommandMessage::scan());

        drone.tick(&grid, &mut never());
        assert_eq!(drone.battery(), 995.0);
        assert_eq!(drone.command(), Order::Standby);

        let report = drone.report().unwrap();
        let hss = report
            .scan_results
            .iter()
            .find(|s| s.position == Coord::new(1, 1))
            .unwrap();
        assert_eq!(hss.kind, TileKind::Empty);
        assert!(hss.properties.is_none());
        assert!(report.scan_results.iter().all(|s| s.kind != TileKind::Hss));
        assert_eq!(drone.knowledge().count(TileKind::Hss), 0);
        assert_eq!(
            drone.knowledge().get(Coord::new(1, 1)).map(|s| s.kind),
            Some(TileKind::Empty)
        );

        let target = drone.knowledge().get(Coord::new(2, 2)).unwrap();
        assert_eq!(target.kind, TileKind::Target);
        assert!(target.properties.is_some());
    }

    #[test]
    fn every_report_costs_battery_and_clears_buffer() {
        let grid = Grid::new(5, 5);
        let mut drone = drone_at(2, 2);
        drone.set_command(CommandMessage::scan());
        drone.tick(&grid, &mut never());

        let first = drone.report().unwrap();
        assert!(!first.scan_results.is_empty());
        assert_eq!(first.battery, 995.0);

        let second = drone.report().unwrap();
        assert!(second.scan_results.is_empty());
        assert_eq!(second.battery, 993.0);
        assert_eq!(drone.battery(), 991.0);
    }

    #[test]
    fn report_rounds_battery_to_two_decimals() {
        let config = DroneConfig {
            cost_move: 0.333,
            ..DroneConfig::default()
        };
        let grid = Grid::new(5, 1);
        let mut drone = Drone::new("D-9", Coord::new(0, 0), config);
        drone.set_command(CommandMessage::move_to(Coord::new(4, 0)));
        drone.tick(&grid, &mut never());

        let report = drone.report().unwrap();
        assert_eq!(report.battery, 999.67);
        assert_eq!(report.drone_id, "D-9");
        assert_eq!(report.status, DroneStatus::Active);
    }

    #[test]
    fn recharge_only_on_base_and_capped() {
        let grid = Grid::parse("B.\n", 5).unwrap();
        let mut docked = drone_at(0, 0);
        docked.battery = 980.0;
        let events = docked.tick(&grid, &mut never());
        assert_eq!(events, vec![DroneEvent::Recharged { battery: 1000.0 }]);
        assert_eq!(docked.battery(), 1000.0);
        assert!(docked.tick(&grid, &mut never()).is_empty());

        let mut field = drone_at(1, 0);
        field.battery = 500.0;
        field.tick(&grid, &mut never());
        assert_eq!(field.battery(), 500.0);
    }

    #[test]
    fn depleted_drone_is_destroyed_for_good() {
        let grid = Grid::parse("B....\n", 5).unwrap();
        let mut drone = drone_at(1, 0);
        drone.battery = 1.0;
        drone.set_command(CommandMessage::move_to(Coord::new(4, 0)));

        let events = drone.tick(&grid, &mut never());
        assert_eq!(events.last(), Some(&DroneEvent::Destroyed));
        assert_eq!(drone.status(), DroneStatus::Destroyed);
        let frozen = (drone.position(), drone.battery());

        drone.set_command(CommandMessage::move_to(Coord::new(0, 0)));
        for _ in 0..3 {
            assert!(drone.tick(&grid, &mut never()).is_empty());
        }
        assert_eq!((drone.position(), drone.battery()), frozen);
        assert_eq!(drone.report(), None);
    }

    #[test]
    fn side_channel_replaces_state_whatever_the_command() {
        let mut drone = drone_at(1, 1);
        let mut first = KnowledgeStore::new();
        first.record_obstacle(Coord::new(0, 0));
        first.record_obstacle(Coord::new(0, 1));
        drone.set_command(
            CommandMessage::standby()
                .with_known_tiles(first)
                .with_threat_zones(vec![
                    ThreatZone::legacy(Coord::new(8, 8), 8.0),
                    ThreatZone::precise(Coord::new(2, 2), 1.0),
                ]),
        );
        assert_eq!(drone.knowledge().len(), 2);
        assert_eq!(drone.threat_zones().len(), 2);

        let mut second = KnowledgeStore::new();
        second.record_obstacle(Coord::new(5, 5));
        drone.set_command(
            CommandMessage::scan()
                .with_scan_mode(ScanMode::Active)
                .with_known_tiles(second)
                .with_threat_zones(Vec::new()),
        );
        assert_eq!(drone.knowledge().len(), 1);
        assert!(drone.knowledge().is_known_obstacle(Coord::new(5, 5)));
        assert!(!drone.knowledge().is_known_obstacle(Coord::new(0, 0)));
        assert!(drone.threat_zones().is_empty());
        assert_eq!(drone.scan_mode(), ScanMode::Active);
        assert_eq!(drone.command(), Order::ScanArea);
    }

    #[test]
    fn unsupported_command_is_a_no_op_even_on_base() {
        let grid = Grid::parse("B\n", 5).unwrap();
        let mut drone = drone_at(0, 0);
        drone.battery = 10.0;
        let msg: CommandMessage =
            serde_json::from_value(serde_json::json!({"command_type": "LAUNCH_FIREWORKS"})).unwrap();
        drone.set_command(msg);

        assert!(drone.tick(&grid, &mut never()).is_empty());
        assert_eq!(drone.battery(), 10.0);
        assert_eq!(drone.command(), Order::Idle);
    }

    #[test]
    fn spawn_stays_inside_range_and_grid() {
        let grid = Grid::new(6, 20);
        let mut rng = StdRng::seed_from_u64(42);
        for n in 0..50 {
            let drone = Drone::spawn(
                format!("D-{}", n),
                &grid,
                &mut rng,
                1,
                9,
                DroneConfig::default(),
            );
            let at = drone.position();
            assert!((1..=5).contains(&at.x), "x {} escaped the grid", at.x);
            assert!((1..=9).contains(&at.y));
            assert_eq!(drone.battery(), 1000.0);
            assert!(drone.is_active());
        }
    }
}
