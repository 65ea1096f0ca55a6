use std::path::PathBuf;
use std::str::FromStr;
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, Subcommand};
use dronefleet::{
    ActionStatsStore, Bounds, Controller, Coord, DEFAULT_KILL_ZONE_RADIUS, DroneEvent, FireOutcome,
    FleetEvent, FleetSnapshot, Grid, GridAccessor, KnowledgeStore, LossCause, Script,
    ScriptedController, SimConfig, Simulation, ThreatZone, TickResult, TileKind, in_any_zone,
    plan_path, save_action_stats, save_snapshot, save_snapshot_tick,
};

mod view;

use view::{run_stats, run_view};

#[derive(Parser)]
#[command(
    name = "dronefleet",
    version,
    about = "Drone fleet simulation on a partially observed grid",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the fleet against an ASCII map until the mission ends or the tick limit
    Run {
        /// Map file (. empty, # obstacle, B base, T target, H hidden emitter)
        #[arg(short = 'm', long)]
        map: PathBuf,
        /// Controller script with JSON rounds (defaults to the built-in mock opening)
        #[arg(short = 's', long)]
        script: Option<PathBuf>,
        /// TOML config file
        #[arg(short = 'c', long, env = "DRONEFLEET_CONFIG")]
        config: Option<PathBuf>,
        /// Maximum number of ticks
        #[arg(short = 't', long, default_value_t = 200)]
        ticks: u64,
        /// RNG seed for spawns and opportunistic scans
        #[arg(long, env = "DRONEFLEET_SEED")]
        seed: Option<u64>,
        /// Number of drones (overrides config)
        #[arg(short = 'n', long, env = "NUM_DRONES")]
        drones: Option<usize>,
        /// Missile inventory (overrides config)
        #[arg(long, env = "INITIAL_MISSILES")]
        missiles: Option<u32>,
        /// Delay between ticks in milliseconds
        #[arg(short = 'd', long, default_value_t = 0)]
        delay_ms: u64,
        /// Write a snapshot file for every tick
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        snapshots: bool,
        /// Only print planning ticks and the result
        #[arg(short = 'q', long, action = ArgAction::SetTrue, default_value_t = false)]
        quiet: bool,
    },
    /// Plan a single path on a map and print it
    Plan {
        #[arg(short = 'm', long)]
        map: PathBuf,
        /// Start as x,y
        #[arg(long)]
        from: CoordArg,
        /// Goal as x,y
        #[arg(long)]
        to: CoordArg,
        /// Threat zone as x,y,radius (repeatable)
        #[arg(long = "threat", value_name = "X,Y,R")]
        threats: Vec<ThreatArg>,
        /// Known obstacle as x,y (repeatable)
        #[arg(long = "obstacle", value_name = "X,Y")]
        obstacles: Vec<CoordArg>,
        /// Treat every obstacle on the map as already known
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        reveal: bool,
    },
    /// Show the latest fleet snapshot
    View {
        /// Print the raw snapshot JSON
        #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
        json: bool,
    },
    /// Show per-drone action counters from the last run
    Stats,
}

#[derive(Clone, Copy, Debug)]
pub struct CoordArg(pub Coord);

impl FromStr for CoordArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<_> = s.trim().split(',').collect();
        if parts.len() != 2 {
            return Err("coordinate must be formatted as x,y".into());
        }
        let x = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|_| "x must be an integer")?;
        let y = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| "y must be an integer")?;
        Ok(CoordArg(Coord::new(x, y)))
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ThreatArg {
    pub center: Coord,
    pub radius: f64,
}

impl FromStr for ThreatArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((coord, radius)) = s.trim().rsplit_once(',') else {
            return Err("threat must be formatted as x,y,radius".into());
        };
        let CoordArg(center) = coord.parse()?;
        let radius = radius
            .trim()
            .parse::<f64>()
            .map_err(|_| "radius must be a number")?;
        if !(radius >= 0.0) {
            return Err("radius must be non-negative".into());
        }
        Ok(ThreatArg { center, radius })
    }
}

pub fn run() {
    let cli = Cli::parse();
    if let Err(err) = dispatch(cli.command) {
        eprintln!("error: {:#}", err);
        std::process::exit(1);
    }
}

fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Run {
            map,
            script,
            config,
            ticks,
            seed,
            drones,
            missiles,
            delay_ms,
            snapshots,
            quiet,
        } => {
            let mut sim_config = match &config {
                Some(path) => SimConfig::from_file(path)
                    .with_context(|| format!("loading config {}", path.display()))?,
                None => SimConfig::default(),
            };
            if seed.is_some() {
                sim_config.seed = seed;
            }
            if let Some(n) = drones {
                sim_config.drone_count = n;
            }
            if let Some(n) = missiles {
                sim_config.initial_missiles = n;
            }
            sim_config.validate()?;

            let controller = match &script {
                Some(path) => ScriptedController::new(
                    Script::load(path).with_context(|| format!("loading script {}", path.display()))?,
                ),
                None => ScriptedController::repeating(Script::mock()),
            };
            let grid = Grid::load(&map, sim_config.hss_kill_radius)
                .with_context(|| format!("loading map {}", map.display()))?;

            run_simulation(
                Simulation::new(grid, controller, &sim_config),
                ticks,
                Duration::from_millis(delay_ms),
                snapshots,
                quiet,
            )
        }
        Command::Plan {
            map,
            from,
            to,
            threats,
            obstacles,
            reveal,
        } => run_plan(map, from.0, to.0, &threats, &obstacles, reveal),
        Command::View { json } => run_view(json),
        Command::Stats => run_stats(),
    }
}

fn run_simulation(
    mut sim: Simulation<ScriptedController>,
    ticks: u64,
    delay: Duration,
    snapshots: bool,
    quiet: bool,
) -> Result<()> {
    println!(
        "Fleet of {} drones on a {}x{} map | targets={} | missiles={}",
        sim.drones().len(),
        sim.grid().width(),
        sim.grid().height(),
        sim.grid().count(TileKind::Target),
        sim.missiles().remaining()
    );

    let mut stats = ActionStatsStore::default();
    let opening = sim.start();
    print_tick(&opening, &sim, quiet);

    let mut outcome = None;
    for _ in 0..ticks {
        let result = sim.step();
        record_stats(&mut stats, &result);
        print_tick(&result, &sim, quiet);
        if snapshots {
            if let Err(err) = save_snapshot_tick(&FleetSnapshot::capture(&sim)) {
                eprintln!("warning: failed to write tick snapshot: {}", err);
            }
        }
        if result.outcome.is_some() {
            outcome = result.outcome;
            break;
        }
        if !delay.is_zero() {
            thread::sleep(delay);
        }
    }

    if let Err(err) = save_snapshot(&FleetSnapshot::capture(&sim)) {
        eprintln!("warning: failed to write fleet snapshot: {}", err);
    }
    if let Err(err) = save_action_stats(&stats) {
        eprintln!("warning: failed to save action stats: {}", err);
    }

    println!();
    match outcome {
        Some(outcome) => println!("Result: {}", outcome),
        None => println!(
            "Result: tick limit reached with {} targets remaining",
            sim.grid().count(TileKind::Target)
        ),
    }
    let active = sim.drones().iter().filter(|d| d.is_active()).count();
    println!(
        "Ticks: {} | drones active: {}/{} | missiles left: {} | targets known: {}",
        sim.tick(),
        active,
        sim.drones().len(),
        sim.missiles().remaining(),
        sim.controller().world().known_targets().len()
    );
    Ok(())
}

fn record_stats(stats: &mut ActionStatsStore, result: &TickResult) {
    for event in &result.events {
        match event {
            FleetEvent::Drone { drone_id, event } => stats.record(drone_id, event),
            FleetEvent::Lost(loss) => stats.mark_destroyed(&loss.drone_id),
            _ => {}
        }
    }
}

fn print_tick(result: &TickResult, sim: &Simulation<ScriptedController>, quiet: bool) {
    if quiet && !result.planned && result.outcome.is_none() {
        return;
    }

    println!("\n===== TICK {} =====", result.tick);
    if let Some(reasoning) = &result.reasoning {
        println!("Controller: {}", reasoning);
    }
    for event in &result.events {
        if quiet && matches!(event, FleetEvent::Drone { .. }) {
            continue;
        }
        println!(" - {}", describe_event(event));
    }
    for report in &result.reports {
        println!(
            " * report {} | {} | at {} | battery={:.2} | tiles={}",
            report.drone_id,
            report.status,
            report.position,
            report.battery,
            report.scan_results.len()
        );
    }
    if result.planned {
        let world = sim.controller().world();
        println!(
            "Known: tiles={} targets={} threat_zones={} | missiles={}",
            world.known_tiles().len(),
            world.known_targets().len(),
            world.threat_zones().len(),
            sim.missiles().remaining()
        );
    }
}

fn describe_event(event: &FleetEvent) -> String {
    match event {
        FleetEvent::Drone { drone_id, event } => match event {
            DroneEvent::Moved { from, to } => format!("{} moved {} -> {}", drone_id, from, to),
            DroneEvent::Collided { at } => {
                format!("{} hit an unknown obstacle at {}, replanning", drone_id, at)
            }
            DroneEvent::Arrived { at } => format!("{} reached {}", drone_id, at),
            DroneEvent::PathPlanned { target, hops } => {
                format!("{} planned {} hops to {}", drone_id, hops, target)
            }
            DroneEvent::NoPath { target } => {
                format!("{} found no path to {}, standing by", drone_id, target)
            }
            DroneEvent::Scanned {
                at,
                tiles,
                opportunistic,
            } => format!(
                "{} scanned {} tiles around {}{}",
                drone_id,
                tiles,
                at,
                if *opportunistic { " (en route)" } else { "" }
            ),
            DroneEvent::Recharged { battery } => {
                format!("{} charging at base, battery={:.1}", drone_id, battery)
            }
            DroneEvent::Destroyed => format!("{} battery depleted, destroyed", drone_id),
        },
        FleetEvent::Lost(loss) => match &loss.cause {
            LossCause::KillZone {
                hss_location,
                radius,
            } => format!(
                "!!! {} destroyed at {} by emitter at {} (radius {})",
                loss.drone_id, loss.position, hss_location, radius
            ),
            LossCause::Battery => format!("{} lost at {} (battery)", loss.drone_id, loss.position),
            LossCause::Unexplained => format!("{} lost at {}", loss.drone_id, loss.position),
        },
        FleetEvent::CommandIssued {
            drone_id,
            command_type,
        } => format!("command {} -> {}", drone_id, command_type),
        FleetEvent::CommandSkipped {
            drone_id,
            command_type,
            reason,
        } => format!(
            "command {} for {} skipped: {}",
            command_type,
            drone_id.as_deref().unwrap_or("-"),
            reason
        ),
        FleetEvent::Strike(outcome) => match outcome {
            FireOutcome::Destroyed { target_id, at } => {
                format!("MISSILE FIRED: {} at {} destroyed", target_id, at)
            }
            FireOutcome::NoTarget { at, .. } => {
                format!("MISSILE ABORT: no target at {}, missile saved", at)
            }
            FireOutcome::Depleted => "MISSILE ABORT: no missiles left".to_string(),
        },
    }
}

fn run_plan(
    map: PathBuf,
    from: Coord,
    to: Coord,
    threats: &[ThreatArg],
    obstacles: &[CoordArg],
    reveal: bool,
) -> Result<()> {
    let grid = Grid::load(&map, DEFAULT_KILL_ZONE_RADIUS)
        .with_context(|| format!("loading map {}", map.display()))?;
    if !grid.in_bounds(from) {
        bail!("start {} is outside the {}x{} map", from, grid.width(), grid.height());
    }

    let mut knowledge = KnowledgeStore::new();
    if reveal {
        for tile in grid.tiles().filter(|t| t.kind == TileKind::Obstacle) {
            knowledge.record_obstacle(tile.position);
        }
    }
    for CoordArg(at) in obstacles {
        knowledge.record_obstacle(*at);
    }
    let zones: Vec<ThreatZone> = threats
        .iter()
        .map(|t| ThreatZone::legacy(t.center, t.radius))
        .collect();

    let Some(path) = plan_path(from, to, Bounds::of(&grid), &knowledge, &zones) else {
        println!("No path from {} to {} under current knowledge.", from, to);
        return Ok(());
    };

    println!("Path {} -> {}: {} hops", from, to, path.len());
    if !path.is_empty() {
        let steps: Vec<String> = path.iter().map(ToString::to_string).collect();
        println!("  {}", steps.join(" -> "));
    }
    let overlay = grid.render_with(|at| {
        if at == from {
            Some('S')
        } else if at == to {
            Some('G')
        } else if path.contains(&at) {
            Some('*')
        } else if in_any_zone(&zones, at) {
            Some('~')
        } else {
            None
        }
    });
    print!("{}", overlay);
    Ok(())
}
