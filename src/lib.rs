pub mod modules;

pub use modules::command::{CommandMessage, CommandType, Order, ScanMode};
pub use modules::config::{ConfigError, SimConfig};
pub use modules::controller::{
    Controller, DroneLoss, ESTIMATED_THREAT_RADIUS, LossCause, Plan, Script, ScriptError,
    ScriptedController, WorldModel,
};
pub use modules::drone::{Drone, DroneConfig, DroneEvent, DroneStatus, Report};
pub use modules::grid::{
    Coord, DEFAULT_KILL_ZONE_RADIUS, Grid, GridAccessor, MapError, Properties, Tile, TileKind,
};
pub use modules::knowledge::{KnowledgeStore, ThreatZone, TileSummary, in_any_zone};
pub use modules::missile::{FireOutcome, MissileSystem};
pub use modules::planner::{Bounds, NEIGHBORS, is_path_clear, is_traversable, plan_path};
pub use modules::simulation::{FleetEvent, Outcome, Simulation, TickResult};
pub use modules::stats::{
    ActionStats, ActionStatsStore, load_action_stats, save_action_stats,
};
pub use modules::view::{
    DATA_DIR, DroneSnapshot, FleetSnapshot, load_snapshot, save_snapshot, save_snapshot_tick,
};
