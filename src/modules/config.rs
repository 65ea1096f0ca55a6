use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::drone::DroneConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Fleet-level settings. Every field has a default so a config file only needs
/// the keys it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub drone_count: usize,
    pub spawn_min: i32,
    pub spawn_max: i32,
    pub initial_missiles: u32,
    /// Reports are collected and commands issued every `report_interval` ticks.
    pub report_interval: u64,
    /// Kill-zone radius stamped on HSS tiles when a map is loaded.
    pub hss_kill_radius: i32,
    pub seed: Option<u64>,
    pub drone: DroneConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            drone_count: 10,
            spawn_min: 1,
            spawn_max: 9,
            initial_missiles: 5,
            report_interval: 5,
            hss_kill_radius: 5,
            seed: None,
            drone: DroneConfig::default(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

impl SimConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let drone = &self.drone;
        if !(drone.battery_max > 0.0) {
            return Err(invalid("drone.battery_max", "must be positive"));
        }
        let costs = [
            ("drone.cost_move", drone.cost_move),
            ("drone.cost_scan", drone.cost_scan),
            ("drone.cost_report", drone.cost_report),
            ("drone.recharge_rate", drone.recharge_rate),
        ];
        for (field, value) in costs {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("{} must be non-negative", value)));
            }
        }
        if !(0.0..=1.0).contains(&drone.active_scan_chance) {
            return Err(invalid(
                "drone.active_scan_chance",
                format!("{} is outside [0, 1]", drone.active_scan_chance),
            ));
        }
        if drone.scan_radius < 0 {
            return Err(invalid("drone.scan_radius", "must be non-negative"));
        }
        if self.report_interval == 0 {
            return Err(invalid("report_interval", "must be at least 1"));
        }
        if self.spawn_min > self.spawn_max {
            return Err(invalid(
                "spawn_min",
                format!("{} exceeds spawn_max {}", self.spawn_min, self.spawn_max),
            ));
        }
        if self.hss_kill_radius < 0 {
            return Err(invalid("hss_kill_radius", "must be non-negative"));
        }
        Ok(())
    }
}
