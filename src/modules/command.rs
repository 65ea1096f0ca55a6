use std::fmt;

use serde::{Deserialize, Serialize};

use crate::modules::grid::Coord;
use crate::modules::knowledge::{KnowledgeStore, ThreatZone};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanMode {
    /// Scan on arrival and opportunistically while moving.
    Active,
    /// Only scan when told to.
    #[default]
    Passive,
}

impl fmt::Display for ScanMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanMode::Active => write!(f, "ACTIVE"),
            ScanMode::Passive => write!(f, "PASSIVE"),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommandType {
    MoveDrone,
    ScanArea,
    Standby,
    SetScanMode,
    FireMissile,
    #[default]
    #[serde(other)]
    Unsupported,
}

impl CommandType {
    pub const fn label(self) -> &'static str {
        match self {
            CommandType::MoveDrone => "MOVE_DRONE",
            CommandType::ScanArea => "SCAN_AREA",
            CommandType::Standby => "STANDBY",
            CommandType::SetScanMode => "SET_SCAN_MODE",
            CommandType::FireMissile => "FIRE_MISSILE",
            CommandType::Unsupported => "UNSUPPORTED",
        }
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Inbound controller message. Besides the primary `command_type`, any of
/// `scan_mode`, `known_tiles` and `threat_zones` ride along and replace the
/// receiving drone's fields whatever the primary type is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(default)]
    pub command_type: CommandType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub drone_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_position: Option<Coord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scan_mode: Option<ScanMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub known_tiles: Option<KnowledgeStore>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat_zones: Option<Vec<ThreatZone>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl CommandMessage {
    pub fn new(command_type: CommandType) -> Self {
        Self {
            command_type,
            ..Self::default()
        }
    }

    pub fn move_to(target: Coord) -> Self {
        Self {
            target_position: Some(target),
            ..Self::new(CommandType::MoveDrone)
        }
    }

    pub fn scan() -> Self {
        Self::new(CommandType::ScanArea)
    }

    pub fn standby() -> Self {
        Self::new(CommandType::Standby)
    }

    pub fn set_scan_mode(mode: ScanMode) -> Self {
        Self {
            scan_mode: Some(mode),
            ..Self::new(CommandType::SetScanMode)
        }
    }

    pub fn fire_at(target: Coord) -> Self {
        Self {
            target_position: Some(target),
            ..Self::new(CommandType::FireMissile)
        }
    }

    pub fn for_drone(mut self, drone_id: impl Into<String>) -> Self {
        self.drone_id = Some(drone_id.into());
        self
    }

    pub fn with_scan_mode(mut self, mode: ScanMode) -> Self {
        self.scan_mode = Some(mode);
        self
    }

    pub fn with_known_tiles(mut self, known: KnowledgeStore) -> Self {
        self.known_tiles = Some(known);
        self
    }

    pub fn with_threat_zones(mut self, zones: Vec<ThreatZone>) -> Self {
        self.threat_zones = Some(zones);
        self
    }

    /// The primary action a drone should carry out for this message.
    pub fn order(&self) -> Order {
        match (self.command_type, self.target_position) {
            (CommandType::MoveDrone, Some(target)) => Order::MoveDrone { target },
            (CommandType::ScanArea, _) => Order::ScanArea,
            (CommandType::Standby, _) => Order::Standby,
            _ => Order::Idle,
        }
    }
}

/// Primary command held by a drone between ticks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    MoveDrone {
        target: Coord,
    },
    ScanArea,
    #[default]
    Standby,
    /// Malformed or unsupported command: do nothing, not even recharge.
    Idle,
}

impl Order {
    pub const fn label(&self) -> &'static str {
        match self {
            Order::MoveDrone { .. } => "MOVE_DRONE",
            Order::ScanArea => "SCAN_AREA",
            Order::Standby => "STANDBY",
            Order::Idle => "IDLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_controller_message_with_side_channel() {
        let msg: CommandMessage = serde_json::from_value(json!({
            "command_type": "MOVE_DRONE",
            "drone_id": "D-1",
            "target_position": {"x": 25, "y": 75},
            "scan_mode": "ACTIVE",
            "known_tiles": [{"type": "OBSTACLE", "position": {"x": 3, "y": 4}}],
            "threat_zones": [{"center": {"x": 9, "y": 9}, "radius": 8}]
        }))
        .unwrap();

        assert_eq!(msg.drone_id.as_deref(), Some("D-1"));
        assert_eq!(
            msg.order(),
            Order::MoveDrone {
                target: Coord::new(25, 75)
            }
        );
        assert_eq!(msg.scan_mode, Some(ScanMode::Active));
        assert!(
            msg.known_tiles
                .as_ref()
                .is_some_and(|k| k.is_known_obstacle(Coord::new(3, 4)))
        );
        assert_eq!(msg.threat_zones.as_ref().map(Vec::len), Some(1));
    }

    #[test]
    fn unknown_or_malformed_commands_become_idle() {
        let unknown: CommandMessage =
            serde_json::from_value(json!({"command_type": "SELF_DESTRUCT"})).unwrap();
        assert_eq!(unknown.command_type, CommandType::Unsupported);
        assert_eq!(unknown.order(), Order::Idle);

        let missing: CommandMessage = serde_json::from_value(json!({"drone_id": "D-2"})).unwrap();
        assert_eq!(missing.order(), Order::Idle);

        let no_target: CommandMessage =
            serde_json::from_value(json!({"command_type": "MOVE_DRONE"})).unwrap();
        assert_eq!(no_target.order(), Order::Idle);

        assert_eq!(CommandMessage::set_scan_mode(ScanMode::Active).order(), Order::Idle);
    }

    #[test]
    fn builders_serialize_only_present_fields() {
        let msg = CommandMessage::scan().for_drone("D-3");
        assert_eq!(
            serde_json::to_value(&msg).unwrap(),
            json!({"command_type": "SCAN_AREA", "drone_id": "D-3"})
        );
    }
}
