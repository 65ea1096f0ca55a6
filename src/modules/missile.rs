use serde::Serialize;
use tracing::{info, warn};

use crate::modules::grid::{Coord, Grid, GridAccessor, TileKind};

/// Result of one strike request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FireOutcome {
    Destroyed { target_id: String, at: Coord },
    /// Nothing to hit; the missile stays in the rack.
    NoTarget { at: Coord, found: Option<TileKind> },
    Depleted,
}

#[derive(Clone, Debug)]
pub struct MissileSystem {
    remaining: u32,
}

impl MissileSystem {
    pub fn new(missiles: u32) -> Self {
        Self { remaining: missiles }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Strikes `at`. Only a TARGET tile consumes a missile.
    pub fn fire(&mut self, grid: &mut Grid, at: Coord) -> FireOutcome {
        if self.remaining == 0 {
            warn!(at = %at, "fire order ignored, no missiles left");
            return FireOutcome::Depleted;
        }

        let found = grid.tile(at).map(|tile| tile.kind);
        match grid.destroy_target(at) {
            Some(target_id) => {
                self.remaining -= 1;
                info!(target_id = %target_id, at = %at, remaining = self.remaining, "target destroyed");
                FireOutcome::Destroyed { target_id, at }
            }
            None => {
                info!(at = %at, ?found, "strike aborted, no target at coordinate");
                FireOutcome::NoTarget { at, found }
            }
        }
    }
}
