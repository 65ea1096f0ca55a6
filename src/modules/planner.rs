use std::collections::{HashMap, VecDeque};

use crate::modules::grid::{Coord, GridAccessor};
use crate::modules::knowledge::{KnowledgeStore, ThreatZone, in_any_zone};

/// Cardinal moves first, then diagonals. Every hop costs the same.
pub const NEIGHBORS: [(i32, i32); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (-1, -1),
    (1, -1),
    (-1, 1),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bounds {
    pub width: i32,
    pub height: i32,
}

impl Bounds {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    pub fn of(grid: &(impl GridAccessor + ?Sized)) -> Self {
        Self::new(grid.width(), grid.height())
    }

    pub fn contains(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width && at.y < self.height
    }
}

/// True when a coordinate may be entered under the drone's own beliefs:
/// not a known obstacle and outside every known threat zone.
pub fn is_traversable(at: Coord, knowledge: &KnowledgeStore, threats: &[ThreatZone]) -> bool {
    !knowledge.is_known_obstacle(at) && !in_any_zone(threats, at)
}

/// A cached path stays usable while none of its waypoints became a known
/// obstacle or fell inside a known threat zone.
pub fn is_path_clear<'a>(
    path: impl IntoIterator<Item = &'a Coord>,
    knowledge: &KnowledgeStore,
    threats: &[ThreatZone],
) -> bool {
    path.into_iter()
        .all(|at| is_traversable(*at, knowledge, threats))
}

/// Shortest hop-count route from `start` to `target` over the 8-connected grid.
///
/// Only the supplied knowledge and threat snapshot are consulted; unknown cells
/// are assumed passable. The returned waypoints exclude `start` and end at
/// `target`. `Some(vec![])` means the drone is already there, `None` means no
/// route exists under current beliefs.
pub fn plan_path(
    start: Coord,
    target: Coord,
    bounds: Bounds,
    knowledge: &KnowledgeStore,
    threats: &[ThreatZone],
) -> Option<Vec<Coord>> {
    if start == target {
        return Some(Vec::new());
    }

    let mut queue = VecDeque::from([start]);
    let mut came_from: HashMap<Coord, Coord> = HashMap::new();
    came_from.insert(start, start);

    while let Some(current) = queue.pop_front() {
        if current == target {
            let mut path = Vec::new();
            let mut cursor = target;
            while cursor != start {
                path.push(cursor);
                cursor = came_from[&cursor];
            }
            path.reverse();
            return Some(path);
        }

        for (dx, dy) in NEIGHBORS {
            let next = current.offset(dx, dy);
            if !bounds.contains(next) || came_from.contains_key(&next) {
                continue;
            }
            if !is_traversable(next, knowledge, threats) {
                continue;
            }
            came_from.insert(next, current);
            queue.push_back(next);
        }
    }

    None
}
