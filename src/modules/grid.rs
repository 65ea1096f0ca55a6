use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Free-form tile attributes (target ids, kill-zone radius, ...).
pub type Properties = serde_json::Map<String, Value>;

/// Kill-zone radius assumed for an HSS tile that carries no explicit radius.
pub const DEFAULT_KILL_ZONE_RADIUS: i32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn origin() -> Self {
        Self { x: 0, y: 0 }
    }

    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Hop count on an 8-connected grid.
    pub fn chebyshev(self, other: Coord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    pub fn manhattan(self, other: Coord) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    pub fn distance_sq(self, other: Coord) -> i64 {
        let dx = (self.x - other.x) as i64;
        let dy = (self.y - other.y) as i64;
        dx * dx + dy * dy
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.x, self.y)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Empty,
    Obstacle,
    Base,
    Target,
    Hss,
}

impl TileKind {
    pub const fn label(self) -> &'static str {
        match self {
            TileKind::Empty => "EMPTY",
            TileKind::Obstacle => "OBSTACLE",
            TileKind::Base => "BASE",
            TileKind::Target => "TARGET",
            TileKind::Hss => "HSS",
        }
    }

    pub const fn glyph(self) -> char {
        match self {
            TileKind::Empty => '.',
            TileKind::Obstacle => '#',
            TileKind::Base => 'B',
            TileKind::Target => 'T',
            TileKind::Hss => 'H',
        }
    }

    pub fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' => Some(TileKind::Empty),
            '#' => Some(TileKind::Obstacle),
            'B' | 'b' => Some(TileKind::Base),
            'T' | 't' => Some(TileKind::Target),
            'H' | 'h' => Some(TileKind::Hss),
            _ => None,
        }
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Ground-truth cell state.
#[derive(Clone, Debug, PartialEq)]
pub struct Tile {
    pub kind: TileKind,
    pub position: Coord,
    pub properties: Properties,
}

impl Tile {
    pub fn new(kind: TileKind, position: Coord) -> Self {
        Self {
            kind,
            position,
            properties: Properties::new(),
        }
    }

    /// Radius of the kill zone around an HSS tile, if this is one.
    pub fn kill_zone_radius(&self) -> Option<i32> {
        if self.kind != TileKind::Hss {
            return None;
        }
        let radius = self
            .properties
            .get("kill_zone_radius")
            .and_then(Value::as_i64)
            .map(|r| r as i32)
            .unwrap_or(DEFAULT_KILL_ZONE_RADIUS);
        Some(radius)
    }
}

/// Read-only, ground-truth view of the world consumed by drones.
pub trait GridAccessor {
    fn width(&self) -> i32;

    fn height(&self) -> i32;

    fn tile(&self, at: Coord) -> Option<&Tile>;

    /// Tiles within Manhattan `radius` of `at` that the sensor can see.
    fn visible_tiles(&self, at: Coord, radius: i32) -> Vec<Tile>;

    fn in_bounds(&self, at: Coord) -> bool {
        at.x >= 0 && at.y >= 0 && at.x < self.width() && at.y < self.height()
    }
}

#[derive(Debug, Error)]
pub enum MapError {
    #[error("failed to read map {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("map layout is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown glyph '{glyph}' at ({x},{y})")]
    UnknownGlyph { glyph: char, x: usize, y: usize },
}

/// Dense row-major tile storage.
#[derive(Clone, Debug)]
pub struct Grid {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
}

impl Grid {
    /// An all-EMPTY grid.
    pub fn new(width: i32, height: i32) -> Self {
        let width = width.max(0);
        let height = height.max(0);
        let mut tiles = Vec::with_capacity((width * height) as usize);
        for y in 0..height {
            for x in 0..width {
                tiles.push(Tile::new(TileKind::Empty, Coord::new(x, y)));
            }
        }
        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn load(path: impl AsRef<Path>, hss_radius: i32) -> Result<Self, MapError> {
        let path = path.as_ref();
        let layout = fs::read_to_string(path).map_err(|source| MapError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&layout, hss_radius)
    }

    /// Builds a grid from an ASCII layout; line `n` becomes `y = n`.
    pub fn parse(layout: &str, hss_radius: i32) -> Result<Self, MapError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(str::trim_end)
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(MapError::Empty);
        };
        let width = first.chars().count();

        let mut grid = Grid::new(width as i32, rows.len() as i32);
        let mut targets = 0u32;
        let mut emitters = 0u32;

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MapError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, glyph) in row.chars().enumerate() {
                let kind =
                    TileKind::from_glyph(glyph).ok_or(MapError::UnknownGlyph { glyph, x, y })?;
                let mut properties = Properties::new();
                match kind {
                    TileKind::Target => {
                        targets += 1;
                        properties.insert("target_id".into(), json!(format!("Target-{}", targets)));
                        properties.insert("status".into(), json!("ACTIVE"));
                    }
                    TileKind::Hss => {
                        emitters += 1;
                        properties.insert("hss_id".into(), json!(format!("HSS-{}", emitters)));
                        properties.insert("kill_zone_radius".into(), json!(hss_radius));
                    }
                    _ => {}
                }
                grid.set_tile(Coord::new(x as i32, y as i32), kind, properties);
            }
        }

        Ok(grid)
    }

    fn index(&self, at: Coord) -> Option<usize> {
        if self.in_bounds(at) {
            Some((at.y * self.width + at.x) as usize)
        } else {
            None
        }
    }

    /// Overwrites a tile; out-of-bounds writes are ignored.
    pub fn set_tile(&mut self, at: Coord, kind: TileKind, properties: Properties) {
        if let Some(idx) = self.index(at) {
            let tile = &mut self.tiles[idx];
            tile.kind = kind;
            tile.properties = properties;
        }
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|t| t.kind == kind).count()
    }

    /// Clears a TARGET tile back to EMPTY, returning its target id.
    pub fn destroy_target(&mut self, at: Coord) -> Option<String> {
        let idx = self.index(at)?;
        let tile = &mut self.tiles[idx];
        if tile.kind != TileKind::Target {
            return None;
        }
        let target_id = tile
            .properties
            .get("target_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("target@{}", at));
        tile.kind = TileKind::Empty;
        tile.properties.clear();
        Some(target_id)
    }

    /// The HSS tile whose kill zone covers `at`, if any.
    pub fn kill_zone_at(&self, at: Coord) -> Option<(&Tile, i32)> {
        self.tiles.iter().find_map(|tile| {
            let radius = tile.kill_zone_radius()?;
            let reach = radius as i64;
            (tile.position.distance_sq(at) <= reach * reach).then_some((tile, radius))
        })
    }

    /// Bresenham walk from `from` to `to`; blocked by any OBSTACLE strictly between them.
    fn line_of_sight(&self, from: Coord, to: Coord) -> bool {
        let dx = (to.x - from.x).abs();
        let dy = (to.y - from.y).abs();
        let step_x = if to.x > from.x { 1 } else { -1 };
        let step_y = if to.y > from.y { 1 } else { -1 };
        let mut err = dx - dy;
        let mut cursor = from;

        while cursor != to {
            if cursor != from
                && self.tile(cursor).map(|t| t.kind) == Some(TileKind::Obstacle)
            {
                return false;
            }
            let e2 = 2 * err;
            if e2 > -dy {
                err -= dy;
                cursor.x += step_x;
            }
            if e2 < dx {
                err += dx;
                cursor.y += step_y;
            }
        }
        true
    }

    /// Renders the grid as glyph rows, letting `overlay` replace individual cells.
    pub fn render_with(&self, overlay: impl Fn(Coord) -> Option<char>) -> String {
        let mut out = String::with_capacity(((self.width + 1) * self.height) as usize);
        for y in 0..self.height {
            for x in 0..self.width {
                let at = Coord::new(x, y);
                let glyph = overlay(at)
                    .or_else(|| self.tile(at).map(|t| t.kind.glyph()))
                    .unwrap_or(' ');
                out.push(glyph);
            }
            out.push('\n');
        }
        out
    }
}

impl GridAccessor for Grid {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn tile(&self, at: Coord) -> Option<&Tile> {
        self.index(at).map(|idx| &self.tiles[idx])
    }

    fn visible_tiles(&self, at: Coord, radius: i32) -> Vec<Tile> {
        let mut visible = Vec::new();
        if self.tile(at).is_none() {
            return visible;
        }
        let radius = radius.max(0);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx.abs() + dy.abs() > radius {
                    continue;
                }
                let target = at.offset(dx, dy);
                let Some(tile) = self.tile(target) else {
                    continue;
                };
                if self.line_of_sight(at, target) {
                    visible.push(tile.clone());
                }
            }
        }
        visible
    }
}
