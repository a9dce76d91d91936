//! Grid geometry: tile positions, footprints, rotations, and edge directions.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Positions
// ---------------------------------------------------------------------------

/// An absolute tile on the grid. `y` grows downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The adjacent tile across the given edge.
    pub fn neighbor(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    pub fn offset_by(&self, offset: TileOffset) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

/// A tile relative to a building's origin (top-left of its footprint).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TileOffset {
    pub x: i32,
    pub y: i32,
}

impl TileOffset {
    pub const ORIGIN: TileOffset = TileOffset { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// Width x height of a building variant in tiles, before rotation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl Dimensions {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A 1x1 building.
    pub const fn single() -> Self {
        Self::new(1, 1)
    }

    /// Both sides are at least one tile.
    pub fn is_valid(&self) -> bool {
        self.width >= 1 && self.height >= 1
    }

    pub fn contains(&self, offset: TileOffset) -> bool {
        offset.x >= 0
            && offset.y >= 0
            && (offset.x as u32) < self.width
            && (offset.y as u32) < self.height
    }

    /// Footprint after rotation. Quarter turns swap the sides.
    pub fn rotated(&self, rotation: Rotation) -> Self {
        match rotation {
            Rotation::None | Rotation::Cw180 => *self,
            Rotation::Cw90 | Rotation::Cw270 => Self::new(self.height, self.width),
        }
    }

    /// Map a local offset into the rotated footprint. The rotated footprint
    /// keeps its origin at the top-left corner.
    pub fn rotate_offset(&self, offset: TileOffset, rotation: Rotation) -> TileOffset {
        let w = self.width as i32;
        let h = self.height as i32;
        match rotation {
            Rotation::None => offset,
            Rotation::Cw90 => TileOffset::new(h - 1 - offset.y, offset.x),
            Rotation::Cw180 => TileOffset::new(w - 1 - offset.x, h - 1 - offset.y),
            Rotation::Cw270 => TileOffset::new(offset.y, w - 1 - offset.x),
        }
    }

    /// Every tile covered at `origin` once rotated. Origin is the top-left corner.
    pub fn tiles(
        &self,
        origin: GridPosition,
        rotation: Rotation,
    ) -> impl Iterator<Item = GridPosition> + use<> {
        let rotated = self.rotated(rotation);
        let w = rotated.width as i32;
        let h = rotated.height as i32;
        (0..h).flat_map(move |dy| (0..w).map(move |dx| GridPosition::new(origin.x + dx, origin.y + dy)))
    }
}

impl Default for Dimensions {
    fn default() -> Self {
        Self::single()
    }
}

// ---------------------------------------------------------------------------
// Rotation
// ---------------------------------------------------------------------------

/// Quarter-turn rotation applied to a placed building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    pub fn all() -> [Rotation; 4] {
        [Rotation::None, Rotation::Cw90, Rotation::Cw180, Rotation::Cw270]
    }

    /// Discrete rotation step for an angle. Negative angles wrap around;
    /// anything that is not a multiple of 90 has no step.
    pub fn from_degrees(degrees: i32) -> Option<Self> {
        if degrees % 90 != 0 {
            return None;
        }
        Some(Self::from_step(degrees.rem_euclid(360) / 90))
    }

    fn from_step(step: i32) -> Self {
        match step.rem_euclid(4) {
            0 => Rotation::None,
            1 => Rotation::Cw90,
            2 => Rotation::Cw180,
            _ => Rotation::Cw270,
        }
    }

    pub fn degrees(self) -> u16 {
        self.index() as u16 * 90
    }

    /// Index into a four-entry rotation table.
    pub fn index(self) -> usize {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 1,
            Rotation::Cw180 => 2,
            Rotation::Cw270 => 3,
        }
    }

    pub fn rotate_cw(self) -> Self {
        Self::from_step(self.index() as i32 + 1)
    }

    pub fn rotate_ccw(self) -> Self {
        Self::from_step(self.index() as i32 + 3)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// One of the four tile edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Top,
    Right,
    Bottom,
    Left,
}

impl Direction {
    /// Clockwise from the top edge.
    pub fn all() -> [Direction; 4] {
        [Direction::Top, Direction::Right, Direction::Bottom, Direction::Left]
    }

    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::Top => (0, -1),
            Direction::Right => (1, 0),
            Direction::Bottom => (0, 1),
            Direction::Left => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        self.rotated(Rotation::Cw180)
    }

    /// Direction after turning the owning building by `rotation`.
    pub fn rotated(self, rotation: Rotation) -> Self {
        let index = match self {
            Direction::Top => 0,
            Direction::Right => 1,
            Direction::Bottom => 2,
            Direction::Left => 3,
        };
        Direction::all()[(index + rotation.index()) % 4]
    }
}
