//! Connectivity resolver for wire-like buildings.
//!
//! Given which of the four edges of a tile connect to a neighbor of the same
//! conductive class, pick the tile shape (straight, corner, tee, cross) and
//! the canonical rotation so adjacent segments render as one network.
//!
//! The pattern is encoded with one hex digit per edge
//! (`top = 0x1000`, `right = 0x0100`, `bottom = 0x0010`, `left = 0x0001`)
//! and resolved through an exhaustive sixteen-entry table. Resolution is a
//! pure function of the four flags, so re-resolving after any neighbor
//! change always lands on the same answer.

use crate::geometry::{Direction, GridPosition, Rotation};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Shapes
// ---------------------------------------------------------------------------

/// Discrete wire tile shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileShape {
    #[default]
    Straight,
    Corner,
    Tee,
    Cross,
}

impl TileShape {
    /// Rotation-variant order consumed by sprite and overlay selection.
    /// Reordering this changes every stored rotation variant.
    pub const ROTATION_VARIANTS: [TileShape; 4] = [
        TileShape::Straight,
        TileShape::Corner,
        TileShape::Tee,
        TileShape::Cross,
    ];

    pub fn rotation_variant(self) -> usize {
        match self {
            TileShape::Straight => 0,
            TileShape::Corner => 1,
            TileShape::Tee => 2,
            TileShape::Cross => 3,
        }
    }

    pub fn from_rotation_variant(index: usize) -> Option<Self> {
        Self::ROTATION_VARIANTS.get(index).copied()
    }
}

/// Conductive class of a wire. Wires only join wires of the same class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConductiveClass {
    #[default]
    First,
    Second,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AutotileError {
    #[error("invalid connectivity input {value:#06x}: every edge must be 0 or 1")]
    InvalidConnectivityInput { value: u32 },
}

// ---------------------------------------------------------------------------
// Connectivity pattern
// ---------------------------------------------------------------------------

const TOP: u16 = 0x1000;
const RIGHT: u16 = 0x0100;
const BOTTOM: u16 = 0x0010;
const LEFT: u16 = 0x0001;

/// Which edges of a tile connect to a neighbor. Derived fresh on every
/// placement or neighbor change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ConnectivityPattern {
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
    pub left: bool,
}

impl ConnectivityPattern {
    pub fn new(top: bool, right: bool, bottom: bool, left: bool) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    /// Build a pattern by asking `connected` about each edge.
    pub fn from_fn(mut connected: impl FnMut(Direction) -> bool) -> Self {
        Self {
            top: connected(Direction::Top),
            right: connected(Direction::Right),
            bottom: connected(Direction::Bottom),
            left: connected(Direction::Left),
        }
    }

    /// Decode a hex-digit code. Any digit other than 0 or 1 is rejected.
    pub fn from_code(code: u16) -> Result<Self, AutotileError> {
        let digit = |weight: u16| match (code / weight) % 0x10 {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(AutotileError::InvalidConnectivityInput {
                value: u32::from(code),
            }),
        };
        Ok(Self {
            top: digit(TOP)?,
            right: digit(RIGHT)?,
            bottom: digit(BOTTOM)?,
            left: digit(LEFT)?,
        })
    }

    /// Decode raw per-edge values in top, right, bottom, left order, as
    /// handed over by an untyped adjacency source.
    pub fn from_edge_values(values: [u8; 4]) -> Result<Self, AutotileError> {
        let mut flags = [false; 4];
        for (flag, &value) in flags.iter_mut().zip(values.iter()) {
            *flag = match value {
                0 => false,
                1 => true,
                _ => {
                    return Err(AutotileError::InvalidConnectivityInput {
                        value: u32::from(value),
                    });
                }
            };
        }
        let [top, right, bottom, left] = flags;
        Ok(Self::new(top, right, bottom, left))
    }

    /// One hex digit per edge, top first.
    pub fn code(&self) -> u16 {
        let mut code = 0;
        if self.top {
            code |= TOP;
        }
        if self.right {
            code |= RIGHT;
        }
        if self.bottom {
            code |= BOTTOM;
        }
        if self.left {
            code |= LEFT;
        }
        code
    }

    pub fn is_connected(&self, direction: Direction) -> bool {
        match direction {
            Direction::Top => self.top,
            Direction::Right => self.right,
            Direction::Bottom => self.bottom,
            Direction::Left => self.left,
        }
    }

    pub fn connection_count(&self) -> usize {
        Direction::all()
            .into_iter()
            .filter(|d| self.is_connected(*d))
            .count()
    }
}

// ---------------------------------------------------------------------------
// Resolution
// ---------------------------------------------------------------------------

/// Shape and rotation picked for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResolvedTileShape {
    pub shape: TileShape,
    /// Always in `[0, 360)` and a multiple of 90.
    pub rotation_degrees: u16,
}

impl ResolvedTileShape {
    pub fn rotation_variant(&self) -> usize {
        self.shape.rotation_variant()
    }

    pub fn rotation(&self) -> Rotation {
        match self.rotation_degrees {
            90 => Rotation::Cw90,
            180 => Rotation::Cw180,
            270 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }
}

/// Resolve the shape and rotation for a connectivity pattern.
pub fn compute_optimal_shape_and_rotation(pattern: ConnectivityPattern) -> ResolvedTileShape {
    use TileShape::*;

    let ConnectivityPattern {
        top,
        right,
        bottom,
        left,
    } = pattern;

    let (shape, offset): (TileShape, i32) = match (top, right, bottom, left) {
        (false, false, false, false) => (Straight, 0), // 0x0000
        (false, false, false, true) => (Straight, 90), // 0x0001
        (false, false, true, false) => (Straight, 0),  // 0x0010
        (false, false, true, true) => (Corner, 90),    // 0x0011
        (false, true, false, false) => (Straight, 90), // 0x0100
        (false, true, false, true) => (Straight, 90),  // 0x0101
        (false, true, true, false) => (Corner, 0),     // 0x0110
        (false, true, true, true) => (Tee, 0),         // 0x0111
        (true, false, false, false) => (Straight, 0),  // 0x1000
        (true, false, false, true) => (Corner, 180),   // 0x1001
        (true, false, true, false) => (Straight, 0),   // 0x1010
        (true, false, true, true) => (Tee, 90),        // 0x1011
        (true, true, false, false) => (Corner, -90),   // 0x1100
        (true, true, false, true) => (Tee, 180),       // 0x1101
        (true, true, true, false) => (Tee, -90),       // 0x1110
        (true, true, true, true) => (Cross, 0),        // 0x1111
    };

    ResolvedTileShape {
        shape,
        rotation_degrees: ((offset + 360 * 10) % 360) as u16,
    }
}

/// Resolve a raw hex-digit code, rejecting digits other than 0 or 1.
pub fn resolve_code(code: u16) -> Result<ResolvedTileShape, AutotileError> {
    ConnectivityPattern::from_code(code).map(compute_optimal_shape_and_rotation)
}

// ---------------------------------------------------------------------------
// Adjacency query
// ---------------------------------------------------------------------------

/// Adjacency source supplied by the placement layer.
///
/// Answers whether the neighbor across `edge` of `tile` connects to a
/// wire-like structure of `class`. The resolver never walks the grid itself.
pub trait EdgeConnectivity {
    fn compute_edge_connectivity(
        &self,
        tile: GridPosition,
        class: ConductiveClass,
        edge: Direction,
    ) -> bool;
}

/// Query all four edges of `tile`.
pub fn connectivity_at<Q: EdgeConnectivity + ?Sized>(
    query: &Q,
    tile: GridPosition,
    class: ConductiveClass,
) -> ConnectivityPattern {
    ConnectivityPattern::from_fn(|edge| query.compute_edge_connectivity(tile, class, edge))
}

/// Query all four edges of `tile` and resolve its shape.
pub fn resolve_at<Q: EdgeConnectivity + ?Sized>(
    query: &Q,
    tile: GridPosition,
    class: ConductiveClass,
) -> ResolvedTileShape {
    compute_optimal_shape_and_rotation(connectivity_at(query, tile, class))
}
