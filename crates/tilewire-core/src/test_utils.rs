//! Shared test helpers for unit tests, integration tests, and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::autotile::{ConductiveClass, ConnectivityPattern, EdgeConnectivity};
use crate::geometry::{Direction, GridPosition};
use crate::progression::{Progression, Reward};
use std::collections::HashSet;

/// Progression with every reward unlocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllUnlocked;

impl Progression for AllUnlocked {
    fn is_reward_unlocked(&self, _reward: Reward) -> bool {
        true
    }
}

/// Progression with nothing unlocked.
#[derive(Debug, Clone, Copy, Default)]
pub struct NothingUnlocked;

impl Progression for NothingUnlocked {
    fn is_reward_unlocked(&self, _reward: Reward) -> bool {
        false
    }
}

/// Adjacency answered from a fixed set of connected edges.
#[derive(Debug, Clone, Default)]
pub struct StaticConnectivity {
    edges: HashSet<(GridPosition, ConductiveClass, Direction)>,
}

impl StaticConnectivity {
    pub fn connect(&mut self, tile: GridPosition, class: ConductiveClass, edge: Direction) {
        self.edges.insert((tile, class, edge));
    }

    /// Connect every edge of `pattern` at `tile`.
    pub fn with_pattern(tile: GridPosition, class: ConductiveClass, pattern: ConnectivityPattern) -> Self {
        let mut out = Self::default();
        for edge in Direction::all() {
            if pattern.is_connected(edge) {
                out.connect(tile, class, edge);
            }
        }
        out
    }
}

impl EdgeConnectivity for StaticConnectivity {
    fn compute_edge_connectivity(
        &self,
        tile: GridPosition,
        class: ConductiveClass,
        edge: Direction,
    ) -> bool {
        self.edges.contains(&(tile, class, edge))
    }
}

/// All sixteen connectivity patterns, in code order.
pub fn all_patterns() -> Vec<ConnectivityPattern> {
    (0u8..16)
        .map(|bits| {
            ConnectivityPattern::new(bits & 8 != 0, bits & 4 != 0, bits & 2 != 0, bits & 1 != 0)
        })
        .collect()
}
