//! 3x3 overlay highlight patterns and their precomputed quarter-turn rotations.
//!
//! Placement previews draw a small highlight over a building tile. The
//! pattern is authored at rotation 0 and rotated clockwise once per quarter
//! turn; all four are computed up front so preview rendering only indexes.

use crate::geometry::Rotation;
use serde::{Deserialize, Serialize};

const N: usize = 3;

/// Errors from building an overlay matrix out of raw values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MatrixError {
    #[error("overlay matrix needs {expected} cells, got {actual}")]
    WrongLength { expected: usize, actual: usize },
    #[error("overlay matrix cell {index} is {value}, expected 0 or 1")]
    NonBinary { index: usize, value: u8 },
}

/// A 3x3 binary matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct OverlayMatrix(pub [[u8; N]; N]);

impl OverlayMatrix {
    /// Build from nine row-major cells, each 0 or 1.
    pub fn from_flat(cells: &[u8]) -> Result<Self, MatrixError> {
        if cells.len() != N * N {
            return Err(MatrixError::WrongLength {
                expected: N * N,
                actual: cells.len(),
            });
        }
        let mut rows = [[0u8; N]; N];
        for (index, &value) in cells.iter().enumerate() {
            if value > 1 {
                return Err(MatrixError::NonBinary { index, value });
            }
            rows[index / N][index % N] = value;
        }
        Ok(Self(rows))
    }

    /// Const constructor for built-in patterns. Cells must be 0 or 1;
    /// debug builds assert it.
    pub const fn from_rows(rows: [[u8; N]; N]) -> Self {
        let mut r = 0;
        while r < N {
            let mut c = 0;
            while c < N {
                debug_assert!(rows[r][c] <= 1, "overlay matrix cells must be 0 or 1");
                c += 1;
            }
            r += 1;
        }
        Self(rows)
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.0[row][col] != 0
    }

    pub fn rows(&self) -> &[[u8; N]; N] {
        &self.0
    }

    /// Row-major cells.
    pub fn to_flat(&self) -> [u8; N * N] {
        let mut out = [0u8; N * N];
        for (r, row) in self.0.iter().enumerate() {
            out[r * N..(r + 1) * N].copy_from_slice(row);
        }
        out
    }

    /// Quarter turn clockwise: `new[r][c] = old[N-1-c][r]`.
    pub fn rotated_cw(&self) -> Self {
        let mut out = [[0u8; N]; N];
        for (r, row) in out.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = self.0[N - 1 - c][r];
            }
        }
        Self(out)
    }
}

/// The four rotations of one pattern, indexed by quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OverlayRotations([OverlayMatrix; 4]);

impl OverlayRotations {
    pub fn get(&self, rotation: Rotation) -> &OverlayMatrix {
        &self.0[rotation.index()]
    }

    pub fn base(&self) -> &OverlayMatrix {
        &self.0[0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &OverlayMatrix> {
        self.0.iter()
    }
}

/// Precompute the 0/90/180/270 degree rotations of `base`.
pub fn generate_matrix_rotations(base: OverlayMatrix) -> OverlayRotations {
    let r90 = base.rotated_cw();
    let r180 = r90.rotated_cw();
    let r270 = r180.rotated_cw();
    OverlayRotations([base, r90, r180, r270])
}
