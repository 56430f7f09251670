//! Terrain grid input
//!
//! A [`TerrainGrid`] assigns one terrain color per cell, in the same notation
//! as wang signatures: `0` is unset (reads as a wildcard), `k` is color `k` of
//! the wang set being resolved. Rows run top to bottom, so the neighbor above
//! `(x, y)` is `(x, y - 1)`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from building a grid
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid is {width}x{height} but has {actual} cells")]
    SizeMismatch { width: u32, height: u32, actual: usize },
    #[error("row {row} has {actual} cells, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "GridData", into = "GridData")]
pub struct TerrainGrid {
    width: u32,
    height: u32,
    cells: Vec<u8>,
    /// Terrain read for any neighbor outside the grid
    boundary: u8,
}

/// Serialized form, checked before it becomes a grid
#[derive(Serialize, Deserialize)]
struct GridData {
    width: u32,
    height: u32,
    cells: Vec<u8>,
    #[serde(default)]
    boundary: u8,
}

impl TryFrom<GridData> for TerrainGrid {
    type Error = GridError;

    fn try_from(data: GridData) -> Result<Self, Self::Error> {
        if data.cells.len() != (data.width as usize) * (data.height as usize) {
            return Err(GridError::SizeMismatch {
                width: data.width,
                height: data.height,
                actual: data.cells.len(),
            });
        }
        Ok(Self {
            width: data.width,
            height: data.height,
            cells: data.cells,
            boundary: data.boundary,
        })
    }
}

impl From<TerrainGrid> for GridData {
    fn from(grid: TerrainGrid) -> Self {
        Self {
            width: grid.width,
            height: grid.height,
            cells: grid.cells,
            boundary: grid.boundary,
        }
    }
}

impl TerrainGrid {
    /// Create a grid with every cell unset
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a grid with every cell set to one terrain
    pub fn filled(width: u32, height: u32, terrain: u8) -> Self {
        Self {
            width,
            height,
            cells: vec![terrain; (width as usize) * (height as usize)],
            boundary: 0,
        }
    }

    /// Build from rows listed top to bottom
    pub fn from_rows(rows: &[&[u8]]) -> Result<Self, GridError> {
        let width = rows.first().map_or(0, |r| r.len());
        let mut cells = Vec::with_capacity(width * rows.len());
        for (row, values) in rows.iter().enumerate() {
            if values.len() != width {
                return Err(GridError::RaggedRow {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        Ok(Self {
            width: width as u32,
            height: rows.len() as u32,
            cells,
            boundary: 0,
        })
    }

    /// Set the terrain read for out-of-bounds neighbors
    pub fn with_boundary(mut self, boundary: u8) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn boundary(&self) -> u8 {
        self.boundary
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= 0 && y >= 0 && x < self.width as i32 && y < self.height as i32
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y * self.width + x) as usize
    }

    /// Terrain of an in-bounds cell
    pub fn get(&self, x: u32, y: u32) -> Option<u8> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(self.index(x, y)).copied()
    }

    /// Set the terrain of a cell, returning false if out of bounds
    pub fn set(&mut self, x: u32, y: u32, terrain: u8) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        let idx = self.index(x, y);
        self.cells[idx] = terrain;
        true
    }

    /// Terrain at any coordinate, using `boundary` outside the grid
    pub fn terrain_or(&self, x: i32, y: i32, boundary: u8) -> u8 {
        if self.contains(x, y) {
            self.cells[self.index(x as u32, y as u32)]
        } else {
            boundary
        }
    }

    /// All cell values in row-major order
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }
}
