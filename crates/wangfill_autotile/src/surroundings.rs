//! Query signatures from grid context
//!
//! Builds the [`WangId`] a cell asks for by reading its 8 neighbors. Edge
//! positions take the cardinal neighbor's terrain directly. Corner positions
//! are shared by four cells, so a [`CornerRule`] decides which terrain the
//! corner gets.

use crate::grid::TerrainGrid;
use serde::{Deserialize, Serialize};
use wangfill_core::{WangId, WangSetType};

/// Neighbor offsets in clockwise order matching WangId positions
/// (y grows downward, so Top is y - 1)
pub const NEIGHBOR_OFFSETS: [(i32, i32); 8] = [
    (0, -1),  // 0 = Top
    (1, -1),  // 1 = TopRight
    (1, 0),   // 2 = Right
    (1, 1),   // 3 = BottomRight
    (0, 1),   // 4 = Bottom
    (-1, 1),  // 5 = BottomLeft
    (-1, 0),  // 6 = Left
    (-1, -1), // 7 = TopLeft
];

/// How a corner position is filled from the four cells that share it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CornerRule {
    /// The diagonal's terrain only if the diagonal and both adjacent
    /// cardinal neighbors agree, otherwise the cell's own terrain
    #[default]
    Consistent,
    /// The diagonal neighbor's terrain as-is
    Diagonal,
    /// The terrain held by most of the four cells, ties to the cell's own
    Majority,
}

impl CornerRule {
    /// Resolve one corner from the cell's own terrain, the cardinal neighbor
    /// before it (counter-clockwise), the diagonal, and the cardinal after it
    pub fn resolve(&self, own: u8, before: u8, diagonal: u8, after: u8) -> u8 {
        match self {
            CornerRule::Consistent => {
                if before == diagonal && after == diagonal {
                    diagonal
                } else {
                    own
                }
            }
            CornerRule::Diagonal => diagonal,
            CornerRule::Majority => {
                let cells = [own, before, diagonal, after];
                let count = |value: u8| cells.iter().filter(|&&c| c == value).count();
                let own_count = count(own);
                cells
                    .into_iter()
                    .map(|value| (count(value), value))
                    .filter(|&(n, _)| n > own_count)
                    .max_by_key(|&(n, _)| n)
                    .map_or(own, |(_, value)| value)
            }
        }
    }
}

/// Compute the query signature of cell `(x, y)`
///
/// Out-of-bounds neighbors read as `boundary`. Slots that the set type does
/// not use stay wildcard.
pub fn query_signature(
    grid: &TerrainGrid,
    x: u32,
    y: u32,
    set_type: WangSetType,
    rule: CornerRule,
    boundary: u8,
) -> WangId {
    let (cx, cy) = (x as i32, y as i32);
    let own = grid.terrain_or(cx, cy, boundary);

    let mut neighbors = [0u8; 8];
    for (i, (dx, dy)) in NEIGHBOR_OFFSETS.iter().enumerate() {
        neighbors[i] = grid.terrain_or(cx + dx, cy + dy, boundary);
    }

    let mut slots = [0u8; 8];
    for &i in set_type.active_positions() {
        slots[i] = if WangId::is_corner(i) {
            rule.resolve(
                own,
                neighbors[WangId::prev_index(i)],
                neighbors[i],
                neighbors[WangId::next_index(i)],
            )
        } else {
            neighbors[i]
        };
    }

    WangId::from_slots(slots)
}
