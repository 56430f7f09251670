//! Wang signatures
//!
//! A [`WangId`] labels the 8 border positions of a tile with terrain colors,
//! using Tiled's position indexing:
//!   7|0|1
//!   6|X|2
//!   5|4|3
//! - Even indices (0,2,4,6) = Edges (Top, Right, Bottom, Left)
//! - Odd indices (1,3,5,7) = Corners (TopRight, BottomRight, BottomLeft, TopLeft)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of positions in a signature
pub const WANG_SLOTS: usize = 8;

/// Type of wang set - determines which signature positions are meaningful
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WangSetType {
    /// Only the 4 corners matter
    /// Good for basic terrain transitions
    #[default]
    Corner,
    /// Only the 4 edges matter
    /// Good for roads, platforms, paths
    Edge,
    /// 4 corners + 4 edges
    Mixed,
}

impl WangSetType {
    /// Signature positions that take part in matching
    pub fn active_positions(&self) -> &'static [usize] {
        match self {
            WangSetType::Corner => &[1, 3, 5, 7],
            WangSetType::Edge => &[0, 2, 4, 6],
            WangSetType::Mixed => &[0, 1, 2, 3, 4, 5, 6, 7],
        }
    }

    pub fn is_active(&self, position: usize) -> bool {
        match self {
            WangSetType::Corner => WangId::is_corner(position),
            WangSetType::Edge => position < WANG_SLOTS && !WangId::is_corner(position),
            WangSetType::Mixed => position < WANG_SLOTS,
        }
    }

    /// Name as written in a `.tsx` file
    pub fn as_str(&self) -> &'static str {
        match self {
            WangSetType::Corner => "corner",
            WangSetType::Edge => "edge",
            WangSetType::Mixed => "mixed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "corner" => Some(WangSetType::Corner),
            "edge" => Some(WangSetType::Edge),
            "mixed" => Some(WangSetType::Mixed),
            _ => None,
        }
    }
}

/// Terrain colors at all 8 positions of a tile
///
/// `Some(i)` is an index into the owning wang set's color table. `None` is the
/// wildcard: the position is unconstrained and matches any terrain. In the
/// comma notation the wildcard is written `0` and color `i` is written `i + 1`.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct WangId {
    /// Top=0, TopRight=1, Right=2, BottomRight=3, Bottom=4, BottomLeft=5, Left=6, TopLeft=7
    pub colors: [Option<usize>; WANG_SLOTS],
}

impl WangId {
    pub const WILDCARD: Self = WangId {
        colors: [None; WANG_SLOTS],
    };

    /// Create a WangId with all positions set to one color
    pub fn filled(color: usize) -> Self {
        WangId {
            colors: [Some(color); WANG_SLOTS],
        }
    }

    /// Build from raw slot values in comma notation (0 = wildcard)
    pub fn from_slots(slots: [u8; WANG_SLOTS]) -> Self {
        let mut wang_id = WangId::WILDCARD;
        for (color, slot) in wang_id.colors.iter_mut().zip(slots) {
            *color = slot.checked_sub(1).map(usize::from);
        }
        wang_id
    }

    /// Raw slot values in comma notation
    pub fn to_slots(&self) -> [usize; WANG_SLOTS] {
        self.colors.map(|c| c.map_or(0, |i| i + 1))
    }

    /// Check if index is a corner (odd indices: 1,3,5,7)
    pub fn is_corner(i: usize) -> bool {
        i % 2 == 1
    }

    /// Get next index clockwise
    pub fn next_index(i: usize) -> usize {
        (i + 1) % 8
    }

    /// Get previous index counter-clockwise
    pub fn prev_index(i: usize) -> usize {
        (i + 7) % 8
    }

    /// Copy with every position outside `set_type` cleared to wildcard
    pub fn masked(&self, set_type: WangSetType) -> Self {
        let mut wang_id = *self;
        for (i, color) in wang_id.colors.iter_mut().enumerate() {
            if !set_type.is_active(i) {
                *color = None;
            }
        }
        wang_id
    }

    /// Highest color index referenced at any position
    pub fn max_color(&self) -> Option<usize> {
        self.colors.iter().flatten().copied().max()
    }

    pub fn is_wildcard(&self) -> bool {
        self.colors.iter().all(|c| c.is_none())
    }
}

impl fmt::Display for WangId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, slot) in self.to_slots().iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{slot}")?;
        }
        Ok(())
    }
}

/// Errors from parsing the comma notation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseWangIdError {
    #[error("expected 8 comma-separated slots, found {0}")]
    WrongLength(usize),
    #[error("invalid slot value '{0}'")]
    InvalidSlot(String),
}

impl FromStr for WangId {
    type Err = ParseWangIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        if parts.len() != WANG_SLOTS {
            return Err(ParseWangIdError::WrongLength(parts.len()));
        }

        let mut wang_id = WangId::WILDCARD;
        for (color, part) in wang_id.colors.iter_mut().zip(parts) {
            let slot: usize = part
                .parse()
                .map_err(|_| ParseWangIdError::InvalidSlot(part.to_string()))?;
            *color = slot.checked_sub(1);
        }
        Ok(wang_id)
    }
}

impl From<WangId> for String {
    fn from(wang_id: WangId) -> Self {
        wang_id.to_string()
    }
}

impl TryFrom<String> for WangId {
    type Error = ParseWangIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
