//! Wang tile matching
//!
//! A query signature matches a tile when every active position is compatible:
//! equal colors, or a wildcard on either side. [`WangIndex`] holds one wang
//! set's tiles in ascending tile id order together with their weights, and
//! scans them per query. Authored sets are small (hundreds of tiles at most)
//! so the scan is not bucketed.

use log::debug;
use serde::{Deserialize, Serialize};
use wangfill_core::{Catalog, WangId, WangSet, WangSetType};

/// Which compatible tiles are eligible for the weighted pick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MatchPolicy {
    /// Every compatible tile
    #[default]
    Compatible,
    /// Only the compatible tiles with the most concrete, equal positions
    MostSpecific,
}

/// A tile eligible for selection, with its effective weight
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub tile_id: u32,
    pub weight: f32,
}

/// Check a single position: equal, or a wildcard on either side
pub fn slot_compatible(query: Option<usize>, candidate: Option<usize>) -> bool {
    match (query, candidate) {
        (Some(q), Some(c)) => q == c,
        _ => true,
    }
}

/// Check every active position of `set_type`
pub fn compatible(query: &WangId, candidate: &WangId, set_type: WangSetType) -> bool {
    set_type
        .active_positions()
        .iter()
        .all(|&i| slot_compatible(query.colors[i], candidate.colors[i]))
}

/// Number of active positions where both sides name the same color
pub fn specificity(query: &WangId, candidate: &WangId, set_type: WangSetType) -> usize {
    set_type
        .active_positions()
        .iter()
        .filter(|&&i| query.colors[i].is_some() && query.colors[i] == candidate.colors[i])
        .count()
}

#[derive(Debug, Clone)]
struct IndexedTile {
    tile_id: u32,
    wang_id: WangId,
    probability: f32,
}

/// Matching structure for one wang set
#[derive(Debug, Clone)]
pub struct WangIndex {
    name: String,
    set_type: WangSetType,
    /// Ascending tile id order
    tiles: Vec<IndexedTile>,
    color_probabilities: Vec<f32>,
}

impl WangIndex {
    /// Build the index for a wang set of `catalog`
    pub fn build(catalog: &Catalog, wang_set: &WangSet) -> Self {
        let tiles: Vec<IndexedTile> = wang_set
            .tiles()
            .map(|(tile_id, wang_id)| IndexedTile {
                tile_id,
                wang_id: wang_id.masked(wang_set.set_type),
                probability: catalog.get(tile_id).map_or(0.0, |t| t.probability),
            })
            .collect();

        debug!(
            "Indexed wang set '{}' ({:?}) with {} tiles",
            wang_set.name,
            wang_set.set_type,
            tiles.len()
        );

        Self {
            name: wang_set.name.clone(),
            set_type: wang_set.set_type,
            tiles,
            color_probabilities: wang_set.colors.iter().map(|c| c.probability).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_type(&self) -> WangSetType {
        self.set_type
    }

    pub fn color_count(&self) -> usize {
        self.color_probabilities.len()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Tiles compatible with `query`, in ascending tile id order
    ///
    /// Weights are the tile probability scaled by the probability of each
    /// color the tile places where the query is unconstrained.
    pub fn candidates(&self, query: &WangId, policy: MatchPolicy) -> Vec<Candidate> {
        let query = query.masked(self.set_type);
        let matching = self
            .tiles
            .iter()
            .filter(|tile| compatible(&query, &tile.wang_id, self.set_type));

        let matching: Vec<&IndexedTile> = match policy {
            MatchPolicy::Compatible => matching.collect(),
            MatchPolicy::MostSpecific => {
                let scored: Vec<(usize, &IndexedTile)> = matching
                    .map(|tile| (specificity(&query, &tile.wang_id, self.set_type), tile))
                    .collect();
                let best = scored.iter().map(|(score, _)| *score).max().unwrap_or(0);
                scored
                    .into_iter()
                    .filter(|(score, _)| *score == best)
                    .map(|(_, tile)| tile)
                    .collect()
            }
        };

        matching
            .into_iter()
            .map(|tile| Candidate {
                tile_id: tile.tile_id,
                weight: self.effective_weight(&query, tile),
            })
            .collect()
    }

    fn effective_weight(&self, query: &WangId, tile: &IndexedTile) -> f32 {
        self.set_type
            .active_positions()
            .iter()
            .filter(|&&i| query.colors[i].is_none())
            .filter_map(|&i| tile.wang_id.colors[i])
            .map(|color| self.color_probabilities.get(color).copied().unwrap_or(1.0))
            .fold(tile.probability, |weight, p| weight * p)
    }
}
