//! Wang sets: terrain vocabularies and tile signatures
//!
//! A wang set owns a closed list of terrain colors. Every signature stored in
//! the set refers to colors by index into that list, so colors from one set
//! can never leak into another.

use crate::signature::{WangId, WangSetType};
use crate::CatalogError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use uuid::Uuid;

/// A terrain color within a set (e.g., "Wall", "Floor")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WangColor {
    pub name: String,
    /// Display color as written by the authoring tool (e.g. "#ff0000")
    #[serde(default)]
    pub color: String,
    /// Relative weight used when a candidate fills an unconstrained position
    #[serde(default = "default_probability")]
    pub probability: f32,
}

fn default_probability() -> f32 {
    1.0
}

impl WangColor {
    pub fn new(name: String, color: String) -> Self {
        Self {
            name,
            color,
            probability: 1.0,
        }
    }

    pub fn with_probability(mut self, probability: f32) -> Self {
        self.probability = probability;
        self
    }
}

/// A wang set attached to a catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WangSet {
    pub id: Uuid,
    pub name: String,
    /// Which catalog this wang set belongs to
    pub catalog_id: Uuid,
    /// Type of matching (Corner, Edge, or Mixed)
    pub set_type: WangSetType,
    /// Terrain vocabulary; signature color `i` refers to `colors[i]`
    pub colors: Vec<WangColor>,
    /// Signature of each tile taking part in this set, ordered by tile id
    pub tiles: BTreeMap<u32, WangId>,
}

impl WangSet {
    pub fn new(name: String, catalog_id: Uuid, set_type: WangSetType) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            catalog_id,
            set_type,
            colors: Vec::new(),
            tiles: BTreeMap::new(),
        }
    }

    /// Add a new color to this set, returning its index
    pub fn add_color(&mut self, color: WangColor) -> usize {
        self.colors.push(color);
        self.colors.len() - 1
    }

    /// Get color index by name
    pub fn color_index(&self, name: &str) -> Option<usize> {
        self.colors.iter().position(|c| c.name == name)
    }

    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    /// Set the signature for a tile, returning the previous one
    pub fn set_tile(&mut self, tile_id: u32, wang_id: WangId) -> Option<WangId> {
        self.tiles.insert(tile_id, wang_id)
    }

    /// Get the signature of a tile
    pub fn signature(&self, tile_id: u32) -> Option<&WangId> {
        self.tiles.get(&tile_id)
    }

    /// All (tile id, signature) pairs in ascending tile id order
    pub fn tiles(&self) -> impl Iterator<Item = (u32, &WangId)> {
        self.tiles.iter().map(|(&id, wang_id)| (id, wang_id))
    }

    /// Signatures re-serialized to the comma notation, in tile id order
    pub fn signature_strings(&self) -> Vec<(u32, String)> {
        self.tiles()
            .map(|(id, wang_id)| (id, wang_id.to_string()))
            .collect()
    }

    /// Find all tiles whose active positions are all one color
    pub fn find_uniform_tiles(&self, color: usize) -> Vec<u32> {
        let positions = self.set_type.active_positions();
        self.tiles()
            .filter(|(_, wang_id)| positions.iter().all(|&i| wang_id.colors[i] == Some(color)))
            .map(|(id, _)| id)
            .collect()
    }

    /// Check the closed-vocabulary and ownership invariants
    pub fn validate(&self, catalog_id: Uuid, tile_count: u32) -> Result<(), CatalogError> {
        if self.catalog_id != catalog_id {
            return Err(CatalogError::malformed(
                "wangset",
                "catalog_id",
                format!("wang set '{}' belongs to another catalog", self.name),
            ));
        }

        let mut names = HashSet::new();
        for color in &self.colors {
            if !names.insert(color.name.as_str()) {
                return Err(CatalogError::malformed(
                    "wangcolor",
                    "name",
                    format!("duplicate color '{}' in wang set '{}'", color.name, self.name),
                ));
            }
            if !color.probability.is_finite() || color.probability < 0.0 {
                return Err(CatalogError::malformed(
                    "wangcolor",
                    "probability",
                    format!(
                        "color '{}' has probability {}, expected a value >= 0",
                        color.name, color.probability
                    ),
                ));
            }
        }

        for (tile_id, wang_id) in self.tiles() {
            if tile_id >= tile_count {
                return Err(CatalogError::malformed(
                    "wangtile",
                    "tileid",
                    format!("tile {tile_id} is out of range (tilecount {tile_count})"),
                ));
            }
            if let Some(max) = wang_id.max_color() {
                if max >= self.colors.len() {
                    return Err(CatalogError::malformed(
                        "wangtile",
                        "wangid",
                        format!(
                            "tile {tile_id} references color {} but wang set '{}' has {} colors",
                            max + 1,
                            self.name,
                            self.colors.len()
                        ),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall_set() -> WangSet {
        let mut set = WangSet::new("Main".to_string(), Uuid::nil(), WangSetType::Corner);
        set.add_color(WangColor::new("Wall".to_string(), "#ff0000".to_string()));
        set
    }

    #[test]
    fn test_color_lookup() {
        let mut set = wall_set();
        let floor = set.add_color(WangColor::new("Floor".to_string(), "#00ff00".to_string()));
        assert_eq!(floor, 1);
        assert_eq!(set.color_index("Wall"), Some(0));
        assert_eq!(set.color_index("Water"), None);
        assert_eq!(set.color_count(), 2);
    }

    #[test]
    fn test_signature_strings_in_tile_order() {
        let mut set = wall_set();
        set.set_tile(10, "0,1,0,1,0,1,0,1".parse().unwrap());
        set.set_tile(2, "0,1,0,0,0,1,0,1".parse().unwrap());

        let strings = set.signature_strings();
        assert_eq!(
            strings,
            vec![
                (2, "0,1,0,0,0,1,0,1".to_string()),
                (10, "0,1,0,1,0,1,0,1".to_string()),
            ]
        );
    }

    #[test]
    fn test_find_uniform_tiles() {
        let mut set = wall_set();
        set.set_tile(10, "0,1,0,1,0,1,0,1".parse().unwrap());
        set.set_tile(0, "0,0,0,1,0,0,0,0".parse().unwrap());
        assert_eq!(set.find_uniform_tiles(0), vec![10]);
    }

    #[test]
    fn test_validate_rejects_unknown_color() {
        let mut set = wall_set();
        set.set_tile(0, "0,2,0,0,0,0,0,0".parse().unwrap());
        let err = set.validate(Uuid::nil(), 16).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::MalformedAsset { ref field, .. } if field == "wangid"
        ));
    }

    #[test]
    fn test_validate_rejects_out_of_range_tile() {
        let mut set = wall_set();
        set.set_tile(16, WangId::WILDCARD);
        assert!(set.validate(Uuid::nil(), 16).is_err());
        assert!(set.validate(Uuid::nil(), 17).is_ok());
    }

    #[test]
    fn test_validate_rejects_foreign_catalog() {
        let set = wall_set();
        assert!(set.validate(Uuid::new_v4(), 16).is_err());
    }

    #[test]
    fn test_validate_rejects_negative_color_probability() {
        let mut set = wall_set();
        set.colors[0].probability = -1.0;
        assert!(set.validate(Uuid::nil(), 16).is_err());
    }
}
