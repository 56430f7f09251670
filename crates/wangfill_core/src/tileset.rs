//! Tileset catalog: tiles, atlas regions and wang sets

use crate::wangset::WangSet;
use crate::{CatalogError, LookupError};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

/// Pixel rectangle of one tile inside the atlas image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// The atlas image a catalog cuts its tiles from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileImage {
    /// Path to the image file, as written in the asset (not resolved)
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// A single tile of the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileEntry {
    pub id: u32,
    /// Selection weight relative to other matching tiles
    #[serde(default = "default_probability")]
    pub probability: f32,
    pub region: ImageRegion,
}

fn default_probability() -> f32 {
    1.0
}

/// A loaded tileset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    pub id: Uuid,
    pub name: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_count: u32,
    pub columns: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<TileImage>,
    /// One entry per tile id; `tiles[i].id == i`
    pub tiles: Vec<TileEntry>,
    #[serde(default)]
    pub wang_sets: Vec<WangSet>,
}

/// Largest `tilecount` a catalog accepts
pub const MAX_TILE_COUNT: u32 = 1 << 20;

impl Catalog {
    /// Create a catalog whose tiles all have the default weight
    ///
    /// Fails if `tile_count` exceeds [`MAX_TILE_COUNT`] or a tile region does
    /// not fit in `u32` pixel coordinates.
    pub fn new(
        name: String,
        tile_width: u32,
        tile_height: u32,
        tile_count: u32,
        columns: u32,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self {
            id: Uuid::new_v4(),
            name,
            tile_width,
            tile_height,
            tile_count,
            columns,
            spacing: 0,
            margin: 0,
            image: None,
            tiles: Vec::new(),
            wang_sets: Vec::new(),
        };
        catalog.rebuild_tiles()?;
        Ok(catalog)
    }

    /// Set spacing and margin, recomputing every tile region
    pub fn with_layout(mut self, spacing: u32, margin: u32) -> Result<Self, CatalogError> {
        self.spacing = spacing;
        self.margin = margin;
        self.rebuild_tiles()?;
        Ok(self)
    }

    pub fn with_image(mut self, image: TileImage) -> Self {
        self.image = Some(image);
        self
    }

    fn rebuild_tiles(&mut self) -> Result<(), CatalogError> {
        if self.tile_count > MAX_TILE_COUNT {
            return Err(CatalogError::malformed(
                "tileset",
                "tilecount",
                format!(
                    "{} tiles exceeds the limit of {MAX_TILE_COUNT}",
                    self.tile_count
                ),
            ));
        }
        let probabilities: Vec<f32> = self.tiles.iter().map(|t| t.probability).collect();
        self.tiles = (0..self.tile_count)
            .map(|id| {
                Ok(TileEntry {
                    id,
                    probability: probabilities.get(id as usize).copied().unwrap_or(1.0),
                    region: self.checked_region(id)?,
                })
            })
            .collect::<Result<_, CatalogError>>()?;
        Ok(())
    }

    /// Atlas region of a tile id, computed from the column layout
    ///
    /// `None` if the region does not fit in `u32` pixel coordinates.
    pub fn region_for(&self, tile_id: u32) -> Option<ImageRegion> {
        self.checked_region(tile_id).ok()
    }

    fn checked_region(&self, tile_id: u32) -> Result<ImageRegion, CatalogError> {
        let columns = self.columns.max(1);
        Ok(ImageRegion {
            x: axis_start(tile_id % columns, self.tile_width, self.spacing, self.margin, "tilewidth")?,
            y: axis_start(tile_id / columns, self.tile_height, self.spacing, self.margin, "tileheight")?,
            width: self.tile_width,
            height: self.tile_height,
        })
    }

    /// Get a tile entry
    pub fn get(&self, tile_id: u32) -> Result<&TileEntry, LookupError> {
        self.tiles
            .get(tile_id as usize)
            .ok_or(LookupError::TileNotFound(tile_id))
    }

    /// Override the selection weight of a tile
    pub fn set_probability(&mut self, tile_id: u32, probability: f32) -> Result<(), LookupError> {
        let tile = self
            .tiles
            .get_mut(tile_id as usize)
            .ok_or(LookupError::TileNotFound(tile_id))?;
        tile.probability = probability;
        Ok(())
    }

    /// Add a wang set
    pub fn add_wang_set(&mut self, wang_set: WangSet) {
        self.wang_sets.push(wang_set);
    }

    /// Get wang set by name
    pub fn wang_set(&self, name: &str) -> Result<&WangSet, LookupError> {
        self.wang_sets
            .iter()
            .find(|ws| ws.name == name)
            .ok_or_else(|| LookupError::UnknownWangSet(name.to_string()))
    }

    /// Check every invariant of a loaded catalog
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.tile_width == 0 || self.tile_height == 0 {
            return Err(CatalogError::malformed(
                "tileset",
                "tilewidth",
                "tile size must be non-zero",
            ));
        }
        if self.columns == 0 {
            return Err(CatalogError::malformed(
                "tileset",
                "columns",
                "column count must be non-zero",
            ));
        }
        if self.tiles.len() != self.tile_count as usize {
            return Err(CatalogError::malformed(
                "tileset",
                "tilecount",
                format!(
                    "declares {} tiles but {} are present",
                    self.tile_count,
                    self.tiles.len()
                ),
            ));
        }

        for (index, tile) in self.tiles.iter().enumerate() {
            if tile.id as usize != index {
                return Err(CatalogError::malformed(
                    "tile",
                    "id",
                    format!("tile at position {index} has id {}", tile.id),
                ));
            }
            if !tile.probability.is_finite() || tile.probability < 0.0 {
                return Err(CatalogError::malformed(
                    "tile",
                    "probability",
                    format!(
                        "tile {} has probability {}, expected a value >= 0",
                        tile.id, tile.probability
                    ),
                ));
            }
            if tile.region != self.checked_region(tile.id)? {
                return Err(CatalogError::malformed(
                    "tile",
                    "id",
                    format!("tile {} region does not match the column layout", tile.id),
                ));
            }
            self.check_in_image(tile)?;
        }

        let mut names = HashSet::new();
        for wang_set in &self.wang_sets {
            if !names.insert(wang_set.name.as_str()) {
                return Err(CatalogError::malformed(
                    "wangset",
                    "name",
                    format!("duplicate wang set '{}'", wang_set.name),
                ));
            }
            wang_set.validate(self.id, self.tile_count)?;
        }

        Ok(())
    }

    fn check_in_image(&self, tile: &TileEntry) -> Result<(), CatalogError> {
        let Some(image) = &self.image else {
            return Ok(());
        };
        let right = u64::from(tile.region.x) + u64::from(tile.region.width);
        let bottom = u64::from(tile.region.y) + u64::from(tile.region.height);
        let outside_x = image.width.is_some_and(|w| right > u64::from(w));
        let outside_y = image.height.is_some_and(|h| bottom > u64::from(h));
        if outside_x || outside_y {
            return Err(CatalogError::malformed(
                "image",
                "width",
                format!(
                    "tile {} ends at ({right}, {bottom}), outside the {}x{} image",
                    tile.id,
                    image.width.unwrap_or_default(),
                    image.height.unwrap_or_default()
                ),
            ));
        }
        Ok(())
    }

    /// Load a catalog, picking the format from the file extension
    ///
    /// `.json` files are read as serialized catalogs, everything else as Tiled `.tsx`.
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        debug!("Loading catalog '{}'...", path.display());
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::from_json(&content)
        } else {
            Self::from_tsx_str(&content)
        }
    }

    /// Parse a Tiled tileset document
    pub fn from_tsx_str(xml: &str) -> Result<Self, CatalogError> {
        let catalog = crate::tsx::parse_tsx(xml)?;
        catalog.validate()?;
        debug!(
            "Loaded catalog '{}' with {} tiles and {} wang sets",
            catalog.name,
            catalog.tile_count,
            catalog.wang_sets.len()
        );
        Ok(catalog)
    }

    /// Parse a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Save a catalog to a JSON file
    pub fn save_json(&self, path: &Path) -> Result<(), CatalogError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Pixel offset of the `index`-th tile along one axis, checked so the tile's
/// far edge still fits in `u32`
fn axis_start(
    index: u32,
    size: u32,
    spacing: u32,
    margin: u32,
    size_field: &str,
) -> Result<u32, CatalogError> {
    let overflow = |field: &str| {
        CatalogError::malformed(
            "tileset",
            field,
            format!("tile {index} along this axis lies beyond u32 pixel coordinates"),
        )
    };
    let stride = size.checked_add(spacing).ok_or_else(|| overflow("spacing"))?;
    let offset = index.checked_mul(stride).ok_or_else(|| overflow(size_field))?;
    let start = offset.checked_add(margin).ok_or_else(|| overflow("margin"))?;
    start.checked_add(size).ok_or_else(|| overflow(size_field))?;
    Ok(start)
}
