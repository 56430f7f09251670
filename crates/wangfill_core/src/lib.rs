//! Core data structures for wangfill
//!
//! This crate provides the immutable data model consumed by the autotiler:
//! - `WangId` - The 8-slot corner/edge terrain signature of a tile
//! - `WangSet` - A closed terrain-color vocabulary plus per-tile signatures
//! - `TileEntry` - A tile with its selection weight and atlas region
//! - `Catalog` - A loaded tileset (from Tiled `.tsx` or JSON)
//!
//! Everything here is loaded once and then only read.

mod signature;
mod tileset;
mod tsx;
mod wangset;

pub use signature::{ParseWangIdError, WangId, WangSetType, WANG_SLOTS};
pub use tileset::{Catalog, ImageRegion, TileEntry, TileImage, MAX_TILE_COUNT};
pub use wangset::{WangColor, WangSet};

use thiserror::Error;

/// Errors that can occur when loading a catalog
///
/// Loading aborts on the first error; no partially built catalog is returned.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("XML error: {0}")]
    Xml(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("malformed asset: <{element}> field '{field}': {reason}")]
    MalformedAsset {
        element: String,
        field: String,
        reason: String,
    },
}

impl CatalogError {
    pub fn malformed(
        element: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CatalogError::MalformedAsset {
            element: element.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Errors returned when looking up something that is not in a catalog
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("tile {0} not found")]
    TileNotFound(u32),
    #[error("unknown wang set '{0}'")]
    UnknownWangSet(String),
}
