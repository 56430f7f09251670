//! Wang tile autotiling for Tiled tilesets
//!
//! `wangfill` loads tilesets authored in Tiled (`.tsx`) and picks a concrete
//! tile for every cell of a terrain grid so that neighboring tiles agree on
//! their shared corners and edges.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use wangfill::prelude::*;
//!
//! let engine = Engine::load("assets/tiles/main.tsx".as_ref(), None)?;
//!
//! // 1 = "Wall", 0 = no terrain
//! let grid = TerrainGrid::from_rows(&[&[0, 1, 1], &[0, 1, 1], &[0, 0, 0]])?;
//! match engine.resolve_cell(&grid, 1, 1, "Main", 42)? {
//!     CellResolution::Tile(id) => println!("tile {id}"),
//!     CellResolution::NoMatch { query } => println!("no tile for {query}"),
//! }
//! ```
//!
//! # Crate Structure
//!
//! - [`wangfill_core`] - Catalog, wang sets and signatures, TSX and JSON loading
//! - [`wangfill_autotile`] - Terrain grid, matching, weighted selection, resolver

mod engine;
pub mod prelude;

use std::path::Path;

use thiserror::Error;

pub use engine::Engine;
pub use wangfill_autotile;
pub use wangfill_core;

pub use wangfill_autotile::{
    AutotileResolver, CellResolution, ConfigError, CornerRule, MatchPolicy, ResolveError,
    ResolverConfig, TerrainGrid,
};
pub use wangfill_core::{Catalog, CatalogError, LookupError, WangId, WangSet, WangSetType};

/// Errors from building an [`Engine`]
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Load and validate a catalog from a `.tsx` or `.json` file
pub fn load_catalog(path: &Path) -> Result<Catalog, CatalogError> {
    Catalog::load(path)
}

/// Resolve a single cell against `catalog` with the default configuration
///
/// Builds the matching indexes on every call; keep an [`Engine`] around when
/// resolving more than a handful of cells.
pub fn resolve_cell(
    catalog: &Catalog,
    grid: &TerrainGrid,
    x: u32,
    y: u32,
    wang_set: &str,
    seed: u64,
) -> Result<CellResolution, ResolveError> {
    AutotileResolver::new(catalog, ResolverConfig::default()).resolve_cell(grid, x, y, wang_set, seed)
}
