pub use crate::{load_catalog, resolve_cell, Engine, EngineError};
pub use wangfill_autotile::{
    coverage_gaps, AutotileResolver, CellResolution, CornerRule, MatchPolicy, ResolveError,
    ResolverConfig, TerrainGrid,
};
pub use wangfill_core::{Catalog, CatalogError, LookupError, TileEntry, WangId, WangSet, WangSetType};
