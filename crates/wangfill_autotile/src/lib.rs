//! Wang tile autotiling over terrain grids
//!
//! This crate picks a concrete tile for every cell of a [`TerrainGrid`] from
//! a wang set of a loaded [`Catalog`](wangfill_core::Catalog).
//!
//! # Features
//! - Corner, Edge, and Mixed wang sets with wildcard slots
//! - Configurable corner derivation and match policy
//! - Weighted random selection, reproducible from a seed
//! - Coverage gaps reported as values, not errors
//!
//! # Example
//!
//! ```rust,ignore
//! use wangfill_autotile::{AutotileResolver, ResolverConfig, TerrainGrid};
//! use wangfill_core::Catalog;
//!
//! let catalog = Catalog::load("assets/tiles/main.tsx".as_ref())?;
//! let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
//!
//! // 1 = "Wall", 0 = no terrain
//! let grid = TerrainGrid::from_rows(&[&[0, 1, 1], &[0, 1, 1], &[0, 0, 0]])?;
//! let tiles = resolver.resolve_grid(&grid, "Main", 1234)?;
//! ```

pub mod config;
pub mod grid;
pub mod resolver;
pub mod select;
pub mod surroundings;
pub mod wang;

// Re-export main types at crate root
pub use config::{ConfigError, ResolverConfig};
pub use grid::{GridError, TerrainGrid};
pub use resolver::{coverage_gaps, AutotileResolver, CellResolution, ResolveError};
pub use select::{cell_seed, pick_weighted};
pub use surroundings::{query_signature, CornerRule, NEIGHBOR_OFFSETS};
pub use wang::{compatible, Candidate, MatchPolicy, WangIndex};

pub use wangfill_core;
