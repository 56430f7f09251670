use std::path::Path;
use std::sync::{Arc, OnceLock};

use log::debug;
use wangfill_autotile::{AutotileResolver, CellResolution, ResolveError, ResolverConfig, TerrainGrid};
use wangfill_core::{Catalog, LookupError, TileEntry};

use crate::EngineError;

/// Shared handle to a loaded catalog and its matching indexes
///
/// Cloning is cheap and every clone sees the same data. The indexes are built
/// on first use and never change afterwards, so a handle can be passed to any
/// number of threads.
#[derive(Debug, Clone)]
pub struct Engine {
    inner: Arc<EngineInner>,
}

#[derive(Debug)]
struct EngineInner {
    catalog: Catalog,
    config: ResolverConfig,
    resolver: OnceLock<AutotileResolver>,
}

impl Engine {
    pub fn new(catalog: Catalog, config: ResolverConfig) -> Self {
        Self {
            inner: Arc::new(EngineInner {
                catalog,
                config,
                resolver: OnceLock::new(),
            }),
        }
    }

    /// Load a catalog (`.tsx` or `.json`) and an optional TOML resolver config
    pub fn load(catalog_path: &Path, config_path: Option<&Path>) -> Result<Self, EngineError> {
        let catalog = Catalog::load(catalog_path)?;
        let config = match config_path {
            Some(path) => ResolverConfig::load(path)?,
            None => ResolverConfig::default(),
        };
        Ok(Self::new(catalog, config))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.inner.config
    }

    pub fn resolver(&self) -> &AutotileResolver {
        self.inner.resolver.get_or_init(|| {
            debug!("Building indexes for catalog '{}'", self.inner.catalog.name);
            AutotileResolver::new(&self.inner.catalog, self.inner.config.clone())
        })
    }

    pub fn tile(&self, tile_id: u32) -> Result<&TileEntry, LookupError> {
        self.inner.catalog.get(tile_id)
    }

    pub fn resolve_cell(
        &self,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
        wang_set: &str,
        seed: u64,
    ) -> Result<CellResolution, ResolveError> {
        self.resolver().resolve_cell(grid, x, y, wang_set, seed)
    }

    /// Resolve the whole grid with the configured global seed
    pub fn resolve_grid(
        &self,
        grid: &TerrainGrid,
        wang_set: &str,
    ) -> Result<Vec<CellResolution>, ResolveError> {
        self.resolver().resolve_grid(grid, wang_set, self.inner.config.seed)
    }
}
