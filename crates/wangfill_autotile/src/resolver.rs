//! Grid autotiling
//!
//! [`AutotileResolver`] turns terrain grid cells into tile ids: it derives the
//! cell's query signature, collects compatible tiles from the wang set's
//! [`WangIndex`], and makes a weighted pick with a caller-seeded generator.
//! The resolver holds no mutable state, so one instance can serve any number
//! of threads.

use crate::config::ResolverConfig;
use crate::grid::TerrainGrid;
use crate::select::{cell_seed, pick_weighted};
use crate::surroundings::{query_signature, NEIGHBOR_OFFSETS};
use crate::wang::WangIndex;
use log::{debug, trace, warn};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use wangfill_core::{Catalog, WangId, WANG_SLOTS};

/// Errors from resolving a cell
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolveError {
    #[error("unknown wang set '{0}'")]
    UnknownWangSet(String),
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    CellOutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
    #[error("terrain {color} at ({x}, {y}) is not a color of wang set '{wang_set}'")]
    UnknownTerrain {
        x: i32,
        y: i32,
        color: u8,
        wang_set: String,
    },
}

/// Outcome for one cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellResolution {
    Tile(u32),
    /// No tile of the wang set is compatible with `query`
    NoMatch { query: WangId },
}

impl CellResolution {
    pub fn tile(&self) -> Option<u32> {
        match self {
            CellResolution::Tile(id) => Some(*id),
            CellResolution::NoMatch { .. } => None,
        }
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, CellResolution::NoMatch { .. })
    }
}

/// Resolves terrain grid cells against the wang sets of one catalog
#[derive(Debug, Clone)]
pub struct AutotileResolver {
    indexes: Vec<WangIndex>,
    config: ResolverConfig,
}

impl AutotileResolver {
    /// Build an index for every wang set of `catalog`
    pub fn new(catalog: &Catalog, config: ResolverConfig) -> Self {
        let indexes = catalog
            .wang_sets
            .iter()
            .map(|wang_set| WangIndex::build(catalog, wang_set))
            .collect();
        debug!(
            "Built resolver for catalog '{}' ({:?}, {:?})",
            catalog.name, config.corner_rule, config.match_policy
        );
        Self { indexes, config }
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn index(&self, wang_set: &str) -> Result<&WangIndex, ResolveError> {
        self.indexes
            .iter()
            .find(|index| index.name() == wang_set)
            .ok_or_else(|| ResolveError::UnknownWangSet(wang_set.to_string()))
    }

    fn boundary(&self, grid: &TerrainGrid) -> u8 {
        self.config.boundary.unwrap_or_else(|| grid.boundary())
    }

    /// The signature cell `(x, y)` asks for
    pub fn query_for(
        &self,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
        wang_set: &str,
    ) -> Result<WangId, ResolveError> {
        let index = self.index(wang_set)?;
        self.check_cell(grid, x, y)?;
        self.check_neighborhood(index, grid, x, y)?;
        Ok(self.query(index, grid, x, y))
    }

    fn query(&self, index: &WangIndex, grid: &TerrainGrid, x: u32, y: u32) -> WangId {
        query_signature(
            grid,
            x,
            y,
            index.set_type(),
            self.config.corner_rule,
            self.boundary(grid),
        )
    }

    /// Resolve one cell with a generator seeded from `seed` and the coordinates
    ///
    /// The same grid, coordinate, wang set and seed always give the same result.
    pub fn resolve_cell(
        &self,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
        wang_set: &str,
        seed: u64,
    ) -> Result<CellResolution, ResolveError> {
        let mut rng = SmallRng::seed_from_u64(cell_seed(seed, x, y));
        self.resolve_cell_with_rng(grid, x, y, wang_set, &mut rng)
    }

    /// Resolve one cell drawing from a caller-owned generator
    pub fn resolve_cell_with_rng(
        &self,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
        wang_set: &str,
        rng: &mut impl Rng,
    ) -> Result<CellResolution, ResolveError> {
        let index = self.index(wang_set)?;
        self.check_cell(grid, x, y)?;
        self.check_neighborhood(index, grid, x, y)?;
        Ok(self.pick(index, grid, x, y, rng))
    }

    fn pick(
        &self,
        index: &WangIndex,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
        rng: &mut impl Rng,
    ) -> CellResolution {
        let query = self.query(index, grid, x, y);
        let candidates = index.candidates(&query, self.config.match_policy);
        let resolution = match pick_weighted(&candidates, rng) {
            Some(tile_id) => CellResolution::Tile(tile_id),
            None => CellResolution::NoMatch { query },
        };
        trace!(
            "({x}, {y}) query {query} -> {} candidates -> {resolution:?}",
            candidates.len()
        );
        resolution
    }

    /// Resolve every cell, in row-major order
    ///
    /// Each cell uses its own seed derived from `seed`, so the result does
    /// not depend on the order cells are visited in.
    pub fn resolve_grid(
        &self,
        grid: &TerrainGrid,
        wang_set: &str,
        seed: u64,
    ) -> Result<Vec<CellResolution>, ResolveError> {
        let index = self.index(wang_set)?;
        self.check_grid(index, grid)?;

        let mut resolutions = Vec::with_capacity(grid.cells().len());
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let mut rng = SmallRng::seed_from_u64(cell_seed(seed, x, y));
                resolutions.push(self.pick(index, grid, x, y, &mut rng));
            }
        }

        let gaps = resolutions.iter().filter(|r| r.is_no_match()).count();
        if gaps > 0 {
            warn!(
                "Wang set '{}' has no tile for {gaps} of {} cells",
                index.name(),
                resolutions.len()
            );
        }
        Ok(resolutions)
    }

    fn check_cell(&self, grid: &TerrainGrid, x: u32, y: u32) -> Result<(), ResolveError> {
        if x >= grid.width() || y >= grid.height() {
            return Err(ResolveError::CellOutOfBounds {
                x,
                y,
                width: grid.width(),
                height: grid.height(),
            });
        }
        Ok(())
    }

    fn check_neighborhood(
        &self,
        index: &WangIndex,
        grid: &TerrainGrid,
        x: u32,
        y: u32,
    ) -> Result<(), ResolveError> {
        // Neighbors the set type's active slots read; corners also read both adjacent edges
        let mut read = [false; WANG_SLOTS];
        for &i in index.set_type().active_positions() {
            read[i] = true;
            if WangId::is_corner(i) {
                read[WangId::prev_index(i)] = true;
                read[WangId::next_index(i)] = true;
            }
        }

        let (cx, cy) = (x as i32, y as i32);
        let boundary = self.boundary(grid);
        let neighbors = NEIGHBOR_OFFSETS
            .into_iter()
            .zip(read)
            .filter_map(|(offset, used)| used.then_some(offset));
        std::iter::once((0, 0))
            .chain(neighbors)
            .try_for_each(|(dx, dy)| {
                let (nx, ny) = (cx + dx, cy + dy);
                check_terrain(index, nx, ny, grid.terrain_or(nx, ny, boundary))
            })
    }

    fn check_grid(&self, index: &WangIndex, grid: &TerrainGrid) -> Result<(), ResolveError> {
        check_terrain(index, -1, -1, self.boundary(grid))?;
        for y in 0..grid.height() {
            for x in 0..grid.width() {
                let color = grid.get(x, y).unwrap_or_default();
                check_terrain(index, x as i32, y as i32, color)?;
            }
        }
        Ok(())
    }
}

fn check_terrain(index: &WangIndex, x: i32, y: i32, color: u8) -> Result<(), ResolveError> {
    if usize::from(color) > index.color_count() {
        return Err(ResolveError::UnknownTerrain {
            x,
            y,
            color,
            wang_set: index.name().to_string(),
        });
    }
    Ok(())
}

/// Coordinates of every `NoMatch` in a row-major resolution list
pub fn coverage_gaps(resolutions: &[CellResolution], width: u32) -> Vec<(u32, u32)> {
    if width == 0 {
        return Vec::new();
    }
    resolutions
        .iter()
        .enumerate()
        .filter(|(_, r)| r.is_no_match())
        .map(|(i, _)| (i as u32 % width, i as u32 / width))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surroundings::CornerRule;
    use crate::wang::MatchPolicy;
    use wangfill_core::{WangColor, WangSet, WangSetType};

    const MAIN_TSX: &str = include_str!("../../../assets/tiles/main.tsx");

    /// Corner set with colors A..D where every uniform tile exists but no
    /// tile mixes four different corners
    fn four_color_catalog() -> Catalog {
        let mut catalog = Catalog::new("Quad".to_string(), 8, 8, 8, 4).unwrap();
        let mut set = WangSet::new("Quad".to_string(), catalog.id, WangSetType::Corner);
        for name in ["A", "B", "C", "D"] {
            set.add_color(WangColor::new(name.to_string(), String::new()));
        }
        for color in 0..4 {
            set.set_tile(color as u32, WangId::filled(color).masked(WangSetType::Corner));
        }
        catalog.add_wang_set(set);
        catalog
    }

    fn edge_catalog() -> Catalog {
        let mut catalog = Catalog::new("Roads".to_string(), 8, 8, 4, 2).unwrap();
        let mut set = WangSet::new("Road".to_string(), catalog.id, WangSetType::Edge);
        set.add_color(WangColor::new("Grass".to_string(), String::new()));
        set.add_color(WangColor::new("Road".to_string(), String::new()));
        set.set_tile(0, "1,0,1,0,1,0,1,0".parse().unwrap());
        set.set_tile(1, "1,0,2,0,1,0,1,0".parse().unwrap());
        set.set_tile(2, "1,0,1,0,1,0,2,0".parse().unwrap());
        catalog.add_wang_set(set);
        catalog
    }

    #[test]
    fn test_resolve_is_deterministic() {
        let catalog = Catalog::from_tsx_str(MAIN_TSX).unwrap();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::filled(4, 4, 1);
        for seed in [0, 1, 77, u64::MAX] {
            let first = resolver.resolve_cell(&grid, 2, 1, "Main", seed).unwrap();
            let second = resolver.resolve_cell(&grid, 2, 1, "Main", seed).unwrap();
            assert_eq!(first, second);
        }
    }

    #[test]
    fn test_most_specific_picks_full_wall_tiles() {
        let catalog = Catalog::from_tsx_str(MAIN_TSX).unwrap();
        let config = ResolverConfig::default().with_match_policy(MatchPolicy::MostSpecific);
        let resolver = AutotileResolver::new(&catalog, config);
        let grid = TerrainGrid::filled(3, 3, 1);
        for seed in 0..200 {
            let tile = resolver.resolve_cell(&grid, 1, 1, "Main", seed).unwrap().tile();
            assert!(matches!(tile, Some(10 | 11 | 14 | 15)), "got {tile:?}");
        }
    }

    #[test]
    fn test_boundary_fallback_at_edge() {
        let catalog = edge_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        // Single row of grass; the cell at x = 0 has no western neighbor
        let grid = TerrainGrid::filled(3, 1, 1).with_boundary(2);
        let query = resolver.query_for(&grid, 0, 0, "Road").unwrap();
        assert_eq!(query.to_string(), "2,0,1,0,2,0,2,0");
        // Every road tile has grass on top
        assert!(resolver
            .resolve_cell(&grid, 0, 0, "Road", 0)
            .unwrap()
            .is_no_match());

        let grid = TerrainGrid::filled(3, 1, 1).with_boundary(0);
        let resolution = resolver.resolve_cell(&grid, 0, 0, "Road", 0).unwrap();
        assert!(resolution.tile().is_some());
    }

    #[test]
    fn test_boundary_override_from_config() {
        let catalog = edge_catalog();
        let config = ResolverConfig::default().with_boundary(1);
        let resolver = AutotileResolver::new(&catalog, config);
        let grid = TerrainGrid::from_rows(&[&[1, 2]]).unwrap().with_boundary(2);
        let query = resolver.query_for(&grid, 0, 0, "Road").unwrap();
        assert_eq!(query.to_string(), "1,0,2,0,1,0,1,0");
        assert_eq!(
            resolver.resolve_cell(&grid, 0, 0, "Road", 3).unwrap(),
            CellResolution::Tile(1)
        );
    }

    #[test]
    fn test_coverage_gap_is_reported() {
        let catalog = four_color_catalog();
        let config = ResolverConfig::default().with_corner_rule(CornerRule::Diagonal);
        let resolver = AutotileResolver::new(&catalog, config);
        let grid = TerrainGrid::from_rows(&[&[1, 1, 2], &[1, 1, 1], &[4, 1, 3]]).unwrap();

        let resolution = resolver.resolve_cell(&grid, 1, 1, "Quad", 0).unwrap();
        assert_eq!(
            resolution,
            CellResolution::NoMatch {
                query: "0,2,0,3,0,4,0,1".parse().unwrap()
            }
        );
    }

    #[test]
    fn test_uniform_cell_resolves() {
        let catalog = four_color_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::filled(3, 3, 3);
        assert_eq!(
            resolver.resolve_cell(&grid, 1, 1, "Quad", 5).unwrap(),
            CellResolution::Tile(2)
        );
    }

    #[test]
    fn test_unknown_wang_set() {
        let catalog = four_color_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::new(1, 1);
        assert_eq!(
            resolver.resolve_cell(&grid, 0, 0, "Water", 0),
            Err(ResolveError::UnknownWangSet("Water".to_string()))
        );
    }

    #[test]
    fn test_cell_out_of_bounds() {
        let catalog = four_color_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::new(2, 2);
        assert!(matches!(
            resolver.resolve_cell(&grid, 2, 0, "Quad", 0),
            Err(ResolveError::CellOutOfBounds { x: 2, y: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_terrain() {
        let catalog = four_color_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::from_rows(&[&[1, 5]]).unwrap();
        assert!(matches!(
            resolver.resolve_cell(&grid, 0, 0, "Quad", 0),
            Err(ResolveError::UnknownTerrain { x: 1, y: 0, color: 5, .. })
        ));
        assert!(resolver.resolve_grid(&grid, "Quad", 0).is_err());
    }

    #[test]
    fn test_edge_set_ignores_diagonal_terrain() {
        // Diagonal cells hold a color neither set defines
        let grid = TerrainGrid::from_rows(&[&[9, 1, 9], &[1, 1, 2], &[9, 1, 9]]).unwrap();

        let catalog = edge_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        assert_eq!(
            resolver.resolve_cell(&grid, 1, 1, "Road", 0).unwrap(),
            CellResolution::Tile(1)
        );

        let catalog = four_color_catalog();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        assert!(matches!(
            resolver.resolve_cell(&grid, 1, 1, "Quad", 0),
            Err(ResolveError::UnknownTerrain { color: 9, .. })
        ));
    }

    #[test]
    fn test_resolve_grid_matches_single_cells() {
        let catalog = Catalog::from_tsx_str(MAIN_TSX).unwrap();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::from_rows(&[&[0, 1, 1], &[0, 1, 1], &[0, 0, 0]]).unwrap();
        let all = resolver.resolve_grid(&grid, "Main", 9).unwrap();
        assert_eq!(all.len(), 9);
        for y in 0..3 {
            for x in 0..3 {
                let single = resolver.resolve_cell(&grid, x, y, "Main", 9).unwrap();
                assert_eq!(all[(y * 3 + x) as usize], single);
            }
        }
    }

    #[test]
    fn test_coverage_gaps() {
        let gap = CellResolution::NoMatch {
            query: WangId::WILDCARD,
        };
        let resolutions = [CellResolution::Tile(1), gap, CellResolution::Tile(2), gap];
        assert_eq!(coverage_gaps(&resolutions, 2), vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_explicit_rng() {
        let catalog = Catalog::from_tsx_str(MAIN_TSX).unwrap();
        let resolver = AutotileResolver::new(&catalog, ResolverConfig::default());
        let grid = TerrainGrid::filled(2, 2, 1);
        let mut a = SmallRng::seed_from_u64(3);
        let mut b = SmallRng::seed_from_u64(3);
        for _ in 0..20 {
            assert_eq!(
                resolver.resolve_cell_with_rng(&grid, 0, 0, "Main", &mut a),
                resolver.resolve_cell_with_rng(&grid, 0, 0, "Main", &mut b)
            );
        }
    }
}
