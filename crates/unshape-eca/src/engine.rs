//! Lazily evaluated, tiled space-time diagram of an infinite automaton.
//!
//! The diagram is split into square tiles. A tile at block-row `t > 0` only
//! depends on the last rows of the three tiles directly above it, because a
//! generation step only looks one cell to each side. Tiles are computed on
//! demand, memoized, and bounded by a cooperative [`Budget`]: when the budget
//! runs out mid-recursion the request returns [`Fetch::Pending`], but every
//! dependency that did finish stays cached, so the next request picks up where
//! this one stopped.
//!
//! ```
//! use unshape_eca::{Budget, EngineConfig, Fetch, Rule};
//!
//! let mut engine = EngineConfig::new(Rule::new(110))
//!     .with_tile_size(16)
//!     .build()
//!     .unwrap();
//!
//! let Fetch::Ready(tile) = engine.get_tile(0, 0, &Budget::unlimited()) else {
//!     unreachable!("unlimited budgets never pend");
//! };
//! // Default seed: a single live cell at 0.
//! assert!(tile.get(0, 0));
//! assert!(!tile.get(1, 0));
//!
//! // No time left: nothing new is computed.
//! assert!(engine.get_tile(0, 5, &Budget::expired()).is_pending());
//! ```

use std::ops::Range;
use std::sync::Arc;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::budget::Budget;
use crate::cache::{CachePolicy, KeepAllPolicy, LruPolicy, TileCache};
use crate::error::{EcaError, Result};
use crate::rule::Rule;
use crate::seed::{InitialState, SingleCell};
use crate::tile::{Fetch, Tile, TileCoord, tiles_covering};

/// Default tile edge length.
pub const DEFAULT_TILE_SIZE: usize = 200;

/// Configuration for a [`TileEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineConfig {
    /// Transition rule.
    pub rule: Rule,
    /// Tile edge length in cells and generations.
    pub tile_size: usize,
    /// Maximum number of cached tiles (None = keep everything).
    pub cache_capacity: Option<usize>,
}

impl EngineConfig {
    /// Creates a configuration with default settings for `rule`.
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            tile_size: DEFAULT_TILE_SIZE,
            cache_capacity: None,
        }
    }

    /// Sets the tile edge length.
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Bounds the cache to `capacity` tiles with least-recently-used eviction.
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = Some(capacity);
        self
    }

    /// Checks that the configuration can build an engine.
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(EcaError::InvalidTileSize(self.tile_size));
        }
        if self.cache_capacity == Some(0) {
            return Err(EcaError::InvalidCacheCapacity(0));
        }
        Ok(())
    }

    /// Creates the configured engine, seeded with a single live cell at 0.
    pub fn build(&self) -> Result<TileEngine> {
        self.validate()?;
        let policy: Box<dyn CachePolicy> = match self.cache_capacity {
            Some(capacity) => Box::new(LruPolicy::new(capacity)),
            None => Box::new(KeepAllPolicy),
        };
        Ok(TileEngine {
            rule: self.rule,
            tile_size: self.tile_size,
            initial: Box::new(SingleCell),
            cache: TileCache::new(),
            policy,
            stats: EngineStats::default(),
        })
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new(Rule::default())
    }
}

/// Work counters for a [`TileEngine`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Rule applications over a whole window (one per generation per tile).
    pub rule_steps: u64,
    /// Tiles computed (including ones later evicted).
    pub tiles_computed: u64,
    /// Requests answered from the cache.
    pub cache_hits: u64,
    /// Requests (top-level or nested) that returned pending.
    pub pending: u64,
    /// Tiles dropped by the cache policy.
    pub evicted: u64,
}

/// Infinite elementary cellular automaton evaluated tile by tile.
pub struct TileEngine {
    rule: Rule,
    tile_size: usize,
    initial: Box<dyn InitialState>,
    cache: TileCache,
    policy: Box<dyn CachePolicy>,
    stats: EngineStats,
}

impl TileEngine {
    /// Creates an engine with the default tile size and a single live cell at 0.
    pub fn new(rule: Rule) -> Self {
        Self {
            rule,
            tile_size: DEFAULT_TILE_SIZE,
            initial: Box::new(SingleCell),
            cache: TileCache::new(),
            policy: Box::new(KeepAllPolicy),
            stats: EngineStats::default(),
        }
    }

    /// Replaces the cache policy. Already cached tiles are kept.
    pub fn with_policy(mut self, policy: impl CachePolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Returns the active rule.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Replaces the rule.
    ///
    /// Cached tiles are kept; call [`clear_cache`](Self::clear_cache) if they
    /// were computed under a different rule.
    pub fn set_rule(&mut self, rule: Rule) {
        log::debug!("rule changed from {} to {}", self.rule, rule);
        self.rule = rule;
    }

    /// Installs a new initial state and drops every cached tile.
    pub fn set_initial_state(&mut self, initial: impl InitialState + 'static) {
        log::debug!(
            "initial state replaced, dropping {} cached tiles",
            self.cache.len()
        );
        self.initial = Box::new(initial);
        self.cache.clear();
    }

    /// Drops every cached tile.
    pub fn clear_cache(&mut self) {
        log::debug!("cache cleared ({} tiles)", self.cache.len());
        self.cache.clear();
    }

    /// Tile edge length, constant for the engine's lifetime.
    pub fn tile_size(&self) -> usize {
        self.tile_size
    }

    /// Number of cached tiles.
    pub fn cached_tiles(&self) -> usize {
        self.cache.len()
    }

    /// Whether tile `(x, time)` is cached.
    pub fn is_cached(&self, x: i64, time: i64) -> bool {
        self.cache.contains(&TileCoord { x, time })
    }

    /// Work counters since creation or the last [`reset_stats`](Self::reset_stats).
    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    /// Zeroes the work counters.
    pub fn reset_stats(&mut self) {
        self.stats = EngineStats::default();
    }

    /// Returns tile `(x, time)`, computing it and its dependencies if needed.
    ///
    /// Cached tiles are returned without consulting the budget. Otherwise each
    /// missing tile in the dependency tree costs one budget check; once the
    /// budget is spent the request returns [`Fetch::Pending`] and only the
    /// tiles that completed are cached.
    ///
    /// # Panics
    ///
    /// Panics if `time` is negative.
    pub fn get_tile(&mut self, x: i64, time: i64, budget: &Budget) -> Fetch<Arc<Tile>> {
        self.fetch(TileCoord::new(x, time), budget)
    }

    fn fetch(&mut self, coord: TileCoord, budget: &Budget) -> Fetch<Arc<Tile>> {
        if let Some(tile) = self.cache.get(&coord) {
            self.stats.cache_hits += 1;
            return Fetch::Ready(tile);
        }
        if !budget.should_run() {
            self.stats.pending += 1;
            log::trace!("tile {coord:?} pending: budget exhausted");
            return Fetch::Pending;
        }

        let rows = match coord.dependencies() {
            None => self.compute_initial(coord),
            Some([left, center, right]) => {
                let left = self.fetch(left, budget);
                let center = self.fetch(center, budget);
                let right = self.fetch(right, budget);
                let (Fetch::Ready(left), Fetch::Ready(center), Fetch::Ready(right)) =
                    (left, center, right)
                else {
                    self.stats.pending += 1;
                    log::trace!("tile {coord:?} pending: dependencies incomplete");
                    return Fetch::Pending;
                };
                self.compute_below(&left, &center, &right)
            }
        };

        let tile = Arc::new(Tile::from_rows(rows));
        self.stats.tiles_computed += 1;
        log::trace!("computed tile {coord:?}");

        if self.policy.should_cache(coord, &tile) {
            self.cache.insert(coord, Arc::clone(&tile));
            self.stats.evicted += self.policy.evict(&mut self.cache) as u64;
        }
        Fetch::Ready(tile)
    }

    /// One rule application over a window.
    fn advance(&mut self, state: &[bool]) -> Vec<bool> {
        self.stats.rule_steps += 1;
        self.rule.step(state)
    }

    /// Tile at block-row zero, sampled from the initial state.
    ///
    /// The window spans the tile and one tile on each side; the outer thirds
    /// only supply neighbors and absorb the wraparound of the circular step.
    fn compute_initial(&mut self, coord: TileCoord) -> Vec<Vec<bool>> {
        let size = self.tile_size;
        let x0 = coord.first_cell(size) - size as i64;
        let mut state: Vec<bool> = (x0..x0 + 3 * size as i64)
            .map(|x| self.initial.value_at(x))
            .collect();

        let mut rows = Vec::with_capacity(size);
        for row in 0..size {
            if row > 0 {
                state = self.advance(&state);
            }
            rows.push(state[size..2 * size].to_vec());
        }
        rows
    }

    /// Tile below three computed neighbors, continuing from their last rows.
    fn compute_below(&mut self, left: &Tile, center: &Tile, right: &Tile) -> Vec<Vec<bool>> {
        let size = self.tile_size;
        let mut state = Vec::with_capacity(3 * size);
        state.extend_from_slice(left.last_row());
        state.extend_from_slice(center.last_row());
        state.extend_from_slice(right.last_row());

        let mut rows = Vec::with_capacity(size);
        for _ in 0..size {
            state = self.advance(&state);
            rows.push(state[size..2 * size].to_vec());
        }
        rows
    }

    /// Value of cell `x` at `generation`.
    ///
    /// # Panics
    ///
    /// Panics if `generation` is negative.
    pub fn cell(&mut self, x: i64, generation: i64, budget: &Budget) -> Fetch<bool> {
        let coord = TileCoord::containing(x, generation, self.tile_size);
        let column = (x - coord.first_cell(self.tile_size)) as usize;
        let row = (generation - coord.first_generation(self.tile_size)) as usize;
        self.fetch(coord, budget).map(|tile| tile.get(column, row))
    }

    /// Cells `x0 .. x0 + width` at `generation`, stitched across tiles.
    ///
    /// Every overlapping tile is requested even after one pends, so a single
    /// call makes as much progress as the budget allows.
    ///
    /// # Panics
    ///
    /// Panics if `generation` is negative.
    pub fn row_segment(
        &mut self,
        x0: i64,
        width: usize,
        generation: i64,
        budget: &Budget,
    ) -> Fetch<Vec<bool>> {
        assert!(generation >= 0, "generation must be non-negative, got {generation}");
        let size = self.tile_size;
        let end = x0 + width as i64;

        let mut out = Vec::with_capacity(width);
        let mut pending = false;
        for coord in tiles_covering(x0..end, generation..generation + 1, size) {
            match self.fetch(coord, budget) {
                Fetch::Ready(tile) if !pending => {
                    let first = coord.first_cell(size);
                    let lo = (x0.max(first) - first) as usize;
                    let hi = (end.min(first + size as i64) - first) as usize;
                    let row = (generation - coord.first_generation(size)) as usize;
                    out.extend_from_slice(&tile.row(row)[lo..hi]);
                }
                Fetch::Ready(_) => {}
                Fetch::Pending => pending = true,
            }
        }

        if pending {
            Fetch::Pending
        } else {
            Fetch::Ready(out)
        }
    }

    /// Tiles intersecting a rectangle of cells × generations.
    pub fn tiles_covering(&self, cells: Range<i64>, generations: Range<i64>) -> Vec<TileCoord> {
        tiles_covering(cells, generations, self.tile_size)
    }
}

impl Default for TileEngine {
    fn default() -> Self {
        Self::new(Rule::default())
    }
}

impl std::fmt::Debug for TileEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TileEngine")
            .field("rule", &self.rule)
            .field("tile_size", &self.tile_size)
            .field("cached_tiles", &self.cache.len())
            .field("policy", &self.policy)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
