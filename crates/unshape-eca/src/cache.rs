//! Tile memoization and retention policies.
//!
//! [`TileCache`] maps [`TileCoord`]s to computed tiles. Entries are written
//! once per coordinate and only disappear on an explicit clear or when a
//! [`CachePolicy`] evicts them. The default [`KeepAllPolicy`] never evicts,
//! so memory grows with the explored area; [`LruPolicy`] bounds it.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tile::{Tile, TileCoord};

/// Entry in the tile cache.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The cached tile.
    pub tile: Arc<Tile>,
    /// Access clock value of the most recent read.
    pub last_accessed: u64,
}

/// Memoized tiles keyed by coordinate.
///
/// Uses a logical access clock instead of wall time so eviction order is
/// deterministic.
#[derive(Debug, Default)]
pub struct TileCache {
    entries: HashMap<TileCoord, CacheEntry>,
    clock: u64,
}

impl TileCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    /// Get a cached tile, marking it as recently used.
    pub fn get(&mut self, coord: &TileCoord) -> Option<Arc<Tile>> {
        let now = self.tick();
        self.entries.get_mut(coord).map(|entry| {
            entry.last_accessed = now;
            Arc::clone(&entry.tile)
        })
    }

    /// Get a cached tile without touching its access time.
    pub fn peek(&self, coord: &TileCoord) -> Option<&Arc<Tile>> {
        self.entries.get(coord).map(|entry| &entry.tile)
    }

    /// Whether a tile is cached.
    pub fn contains(&self, coord: &TileCoord) -> bool {
        self.entries.contains_key(coord)
    }

    /// Store a tile.
    pub fn insert(&mut self, coord: TileCoord, tile: Arc<Tile>) {
        let now = self.tick();
        self.entries.insert(
            coord,
            CacheEntry {
                tile,
                last_accessed: now,
            },
        );
    }

    /// Remove a specific entry.
    pub fn remove(&mut self, coord: &TileCoord) -> Option<CacheEntry> {
        self.entries.remove(coord)
    }

    /// Clear all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached tiles.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Every cached coordinate with its entry.
    pub fn entries(&self) -> impl Iterator<Item = (&TileCoord, &CacheEntry)> {
        self.entries.iter()
    }
}

/// Policy for tile retention and eviction.
pub trait CachePolicy: std::fmt::Debug + Send {
    /// Called after a tile is computed - should it be stored?
    fn should_cache(&self, coord: TileCoord, tile: &Tile) -> bool;

    /// Called after every insert. Returns the number of tiles evicted.
    fn evict(&mut self, cache: &mut TileCache) -> usize;
}

/// Cache that keeps all tiles (never evicts).
#[derive(Debug, Default, Clone, Copy)]
pub struct KeepAllPolicy;

impl CachePolicy for KeepAllPolicy {
    fn should_cache(&self, _coord: TileCoord, _tile: &Tile) -> bool {
        true
    }

    fn evict(&mut self, _cache: &mut TileCache) -> usize {
        0
    }
}

/// Keeps at most `capacity` tiles, dropping the least recently read first.
///
/// Evicted tiles are recomputed on demand, which is always correct because
/// tile contents are deterministic. A capacity smaller than the working set
/// of one request (roughly `time²` tiles for a tile at block-row `time`) can
/// prevent that request from ever completing under a small budget.
#[derive(Debug, Clone, Copy)]
pub struct LruPolicy {
    capacity: usize,
}

impl LruPolicy {
    /// Creates a policy holding at most `capacity` tiles.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "LRU capacity must be positive");
        Self { capacity }
    }

    /// Maximum number of retained tiles.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl CachePolicy for LruPolicy {
    fn should_cache(&self, _coord: TileCoord, _tile: &Tile) -> bool {
        true
    }

    fn evict(&mut self, cache: &mut TileCache) -> usize {
        let excess = cache.len().saturating_sub(self.capacity);
        if excess == 0 {
            return 0;
        }

        let mut by_age: Vec<(u64, TileCoord)> = cache
            .entries()
            .map(|(coord, entry)| (entry.last_accessed, *coord))
            .collect();
        by_age.select_nth_unstable(excess - 1);

        for (_, coord) in &by_age[..excess] {
            cache.remove(coord);
        }
        log::debug!("evicted {excess} tiles (capacity {})", self.capacity);
        excess
    }
}
