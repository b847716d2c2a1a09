//! Elementary cellular automata on an unbounded line.
//!
//! Three ways to look at the same space-time diagram:
//!
//! - [`TileEngine`] - lazily computed, memoized square tiles, driven by a
//!   cooperative [`Budget`] so a frame-bound caller can stop and resume
//! - [`HashNode`] - immutable binary segments that jump `2^k` generations
//!   by recursive halving
//! - [`HashLife1D`] - the interned and memoized variant for quiescent rules
//!
//! Initial rows are described by [`InitialState`]; [`PatternSeed`] covers the
//! usual "periodic background, finite centre, periodic background" setup,
//! and [`rule110`] holds the ether and glider presets.
//!
//! # Example
//!
//! ```
//! use unshape_eca::{Budget, EngineConfig, Fetch, HashLife1D, Rule, SingleCell};
//!
//! let mut engine = EngineConfig::new(Rule::new(110))
//!     .with_tile_size(32)
//!     .build()
//!     .unwrap();
//! engine.set_initial_state(SingleCell);
//!
//! let Fetch::Ready(row) = engine.row_segment(-40, 41, 40, &Budget::unlimited()) else {
//!     unreachable!();
//! };
//!
//! let mut line = HashLife1D::new(Rule::new(110)).unwrap();
//! line.set_cell(0, true);
//! line.steps(40);
//! assert_eq!(line.row(-40, 41), row);
//! ```

mod budget;
mod cache;
mod engine;
mod error;
mod hash_node;
mod hashlife;
mod rule;
mod seed;
mod tile;

pub use budget::Budget;
pub use cache::{CacheEntry, CachePolicy, KeepAllPolicy, LruPolicy, TileCache};
pub use engine::{DEFAULT_TILE_SIZE, EngineConfig, EngineStats, TileEngine};
pub use error::{EcaError, Result};
pub use hash_node::HashNode;
pub use hashlife::HashLife1D;
pub use rule::{Rule, elementary_rules};
pub use seed::{
    InitialState, PatternSeed, SingleCell, parse_pattern, pattern_to_string, repeat_pattern,
    rule110,
};
pub use tile::{Fetch, Tile, TileCoord, tiles_covering};

// ============================================================================
// Invariant tests - cross-checks between the three evaluators
// ============================================================================
