//! Error types for unshape-eca.

use thiserror::Error;

/// Errors that can occur while configuring an automaton or building its inputs.
///
/// Precondition violations on hot paths (negative tile time, mismatched node
/// levels) are programming errors and panic instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EcaError {
    /// Tile edge length must be at least one cell.
    #[error("invalid tile size: {0} (must be at least 1)")]
    InvalidTileSize(usize),

    /// A pattern string contained something other than `0` or `1`.
    #[error("invalid pattern character {ch:?} at position {position}")]
    InvalidPatternChar {
        /// The offending character.
        ch: char,
        /// Character index within the pattern string.
        position: usize,
    },

    /// A bounded cache must hold at least one tile.
    #[error("invalid cache capacity: {0} (must be at least 1)")]
    InvalidCacheCapacity(usize),

    /// A periodic pattern needs at least one cell.
    #[error("empty pattern")]
    EmptyPattern,

    /// A tree node can only be built from a power-of-two number of cells.
    #[error("cell count {0} is not a power of two")]
    NotPowerOfTwo(usize),

    /// The rule turns an all-dead neighborhood alive, so empty space is not stable.
    #[error("rule {0} is not quiescent (000 -> 1)")]
    NonQuiescentRule(u8),
}

/// Result alias for fallible unshape-eca operations.
pub type Result<T> = std::result::Result<T, EcaError>;
