//! Square blocks of the space-time diagram.

use std::ops::Range;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Identifies a `size × size` block of cells and generations.
///
/// Block `(x, time)` covers columns `x·size .. (x+1)·size` and generations
/// `time·size .. (time+1)·size`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TileCoord {
    /// Horizontal block index (any sign).
    pub x: i64,
    /// Block row in time (never negative).
    pub time: i64,
}

impl TileCoord {
    /// Creates a tile coordinate.
    ///
    /// # Panics
    ///
    /// Panics if `time` is negative.
    pub fn new(x: i64, time: i64) -> Self {
        assert!(time >= 0, "tile time must be non-negative, got {time}");
        Self { x, time }
    }

    /// The tile holding cell `x` at `generation`.
    ///
    /// # Panics
    ///
    /// Panics if `generation` is negative or `size` is zero.
    pub fn containing(x: i64, generation: i64, size: usize) -> Self {
        assert!(size > 0, "tile size must be positive");
        let size = size as i64;
        Self::new(x.div_euclid(size), generation.div_euclid(size))
    }

    /// The three tiles one block-row earlier that this tile depends on,
    /// left to right. `None` for time zero.
    pub fn dependencies(self) -> Option<[TileCoord; 3]> {
        if self.time == 0 {
            return None;
        }
        let t = self.time - 1;
        Some([
            TileCoord::new(self.x - 1, t),
            TileCoord::new(self.x, t),
            TileCoord::new(self.x + 1, t),
        ])
    }

    /// First column covered by this tile.
    ///
    /// # Panics
    ///
    /// Panics if the column does not fit in an `i64`.
    pub fn first_cell(self, size: usize) -> i64 {
        scale(self.x, size)
            .unwrap_or_else(|| panic!("first cell of {self:?} overflows at tile size {size}"))
    }

    /// First generation covered by this tile.
    ///
    /// # Panics
    ///
    /// Panics if the generation does not fit in an `i64`.
    pub fn first_generation(self, size: usize) -> i64 {
        scale(self.time, size).unwrap_or_else(|| {
            panic!("first generation of {self:?} overflows at tile size {size}")
        })
    }
}

fn scale(index: i64, size: usize) -> Option<i64> {
    i64::try_from(size).ok().and_then(|size| index.checked_mul(size))
}

/// All tiles intersecting a rectangle of cells × generations, row by row.
///
/// Generations before zero are clipped; empty ranges yield nothing.
pub fn tiles_covering(cells: Range<i64>, generations: Range<i64>, size: usize) -> Vec<TileCoord> {
    assert!(size > 0, "tile size must be positive");
    let g0 = generations.start.max(0);
    if cells.start >= cells.end || g0 >= generations.end {
        return Vec::new();
    }

    let s = size as i64;
    let x0 = cells.start.div_euclid(s);
    let x1 = (cells.end - 1).div_euclid(s);
    let t0 = g0.div_euclid(s);
    let t1 = (generations.end - 1).div_euclid(s);

    let mut tiles = Vec::with_capacity(((x1 - x0 + 1) * (t1 - t0 + 1)) as usize);
    for time in t0..=t1 {
        for x in x0..=x1 {
            tiles.push(TileCoord { x, time });
        }
    }
    tiles
}

/// A computed block: `size` rows of `size` cells.
///
/// Row `r` holds generation `time·size + r`; column `c` is cell `x·size + c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tile {
    rows: Vec<Vec<bool>>,
}

impl Tile {
    pub(crate) fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == rows.len()));
        Self { rows }
    }

    /// Edge length.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    /// All rows, oldest generation first.
    pub fn rows(&self) -> &[Vec<bool>] {
        &self.rows
    }

    /// Cells of one row.
    pub fn row(&self, generation_offset: usize) -> &[bool] {
        &self.rows[generation_offset]
    }

    /// The newest row, which seeds the tiles below it.
    pub fn last_row(&self) -> &[bool] {
        self.rows.last().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cell at a position relative to the tile's corner.
    pub fn get(&self, column: usize, generation_offset: usize) -> bool {
        self.rows
            .get(generation_offset)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(false)
    }

    /// Number of live cells.
    pub fn population(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|&&c| c)
            .count()
    }
}

/// Outcome of a budgeted request.
///
/// `Pending` is not an error: the budget ran out before the value could be
/// produced, and the caller should ask again later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetch<T> {
    /// The value is available.
    Ready(T),
    /// Not computed yet; retry with a fresh budget.
    Pending,
}

impl<T> Fetch<T> {
    /// Whether the value is available.
    pub fn is_ready(&self) -> bool {
        matches!(self, Fetch::Ready(_))
    }

    /// Whether the request ran out of budget.
    pub fn is_pending(&self) -> bool {
        matches!(self, Fetch::Pending)
    }

    /// Converts into an `Option`, dropping the distinction from absence.
    pub fn ready(self) -> Option<T> {
        match self {
            Fetch::Ready(value) => Some(value),
            Fetch::Pending => None,
        }
    }

    /// Borrows the ready value.
    pub fn as_ref(&self) -> Fetch<&T> {
        match self {
            Fetch::Ready(value) => Fetch::Ready(value),
            Fetch::Pending => Fetch::Pending,
        }
    }

    /// Maps the ready value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fetch<U> {
        match self {
            Fetch::Ready(value) => Fetch::Ready(f(value)),
            Fetch::Pending => Fetch::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tile_coord_containing() {
        assert_eq!(TileCoord::containing(0, 0, 10), TileCoord::new(0, 0));
        assert_eq!(TileCoord::containing(9, 9, 10), TileCoord::new(0, 0));
        assert_eq!(TileCoord::containing(10, 25, 10), TileCoord::new(1, 2));
        assert_eq!(TileCoord::containing(-1, 0, 10), TileCoord::new(-1, 0));
        assert_eq!(TileCoord::containing(-10, 0, 10), TileCoord::new(-1, 0));
        assert_eq!(TileCoord::containing(-11, 0, 10), TileCoord::new(-2, 0));
    }

    #[test]
    #[should_panic(expected = "non-negative")]
    fn test_negative_time_panics() {
        let _ = TileCoord::new(0, -1);
    }

    #[test]
    fn test_dependencies() {
        assert_eq!(TileCoord::new(3, 0).dependencies(), None);
        assert_eq!(
            TileCoord::new(3, 2).dependencies(),
            Some([
                TileCoord::new(2, 1),
                TileCoord::new(3, 1),
                TileCoord::new(4, 1)
            ])
        );
    }

    #[test]
    fn test_first_cell_and_generation() {
        let coord = TileCoord::new(-2, 3);
        assert_eq!(coord.first_cell(8), -16);
        assert_eq!(coord.first_generation(8), 24);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_first_cell_overflow_panics() {
        let _ = TileCoord::new(i64::MAX / 2, 0).first_cell(4);
    }

    #[test]
    #[should_panic(expected = "overflows")]
    fn test_first_generation_overflow_panics() {
        let _ = TileCoord::new(0, i64::MAX / 3).first_generation(200);
    }

    #[test]
    fn test_first_cell_at_extremes() {
        let coord = TileCoord::new(i64::MIN / 8, 0);
        assert_eq!(coord.first_cell(8), i64::MIN);
    }

    #[test]
    fn test_tiles_covering() {
        let tiles = tiles_covering(-5..15, 0..10, 10);
        assert_eq!(
            tiles,
            vec![
                TileCoord::new(-1, 0),
                TileCoord::new(0, 0),
                TileCoord::new(1, 0)
            ]
        );

        let tiles = tiles_covering(0..10, -20..11, 10);
        assert_eq!(tiles, vec![TileCoord::new(0, 0), TileCoord::new(0, 1)]);

        assert!(tiles_covering(5..5, 0..10, 10).is_empty());
        assert!(tiles_covering(0..10, -10..0, 10).is_empty());
    }

    #[test]
    fn test_tile_accessors() {
        let tile = Tile::from_rows(vec![vec![true, false], vec![false, false]]);
        assert_eq!(tile.size(), 2);
        assert!(tile.get(0, 0));
        assert!(!tile.get(1, 0));
        assert!(!tile.get(5, 5));
        assert_eq!(tile.last_row(), &[false, false]);
        assert_eq!(tile.population(), 1);
    }

    #[test]
    fn test_fetch_helpers() {
        let ready: Fetch<u32> = Fetch::Ready(2);
        assert!(ready.is_ready());
        assert_eq!(ready.clone().map(|v| v * 2), Fetch::Ready(4));
        assert_eq!(ready.as_ref(), Fetch::Ready(&2));
        assert_eq!(ready.ready(), Some(2));

        let pending: Fetch<u32> = Fetch::Pending;
        assert!(pending.is_pending());
        assert_eq!(pending.map(|v| v + 1), Fetch::Pending);
    }
}
