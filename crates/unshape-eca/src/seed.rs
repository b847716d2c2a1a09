//! Initial states for an infinite line of cells.
//!
//! An [`InitialState`] assigns a value to every integer position. Closures
//! `Fn(i64) -> bool` implement it directly; [`PatternSeed`] covers the common
//! case of a finite pattern embedded in two periodic backgrounds.
//!
//! # Example
//!
//! ```
//! use unshape_eca::{InitialState, PatternSeed};
//!
//! // ...0101 | 111 | 0011...
//! let seed = PatternSeed::parse("01", "111", "0011").unwrap();
//! assert!(seed.value_at(-1));
//! assert!(!seed.value_at(-2));
//! assert!(seed.value_at(2));
//! assert!(!seed.value_at(3));
//! assert!(seed.value_at(5));
//! ```

use crate::error::{EcaError, Result};

/// A total function from cell position to initial value.
pub trait InitialState {
    /// Value of the cell at `x` in generation zero.
    fn value_at(&self, x: i64) -> bool;
}

impl<F: Fn(i64) -> bool> InitialState for F {
    fn value_at(&self, x: i64) -> bool {
        self(x)
    }
}

/// A single live cell at position 0 on an otherwise dead line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SingleCell;

impl InitialState for SingleCell {
    fn value_at(&self, x: i64) -> bool {
        x == 0
    }
}

/// A finite pattern starting at position 0, flanked by periodic backgrounds.
///
/// Positions `x < 0` repeat `left` (so `left[len - 1]` sits at `-1`),
/// positions `0..center.len()` read `center`, and everything after repeats
/// `right` starting with `right[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternSeed {
    left: Vec<bool>,
    center: Vec<bool>,
    right: Vec<bool>,
}

impl PatternSeed {
    /// Creates a seed from cell vectors.
    ///
    /// `center` may be empty; the periodic sides may not.
    pub fn new(left: Vec<bool>, center: Vec<bool>, right: Vec<bool>) -> Result<Self> {
        if left.is_empty() || right.is_empty() {
            return Err(EcaError::EmptyPattern);
        }
        Ok(Self {
            left,
            center,
            right,
        })
    }

    /// Creates a seed from three `0`/`1` strings.
    pub fn parse(left: &str, center: &str, right: &str) -> Result<Self> {
        Self::new(
            parse_pattern(left)?,
            parse_pattern(center)?,
            parse_pattern(right)?,
        )
    }

    /// A single repeating pattern across the whole line.
    pub fn periodic(pattern: Vec<bool>) -> Result<Self> {
        Self::new(pattern.clone(), Vec::new(), pattern)
    }

    /// The left background period.
    pub fn left(&self) -> &[bool] {
        &self.left
    }

    /// The finite pattern at `0..center.len()`.
    pub fn center(&self) -> &[bool] {
        &self.center
    }

    /// The right background period.
    pub fn right(&self) -> &[bool] {
        &self.right
    }
}

impl InitialState for PatternSeed {
    fn value_at(&self, x: i64) -> bool {
        if x < 0 {
            let n = self.left.len() as i64;
            self.left[x.rem_euclid(n) as usize]
        } else if (x as u64) < self.center.len() as u64 {
            self.center[x as usize]
        } else {
            let n = self.right.len() as u64;
            let offset = x as u64 - self.center.len() as u64;
            self.right[(offset % n) as usize]
        }
    }
}

/// Parses a `0`/`1` string into cells.
///
/// Whitespace is not accepted; any character other than `0` or `1` is an error.
pub fn parse_pattern(s: &str) -> Result<Vec<bool>> {
    s.chars()
        .enumerate()
        .map(|(position, ch)| match ch {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(EcaError::InvalidPatternChar { ch, position }),
        })
        .collect()
}

/// Formats cells as a `0`/`1` string.
pub fn pattern_to_string(cells: &[bool]) -> String {
    cells.iter().map(|&c| if c { '1' } else { '0' }).collect()
}

/// Concatenates `n` copies of `pattern`.
pub fn repeat_pattern(pattern: &[bool], n: usize) -> Vec<bool> {
    pattern.repeat(n)
}

/// Rule 110 background and glider patterns.
pub mod rule110 {
    use super::{PatternSeed, repeat_pattern};

    /// The periodic background ("ether") of Rule 110, period 14.
    pub const ETHER: &str = "11111000100110";

    /// The "A" glider.
    pub const GLIDER_A: &str = "1110";

    /// Four A gliders packed together.
    pub const GLIDER_A4: &str = "1110111011101110";

    fn cells(pattern: &str) -> Vec<bool> {
        pattern.chars().map(|c| c == '1').collect()
    }

    /// Ether with two A gliders, each separated by five ether periods.
    pub fn ether_with_gliders() -> PatternSeed {
        let ether = cells(ETHER);
        let a = cells(GLIDER_A);

        let mut center = repeat_pattern(&ether, 5);
        center.extend_from_slice(&a);
        center.extend(repeat_pattern(&ether, 5));
        center.extend_from_slice(&a);
        center.extend(repeat_pattern(&ether, 5));

        PatternSeed {
            left: ether.clone(),
            center,
            right: ether,
        }
    }

    /// Three bands of A4 glider packs spread across a long stretch of ether.
    pub fn glider_bands() -> PatternSeed {
        let ether = cells(ETHER);
        let a4 = cells(GLIDER_A4);

        let mut pack = a4.clone();
        for gap in [27, 23, 25] {
            pack.extend(repeat_pattern(&ether, gap));
            pack.extend_from_slice(&a4);
        }

        let mut bands = pack.clone();
        for _ in 0..2 {
            bands.extend(repeat_pattern(&ether, 649));
            bands.extend_from_slice(&pack);
        }

        PatternSeed {
            left: ether.clone(),
            center: bands,
            right: ether,
        }
    }

    /// Whether `row` starting at `offset` matches one ether period.
    pub fn is_ether_at(row: &[bool], offset: usize) -> bool {
        let ether = cells(ETHER);
        row.get(offset..offset + ether.len())
            .is_some_and(|window| window == ether.as_slice())
    }
}
