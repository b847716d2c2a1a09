//! Elementary (Wolfram) transition rules.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An elementary cellular automaton rule (0-255).
///
/// Bit `i` of the rule number is the next state of a cell whose
/// neighborhood encodes to `i`, with left = 4, center = 2, right = 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Rule(u8);

impl Rule {
    /// Creates a rule from its Wolfram number.
    pub const fn new(number: u8) -> Self {
        Self(number)
    }

    /// Returns the rule number.
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Encodes a neighborhood into its table index (0-7).
    #[inline]
    pub const fn index(left: bool, center: bool, right: bool) -> u8 {
        (left as u8) << 2 | (center as u8) << 1 | (right as u8)
    }

    /// Next state of a cell given its neighborhood.
    #[inline]
    pub const fn apply(self, left: bool, center: bool, right: bool) -> bool {
        (self.0 >> Self::index(left, center, right)) & 1 == 1
    }

    /// Whether an all-dead neighborhood stays dead.
    pub const fn is_quiescent(self) -> bool {
        self.0 & 1 == 0
    }

    /// Advances a finite circular sequence by one generation.
    ///
    /// The first and last cells are treated as neighbors of each other, so the
    /// result has the same length as `state`. Empty input yields empty output.
    #[allow(clippy::needless_range_loop)]
    pub fn step(self, state: &[bool]) -> Vec<bool> {
        let width = state.len();
        let mut next = vec![false; width];

        for i in 0..width {
            let left = if i == 0 { state[width - 1] } else { state[i - 1] };
            let right = if i == width - 1 { state[0] } else { state[i + 1] };
            next[i] = self.apply(left, state[i], right);
        }

        next
    }
}

impl Default for Rule {
    fn default() -> Self {
        Self(elementary_rules::RULE_110)
    }
}

impl From<u8> for Rule {
    fn from(number: u8) -> Self {
        Self(number)
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule {}", self.0)
    }
}

/// Common 1D CA rules.
pub mod elementary_rules {
    /// Rule 30 - chaotic, used for random number generation.
    pub const RULE_30: u8 = 30;

    /// Rule 90 - Sierpinski triangle.
    pub const RULE_90: u8 = 90;

    /// Rule 110 - Turing complete.
    pub const RULE_110: u8 = 110;

    /// Rule 184 - traffic flow model.
    pub const RULE_184: u8 = 184;
}
