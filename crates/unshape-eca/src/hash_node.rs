//! Binary-tree segments advanced by recursive doubling.
//!
//! A [`HashNode`] of level `L` holds `2^L` contiguous cells at one instant.
//! [`HashNode::step`] returns the centre half of the segment one generation
//! later, computed from two overlapping half-size segments that are each
//! stepped the same way, down to a 4-cell base case.
//!
//! Nodes are plain immutable trees: identical sub-segments are not shared, and
//! nothing is memoized. See [`HashLife1D`](crate::HashLife1D) for the
//! canonicalized variant.
//!
//! ```
//! use unshape_eca::{HashNode, Rule};
//!
//! // |0 0 0 1 0 0 0 0| under rule 110 ...
//! let cells = [false, false, false, true, false, false, false, false];
//! let node = HashNode::from_cells(Rule::new(110), &cells).unwrap();
//!
//! // ... has |1 1 0 0| over cells 2..6 one generation later.
//! let next = node.step();
//! assert_eq!(next.level(), 2);
//! assert_eq!(next.cells(), vec![true, true, false, false]);
//! ```

use std::sync::Arc;

use crate::error::{EcaError, Result};
use crate::rule::Rule;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Leaf(bool),
    Branch {
        left: Arc<HashNode>,
        right: Arc<HashNode>,
    },
}

/// An immutable power-of-two segment of cells at a single instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashNode {
    rule: Rule,
    level: u32,
    segment: Segment,
    /// Flattened cells, kept for levels 0-2 only.
    pattern: Vec<bool>,
}

impl HashNode {
    /// A single cell (level 0).
    pub fn leaf(rule: Rule, alive: bool) -> Self {
        Self {
            rule,
            level: 0,
            segment: Segment::Leaf(alive),
            pattern: vec![alive],
        }
    }

    /// Joins two adjacent segments of equal level.
    ///
    /// # Panics
    ///
    /// Panics if the levels differ.
    pub fn branch(left: Arc<HashNode>, right: Arc<HashNode>) -> Self {
        assert_eq!(
            left.level, right.level,
            "sibling nodes must have equal levels"
        );
        debug_assert_eq!(left.rule, right.rule);

        let level = left.level + 1;
        let pattern = if level <= 2 {
            [left.pattern.as_slice(), right.pattern.as_slice()].concat()
        } else {
            Vec::new()
        };
        Self {
            rule: left.rule,
            level,
            segment: Segment::Branch { left, right },
            pattern,
        }
    }

    /// Builds a tree over `cells`, whose length must be a power of two.
    pub fn from_cells(rule: Rule, cells: &[bool]) -> Result<Self> {
        if !cells.len().is_power_of_two() {
            return Err(EcaError::NotPowerOfTwo(cells.len()));
        }
        Ok(Self::build(rule, cells))
    }

    fn build(rule: Rule, cells: &[bool]) -> Self {
        if let [alive] = cells {
            return Self::leaf(rule, *alive);
        }
        let (left, right) = cells.split_at(cells.len() / 2);
        Self::branch(
            Arc::new(Self::build(rule, left)),
            Arc::new(Self::build(rule, right)),
        )
    }

    /// Tree level; the segment holds `2^level` cells.
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        1 << self.level
    }

    /// Always false; a segment holds at least one cell.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// The rule this segment evolves under.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Cell value of a level-0 node.
    pub fn value(&self) -> Option<bool> {
        match self.segment {
            Segment::Leaf(alive) => Some(alive),
            Segment::Branch { .. } => None,
        }
    }

    /// Left and right halves of a branch node.
    pub fn children(&self) -> Option<(&Arc<HashNode>, &Arc<HashNode>)> {
        match &self.segment {
            Segment::Leaf(_) => None,
            Segment::Branch { left, right } => Some((left, right)),
        }
    }

    fn halves(&self) -> (&Arc<HashNode>, &Arc<HashNode>) {
        match &self.segment {
            Segment::Leaf(_) => panic!("cannot split a leaf node"),
            Segment::Branch { left, right } => (left, right),
        }
    }

    /// All cells, left to right.
    pub fn cells(&self) -> Vec<bool> {
        if self.level <= 2 {
            return self.pattern.clone();
        }
        let mut out = Vec::with_capacity(self.len());
        self.collect_cells(&mut out);
        out
    }

    fn collect_cells(&self, out: &mut Vec<bool>) {
        if self.level <= 2 {
            out.extend_from_slice(&self.pattern);
            return;
        }
        let (left, right) = self.halves();
        left.collect_cells(out);
        right.collect_cells(out);
    }

    /// The centre half of this segment, one generation later.
    ///
    /// For a level-`L` node covering cells `0 .. 2^L`, the result is the
    /// level-`L-1` node covering `2^(L-2) .. 3·2^(L-2)`.
    ///
    /// # Panics
    ///
    /// Panics if the level is below 2.
    pub fn step(&self) -> HashNode {
        assert!(
            self.level >= 2,
            "step needs a node of level 2 or more, got level {}",
            self.level
        );

        if self.level == 2 {
            // |a b c d| -> |b' c'|; the wrapped outer cells are discarded.
            let next = self.rule.step(&self.pattern);
            return Self::branch(
                Arc::new(Self::leaf(self.rule, next[1])),
                Arc::new(Self::leaf(self.rule, next[2])),
            );
        }

        // Split into eighths:
        // this = |0 1 2 3|4 5 6 7|
        // ret  =     |a b c d|
        // |a b| = |1 2 3 4|.step
        // |c d| = |3 4 5 6|.step
        let (left, right) = self.halves();
        let (ll, lr) = left.halves();
        let (rl, rr) = right.halves();
        let (_, e1) = ll.halves();
        let (e2, e3) = lr.halves();
        let (e4, e5) = rl.halves();
        let (e6, _) = rr.halves();

        let left_part = Arc::new(Self::branch(Arc::clone(e1), Arc::clone(e2)));
        let center = Arc::new(Self::branch(Arc::clone(e3), Arc::clone(e4)));
        let right_part = Arc::new(Self::branch(Arc::clone(e5), Arc::clone(e6)));

        let left_shifted = Self::branch(left_part, Arc::clone(&center));
        let right_shifted = Self::branch(center, right_part);

        Self::branch(
            Arc::new(left_shifted.step()),
            Arc::new(right_shifted.step()),
        )
    }

    /// Applies [`step`](Self::step) `generations` times.
    ///
    /// Each step keeps the centre half, so the result has level
    /// `level - generations` and starts
    /// `2^(L-1) - 2^(L-1-generations)` cells into this segment.
    ///
    /// # Panics
    ///
    /// Panics unless `level > generations` (any node may advance zero).
    pub fn advance(&self, generations: u32) -> HashNode {
        assert!(
            generations == 0 || self.level > generations,
            "advancing {generations} generations needs level > {generations}, got level {}",
            self.level
        );
        let mut node = self.clone();
        for _ in 0..generations {
            node = node.step();
        }
        node
    }
}
