//! Memoized doubling for quiescent rules on an unbounded line.
//!
//! [`HashLife1D`] is the canonicalized relative of [`HashNode`](crate::HashNode):
//! segments are interned in a node table so identical regions share one id,
//! and advance results are cached per `(node, step_log2)`. Periodic regions
//! such as the rule 110 ether collapse to a handful of nodes, so jumps of
//! `2^n` generations cost far less than `2^n` rule applications.
//!
//! Only the live region is stored, which limits this to rules that keep
//! empty space empty (`000 -> 0`).

use std::collections::HashMap;

use crate::error::{EcaError, Result};
use crate::rule::Rule;

/// Results above this many entries are dropped wholesale.
const RESULT_CACHE_LIMIT: usize = 1_000_000;

/// An interned segment. Level `L` covers `2^L` cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum SegNode {
    /// A single cell (level 0).
    Leaf(bool),
    /// Two equal-level halves.
    Interior {
        level: u32,
        left: u64,
        right: u64,
        population: u64,
    },
}

/// A line of cells advanced by memoized recursion.
///
/// # Example
///
/// ```
/// use unshape_eca::{HashLife1D, Rule};
///
/// let mut line = HashLife1D::new(Rule::new(90)).unwrap();
/// line.set_cell(0, true);
///
/// // Rule 90 grows a Sierpinski triangle: row 2^n has exactly two cells.
/// line.step_pow2(5);
/// assert_eq!(line.generation(), 32);
/// assert_eq!(line.population(), 2);
/// assert!(line.get_cell(-32) && line.get_cell(32));
/// ```
#[derive(Debug, Clone)]
pub struct HashLife1D {
    rule: Rule,
    nodes: Vec<SegNode>,
    node_map: HashMap<SegNode, u64>,
    /// (node, step_log2) -> centre half after `2^step_log2` generations.
    result_cache: HashMap<(u64, u32), u64>,
    root: u64,
    generation: u64,
    /// Absolute position of the root's first cell.
    origin: i64,
}

impl HashLife1D {
    const DEAD: u64 = 0;
    const ALIVE: u64 = 1;

    /// Creates an empty line.
    ///
    /// Fails with [`EcaError::NonQuiescentRule`] when the rule turns `000`
    /// into a live cell, since the live region would be infinite.
    pub fn new(rule: Rule) -> Result<Self> {
        if !rule.is_quiescent() {
            return Err(EcaError::NonQuiescentRule(rule.number()));
        }
        Ok(Self::empty(rule))
    }

    fn empty(rule: Rule) -> Self {
        let mut nodes = Vec::new();
        let mut node_map = HashMap::new();
        nodes.push(SegNode::Leaf(false));
        node_map.insert(SegNode::Leaf(false), Self::DEAD);
        nodes.push(SegNode::Leaf(true));
        node_map.insert(SegNode::Leaf(true), Self::ALIVE);

        let mut line = Self {
            rule,
            nodes,
            node_map,
            result_cache: HashMap::new(),
            root: Self::DEAD,
            generation: 0,
            origin: 0,
        };
        line.root = line.interior(1, Self::DEAD, Self::DEAD);
        line
    }

    /// Builds a line whose cell `offset + i` is `cells[i]`.
    pub fn from_cells(rule: Rule, cells: &[bool], offset: i64) -> Result<Self> {
        let mut line = Self::new(rule)?;
        for (i, &alive) in cells.iter().enumerate() {
            if alive {
                line.set_cell(offset + i as i64, true);
            }
        }
        Ok(line)
    }

    /// The rule being simulated.
    pub fn rule(&self) -> Rule {
        self.rule
    }

    /// Switches rules, dropping all cached results.
    pub fn set_rule(&mut self, rule: Rule) -> Result<()> {
        if !rule.is_quiescent() {
            return Err(EcaError::NonQuiescentRule(rule.number()));
        }
        if rule != self.rule {
            self.rule = rule;
            self.result_cache.clear();
        }
        Ok(())
    }

    fn interior(&mut self, level: u32, left: u64, right: u64) -> u64 {
        let population = self.node_population(left) + self.node_population(right);
        let node = SegNode::Interior {
            level,
            left,
            right,
            population,
        };
        if let Some(&id) = self.node_map.get(&node) {
            return id;
        }
        let id = self.nodes.len() as u64;
        self.nodes.push(node.clone());
        self.node_map.insert(node, id);
        id
    }

    fn level(&self, id: u64) -> u32 {
        match &self.nodes[id as usize] {
            SegNode::Leaf(_) => 0,
            SegNode::Interior { level, .. } => *level,
        }
    }

    fn node_population(&self, id: u64) -> u64 {
        match &self.nodes[id as usize] {
            SegNode::Leaf(alive) => *alive as u64,
            SegNode::Interior { population, .. } => *population,
        }
    }

    fn children(&self, id: u64) -> (u64, u64) {
        match &self.nodes[id as usize] {
            SegNode::Leaf(_) => panic!("leaf segments have no children"),
            SegNode::Interior { left, right, .. } => (*left, *right),
        }
    }

    fn empty_node(&mut self, level: u32) -> u64 {
        if level == 0 {
            Self::DEAD
        } else {
            let child = self.empty_node(level - 1);
            self.interior(level, child, child)
        }
    }

    /// Doubles the root, keeping the old contents in the middle.
    fn expand(&mut self) {
        let level = self.level(self.root);
        let (left, right) = self.children(self.root);
        let empty = self.empty_node(level - 1);

        let new_left = self.interior(level, empty, left);
        let new_right = self.interior(level, right, empty);
        self.root = self.interior(level + 1, new_left, new_right);
        self.origin -= 1i64 << (level - 1);
    }

    /// Whether the absolute cell `x` lies inside the stored root.
    pub fn contains(&self, x: i64) -> bool {
        let local = x - self.origin;
        local >= 0 && local < 1i64 << self.level(self.root)
    }

    /// Sets one cell, growing the root as needed.
    ///
    /// Memoized results stay valid: they are keyed by interned node ids, and
    /// an edit only produces new ids.
    pub fn set_cell(&mut self, x: i64, alive: bool) {
        while self.level(self.root) < 3 || !self.contains(x) {
            self.expand();
        }
        self.root = self.set_cell_recursive(self.root, x - self.origin, alive);
    }

    fn set_cell_recursive(&mut self, node: u64, x: i64, alive: bool) -> u64 {
        let level = self.level(node);
        if level == 0 {
            return if alive { Self::ALIVE } else { Self::DEAD };
        }

        let (left, right) = self.children(node);
        let half = 1i64 << (level - 1);
        if x < half {
            let left = self.set_cell_recursive(left, x, alive);
            self.interior(level, left, right)
        } else {
            let right = self.set_cell_recursive(right, x - half, alive);
            self.interior(level, left, right)
        }
    }

    /// Reads one cell. Anything outside the stored root is dead.
    pub fn get_cell(&self, x: i64) -> bool {
        if !self.contains(x) {
            return false;
        }
        let mut node = self.root;
        let mut local = x - self.origin;
        loop {
            match &self.nodes[node as usize] {
                SegNode::Leaf(alive) => return *alive,
                SegNode::Interior {
                    level, left, right, ..
                } => {
                    let half = 1i64 << (level - 1);
                    if local < half {
                        node = *left;
                    } else {
                        node = *right;
                        local -= half;
                    }
                }
            }
        }
    }

    /// Cells `x0 .. x0 + width`.
    pub fn row(&self, x0: i64, width: usize) -> Vec<bool> {
        (x0..x0 + width as i64).map(|x| self.get_cell(x)).collect()
    }

    /// Advances one generation.
    pub fn step(&mut self) {
        self.step_pow2(0);
    }

    /// Advances exactly `2^n` generations.
    pub fn step_pow2(&mut self, n: u32) {
        // advance() on level L moves 2^(L-2) generations at most
        while self.level(self.root) < n + 2 {
            self.expand();
        }
        while self.needs_expansion() {
            self.expand();
        }
        // Live cells now sit in the middle quarter, clear of the light cone.
        self.expand();

        let level = self.level(self.root);
        self.root = self.advance(self.root, n);
        self.generation += 1u64 << n;
        self.origin += 1i64 << (level - 2);
    }

    /// Advances `n` generations by binary decomposition.
    pub fn steps(&mut self, n: u64) {
        let mut remaining = n;
        let mut bit = 0u32;
        while remaining > 0 {
            if remaining & 1 == 1 {
                self.step_pow2(bit);
            }
            remaining >>= 1;
            bit += 1;
        }
    }

    /// Whether a live cell sits in the outer quarters of the root.
    fn needs_expansion(&self) -> bool {
        let (left, right) = self.children(self.root);
        let (outer_left, _) = self.children(left);
        let (_, outer_right) = self.children(right);
        self.node_population(outer_left) > 0 || self.node_population(outer_right) > 0
    }

    /// Centre half of a level-`L` node after `2^step_log2` generations.
    fn advance(&mut self, node: u64, step_log2: u32) -> u64 {
        let level = self.level(node);
        debug_assert!(level >= 2);
        debug_assert!(step_log2 <= level - 2);

        if let Some(&result) = self.result_cache.get(&(node, step_log2)) {
            return result;
        }

        let result = if level == 2 {
            self.advance_level2(node)
        } else if step_log2 == level - 2 {
            self.advance_full(node)
        } else {
            self.advance_slow(node, step_log2)
        };

        self.result_cache.insert((node, step_log2), result);
        if self.result_cache.len() > RESULT_CACHE_LIMIT {
            log::debug!("result cache over {RESULT_CACHE_LIMIT} entries, clearing");
            self.result_cache.clear();
        }
        result
    }

    /// Four cells `a b c d` become `b' c'`.
    fn advance_level2(&mut self, node: u64) -> u64 {
        let (left, right) = self.children(node);
        let (a, b) = self.children(left);
        let (c, d) = self.children(right);
        let alive = |id: u64| id == Self::ALIVE;
        let (a, b, c, d) = (alive(a), alive(b), alive(c), alive(d));

        let leaf = |v: bool| if v { Self::ALIVE } else { Self::DEAD };
        let new_b = leaf(self.rule.apply(a, b, c));
        let new_c = leaf(self.rule.apply(b, c, d));
        self.interior(1, new_b, new_c)
    }

    /// The three overlapping level `L-1` windows of a level `L` node.
    fn three_windows(&mut self, node: u64) -> (u64, u64, u64) {
        let level = self.level(node);
        let (left, right) = self.children(node);
        let (_, left_inner) = self.children(left);
        let (right_inner, _) = self.children(right);
        let middle = self.interior(level - 1, left_inner, right_inner);
        (left, middle, right)
    }

    fn center_node(&mut self, node: u64) -> u64 {
        let level = self.level(node);
        let (left, right) = self.children(node);
        let (_, left_inner) = self.children(left);
        let (right_inner, _) = self.children(right);
        self.interior(level - 1, left_inner, right_inner)
    }

    /// Two rounds of `2^(L-3)` generations.
    fn advance_full(&mut self, node: u64) -> u64 {
        let level = self.level(node);
        let sub_step = level - 3;
        let (n0, n1, n2) = self.three_windows(node);

        let r0 = self.advance(n0, sub_step);
        let r1 = self.advance(n1, sub_step);
        let r2 = self.advance(n2, sub_step);

        let c0 = self.interior(level - 1, r0, r1);
        let c1 = self.interior(level - 1, r1, r2);

        let f0 = self.advance(c0, sub_step);
        let f1 = self.advance(c1, sub_step);
        self.interior(level - 1, f0, f1)
    }

    /// One round of `2^step_log2` generations, then recentre.
    fn advance_slow(&mut self, node: u64, step_log2: u32) -> u64 {
        let level = self.level(node);
        let (n0, n1, n2) = self.three_windows(node);

        let r0 = self.advance(n0, step_log2);
        let r1 = self.advance(n1, step_log2);
        let r2 = self.advance(n2, step_log2);

        let c0 = self.interior(level - 1, r0, r1);
        let c1 = self.interior(level - 1, r1, r2);

        let f0 = self.center_node(c0);
        let f1 = self.center_node(c1);
        self.interior(level - 1, f0, f1)
    }

    /// Number of live cells.
    pub fn population(&self) -> u64 {
        self.node_population(self.root)
    }

    /// Generations advanced since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Leftmost and rightmost live cells, inclusive.
    pub fn bounds(&self) -> Option<(i64, i64)> {
        if self.population() == 0 {
            return None;
        }
        let min = self.origin + self.first_live(self.root, false);
        let max = self.origin + self.first_live(self.root, true);
        Some((min, max))
    }

    /// Offset of the first live cell scanning from the left, or from the right.
    fn first_live(&self, node: u64, from_right: bool) -> i64 {
        let mut node = node;
        let mut offset = 0i64;
        while let SegNode::Interior {
            level, left, right, ..
        } = &self.nodes[node as usize]
        {
            let half = 1i64 << (level - 1);
            let take_right = if from_right {
                self.node_population(*right) > 0
            } else {
                self.node_population(*left) == 0
            };
            if take_right {
                node = *right;
                offset += half;
            } else {
                node = *left;
            }
        }
        offset
    }

    /// Interned segments, including the two leaves.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Memoized advance results currently held.
    pub fn cached_results(&self) -> usize {
        self.result_cache.len()
    }

    /// Drops memoized advance results.
    pub fn clear_cache(&mut self) {
        self.result_cache.clear();
    }
}

impl Default for HashLife1D {
    /// An empty rule 110 line.
    fn default() -> Self {
        Self::empty(Rule::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::reference_rows;
    use crate::seed::SingleCell;

    fn line(rule: u8, live: &[i64]) -> HashLife1D {
        let mut line = HashLife1D::new(Rule::new(rule)).unwrap();
        for &x in live {
            line.set_cell(x, true);
        }
        line
    }

    #[test]
    fn test_hashlife_creation() {
        let line = HashLife1D::new(Rule::new(110)).unwrap();
        assert_eq!(line.population(), 0);
        assert_eq!(line.generation(), 0);
        assert_eq!(line.bounds(), None);
    }

    #[test]
    fn test_default_is_empty_rule_110() {
        let line = HashLife1D::default();
        assert_eq!(line.rule(), Rule::new(110));
        assert_eq!(line.population(), 0);

        let mut line = line;
        line.set_cell(0, true);
        line.step();
        assert_eq!(line.row(-1, 2), vec![true, true]);
    }

    #[test]
    fn test_rejects_non_quiescent_rule() {
        assert_eq!(
            HashLife1D::new(Rule::new(1)).unwrap_err(),
            EcaError::NonQuiescentRule(1)
        );
        let mut line = HashLife1D::default();
        assert!(line.set_rule(Rule::new(255)).is_err());
        assert!(line.set_rule(Rule::new(30)).is_ok());
        assert_eq!(line.rule(), Rule::new(30));
    }

    #[test]
    fn test_set_get() {
        let mut line = line(110, &[0, 5, -7]);
        assert!(line.get_cell(0));
        assert!(line.get_cell(5));
        assert!(line.get_cell(-7));
        assert!(!line.get_cell(1));
        assert!(!line.get_cell(1_000_000));
        assert_eq!(line.population(), 3);

        line.set_cell(5, false);
        assert!(!line.get_cell(5));
        assert_eq!(line.population(), 2);
    }

    #[test]
    fn test_bounds() {
        let line = line(110, &[12, -3, 4]);
        assert_eq!(line.bounds(), Some((-3, 12)));
    }

    #[test]
    fn test_single_steps_match_reference() {
        for rule in [18u8, 30, 90, 110, 184] {
            let mut line = line(rule, &[0]);
            let expected = reference_rows(Rule::new(rule), &SingleCell, -20, 41, 20);
            for (generation, row) in expected.iter().enumerate() {
                assert_eq!(
                    &line.row(-20, 41),
                    row,
                    "rule {rule} generation {generation}"
                );
                line.step();
            }
        }
    }

    #[test]
    fn test_step_pow2_matches_reference() {
        let rule = Rule::new(110);
        let expected = reference_rows(rule, &SingleCell, -80, 90, 65);
        for n in 0..=6 {
            let mut line = line(110, &[0]);
            line.step_pow2(n);
            let generation = 1usize << n;
            assert_eq!(line.generation(), generation as u64);
            assert_eq!(line.row(-80, 90), expected[generation], "2^{n}");
        }
    }

    #[test]
    fn test_steps_decomposed() {
        let mut a = line(30, &[0, 3]);
        let mut b = a.clone();

        for _ in 0..13 {
            a.step();
        }
        b.steps(13); // 8 + 4 + 1

        assert_eq!(a.generation(), 13);
        assert_eq!(b.generation(), 13);
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.row(-20, 40), b.row(-20, 40));
    }

    #[test]
    fn test_rule_90_sierpinski() {
        let mut line = line(90, &[0]);
        line.step_pow2(10);
        assert_eq!(line.generation(), 1024);
        assert_eq!(line.population(), 2);
        assert_eq!(line.bounds(), Some((-1024, 1024)));
    }

    #[test]
    fn test_rule_184_traffic_keeps_population() {
        // rule 184 conserves the number of cars
        let mut line = line(184, &[0, 1, 2, 5, 9]);
        line.steps(100);
        assert_eq!(line.population(), 5);
    }

    #[test]
    fn test_from_cells() {
        let cells = [true, false, true, true];
        let line = HashLife1D::from_cells(Rule::new(110), &cells, -2).unwrap();
        assert_eq!(line.row(-2, 4), cells.to_vec());
        assert_eq!(line.population(), 3);
    }

    #[test]
    fn test_memoization() {
        let mut a = line(110, &[0]);
        let mut b = a.clone();

        a.step_pow2(6);
        assert!(a.cached_results() > 0);
        b.clear_cache();
        b.step_pow2(6);

        assert_eq!(a.generation(), b.generation());
        assert_eq!(a.bounds(), b.bounds());
        assert_eq!(a.row(-70, 80), b.row(-70, 80));
    }

    #[test]
    fn test_set_cell_keeps_results() {
        let mut line = line(110, &[0]);
        line.step_pow2(3);
        let cached = line.cached_results();
        assert!(cached > 0);

        line.set_cell(40, true);
        assert_eq!(line.cached_results(), cached);

        // The edited line still evolves correctly with the old results in place.
        let eighth = reference_rows(Rule::new(110), &SingleCell, -30, 80, 9)[8].clone();
        let seed = move |x: i64| x == 40 || ((-30..50).contains(&x) && eighth[(x + 30) as usize]);
        let expected = reference_rows(Rule::new(110), &seed, -20, 80, 9);
        line.steps(8);
        assert_eq!(line.row(-20, 80), expected[8]);
    }

    #[test]
    fn test_identical_segments_are_interned() {
        let cells: Vec<bool> = (0..128).map(|i| i % 2 == 0).collect();
        let mut line = HashLife1D::from_cells(Rule::new(110), &cells, 0).unwrap();
        assert_eq!(line.population(), 64);

        // Rewriting the same cells only hits existing nodes.
        let before = line.node_count();
        for (i, &alive) in cells.iter().enumerate() {
            line.set_cell(i as i64, alive);
        }
        assert_eq!(line.node_count(), before);
    }
}
