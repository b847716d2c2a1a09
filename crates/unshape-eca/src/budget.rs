//! Cooperative work budgets.
//!
//! A [`Budget`] is created once per top-level request and passed by reference
//! through the whole recursive computation it triggers. Every cache miss asks
//! [`Budget::should_run`] before doing any work, so the cumulative cost of a
//! request stays bounded no matter how deep the dependency chain goes.
//!
//! ```
//! use std::time::Duration;
//! use unshape_eca::Budget;
//!
//! // Roughly one animation frame.
//! let frame = Budget::new(Duration::from_millis(16));
//! assert!(frame.should_run());
//!
//! assert!(!Budget::expired().should_run());
//! assert!(Budget::unlimited().should_run());
//! ```

use std::cell::Cell;
use std::time::{Duration, Instant};

/// A deadline (and optionally a step allowance) bounding synchronous work.
///
/// Not `Clone`: a copy would count its own fuel. Pass `&Budget` down instead.
#[derive(Debug)]
pub struct Budget {
    deadline: Option<Instant>,
    fuel: Option<Cell<u64>>,
}

impl Budget {
    /// A budget that expires `duration` from now.
    pub fn new(duration: Duration) -> Self {
        Self {
            deadline: Instant::now().checked_add(duration),
            fuel: None,
        }
    }

    /// A budget that never expires.
    pub fn unlimited() -> Self {
        Self {
            deadline: None,
            fuel: None,
        }
    }

    /// A budget that has already expired.
    pub fn expired() -> Self {
        Self::with_fuel(0)
    }

    /// A budget that allows exactly `steps` successful checks.
    ///
    /// Deterministic, unlike wall-clock deadlines; each call to
    /// [`should_run`](Self::should_run) that returns `true` consumes one step.
    pub fn with_fuel(steps: u64) -> Self {
        Self {
            deadline: None,
            fuel: Some(Cell::new(steps)),
        }
    }

    /// Adds a step allowance on top of the deadline.
    pub fn and_fuel(mut self, steps: u64) -> Self {
        self.fuel = Some(Cell::new(steps));
        self
    }

    /// Whether work may continue.
    pub fn should_run(&self) -> bool {
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return false;
            }
        }
        match &self.fuel {
            Some(fuel) => {
                let left = fuel.get();
                if left == 0 {
                    return false;
                }
                fuel.set(left - 1);
                true
            }
            None => true,
        }
    }

    /// Time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Steps left, if this budget counts steps.
    pub fn remaining_fuel(&self) -> Option<u64> {
        self.fuel.as_ref().map(Cell::get)
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::unlimited()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unlimited_budget() {
        let budget = Budget::unlimited();
        for _ in 0..1000 {
            assert!(budget.should_run());
        }
        assert_eq!(budget.remaining(), None);
        assert_eq!(budget.remaining_fuel(), None);
    }

    #[test]
    fn test_expired_budget() {
        let budget = Budget::expired();
        assert!(!budget.should_run());
        assert!(!budget.should_run());
    }

    #[test]
    fn test_zero_duration_expires_immediately() {
        let budget = Budget::new(Duration::ZERO);
        assert!(!budget.should_run());
        assert_eq!(budget.remaining(), Some(Duration::ZERO));
    }

    #[test]
    fn test_long_deadline_runs() {
        let budget = Budget::new(Duration::from_secs(3600));
        assert!(budget.should_run());
        assert!(budget.remaining().is_some_and(|d| d > Duration::from_secs(60)));
    }

    #[test]
    fn test_fuel_counts_down() {
        let budget = Budget::with_fuel(3);
        assert!(budget.should_run());
        assert!(budget.should_run());
        assert_eq!(budget.remaining_fuel(), Some(1));
        assert!(budget.should_run());
        assert!(!budget.should_run());
        assert_eq!(budget.remaining_fuel(), Some(0));
    }

    #[test]
    fn test_deadline_and_fuel() {
        let budget = Budget::new(Duration::from_secs(3600)).and_fuel(1);
        assert!(budget.should_run());
        assert!(!budget.should_run());

        // An expired deadline does not consume fuel.
        let budget = Budget::new(Duration::ZERO).and_fuel(5);
        assert!(!budget.should_run());
        assert_eq!(budget.remaining_fuel(), Some(5));
    }
}
