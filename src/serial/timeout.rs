// src/serial/timeout.rs

//! Bounded busy-waiting for the console path
//!
//! The console writes synchronously and may not block forever on a wedged
//! transmitter. Every wait runs against a [`SpinBudget`]; when the budget
//! runs out the caller gets a [`SpinTimeout`] and decides what to drop.

use core::fmt;

/// Iteration budget for one wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinBudget {
    /// Condition checks before giving up
    pub max_iterations: u32,
}

impl SpinBudget {
    /// One character time at 9600 baud is about 1 ms; this covers several
    /// character times at any supported rate on a 1 GHz core.
    pub const fn console() -> Self {
        Self {
            max_iterations: 100_000,
        }
    }

    pub const fn short() -> Self {
        Self { max_iterations: 128 }
    }
}

impl Default for SpinBudget {
    fn default() -> Self {
        Self::console()
    }
}

/// A wait ran out of budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpinTimeout {
    pub iterations: u32,
}

impl fmt::Display for SpinTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gave up after {} checks", self.iterations)
    }
}

/// Spin until `condition` holds or the budget is spent.
pub fn spin_until<F>(budget: SpinBudget, mut condition: F) -> Result<(), SpinTimeout>
where
    F: FnMut() -> bool,
{
    for _ in 0..budget.max_iterations {
        if condition() {
            return Ok(());
        }
        core::hint::spin_loop();
    }
    Err(SpinTimeout {
        iterations: budget.max_iterations,
    })
}
