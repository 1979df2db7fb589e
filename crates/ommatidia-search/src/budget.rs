// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Cooperative cancellation for the search loops.

use std::time::{Duration, Instant};

/// An iteration cap plus an optional wall-clock limit.
///
/// Loops call [`IterationBudget::try_next`] at the top of every iteration;
/// there is no other way to stop a search early.
#[derive(Debug, Clone)]
pub struct IterationBudget {
    max_iterations: u32,
    time_limit: Option<Duration>,
    started: Instant,
    used: u32,
}

impl IterationBudget {
    /// Creates a budget whose clock starts now.
    pub fn new(max_iterations: u32, time_limit: Option<Duration>) -> Self {
        Self {
            max_iterations,
            time_limit,
            started: Instant::now(),
            used: 0,
        }
    }

    /// Claims one iteration. Returns `false` once either limit is reached.
    pub fn try_next(&mut self) -> bool {
        if self.is_exhausted() {
            return false;
        }
        self.used += 1;
        true
    }

    /// Checks whether either limit has been reached.
    pub fn is_exhausted(&self) -> bool {
        if self.used >= self.max_iterations {
            return true;
        }
        matches!(self.time_limit, Some(limit) if self.started.elapsed() >= limit)
    }

    /// Number of iterations claimed so far.
    pub fn used(&self) -> u32 {
        self.used
    }

    /// Time since the budget was created.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iteration_cap() {
        let mut budget = IterationBudget::new(3, None);
        assert!(budget.try_next());
        assert!(budget.try_next());
        assert!(budget.try_next());
        assert!(!budget.try_next());
        assert_eq!(budget.used(), 3);
    }

    #[test]
    fn test_zero_time_limit_stops_immediately() {
        let mut budget = IterationBudget::new(100, Some(Duration::ZERO));
        assert!(!budget.try_next());
        assert_eq!(budget.used(), 0);
    }

    #[test]
    fn test_generous_time_limit_does_not_interfere() {
        let mut budget = IterationBudget::new(2, Some(Duration::from_secs(3600)));
        assert!(budget.try_next());
        assert!(budget.try_next());
        assert!(!budget.try_next());
    }
}
