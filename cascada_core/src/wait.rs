// Copyright 2026 the Cascada Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded wait for a catalog that may arrive after the page loads.

use crate::config::PlayerConfig;

/// What to do after one poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaitStep {
    /// The catalog is available; initialize now.
    Ready,
    /// Poll again after this many milliseconds.
    RetryIn(u32),
    /// The deadline passed; show the empty state.
    GiveUp,
}

/// Poll policy: every `interval_ms` until `deadline_ms` after the first poll.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CatalogWait {
    /// Total wait budget in milliseconds.
    pub deadline_ms: u32,
    /// Delay between polls in milliseconds.
    pub interval_ms: u32,
}

impl CatalogWait {
    /// Creates a policy.
    #[must_use]
    pub const fn new(deadline_ms: u32, interval_ms: u32) -> Self {
        Self {
            deadline_ms,
            interval_ms,
        }
    }

    /// Decides the next step given the time since the first poll and whether
    /// the catalog is present.
    #[must_use]
    pub fn step(&self, elapsed_ms: f64, available: bool) -> WaitStep {
        if available {
            WaitStep::Ready
        } else if elapsed_ms < f64::from(self.deadline_ms) {
            WaitStep::RetryIn(self.interval_ms)
        } else {
            WaitStep::GiveUp
        }
    }
}

impl From<&PlayerConfig> for CatalogWait {
    fn from(config: &PlayerConfig) -> Self {
        Self::new(config.catalog_wait_ms, config.catalog_poll_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ready_wins_even_after_deadline() {
        let wait = CatalogWait::new(3000, 150);
        assert_eq!(wait.step(0.0, true), WaitStep::Ready);
        assert_eq!(wait.step(9000.0, true), WaitStep::Ready);
    }

    #[test]
    fn retries_until_deadline() {
        let wait = CatalogWait::from(&PlayerConfig::default());
        assert_eq!(wait.step(0.0, false), WaitStep::RetryIn(150));
        assert_eq!(wait.step(2999.9, false), WaitStep::RetryIn(150));
        assert_eq!(wait.step(3000.0, false), WaitStep::GiveUp);
    }
}
