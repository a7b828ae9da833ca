//! Coverage configuration.
//!
//! Thresholds consumed by the draft generator and both validators.
//! Injected explicitly wherever needed — there is no module-level
//! singleton.

use serde::{Deserialize, Serialize};

/// Coverage thresholds and generation policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoverageConfig {
    /// Minimum covering assignments per slot before it is under-covered.
    pub min_per_slot: u32,
    /// Maximum covering assignments per slot before it is over-covered.
    pub max_per_slot: u32,
    /// Coverage the generator aims for per slot (capped at `max_per_slot`).
    pub generation_target: u32,
    /// Whether PRN therapists stay in the picker pool.
    ///
    /// When `true`, PRN candidates are still rejected per-date unless a
    /// `force_on` override exists; when `false` they never enter rotation.
    pub prn_in_pool: bool,
}

impl Default for CoverageConfig {
    fn default() -> Self {
        Self {
            min_per_slot: 3,
            max_per_slot: 5,
            generation_target: 4,
            prn_in_pool: false,
        }
    }
}

impl CoverageConfig {
    /// Creates the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum coverage threshold.
    pub fn with_min(mut self, min_per_slot: u32) -> Self {
        self.min_per_slot = min_per_slot;
        self
    }

    /// Sets the maximum coverage threshold.
    pub fn with_max(mut self, max_per_slot: u32) -> Self {
        self.max_per_slot = max_per_slot;
        self
    }

    /// Sets the generation target.
    pub fn with_generation_target(mut self, target: u32) -> Self {
        self.generation_target = target;
        self
    }

    /// Keeps PRN therapists in the picker pool (filtered per-date).
    pub fn with_prn_in_pool(mut self, prn_in_pool: bool) -> Self {
        self.prn_in_pool = prn_in_pool;
        self
    }

    /// Effective per-slot fill target: the smaller of max and target.
    #[inline]
    pub fn fill_target(&self) -> u32 {
        self.generation_target.min(self.max_per_slot)
    }
}
