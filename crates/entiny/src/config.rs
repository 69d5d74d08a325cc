// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Configuration structures for the sampler
//!
//! A [`SamplerConfig`] is plain data: it can be built in code or deserialized
//! from JSON, and is checked with [`SamplerConfig::validate`] when a plan is
//! constructed.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for a sampling plan
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SamplerConfig {
    /// Number of rows to keep from each end, per target column and stratum
    #[serde(default = "default_n")]
    pub n: usize,

    /// Explicit stratum columns; disables stratum auto-detection when set
    #[serde(default)]
    pub strata: Option<Vec<String>>,

    /// Seed for randomized tie-breaking. Ties are broken by row order when absent.
    #[serde(default)]
    pub seed: Option<u64>,

    /// Stratum auto-detection thresholds
    #[serde(default)]
    pub detection: DetectionConfig,

    /// How selection requests are evaluated
    #[serde(default)]
    pub execution: ExecutionMode,
}

/// Thresholds for the low-cardinality stratum heuristic.
///
/// A categorical column qualifies as a stratum when its distinct count is at
/// most `max_distinct` and at most `max_distinct_ratio * row_count`.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct DetectionConfig {
    /// Absolute cap on distinct values
    #[serde(default = "default_max_distinct")]
    pub max_distinct: usize,

    /// Cap on distinct values relative to the row count, in `(0, 1]`
    #[serde(default = "default_max_distinct_ratio")]
    pub max_distinct_ratio: f64,
}

/// Execution strategy for selection requests
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// One request after another on the calling thread
    #[default]
    Sequential,
    /// Requests fan out over the rayon thread pool
    Parallel,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            n: default_n(),
            strata: None,
            seed: None,
            detection: DetectionConfig::default(),
            execution: ExecutionMode::default(),
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            max_distinct: default_max_distinct(),
            max_distinct_ratio: default_max_distinct_ratio(),
        }
    }
}

fn default_n() -> usize {
    10
}

fn default_max_distinct() -> usize {
    50
}

fn default_max_distinct_ratio() -> f64 {
    0.5
}

impl SamplerConfig {
    /// Create a configuration with the given `n` and defaults elsewhere
    pub fn with_n(n: usize) -> Self {
        Self {
            n,
            ..Self::default()
        }
    }

    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Result<()> {
        if self.n == 0 {
            return Err(Error::invalid_parameter("n must be a positive integer"));
        }

        if let Some(strata) = &self.strata {
            if strata.iter().any(|name| name.trim().is_empty()) {
                return Err(Error::invalid_parameter(
                    "stratum column names cannot be empty",
                ));
            }
        }

        self.detection.validate()
    }

    /// Check if stratum auto-detection is disabled by an explicit override
    pub fn has_strata_override(&self) -> bool {
        self.strata.is_some()
    }
}

impl DetectionConfig {
    /// Validate the detection thresholds
    pub fn validate(&self) -> Result<()> {
        if self.max_distinct == 0 {
            return Err(Error::invalid_parameter(
                "max_distinct must be greater than zero",
            ));
        }

        if !(self.max_distinct_ratio > 0.0 && self.max_distinct_ratio <= 1.0) {
            return Err(Error::invalid_parameter(format!(
                "max_distinct_ratio must be in (0, 1], got {}",
                self.max_distinct_ratio
            )));
        }

        Ok(())
    }

    /// Whether a column with `distinct` values out of `row_count` rows is a stratum candidate
    pub fn is_low_cardinality(&self, distinct: usize, row_count: usize) -> bool {
        distinct > 0
            && distinct <= self.max_distinct
            && (distinct as f64) <= self.max_distinct_ratio * row_count as f64
    }
}
