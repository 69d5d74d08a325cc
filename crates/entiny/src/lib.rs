// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Stratified extreme-value subsampling for Arrow record batches.
//!
//! For every numeric column, and within every combination of low-cardinality
//! categorical columns ("strata"), the sampler keeps the rows holding the `n`
//! lowest and `n` highest values. Rows picked by several columns or strata are
//! kept once, in their original order, with every input column intact.
//!
//! ```no_run
//! # fn run(batch: arrow::record_batch::RecordBatch) -> entiny::Result<()> {
//! let plan = entiny::entiny(batch, 10)?;
//! let _sample = plan.collect()?;
//! # Ok(())
//! # }
//! ```
//!
//! Plans are lazy: construction only validates parameters, and
//! [`SamplingPlan::collect`] does all of the work.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod extremes;
pub mod plan;
pub mod progress;
pub mod request;
pub mod schema;
pub mod strata;

use arrow::record_batch::RecordBatch;

pub use config::{DetectionConfig, ExecutionMode, SamplerConfig};
pub use error::{Error, Result};
pub use plan::{PlanSummary, SamplingPlan};
pub use progress::{NoProgress, ProgressObserver};

/// Plan an extreme-value sample of `batch` keeping `n` rows from each end.
///
/// Strata are auto-detected and ties break by row order. Use
/// [`SamplingPlan::try_new`] for full control.
pub fn entiny(batch: RecordBatch, n: usize) -> Result<SamplingPlan> {
    SamplingPlan::try_new(batch, SamplerConfig::with_n(n))
}
