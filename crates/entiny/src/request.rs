// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Selection request descriptors.
//!
//! The fan-out over target columns and strata is materialized as a flat list
//! before anything is evaluated, so the executor can run the requests in any
//! order or in parallel.

use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::extremes::{select_extremes, TieBreak};
use crate::schema::RowId;
use crate::strata::Stratum;

/// One unit of extreme-value work: a target column within a stratum
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRequest {
    /// Index of the target column in the batch
    pub column: usize,
    /// Index of the stratum in the partition
    pub stratum: usize,
    /// Rows to keep from each end
    pub n: usize,
}

impl SelectionRequest {
    /// Run this request against `batch`
    pub fn execute(
        &self,
        batch: &RecordBatch,
        strata: &[Stratum],
        tie_break: &TieBreak,
    ) -> Result<Vec<RowId>> {
        select_extremes(
            batch.column(self.column).as_ref(),
            &strata[self.stratum].rows,
            self.n,
            tie_break,
        )
    }
}

/// Expand every (target column, stratum) pair into a request, column-major.
pub fn fan_out(targets: &[usize], stratum_count: usize, n: usize) -> Vec<SelectionRequest> {
    targets
        .iter()
        .flat_map(|&column| {
            (0..stratum_count).map(move |stratum| SelectionRequest { column, stratum, n })
        })
        .collect()
}
