// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Union of selected rows and materialization of the output batch.

use arrow::array::BooleanArray;
use arrow::compute::filter_record_batch;
use arrow::record_batch::RecordBatch;

use crate::error::Result;
use crate::schema::RowId;

/// A grow-only set of row ids over a batch of fixed length.
///
/// Membership is a boolean mask, so iteration and materialization always
/// follow ascending row order regardless of insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowIdSet {
    mask: Vec<bool>,
    count: usize,
}

impl RowIdSet {
    /// Create an empty set over `num_rows` rows
    pub fn new(num_rows: usize) -> Self {
        Self {
            mask: vec![false; num_rows],
            count: 0,
        }
    }

    /// Insert one row; returns true if it was not already present
    pub fn insert(&mut self, row: RowId) -> bool {
        let slot = &mut self.mask[row as usize];
        if *slot {
            return false;
        }
        *slot = true;
        self.count += 1;
        true
    }

    /// Union `rows` into the set
    pub fn extend<I: IntoIterator<Item = RowId>>(&mut self, rows: I) {
        for row in rows {
            let _ = self.insert(row);
        }
    }

    /// Is `row` selected?
    pub fn contains(&self, row: RowId) -> bool {
        self.mask.get(row as usize).copied().unwrap_or(false)
    }

    /// Number of selected rows
    pub fn len(&self) -> usize {
        self.count
    }

    /// Is the set empty?
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Selected rows in ascending order
    pub fn iter(&self) -> impl Iterator<Item = RowId> + '_ {
        self.mask
            .iter()
            .enumerate()
            .filter(|(_, selected)| **selected)
            .map(|(row, _)| row as RowId)
    }

    /// Build the output batch: the selected rows of `batch`, every column kept.
    pub fn materialize(&self, batch: &RecordBatch) -> Result<RecordBatch> {
        debug_assert_eq!(self.mask.len(), batch.num_rows());
        let predicate = BooleanArray::from(self.mask.clone());
        Ok(filter_record_batch(batch, &predicate)?)
    }
}
