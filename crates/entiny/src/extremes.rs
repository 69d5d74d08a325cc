// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Extreme-value selection for one column within one stratum.
//!
//! Values are ordered with Arrow's total order for the column type. Ties are
//! broken by a per-row key supplied by [`TieBreak`], which makes the order
//! strict: the `n` lowest and `n` highest rows are always uniquely defined.

use std::cmp::Ordering;
use std::sync::Arc;

use arrow::array::{make_comparator, Array};
use arrow::compute::SortOptions;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::Result;
use crate::schema::{is_valid, RowId};

/// Tie-breaking order for rows holding equal values
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Earlier rows win
    #[default]
    RowOrder,
    /// Rows are ranked by a seeded random permutation; lower rank wins
    Seeded(Arc<[RowId]>),
}

impl TieBreak {
    /// Build a seeded tie-break ranking over `num_rows` rows.
    ///
    /// The same seed and row count always produce the same ranking.
    pub fn seeded(seed: u64, num_rows: usize) -> Self {
        let mut ranks: Vec<RowId> = (0..num_rows as RowId).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        ranks.shuffle(&mut rng);
        Self::Seeded(ranks.into())
    }

    fn key(&self, row: RowId) -> RowId {
        match self {
            Self::RowOrder => row,
            Self::Seeded(ranks) => ranks[row as usize],
        }
    }
}

/// Select the rows holding the `n` lowest and `n` highest values of `column`
/// among `rows`.
///
/// Rows whose value is null (or NaN) are skipped entirely. When fewer than
/// `n` usable rows exist, all of them are returned. The result is sorted
/// ascending with no duplicates, so a row that is both among the lowest and
/// the highest appears once.
pub fn select_extremes(
    column: &dyn Array,
    rows: &[RowId],
    n: usize,
    tie_break: &TieBreak,
) -> Result<Vec<RowId>> {
    if n == 0 {
        return Ok(Vec::new());
    }
    let mut valid: Vec<RowId> = rows
        .iter()
        .copied()
        .filter(|&row| is_valid(column, row as usize))
        .collect();

    if valid.len() <= n {
        valid.sort_unstable();
        return Ok(valid);
    }

    let compare = make_comparator(column, column, SortOptions::default())?;
    let ascending = |a: &RowId, b: &RowId| {
        compare(*a as usize, *b as usize).then_with(|| tie_break.key(*a).cmp(&tie_break.key(*b)))
    };
    let descending = |a: &RowId, b: &RowId| {
        compare(*b as usize, *a as usize).then_with(|| tie_break.key(*a).cmp(&tie_break.key(*b)))
    };

    let mut selected = first_n(&valid, n, ascending);
    selected.extend(first_n(&valid, n, descending));
    selected.sort_unstable();
    selected.dedup();
    Ok(selected)
}

/// The first `n` rows under `order`, in no particular order. Requires `0 < n < rows.len()`.
fn first_n<F>(rows: &[RowId], n: usize, order: F) -> Vec<RowId>
where
    F: Fn(&RowId, &RowId) -> Ordering,
{
    let mut scratch = rows.to_vec();
    let _ = scratch.select_nth_unstable_by(n - 1, order);
    scratch.truncate(n);
    scratch
}
