// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Stratum detection and row partitioning
//!
//! Detection splits the columns of a batch into grouping keys (strata) and
//! numeric targets. The rule itself lives in [`detect_roles`], a pure function
//! over per-column profiles, so it can be exercised without building batches.
//!
//! Partitioning groups rows by the Arrow row-format encoding of their stratum
//! values. Row encodings compare equal exactly when the underlying values do,
//! nulls included, so any key type Arrow can encode is supported.

use std::collections::{HashMap, HashSet};

use arrow::array::ArrayRef;
use arrow::record_batch::RecordBatch;
use arrow::row::{RowConverter, SortField};
use arrow::util::display::array_value_to_string;
use log::debug;

use crate::config::DetectionConfig;
use crate::error::{Error, Result};
use crate::schema::{ColumnKind, RowId};

/// Schema and cardinality facts about one column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnProfile {
    /// Column name
    pub name: String,
    /// Column classification
    pub kind: ColumnKind,
    /// Number of distinct values (nulls count as one), when computed
    pub distinct: Option<usize>,
}

/// The role assigned to each column of a batch, as column indices
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnRoles {
    /// Grouping columns, in override order or schema order
    pub strata: Vec<usize>,
    /// Numeric columns subject to extreme-value selection, in schema order
    pub targets: Vec<usize>,
}

impl ColumnProfile {
    /// Profile every column of `batch`.
    ///
    /// Distinct counts are only computed for categorical columns, and only
    /// when `with_cardinality` is set.
    pub fn profile_batch(batch: &RecordBatch, with_cardinality: bool) -> Result<Vec<Self>> {
        let schema = batch.schema();
        schema
            .fields()
            .iter()
            .zip(batch.columns())
            .map(|(field, column)| {
                let kind = ColumnKind::of(field.data_type());
                let distinct = if with_cardinality && kind == ColumnKind::Categorical {
                    Some(distinct_count(column)?)
                } else {
                    None
                };
                Ok(Self {
                    name: field.name().clone(),
                    kind,
                    distinct,
                })
            })
            .collect()
    }
}

impl ColumnRoles {
    /// Detect column roles for `batch`.
    ///
    /// With `strata_override` set, the named columns are the strata and no
    /// cardinality statistics are gathered.
    pub fn detect(
        batch: &RecordBatch,
        detection: &DetectionConfig,
        strata_override: Option<&[String]>,
    ) -> Result<Self> {
        let profiles = ColumnProfile::profile_batch(batch, strata_override.is_none())?;
        detect_roles(&profiles, batch.num_rows(), detection, strata_override)
    }

    /// Names of the stratum columns
    pub fn strata_names(&self, batch: &RecordBatch) -> Vec<String> {
        column_names(batch, &self.strata)
    }

    /// Names of the target columns
    pub fn target_names(&self, batch: &RecordBatch) -> Vec<String> {
        column_names(batch, &self.targets)
    }
}

/// Assign stratum and target roles from column profiles.
///
/// A categorical column is a stratum when its distinct count passes
/// [`DetectionConfig::is_low_cardinality`]. Every numeric column that is not a
/// stratum is a target. An explicit override replaces detection of strata.
pub fn detect_roles(
    profiles: &[ColumnProfile],
    row_count: usize,
    detection: &DetectionConfig,
    strata_override: Option<&[String]>,
) -> Result<ColumnRoles> {
    let strata = match strata_override {
        Some(names) => resolve_columns(profiles, names)?,
        None => profiles
            .iter()
            .enumerate()
            .filter(|(_, profile)| profile.kind == ColumnKind::Categorical)
            .filter(|(_, profile)| {
                profile
                    .distinct
                    .is_some_and(|distinct| detection.is_low_cardinality(distinct, row_count))
            })
            .map(|(idx, _)| idx)
            .collect(),
    };

    let targets: Vec<usize> = profiles
        .iter()
        .enumerate()
        .filter(|(idx, profile)| profile.kind == ColumnKind::Numeric && !strata.contains(idx))
        .map(|(idx, _)| idx)
        .collect();

    if targets.is_empty() {
        return Err(Error::schema(
            "no numeric target columns remain after excluding stratum columns",
        ));
    }

    debug!(
        "Detected {} stratum column(s) and {} target column(s)",
        strata.len(),
        targets.len()
    );

    Ok(ColumnRoles { strata, targets })
}

/// Map column names to indices, rejecting unknown names and dropping repeats.
fn resolve_columns(profiles: &[ColumnProfile], names: &[String]) -> Result<Vec<usize>> {
    let mut resolved = Vec::with_capacity(names.len());
    for name in names {
        let idx = profiles
            .iter()
            .position(|profile| &profile.name == name)
            .ok_or_else(|| Error::schema(format!("stratum column '{name}' does not exist")))?;
        if !resolved.contains(&idx) {
            resolved.push(idx);
        }
    }
    Ok(resolved)
}

fn column_names(batch: &RecordBatch, indices: &[usize]) -> Vec<String> {
    let schema = batch.schema();
    indices
        .iter()
        .map(|&idx| schema.field(idx).name().clone())
        .collect()
}

/// Count distinct values in a column; null is one value.
pub fn distinct_count(column: &ArrayRef) -> Result<usize> {
    let converter = RowConverter::new(vec![SortField::new(column.data_type().clone())])?;
    let rows = converter.convert_columns(&[column.clone()])?;
    let distinct: HashSet<_> = rows.iter().collect();
    Ok(distinct.len())
}

/// A group of rows sharing one stratum key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stratum {
    /// First row carrying this key; the key's values are read from it
    pub representative: RowId,
    /// Member rows in ascending order
    pub rows: Vec<RowId>,
}

impl Stratum {
    /// Number of member rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Is the stratum empty?
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the key as `col=value` pairs, for logging
    pub fn describe(&self, batch: &RecordBatch, strata: &[usize]) -> String {
        if strata.is_empty() {
            return "<all rows>".to_string();
        }
        let schema = batch.schema();
        strata
            .iter()
            .map(|&idx| {
                let value = array_value_to_string(batch.column(idx), self.representative as usize)
                    .unwrap_or_else(|_| "?".to_string());
                format!("{}={}", schema.field(idx).name(), value)
            })
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Partition the rows of `batch` by the values of the `strata` columns.
///
/// Strata are returned in order of first appearance. With no stratum columns
/// the whole batch is one stratum. The caller guarantees that the row count
/// fits in [`RowId`].
pub fn partition(batch: &RecordBatch, strata: &[usize]) -> Result<Vec<Stratum>> {
    let num_rows = batch.num_rows() as RowId;

    if strata.is_empty() {
        return Ok(vec![Stratum {
            representative: 0,
            rows: (0..num_rows).collect(),
        }]);
    }

    let fields = strata
        .iter()
        .map(|&idx| SortField::new(batch.column(idx).data_type().clone()))
        .collect();
    let columns: Vec<ArrayRef> = strata.iter().map(|&idx| batch.column(idx).clone()).collect();
    let converter = RowConverter::new(fields)?;
    let rows = converter.convert_columns(&columns)?;

    let mut index = HashMap::new();
    let mut groups: Vec<Stratum> = Vec::new();
    for (row_id, key) in (0..num_rows).zip(rows.iter()) {
        let slot = *index.entry(key).or_insert_with(|| {
            groups.push(Stratum {
                representative: row_id,
                rows: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].rows.push(row_id);
    }

    debug!(
        "Partitioned {} rows into {} strata",
        batch.num_rows(),
        groups.len()
    );
    Ok(groups)
}
