// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Column classification.

use arrow::array::{Array, AsArray};
use arrow::datatypes::{DataType, Float16Type, Float32Type, Float64Type};

/// Row identifier: the ordinal position of a row in the input batch.
pub type RowId = u32;

/// How a column participates in sampling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Ordered numeric values; a selection target
    Numeric,
    /// Text or boolean values; a stratum candidate
    Categorical,
    /// Carried through to the output, otherwise ignored
    Other,
}

impl ColumnKind {
    /// Classify an Arrow data type
    pub fn of(data_type: &DataType) -> Self {
        match data_type {
            dt if dt.is_numeric() => Self::Numeric,
            DataType::Boolean | DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => {
                Self::Categorical
            }
            DataType::Dictionary(_, value) => match Self::of(value) {
                Self::Categorical => Self::Categorical,
                _ => Self::Other,
            },
            _ => Self::Other,
        }
    }
}

/// Returns true when `row` holds a usable value: not null, and not NaN for float columns.
pub(crate) fn is_valid(array: &dyn Array, row: usize) -> bool {
    if array.is_null(row) {
        return false;
    }
    match array.data_type() {
        DataType::Float16 => !array.as_primitive::<Float16Type>().value(row).is_nan(),
        DataType::Float32 => !array.as_primitive::<Float32Type>().value(row).is_nan(),
        DataType::Float64 => !array.as_primitive::<Float64Type>().value(row).is_nan(),
        _ => true,
    }
}
