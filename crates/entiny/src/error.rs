// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the sampling engine.
//!
//! Parameter and override errors surface when a [`crate::SamplingPlan`] is
//! constructed; everything that depends on the data surfaces from `collect`.

use thiserror::Error;

/// Errors that can occur while building or evaluating a sampling plan
#[derive(Error, Debug)]
pub enum Error {
    /// A parameter is out of range (e.g. `n` is not a positive integer)
    #[error("Invalid parameter: {message}")]
    InvalidParameter {
        /// Error message
        message: String,
    },

    /// The table shape cannot support the requested sampling
    #[error("Schema error: {message}")]
    Schema {
        /// Error message
        message: String,
    },

    /// The input table has zero rows
    #[error("Input table has zero rows")]
    EmptyInput,

    /// Arrow compute errors
    #[error("Arrow compute error: {source}")]
    Arrow {
        #[from]
        /// Arrow error source
        source: arrow::error::ArrowError,
    },
}

/// Result type for sampling operations
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an invalid parameter error
    pub fn invalid_parameter<S: Into<String>>(message: S) -> Self {
        Self::InvalidParameter {
            message: message.into(),
        }
    }

    /// Create a schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::error::ArrowError;

    #[test]
    fn test_error_messages() {
        let err = Error::invalid_parameter("n must be a positive integer");
        assert_eq!(
            err.to_string(),
            "Invalid parameter: n must be a positive integer"
        );

        let err = Error::schema("no numeric target columns");
        assert_eq!(err.to_string(), "Schema error: no numeric target columns");

        assert_eq!(Error::EmptyInput.to_string(), "Input table has zero rows");
    }

    #[test]
    fn test_arrow_conversion() {
        let err: Error = ArrowError::ComputeError("boom".to_string()).into();
        assert!(matches!(err, Error::Arrow { .. }));
        assert!(err.to_string().contains("boom"));
    }
}
