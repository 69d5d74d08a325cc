// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Error types for the command-line front end

use thiserror::Error;

/// Errors that can occur while running the CLI
#[derive(Error, Debug)]
pub enum CliError {
    /// File system I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow processing error (CSV reading and writing, concatenation)
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet file processing error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// Sampling engine error
    #[error(transparent)]
    Sampling(#[from] entiny::Error),

    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Json(#[from] serde_json::Error),

    /// Input or output path has an extension we cannot handle
    #[error("{0}")]
    UnsupportedFormat(String),

    /// Input file does not exist
    #[error("Input file not found: {0}")]
    MissingInput(String),
}
