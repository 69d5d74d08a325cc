// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Reading and writing tables as CSV or Parquet
//!
//! Every input is loaded into a single `RecordBatch`, which is what the
//! sampling engine consumes.

use std::fs::File;
use std::io::{BufReader, Seek};
use std::path::Path;
use std::sync::Arc;

use arrow::compute::concat_batches;
use arrow::csv::reader::Format;
use arrow::csv::{ReaderBuilder, WriterBuilder};
use arrow::datatypes::SchemaRef;
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use entiny::SamplerConfig;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::ArrowWriter;

use crate::error::CliError;

/// Tabular file formats understood by the CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl FileFormat {
    /// Detect the format from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "csv" => Some(Self::Csv),
            "parquet" => Some(Self::Parquet),
            _ => None,
        }
    }
}

/// Load a whole file into one batch
pub fn read_table(path: &Path, format: FileFormat) -> Result<RecordBatch, CliError> {
    log::debug!("Reading {:?} from {}", format, path.display());
    let (schema, batches) = match format {
        FileFormat::Csv => read_csv(path)?,
        FileFormat::Parquet => read_parquet(path)?,
    };
    let batch = concat_batches(&schema, &batches)?;
    log::debug!(
        "Read {} rows in {} batches, {} columns",
        batch.num_rows(),
        batches.len(),
        batch.num_columns()
    );
    Ok(batch)
}

fn read_csv(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>), CliError> {
    let mut file = File::open(path)?;
    let (schema, records) = Format::default()
        .with_header(true)
        .infer_schema(BufReader::new(&mut file), None)?;
    log::debug!("Inferred CSV schema from {records} records");
    file.rewind()?;

    let schema = Arc::new(schema);
    let reader = ReaderBuilder::new(schema.clone())
        .with_header(true)
        .build(BufReader::new(file))?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    Ok((schema, batches))
}

fn read_parquet(path: &Path) -> Result<(SchemaRef, Vec<RecordBatch>), CliError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?;
    let schema = builder.schema().clone();
    let reader = builder.build()?;
    let batches = reader.collect::<Result<Vec<_>, ArrowError>>()?;
    Ok((schema, batches))
}

/// Write `batch` to `path`, replacing any existing file
pub fn write_table(path: &Path, format: FileFormat, batch: &RecordBatch) -> Result<(), CliError> {
    log::debug!(
        "Writing {} rows as {:?} to {}",
        batch.num_rows(),
        format,
        path.display()
    );
    let file = File::create(path)?;
    match format {
        FileFormat::Csv => {
            let mut writer = WriterBuilder::new().with_header(true).build(file);
            writer.write(batch)?;
        }
        FileFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
            writer.write(batch)?;
            let _ = writer.close()?;
        }
    }
    Ok(())
}

/// Load a JSON sampler configuration
pub fn read_config(path: &Path) -> Result<SamplerConfig, CliError> {
    let file = File::open(path)?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
