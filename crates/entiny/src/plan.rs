// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! Deferred sampling plan.
//!
//! Building a [`SamplingPlan`] only validates and records parameters. All
//! work happens in [`SamplingPlan::collect`]:
//!
//! 1. Detect stratum and target columns
//! 2. Partition rows into strata
//! 3. Expand one selection request per (target column, stratum)
//! 4. Run the requests, sequentially or on the rayon pool
//! 5. Union the selected rows and materialize them in input order
//!
//! Each call recomputes from scratch, so a plan can be collected any number of
//! times and always yields the same batch.

use std::fmt;
use std::sync::Arc;

use arrow::record_batch::RecordBatch;
use log::{debug, info, log_enabled, warn, Level};
use rayon::prelude::*;

use crate::aggregate::RowIdSet;
use crate::config::{ExecutionMode, SamplerConfig};
use crate::error::{Error, Result};
use crate::extremes::TieBreak;
use crate::progress::{NoProgress, ProgressObserver, ProgressTracker};
use crate::request::{fan_out, SelectionRequest};
use crate::schema::RowId;
use crate::strata::{partition, ColumnRoles, Stratum};

/// A recorded, not yet evaluated, extreme-value sampling operation
#[derive(Clone)]
pub struct SamplingPlan {
    /// Input table; never modified
    batch: RecordBatch,
    /// Validated configuration
    config: SamplerConfig,
    /// Advisory progress sink
    progress: Arc<dyn ProgressObserver>,
}

/// What a plan would do, without running any selection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanSummary {
    /// Input row count
    pub num_rows: usize,
    /// Stratum column names
    pub strata: Vec<String>,
    /// Target column names
    pub targets: Vec<String>,
    /// Number of distinct stratum keys
    pub stratum_count: usize,
    /// Number of selection requests (targets x strata)
    pub request_count: usize,
}

/// Detection and partitioning results shared by `collect` and `explain`
struct Prepared {
    roles: ColumnRoles,
    strata: Vec<Stratum>,
}

impl SamplingPlan {
    /// Record a plan over `batch`.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidParameter` if the configuration is invalid, and
    /// `Error::Schema` if an explicit stratum column does not exist.
    pub fn try_new(batch: RecordBatch, config: SamplerConfig) -> Result<Self> {
        config.validate()?;
        if let Some(strata) = &config.strata {
            check_columns_exist(&batch, strata)?;
        }

        Ok(Self {
            batch,
            config,
            progress: Arc::new(NoProgress),
        })
    }

    /// Use `strata` as the stratum columns instead of detecting them.
    ///
    /// # Errors
    ///
    /// Returns `Error::Schema` if any named column does not exist.
    pub fn with_strata<I, S>(mut self, strata: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let strata: Vec<String> = strata.into_iter().map(Into::into).collect();
        check_columns_exist(&self.batch, &strata)?;
        self.config.strata = Some(strata);
        self.config.validate()?;
        Ok(self)
    }

    /// Break ties with a seeded random ranking
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.seed = Some(seed);
        self
    }

    /// Choose how selection requests are evaluated
    pub fn with_execution(mut self, execution: ExecutionMode) -> Self {
        self.config.execution = execution;
        self
    }

    /// Report progress to `observer` during `collect`
    pub fn with_progress(mut self, observer: Arc<dyn ProgressObserver>) -> Self {
        self.progress = observer;
        self
    }

    /// The plan's configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// The input batch
    pub fn input(&self) -> &RecordBatch {
        &self.batch
    }

    /// Run detection and partitioning only and describe the planned work.
    pub fn explain(&self) -> Result<PlanSummary> {
        let prepared = self.prepare()?;
        Ok(PlanSummary {
            num_rows: self.batch.num_rows(),
            strata: prepared.roles.strata_names(&self.batch),
            targets: prepared.roles.target_names(&self.batch),
            stratum_count: prepared.strata.len(),
            request_count: prepared.roles.targets.len() * prepared.strata.len(),
        })
    }

    /// Evaluate the plan and return the selected rows with every input column.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptyInput` for a batch without rows, `Error::Schema`
    /// when no numeric target column exists, and `Error::Arrow` if a compute
    /// kernel fails. No partial result is ever returned.
    pub fn collect(&self) -> Result<RecordBatch> {
        info!(
            "Collecting sampling plan: {} rows, {} columns, n={}",
            self.batch.num_rows(),
            self.batch.num_columns(),
            self.config.n
        );

        let Prepared { roles, strata } = self.prepare()?;
        let requests = fan_out(&roles.targets, strata.len(), self.config.n);
        let tie_break = match self.config.seed {
            Some(seed) => TieBreak::seeded(seed, self.batch.num_rows()),
            None => TieBreak::RowOrder,
        };

        info!(
            "Running {} selection requests ({} targets x {} strata, {:?})",
            requests.len(),
            roles.targets.len(),
            strata.len(),
            self.config.execution
        );

        let tracker = ProgressTracker::start(self.progress.clone(), requests.len());
        let run = |request: &SelectionRequest| -> Result<Vec<RowId>> {
            let rows = request.execute(&self.batch, &strata, &tie_break)?;
            tracker.complete_one();
            Ok(rows)
        };
        let results: Vec<Vec<RowId>> = match self.config.execution {
            ExecutionMode::Sequential => requests.iter().map(run).collect::<Result<_>>()?,
            ExecutionMode::Parallel => requests.par_iter().map(run).collect::<Result<_>>()?,
        };
        drop(tracker);

        let mut selected = RowIdSet::new(self.batch.num_rows());
        let requested: usize = results.iter().map(Vec::len).sum();
        for rows in results {
            selected.extend(rows);
        }

        let output = selected.materialize(&self.batch)?;
        info!(
            "Selected {} of {} rows ({} before deduplication)",
            output.num_rows(),
            self.batch.num_rows(),
            requested
        );
        Ok(output)
    }

    fn prepare(&self) -> Result<Prepared> {
        let num_rows = self.batch.num_rows();
        if num_rows == 0 {
            return Err(Error::EmptyInput);
        }
        if num_rows > RowId::MAX as usize {
            return Err(Error::invalid_parameter(format!(
                "input has {num_rows} rows; at most {} are supported",
                RowId::MAX
            )));
        }

        let roles = ColumnRoles::detect(
            &self.batch,
            &self.config.detection,
            self.config.strata.as_deref(),
        )?;
        debug!(
            "Stratum columns: {:?}, target columns: {:?}",
            roles.strata_names(&self.batch),
            roles.target_names(&self.batch)
        );

        for &target in &roles.targets {
            let column = self.batch.column(target);
            if column.null_count() == column.len() {
                warn!(
                    "Target column '{}' has no non-null values; it selects nothing",
                    self.batch.schema().field(target).name()
                );
            }
        }

        let strata = partition(&self.batch, &roles.strata)?;
        if log_enabled!(Level::Debug) {
            for (idx, stratum) in strata.iter().enumerate() {
                debug!(
                    "Stratum {} [{}]: {} rows",
                    idx,
                    stratum.describe(&self.batch, &roles.strata),
                    stratum.len()
                );
            }
        }

        Ok(Prepared { roles, strata })
    }
}

impl fmt::Debug for SamplingPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SamplingPlan")
            .field("num_rows", &self.batch.num_rows())
            .field("num_columns", &self.batch.num_columns())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, strata {:?}, targets {:?}: {} strata x {} targets = {} requests",
            self.num_rows,
            self.strata,
            self.targets,
            self.stratum_count,
            self.targets.len(),
            self.request_count
        )
    }
}

fn check_columns_exist(batch: &RecordBatch, names: &[String]) -> Result<()> {
    let schema = batch.schema();
    for name in names {
        if schema.index_of(name).is_err() {
            return Err(Error::schema(format!(
                "stratum column '{name}' does not exist"
            )));
        }
    }
    Ok(())
}
