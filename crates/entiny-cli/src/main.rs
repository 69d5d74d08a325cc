// Copyright The OpenTelemetry Authors
// SPDX-License-Identifier: Apache-2.0

//! `entiny` command-line tool: subsample a CSV or Parquet table down to its
//! extreme rows.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{ArgAction, Parser};
use entiny::{ExecutionMode, SamplerConfig, SamplingPlan};

mod error;
mod io;
mod progress;

use error::CliError;
use io::FileFormat;
use progress::TerminalProgress;

#[derive(Parser, Debug)]
#[command(name = "entiny")]
#[command(version)]
#[command(about = "Subsample a table down to the extreme values of its numeric columns")]
#[command(after_help = "Features:
  - Keeps the n lowest and n highest rows of every numeric column
  - Detects low-cardinality categorical columns and samples within each stratum
  - Keeps every column of the selected rows, in their original order
  - Reads and writes CSV and Parquet

Input Data Requirements:
  - At least one numeric column that is not used as a stratum
  - Categorical columns with few distinct values are used as strata
  - Missing and NaN values are never selected

Examples:
  # Keep 10 rows from each end of every numeric column
  entiny -i data.csv -o sampled.csv -n 10

  # Parquet in and out, with reproducible tie-breaking
  entiny -i data.parquet -o sampled.parquet -n 20 --seed 42

  # Explicit strata, quiet output for scripts
  entiny -i data.csv -o sampled.csv --strata region,product --no-progress")]
struct Args {
    /// Input file (.csv or .parquet)
    #[arg(short, long, value_name = "FILE")]
    input: PathBuf,

    /// Output file (.csv or .parquet)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Rows to keep from each end, per numeric column and stratum [default: 10]
    #[arg(short = 'n', long = "n", value_name = "N", allow_negative_numbers = true)]
    n: Option<i64>,

    /// Seed for random tie-breaking between equal values
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,

    /// Stratum columns, disabling auto-detection
    #[arg(long, value_name = "COL", value_delimiter = ',')]
    strata: Option<Vec<String>>,

    /// JSON sampler configuration; command-line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Evaluate selection requests in parallel
    #[arg(long)]
    parallel: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Args {
    /// Merge the configuration file, if any, with command-line flags
    fn sampler_config(&self) -> Result<SamplerConfig, CliError> {
        let mut config = match &self.config {
            Some(path) => io::read_config(path)?,
            None => SamplerConfig::default(),
        };

        if let Some(n) = self.n {
            config.n = usize::try_from(n)
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    entiny::Error::invalid_parameter(format!(
                        "n must be a positive integer, got {n}"
                    ))
                })?;
        }
        if let Some(strata) = &self.strata {
            config.strata = Some(strata.clone());
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if self.parallel {
            config.execution = ExecutionMode::Parallel;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();
}

fn file_format(path: &Path, role: &str) -> Result<FileFormat, CliError> {
    FileFormat::from_path(path).ok_or_else(|| {
        CliError::UnsupportedFormat(format!(
            "{role} file must be CSV or Parquet format: {}",
            path.display()
        ))
    })
}

/// Read, sample and write; returns the input and output row counts
fn run(args: &Args) -> Result<(usize, usize), CliError> {
    if !args.input.exists() {
        return Err(CliError::MissingInput(args.input.display().to_string()));
    }
    let input_format = file_format(&args.input, "Input")?;
    let output_format = file_format(&args.output, "Output")?;

    let config = args.sampler_config()?;
    let batch = io::read_table(&args.input, input_format)?;
    let input_rows = batch.num_rows();

    let mut plan = SamplingPlan::try_new(batch, config)?;
    if !args.no_progress {
        plan = plan.with_progress(Arc::new(TerminalProgress::new()));
    }
    if log::log_enabled!(log::Level::Info) {
        log::info!("{}", plan.explain()?);
    }

    let sample = plan.collect()?;
    io::write_table(&args.output, output_format, &sample)?;
    Ok((input_rows, sample.num_rows()))
}

/// The line to print for a finished run, and the process exit code
fn report(result: Result<(usize, usize), CliError>) -> (String, ExitCode) {
    match result {
        Ok((input_rows, output_rows)) => (
            format!("Successfully subsampled data: {input_rows} rows -> {output_rows} rows"),
            ExitCode::SUCCESS,
        ),
        Err(e) => (format!("Error: {e}"), ExitCode::FAILURE),
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    let (message, code) = report(run(&args));
    if code == ExitCode::SUCCESS {
        println!("{message}");
    } else {
        eprintln!("{message}");
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
    use arrow::record_batch::RecordBatch;
    use clap::CommandFactory;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn generated_batch(rows: usize) -> RecordBatch {
        let mut rng = StdRng::seed_from_u64(11);
        let categories = ["north", "south", "east"];
        let category: Vec<&str> = (0..rows).map(|i| categories[i % 3]).collect();
        let value: Vec<f64> = (0..rows).map(|_| rng.random_range(-50.0..50.0)).collect();
        let count: Vec<i64> = (0..rows).map(|_| rng.random_range(0..20)).collect();
        RecordBatch::try_from_iter(vec![
            ("category", Arc::new(StringArray::from(category)) as ArrayRef),
            ("value", Arc::new(Float64Array::from(value)) as ArrayRef),
            ("count", Arc::new(Int64Array::from(count)) as ArrayRef),
        ])
        .unwrap()
    }

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("entiny").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_help_sections() {
        let help = Args::command().render_long_help().to_string();
        assert!(help.contains("Features:"));
        assert!(help.contains("Input Data Requirements:"));
        assert!(help.contains("Examples:"));
        assert!(help.contains("entiny -i data.csv -o sampled.csv -n 10"));
        assert!(help.contains("entiny -i data.parquet -o sampled.parquet -n 20 --seed 42"));
        assert!(help.contains("--no-progress"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(
            &config_path,
            r#"{ "n": 4, "seed": 1, "execution": "sequential" }"#,
        )
        .unwrap();
        let config_arg = config_path.to_str().unwrap();

        let args = parse(&[
            "-i", "in.csv", "-o", "out.csv", "--config", config_arg, "--seed", "9",
            "--parallel", "--strata", "a,b",
        ]);
        let config = args.sampler_config().unwrap();
        assert_eq!(config.n, 4);
        assert_eq!(config.seed, Some(9));
        assert_eq!(config.execution, ExecutionMode::Parallel);
        assert_eq!(config.strata, Some(vec!["a".to_string(), "b".to_string()]));

        let args = parse(&["-i", "in.csv", "-o", "out.csv"]);
        assert_eq!(args.sampler_config().unwrap(), SamplerConfig::default());
    }

    #[test]
    fn test_csv_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        let output = dir.path().join("sampled.csv");
        io::write_table(&input, FileFormat::Csv, &generated_batch(300)).unwrap();

        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-n",
            "5",
            "--no-progress",
        ]);
        let (input_rows, output_rows) = run(&args).unwrap();
        assert_eq!(input_rows, 300);
        assert!(output_rows > 0);
        // 3 strata x 2 targets x 2 ends x 5 rows at most
        assert!(output_rows <= 60);

        let sample = io::read_table(&output, FileFormat::Csv).unwrap();
        assert_eq!(sample.num_rows(), output_rows);
        assert_eq!(sample.num_columns(), 3);
    }

    #[test]
    fn test_parquet_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.parquet");
        let output = dir.path().join("sampled.PARQUET");
        let batch = generated_batch(300);
        io::write_table(&input, FileFormat::Parquet, &batch).unwrap();

        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--parallel",
            "--no-progress",
        ]);
        let (input_rows, output_rows) = run(&args).unwrap();
        assert_eq!(input_rows, 300);
        // 3 strata x 2 targets x 2 ends x 10 rows at most
        assert!(output_rows > 0 && output_rows <= 120);

        let sample = io::read_table(&output, FileFormat::Parquet).unwrap();
        let names = |b: &RecordBatch| -> Vec<String> {
            b.schema().fields().iter().map(|f| f.name().clone()).collect()
        };
        assert_eq!(names(&sample), names(&batch));
        assert_eq!(sample.num_rows(), output_rows);
    }

    #[test]
    fn test_seed_is_reproducible() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        io::write_table(&input, FileFormat::Csv, &generated_batch(200)).unwrap();

        let mut outputs = Vec::new();
        for name in ["first.csv", "second.csv"] {
            let output = dir.path().join(name);
            let args = parse(&[
                "-i",
                input.to_str().unwrap(),
                "-o",
                output.to_str().unwrap(),
                "-n",
                "3",
                "--seed",
                "42",
                "--no-progress",
            ]);
            run(&args).unwrap();
            outputs.push(std::fs::read(&output).unwrap());
        }
        assert_eq!(outputs[0], outputs[1]);
    }

    #[test]
    fn test_invalid_output_format() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        io::write_table(&input, FileFormat::Csv, &generated_batch(30)).unwrap();

        let args = parse(&["-i", input.to_str().unwrap(), "-o", "sampled.txt"]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::UnsupportedFormat(_)));
        assert!(err
            .to_string()
            .contains("Output file must be CSV or Parquet format"));
    }

    #[test]
    fn test_invalid_n() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        io::write_table(&input, FileFormat::Csv, &generated_batch(30)).unwrap();

        for n in ["-1", "0"] {
            let args = parse(&[
                "-i",
                input.to_str().unwrap(),
                "-o",
                "sampled.csv",
                "-n",
                n,
            ]);
            let err = run(&args).unwrap_err();
            assert!(err.to_string().contains("n must be a positive integer"));
        }

        let parsed = Args::try_parse_from(["entiny", "-i", "a.csv", "-o", "b.csv", "-n", "ten"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("absent.csv");
        let output = dir.path().join("sampled.csv");

        let args = parse(&["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
        let err = run(&args).unwrap_err();
        assert!(matches!(err, CliError::MissingInput(_)));
        assert!(err.to_string().starts_with("Input file not found"));
        assert!(!output.exists());

        // a missing file is reported before its extension is checked
        let input = dir.path().join("absent.txt");
        let args = parse(&["-i", input.to_str().unwrap(), "-o", output.to_str().unwrap()]);
        assert!(matches!(run(&args), Err(CliError::MissingInput(_))));
    }

    #[test]
    fn test_report_messages_and_exit_codes() {
        let (message, code) = report(Ok((1000, 42)));
        assert_eq!(message, "Successfully subsampled data: 1000 rows -> 42 rows");
        assert_eq!(code, ExitCode::SUCCESS);

        let (message, code) = report(Err(CliError::MissingInput("data.csv".to_string())));
        assert_eq!(message, "Error: Input file not found: data.csv");
        assert_eq!(code, ExitCode::FAILURE);
    }

    #[test]
    fn test_report_after_end_to_end_run() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("data.csv");
        let output = dir.path().join("sampled.csv");
        io::write_table(&input, FileFormat::Csv, &generated_batch(90)).unwrap();

        let args = parse(&[
            "-i",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "-n",
            "2",
            "--no-progress",
        ]);
        let (message, code) = report(run(&args));
        assert!(message.starts_with("Successfully subsampled data: 90 rows -> "));
        assert_eq!(code, ExitCode::SUCCESS);

        let args = parse(&["-i", input.to_str().unwrap(), "-o", "sampled.json", "--no-progress"]);
        let (message, code) = report(run(&args));
        assert!(message.starts_with("Error: Output file must be CSV or Parquet format"));
        assert_eq!(code, ExitCode::FAILURE);
    }
}
