//! CLI for dxcorr — correlation and p-value diagrams for pairs of time series.

mod io;

use std::path::PathBuf;

use clap::{ArgAction, Parser};
use dxcorr_core::{
    AnalysisConfig, DEFAULT_MAX_ITERATIONS, DEFAULT_SURROGATES, DEFAULT_TOLERANCE, DiagramKind,
    DxcError, Execution, SeedSchedule, SurrogateConfig, Table, WindowGeometry,
};
use serde::Serialize;

use crate::io::{IoError, Separator};

#[derive(Parser, Debug)]
#[command(name = "dxcorr")]
#[command(about = "dxcorr — multi-scale windowed correlation with surrogate significance")]
#[command(version = dxcorr_core::VERSION)]
struct Cli {
    /// Column numbers (1-based) of the two sequences to analyze
    #[arg(short = 'n', long = "columns", num_args = 2, value_names = ["A", "B"], required = true)]
    columns: Vec<usize>,

    /// Number of window widths (rows of the diagram)
    #[arg(short = 'W', long = "widths")]
    widths: usize,

    /// Base window width in samples; an odd value is reduced by 1
    #[arg(short = 'L', long = "base-width")]
    base_width: usize,

    /// Only compute the correlation diagram
    #[arg(short = 'C', long)]
    correlation_only: bool,

    /// Compute the p-value diagram by surrogate generation (default; wins over -C)
    #[arg(short = 'p', long)]
    pvalue: bool,

    /// Number of surrogate pairs to generate
    #[arg(short = 'M', long, default_value_t = DEFAULT_SURROGATES)]
    surrogates: usize,

    /// Average the correlations at delays +tau and -tau
    #[arg(long, default_value_t = 0)]
    tau: usize,

    /// Run surrogate trials on a work-stealing thread pool
    #[arg(long)]
    parallel: bool,

    /// Worker threads for --parallel (default: available parallelism)
    #[arg(long, requires = "parallel")]
    threads: Option<usize>,

    /// Read from this file instead of standard input
    #[arg(short = 'i', long)]
    input: Option<PathBuf>,

    /// Write to this file instead of standard output
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Column separator: t (tab), s (space) or c (comma)
    #[arg(short = 's', long, default_value = "t", value_parser = ["t", "s", "c"])]
    separator: String,

    /// Base seed for surrogate generation (default: system clock)
    #[arg(long)]
    seed: Option<u64>,

    /// Relative spectral error at which surrogate fitting stops
    #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
    tolerance: f64,

    /// Cap on surrogate fitting iterations
    #[arg(long, default_value_t = DEFAULT_MAX_ITERATIONS)]
    max_iterations: usize,

    /// Write a JSON document (configuration + table) instead of a delimited table
    #[arg(long)]
    json: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn kind(&self) -> DiagramKind {
        if self.pvalue || !self.correlation_only {
            DiagramKind::PValue
        } else {
            DiagramKind::Correlation
        }
    }

    fn execution(&self) -> Execution {
        if self.parallel {
            Execution::Parallel {
                threads: self.threads,
            }
        } else {
            Execution::Sequential
        }
    }

    /// 0-based column indices.
    fn column_indices(&self) -> Result<(usize, usize), CliError> {
        match self.columns[..] {
            [a, b] if a > 0 && b > 0 => Ok((a - 1, b - 1)),
            _ => Err(CliError::Usage(
                "column numbers were not correctly set (they start at 1)".to_string(),
            )),
        }
    }

    fn analysis_config(&self) -> Result<AnalysisConfig, CliError> {
        let geometry = WindowGeometry::new(self.base_width, self.widths, self.tau)?;
        Ok(AnalysisConfig {
            geometry,
            surrogates: self.surrogates,
            execution: self.execution(),
            surrogate: SurrogateConfig {
                tolerance: self.tolerance,
                max_iterations: self.max_iterations,
            },
            seeds: self
                .seed
                .map(SeedSchedule::new)
                .unwrap_or_else(SeedSchedule::from_clock),
        })
    }
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Usage(String),
    #[error(transparent)]
    Core(#[from] DxcError),
    #[error(transparent)]
    Io(#[from] IoError),
    #[error("cannot encode JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// JSON form of one run's output.
#[derive(Serialize)]
struct DiagramReport<'a> {
    kind: &'static str,
    columns: [usize; 2],
    labels: Option<[&'a str; 2]>,
    config: &'a AnalysisConfig,
    rows: usize,
    cols: usize,
    diagram: Vec<Vec<f64>>,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let (index_a, index_b) = cli.column_indices()?;
    let config = cli.analysis_config()?;
    let separator = Separator::from_code(&cli.separator);
    let kind = cli.kind();

    let matrix = io::read_input(cli.input.as_deref(), separator)?;
    log::info!(
        "loaded {} sequences of length {}",
        matrix.sequences.len(),
        matrix.sequences.first().map_or(0, Vec::len)
    );

    let table = dxcorr_core::analyze(&matrix.sequences, index_a, index_b, config.clone(), kind)?;

    let contents = if cli.json {
        let labels = matrix
            .labels
            .as_ref()
            .map(|l| [l[index_a].as_str(), l[index_b].as_str()]);
        render_json(&table, kind, [index_a + 1, index_b + 1], labels, &config)?
    } else {
        io::format_table(&table, separator)
    };
    io::write_output(cli.output.as_deref(), &contents)?;
    Ok(())
}

fn render_json(
    table: &Table,
    kind: DiagramKind,
    columns: [usize; 2],
    labels: Option<[&str; 2]>,
    config: &AnalysisConfig,
) -> Result<String, CliError> {
    let report = DiagramReport {
        kind: kind.as_str(),
        columns,
        labels,
        config,
        rows: table.rows(),
        cols: table.cols(),
        diagram: table.to_rows(),
    };
    let mut json = serde_json::to_string_pretty(&report)?;
    json.push('\n');
    Ok(json)
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("ERROR: {e}");
        std::process::exit(1);
    }
}
