//! CLI entry point for the tabular preprocessing pipeline.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use dotenv::dotenv;
use std::path::PathBuf;
use tabprep::exploratory::DEFAULT_EXPLORATORY_OUTPUT;
use tabprep::{
    CategoricalImputation, CleaningPolicy, FeatureHeader, FitStrategy, NumericImputation,
    Pipeline, PipelineConfig, PipelineConfigBuilder, PipelineResult, run_exploratory,
};
use tracing::{error, info};

/// CLI-compatible cleaning policy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCleaningPolicy {
    /// Drop exact duplicate rows, keeping the first
    DropDuplicates,
    /// Drop rows with a missing value in any column
    DropMissing,
    /// Drop rows with missing values, then duplicates
    DropMissingAndDuplicates,
    /// Keep every row
    None,
}

impl From<CliCleaningPolicy> for CleaningPolicy {
    fn from(cli: CliCleaningPolicy) -> Self {
        match cli {
            CliCleaningPolicy::DropDuplicates => CleaningPolicy::DropDuplicates,
            CliCleaningPolicy::DropMissing => CleaningPolicy::DropMissing,
            CliCleaningPolicy::DropMissingAndDuplicates => CleaningPolicy::DropMissingAndDuplicates,
            CliCleaningPolicy::None => CleaningPolicy::None,
        }
    }
}

/// CLI-compatible fit strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliFitStrategy {
    /// Fit on all rows, then split (test rows influence the fit)
    FullDataset,
    /// Split first, fit on training rows only
    TrainOnly,
}

impl From<CliFitStrategy> for FitStrategy {
    fn from(cli: CliFitStrategy) -> Self {
        match cli {
            CliFitStrategy::FullDataset => FitStrategy::FullDataset,
            CliFitStrategy::TrainOnly => FitStrategy::TrainOnly,
        }
    }
}

/// CLI-compatible numeric imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliNumericImputation {
    /// Use the mean of non-null values
    Mean,
    /// Use the median of non-null values
    Median,
}

impl From<CliNumericImputation> for NumericImputation {
    fn from(cli: CliNumericImputation) -> Self {
        match cli {
            CliNumericImputation::Mean => NumericImputation::Mean,
            CliNumericImputation::Median => NumericImputation::Median,
        }
    }
}

/// CLI-compatible categorical imputation strategy enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliCategoricalImputation {
    /// Use the most frequent value
    MostFrequent,
    /// Use the constant "missing"
    Constant,
}

impl From<CliCategoricalImputation> for CategoricalImputation {
    fn from(cli: CliCategoricalImputation) -> Self {
        match cli {
            CliCategoricalImputation::MostFrequent => CategoricalImputation::MostFrequent,
            CliCategoricalImputation::Constant => CategoricalImputation::Constant,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Tabular data preprocessing pipeline",
    long_about = "Loads a CSV, cleans it, imputes/scales/one-hot encodes the features and \
                  writes seeded train/test splits.\n\n\
                  EXAMPLES:\n  \
                  # Defaults: data/projectdata.csv, target Churn, output processed_data/\n  \
                  tabprep\n\n  \
                  # Custom input and target, fit on training rows only\n  \
                  tabprep run -i customers.csv -t Exited --fit-strategy train-only\n\n  \
                  # Settings from a JSON file, overriding the seed\n  \
                  tabprep run --config prep.json --seed 7\n\n  \
                  # Missing-value cleaning demo on a built-in sample\n  \
                  tabprep explore",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    /// Arguments for `run` when no subcommand is given
    #[command(flatten)]
    run: RunArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline (default)
    Run(RunArgs),
    /// Drop incomplete rows from a built-in sample dataset and save them
    Explore(ExploreArgs),
}

#[derive(Args, Debug, Clone)]
struct LogArgs {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show warnings, errors and the final result)
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Args, Debug, Clone)]
struct RunArgs {
    /// Path to the CSV file to process [default: data/projectdata.csv]
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Target column [default: Churn]
    #[arg(short, long)]
    target: Option<String>,

    /// Output directory for the split files [default: processed_data]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// JSON configuration file; explicit flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Row cleaning applied before splitting [default: drop-duplicates]
    #[arg(long, value_enum)]
    cleaning: Option<CliCleaningPolicy>,

    /// Which rows the preprocessor is fitted on [default: full-dataset]
    #[arg(long, value_enum)]
    fit_strategy: Option<CliFitStrategy>,

    /// Fraction of rows in the test split [default: 0.2]
    #[arg(long)]
    test_size: Option<f64>,

    /// Seed for the row shuffle [default: 42]
    #[arg(long)]
    seed: Option<u64>,

    /// Strategy for imputing missing numeric values [default: mean]
    #[arg(long, value_enum)]
    numeric_imputation: Option<CliNumericImputation>,

    /// Strategy for imputing missing categorical values [default: most-frequent]
    #[arg(long, value_enum)]
    categorical_imputation: Option<CliCategoricalImputation>,

    /// Write feature headers as 0, 1, 2, ... instead of column names
    #[arg(long)]
    ordinal_header: bool,

    /// Save the fitted preprocessor as preprocessor.json
    #[arg(long)]
    save_preprocessor: bool,

    /// Write run_report.json to the output directory
    #[arg(short = 'r', long)]
    emit_report: bool,

    #[command(flatten)]
    log: LogArgs,
}

#[derive(Args, Debug, Clone)]
struct ExploreArgs {
    /// Where to write the cleaned sample
    #[arg(short, long, default_value = DEFAULT_EXPLORATORY_OUTPUT)]
    output: PathBuf,

    #[command(flatten)]
    log: LogArgs,
}

/// Initialize the tracing subscriber for logging.
///
/// `RUST_LOG` wins over `--log-level`; `--quiet` lowers the default to `warn`.
fn init_logging(log: &LogArgs) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if log.quiet { "warn" } else { log.log_level.as_str() };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    // Load environment variables (RUST_LOG included) before logging starts
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Some(Command::Explore(args)) => {
            init_logging(&args.log);
            run_explore(&args)
        }
        Some(Command::Run(args)) => {
            init_logging(&args.log);
            run_pipeline(&args)
        }
        None => {
            init_logging(&cli.run.log);
            run_pipeline(&cli.run)
        }
    }
}

/// Merge the optional config file with explicit flags.
fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let base = match &args.config {
        Some(path) => {
            info!("Reading configuration from {}", path.display());
            PipelineConfig::from_json_file(path)
                .with_context(|| format!("Invalid configuration file {}", path.display()))?
        }
        None => PipelineConfig::default(),
    };

    let mut builder = PipelineConfigBuilder::from_config(base);

    if let Some(ref input) = args.input {
        builder = builder.input_path(input);
    }
    if let Some(ref target) = args.target {
        builder = builder.target_column(target);
    }
    if let Some(ref output) = args.output {
        builder = builder.output_dir(output);
    }
    if let Some(policy) = args.cleaning {
        builder = builder.cleaning_policy(policy.into());
    }
    if let Some(strategy) = args.fit_strategy {
        builder = builder.fit_strategy(strategy.into());
    }
    if let Some(size) = args.test_size {
        builder = builder.test_size(size);
    }
    if let Some(seed) = args.seed {
        builder = builder.random_seed(seed);
    }
    if let Some(strategy) = args.numeric_imputation {
        builder = builder.numeric_imputation(strategy.into());
    }
    if let Some(strategy) = args.categorical_imputation {
        builder = builder.categorical_imputation(strategy.into());
    }
    if args.ordinal_header {
        builder = builder.feature_header(FeatureHeader::Ordinal);
    }
    if args.save_preprocessor {
        builder = builder.save_preprocessor(true);
    }
    if args.emit_report {
        builder = builder.emit_report(true);
    }

    Ok(builder.build()?)
}

fn run_pipeline(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    let quiet = args.log.quiet;

    let pipeline = Pipeline::builder()
        .config(config)
        .on_progress(move |update| {
            // One line per stage start keeps the console readable
            if !quiet && update.stage_progress == 0.0 {
                println!(
                    "[{:>3.0}%] {}: {}",
                    update.progress * 100.0,
                    update.stage.display_name(),
                    update.message
                );
            }
        })
        .build()?;

    match pipeline.run() {
        Ok(result) => {
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            error!("Pipeline failed: {}", e);
            Err(e).context("Pipeline failed")
        }
    }
}

/// Print the end-of-run summary.
///
/// Uses `println!` so the summary is visible regardless of log level.
fn print_summary(result: &PipelineResult) {
    let summary = &result.summary;

    println!();
    println!("{}", "=".repeat(80));
    println!("PREPROCESSING COMPLETE");
    println!("{}", "=".repeat(80));
    println!();

    if let Some(ref input) = summary.input_path {
        println!(
            "Input:  {} ({} rows x {} columns)",
            input, summary.rows_loaded, summary.columns_loaded
        );
    }
    println!("Target: {}", summary.target_column);
    println!();

    println!("Processing Summary:");
    println!("  Duration: {}ms", summary.duration_ms);
    println!(
        "  Cleaning ({:?}): {} -> {} rows ({:.1}% removed)",
        summary.cleaning_policy,
        summary.cleaning.rows_before,
        summary.cleaning.rows_after,
        summary.rows_removed_percentage()
    );
    println!(
        "  Columns: {} numeric, {} categorical, {} skipped",
        summary.numeric_columns.len(),
        summary.categorical_columns.len(),
        summary.skipped_columns.len()
    );
    println!("  Output features: {}", summary.output_features);
    println!(
        "  Split ({:?}, seed {}): {} train / {} test rows",
        summary.fit_strategy, summary.random_seed, summary.train_rows, summary.test_rows
    );
    println!();

    if !summary.skipped_columns.is_empty() {
        println!("Skipped columns:");
        for col in &summary.skipped_columns {
            println!("  ! {}", col);
        }
        println!();
    }

    println!("Files:");
    for path in result.outputs.all() {
        println!("  {}", path.display());
    }
    println!("{}", "=".repeat(80));
}

fn run_explore(args: &ExploreArgs) -> Result<()> {
    let outcome = run_exploratory(&args.output).context("Exploratory run failed")?;

    println!("Original dataset:");
    println!("{}", outcome.original);
    println!();
    println!("After dropping rows with missing values:");
    println!("{}", outcome.cleaned);
    println!();
    println!("Saved cleaned data to {}", outcome.output_path.display());

    Ok(())
}
