//! @ai:module:intent CLI for benchmark log extraction and baseline comparison
//! @ai:module:layer presentation

use anyhow::Result;
use clap::{Parser, Subcommand};
use perfcmp::{
    config::AnalysisConfig,
    pipeline::{ComparisonOutcome, Pipeline},
    report::{generation_timestamp, ConsoleReporterTrait, ExtractionSummary, ReportGenerator},
    repository::RunTypeFilter,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "perfcmp")]
#[command(about = "Extract resource-usage logs from benchmark runs and compare them against a baseline")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract and aggregate run data, then compare all runs against the baseline
    Analyze {
        /// Runs to extract: all, baseline, variant or current
        #[arg(short = 't', long = "type", default_value = "all")]
        run_type: RunTypeFilter,

        /// Output directory for extracted data
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Skip the comparison stage
        #[arg(long)]
        no_comparison: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Compare all runs against the baseline without extraction
    Compare {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Initialize default configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "perfcmp.toml")]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct CommonArgs {
    /// Path to configuration file (.toml, or benchsuite KEY=VALUE format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Results directory holding reports/ (overrides RESULTS_DIR)
    #[arg(short, long)]
    results_dir: Option<String>,

    /// Baseline run id (overrides REFERENCE_BASELINE)
    #[arg(short, long)]
    baseline: Option<String>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("perfcmp=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            run_type,
            output_dir,
            no_comparison,
            common,
        } => {
            let mut config = build_config(common)?;
            if let Some(dir) = output_dir {
                config.paths.output_dir = dir;
            }
            analyze(config, run_type, no_comparison)
        }
        Commands::Compare { common } => {
            let config = build_config(common)?;
            let pipeline = Pipeline::new(config);
            run_comparison(&pipeline, &ReportGenerator::new());
            Ok(())
        }
        Commands::Init { output } => init_config(output),
    }
}

/// @ai:intent Run extraction, aggregation and (optionally) comparison
/// @ai:effects fs:read, fs:write, io
fn analyze(config: AnalysisConfig, run_type: RunTypeFilter, no_comparison: bool) -> Result<()> {
    println!("Performance Comparison and Analysis");
    println!("{}", "=".repeat(60));
    println!("Results directory: {}", config.results_dir().display());
    println!("Output directory: {}", config.paths.output_dir.display());
    println!("Extraction type: {}", run_type);

    let pipeline = Pipeline::new(config);
    let reporter = ReportGenerator::new();

    let extraction = pipeline.extract(run_type)?;
    let stats = pipeline.aggregate(&extraction.records);

    print!(
        "{}",
        reporter
            .console()
            .render_extraction(&extraction.records, &stats)
    );
    if extraction.skipped > 0 {
        println!("Skipped reports: {}", extraction.skipped);
    }

    let summary = ExtractionSummary::new(run_type, &extraction.records, stats);
    let output_dir = pipeline.config().paths.output_dir.clone();
    match reporter.persist_extraction(&extraction.records, &summary, &output_dir, &generation_timestamp()) {
        Ok(artifacts) => {
            println!("Detailed data saved to: {}", artifacts.detailed_csv.display());
            println!("Summary saved to: {}", artifacts.summary_json.display());
        }
        Err(e) => tracing::error!("Failed to save extraction data: {:#}", e),
    }

    println!("Data extraction complete - {} runs processed", extraction.records.len());

    if !no_comparison {
        run_comparison(&pipeline, &reporter);
    }

    Ok(())
}

/// @ai:intent Run the comparison stage; every outcome is reported, none is fatal
/// @ai:effects fs:read, fs:write, io
fn run_comparison(pipeline: &Pipeline, reporter: &ReportGenerator) {
    match pipeline.compare() {
        ComparisonOutcome::NoRuns => {
            println!("No benchmark runs found for comparison analysis.");
        }
        ComparisonOutcome::InsufficientRuns { run_id } => {
            println!("Only one run found ({}). No comparison possible.", run_id);
            println!("Run more benchmarks to enable comparison analysis.");
        }
        ComparisonOutcome::NoData { .. } => {
            println!("No valid benchmark data found for comparison");
        }
        ComparisonOutcome::NoBaselineData { baseline } => {
            println!("No data found for baseline: {}", baseline.run_id);
        }
        ComparisonOutcome::Compared {
            baseline, results, ..
        } => {
            print!(
                "{}",
                reporter
                    .console()
                    .render_comparison(&results, &baseline.run_id)
            );

            let csv_dir = pipeline.config().results_dir().join("csv");
            match reporter.persist_comparison(&results, &csv_dir, &generation_timestamp()) {
                Ok(path) => println!("\nDetailed comparison saved to: {}", path.display()),
                Err(e) => tracing::error!("Failed to save comparison: {:#}", e),
            }
        }
    }
}

/// @ai:intent Initialize default configuration file
/// @ai:effects fs:write
fn init_config(output: PathBuf) -> Result<()> {
    let config = AnalysisConfig::default();
    config.save(&output)?;
    println!("Configuration saved to {}", output.display());
    Ok(())
}

/// @ai:intent Load configuration and apply command-line overrides
/// @ai:effects fs:read
fn build_config(args: CommonArgs) -> Result<AnalysisConfig> {
    let mut config = load_or_default_config(args.config.as_deref())?;

    if let Some(dir) = args.results_dir {
        config.paths.results_dir = dir;
    }
    if let Some(baseline) = args.baseline {
        config.comparison.reference_baseline = Some(baseline);
    }

    Ok(config)
}

/// @ai:intent Load configuration or use defaults
/// @ai:effects fs:read
fn load_or_default_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    if let Some(p) = path {
        return Ok(load_config_file(p)?);
    }

    let toml_path = Path::new("perfcmp.toml");
    let legacy_path = Path::new("config/benchsuite.conf");

    if toml_path.exists() {
        Ok(AnalysisConfig::load(toml_path)?)
    } else if legacy_path.exists() {
        Ok(AnalysisConfig::load_legacy(legacy_path)?)
    } else {
        Ok(AnalysisConfig::default())
    }
}

fn load_config_file(path: &Path) -> perfcmp::Result<AnalysisConfig> {
    if path.extension().map(|ext| ext == "toml").unwrap_or(false) {
        AnalysisConfig::load(path)
    } else {
        AnalysisConfig::load_legacy(path)
    }
}
