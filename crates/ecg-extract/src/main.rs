//! ecg-extract — digitizes the lead traces of 12-lead ECG PDF reports into CSV.
//!
//! `ecg-extract <SOURCE> <SINK_DIR> [--options]`, where SOURCE is a single report
//! or a directory of reports. One `<stem>.csv` is written per report.

use std::path::{Path, PathBuf};
use std::process;

use anyhow::{bail, Context, Result};
use clap::Parser;

use ecg_core::options::{BaselineMethod, ExtractionOptions};
use ecg_core::pipeline::{Pipeline, PipelineBuilder};
use ecg_digitize::LeadExtractor;
use ecg_input_pdf::PdfReportReader;
use ecg_output_csv::CsvRecordSink;

#[derive(Parser)]
#[command(
    name = "ecg-extract",
    version,
    about = "Extract 12-lead ECG signals from PDF reports"
)]
struct Cli {
    /// Report PDF or directory of report PDFs
    source: Option<PathBuf>,

    /// Directory the CSV files are written to
    sink_dir: Option<PathBuf>,

    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Samples per lead (default: 5000)
    #[arg(long)]
    number_of_points: Option<usize>,

    /// Rotation about the page origin in radians (default: 0)
    #[arg(long)]
    rotation_angle: Option<f64>,

    /// Baseline statistic: median, first-sample, mode (default: median)
    #[arg(long)]
    baseline: Option<String>,

    /// Fail a report when a lead has no calibration span
    #[arg(long)]
    strict: bool,

    /// Dump effective merged config as TOML and exit
    #[arg(long)]
    dump_config: bool,
}

/// Config files in load order: global, then project-local.
fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    // ~/.config/ecg-extract/config.toml
    if let Some(config_dir) = dirs::config_dir() {
        paths.push(config_dir.join("ecg-extract").join("config.toml"));
    }
    paths.push(PathBuf::from(".ecg-extract.toml"));
    paths
}

/// Load options from `paths`. A later file fully replaces an earlier one;
/// missing files are ignored. Files that fail to parse are skipped and
/// returned as messages, since this runs before the logger exists.
fn load_config_from(paths: &[PathBuf]) -> (ExtractionOptions, Vec<String>) {
    let mut opts = ExtractionOptions::default();
    let mut problems = Vec::new();
    for path in paths {
        let Ok(contents) = std::fs::read_to_string(path) else {
            continue;
        };
        match toml::from_str::<ExtractionOptions>(&contents) {
            Ok(parsed) => opts = parsed,
            Err(e) => problems.push(format!("Failed to parse {}: {}", path.display(), e)),
        }
    }
    (opts, problems)
}

/// Default log filter for a verbosity level.
fn log_filter(verbose: u8) -> &'static str {
    if verbose > 0 {
        "debug"
    } else {
        "info"
    }
}

/// Apply CLI flags on top of config-loaded options.
/// Only overrides when the flag was given.
fn apply_cli_overrides(opts: &mut ExtractionOptions, cli: &Cli) -> Result<()> {
    if cli.verbose > 0 {
        opts.verbose = cli.verbose;
    }
    if let Some(n) = cli.number_of_points {
        opts.number_of_points = n;
    }
    if let Some(angle) = cli.rotation_angle {
        opts.rotation_angle = angle;
    }
    if let Some(ref name) = cli.baseline {
        opts.baseline_method = BaselineMethod::from_name(name)
            .with_context(|| format!("Unknown baseline method: {}", name))?;
    }
    if cli.strict {
        opts.strict_span_detection = true;
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();

    let (mut options, problems) = load_config_from(&config_paths());
    if let Err(e) = apply_cli_overrides(&mut options, &cli) {
        eprintln!("Error: {:#}", e);
        process::exit(2);
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(log_filter(options.verbose)),
    )
    .init();
    for problem in &problems {
        log::warn!("{}", problem);
    }

    if cli.dump_config {
        match toml::to_string_pretty(&options) {
            Ok(s) => {
                println!("{}", s);
                process::exit(0);
            }
            Err(e) => {
                eprintln!("Error serializing config: {}", e);
                process::exit(1);
            }
        }
    }

    let (source, sink_dir) = match (&cli.source, &cli.sink_dir) {
        (Some(source), Some(sink_dir)) => (source.clone(), sink_dir.clone()),
        _ => {
            eprintln!("Usage: ecg-extract <SOURCE> <SINK_DIR> [options]");
            process::exit(1);
        }
    };

    match run_extraction(&source, &sink_dir, options) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn build_pipeline(options: ExtractionOptions) -> Result<Pipeline> {
    let extractor = LeadExtractor::new(options).context("Invalid extraction options")?;
    let pipeline = PipelineBuilder::new()
        .reader(Box::new(PdfReportReader))
        .extractor(Box::new(extractor))
        .sink(Box::new(CsvRecordSink))
        .progress_reporter(Box::new(|frac, msg| {
            if frac < 1.0 {
                log::info!("[{:3.0}%] {}", frac * 100.0, msg);
            } else {
                log::info!("Done!");
            }
        }))
        .build()?;
    Ok(pipeline)
}

/// Run every report under `source`. Returns `false` when every report failed.
fn run_extraction(source: &Path, sink_dir: &Path, options: ExtractionOptions) -> Result<bool> {
    let pipeline = build_pipeline(options)?;

    std::fs::create_dir_all(sink_dir)
        .with_context(|| format!("Cannot create {}", sink_dir.display()))?;

    let inputs = if source.is_dir() {
        pipeline
            .collect_inputs(source)
            .with_context(|| format!("Cannot list {}", source.display()))?
    } else if source.is_file() {
        vec![source.to_path_buf()]
    } else {
        bail!("No such file or directory: {}", source.display());
    };

    if inputs.is_empty() {
        log::warn!("No reports found in {}", source.display());
        return Ok(true);
    }

    let report = pipeline.run_batch(&inputs, sink_dir);
    for (input, output) in &report.succeeded {
        log::debug!("{} -> {}", input.display(), output.display());
    }
    log::info!(
        "{} of {} reports extracted into {}",
        report.succeeded.len(),
        report.total(),
        sink_dir.display()
    );
    Ok(!report.all_failed())
}
