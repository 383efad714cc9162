#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the incident timeline builder.

use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use incident_timeline_cli_utils::IndicatifProgress;
use incident_timeline_incident_models::DateOrder;
use incident_timeline_ingest::{ConfigError, PipelineConfig, inspect_file, run_batch};

#[derive(Parser)]
#[command(
    name = "incident_timeline",
    about = "Builds per-incident update timelines from XML incident reports"
)]
struct Cli {
    /// TOML configuration file. Flags override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Process every report in the input directory and write the summary CSV
    Run(Overrides),
    /// Decode and extract a single report file and list its records
    Inspect {
        /// Report file to read
        file: PathBuf,
    },
    /// Print the effective configuration as TOML
    Config(Overrides),
}

#[derive(Args, Default)]
struct Overrides {
    /// Directory scanned for `*.xml` report files
    #[arg(long)]
    input_dir: Option<PathBuf>,
    /// Where the summary CSV is written
    #[arg(long)]
    output: Option<PathBuf>,
    /// Comma-separated encoding labels, tried in order (e.g. "big5,utf-8")
    #[arg(long)]
    encodings: Option<String>,
    /// Maximum characters of update text shown per timeline entry
    #[arg(long)]
    max_detail_chars: Option<usize>,
    /// Read ambiguous numeric dates as day/month/year
    #[arg(long)]
    day_first: bool,
}

impl Overrides {
    fn apply(self, config: &mut PipelineConfig) {
        if let Some(dir) = self.input_dir {
            config.input_dir = dir;
        }
        if let Some(path) = self.output {
            config.output_path = path;
        }
        if let Some(encodings) = self.encodings {
            config.encodings = encodings
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(max) = self.max_detail_chars {
            config.max_detail_chars = max;
        }
        if self.day_first {
            config.date_order = DateOrder::DayFirst;
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<PipelineConfig, ConfigError> {
    path.map_or_else(|| Ok(PipelineConfig::default()), PipelineConfig::load)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = incident_timeline_cli_utils::init_logger();
    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;

    match cli
        .command
        .unwrap_or_else(|| Commands::Run(Overrides::default()))
    {
        Commands::Run(overrides) => {
            overrides.apply(&mut config);
            config.validate()?;

            let progress = IndicatifProgress::files_bar(&multi, "Reading reports");
            let report = run_batch(&config, &progress)?;

            log::info!(
                "{} file(s) scanned, {} failed, {} decoded lossily",
                report.files_scanned,
                report.files_failed,
                report.files_lossy
            );
            log::info!(
                "{} row(s), {} synthesized id(s), {} invalid date(s), {} incident(s)",
                report.raw_records,
                report.synthesized_ids,
                report.invalid_dates,
                report.incidents
            );
        }
        Commands::Inspect { file } => {
            config.validate()?;
            let extracted = inspect_file(&file, &config)?;

            println!(
                "{} ({} record(s), encoding {}{})",
                extracted.file_name,
                extracted.records.len(),
                extracted.encoding,
                if extracted.lossy { ", lossy" } else { "" }
            );
            println!("{:<28} {:<12} {:<22} HEADING", "INCIDENT", "ORIGIN", "DATE");
            println!("{}", "-".repeat(80));
            for record in &extracted.records {
                println!(
                    "{:<28} {:<12} {:<22} {}",
                    record.incident_id,
                    record.id_origin.as_ref(),
                    record.announcement_date,
                    record.heading
                );
            }
        }
        Commands::Config(overrides) => {
            overrides.apply(&mut config);
            config.validate()?;
            print!("{}", config.to_toml_string()?);
        }
    }

    Ok(())
}
