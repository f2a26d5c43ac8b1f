//! hourgrid CLI - hourly machine schedule exporter
//!
//! Reads planning-system payloads from a data directory, builds the
//! time-by-machine grid in the local time zone, and writes it as a workbook,
//! a text preview or JSON.

mod config;
mod input;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use hourgrid_builder::GridBuilder;
use hourgrid_core::{Renderer, ScheduleGrid};
use hourgrid_render::{ExcelRenderer, TextRenderer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::Config;
use crate::input::load_input;

#[derive(Parser)]
#[command(name = "hourgrid")]
#[command(author, version, about = "Hourly machine schedule exporter", long_about = None)]
struct Cli {
    /// Verbose output (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Config file path
    #[arg(short, long, env = "HOURGRID_CONFIG", global = true, value_name = "CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the schedule grid and write it out
    Export {
        /// Directory holding the planning payloads
        #[arg(value_name = "DATA_DIR")]
        data_dir: PathBuf,

        /// Output file (xlsx defaults to the configured file name, others to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,
    },

    /// Build the schedule grid and print a summary
    Check {
        /// Directory holding the planning payloads
        #[arg(value_name = "DATA_DIR")]
        data_dir: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Xlsx,
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Export {
            data_dir,
            output,
            format,
        } => cmd_export(&config, &data_dir, output.as_deref(), format),
        Commands::Check { data_dir } => cmd_check(&config, &data_dir),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level from `warn`
fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn build_schedule(config: &Config, data_dir: &Path) -> Result<ScheduleGrid> {
    let input = load_input(data_dir, &config.input)?;
    let schedule = GridBuilder::local()
        .build(&input)
        .with_context(|| format!("cannot build schedule from {}", data_dir.display()))?;

    info!(
        rows = schedule.grid.rows(),
        machines = schedule.grid.columns(),
        occupied = schedule.grid.occupied_count(),
        highlighted = schedule.grid.highlighted_count(),
        "built schedule grid"
    );
    Ok(schedule)
}

fn cmd_export(
    config: &Config,
    data_dir: &Path,
    output: Option<&Path>,
    format: OutputFormat,
) -> Result<()> {
    let schedule = build_schedule(config, data_dir)?;

    match format {
        OutputFormat::Xlsx => {
            let renderer = ExcelRenderer::new()
                .sheet_name(config.output.sheet_name.as_str())
                .highlight_color(config.output.highlight_rgb()?);
            let bytes = renderer.render(&schedule).context("cannot render workbook")?;

            let path = output.map_or_else(|| PathBuf::from(&config.output.file_name), Path::to_path_buf);
            std::fs::write(&path, bytes)
                .with_context(|| format!("cannot write {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
        OutputFormat::Text => {
            let text = TextRenderer::new()
                .column_width(config.output.text_column_width)
                .render(&schedule)
                .context("cannot render text preview")?;
            emit(output, &text)?;
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&schedule)?;
            emit(output, &json)?;
        }
    }

    Ok(())
}

fn cmd_check(config: &Config, data_dir: &Path) -> Result<()> {
    let schedule = build_schedule(config, data_dir)?;
    let window = |time: Option<chrono::NaiveDateTime>| {
        time.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M").to_string())
    };

    println!("Window:      {} .. {}", window(schedule.window_start()), window(schedule.window_end()));
    println!("Rows:        {}", schedule.grid.rows());
    println!("Machines:    {}", schedule.grid.columns());
    println!("Occupied:    {}", schedule.grid.occupied_count());
    println!("Highlighted: {}", schedule.grid.highlighted_count());
    Ok(())
}

/// Write to `path`, or stdout when none is given
fn emit(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => std::fs::write(path, content)
            .with_context(|| format!("cannot write {}", path.display())),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            if !content.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}
