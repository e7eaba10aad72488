//! # Tide Report Application Entry Point
//!
//! Thin command-line front end over the report library. Dates are given the
//! way a user clicks them on a calendar: each date runs through the range
//! selector in order, so `generate 2025-03-01 2025-03-05` picks a five-day
//! range and `generate 2025-03-05 2025-03-01` restarts at the 1st.
//!
//! Report assembly and file output run on a blocking worker so the main task
//! only waits for the result and reports it.


use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::{path::PathBuf, process::ExitCode};
use tide_report_lib::{
    assembler::ReportAssembler,
    config::Config,
    layout::layout_params,
    output, renderer,
    selection::{self, DateSelection},
    stations::{StationRegistry, StationSelection, Toggle},
    tide_data::CsvSource,
    ReportError,
};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "tide-report")]
#[command(author, version, about = "Per-day tide tables for selected stations", long_about = None)]
struct Cli {
    /// Configuration file [default: tide-report.toml]
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a report from clicked calendar days
    Generate {
        /// Clicked days (YYYY-MM-DD), applied in order
        #[arg(value_name = "DAY", required = true)]
        days: Vec<NaiveDate>,

        /// Print the report to the terminal instead of writing a file
        #[arg(long)]
        stdout: bool,

        /// Print the report as JSON instead of writing a file
        #[arg(long, conflicts_with = "stdout")]
        json: bool,

        /// Directory to write the document into
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Do not open the document after writing it
        #[arg(long)]
        no_open: bool,
    },

    /// Inspect or change the selected stations
    Stations {
        #[command(subcommand)]
        action: StationAction,
    },
}

#[derive(Subcommand)]
enum StationAction {
    /// List every known station grouped by initial consonant
    List,
    /// Show the saved selection
    Show,
    /// Add or remove stations from the saved selection
    Toggle {
        #[arg(value_name = "STATION", required = true)]
        stations: Vec<String>,
    },
}

/// How a generated report is delivered.
#[derive(Clone, Copy)]
enum Delivery {
    Terminal,
    Json,
    File { open: bool },
}

/// Main application entry point.
fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from_path(path),
        None => Config::load(),
    };

    let outcome = match cli.command {
        Commands::Generate {
            days,
            stdout,
            json,
            output_dir,
            no_open,
        } => {
            let delivery = if stdout {
                Delivery::Terminal
            } else if json {
                Delivery::Json
            } else {
                Delivery::File {
                    open: config.output.open_after_save && !no_open,
                }
            };
            generate(config, &days, delivery, output_dir)?
        }
        Commands::Stations { action } => stations(&config, action),
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            error!("{err}");
            let (title, message) = err.user_message();
            eprintln!("{title}\n{message}");
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Replay clicked days through the range selector.
fn select_range(days: &[NaiveDate]) -> DateSelection {
    days.iter()
        .fold(selection::clear(), |current, &day| selection::transition(day, current))
}

/// Report range for a click sequence.
///
/// A calendar only builds a report once both ends are picked. On the command
/// line a single day is also accepted and reported on its own, which is the
/// only way to get a one-day report since clicking the same day twice clears
/// the end. Past days are accepted as well so old tables can be re-printed.
fn report_range(picked: &DateSelection) -> Option<(NaiveDate, NaiveDate)> {
    match (picked.range(), picked.start) {
        (Some(range), _) => Some(range),
        (None, Some(day)) => Some((day, day)),
        (None, None) => None,
    }
}

/// Build one report for the clicked days and deliver it.
///
/// See [`report_range`] for how the clicks map to a date range.
fn generate(
    config: Config,
    days: &[NaiveDate],
    delivery: Delivery,
    output_dir: Option<PathBuf>,
) -> anyhow::Result<Result<(), ReportError>> {
    let picked = select_range(days);
    let Some((start, end)) = report_range(&picked) else {
        anyhow::bail!("날짜를 골라주세요!");
    };
    if let Some(text) = picked.display_text() {
        info!("selected {text}");
    }

    let selected = match StationSelection::load(&config.source.selection_file) {
        Ok(selected) => selected,
        Err(err) => return Ok(Err(err)),
    };
    if selected.is_empty() {
        anyhow::bail!("추출할 지역을 선택해주세요. (tide-report stations toggle <STATION>)");
    }
    info!("stations: {}", selected.summary());

    let dir = output_dir
        .or_else(|| config.output.directory.clone())
        .unwrap_or_else(output::desktop_dir);

    // Create Tokio runtime; the report itself is built on a blocking worker
    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async move {
        tokio::task::spawn_blocking(move || -> Result<(), ReportError> {
            let source = CsvSource::new(&config.source.tide_table, config.columns.clone());
            let assembler = ReportAssembler::new(config.output.missing_glyph.as_str());
            let grid = assembler.assemble(start, end, selected.stations(), &source)?;
            let layout = layout_params(grid.days.len(), grid.stations.len());

            match delivery {
                Delivery::Terminal => renderer::draw_ascii(&grid, &layout),
                Delivery::Json => println!("{}", renderer::to_json(&grid, &layout)?),
                Delivery::File { open } => {
                    let path = output::save(&grid, &layout, &dir)?;
                    if open {
                        output::open(&path)?;
                    }
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    println!("조석표를 만들었어요!");
                    println!("파일은 바탕화면에 저장됐어요. \n{name}");
                    println!("※자료출처: 해양조사원 스마트 조석예보");
                }
            }
            Ok(())
        })
        .await
    });

    result.context("report worker panicked")
}

fn stations(config: &Config, action: StationAction) -> Result<(), ReportError> {
    let path = &config.source.selection_file;
    match action {
        StationAction::List => {
            let registry = StationRegistry::load(&config.source.station_list)?;
            let selected = StationSelection::load(path)?;
            for (initial, group) in registry.groups() {
                let names: Vec<String> = group
                    .iter()
                    .map(|s| {
                        if selected.contains(s) {
                            format!("[{s}]")
                        } else {
                            s.clone()
                        }
                    })
                    .collect();
                println!("{initial}  {}", names.join(" "));
            }
        }
        StationAction::Show => {
            let selected = StationSelection::load(path)?;
            println!("{}", selected.summary());
            for station in selected.stations() {
                println!("  {station}");
            }
        }
        StationAction::Toggle { stations } => {
            let registry = StationRegistry::load(&config.source.station_list)?;
            let mut selected = StationSelection::load(path)?;
            for dropped in selected.retain_known(&registry) {
                warn!("dropping unknown station {dropped} from selection");
            }
            for station in &stations {
                if !registry.contains(station) {
                    warn!("unknown station {station}, skipped");
                    continue;
                }
                match selected.toggle(station) {
                    Toggle::Added => println!("+ {station}"),
                    Toggle::Removed => println!("- {station}"),
                    Toggle::Full => println!(
                        "! {station}: 최대 {}개 지점까지 고를 수 있어요.",
                        tide_report_lib::stations::MAX_STATIONS
                    ),
                }
            }
            selected.save(path)?;
            println!("{}", selected.summary());
        }
    }
    Ok(())
}
