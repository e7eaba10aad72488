//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! tide-report.toml file. It tells the report where the tide table and
//! station list live, which CSV columns hold which fields, and where the
//! finished document goes.
//!
//! Column positions differ between generations of the tide table (the
//! single-region and multi-region exports do not agree), so they are read
//! from configuration instead of being fixed in code.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default configuration file name, looked up in the working directory
pub const CONFIG_FILE: &str = "tide-report.toml";

/// Application configuration loaded from tide-report.toml
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Input file locations
    pub source: SourceConfig,
    /// CSV column positions in the tide table
    #[serde(default)]
    pub columns: ColumnMap,
    /// Output document settings
    #[serde(default)]
    pub output: OutputConfig,
}

/// Locations of the data files
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Tide table CSV, one row per station-day
    pub tide_table: PathBuf,
    /// Comma-delimited list of every valid station
    pub station_list: PathBuf,
    /// Single line holding the user's chosen stations
    pub selection_file: PathBuf,
}

/// Zero-based column positions of each field in a tide table row
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ColumnMap {
    /// First row is a header and is skipped
    pub has_header: bool,
    pub station: usize,
    pub date: usize,
    /// The four `time/kind/depth` event fields, in display order
    pub events: [usize; 4],
    pub tide_name: usize,
    pub sunrise: usize,
    pub sunset: usize,
}

impl Default for ColumnMap {
    /// Layout of the single-region 2025-2026 tide table:
    /// `station, date, ev1, ev2, ev3, ev4, ..., tide_name, sunrise, sunset`
    fn default() -> Self {
        ColumnMap {
            has_header: true,
            station: 0,
            date: 1,
            events: [2, 3, 4, 5],
            tide_name: 9,
            sunrise: 10,
            sunset: 11,
        }
    }
}

impl ColumnMap {
    /// Smallest number of cells a row needs for every configured column.
    pub fn min_width(&self) -> usize {
        let fields = [self.station, self.date, self.tide_name, self.sunrise, self.sunset];
        fields
            .iter()
            .chain(self.events.iter())
            .max()
            .map_or(0, |max| max + 1)
    }
}

/// Output document settings
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Target directory; the user's desktop when absent
    pub directory: Option<PathBuf>,
    /// Launch the document after writing it
    pub open_after_save: bool,
    /// Glyph drawn for unmeasured times and depths
    pub missing_glyph: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: None,
            open_after_save: true,
            missing_glyph: "ㅡ".to_string(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            source: SourceConfig {
                tide_table: PathBuf::from("resources/TIDE(2025-2026).csv"),
                station_list: PathBuf::from("resources/stations.csv"),
                selection_file: PathBuf::from("resources/selected.txt"),
            },
            columns: ColumnMap::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from tide-report.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        tide_table = %config.source.tide_table.display(),
                        "loaded configuration from {}",
                        path.display()
                    );
                    config
                }
                Err(e) => {
                    warn!("invalid config file format: {e}; using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!("no config file at {}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("configuration saved to {}", path.as_ref().display());
        Ok(())
    }
}
