//! # Report Assembly
//!
//! Builds the report grid for a date range and a set of stations: one
//! [`DayBlock`] per calendar day, each holding a display-ready row per
//! station. Renderers never look at raw [`TideRecord`]s; everything they draw
//! (clock strings, `cm` suffixes, the dash glyph for unmeasured values, kind
//! colours) is decided here.
//!
//! ## Pipeline
//! 1. Reject `end < start` before touching the source
//! 2. Load every record and keep those for selected stations inside the range
//! 3. Bucket by day and station; a day without records fails the whole
//!    report, and a repeated station row for the same day replaces the
//!    earlier one
//! 4. Order each day's records by station so columns line up between days
//! 5. Format events and attach the day's moon-phase index
//!
//! The report is all-or-nothing: any error leaves no partial grid behind.

use crate::{
    lunar::moon_phase_index, tide_data::TableSource, weekday_label, ReportError, Rgb, TideEvent,
    TideKind, TideRecord,
};
use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{info, warn};

/// Glyph shown in place of an unmeasured time or depth
pub const DEFAULT_MISSING_GLYPH: &str = "ㅡ";

/// One tide event, ready to be written into a cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedEvent {
    /// "HH:MM", or the missing glyph
    pub time: String,
    /// "233cm", or the missing glyph
    pub depth: String,
    pub kind: TideKind,
    /// Font colour for both cells
    pub color: Rgb,
    /// Water below chart datum; renderers shade these cells
    pub below_datum: bool,
}

/// A station's line in a day block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRow {
    pub station: String,
    pub events: [FormattedEvent; 4],
    pub sunrise: String,
    pub sunset: String,
}

impl StationRow {
    /// "06:41 ~ 18:37"
    pub fn daylight(&self) -> String {
        format!("{} ~ {}", self.sunrise, self.sunset)
    }
}

/// Everything the report shows for one calendar day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayBlock {
    pub date: NaiveDate,
    /// "3. 17.(월)"
    pub label: String,
    /// Lunar-day name shared by every station that day
    pub tide_name: String,
    /// 0 (new moon) to 29
    pub moon_phase: u8,
    /// Sorted by station identifier
    pub rows: Vec<StationRow>,
}

impl DayBlock {
    pub fn row(&self, station: &str) -> Option<&StationRow> {
        self.rows.iter().find(|row| row.station == station)
    }
}

/// The assembled report, handed to a renderer and then dropped.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportGrid {
    pub start: NaiveDate,
    pub end: NaiveDate,
    /// Selected stations in column order
    pub stations: Vec<String>,
    /// One block per day, ascending
    pub days: Vec<DayBlock>,
}

impl ReportGrid {
    /// "3. 1.(토) ~ 3. 5.(수) / 5일간"
    pub fn title_range(&self) -> String {
        format!(
            "{} ~ {} / {}일간",
            day_label(self.start),
            day_label(self.end),
            self.days.len()
        )
    }

    /// "조석표 (0301-0305)"
    pub fn file_stem(&self) -> String {
        format!(
            "조석표 ({}-{})",
            self.start.format("%m%d"),
            self.end.format("%m%d")
        )
    }
}

/// "3. 1.(토)"
pub fn day_label(date: NaiveDate) -> String {
    format!("{}. {}.({})", date.month(), date.day(), weekday_label(date))
}

/// Assembles reports; build once and reuse for every request.
#[derive(Debug, Clone)]
pub struct ReportAssembler {
    missing_glyph: String,
}

impl Default for ReportAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_MISSING_GLYPH)
    }
}

impl ReportAssembler {
    pub fn new(missing_glyph: impl Into<String>) -> Self {
        ReportAssembler {
            missing_glyph: missing_glyph.into(),
        }
    }

    /// Build the report grid for `[start, end]` and the given stations.
    ///
    /// Fails with [`ReportError::EmptyRange`] before any I/O when `end`
    /// precedes `start`, with [`ReportError::SourceUnreadable`] when the
    /// source cannot be read, and with [`ReportError::MissingDayData`] for
    /// the first day that has no records for any selected station.
    pub fn assemble<S>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        stations: &[String],
        source: &S,
    ) -> Result<ReportGrid, ReportError>
    where
        S: TableSource + ?Sized,
    {
        if end < start {
            return Err(ReportError::EmptyRange { start, end });
        }

        let wanted: BTreeSet<&str> = stations.iter().map(String::as_str).collect();
        // One record per station and day, keyed so rows come out sorted.
        let mut buckets: BTreeMap<NaiveDate, BTreeMap<String, TideRecord>> = BTreeMap::new();
        for record in source.load()? {
            if record.date < start || record.date > end {
                continue;
            }
            if !wanted.contains(record.station.as_str()) {
                continue;
            }
            let (date, station) = (record.date, record.station.clone());
            let day = buckets.entry(date).or_default();
            // Later rows overwrite earlier ones for the same cell.
            if let Some(replaced) = day.insert(station, record) {
                warn!(
                    %date,
                    station = %replaced.station,
                    "duplicate tide row, keeping the last one"
                );
            }
        }

        let mut days = Vec::new();
        for date in start.iter_days().take_while(|date| *date <= end) {
            let records: Vec<TideRecord> = buckets
                .remove(&date)
                .map(|by_station| by_station.into_values().collect())
                .unwrap_or_default();
            if records.is_empty() {
                warn!(%date, source = %source.describe(), "no tide data for requested day");
                return Err(ReportError::MissingDayData(date));
            }
            days.push(self.day_block(date, records));
        }

        let grid = ReportGrid {
            start,
            end,
            stations: wanted.iter().map(|s| s.to_string()).collect(),
            days,
        };
        info!(
            days = grid.days.len(),
            stations = grid.stations.len(),
            "assembled tide report {}",
            grid.title_range()
        );
        Ok(grid)
    }

    fn day_block(&self, date: NaiveDate, records: Vec<TideRecord>) -> DayBlock {
        let tide_name = records
            .first()
            .map(|record| record.tide_name.clone())
            .unwrap_or_default();
        DayBlock {
            date,
            label: day_label(date),
            tide_name,
            moon_phase: moon_phase_index(date),
            rows: records.iter().map(|record| self.station_row(record)).collect(),
        }
    }

    fn station_row(&self, record: &TideRecord) -> StationRow {
        StationRow {
            station: record.station.clone(),
            events: record.events.map(|event| self.format_event(&event)),
            sunrise: clock_text(&record.sunrise),
            sunset: clock_text(&record.sunset),
        }
    }

    /// Turn one event into its two display cells.
    pub fn format_event(&self, event: &TideEvent) -> FormattedEvent {
        FormattedEvent {
            time: event
                .time
                .map(|time| time.format("%H:%M").to_string())
                .unwrap_or_else(|| self.missing_glyph.clone()),
            depth: event
                .depth_cm
                .map(|depth| format!("{depth}cm"))
                .unwrap_or_else(|| self.missing_glyph.clone()),
            kind: event.kind,
            color: event.kind.color(),
            below_datum: event.is_below_datum(),
        }
    }
}

/// Assemble with the default missing glyph.
pub fn assemble<S>(
    start: NaiveDate,
    end: NaiveDate,
    stations: &[String],
    source: &S,
) -> Result<ReportGrid, ReportError>
where
    S: TableSource + ?Sized,
{
    ReportAssembler::default().assemble(start, end, stations, source)
}

/// Normalise a sunrise/sunset cell ("06:41:00 AM") to "06:41". Cells in an
/// unknown format pass through untouched.
fn clock_text(raw: &str) -> String {
    const FORMATS: [&str; 4] = ["%I:%M:%S %p", "%I:%M %p", "%H:%M:%S", "%H:%M"];
    let raw = raw.trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(raw, format).ok())
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| raw.to_string())
}
