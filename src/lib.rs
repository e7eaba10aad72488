//! # Tide Report Core Library
//!
//! This library turns a CSV tide table into a per-day, per-station tide report
//! for a user-chosen date range and set of stations. It holds the record types
//! shared by every stage of the pipeline; rendering and file emission live in
//! their own modules and only ever consume an assembled [`assembler::ReportGrid`].
//!
//! ## Data Flow
//! 1. **Select**: day clicks run through [`selection::transition`] to build a
//!    `(start, end)` range; stations come from the persisted
//!    [`stations::StationSelection`]
//! 2. **Load**: [`tide_data::CsvSource`] parses the tide table into
//!    [`TideRecord`]s, converting `--` sentinels into `None` at the boundary
//! 3. **Assemble**: [`assembler::assemble`] buckets records by day, checks
//!    coverage and formats every event for display
//! 4. **Render**: [`renderer`] produces terminal, document and JSON output
//!    sized by [`layout::layout_params`]
//! 5. **Emit**: [`output`] writes the document to the desktop and opens it
//!
//! ## Core Types
//! - [`TideEvent`]: one high or low water crossing
//! - [`TideRecord`]: one station-day row of the source table

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

// Module declarations
pub mod assembler;
pub mod config;
pub mod error;
pub mod layout;
pub mod lunar;
pub mod output;
pub mod renderer;
pub mod selection;
pub mod stations;
pub mod tide_data;

pub use error::ReportError;

/// Whether a tide event is a high or low water crossing.
///
/// Source tables carry the kind either as a Korean token (`고` / `저`) or an
/// English one (`high` / `low`). Anything else is kept as [`TideKind::Other`]
/// so the row still renders, just without a kind colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TideKind {
    High,
    Low,
    Other,
}

impl TideKind {
    /// Parse a kind token from the tide table.
    ///
    /// # Example
    /// ```
    /// use tide_report_lib::TideKind;
    ///
    /// assert_eq!(TideKind::from_token("고"), TideKind::High);
    /// assert_eq!(TideKind::from_token("LOW"), TideKind::Low);
    /// assert_eq!(TideKind::from_token("?"), TideKind::Other);
    /// ```
    pub fn from_token(token: &str) -> Self {
        let token = token.trim();
        match token {
            "고" => TideKind::High,
            "저" => TideKind::Low,
            _ if token.eq_ignore_ascii_case("high") => TideKind::High,
            _ if token.eq_ignore_ascii_case("low") => TideKind::Low,
            _ => TideKind::Other,
        }
    }

    /// Font colour used by renderers: red for high water, blue for low water.
    pub fn color(self) -> Rgb {
        match self {
            TideKind::High => Rgb(255, 0, 0),
            TideKind::Low => Rgb(0, 0, 255),
            TideKind::Other => Rgb(0, 0, 0),
        }
    }
}

/// Short Korean weekday name used in every date label ("월" … "일").
pub fn weekday_label(date: NaiveDate) -> &'static str {
    const NAMES: [&str; 7] = ["월", "화", "수", "목", "금", "토", "일"];
    NAMES[date.weekday().num_days_from_monday() as usize]
}

/// Plain 8-bit RGB triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// A single high or low water occurrence at a station.
///
/// Unmeasured values are `None`; the `--` sentinel used by the source table
/// never leaves the loading code.
///
/// # Example
/// ```
/// use chrono::NaiveTime;
/// use tide_report_lib::{TideEvent, TideKind};
///
/// let event = TideEvent {
///     time: NaiveTime::from_hms_opt(1, 20, 0),
///     kind: TideKind::High,
///     depth_cm: Some(233),
/// };
/// assert!(!event.is_below_datum());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideEvent {
    /// Clock time of the crossing, if measured
    pub time: Option<NaiveTime>,
    /// High or low water
    pub kind: TideKind,
    /// Height above chart datum in centimetres; may be negative
    pub depth_cm: Option<i32>,
}

impl TideEvent {
    /// True when the water falls below chart datum.
    pub fn is_below_datum(&self) -> bool {
        self.depth_cm.is_some_and(|depth| depth < 0)
    }
}

/// One row of the tide table: a station's four tide events on one day.
///
/// All records sharing a date carry the same lunar-day name (`tide_name`).
/// Sunrise and sunset are kept as written in the table and normalised only
/// when a report is assembled.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TideRecord {
    /// Station identifier, e.g. "인천"
    pub station: String,
    /// Calendar day the events belong to
    pub date: NaiveDate,
    /// Traditional lunar-day label, e.g. "열물"
    pub tide_name: String,
    /// The day's four high/low water crossings, in table order
    pub events: [TideEvent; 4],
    /// Sunrise as written in the table
    pub sunrise: String,
    /// Sunset as written in the table
    pub sunset: String,
}
