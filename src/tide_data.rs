//! # Tide Table Loading
//!
//! This module reads the tide table the report is built from. The table is a
//! plain comma-delimited export with one row per station-day; column
//! positions come from [`ColumnMap`] because every export generation moves
//! them around.
//!
//! ## Event Fields
//!
//! Each of the four event cells is slash-delimited, in one of two shapes:
//! - `01:51/저/45` — time, Korean kind token, depth in centimetres
//! - `01:20/high/고/233` — time, English kind token, Korean kind token, depth
//!
//! A time or depth starting with `--` was not measured. That sentinel is
//! turned into `None` here and nowhere else; the rest of the crate only
//! sees `Option`s.
//!
//! ## Error Handling
//!
//! A missing file or any malformed data row fails the whole load with
//! [`ReportError::SourceUnreadable`], naming the offending line. A report
//! built from half a table would silently drop days, so there is no
//! skip-and-continue mode.

use crate::{config::ColumnMap, ReportError, TideEvent, TideKind, TideRecord};
use chrono::{NaiveDate, NaiveTime};
use std::{fs::File, io::BufReader, path::PathBuf};
use tracing::debug;

/// Prefix marking an unmeasured value in the tide table
pub const UNMEASURED: &str = "--";

/// Anything tide records can be loaded from.
pub trait TableSource {
    /// Human-readable origin, used in logs and errors
    fn describe(&self) -> String;

    /// Load every record the source holds.
    fn load(&self) -> Result<Vec<TideRecord>, ReportError>;
}

/// Tide table stored as a CSV file on disk
#[derive(Debug, Clone)]
pub struct CsvSource {
    pub path: PathBuf,
    pub columns: ColumnMap,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>, columns: ColumnMap) -> Self {
        CsvSource {
            path: path.into(),
            columns,
        }
    }

    fn unreadable(&self, reason: impl Into<String>) -> ReportError {
        ReportError::SourceUnreadable {
            path: self.path.clone(),
            reason: reason.into(),
        }
    }
}

impl TableSource for CsvSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<Vec<TideRecord>, ReportError> {
        let file = File::open(&self.path).map_err(|e| self.unreadable(e.to_string()))?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(self.columns.has_header)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for result in rdr.records() {
            let row = result.map_err(|e| self.unreadable(e.to_string()))?;
            let line = row.position().map_or(0, |p| p.line());
            if row.iter().all(str::is_empty) {
                continue;
            }
            let cells: Vec<&str> = row.iter().collect();
            let record = parse_row(&cells, &self.columns)
                .map_err(|reason| self.unreadable(format!("line {line}: {reason}")))?;
            records.push(record);
        }

        debug!(
            source = %self.describe(),
            records = records.len(),
            "loaded tide table"
        );
        Ok(records)
    }
}

/// Records already in memory, e.g. from an earlier load.
impl TableSource for Vec<TideRecord> {
    fn describe(&self) -> String {
        format!("{} in-memory records", self.len())
    }

    fn load(&self) -> Result<Vec<TideRecord>, ReportError> {
        Ok(self.clone())
    }
}

/// Parse one data row using the configured column positions.
pub fn parse_row(cells: &[&str], columns: &ColumnMap) -> Result<TideRecord, String> {
    if cells.len() < columns.min_width() {
        return Err(format!(
            "expected at least {} columns, found {}",
            columns.min_width(),
            cells.len()
        ));
    }

    let station = cells[columns.station].to_string();
    if station.is_empty() {
        return Err("empty station".to_string());
    }

    let date_cell = cells[columns.date];
    let date = NaiveDate::parse_from_str(date_cell, "%Y-%m-%d")
        .map_err(|e| format!("bad date {date_cell:?}: {e}"))?;

    let mut events = [TideEvent {
        time: None,
        kind: TideKind::Other,
        depth_cm: None,
    }; 4];
    for (slot, &column) in events.iter_mut().zip(columns.events.iter()) {
        *slot = parse_event(cells[column])?;
    }

    Ok(TideRecord {
        station,
        date,
        tide_name: cells[columns.tide_name].to_string(),
        events,
        sunrise: cells[columns.sunrise].to_string(),
        sunset: cells[columns.sunset].to_string(),
    })
}

/// Parse a single `time/kind/depth` or `time/english/korean/depth` cell.
///
/// # Example
/// ```
/// use tide_report_lib::{tide_data::parse_event, TideKind};
///
/// let event = parse_event("01:20/high/고/233").unwrap();
/// assert_eq!(event.kind, TideKind::High);
/// assert_eq!(event.depth_cm, Some(233));
///
/// let unmeasured = parse_event("--:--/저/--").unwrap();
/// assert_eq!(unmeasured.time, None);
/// assert_eq!(unmeasured.depth_cm, None);
/// ```
pub fn parse_event(cell: &str) -> Result<TideEvent, String> {
    let parts: Vec<&str> = cell.split('/').map(str::trim).collect();
    let (time, kind, depth) = match parts.as_slice() {
        [time, kind, depth] => (*time, TideKind::from_token(kind), *depth),
        [time, english, korean, depth] => {
            let kind = match TideKind::from_token(english) {
                TideKind::Other => TideKind::from_token(korean),
                kind => kind,
            };
            (*time, kind, *depth)
        }
        // A bare sentinel stands for a tide that did not occur that day.
        [only] if only.starts_with(UNMEASURED) => (*only, TideKind::Other, *only),
        _ => return Err(format!("bad tide event {cell:?}")),
    };

    Ok(TideEvent {
        time: parse_time(time)?,
        kind,
        depth_cm: parse_depth(depth)?,
    })
}

fn parse_time(text: &str) -> Result<Option<NaiveTime>, String> {
    if text.starts_with(UNMEASURED) {
        return Ok(None);
    }
    NaiveTime::parse_from_str(text, "%H:%M")
        .map(Some)
        .map_err(|e| format!("bad tide time {text:?}: {e}"))
}

fn parse_depth(text: &str) -> Result<Option<i32>, String> {
    if text.starts_with(UNMEASURED) {
        return Ok(None);
    }
    text.parse::<i32>()
        .map(Some)
        .map_err(|e| format!("bad tide depth {text:?}: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const HEADER: &str = "지점,일자,1차,2차,3차,4차,음력,물때명,비고,물때,일출,일몰";

    fn write_table(rows: &[&str]) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{HEADER}").unwrap();
        for row in rows {
            writeln!(file, "{row}").unwrap();
        }
        file
    }

    #[test]
    fn parses_three_field_events() {
        let event = parse_event("14:09/저/56").unwrap();
        assert_eq!(event.time, NaiveTime::from_hms_opt(14, 9, 0));
        assert_eq!(event.kind, TideKind::Low);
        assert_eq!(event.depth_cm, Some(56));
    }

    #[test]
    fn negative_depth_is_a_value_not_a_sentinel() {
        let event = parse_event("03:10/저/-12").unwrap();
        assert_eq!(event.depth_cm, Some(-12));
        assert!(event.is_below_datum());
    }

    #[test]
    fn double_dash_is_unmeasured() {
        let event = parse_event("--/고/--5").unwrap();
        assert_eq!(event.time, None);
        assert_eq!(event.depth_cm, None);
        assert_eq!(event.kind, TideKind::High);

        let absent = parse_event("--").unwrap();
        assert_eq!(absent.time, None);
        assert_eq!(absent.kind, TideKind::Other);
    }

    #[test]
    fn english_token_wins_in_four_field_events() {
        let event = parse_event("07:51/low/고/336").unwrap();
        assert_eq!(event.kind, TideKind::Low);
        let fallback = parse_event("07:51/?/고/336").unwrap();
        assert_eq!(fallback.kind, TideKind::High);
    }

    #[test]
    fn rejects_garbage_events() {
        assert!(parse_event("07:51").is_err());
        assert!(parse_event("7pm/고/33").is_err());
        assert!(parse_event("07:51/고/deep").is_err());
    }

    #[test]
    fn loads_rows_with_default_columns() {
        let file = write_table(&[
            "대청도,2025-03-17,01:51/저/45,07:51/고/336,14:09/저/56,19:55/고/315,2025-02-18,목사리,아홉매,열물,06:41:00 AM,06:37:00 PM",
        ]);
        let records = CsvSource::new(file.path(), ColumnMap::default())
            .load()
            .unwrap();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.station, "대청도");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2025, 3, 17).unwrap());
        assert_eq!(record.tide_name, "열물");
        assert_eq!(record.events[3].depth_cm, Some(315));
        assert_eq!(record.sunrise, "06:41:00 AM");
    }

    #[test]
    fn custom_column_map_is_honoured() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "2025-03-01,A,조금,01:20/high/고/233,07:30/low/저/12,13:40/high/고/240,19:50/low/저/--,06:50,18:30").unwrap();
        let columns = ColumnMap {
            has_header: false,
            station: 1,
            date: 0,
            events: [3, 4, 5, 6],
            tide_name: 2,
            sunrise: 7,
            sunset: 8,
        };
        let records = CsvSource::new(file.path(), columns).load().unwrap();
        assert_eq!(records[0].station, "A");
        assert_eq!(records[0].tide_name, "조금");
        assert_eq!(records[0].events[3].depth_cm, None);
    }

    #[test]
    fn short_row_is_unreadable_with_line_number() {
        let file = write_table(&["인천,2025-03-01,01:20/고/233"]);
        let err = CsvSource::new(file.path(), ColumnMap::default())
            .load()
            .unwrap_err();
        match err {
            ReportError::SourceUnreadable { reason, .. } => {
                assert!(reason.starts_with("line 2:"), "{reason}")
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_unreadable() {
        let err = CsvSource::new("/nonexistent/tide.csv", ColumnMap::default())
            .load()
            .unwrap_err();
        assert!(matches!(err, ReportError::SourceUnreadable { .. }));
    }
}
