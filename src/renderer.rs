//! # Report Rendering
//!
//! This module draws an assembled [`ReportGrid`] in three forms:
//! - **Terminal**: a bordered text table for checking a report without
//!   opening any files (`--stdout`)
//! - **Document**: the printable sheet as rows of cells, written out as CSV
//! - **JSON**: the grid and its layout for other tools
//!
//! The document keeps the printed report's shape: a title row, a station
//! header row with two columns per station, then a five-row block per day
//! (date and daylight on the first row, one tide event per following row).
//! When the report spans several pages the two header rows are repeated at
//! the top of each page.

use crate::{
    assembler::{DayBlock, FormattedEvent, ReportGrid},
    layout::{page_breaks, LayoutParams, HEADER_ROWS, ROWS_PER_DAY},
    lunar::moon_image_name,
    TideKind,
};
use comfy_table::{Cell, Table};
use serde::Serialize;
use std::io;

/// Sheet title shown in the first row
pub const SHEET_TITLE: &str = "조석표";

/// Rows of cells making up the printable document.
pub type Document = Vec<Vec<String>>;

/// Render the report as a plain text table, one table per printed page.
///
/// Cells are sized by display width, so Hangul station names and the dash
/// glyph take two terminal columns and the borders still line up.
pub fn ascii_report(grid: &ReportGrid, layout: &LayoutParams) -> String {
    let mut out = format!("{SHEET_TITLE}  {}\n", grid.title_range());
    let breaks = page_breaks(layout, grid.days.len());

    let mut pages: Vec<Table> = Vec::new();
    for (index, day) in grid.days.iter().enumerate() {
        if index == 0 || breaks.contains(&index) {
            pages.push(page_table(&grid.stations));
        }
        if let Some(table) = pages.last_mut() {
            table.add_row(ascii_day(day, &grid.stations));
        }
    }
    if pages.is_empty() {
        pages.push(page_table(&grid.stations));
    }

    let tables: Vec<String> = pages.iter().map(Table::to_string).collect();
    out.push_str(&tables.join("\n\n"));
    out.push('\n');
    out
}

/// Print the report table to stdout.
pub fn draw_ascii(grid: &ReportGrid, layout: &LayoutParams) {
    print!("{}", ascii_report(grid, layout));
}

fn page_table(stations: &[String]) -> Table {
    let mut table = Table::new();
    let mut header = vec![Cell::new("")];
    header.extend(stations.iter().map(Cell::new));
    table.set_header(header);
    table
}

fn ascii_day(day: &DayBlock, stations: &[String]) -> Vec<Cell> {
    let label = format!(
        "{}\n{}\nmoon {:>2}",
        day.label, day.tide_name, day.moon_phase
    );
    let mut cells = vec![Cell::new(label)];
    for station in stations {
        let text = day
            .row(station)
            .map(|row| {
                let mut lines = vec![row.daylight()];
                lines.extend(row.events.iter().map(ascii_event));
                lines.join("\n")
            })
            .unwrap_or_default();
        cells.push(Cell::new(text));
    }
    cells
}

fn ascii_event(event: &FormattedEvent) -> String {
    let marker = match event.kind {
        TideKind::High => '▲',
        TideKind::Low => '▼',
        TideKind::Other => ' ',
    };
    let datum = if event.below_datum { "*" } else { "" };
    format!("{} {marker} {}{datum}", event.time, event.depth)
}

/// Lay the report out as sheet rows.
///
/// # Example
/// ```no_run
/// use tide_report_lib::{assembler, layout, renderer, tide_data::CsvSource};
/// use tide_report_lib::config::ColumnMap;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// # let (start, end) = (chrono::NaiveDate::MIN, chrono::NaiveDate::MIN);
/// let source = CsvSource::new("TIDE.csv", ColumnMap::default());
/// let grid = assembler::assemble(start, end, &["인천".to_string()], &source)?;
/// let params = layout::layout_params(grid.days.len(), grid.stations.len());
/// let rows = renderer::render_document(&grid, &params);
/// renderer::write_document_csv(&rows, std::io::stdout())?;
/// # Ok(())
/// # }
/// ```
pub fn render_document(grid: &ReportGrid, layout: &LayoutParams) -> Document {
    let width = 1 + 2 * grid.stations.len();
    let blank_row = || vec![String::new(); width];

    let mut title = blank_row();
    title[0] = SHEET_TITLE.to_string();
    if width > 1 {
        title[1] = grid.title_range();
    }

    let mut header = blank_row();
    for (column, station) in grid.stations.iter().enumerate() {
        header[1 + 2 * column] = station.clone();
    }

    let breaks = page_breaks(layout, grid.days.len());
    let mut rows = Vec::with_capacity(HEADER_ROWS + grid.days.len() * ROWS_PER_DAY);
    for (index, day) in grid.days.iter().enumerate() {
        if index == 0 || breaks.contains(&index) {
            rows.push(title.clone());
            rows.push(header.clone());
        }

        let mut block: Vec<Vec<String>> = (0..ROWS_PER_DAY).map(|_| blank_row()).collect();
        block[0][0] = day.label.clone();
        block[1][0] = day.tide_name.clone();
        block[2][0] = moon_image_name(day.moon_phase);
        for (column, station) in grid.stations.iter().enumerate() {
            let Some(row) = day.row(station) else {
                continue;
            };
            let cell = 1 + 2 * column;
            block[0][cell] = row.daylight();
            for (slot, event) in row.events.iter().enumerate() {
                block[slot + 1][cell] = event.time.clone();
                block[slot + 1][cell + 1] = event.depth.clone();
            }
        }
        rows.extend(block);
    }
    if rows.is_empty() {
        rows.push(title);
        rows.push(header);
    }
    rows
}

/// Write document rows as CSV.
pub fn write_document_csv<W: io::Write>(rows: &Document, writer: W) -> csv::Result<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for row in rows {
        wtr.write_record(row)?;
    }
    wtr.flush()?;
    Ok(())
}

#[derive(Serialize)]
struct Export<'a> {
    layout: &'a LayoutParams,
    report: &'a ReportGrid,
}

/// Serialise the grid together with its layout.
pub fn to_json(grid: &ReportGrid, layout: &LayoutParams) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Export {
        layout,
        report: grid,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{assembler::ReportAssembler, layout::layout_params, TideEvent, TideRecord};
    use chrono::{Duration, NaiveDate, NaiveTime};

    fn grid(days: i64, stations: &[&str]) -> ReportGrid {
        let start = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let mut records = Vec::new();
        for offset in 0..days {
            for station in stations {
                records.push(TideRecord {
                    station: station.to_string(),
                    date: start + Duration::days(offset),
                    tide_name: "한물".to_string(),
                    events: [
                        TideEvent {
                            time: NaiveTime::from_hms_opt(1, 20, 0),
                            kind: TideKind::High,
                            depth_cm: Some(233),
                        },
                        TideEvent {
                            time: NaiveTime::from_hms_opt(7, 30, 0),
                            kind: TideKind::Low,
                            depth_cm: Some(-5),
                        },
                        TideEvent {
                            time: NaiveTime::from_hms_opt(13, 40, 0),
                            kind: TideKind::High,
                            depth_cm: Some(240),
                        },
                        TideEvent {
                            time: None,
                            kind: TideKind::Low,
                            depth_cm: None,
                        },
                    ],
                    sunrise: "06:50".to_string(),
                    sunset: "18:30".to_string(),
                });
            }
        }
        let ids: Vec<String> = stations.iter().map(|s| s.to_string()).collect();
        ReportAssembler::default()
            .assemble(start, start + Duration::days(days - 1), &ids, &records)
            .unwrap()
    }

    #[test]
    fn document_has_header_and_five_rows_per_day() {
        let grid = grid(3, &["A", "B"]);
        let params = layout_params(3, 2);
        let rows = render_document(&grid, &params);

        assert_eq!(rows.len(), HEADER_ROWS + 3 * ROWS_PER_DAY);
        assert!(rows.iter().all(|row| row.len() == 5));
        assert_eq!(rows[0][0], SHEET_TITLE);
        assert_eq!(rows[0][1], "3. 1.(토) ~ 3. 3.(월) / 3일간");
        assert_eq!(rows[1], ["", "A", "", "B", ""]);
        assert_eq!(rows[2][0], "3. 1.(토)");
        assert_eq!(rows[2][1], "06:50 ~ 18:30");
        assert_eq!(rows[3][0], "한물");
        assert_eq!(rows[4][0], "moon2.png");
        assert_eq!(rows[3][1..3], ["01:20", "233cm"]);
        assert_eq!(rows[6][3..5], ["ㅡ", "ㅡ"]);
    }

    #[test]
    fn long_reports_repeat_headers_per_page() {
        let grid = grid(12, &["A"]);
        let params = layout_params(12, 1);
        let rows = render_document(&grid, &params);

        // Pages start at day 0, 5 and 10.
        assert_eq!(rows.len(), 3 * HEADER_ROWS + 12 * ROWS_PER_DAY);
        let title_rows: Vec<usize> = rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row[0] == SHEET_TITLE)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(title_rows, vec![0, 27, 54]);
    }

    #[test]
    fn csv_output_contains_every_row() {
        let grid = grid(1, &["A"]);
        let rows = render_document(&grid, &layout_params(1, 1));
        let mut buf = Vec::new();
        write_document_csv(&rows, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), HEADER_ROWS + ROWS_PER_DAY);
        assert!(text.contains("01:20,233cm"));
    }

    #[test]
    fn ascii_marks_kinds_and_negative_depths() {
        let grid = grid(1, &["A"]);
        let text = ascii_report(&grid, &layout_params(1, 1));
        assert!(text.contains("01:20 ▲ 233cm"));
        assert!(text.contains("07:30 ▼ -5cm*"));
        assert!(text.contains("moon  2"));
    }

    /// Columns counted the way a terminal draws them: Hangul is two wide.
    fn display_width(line: &str) -> usize {
        line.chars()
            .map(|c| match c as u32 {
                0x3130..=0x318F | 0xAC00..=0xD7A3 => 2,
                _ => 1,
            })
            .sum()
    }

    #[test]
    fn ascii_borders_line_up_with_hangul_stations() {
        let grid = grid(2, &["인천", "B"]);
        let text = ascii_report(&grid, &layout_params(2, 2));
        let widths: Vec<usize> = text.lines().skip(1).map(display_width).collect();

        assert!(text.contains("인천"));
        assert!(widths.len() > 10);
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}\n{text}");
    }

    #[test]
    fn ascii_repeats_header_per_page() {
        let grid = grid(12, &["A"]);
        let text = ascii_report(&grid, &layout_params(12, 1));
        assert_eq!(text.matches("3. 1.(토)").count(), 2);
        assert_eq!(text.split("\n\n").count(), 3);
    }

    #[test]
    fn json_export_carries_layout_and_days() {
        let grid = grid(2, &["A"]);
        let json = to_json(&grid, &layout_params(2, 1)).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["layout"]["row_height"], 600);
        assert_eq!(value["report"]["days"].as_array().unwrap().len(), 2);
        assert_eq!(value["report"]["days"][0]["moon_phase"], 2);
    }
}
