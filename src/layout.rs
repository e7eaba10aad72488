//! Print layout sizing.
//!
//! Row heights, the moon image offset and page splitting all depend only on
//! how many days and stations the report holds. The thresholds below match
//! the printed A4 output the report was tuned against; changing them moves
//! page breaks on paper.

use serde::{Deserialize, Serialize};

/// Rows in one day block: a date/daylight row plus four event rows.
pub const ROWS_PER_DAY: usize = 5;

/// Title row and station header row, re-printed on every page.
pub const HEADER_ROWS: usize = 2;

/// Sizing for one rendered report.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayoutParams {
    /// Height of the four event rows in each day block (twips)
    pub row_height: u16,
    /// Height of the date/daylight row in each day block (twips)
    pub label_row_height: u16,
    /// Vertical nudge of the moon image within its anchor (EMU)
    pub image_offset: i32,
    /// Multiplier applied to every station column width
    pub column_width_scale: f32,
    /// Height of the title row (twips)
    pub header_row_height: u16,
    /// Day blocks per printed page when the report spans several pages
    pub page_break_every: Option<usize>,
}

/// Derive layout sizing from the number of days and stations.
///
/// # Example
/// ```
/// use tide_report_lib::layout::layout_params;
///
/// let params = layout_params(7, 4);
/// assert_eq!(params.row_height, 470);
/// assert_eq!(params.column_width_scale, 1.2);
/// assert_eq!(params.page_break_every, None);
/// ```
pub fn layout_params(day_count: usize, station_count: usize) -> LayoutParams {
    let (row_height, image_offset) = match day_count {
        0..=5 => (600, 70_000),
        6 => (540, 70_000),
        7 => (470, 0),
        8 | 9 => (400, -90_000),
        _ => (600, 70_000),
    };
    let column_width_scale = if (7..=9).contains(&day_count) { 1.2 } else { 1.0 };
    let header_row_height = if day_count >= 10 || day_count < 6 {
        800
    } else {
        640
    };
    let page_break_every = (day_count > 9).then_some(match station_count {
        8 => 8,
        5 => 6,
        _ => 5,
    });

    LayoutParams {
        row_height,
        label_row_height: 300,
        image_offset,
        column_width_scale,
        header_row_height,
        page_break_every,
    }
}

/// Day-block indices that start a new printed page (the first page is not
/// listed).
pub fn page_breaks(params: &LayoutParams, day_count: usize) -> Vec<usize> {
    match params.page_break_every {
        Some(every) if every > 0 => (every..day_count).step_by(every).collect(),
        _ => Vec::new(),
    }
}
