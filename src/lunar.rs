//! Moon-phase index for report day blocks.
//!
//! Counts whole days from a known new moon and folds them into the mean
//! synodic month. Accuracy is ±1 day, which is all the 30 moon images
//! (`moon0.png` … `moon29.png`) can show anyway.

use chrono::NaiveDate;

/// Mean synodic month length in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_2;

/// New moon the day count is measured from.
pub fn reference_new_moon() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 2, 27).unwrap_or_default()
}

/// Position of `date` within the lunar cycle, 0 (new moon) to 29.
///
/// Dates before the reference new moon wrap around the cycle rather than
/// going negative.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tide_report_lib::lunar::moon_phase_index;
///
/// let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// assert_eq!(moon_phase_index(date), 2);
/// ```
pub fn moon_phase_index(date: NaiveDate) -> u8 {
    let days = (date - reference_new_moon()).num_days() as f64;
    let age = days.rem_euclid(SYNODIC_MONTH_DAYS);
    (age as u8).min(29)
}

/// File name of the image drawn for a phase index.
pub fn moon_image_name(index: u8) -> String {
    format!("moon{index}.png")
}
