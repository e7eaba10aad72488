//! # Date Range Selection
//!
//! Turns a stream of calendar day clicks into a `(start, end)` range. The
//! state is a plain value: every click produces a fresh [`DateSelection`]
//! from the previous one via [`transition`], so there is nothing to lock or
//! reconcile between UI events.
//!
//! ## States
//! - **Empty**: nothing picked yet
//! - **Start only**: first endpoint picked, waiting for the second
//! - **Complete**: both endpoints picked, `start <= end`
//!
//! A click earlier than the start, or any click on a complete range, starts
//! over at the clicked day. Clicking the start again collapses back to a
//! single point.

use crate::weekday_label;
use chrono::{Datelike, Duration, NaiveDate};

/// The user's current pick, replaced wholesale on every click.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct DateSelection {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateSelection {
    /// Days from start to end (inclusive count minus one), once both are set.
    pub fn days_between(&self) -> Option<i64> {
        match (self.start, self.end) {
            (Some(start), Some(end)) => Some((end - start).num_days()),
            _ => None,
        }
    }

    /// Both endpoints, once the range is complete.
    pub fn range(&self) -> Option<(NaiveDate, NaiveDate)> {
        Some((self.start?, self.end?))
    }

    /// "2025. 03. 01. (토) ~ 2025. 03. 05. (수)", or `None` while incomplete.
    pub fn display_text(&self) -> Option<String> {
        let (start, end) = self.range()?;
        Some(format!("{} ~ {}", long_label(start), long_label(end)))
    }
}

fn long_label(date: NaiveDate) -> String {
    format!("{}. ({})", date.format("%Y. %m. %d"), weekday_label(date))
}

/// Apply one day click to the current selection.
///
/// # Example
/// ```
/// use chrono::NaiveDate;
/// use tide_report_lib::selection::{transition, DateSelection};
///
/// let mar1 = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
/// let mar5 = NaiveDate::from_ymd_opt(2025, 3, 5).unwrap();
///
/// let picked = transition(mar5, transition(mar1, DateSelection::default()));
/// assert_eq!(picked.range(), Some((mar1, mar5)));
/// ```
pub fn transition(clicked: NaiveDate, current: DateSelection) -> DateSelection {
    let restart = DateSelection {
        start: Some(clicked),
        end: None,
    };
    let Some(start) = current.start else {
        return restart;
    };
    if clicked < start || current.end.is_some() {
        restart
    } else if clicked != start {
        DateSelection {
            start: Some(start),
            end: Some(clicked),
        }
    } else {
        restart
    }
}

/// Reset to the empty selection.
pub fn clear() -> DateSelection {
    DateSelection::default()
}

/// True when `date` lies strictly inside the range.
pub fn is_between(date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    start < date && date < end
}

/// Shading rule for the leading days a month grid borrows from the previous
/// month. `in_date` is one of those borrowed cells.
pub fn is_in_date_between(in_date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    if same_month(start, end) {
        return false;
    }
    if same_month(in_date, start) {
        return true;
    }
    let first = first_of_month(in_date);
    start <= first && first <= end && first != start
}

/// Shading rule for the trailing days a month grid borrows from the next
/// month. `out_date` is one of those borrowed cells.
pub fn is_out_date_between(out_date: NaiveDate, start: NaiveDate, end: NaiveDate) -> bool {
    if same_month(start, end) {
        return false;
    }
    if same_month(out_date, end) {
        return true;
    }
    let last = last_of_month(out_date);
    start <= last && last <= end && last != end
}

fn same_month(a: NaiveDate, b: NaiveDate) -> bool {
    a.year() == b.year() && a.month() == b.month()
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let first = first_of_month(date);
    // 31 days past the 1st is always in the following month.
    let next = first + Duration::days(31);
    first_of_month(next) - Duration::days(1)
}
