//! Week-start arithmetic.

use chrono::{Datelike, Days, NaiveDate};

/// Snap `date` to the Monday of its ISO week.
///
/// Demand, locks, and solutions are all keyed by this Monday date.
pub fn week_start_monday(date: NaiveDate) -> NaiveDate {
  let back = date.weekday().num_days_from_monday();
  date - Days::new(u64::from(back))
}
