/// Week-bucket date math
///
/// Tasks are bucketed by the week they were created in, keyed by the
/// week's starting Sunday. This module provides the canonical start-of-week
/// computation and the archival cutoff derived from it.
///
/// A week starts on Sunday at midnight local time, inclusive: if today is
/// a Sunday, today is the week start. A task becomes archive-eligible once
/// its `week_start` falls strictly before last week's start, i.e. before
/// `current_week_start() - 7 days`.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use taskflow_shared::week::week_start_of;
///
/// // 2025-06-18 is a Wednesday; its week started Sunday 2025-06-15.
/// let wed = NaiveDate::from_ymd_opt(2025, 6, 18).unwrap();
/// assert_eq!(week_start_of(wed), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
/// ```

use chrono::{Datelike, Days, Local, NaiveDate};

/// Returns the start of the week containing `date`: the most recent Sunday,
/// inclusive of `date` itself when it is a Sunday.
pub fn week_start_of(date: NaiveDate) -> NaiveDate {
    let days_past_sunday = date.weekday().num_days_from_sunday() as u64;
    // num_days_from_sunday is 0..=6, so this cannot underflow past the
    // calendar's range for any representable date.
    date - Days::new(days_past_sunday)
}

/// Returns the start of the current week in local time.
///
/// Week buckets are date-only values; "Sunday at midnight" is implicit in
/// using a [`NaiveDate`].
pub fn current_week_start() -> NaiveDate {
    week_start_of(Local::now().date_naive())
}

/// Returns the archival cutoff for a given week start.
///
/// Tasks with `week_start < archive_cutoff(current)` belong to a week
/// strictly before last week and may be archived.
pub fn archive_cutoff(week_start: NaiveDate) -> NaiveDate {
    week_start - Days::new(7)
}
