//! Resolution of `[M/D-M/D]` sprint labels into calendar windows.
//!
//! Sprint names carry a month/day range but no year. The year is inferred
//! relative to "now": a date more than [`DAY_THRESHOLD`] days away in either
//! direction is assumed to belong to the neighbouring year.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use regex::Regex;
use std::sync::LazyLock;

use sprintcap_core::Clock;

/// Days beyond which a resolved date is shifted by one year toward "now".
pub const DAY_THRESHOLD: f64 = 180.0;

static WINDOW_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d{1,2})/(\d{1,2})-(\d{1,2})/(\d{1,2})\]").expect("valid sprint window regex")
});

/// Inclusive start and end dates of a sprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DateWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateWindow {
    /// Parse a sprint label against the given clock.
    pub fn parse(label: &str, clock: &dyn Clock) -> Option<Self> {
        parse_window(label, clock.now())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Month and day as written in the label, kept so that year shifts rebuild
/// the date from what the user typed.
#[derive(Debug, Clone, Copy)]
struct MonthDay {
    month: u32,
    day: u32,
}

impl MonthDay {
    fn new(month: u32, day: u32) -> Option<Self> {
        // Validate against a leap year so 2/29 is accepted.
        NaiveDate::from_ymd_opt(2000, month, day)?;
        Some(Self { month, day })
    }

    /// The date in `year`. February 29 in a non-leap year rolls to March 1.
    fn in_year(&self, year: i32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(year, self.month, self.day).or_else(|| {
            if self.month == 2 && self.day == 29 {
                NaiveDate::from_ymd_opt(year, 3, 1)
            } else {
                None
            }
        })
    }
}

/// Find the first `[M/D-M/D]` token in `label` and resolve it to absolute
/// dates relative to `now`. Returns `None` when no token is present or the
/// token names a month or day that does not exist.
pub fn parse_window(label: &str, now: NaiveDateTime) -> Option<DateWindow> {
    let caps = WINDOW_RE.captures(label)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let start_md = MonthDay::new(number(1)?, number(2)?)?;
    let end_md = MonthDay::new(number(3)?, number(4)?)?;

    let current_year = now.year();
    let mut start = start_md.in_year(current_year)?;
    let mut end = end_md.in_year(current_year)?;

    if end < start {
        end = end_md.in_year(current_year + 1)?;
    }

    start = adjust_toward(start_md, start, now)?;
    end = adjust_toward(end_md, end, now)?;

    if end < start {
        end = end_md.in_year(end.year() + 1)?;
    }

    Some(DateWindow { start, end })
}

fn adjust_toward(md: MonthDay, date: NaiveDate, now: NaiveDateTime) -> Option<NaiveDate> {
    let days = days_between(now, date);
    if days > DAY_THRESHOLD {
        md.in_year(date.year() - 1)
    } else if days < -DAY_THRESHOLD {
        md.in_year(date.year() + 1)
    } else {
        Some(date)
    }
}

/// Fractional days from `now` to local midnight of `date`.
fn days_between(now: NaiveDateTime, date: NaiveDate) -> f64 {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    (midnight - now).num_milliseconds() as f64 / 86_400_000.0
}
