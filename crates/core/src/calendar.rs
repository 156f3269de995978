//! Month and day arithmetic on explicit (year, month, day) integers.
//!
//! Every date computation in planning goes through [`YearMonth`] and
//! [`MonthWindow`] so that clipping rules live in one place.

use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use thiserror::Error;

/// Smallest accepted year (four digits).
pub const MIN_YEAR: i32 = 1000;

/// Largest accepted year (four digits).
pub const MAX_YEAR: i32 = 9999;

/// Calendar input errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalendarError {
    /// Month outside 1-12.
    #[error("month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    /// Year is not a four-digit year.
    #[error("year must be between {MIN_YEAR} and {MAX_YEAR}, got {0}")]
    YearOutOfRange(i32),

    /// Lookahead pushes the window past the last supported year.
    #[error("lookahead of {0} months runs past year {MAX_YEAR}")]
    WindowOverflow(u32),
}

/// Returns true if `year` is a Gregorian leap year.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
}

/// Number of days in `month` of `year`. `month` must be 1-12.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// A validated calendar month.
///
/// Field order gives chronological `Ord`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    /// Creates a month, rejecting years outside four digits and months outside 1-12.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError` when either component is out of range.
    pub const fn new(year: i32, month: u32) -> Result<Self, CalendarError> {
        if year < MIN_YEAR || year > MAX_YEAR {
            return Err(CalendarError::YearOutOfRange(year));
        }
        if month < 1 || month > 12 {
            return Err(CalendarError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// The month a date falls in.
    #[must_use]
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Year component.
    #[must_use]
    pub const fn year(self) -> i32 {
        self.year
    }

    /// Month component, 1-12.
    #[must_use]
    pub const fn month(self) -> u32 {
        self.month
    }

    /// Number of days in this month.
    #[must_use]
    pub const fn days(self) -> u32 {
        days_in_month(self.year, self.month)
    }

    /// First day of the month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.day(1)
    }

    /// Last day of the month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.day(self.days())
    }

    /// The given day of this month, clipped into `1..=days()`.
    ///
    /// Day 31 in February yields the 28th (or 29th in leap years).
    #[must_use]
    pub fn day(self, day: u32) -> NaiveDate {
        let day = day.clamp(1, self.days());
        // Components are range-checked at construction and the day is clamped.
        NaiveDate::from_ymd_opt(self.year, self.month, day).unwrap_or(NaiveDate::MIN)
    }

    /// Returns true if the date falls within this month.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        Self::of(date) == self
    }

    /// The month `n` months later, or `None` past [`MAX_YEAR`].
    #[must_use]
    pub fn checked_add_months(self, n: u32) -> Option<Self> {
        let index = i64::from(self.year) * 12 + i64::from(self.month - 1) + i64::from(n);
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u32::try_from(index.rem_euclid(12)).ok()? + 1;
        Self::new(year, month).ok()
    }

    /// The month immediately after this one.
    #[must_use]
    pub fn following(self) -> Option<Self> {
        self.checked_add_months(1)
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// An inclusive run of months: the target month plus `lookahead` further months.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthWindow {
    start: YearMonth,
    end: YearMonth,
}

impl MonthWindow {
    /// Builds the window `[start, start + lookahead]`.
    ///
    /// # Errors
    ///
    /// Returns `CalendarError::WindowOverflow` if the end month is past [`MAX_YEAR`].
    pub fn new(start: YearMonth, lookahead: u32) -> Result<Self, CalendarError> {
        let end = start
            .checked_add_months(lookahead)
            .ok_or(CalendarError::WindowOverflow(lookahead))?;
        Ok(Self { start, end })
    }

    /// A window covering a single month.
    #[must_use]
    pub const fn single(month: YearMonth) -> Self {
        Self {
            start: month,
            end: month,
        }
    }

    /// First month of the window.
    #[must_use]
    pub const fn start(self) -> YearMonth {
        self.start
    }

    /// Last month of the window.
    #[must_use]
    pub const fn end(self) -> YearMonth {
        self.end
    }

    /// First day of the first month.
    #[must_use]
    pub fn first_day(self) -> NaiveDate {
        self.start.first_day()
    }

    /// Last day of the last month.
    #[must_use]
    pub fn last_day(self) -> NaiveDate {
        self.end.last_day()
    }

    /// Returns true if the month lies within the window.
    #[must_use]
    pub fn includes(self, month: YearMonth) -> bool {
        month >= self.start && month <= self.end
    }

    /// Returns true if the date lies within the window.
    #[must_use]
    pub fn contains(self, date: NaiveDate) -> bool {
        self.includes(YearMonth::of(date))
    }

    /// Months in chronological order.
    pub fn months(self) -> impl Iterator<Item = YearMonth> {
        std::iter::successors(Some(self.start), move |m| {
            m.following().filter(|next| *next <= self.end)
        })
    }
}
