//! Paycheck projection from recurring income definitions.

use chrono::{Datelike, Duration, NaiveDate};

use super::types::{IncomeSource, PayFrequency, Paycheck, PaycheckId};
use crate::calendar::{MonthWindow, YearMonth};

/// Projects concrete paychecks from income sources.
pub struct PaycheckProjector;

impl PaycheckProjector {
    /// Paychecks of `source` falling in `month`.
    ///
    /// Inactive sources and months outside the source's effective window
    /// produce nothing.
    #[must_use]
    pub fn project(source: &IncomeSource, month: YearMonth) -> Vec<Paycheck> {
        Self::occurrence_dates(source, month)
            .into_iter()
            .map(|date| Paycheck {
                id: PaycheckId::new(source.id, date),
                income_source_id: source.id,
                user_id: source.user_id,
                name: source.name.clone(),
                amount: source.amount,
                date,
                frequency: source.frequency,
            })
            .collect()
    }

    /// Paychecks of every source across every month of the window, ordered by date.
    #[must_use]
    pub fn project_window(sources: &[IncomeSource], window: MonthWindow) -> Vec<Paycheck> {
        let mut paychecks: Vec<Paycheck> = window
            .months()
            .flat_map(|month| sources.iter().flat_map(move |s| Self::project(s, month)))
            .collect();
        paychecks.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        paychecks
    }

    /// Returns true if `source` pays on `date`.
    #[must_use]
    pub fn pays_on(source: &IncomeSource, date: NaiveDate) -> bool {
        Self::occurrence_dates(source, YearMonth::of(date)).contains(&date)
    }

    fn occurrence_dates(source: &IncomeSource, month: YearMonth) -> Vec<NaiveDate> {
        if !source.is_active {
            return Vec::new();
        }

        match source.frequency {
            PayFrequency::Monthly => monthly_date(source, month).into_iter().collect(),
            PayFrequency::Semimonthly => semimonthly_dates(source, month),
            PayFrequency::Weekly | PayFrequency::Biweekly => {
                let step = source.frequency.step_days().unwrap_or(7);
                stepped_dates(source.start_date, step, month)
                    .into_iter()
                    .filter(|d| within_end(source, *d))
                    .collect()
            }
        }
    }
}

/// Monthly pay lands on the start day clipped to the month; the window is
/// judged by month, not by exact date.
fn monthly_date(source: &IncomeSource, month: YearMonth) -> Option<NaiveDate> {
    if month < YearMonth::of(source.start_date) {
        return None;
    }
    if let Some(end) = source.end_date {
        if month > YearMonth::of(end) {
            return None;
        }
    }
    Some(month.day(source.start_date.day()))
}

/// The two pay days of a semimonthly source, in ascending order.
///
/// Without an explicit second day, start days 1-15 pair with day + 14 and
/// later start days pair with day - 14 (1st/15th, 16th/30th, ...).
fn semimonthly_days(source: &IncomeSource) -> (u32, u32) {
    let anchor = source.start_date.day();
    let other = source.second_pay_day.unwrap_or(if anchor <= 15 {
        anchor + 14
    } else {
        anchor - 14
    });
    (anchor.min(other), anchor.max(other))
}

fn semimonthly_dates(source: &IncomeSource, month: YearMonth) -> Vec<NaiveDate> {
    let (first, second) = semimonthly_days(source);
    let mut dates = vec![month.day(first), month.day(second)];
    dates.dedup();
    dates
        .into_iter()
        .filter(|d| *d >= source.start_date && within_end(source, *d))
        .collect()
}

/// Dates `anchor + k * step` (k >= 0) inside `month`.
///
/// The first in-month occurrence is found from the day offset modulo the
/// step, so the cost does not grow with the distance from the anchor.
fn stepped_dates(anchor: NaiveDate, step: i64, month: YearMonth) -> Vec<NaiveDate> {
    let first = month.first_day();
    let last = month.last_day();
    if last < anchor {
        return Vec::new();
    }

    let mut current = if anchor >= first {
        anchor
    } else {
        let offset = (first - anchor).num_days();
        first + Duration::days((step - offset.rem_euclid(step)) % step)
    };

    let mut dates = Vec::new();
    while current <= last {
        dates.push(current);
        current += Duration::days(step);
    }
    dates
}

fn within_end(source: &IncomeSource, date: NaiveDate) -> bool {
    source.end_date.is_none_or(|end| date <= end)
}
