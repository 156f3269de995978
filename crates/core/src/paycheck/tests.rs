//! Projection tests for paychecks.

use chrono::{Datelike, Duration, NaiveDate};
use payplan_shared::types::{IncomeSourceId, UserId};
use proptest::prelude::*;
use rust_decimal_macros::dec;

use super::projector::PaycheckProjector;
use super::types::{IncomeSource, PayFrequency, PaycheckId};
use crate::calendar::{MonthWindow, YearMonth};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ym(y: i32, m: u32) -> YearMonth {
    YearMonth::new(y, m).unwrap()
}

fn source(frequency: PayFrequency, start: NaiveDate) -> IncomeSource {
    IncomeSource {
        id: IncomeSourceId::new(),
        user_id: UserId::new(),
        name: "Salary".to_string(),
        amount: dec!(2000),
        frequency,
        start_date: start,
        end_date: None,
        second_pay_day: None,
        is_active: true,
    }
}

fn dates(source: &IncomeSource, month: YearMonth) -> Vec<NaiveDate> {
    PaycheckProjector::project(source, month)
        .into_iter()
        .map(|p| p.date)
        .collect()
}

#[test]
fn test_biweekly_january_from_first_friday() {
    let salary = source(PayFrequency::Biweekly, date(2025, 1, 3));
    let january = dates(&salary, ym(2025, 1));

    assert_eq!(&january[..2], &[date(2025, 1, 3), date(2025, 1, 17)]);
    assert_eq!(january[1] - january[0], Duration::days(14));
    // A third occurrence lands on the 31st, still inside January.
    assert_eq!(january, vec![date(2025, 1, 3), date(2025, 1, 17), date(2025, 1, 31)]);
}

#[test]
fn test_biweekly_far_from_start() {
    let salary = source(PayFrequency::Biweekly, date(2020, 1, 3));
    let got = dates(&salary, ym(2025, 3));

    for d in &got {
        assert_eq!((*d - date(2020, 1, 3)).num_days() % 14, 0);
        assert_eq!(d.month(), 3);
    }
    assert!(got.len() == 2 || got.len() == 3);
}

#[test]
fn test_weekly_every_seven_days() {
    let wage = source(PayFrequency::Weekly, date(2025, 1, 6));
    assert_eq!(
        dates(&wage, ym(2025, 2)),
        vec![date(2025, 2, 3), date(2025, 2, 10), date(2025, 2, 17), date(2025, 2, 24)]
    );
}

#[test]
fn test_nothing_before_start_month() {
    let wage = source(PayFrequency::Weekly, date(2025, 3, 10));
    assert!(dates(&wage, ym(2025, 2)).is_empty());

    let monthly = source(PayFrequency::Monthly, date(2025, 3, 10));
    assert!(dates(&monthly, ym(2025, 2)).is_empty());
}

#[test]
fn test_monthly_clips_day_to_month_length() {
    let rent_income = source(PayFrequency::Monthly, date(2025, 1, 31));
    assert_eq!(dates(&rent_income, ym(2025, 2)), vec![date(2025, 2, 28)]);
    assert_eq!(dates(&rent_income, ym(2025, 4)), vec![date(2025, 4, 30)]);
    assert_eq!(dates(&rent_income, ym(2025, 5)), vec![date(2025, 5, 31)]);
}

#[test]
fn test_monthly_respects_end_month() {
    let mut income = source(PayFrequency::Monthly, date(2025, 1, 20));
    income.end_date = Some(date(2025, 3, 5));

    assert_eq!(dates(&income, ym(2025, 3)), vec![date(2025, 3, 20)]);
    assert!(dates(&income, ym(2025, 4)).is_empty());
}

#[test]
fn test_semimonthly_first_and_fifteenth() {
    let salary = source(PayFrequency::Semimonthly, date(2025, 1, 1));
    assert_eq!(
        dates(&salary, ym(2025, 2)),
        vec![date(2025, 2, 1), date(2025, 2, 15)]
    );
}

#[test]
fn test_semimonthly_late_anchor_pairs_earlier_day() {
    let salary = source(PayFrequency::Semimonthly, date(2025, 1, 30));
    assert_eq!(
        dates(&salary, ym(2025, 2)),
        vec![date(2025, 2, 16), date(2025, 2, 28)]
    );
    // Start month drops the day before the start date.
    assert_eq!(dates(&salary, ym(2025, 1)), vec![date(2025, 1, 30)]);
}

#[test]
fn test_semimonthly_explicit_second_day_and_end_date() {
    let mut salary = source(PayFrequency::Semimonthly, date(2025, 1, 15));
    salary.second_pay_day = Some(31);
    salary.end_date = Some(date(2025, 4, 20));

    assert_eq!(
        dates(&salary, ym(2025, 2)),
        vec![date(2025, 2, 15), date(2025, 2, 28)]
    );
    assert_eq!(dates(&salary, ym(2025, 4)), vec![date(2025, 4, 15)]);
}

#[test]
fn test_inactive_source_projects_nothing() {
    let mut salary = source(PayFrequency::Weekly, date(2025, 1, 3));
    salary.is_active = false;
    assert!(PaycheckProjector::project(&salary, ym(2025, 1)).is_empty());
}

#[test]
fn test_weekly_end_date_clips_mid_month() {
    let mut wage = source(PayFrequency::Weekly, date(2025, 1, 6));
    wage.end_date = Some(date(2025, 2, 12));
    assert_eq!(
        dates(&wage, ym(2025, 2)),
        vec![date(2025, 2, 3), date(2025, 2, 10)]
    );
}

#[test]
fn test_paycheck_fields_come_from_source() {
    let salary = source(PayFrequency::Monthly, date(2025, 1, 15));
    let paychecks = PaycheckProjector::project(&salary, ym(2025, 6));

    assert_eq!(paychecks.len(), 1);
    let paycheck = &paychecks[0];
    assert_eq!(paycheck.id, PaycheckId::new(salary.id, date(2025, 6, 15)));
    assert_eq!(paycheck.income_source_id, salary.id);
    assert_eq!(paycheck.user_id, salary.user_id);
    assert_eq!(paycheck.amount, dec!(2000));
    assert_eq!(paycheck.name, "Salary");
    assert_eq!(paycheck.frequency, PayFrequency::Monthly);
}

#[test]
fn test_project_window_orders_by_date() {
    let a = source(PayFrequency::Monthly, date(2025, 1, 20));
    let b = source(PayFrequency::Monthly, date(2025, 1, 5));
    let window = MonthWindow::new(ym(2025, 1), 1).unwrap();

    let got: Vec<_> = PaycheckProjector::project_window(&[a, b], window)
        .into_iter()
        .map(|p| p.date)
        .collect();

    assert_eq!(
        got,
        vec![date(2025, 1, 5), date(2025, 1, 20), date(2025, 2, 5), date(2025, 2, 20)]
    );
}

#[test]
fn test_pays_on() {
    let salary = source(PayFrequency::Biweekly, date(2025, 1, 3));
    assert!(PaycheckProjector::pays_on(&salary, date(2025, 1, 17)));
    assert!(!PaycheckProjector::pays_on(&salary, date(2025, 1, 10)));
    assert!(!PaycheckProjector::pays_on(&salary, date(2024, 12, 20)));
}

#[test]
fn test_paycheck_id_round_trips_through_string() {
    let id = PaycheckId::new(IncomeSourceId::new(), date(2025, 1, 17));
    let text = id.to_string();
    assert!(text.ends_with(":2025-01-17"));
    assert_eq!(text.parse::<PaycheckId>().unwrap(), id);

    let json = serde_json::to_value(id).unwrap();
    assert_eq!(json, serde_json::Value::String(text));
}

#[test]
fn test_paycheck_id_rejects_garbage() {
    assert!("not-a-paycheck".parse::<PaycheckId>().is_err());
    assert!(
        format!("{}:2025-02-30", IncomeSourceId::new())
            .parse::<PaycheckId>()
            .is_err()
    );
}

fn frequency_strategy() -> impl Strategy<Value = PayFrequency> {
    prop_oneof![
        Just(PayFrequency::Weekly),
        Just(PayFrequency::Biweekly),
        Just(PayFrequency::Semimonthly),
        Just(PayFrequency::Monthly),
    ]
}

proptest! {
    /// Projecting twice yields the same ids and amounts.
    #[test]
    fn prop_projection_is_stable(
        frequency in frequency_strategy(),
        start_offset in 0i64..3650,
        year in 2015i32..2035,
        month in 1u32..=12,
    ) {
        let salary = source(frequency, date(2015, 1, 1) + Duration::days(start_offset));
        let first = PaycheckProjector::project(&salary, ym(year, month));
        let second = PaycheckProjector::project(&salary, ym(year, month));
        prop_assert_eq!(first, second);
    }

    /// Every projected date lies in the requested month and on or after the start date.
    #[test]
    fn prop_dates_inside_month(
        frequency in frequency_strategy(),
        start_offset in 0i64..3650,
        year in 2015i32..2035,
        month in 1u32..=12,
    ) {
        let salary = source(frequency, date(2015, 1, 1) + Duration::days(start_offset));
        let target = ym(year, month);
        for paycheck in PaycheckProjector::project(&salary, target) {
            prop_assert!(target.contains(paycheck.date));
            prop_assert!(paycheck.date >= salary.start_date || frequency == PayFrequency::Monthly);
            prop_assert_eq!(paycheck.id, PaycheckId::new(salary.id, paycheck.date));
        }
    }

    /// Stepped frequencies agree with a plain walk from the start date.
    #[test]
    fn prop_stepped_matches_walk(
        biweekly in any::<bool>(),
        start_offset in 0i64..1500,
        year in 2015i32..2020,
        month in 1u32..=12,
    ) {
        let frequency = if biweekly { PayFrequency::Biweekly } else { PayFrequency::Weekly };
        let step = if biweekly { 14 } else { 7 };
        let salary = source(frequency, date(2015, 1, 1) + Duration::days(start_offset));
        let target = ym(year, month);

        let mut expected = Vec::new();
        let mut current = salary.start_date;
        while current <= target.last_day() {
            if target.contains(current) {
                expected.push(current);
            }
            current += Duration::days(step);
        }

        prop_assert_eq!(dates(&salary, target), expected);
    }
}
