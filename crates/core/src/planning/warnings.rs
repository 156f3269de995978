//! Warnings derived from paychecks and resolved planning records.
//!
//! A warning is identified by its type plus a key built from the entities
//! that trigger it:
//!
//! | Type | Key |
//! |------|-----|
//! | `unfunded_debt` | `<debt_id>:<YYYY-MM>` |
//! | `insufficient_funds` | `<paycheck_id>` |
//! | `debt_due_before_income` | `<debt_id>:<YYYY-MM>:<paycheck_id>` |
//! | `no_income` | `<YYYY-MM>` |
//!
//! Moving a debt to another paycheck changes the key, so an old dismissal
//! does not hide the new timing problem.

use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use payplan_shared::types::{DebtId, PlanningRecordId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{DismissedWarning, PaycheckView, PlannedDebt};
use crate::calendar::{MonthWindow, YearMonth};
use crate::paycheck::PaycheckId;

/// Longest accepted warning key, in characters.
pub const MAX_WARNING_KEY_LEN: usize = 255;

/// Warning discriminator, as stored with dismissals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningType {
    /// Active planning record with no paycheck.
    UnfundedDebt,
    /// Paycheck allocated beyond its amount.
    InsufficientFunds,
    /// Payment date precedes the funding paycheck.
    DebtDueBeforeIncome,
    /// Month with debts but no projected income.
    NoIncome,
}

impl WarningType {
    /// Stable snake_case name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::UnfundedDebt => "unfunded_debt",
            Self::InsufficientFunds => "insufficient_funds",
            Self::DebtDueBeforeIncome => "debt_due_before_income",
            Self::NoIncome => "no_income",
        }
    }
}

impl fmt::Display for WarningType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WarningType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unfunded_debt" => Ok(Self::UnfundedDebt),
            "insufficient_funds" => Ok(Self::InsufficientFunds),
            "debt_due_before_income" => Ok(Self::DebtDueBeforeIncome),
            "no_income" => Ok(Self::NoIncome),
            other => Err(format!("unknown warning type: {other}")),
        }
    }
}

/// Typed payload of a warning, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WarningKind {
    /// An active planning record has no allocation.
    UnfundedDebt {
        /// Planning record.
        planning_record_id: PlanningRecordId,
        /// Debt.
        debt_id: DebtId,
        /// Debt name.
        debt_name: String,
        /// Planned month.
        period: YearMonth,
        /// Due date of the record.
        due_date: NaiveDate,
        /// Amount left unfunded.
        amount: Decimal,
    },
    /// A paycheck's allocations exceed its amount.
    InsufficientFunds {
        /// Paycheck.
        paycheck_id: PaycheckId,
        /// Pay date.
        paycheck_date: NaiveDate,
        /// Paycheck amount.
        paycheck_amount: Decimal,
        /// Sum allocated to it.
        allocated_total: Decimal,
        /// Allocated total minus amount.
        shortfall: Decimal,
    },
    /// An unpaid allocation is due before its paycheck arrives.
    DebtDueBeforeIncome {
        /// Planning record.
        planning_record_id: PlanningRecordId,
        /// Debt.
        debt_id: DebtId,
        /// Debt name.
        debt_name: String,
        /// Funding paycheck.
        paycheck_id: PaycheckId,
        /// Effective payment date.
        due_date: NaiveDate,
        /// Pay date.
        paycheck_date: NaiveDate,
    },
    /// A month has active debts but no paychecks.
    NoIncome {
        /// Month.
        period: YearMonth,
        /// Active planning records in the month.
        debt_count: usize,
        /// Sum of their effective amounts.
        total_due: Decimal,
    },
}

impl WarningKind {
    /// The discriminator of this payload.
    #[must_use]
    pub const fn warning_type(&self) -> WarningType {
        match self {
            Self::UnfundedDebt { .. } => WarningType::UnfundedDebt,
            Self::InsufficientFunds { .. } => WarningType::InsufficientFunds,
            Self::DebtDueBeforeIncome { .. } => WarningType::DebtDueBeforeIncome,
            Self::NoIncome { .. } => WarningType::NoIncome,
        }
    }
}

/// A derived, dismissable risk signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Warning {
    /// Stable identity within the warning type.
    pub key: String,
    /// Human-readable description.
    pub message: String,
    /// Typed payload.
    #[serde(flatten)]
    pub kind: WarningKind,
}

impl Warning {
    /// The warning's type.
    #[must_use]
    pub const fn warning_type(&self) -> WarningType {
        self.kind.warning_type()
    }
}

/// Derives warnings from a resolved planning window.
pub struct WarningsEngine;

impl WarningsEngine {
    /// Computes every warning for the window.
    ///
    /// Hidden planning records are ignored. Paycheck totals are taken as
    /// given, so they must already count records outside the window that
    /// the paycheck funds. Output is grouped by type in the order unfunded,
    /// due-before-income, insufficient funds, no income.
    #[must_use]
    pub fn compute(
        paychecks: &[PaycheckView],
        debts: &[PlannedDebt],
        window: MonthWindow,
    ) -> Vec<Warning> {
        let active: Vec<&PlannedDebt> = debts.iter().filter(|d| d.is_active).collect();

        let mut warnings = Vec::new();
        warnings.extend(active.iter().filter_map(|d| unfunded(d)));
        warnings.extend(active.iter().filter_map(|d| due_before_income(d)));
        warnings.extend(insufficient_funds(paychecks));
        warnings.extend(no_income(paychecks, &active, window));
        warnings
    }

    /// Drops warnings whose (type, key) has been dismissed.
    #[must_use]
    pub fn filter_dismissed(warnings: Vec<Warning>, dismissed: &[DismissedWarning]) -> Vec<Warning> {
        let suppressed: HashSet<(WarningType, &str)> = dismissed
            .iter()
            .map(|d| (d.warning_type, d.warning_key.as_str()))
            .collect();

        warnings
            .into_iter()
            .filter(|w| !suppressed.contains(&(w.warning_type(), w.key.as_str())))
            .collect()
    }
}

fn period_of(debt: &PlannedDebt) -> YearMonth {
    YearMonth::of(debt.due_date)
}

fn unfunded(debt: &PlannedDebt) -> Option<Warning> {
    if debt.allocation.is_some() {
        return None;
    }
    let period = period_of(debt);
    Some(Warning {
        key: format!("{}:{period}", debt.debt_id),
        message: format!(
            "{} ({}) due {} has no paycheck assigned",
            debt.name, debt.amount, debt.due_date
        ),
        kind: WarningKind::UnfundedDebt {
            planning_record_id: debt.planning_record_id,
            debt_id: debt.debt_id,
            debt_name: debt.name.clone(),
            period,
            due_date: debt.due_date,
            amount: debt.amount,
        },
    })
}

fn due_before_income(debt: &PlannedDebt) -> Option<Warning> {
    let allocation = debt.allocation.as_ref()?;
    if allocation.is_paid {
        return None;
    }
    let paycheck_date = allocation.paycheck_id.date();
    if debt.payment_date >= paycheck_date {
        return None;
    }
    let period = period_of(debt);
    Some(Warning {
        key: format!("{}:{period}:{}", debt.debt_id, allocation.paycheck_id),
        message: format!(
            "{} is due {} but its paycheck arrives {}",
            debt.name, debt.payment_date, paycheck_date
        ),
        kind: WarningKind::DebtDueBeforeIncome {
            planning_record_id: debt.planning_record_id,
            debt_id: debt.debt_id,
            debt_name: debt.name.clone(),
            paycheck_id: allocation.paycheck_id,
            due_date: debt.payment_date,
            paycheck_date,
        },
    })
}

fn insufficient_funds(paychecks: &[PaycheckView]) -> Vec<Warning> {
    paychecks
        .iter()
        .filter(|view| view.allocated_total > view.paycheck.amount)
        .map(|view| {
            let paycheck = &view.paycheck;
            let allocated_total = view.allocated_total;
            let shortfall = allocated_total - paycheck.amount;
            Warning {
                key: paycheck.id.to_string(),
                message: format!(
                    "{} on {} is short by {shortfall}: {allocated_total} allocated against {}",
                    paycheck.name, paycheck.date, paycheck.amount
                ),
                kind: WarningKind::InsufficientFunds {
                    paycheck_id: paycheck.id,
                    paycheck_date: paycheck.date,
                    paycheck_amount: paycheck.amount,
                    allocated_total,
                    shortfall,
                },
            }
        })
        .collect()
}

fn no_income(paychecks: &[PaycheckView], active: &[&PlannedDebt], window: MonthWindow) -> Vec<Warning> {
    let paid_months: HashSet<YearMonth> = paychecks.iter().map(|p| YearMonth::of(p.paycheck.date)).collect();

    let mut due: BTreeMap<YearMonth, (usize, Decimal)> = BTreeMap::new();
    for debt in active {
        let period = period_of(debt);
        if window.includes(period) && !paid_months.contains(&period) {
            let entry = due.entry(period).or_insert((0, Decimal::ZERO));
            entry.0 += 1;
            entry.1 += debt.amount;
        }
    }

    due.into_iter()
        .map(|(period, (debt_count, total_due))| Warning {
            key: period.to_string(),
            message: format!("No income projected for {period}; {debt_count} debts totalling {total_due} are due"),
            kind: WarningKind::NoIncome {
                period,
                debt_count,
                total_due,
            },
        })
        .collect()
}
