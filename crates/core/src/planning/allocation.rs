//! Allocation state rules.
//!
//! Pure transitions on [`DebtAllocation`] values. Persistence of the
//! results belongs to the repository.

use chrono::{DateTime, NaiveDate, Utc};
use payplan_shared::types::{AllocationId, UserId};
use rust_decimal::Decimal;

use super::error::PlanningError;
use super::types::{AllocationInput, AllocationStatus, Debt, DebtAllocation, PlanningRecord};

/// Allocation transitions and override resolution.
pub struct AllocationRules;

impl AllocationRules {
    /// Rejects non-positive amount overrides.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::Validation` if the amount is zero or negative.
    pub fn validate_amount(amount: Option<Decimal>) -> Result<(), PlanningError> {
        match amount {
            Some(value) if value <= Decimal::ZERO => Err(PlanningError::validation(format!(
                "payment amount must be positive, got {value}"
            ))),
            _ => Ok(()),
        }
    }

    /// A fresh, unpaid allocation of `record` to the input's paycheck.
    #[must_use]
    pub fn allocate(
        record: &PlanningRecord,
        input: AllocationInput,
        allocated_by: UserId,
        now: DateTime<Utc>,
    ) -> DebtAllocation {
        DebtAllocation {
            id: AllocationId::new(),
            budget_account_id: record.budget_account_id,
            planning_record_id: record.id,
            paycheck_id: input.paycheck_id,
            payment_amount: input.amount,
            payment_date: input.date,
            is_paid: false,
            paid_at: None,
            note: normalize_note(input.note),
            allocated_by,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies override changes, keeping the paycheck binding.
    ///
    /// `None` fields keep their current value. Returns `None` when nothing
    /// would change.
    #[must_use]
    pub fn update(
        current: &DebtAllocation,
        amount: Option<Decimal>,
        date: Option<NaiveDate>,
        note: Option<String>,
        now: DateTime<Utc>,
    ) -> Option<DebtAllocation> {
        let mut next = current.clone();
        if let Some(amount) = amount {
            next.payment_amount = Some(amount);
        }
        if let Some(date) = date {
            next.payment_date = Some(date);
        }
        if let Some(note) = note {
            next.note = normalize_note(Some(note));
        }

        if next == *current {
            return None;
        }
        next.updated_at = now;
        Some(next)
    }

    /// Marks the allocation paid, applying any supplied overrides.
    ///
    /// Returns `None` if it is already paid and no override changes.
    #[must_use]
    pub fn mark_paid(
        current: &DebtAllocation,
        amount: Option<Decimal>,
        date: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Option<DebtAllocation> {
        let mut next = current.clone();
        if let Some(amount) = amount {
            next.payment_amount = Some(amount);
        }
        if let Some(date) = date {
            next.payment_date = Some(date);
        }
        if !next.is_paid {
            next.is_paid = true;
            next.paid_at = Some(now);
        }

        if next == *current {
            return None;
        }
        next.updated_at = now;
        Some(next)
    }

    /// Amount in effect: the override, else the debt's payment amount.
    #[must_use]
    pub fn effective_amount(allocation: Option<&DebtAllocation>, debt: &Debt) -> Decimal {
        allocation
            .and_then(|a| a.payment_amount)
            .unwrap_or(debt.payment_amount)
    }

    /// Date in effect: the override, else the record's due date.
    #[must_use]
    pub fn effective_date(allocation: Option<&DebtAllocation>, record: &PlanningRecord) -> NaiveDate {
        allocation
            .and_then(|a| a.payment_date)
            .unwrap_or(record.due_date)
    }

    /// Lifecycle status of a record given its allocation.
    #[must_use]
    pub fn status(allocation: Option<&DebtAllocation>) -> AllocationStatus {
        match allocation {
            None => AllocationStatus::Unallocated,
            Some(a) if a.is_paid => AllocationStatus::Paid,
            Some(_) => AllocationStatus::Allocated,
        }
    }
}

fn normalize_note(note: Option<String>) -> Option<String> {
    note.map(|n| n.trim().to_string()).filter(|n| !n.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::YearMonth;
    use crate::paycheck::PaycheckId;
    use chrono::Duration;
    use payplan_shared::types::{BudgetAccountId, DebtId, IncomeSourceId, PlanningRecordId};
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn record() -> PlanningRecord {
        PlanningRecord {
            id: PlanningRecordId::new(),
            budget_account_id: BudgetAccountId::new(),
            debt_id: DebtId::new(),
            period: YearMonth::new(2025, 1).unwrap(),
            due_date: NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(),
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn debt() -> Debt {
        Debt {
            id: DebtId::new(),
            budget_account_id: BudgetAccountId::new(),
            created_by: UserId::new(),
            name: "Car loan".to_string(),
            payment_amount: dec!(350),
            interest_rate: dec!(6.5),
            due_date: NaiveDate::from_ymd_opt(2024, 12, 15).unwrap(),
            category: Some("auto".to_string()),
            last_payment_month: None,
            is_active: true,
        }
    }

    fn paycheck() -> PaycheckId {
        PaycheckId::new(IncomeSourceId::new(), NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
    }

    fn allocation() -> DebtAllocation {
        AllocationRules::allocate(
            &record(),
            AllocationInput::paycheck(paycheck()),
            UserId::new(),
            Utc::now(),
        )
    }

    #[rstest]
    #[case(None, true)]
    #[case(Some(dec!(0.01)), true)]
    #[case(Some(dec!(0)), false)]
    #[case(Some(dec!(-5)), false)]
    fn test_validate_amount(#[case] amount: Option<Decimal>, #[case] ok: bool) {
        assert_eq!(AllocationRules::validate_amount(amount).is_ok(), ok);
    }

    #[test]
    fn test_allocate_starts_unpaid_with_overrides() {
        let rec = record();
        let input = AllocationInput {
            paycheck_id: paycheck(),
            amount: Some(dec!(500)),
            date: NaiveDate::from_ymd_opt(2025, 1, 12),
            note: Some("  autopay  ".to_string()),
        };

        let created = AllocationRules::allocate(&rec, input.clone(), UserId::new(), Utc::now());

        assert_eq!(created.planning_record_id, rec.id);
        assert_eq!(created.budget_account_id, rec.budget_account_id);
        assert_eq!(created.paycheck_id, input.paycheck_id);
        assert_eq!(created.payment_amount, Some(dec!(500)));
        assert_eq!(created.note.as_deref(), Some("autopay"));
        assert!(!created.is_paid);
        assert!(created.paid_at.is_none());
    }

    #[test]
    fn test_update_keeps_binding_and_unset_fields() {
        let current = allocation();
        let later = current.updated_at + Duration::minutes(1);

        let next = AllocationRules::update(&current, Some(dec!(400)), None, None, later).unwrap();

        assert_eq!(next.paycheck_id, current.paycheck_id);
        assert_eq!(next.payment_amount, Some(dec!(400)));
        assert_eq!(next.payment_date, None);
        assert_eq!(next.updated_at, later);
    }

    #[test]
    fn test_update_without_changes_is_none() {
        let current = allocation();
        assert!(AllocationRules::update(&current, None, None, None, Utc::now()).is_none());
    }

    #[test]
    fn test_mark_paid_sets_flag_once() {
        let current = allocation();
        let paid = AllocationRules::mark_paid(&current, None, None, Utc::now()).unwrap();
        assert!(paid.is_paid);
        assert!(paid.paid_at.is_some());

        assert!(AllocationRules::mark_paid(&paid, None, None, Utc::now()).is_none());

        let amended = AllocationRules::mark_paid(&paid, Some(dec!(360)), None, Utc::now()).unwrap();
        assert_eq!(amended.paid_at, paid.paid_at);
        assert_eq!(amended.payment_amount, Some(dec!(360)));
    }

    #[test]
    fn test_effective_values_fall_back_to_defaults() {
        let rec = record();
        let car = debt();
        assert_eq!(AllocationRules::effective_amount(None, &car), dec!(350));
        assert_eq!(AllocationRules::effective_date(None, &rec), rec.due_date);

        let mut alloc = allocation();
        alloc.payment_amount = Some(dec!(420));
        alloc.payment_date = NaiveDate::from_ymd_opt(2025, 1, 11);
        assert_eq!(AllocationRules::effective_amount(Some(&alloc), &car), dec!(420));
        assert_eq!(
            AllocationRules::effective_date(Some(&alloc), &rec),
            NaiveDate::from_ymd_opt(2025, 1, 11).unwrap()
        );
    }

    #[test]
    fn test_status() {
        let mut alloc = allocation();
        assert_eq!(AllocationRules::status(None), AllocationStatus::Unallocated);
        assert_eq!(AllocationRules::status(Some(&alloc)), AllocationStatus::Allocated);
        alloc.is_paid = true;
        assert_eq!(AllocationRules::status(Some(&alloc)), AllocationStatus::Paid);
    }
}
