//! Monthly debt planning materialization rules.

use std::collections::HashSet;

use payplan_shared::types::{BudgetAccountId, DebtId, PlanningRecordId};

use super::types::{Debt, NewPlanningRecord, PlanningRecord};
use crate::calendar::{MonthWindow, YearMonth};

/// Decides which planning records a window still needs.
pub struct PlanningMaterializer;

impl PlanningMaterializer {
    /// Records missing for every planned debt and month of `window`.
    ///
    /// A (debt, month) slot that already has a record, active or hidden,
    /// is left alone, so calling this on every read is safe.
    #[must_use]
    pub fn missing_records(
        account_id: BudgetAccountId,
        debts: &[Debt],
        existing: &[PlanningRecord],
        window: MonthWindow,
    ) -> Vec<NewPlanningRecord> {
        let taken: HashSet<(DebtId, YearMonth)> =
            existing.iter().map(|r| (r.debt_id, r.period)).collect();

        window
            .months()
            .flat_map(|month| {
                debts
                    .iter()
                    .filter(move |debt| {
                        debt.budget_account_id == account_id && debt.is_planned_for(month)
                    })
                    .map(move |debt| (debt, month))
            })
            .filter(|(debt, month)| !taken.contains(&(debt.id, *month)))
            .map(|(debt, month)| NewPlanningRecord {
                id: PlanningRecordId::new(),
                budget_account_id: account_id,
                debt_id: debt.id,
                period: month,
                due_date: debt.due_date_in(month),
            })
            .collect()
    }
}
