//! Read-model assembly for a planning window.

use std::collections::HashMap;

use payplan_shared::types::{DebtId, PlanningRecordId};
use rust_decimal::Decimal;

use super::allocation::AllocationRules;
use super::types::{
    AllocationStatus, AllocationView, Debt, DebtAllocation, PaycheckView, PlannedDebt,
    PlanningRecord, PlanningSummary,
};
use crate::paycheck::Paycheck;

/// Overlays debts and allocations onto planning records.
pub struct PlanningAssembler;

impl PlanningAssembler {
    /// Resolves each record against its debt and allocation.
    ///
    /// Records whose debt is missing or deactivated are dropped. Output is
    /// ordered by due date, then debt name.
    #[must_use]
    pub fn planned_debts(
        records: &[PlanningRecord],
        debts: &[Debt],
        allocations: &[DebtAllocation],
    ) -> Vec<PlannedDebt> {
        let debts: HashMap<DebtId, &Debt> = debts.iter().map(|d| (d.id, d)).collect();
        let allocations: HashMap<PlanningRecordId, &DebtAllocation> = allocations
            .iter()
            .map(|a| (a.planning_record_id, a))
            .collect();

        let mut planned: Vec<PlannedDebt> = records
            .iter()
            .filter_map(|record| {
                let debt = debts.get(&record.debt_id).filter(|d| d.is_active)?;
                let allocation = allocations.get(&record.id).copied();
                Some(PlannedDebt {
                    planning_record_id: record.id,
                    debt_id: debt.id,
                    name: debt.name.clone(),
                    category: debt.category.clone(),
                    year: record.period.year(),
                    month: record.period.month(),
                    due_date: record.due_date,
                    payment_date: AllocationRules::effective_date(allocation, record),
                    default_amount: debt.payment_amount,
                    amount: AllocationRules::effective_amount(allocation, debt),
                    interest_rate: debt.interest_rate,
                    is_active: record.is_active,
                    status: AllocationRules::status(allocation),
                    allocation: allocation.map(|a| AllocationView {
                        id: a.id,
                        paycheck_id: a.paycheck_id,
                        amount_override: a.payment_amount,
                        date_override: a.payment_date,
                        is_paid: a.is_paid,
                        paid_at: a.paid_at,
                        note: a.note.clone(),
                    }),
                })
            })
            .collect();

        planned.sort_by(|a, b| a.due_date.cmp(&b.due_date).then_with(|| a.name.cmp(&b.name)));
        planned
    }

    /// Attaches allocated totals from active records to each paycheck.
    ///
    /// `debts` must include every record a paycheck funds, including
    /// records planned for months outside the window.
    #[must_use]
    pub fn paycheck_views(paychecks: Vec<Paycheck>, debts: &[PlannedDebt]) -> Vec<PaycheckView> {
        paychecks
            .into_iter()
            .map(|paycheck| {
                let funded: Vec<&PlannedDebt> = debts
                    .iter()
                    .filter(|d| {
                        d.is_active
                            && d.allocation
                                .as_ref()
                                .is_some_and(|a| a.paycheck_id == paycheck.id)
                    })
                    .collect();
                let allocated_total: Decimal = funded.iter().map(|d| d.amount).sum();
                PaycheckView {
                    remaining: paycheck.amount - allocated_total,
                    allocated_total,
                    planning_record_ids: funded.iter().map(|d| d.planning_record_id).collect(),
                    paycheck,
                }
            })
            .collect()
    }

    /// Window totals over active records.
    #[must_use]
    pub fn summary(paychecks: &[PaycheckView], debts: &[PlannedDebt]) -> PlanningSummary {
        let mut summary = PlanningSummary {
            total_income: paychecks.iter().map(|p| p.paycheck.amount).sum(),
            ..PlanningSummary::default()
        };

        for debt in debts.iter().filter(|d| d.is_active) {
            match debt.status {
                AllocationStatus::Unallocated => summary.total_unallocated += debt.amount,
                AllocationStatus::Allocated => summary.total_allocated += debt.amount,
                AllocationStatus::Paid => {
                    summary.total_allocated += debt.amount;
                    summary.total_paid += debt.amount;
                }
            }
        }
        summary
    }
}
