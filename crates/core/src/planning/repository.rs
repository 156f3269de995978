//! Persistence port for planning.

use std::future::Future;

use payplan_shared::types::{BudgetAccountId, IncomeSourceId, PlanningRecordId, UserId};

use super::error::PlanningError;
use super::types::{Debt, DebtAllocation, DismissedWarning, NewPlanningRecord, PlanningRecord};
use crate::calendar::MonthWindow;
use crate::paycheck::{IncomeSource, PaycheckId};

/// Repository trait for planning persistence.
///
/// Implemented by the db crate; every query is scoped to a budget account.
pub trait PlanningRepository: Send + Sync {
    /// Returns true if the user belongs to the budget account.
    fn is_member(
        &self,
        account_id: BudgetAccountId,
        user_id: UserId,
    ) -> impl Future<Output = Result<bool, PlanningError>> + Send;

    /// Income sources of the account, active or not.
    fn list_income_sources(
        &self,
        account_id: BudgetAccountId,
    ) -> impl Future<Output = Result<Vec<IncomeSource>, PlanningError>> + Send;

    /// One income source of the account.
    fn find_income_source(
        &self,
        account_id: BudgetAccountId,
        income_source_id: IncomeSourceId,
    ) -> impl Future<Output = Result<Option<IncomeSource>, PlanningError>> + Send;

    /// Debts of the account, active or not.
    fn list_debts(
        &self,
        account_id: BudgetAccountId,
    ) -> impl Future<Output = Result<Vec<Debt>, PlanningError>> + Send;

    /// Planning records of the account whose month lies in the window.
    fn list_planning_records(
        &self,
        account_id: BudgetAccountId,
        window: MonthWindow,
    ) -> impl Future<Output = Result<Vec<PlanningRecord>, PlanningError>> + Send;

    /// Inserts records, silently skipping (debt, month) slots already taken.
    ///
    /// Returns the number of rows inserted.
    fn insert_planning_records(
        &self,
        records: Vec<NewPlanningRecord>,
    ) -> impl Future<Output = Result<u64, PlanningError>> + Send;

    /// Planning records of the account with the given IDs, in any month.
    fn list_planning_records_by_ids(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> impl Future<Output = Result<Vec<PlanningRecord>, PlanningError>> + Send;

    /// One planning record of the account.
    fn find_planning_record(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> impl Future<Output = Result<Option<PlanningRecord>, PlanningError>> + Send;

    /// Sets the record's active flag. Returns true if the flag changed.
    fn set_planning_record_active(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        is_active: bool,
    ) -> impl Future<Output = Result<bool, PlanningError>> + Send;

    /// Allocations of the given records.
    fn list_allocations(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> impl Future<Output = Result<Vec<DebtAllocation>, PlanningError>> + Send;

    /// Allocations bound to any of the given paychecks.
    fn list_allocations_for_paychecks(
        &self,
        account_id: BudgetAccountId,
        paycheck_ids: &[PaycheckId],
    ) -> impl Future<Output = Result<Vec<DebtAllocation>, PlanningError>> + Send;

    /// The allocation of one record, if any.
    fn find_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> impl Future<Output = Result<Option<DebtAllocation>, PlanningError>> + Send;

    /// Atomically removes any allocation of the record and stores this one.
    ///
    /// Observers never see zero or two allocations for the record.
    fn replace_allocation(
        &self,
        allocation: DebtAllocation,
    ) -> impl Future<Output = Result<(), PlanningError>> + Send;

    /// Deletes the record's allocation if it is bound to `paycheck_id`.
    ///
    /// Returns the number of rows deleted.
    fn delete_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        paycheck_id: PaycheckId,
    ) -> impl Future<Output = Result<u64, PlanningError>> + Send;

    /// Overwrites an existing allocation by ID.
    fn save_allocation(
        &self,
        allocation: DebtAllocation,
    ) -> impl Future<Output = Result<(), PlanningError>> + Send;

    /// Dismissals recorded for the account.
    fn list_dismissed_warnings(
        &self,
        account_id: BudgetAccountId,
    ) -> impl Future<Output = Result<Vec<DismissedWarning>, PlanningError>> + Send;

    /// Records a dismissal unless the (type, key) is already dismissed.
    ///
    /// Returns true if a row was inserted.
    fn insert_dismissal(
        &self,
        dismissal: DismissedWarning,
    ) -> impl Future<Output = Result<bool, PlanningError>> + Send;
}
