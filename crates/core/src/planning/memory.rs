//! In-memory [`PlanningRepository`] for tests and local tooling.

use std::collections::{HashMap, HashSet};

use chrono::Utc;
use payplan_shared::types::{BudgetAccountId, IncomeSourceId, PlanningRecordId, UserId};
use tokio::sync::RwLock;

use super::error::PlanningError;
use super::repository::PlanningRepository;
use super::types::{Debt, DebtAllocation, DismissedWarning, NewPlanningRecord, PlanningRecord};
use crate::calendar::MonthWindow;
use crate::paycheck::{IncomeSource, PaycheckId};

#[derive(Default)]
struct State {
    members: HashSet<(BudgetAccountId, UserId)>,
    income_sources: Vec<(BudgetAccountId, IncomeSource)>,
    debts: Vec<Debt>,
    records: Vec<PlanningRecord>,
    allocations: HashMap<PlanningRecordId, DebtAllocation>,
    dismissals: Vec<DismissedWarning>,
}

/// Planning repository backed by process memory.
///
/// Each call holds one lock for its whole duration, so every operation is
/// atomic with respect to the others.
#[derive(Default)]
pub struct InMemoryPlanningRepository {
    state: RwLock<State>,
}

impl InMemoryPlanningRepository {
    /// Create an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user to a budget account.
    pub async fn add_member(&self, account_id: BudgetAccountId, user_id: UserId) {
        self.state.write().await.members.insert((account_id, user_id));
    }

    /// Stores an income source under a budget account.
    pub async fn add_income_source(&self, account_id: BudgetAccountId, source: IncomeSource) {
        self.state.write().await.income_sources.push((account_id, source));
    }

    /// Stores or replaces a debt.
    pub async fn put_debt(&self, debt: Debt) {
        let mut state = self.state.write().await;
        state.debts.retain(|d| d.id != debt.id);
        state.debts.push(debt);
    }

    /// Number of stored planning records of the account.
    pub async fn planning_record_count(&self, account_id: BudgetAccountId) -> usize {
        self.state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.budget_account_id == account_id)
            .count()
    }

    /// Number of stored allocations of the account.
    pub async fn allocation_count(&self, account_id: BudgetAccountId) -> usize {
        self.state
            .read()
            .await
            .allocations
            .values()
            .filter(|a| a.budget_account_id == account_id)
            .count()
    }

    /// Number of stored dismissals of the account.
    pub async fn dismissal_count(&self, account_id: BudgetAccountId) -> usize {
        self.state
            .read()
            .await
            .dismissals
            .iter()
            .filter(|d| d.budget_account_id == account_id)
            .count()
    }
}

impl PlanningRepository for InMemoryPlanningRepository {
    async fn is_member(
        &self,
        account_id: BudgetAccountId,
        user_id: UserId,
    ) -> Result<bool, PlanningError> {
        Ok(self.state.read().await.members.contains(&(account_id, user_id)))
    }

    async fn list_income_sources(
        &self,
        account_id: BudgetAccountId,
    ) -> Result<Vec<IncomeSource>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .income_sources
            .iter()
            .filter(|(account, _)| *account == account_id)
            .map(|(_, source)| source.clone())
            .collect())
    }

    async fn find_income_source(
        &self,
        account_id: BudgetAccountId,
        income_source_id: IncomeSourceId,
    ) -> Result<Option<IncomeSource>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .income_sources
            .iter()
            .find(|(account, source)| *account == account_id && source.id == income_source_id)
            .map(|(_, source)| source.clone()))
    }

    async fn list_debts(&self, account_id: BudgetAccountId) -> Result<Vec<Debt>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .debts
            .iter()
            .filter(|d| d.budget_account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_planning_records(
        &self,
        account_id: BudgetAccountId,
        window: MonthWindow,
    ) -> Result<Vec<PlanningRecord>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.budget_account_id == account_id && window.includes(r.period))
            .cloned()
            .collect())
    }

    async fn insert_planning_records(
        &self,
        records: Vec<NewPlanningRecord>,
    ) -> Result<u64, PlanningError> {
        let mut state = self.state.write().await;
        let mut inserted = 0;
        for record in records {
            let taken = state.records.iter().any(|r| {
                r.budget_account_id == record.budget_account_id
                    && r.debt_id == record.debt_id
                    && r.period == record.period
            });
            if taken {
                continue;
            }
            state.records.push(PlanningRecord {
                id: record.id,
                budget_account_id: record.budget_account_id,
                debt_id: record.debt_id,
                period: record.period,
                due_date: record.due_date,
                is_active: true,
                created_at: Utc::now(),
            });
            inserted += 1;
        }
        Ok(inserted)
    }

    async fn list_planning_records_by_ids(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> Result<Vec<PlanningRecord>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .filter(|r| r.budget_account_id == account_id && record_ids.contains(&r.id))
            .cloned()
            .collect())
    }

    async fn find_planning_record(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> Result<Option<PlanningRecord>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id == record_id && r.budget_account_id == account_id)
            .cloned())
    }

    async fn set_planning_record_active(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        is_active: bool,
    ) -> Result<bool, PlanningError> {
        let mut state = self.state.write().await;
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == record_id && r.budget_account_id == account_id)
            .ok_or_else(|| PlanningError::not_found("planning record", record_id))?;
        if record.is_active == is_active {
            return Ok(false);
        }
        record.is_active = is_active;
        Ok(true)
    }

    async fn list_allocations(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> Result<Vec<DebtAllocation>, PlanningError> {
        let state = self.state.read().await;
        Ok(record_ids
            .iter()
            .filter_map(|id| state.allocations.get(id))
            .filter(|a| a.budget_account_id == account_id)
            .cloned()
            .collect())
    }

    async fn list_allocations_for_paychecks(
        &self,
        account_id: BudgetAccountId,
        paycheck_ids: &[PaycheckId],
    ) -> Result<Vec<DebtAllocation>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .allocations
            .values()
            .filter(|a| a.budget_account_id == account_id && paycheck_ids.contains(&a.paycheck_id))
            .cloned()
            .collect())
    }

    async fn find_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> Result<Option<DebtAllocation>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .allocations
            .get(&record_id)
            .filter(|a| a.budget_account_id == account_id)
            .cloned())
    }

    async fn replace_allocation(&self, allocation: DebtAllocation) -> Result<(), PlanningError> {
        self.state
            .write()
            .await
            .allocations
            .insert(allocation.planning_record_id, allocation);
        Ok(())
    }

    async fn delete_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        paycheck_id: PaycheckId,
    ) -> Result<u64, PlanningError> {
        let mut state = self.state.write().await;
        let matches = state.allocations.get(&record_id).is_some_and(|a| {
            a.budget_account_id == account_id && a.paycheck_id == paycheck_id
        });
        if !matches {
            return Ok(0);
        }
        state.allocations.remove(&record_id);
        Ok(1)
    }

    async fn save_allocation(&self, allocation: DebtAllocation) -> Result<(), PlanningError> {
        let mut state = self.state.write().await;
        let slot = state
            .allocations
            .get_mut(&allocation.planning_record_id)
            .filter(|a| a.id == allocation.id)
            .ok_or_else(|| PlanningError::not_found("allocation", allocation.id))?;
        *slot = allocation;
        Ok(())
    }

    async fn list_dismissed_warnings(
        &self,
        account_id: BudgetAccountId,
    ) -> Result<Vec<DismissedWarning>, PlanningError> {
        Ok(self
            .state
            .read()
            .await
            .dismissals
            .iter()
            .filter(|d| d.budget_account_id == account_id)
            .cloned()
            .collect())
    }

    async fn insert_dismissal(&self, dismissal: DismissedWarning) -> Result<bool, PlanningError> {
        let mut state = self.state.write().await;
        let exists = state.dismissals.iter().any(|d| {
            d.budget_account_id == dismissal.budget_account_id
                && d.warning_type == dismissal.warning_type
                && d.warning_key == dismissal.warning_key
        });
        if exists {
            return Ok(false);
        }
        state.dismissals.push(dismissal);
        Ok(true)
    }
}
