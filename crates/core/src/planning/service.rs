//! Planning aggregator: the read model and the mutation entry points.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use payplan_shared::PlanningConfig;
use payplan_shared::types::{AllocationId, BudgetAccountId, DismissalId, PlanningRecordId, UserId};
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

use super::allocation::AllocationRules;
use super::error::PlanningError;
use super::materializer::PlanningMaterializer;
use super::repository::PlanningRepository;
use super::types::{
    AllocationAction, AllocationInput, DebtAllocation, DismissedWarning, MutationOutcome,
    PlannedDebt, PlanningRecord, PlanningView,
};
use super::view::PlanningAssembler;
use super::warnings::{MAX_WARNING_KEY_LEN, WarningType, WarningsEngine};
use crate::calendar::{MonthWindow, YearMonth};
use crate::paycheck::{Paycheck, PaycheckId, PaycheckProjector};

/// Paycheck planning service.
///
/// Stateless between calls: every read re-derives paychecks, records and
/// warnings from the repository.
pub struct PlanningService<R: PlanningRepository> {
    repo: Arc<R>,
    config: PlanningConfig,
}

impl<R: PlanningRepository> PlanningService<R> {
    /// Create a new planning service.
    #[must_use]
    pub fn new(repo: Arc<R>, config: PlanningConfig) -> Self {
        Self { repo, config }
    }

    /// The window `[year-month, +lookahead]`, validated against configuration.
    ///
    /// `None` lookahead uses the configured default.
    ///
    /// # Errors
    ///
    /// Returns `PlanningError::Validation` for a bad year, month or lookahead.
    pub fn window(
        &self,
        year: i32,
        month: u32,
        lookahead: Option<u32>,
    ) -> Result<MonthWindow, PlanningError> {
        let lookahead = lookahead.unwrap_or(self.config.default_lookahead_months);
        if lookahead > self.config.max_lookahead_months {
            return Err(PlanningError::validation(format!(
                "lookahead_months must be at most {}, got {lookahead}",
                self.config.max_lookahead_months
            )));
        }
        Ok(MonthWindow::new(YearMonth::new(year, month)?, lookahead)?)
    }

    /// Combined paycheck, debt and warning view for a window.
    ///
    /// Missing planning records are materialized first.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Inputs are invalid
    /// - The caller is not a member of the account
    /// - Repository access fails
    pub async fn get_planning_data(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        year: i32,
        month: u32,
        lookahead: Option<u32>,
    ) -> Result<PlanningView, PlanningError> {
        let window = self.window(year, month, lookahead)?;
        self.authorize(account_id, user_id).await?;

        self.materialize(account_id, window).await?;

        let sources = self.repo.list_income_sources(account_id).await?;
        let paychecks = PaycheckProjector::project_window(&sources, window);

        let all_debts = self.resolve_debts(account_id, window).await?;
        let carried = self.carried_debts(account_id, &paychecks, &all_debts).await?;
        let debts: Vec<PlannedDebt> = all_debts.iter().filter(|d| d.is_active).cloned().collect();
        let funding: Vec<PlannedDebt> = debts.iter().cloned().chain(carried).collect();
        let paychecks = PlanningAssembler::paycheck_views(paychecks, &funding);

        let mut warnings = WarningsEngine::compute(&paychecks, &all_debts, window);
        let dismissed = self.repo.list_dismissed_warnings(account_id).await?;
        warnings = WarningsEngine::filter_dismissed(warnings, &dismissed);

        let summary = PlanningAssembler::summary(&paychecks, &debts);

        debug!(
            account_id = %account_id,
            window_start = %window.start(),
            window_end = %window.end(),
            paychecks = paychecks.len(),
            debts = debts.len(),
            carried = funding.len() - debts.len(),
            warnings = warnings.len(),
            "Planning data loaded"
        );

        Ok(PlanningView {
            year,
            month,
            lookahead_months: lookahead.unwrap_or(self.config.default_lookahead_months),
            paychecks,
            debts,
            warnings,
            summary,
        })
    }

    /// Hidden planning records in the window.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_planning_data`].
    pub async fn get_hidden_planning_data(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        year: i32,
        month: u32,
        lookahead: Option<u32>,
    ) -> Result<Vec<PlannedDebt>, PlanningError> {
        let window = self.window(year, month, lookahead)?;
        self.authorize(account_id, user_id).await?;

        let hidden: Vec<PlannedDebt> = self
            .resolve_debts(account_id, window)
            .await?
            .into_iter()
            .filter(|d| !d.is_active)
            .collect();

        debug!(account_id = %account_id, hidden = hidden.len(), "Hidden planning data loaded");
        Ok(hidden)
    }

    /// Ensures planning records exist for every planned debt in the window.
    ///
    /// Returns the number of records created; zero on repeat calls.
    ///
    /// # Errors
    ///
    /// Same as [`Self::get_planning_data`].
    pub async fn populate(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        year: i32,
        month: u32,
        lookahead: Option<u32>,
    ) -> Result<u64, PlanningError> {
        let window = self.window(year, month, lookahead)?;
        self.authorize(account_id, user_id).await?;
        self.materialize(account_id, window).await
    }

    /// Hides or restores one month's planning record.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record is not in the account.
    pub async fn set_planning_active(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        is_active: bool,
    ) -> Result<MutationOutcome, PlanningError> {
        self.authorize(account_id, user_id).await?;
        self.record(account_id, record_id).await?;

        let changed = self
            .repo
            .set_planning_record_active(account_id, record_id, is_active)
            .await?;

        info!(
            account_id = %account_id,
            planning_record_id = %record_id,
            is_active,
            changed,
            "Planning record visibility set"
        );
        Ok(if changed {
            MutationOutcome::Applied
        } else {
            MutationOutcome::Unchanged
        })
    }

    /// Dispatches an allocation request by action.
    ///
    /// # Errors
    ///
    /// See [`Self::allocate`], [`Self::unallocate`] and [`Self::update_allocation`].
    pub async fn update_debt_allocation(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        action: AllocationAction,
        input: AllocationInput,
    ) -> Result<MutationOutcome, PlanningError> {
        match action {
            AllocationAction::Allocate => self.allocate(user_id, account_id, record_id, input).await,
            AllocationAction::Unallocate => {
                self.unallocate(user_id, account_id, record_id, input.paycheck_id)
                    .await
            }
            AllocationAction::Update => {
                self.update_allocation(user_id, account_id, record_id, input)
                    .await
            }
        }
    }

    /// Binds the record to a paycheck, replacing any existing allocation.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The amount override is not positive
    /// - The record is not in the account
    /// - The paycheck does not exist for the account
    pub async fn allocate(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        input: AllocationInput,
    ) -> Result<MutationOutcome, PlanningError> {
        AllocationRules::validate_amount(input.amount)?;
        self.authorize(account_id, user_id).await?;
        let record = self.record(account_id, record_id).await?;
        self.verify_paycheck(account_id, input.paycheck_id).await?;

        let paycheck_id = input.paycheck_id;
        let allocation = AllocationRules::allocate(&record, input, user_id, Utc::now());
        let allocation_id = allocation.id;
        self.repo.replace_allocation(allocation).await?;

        info!(
            account_id = %account_id,
            planning_record_id = %record_id,
            paycheck_id = %paycheck_id,
            allocation_id = %allocation_id,
            "Debt allocated"
        );
        Ok(MutationOutcome::Applied)
    }

    /// Removes the record's allocation to `paycheck_id`.
    ///
    /// A missing allocation is not an error; it yields `Unchanged`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the record is not in the account.
    pub async fn unallocate(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        paycheck_id: PaycheckId,
    ) -> Result<MutationOutcome, PlanningError> {
        self.authorize(account_id, user_id).await?;
        self.record(account_id, record_id).await?;

        let deleted = self
            .repo
            .delete_allocation(account_id, record_id, paycheck_id)
            .await?;

        if deleted == 0 {
            debug!(
                account_id = %account_id,
                planning_record_id = %record_id,
                paycheck_id = %paycheck_id,
                "No allocation to remove"
            );
            return Ok(MutationOutcome::Unchanged);
        }

        info!(
            account_id = %account_id,
            planning_record_id = %record_id,
            paycheck_id = %paycheck_id,
            "Debt unallocated"
        );
        Ok(MutationOutcome::Applied)
    }

    /// Changes the override fields of an existing allocation.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` unless the record is allocated to the input's paycheck.
    pub async fn update_allocation(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        input: AllocationInput,
    ) -> Result<MutationOutcome, PlanningError> {
        AllocationRules::validate_amount(input.amount)?;
        self.authorize(account_id, user_id).await?;
        self.record(account_id, record_id).await?;

        let current = self
            .repo
            .find_allocation(account_id, record_id)
            .await?
            .filter(|a| a.paycheck_id == input.paycheck_id)
            .ok_or_else(|| {
                PlanningError::not_found("allocation", format!("{record_id}/{}", input.paycheck_id))
            })?;

        let Some(next) =
            AllocationRules::update(&current, input.amount, input.date, input.note, Utc::now())
        else {
            return Ok(MutationOutcome::Unchanged);
        };
        self.repo.save_allocation(next).await?;

        info!(
            account_id = %account_id,
            planning_record_id = %record_id,
            allocation_id = %current.id,
            "Allocation updated"
        );
        Ok(MutationOutcome::Applied)
    }

    /// Marks an allocation paid, applying optional amount and date.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the allocation does not belong to the record.
    pub async fn mark_paid(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        allocation_id: AllocationId,
        amount: Option<Decimal>,
        date: Option<NaiveDate>,
    ) -> Result<MutationOutcome, PlanningError> {
        AllocationRules::validate_amount(amount)?;
        self.authorize(account_id, user_id).await?;
        self.record(account_id, record_id).await?;

        let current = self
            .repo
            .find_allocation(account_id, record_id)
            .await?
            .filter(|a| a.id == allocation_id)
            .ok_or_else(|| PlanningError::not_found("allocation", allocation_id))?;

        let Some(next) = AllocationRules::mark_paid(&current, amount, date, Utc::now()) else {
            return Ok(MutationOutcome::Unchanged);
        };
        self.repo.save_allocation(next).await?;

        info!(
            account_id = %account_id,
            planning_record_id = %record_id,
            allocation_id = %allocation_id,
            "Payment marked as paid"
        );
        Ok(MutationOutcome::Applied)
    }

    /// Suppresses a warning identity for the account.
    ///
    /// Dismissing the same (type, key) again yields `Unchanged`.
    ///
    /// # Errors
    ///
    /// Returns `Validation` for an empty or over-long key.
    pub async fn dismiss_warning(
        &self,
        user_id: UserId,
        account_id: BudgetAccountId,
        warning_type: WarningType,
        warning_key: &str,
    ) -> Result<MutationOutcome, PlanningError> {
        let warning_key = warning_key.trim();
        if warning_key.is_empty() {
            return Err(PlanningError::validation("warning_key must not be empty"));
        }
        if warning_key.chars().count() > MAX_WARNING_KEY_LEN {
            return Err(PlanningError::validation(format!(
                "warning_key must be at most {MAX_WARNING_KEY_LEN} characters"
            )));
        }
        self.authorize(account_id, user_id).await?;

        let inserted = self
            .repo
            .insert_dismissal(DismissedWarning {
                id: DismissalId::new(),
                budget_account_id: account_id,
                warning_type,
                warning_key: warning_key.to_string(),
                dismissed_by: user_id,
                dismissed_at: Utc::now(),
            })
            .await?;

        info!(
            account_id = %account_id,
            warning_type = %warning_type,
            warning_key,
            inserted,
            "Warning dismissed"
        );
        Ok(if inserted {
            MutationOutcome::Applied
        } else {
            MutationOutcome::Unchanged
        })
    }

    async fn authorize(
        &self,
        account_id: BudgetAccountId,
        user_id: UserId,
    ) -> Result<(), PlanningError> {
        if self.repo.is_member(account_id, user_id).await? {
            return Ok(());
        }
        warn!(account_id = %account_id, user_id = %user_id, "Budget account access denied");
        Err(PlanningError::AccessDenied(account_id))
    }

    async fn record(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> Result<PlanningRecord, PlanningError> {
        self.repo
            .find_planning_record(account_id, record_id)
            .await?
            .ok_or_else(|| PlanningError::not_found("planning record", record_id))
    }

    async fn verify_paycheck(
        &self,
        account_id: BudgetAccountId,
        paycheck_id: PaycheckId,
    ) -> Result<(), PlanningError> {
        let pays = self
            .repo
            .find_income_source(account_id, paycheck_id.income_source_id())
            .await?
            .is_some_and(|source| PaycheckProjector::pays_on(&source, paycheck_id.date()));
        if pays {
            Ok(())
        } else {
            Err(PlanningError::not_found("paycheck", paycheck_id))
        }
    }

    async fn materialize(
        &self,
        account_id: BudgetAccountId,
        window: MonthWindow,
    ) -> Result<u64, PlanningError> {
        let debts = self.repo.list_debts(account_id).await?;
        let existing = self.repo.list_planning_records(account_id, window).await?;
        let missing = PlanningMaterializer::missing_records(account_id, &debts, &existing, window);
        if missing.is_empty() {
            return Ok(0);
        }

        let inserted = self.repo.insert_planning_records(missing).await?;
        info!(
            account_id = %account_id,
            window_start = %window.start(),
            window_end = %window.end(),
            inserted,
            "Planning records materialized"
        );
        Ok(inserted)
    }

    async fn resolve_debts(
        &self,
        account_id: BudgetAccountId,
        window: MonthWindow,
    ) -> Result<Vec<PlannedDebt>, PlanningError> {
        let debts = self.repo.list_debts(account_id).await?;
        let records = self.repo.list_planning_records(account_id, window).await?;
        let record_ids: Vec<PlanningRecordId> = records.iter().map(|r| r.id).collect();
        let allocations = self.repo.list_allocations(account_id, &record_ids).await?;
        Ok(PlanningAssembler::planned_debts(&records, &debts, &allocations))
    }

    /// Active records outside the window that a window paycheck funds.
    async fn carried_debts(
        &self,
        account_id: BudgetAccountId,
        paychecks: &[Paycheck],
        in_window: &[PlannedDebt],
    ) -> Result<Vec<PlannedDebt>, PlanningError> {
        if paychecks.is_empty() {
            return Ok(Vec::new());
        }
        let paycheck_ids: Vec<PaycheckId> = paychecks.iter().map(|p| p.id).collect();
        let loaded: HashSet<PlanningRecordId> =
            in_window.iter().map(|d| d.planning_record_id).collect();

        let allocations: Vec<DebtAllocation> = self
            .repo
            .list_allocations_for_paychecks(account_id, &paycheck_ids)
            .await?
            .into_iter()
            .filter(|a| !loaded.contains(&a.planning_record_id))
            .collect();
        if allocations.is_empty() {
            return Ok(Vec::new());
        }

        let record_ids: Vec<PlanningRecordId> =
            allocations.iter().map(|a| a.planning_record_id).collect();
        let records = self
            .repo
            .list_planning_records_by_ids(account_id, &record_ids)
            .await?;
        let debts = self.repo.list_debts(account_id).await?;

        Ok(PlanningAssembler::planned_debts(&records, &debts, &allocations)
            .into_iter()
            .filter(|d| d.is_active)
            .collect())
    }
}
