//! Planning repository for database operations.
//!
//! Implements the planning persistence port using SeaORM.

use chrono::{DateTime, Utc};
use payplan_core::calendar::{MonthWindow, YearMonth};
use payplan_core::paycheck::{IncomeSource, PaycheckId};
use payplan_core::planning::{
    Debt, DebtAllocation, DismissedWarning, NewPlanningRecord, PlanningError, PlanningRecord,
    PlanningRepository as PlanningRepoTrait,
};
use payplan_shared::types::{
    AllocationId, BudgetAccountId, DebtId, DismissalId, IncomeSourceId, PlanningRecordId, UserId,
};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};

use crate::entities::{
    budget_account_members, debt_allocations, debts, dismissed_warnings, income_sources,
    monthly_debt_planning,
};

/// Planning repository implementation.
#[derive(Debug, Clone)]
pub struct PlanningRepository {
    db: DatabaseConnection,
}

impl PlanningRepository {
    /// Create a new planning repository.
    #[must_use]
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl PlanningRepoTrait for PlanningRepository {
    async fn is_member(
        &self,
        account_id: BudgetAccountId,
        user_id: UserId,
    ) -> Result<bool, PlanningError> {
        let count = budget_account_members::Entity::find()
            .filter(budget_account_members::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(budget_account_members::Column::UserId.eq(user_id.into_inner()))
            .count(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(count > 0)
    }

    async fn list_income_sources(
        &self,
        account_id: BudgetAccountId,
    ) -> Result<Vec<IncomeSource>, PlanningError> {
        let models = income_sources::Entity::find()
            .filter(income_sources::Column::BudgetAccountId.eq(account_id.into_inner()))
            .order_by_asc(income_sources::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(income_source_to_domain).collect()
    }

    async fn find_income_source(
        &self,
        account_id: BudgetAccountId,
        income_source_id: IncomeSourceId,
    ) -> Result<Option<IncomeSource>, PlanningError> {
        let model = income_sources::Entity::find_by_id(income_source_id.into_inner())
            .filter(income_sources::Column::BudgetAccountId.eq(account_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        model.map(income_source_to_domain).transpose()
    }

    async fn list_debts(&self, account_id: BudgetAccountId) -> Result<Vec<Debt>, PlanningError> {
        let models = debts::Entity::find()
            .filter(debts::Column::BudgetAccountId.eq(account_id.into_inner()))
            .order_by_asc(debts::Column::Name)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(models.into_iter().map(debt_to_domain).collect())
    }

    async fn list_planning_records(
        &self,
        account_id: BudgetAccountId,
        window: MonthWindow,
    ) -> Result<Vec<PlanningRecord>, PlanningError> {
        let models = monthly_debt_planning::Entity::find()
            .filter(monthly_debt_planning::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(
                monthly_debt_planning::Column::Year
                    .between(window.start().year(), window.end().year()),
            )
            .order_by_asc(monthly_debt_planning::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        let records = models
            .into_iter()
            .map(planning_record_to_domain)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records
            .into_iter()
            .filter(|r| window.includes(r.period))
            .collect())
    }

    async fn insert_planning_records(
        &self,
        records: Vec<NewPlanningRecord>,
    ) -> Result<u64, PlanningError> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().into();
        let models = records
            .into_iter()
            .map(|r| {
                let month =
                    i32::try_from(r.period.month()).map_err(|e| corrupt("planning month", e))?;
                Ok(monthly_debt_planning::ActiveModel {
                    id: Set(r.id.into_inner()),
                    budget_account_id: Set(r.budget_account_id.into_inner()),
                    debt_id: Set(r.debt_id.into_inner()),
                    year: Set(r.period.year()),
                    month: Set(month),
                    due_date: Set(r.due_date),
                    is_active: Set(true),
                    created_at: Set(now),
                    updated_at: Set(now),
                })
            })
            .collect::<Result<Vec<_>, PlanningError>>()?;

        // Concurrent readers may materialize the same slot; the unique index decides.
        monthly_debt_planning::Entity::insert_many(models)
            .on_conflict(
                OnConflict::columns([
                    monthly_debt_planning::Column::BudgetAccountId,
                    monthly_debt_planning::Column::DebtId,
                    monthly_debt_planning::Column::Year,
                    monthly_debt_planning::Column::Month,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)
    }

    async fn list_planning_records_by_ids(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> Result<Vec<PlanningRecord>, PlanningError> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = monthly_debt_planning::Entity::find()
            .filter(monthly_debt_planning::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(
                monthly_debt_planning::Column::Id
                    .is_in(record_ids.iter().map(|id| id.into_inner())),
            )
            .order_by_asc(monthly_debt_planning::Column::DueDate)
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(planning_record_to_domain).collect()
    }

    async fn find_planning_record(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> Result<Option<PlanningRecord>, PlanningError> {
        let model = monthly_debt_planning::Entity::find_by_id(record_id.into_inner())
            .filter(monthly_debt_planning::Column::BudgetAccountId.eq(account_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        model.map(planning_record_to_domain).transpose()
    }

    async fn set_planning_record_active(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        is_active: bool,
    ) -> Result<bool, PlanningError> {
        let result = monthly_debt_planning::Entity::update_many()
            .col_expr(monthly_debt_planning::Column::IsActive, Expr::value(is_active))
            .col_expr(
                monthly_debt_planning::Column::UpdatedAt,
                Expr::value(sea_orm::prelude::DateTimeWithTimeZone::from(Utc::now())),
            )
            .filter(monthly_debt_planning::Column::Id.eq(record_id.into_inner()))
            .filter(monthly_debt_planning::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(monthly_debt_planning::Column::IsActive.ne(is_active))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.rows_affected > 0)
    }

    async fn list_allocations(
        &self,
        account_id: BudgetAccountId,
        record_ids: &[PlanningRecordId],
    ) -> Result<Vec<DebtAllocation>, PlanningError> {
        if record_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = debt_allocations::Entity::find()
            .filter(debt_allocations::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(
                debt_allocations::Column::MonthlyDebtPlanningId
                    .is_in(record_ids.iter().map(|id| id.into_inner())),
            )
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(allocation_to_domain).collect()
    }

    async fn list_allocations_for_paychecks(
        &self,
        account_id: BudgetAccountId,
        paycheck_ids: &[PaycheckId],
    ) -> Result<Vec<DebtAllocation>, PlanningError> {
        if paycheck_ids.is_empty() {
            return Ok(Vec::new());
        }

        let models = debt_allocations::Entity::find()
            .filter(debt_allocations::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(
                debt_allocations::Column::PaycheckId
                    .is_in(paycheck_ids.iter().map(ToString::to_string)),
            )
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(allocation_to_domain).collect()
    }

    async fn find_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
    ) -> Result<Option<DebtAllocation>, PlanningError> {
        let model = debt_allocations::Entity::find()
            .filter(debt_allocations::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(debt_allocations::Column::MonthlyDebtPlanningId.eq(record_id.into_inner()))
            .one(&self.db)
            .await
            .map_err(repo_err)?;

        model.map(allocation_to_domain).transpose()
    }

    async fn replace_allocation(&self, allocation: DebtAllocation) -> Result<(), PlanningError> {
        // One statement, so concurrent replaces serialize on the unique index
        // and the last one wins.
        debt_allocations::Entity::insert(allocation_to_active(&allocation))
            .on_conflict(
                OnConflict::column(debt_allocations::Column::MonthlyDebtPlanningId)
                    .update_columns([
                        debt_allocations::Column::Id,
                        debt_allocations::Column::PaycheckId,
                        debt_allocations::Column::PaymentAmount,
                        debt_allocations::Column::PaymentDate,
                        debt_allocations::Column::IsPaid,
                        debt_allocations::Column::PaidAt,
                        debt_allocations::Column::Note,
                        debt_allocations::Column::AllocatedBy,
                        debt_allocations::Column::CreatedAt,
                        debt_allocations::Column::UpdatedAt,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(())
    }

    async fn delete_allocation(
        &self,
        account_id: BudgetAccountId,
        record_id: PlanningRecordId,
        paycheck_id: PaycheckId,
    ) -> Result<u64, PlanningError> {
        let result = debt_allocations::Entity::delete_many()
            .filter(debt_allocations::Column::BudgetAccountId.eq(account_id.into_inner()))
            .filter(debt_allocations::Column::MonthlyDebtPlanningId.eq(record_id.into_inner()))
            .filter(debt_allocations::Column::PaycheckId.eq(paycheck_id.to_string()))
            .exec(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(result.rows_affected)
    }

    async fn save_allocation(&self, allocation: DebtAllocation) -> Result<(), PlanningError> {
        allocation_to_active(&allocation)
            .update(&self.db)
            .await
            .map_err(|e| match e {
                DbErr::RecordNotUpdated => PlanningError::not_found("allocation", allocation.id),
                other => repo_err(other),
            })?;

        Ok(())
    }

    async fn list_dismissed_warnings(
        &self,
        account_id: BudgetAccountId,
    ) -> Result<Vec<DismissedWarning>, PlanningError> {
        let models = dismissed_warnings::Entity::find()
            .filter(dismissed_warnings::Column::BudgetAccountId.eq(account_id.into_inner()))
            .all(&self.db)
            .await
            .map_err(repo_err)?;

        models.into_iter().map(dismissal_to_domain).collect()
    }

    async fn insert_dismissal(&self, dismissal: DismissedWarning) -> Result<bool, PlanningError> {
        let model = dismissed_warnings::ActiveModel {
            id: Set(dismissal.id.into_inner()),
            budget_account_id: Set(dismissal.budget_account_id.into_inner()),
            warning_type: Set(dismissal.warning_type.as_str().to_string()),
            warning_key: Set(dismissal.warning_key),
            dismissed_by: Set(dismissal.dismissed_by.into_inner()),
            dismissed_at: Set(dismissal.dismissed_at.into()),
        };

        let inserted = dismissed_warnings::Entity::insert(model)
            .on_conflict(
                OnConflict::columns([
                    dismissed_warnings::Column::BudgetAccountId,
                    dismissed_warnings::Column::WarningType,
                    dismissed_warnings::Column::WarningKey,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .map_err(repo_err)?;

        Ok(inserted > 0)
    }
}

fn repo_err(e: DbErr) -> PlanningError {
    PlanningError::repository(e.to_string())
}

fn corrupt(what: &str, detail: impl std::fmt::Display) -> PlanningError {
    PlanningError::repository(format!("invalid stored {what}: {detail}"))
}

fn utc(ts: sea_orm::prelude::DateTimeWithTimeZone) -> DateTime<Utc> {
    ts.with_timezone(&Utc)
}

fn income_source_to_domain(model: income_sources::Model) -> Result<IncomeSource, PlanningError> {
    let frequency = model
        .frequency
        .parse()
        .map_err(|e| corrupt("income frequency", e))?;
    let second_pay_day = model
        .second_pay_day
        .map(u32::try_from)
        .transpose()
        .map_err(|e| corrupt("second pay day", e))?;

    Ok(IncomeSource {
        id: IncomeSourceId::from_uuid(model.id),
        user_id: UserId::from_uuid(model.user_id),
        name: model.name,
        amount: model.amount,
        frequency,
        start_date: model.start_date,
        end_date: model.end_date,
        second_pay_day,
        is_active: model.is_active,
    })
}

fn debt_to_domain(model: debts::Model) -> Debt {
    Debt {
        id: DebtId::from_uuid(model.id),
        budget_account_id: BudgetAccountId::from_uuid(model.budget_account_id),
        created_by: UserId::from_uuid(model.created_by),
        name: model.name,
        payment_amount: model.payment_amount,
        interest_rate: model.interest_rate,
        due_date: model.due_date,
        category: model.category,
        last_payment_month: model.last_payment_month.map(YearMonth::of),
        is_active: model.is_active,
    }
}

fn planning_record_to_domain(
    model: monthly_debt_planning::Model,
) -> Result<PlanningRecord, PlanningError> {
    let month = u32::try_from(model.month).map_err(|e| corrupt("planning month", e))?;
    let period = YearMonth::new(model.year, month).map_err(|e| corrupt("planning month", e))?;

    Ok(PlanningRecord {
        id: PlanningRecordId::from_uuid(model.id),
        budget_account_id: BudgetAccountId::from_uuid(model.budget_account_id),
        debt_id: DebtId::from_uuid(model.debt_id),
        period,
        due_date: model.due_date,
        is_active: model.is_active,
        created_at: utc(model.created_at),
    })
}

fn allocation_to_domain(model: debt_allocations::Model) -> Result<DebtAllocation, PlanningError> {
    let paycheck_id: PaycheckId = model
        .paycheck_id
        .parse()
        .map_err(|e| corrupt("paycheck id", e))?;

    Ok(DebtAllocation {
        id: AllocationId::from_uuid(model.id),
        budget_account_id: BudgetAccountId::from_uuid(model.budget_account_id),
        planning_record_id: PlanningRecordId::from_uuid(model.monthly_debt_planning_id),
        paycheck_id,
        payment_amount: model.payment_amount,
        payment_date: model.payment_date,
        is_paid: model.is_paid,
        paid_at: model.paid_at.map(utc),
        note: model.note,
        allocated_by: UserId::from_uuid(model.allocated_by),
        created_at: utc(model.created_at),
        updated_at: utc(model.updated_at),
    })
}

fn allocation_to_active(allocation: &DebtAllocation) -> debt_allocations::ActiveModel {
    debt_allocations::ActiveModel {
        id: Set(allocation.id.into_inner()),
        budget_account_id: Set(allocation.budget_account_id.into_inner()),
        monthly_debt_planning_id: Set(allocation.planning_record_id.into_inner()),
        paycheck_id: Set(allocation.paycheck_id.to_string()),
        payment_amount: Set(allocation.payment_amount),
        payment_date: Set(allocation.payment_date),
        is_paid: Set(allocation.is_paid),
        paid_at: Set(allocation.paid_at.map(Into::into)),
        note: Set(allocation.note.clone()),
        allocated_by: Set(allocation.allocated_by.into_inner()),
        created_at: Set(allocation.created_at.into()),
        updated_at: Set(allocation.updated_at.into()),
    }
}

fn dismissal_to_domain(model: dismissed_warnings::Model) -> Result<DismissedWarning, PlanningError> {
    let warning_type = model
        .warning_type
        .parse()
        .map_err(|e| corrupt("warning type", e))?;

    Ok(DismissedWarning {
        id: DismissalId::from_uuid(model.id),
        budget_account_id: BudgetAccountId::from_uuid(model.budget_account_id),
        warning_type,
        warning_key: model.warning_key,
        dismissed_by: UserId::from_uuid(model.dismissed_by),
        dismissed_at: utc(model.dismissed_at),
    })
}
