//! Planning data types.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use payplan_shared::types::{AllocationId, BudgetAccountId, DebtId, DismissalId, PlanningRecordId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::warnings::{Warning, WarningType};
use crate::calendar::YearMonth;
use crate::paycheck::{Paycheck, PaycheckId};

/// A bill or liability definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Debt {
    /// Debt ID.
    pub id: DebtId,
    /// Owning budget account.
    pub budget_account_id: BudgetAccountId,
    /// User who created the debt.
    pub created_by: UserId,
    /// Display name.
    pub name: String,
    /// Regular payment amount.
    pub payment_amount: Decimal,
    /// Annual interest rate, percent.
    pub interest_rate: Decimal,
    /// Due date; only its day of month recurs.
    pub due_date: NaiveDate,
    /// Optional category label.
    pub category: Option<String>,
    /// Last month a payment is expected, if the debt ends.
    pub last_payment_month: Option<YearMonth>,
    /// Logical deletion flag.
    pub is_active: bool,
}

impl Debt {
    /// Day of month the debt falls due.
    #[must_use]
    pub fn due_day(&self) -> u32 {
        self.due_date.day()
    }

    /// Due date in `month`, clipped to the month's length.
    #[must_use]
    pub fn due_date_in(&self, month: YearMonth) -> NaiveDate {
        month.day(self.due_day())
    }

    /// Returns true if the debt expects a payment in `month`.
    #[must_use]
    pub fn is_planned_for(&self, month: YearMonth) -> bool {
        self.is_active && self.last_payment_month.is_none_or(|last| month <= last)
    }
}

/// One month's materialization of a debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanningRecord {
    /// Planning record ID.
    pub id: PlanningRecordId,
    /// Owning budget account.
    pub budget_account_id: BudgetAccountId,
    /// Debt this record plans.
    pub debt_id: DebtId,
    /// Planned month.
    pub period: YearMonth,
    /// Due date within `period`.
    pub due_date: NaiveDate,
    /// False when hidden from the month's view.
    pub is_active: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A planning record to insert if its (debt, month) slot is still free.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPlanningRecord {
    /// Planning record ID.
    pub id: PlanningRecordId,
    /// Owning budget account.
    pub budget_account_id: BudgetAccountId,
    /// Debt being planned.
    pub debt_id: DebtId,
    /// Planned month.
    pub period: YearMonth,
    /// Due date within `period`.
    pub due_date: NaiveDate,
}

/// Binding of a planning record to a paycheck.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DebtAllocation {
    /// Allocation ID.
    pub id: AllocationId,
    /// Owning budget account.
    pub budget_account_id: BudgetAccountId,
    /// Planning record being funded.
    pub planning_record_id: PlanningRecordId,
    /// Paycheck funding it.
    pub paycheck_id: PaycheckId,
    /// Amount override; the debt's payment amount applies when absent.
    pub payment_amount: Option<Decimal>,
    /// Payment date override; the record's due date applies when absent.
    pub payment_date: Option<NaiveDate>,
    /// Whether the payment has been made.
    pub is_paid: bool,
    /// When the payment was marked paid.
    pub paid_at: Option<DateTime<Utc>>,
    /// Free-text note.
    pub note: Option<String>,
    /// User who allocated.
    pub allocated_by: UserId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Allocation request action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllocationAction {
    /// Bind (or rebind) the record to the paycheck.
    Allocate,
    /// Remove the binding.
    Unallocate,
    /// Change override fields of the existing binding.
    Update,
}

/// Paycheck and override fields of an allocation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationInput {
    /// Target paycheck.
    pub paycheck_id: PaycheckId,
    /// Amount override.
    pub amount: Option<Decimal>,
    /// Payment date override.
    pub date: Option<NaiveDate>,
    /// Note.
    pub note: Option<String>,
}

impl AllocationInput {
    /// Input carrying only the paycheck.
    #[must_use]
    pub const fn paycheck(paycheck_id: PaycheckId) -> Self {
        Self {
            paycheck_id,
            amount: None,
            date: None,
            note: None,
        }
    }
}

/// Whether a mutation changed stored state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    /// Rows were written.
    Applied,
    /// Already in the requested state; nothing written.
    Unchanged,
}

impl MutationOutcome {
    /// Returns true if state changed.
    #[must_use]
    pub const fn changed(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// A dismissal of one warning identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DismissedWarning {
    /// Dismissal ID.
    pub id: DismissalId,
    /// Owning budget account.
    pub budget_account_id: BudgetAccountId,
    /// Warning type.
    pub warning_type: WarningType,
    /// Warning key.
    pub warning_key: String,
    /// User who dismissed.
    pub dismissed_by: UserId,
    /// Dismissal timestamp.
    pub dismissed_at: DateTime<Utc>,
}

/// Allocation lifecycle of a planning record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    /// No paycheck assigned.
    Unallocated,
    /// Assigned, not yet paid.
    Allocated,
    /// Assigned and paid.
    Paid,
}

/// Allocation details shown on a planned debt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AllocationView {
    /// Allocation ID.
    pub id: AllocationId,
    /// Funding paycheck.
    pub paycheck_id: PaycheckId,
    /// Amount override as stored.
    pub amount_override: Option<Decimal>,
    /// Date override as stored.
    pub date_override: Option<NaiveDate>,
    /// Paid flag.
    pub is_paid: bool,
    /// Paid timestamp.
    pub paid_at: Option<DateTime<Utc>>,
    /// Note.
    pub note: Option<String>,
}

/// A planning record with its debt and allocation resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedDebt {
    /// Planning record ID.
    pub planning_record_id: PlanningRecordId,
    /// Debt ID.
    pub debt_id: DebtId,
    /// Debt name.
    pub name: String,
    /// Debt category.
    pub category: Option<String>,
    /// Planned year.
    pub year: i32,
    /// Planned month.
    pub month: u32,
    /// Due date of the record.
    pub due_date: NaiveDate,
    /// Effective payment date (override or due date).
    pub payment_date: NaiveDate,
    /// Debt's current payment amount.
    pub default_amount: Decimal,
    /// Effective amount (override or default).
    pub amount: Decimal,
    /// Debt interest rate.
    pub interest_rate: Decimal,
    /// False when hidden.
    pub is_active: bool,
    /// Allocation status.
    pub status: AllocationStatus,
    /// Allocation, if any.
    pub allocation: Option<AllocationView>,
}

/// A projected paycheck with the active debts allocated to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaycheckView {
    /// The projected paycheck.
    #[serde(flatten)]
    pub paycheck: Paycheck,
    /// Sum of effective amounts allocated to it.
    pub allocated_total: Decimal,
    /// Amount minus allocated total; negative when overcommitted.
    pub remaining: Decimal,
    /// Planning records allocated to it.
    pub planning_record_ids: Vec<PlanningRecordId>,
}

/// Totals over the planning window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PlanningSummary {
    /// Sum of projected paychecks.
    pub total_income: Decimal,
    /// Sum of allocated debts, paid or not.
    pub total_allocated: Decimal,
    /// Sum of debts with no allocation.
    pub total_unallocated: Decimal,
    /// Sum of paid debts.
    pub total_paid: Decimal,
}

/// Combined read model for a planning window.
#[derive(Debug, Clone, Serialize)]
pub struct PlanningView {
    /// Target year.
    pub year: i32,
    /// Target month.
    pub month: u32,
    /// Months read beyond the target.
    pub lookahead_months: u32,
    /// Projected paychecks in the window.
    pub paychecks: Vec<PaycheckView>,
    /// Active planning records in the window.
    pub debts: Vec<PlannedDebt>,
    /// Warnings not dismissed.
    pub warnings: Vec<Warning>,
    /// Window totals.
    pub summary: PlanningSummary,
}
