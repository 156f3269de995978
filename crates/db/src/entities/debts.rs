//! `SeaORM` Entity for debts table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "debts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub created_by: Uuid,
    pub name: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub payment_amount: Decimal,
    #[sea_orm(column_type = "Decimal(Some((7, 4)))")]
    pub interest_rate: Decimal,
    pub due_date: Date,
    pub category: Option<String>,
    /// First day of the last month a payment is expected.
    pub last_payment_month: Option<Date>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_accounts::Entity",
        from = "Column::BudgetAccountId",
        to = "super::budget_accounts::Column::Id"
    )]
    BudgetAccounts,
    #[sea_orm(has_many = "super::monthly_debt_planning::Entity")]
    MonthlyDebtPlanning,
}

impl Related<super::budget_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAccounts.def()
    }
}

impl Related<super::monthly_debt_planning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyDebtPlanning.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
