//! `SeaORM` Entity for debt_allocations table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "debt_allocations")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_account_id: Uuid,
    #[sea_orm(unique)]
    pub monthly_debt_planning_id: Uuid,
    /// `<income_source_id>:<YYYY-MM-DD>`.
    pub paycheck_id: String,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))", nullable)]
    pub payment_amount: Option<Decimal>,
    pub payment_date: Option<Date>,
    pub is_paid: bool,
    pub paid_at: Option<DateTimeWithTimeZone>,
    #[sea_orm(column_type = "Text", nullable)]
    pub note: Option<String>,
    pub allocated_by: Uuid,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monthly_debt_planning::Entity",
        from = "Column::MonthlyDebtPlanningId",
        to = "super::monthly_debt_planning::Column::Id"
    )]
    MonthlyDebtPlanning,
}

impl Related<super::monthly_debt_planning::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyDebtPlanning.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
