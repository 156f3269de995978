//! `SeaORM` Entity for monthly_debt_planning table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_debt_planning")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub debt_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub due_date: Date,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::debts::Entity",
        from = "Column::DebtId",
        to = "super::debts::Column::Id"
    )]
    Debts,
    #[sea_orm(has_one = "super::debt_allocations::Entity")]
    DebtAllocations,
}

impl Related<super::debts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Debts.def()
    }
}

impl Related<super::debt_allocations::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DebtAllocations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
