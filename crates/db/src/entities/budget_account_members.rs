//! `SeaORM` Entity for budget_account_members table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_account_members")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub budget_account_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: Uuid,
    pub role: String,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::budget_accounts::Entity",
        from = "Column::BudgetAccountId",
        to = "super::budget_accounts::Column::Id"
    )]
    BudgetAccounts,
}

impl Related<super::budget_accounts::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAccounts.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
