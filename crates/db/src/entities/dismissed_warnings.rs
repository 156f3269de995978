//! `SeaORM` Entity for dismissed_warnings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "dismissed_warnings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub budget_account_id: Uuid,
    pub warning_type: String,
    pub warning_key: String,
    pub dismissed_by: Uuid,
    pub dismissed_at: DateTimeWithTimeZone,
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
