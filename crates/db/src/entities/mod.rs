//! `SeaORM` entity definitions for the planning schema.

pub mod budget_account_members;
pub mod budget_accounts;
pub mod debt_allocations;
pub mod debts;
pub mod dismissed_warnings;
pub mod income_sources;
pub mod monthly_debt_planning;
