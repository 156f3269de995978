//! Monthly debt planning against projected paychecks.
//!
//! Planning records materialize each debt once per month, allocations bind
//! a record to one paycheck, and warnings flag risky allocation states.

pub mod allocation;
pub mod error;
pub mod materializer;
pub mod memory;
pub mod repository;
pub mod service;
pub mod types;
pub mod view;
pub mod warnings;


pub use allocation::AllocationRules;
pub use error::PlanningError;
pub use materializer::PlanningMaterializer;
pub use memory::InMemoryPlanningRepository;
pub use repository::PlanningRepository;
pub use service::PlanningService;
pub use types::{
    AllocationAction, AllocationInput, AllocationStatus, AllocationView, Debt, DebtAllocation,
    DismissedWarning, MutationOutcome, NewPlanningRecord, PaycheckView, PlannedDebt,
    PlanningRecord, PlanningSummary, PlanningView,
};
pub use view::PlanningAssembler;
pub use warnings::{MAX_WARNING_KEY_LEN, Warning, WarningKind, WarningType, WarningsEngine};
