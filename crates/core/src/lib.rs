//! Core business logic for paycheck planning.
//!
//! This crate contains pure planning logic with no web or database
//! dependencies. Persistence is reached through [`planning::PlanningRepository`].
//!
//! # Modules
//!
//! - `calendar` - Month arithmetic and day clipping
//! - `paycheck` - Income sources and paycheck projection
//! - `planning` - Planning records, allocations, warnings and the planning service

pub mod calendar;
pub mod paycheck;
pub mod planning;
