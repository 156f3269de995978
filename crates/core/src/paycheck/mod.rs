//! Recurring income and projected paychecks.

pub mod projector;
pub mod types;

#[cfg(test)]
mod tests;

pub use projector::PaycheckProjector;
pub use types::{IncomeSource, ParsePaycheckIdError, PayFrequency, Paycheck, PaycheckId};
