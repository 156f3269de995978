//! Income source and paycheck types.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use payplan_shared::types::{IncomeSourceId, UserId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How often an income source pays out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    /// Every 7 days from the start date.
    Weekly,
    /// Every 14 days from the start date.
    Biweekly,
    /// Twice a month on fixed days.
    Semimonthly,
    /// Once a month on the start date's day.
    Monthly,
}

impl PayFrequency {
    /// Stable lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Biweekly => "biweekly",
            Self::Semimonthly => "semimonthly",
            Self::Monthly => "monthly",
        }
    }

    /// Day step for frequencies anchored on a fixed interval.
    #[must_use]
    pub const fn step_days(self) -> Option<i64> {
        match self {
            Self::Weekly => Some(7),
            Self::Biweekly => Some(14),
            Self::Semimonthly | Self::Monthly => None,
        }
    }
}

impl fmt::Display for PayFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PayFrequency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weekly" => Ok(Self::Weekly),
            "biweekly" => Ok(Self::Biweekly),
            "semimonthly" => Ok(Self::Semimonthly),
            "monthly" => Ok(Self::Monthly),
            other => Err(format!("unknown pay frequency: {other}")),
        }
    }
}

/// A recurring income definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeSource {
    /// Income source ID.
    pub id: IncomeSourceId,
    /// Owning user.
    pub user_id: UserId,
    /// Display name, copied onto each paycheck.
    pub name: String,
    /// Amount per paycheck.
    pub amount: Decimal,
    /// Pay frequency.
    pub frequency: PayFrequency,
    /// First pay date; anchors every frequency.
    pub start_date: NaiveDate,
    /// Last date that may carry a paycheck.
    pub end_date: Option<NaiveDate>,
    /// Second day of month for semimonthly pay. Derived from the start date when absent.
    pub second_pay_day: Option<u32>,
    /// Logical deletion flag.
    pub is_active: bool,
}

/// Error parsing a [`PaycheckId`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid paycheck id: {0}")]
pub struct ParsePaycheckIdError(pub String);

/// Deterministic paycheck identity: `<income_source_id>:<YYYY-MM-DD>`.
///
/// Two projections of the same source on the same date always agree, so
/// allocations keyed by paycheck id survive re-projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PaycheckId {
    income_source_id: IncomeSourceId,
    date: NaiveDate,
}

impl PaycheckId {
    /// Builds the id for an occurrence of `income_source_id` on `date`.
    #[must_use]
    pub const fn new(income_source_id: IncomeSourceId, date: NaiveDate) -> Self {
        Self {
            income_source_id,
            date,
        }
    }

    /// Income source the paycheck came from.
    #[must_use]
    pub const fn income_source_id(&self) -> IncomeSourceId {
        self.income_source_id
    }

    /// Pay date.
    #[must_use]
    pub const fn date(&self) -> NaiveDate {
        self.date
    }
}

impl fmt::Display for PaycheckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.income_source_id, self.date.format("%Y-%m-%d"))
    }
}

impl FromStr for PaycheckId {
    type Err = ParsePaycheckIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (source, date) = s
            .split_once(':')
            .ok_or_else(|| ParsePaycheckIdError(s.to_string()))?;
        let income_source_id =
            IncomeSourceId::from_str(source).map_err(|_| ParsePaycheckIdError(s.to_string()))?;
        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|_| ParsePaycheckIdError(s.to_string()))?;
        Ok(Self::new(income_source_id, date))
    }
}

impl TryFrom<String> for PaycheckId {
    type Error = ParsePaycheckIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaycheckId> for String {
    fn from(id: PaycheckId) -> Self {
        id.to_string()
    }
}

/// A projected income occurrence. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paycheck {
    /// Deterministic id.
    pub id: PaycheckId,
    /// Source income definition.
    pub income_source_id: IncomeSourceId,
    /// Owning user.
    pub user_id: UserId,
    /// Name of the income source.
    pub name: String,
    /// Paycheck amount.
    pub amount: Decimal,
    /// Pay date.
    pub date: NaiveDate,
    /// Frequency tag of the source.
    pub frequency: PayFrequency,
}
