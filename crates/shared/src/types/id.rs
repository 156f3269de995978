//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `DebtId` where a `PlanningRecordId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(UserId, "Unique identifier for a user.");
typed_id!(BudgetAccountId, "Unique identifier for a budget account.");
typed_id!(IncomeSourceId, "Unique identifier for a recurring income source.");
typed_id!(DebtId, "Unique identifier for a debt or bill definition.");
typed_id!(
    PlanningRecordId,
    "Unique identifier for a monthly debt planning record."
);
typed_id!(AllocationId, "Unique identifier for a debt allocation.");
typed_id!(DismissalId, "Unique identifier for a warning dismissal.");

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
