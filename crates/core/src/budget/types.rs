//! Budget data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The distinguished asset category that feeds the cash budget.
pub const CASH_CATEGORY: &str = "Nakit";

/// An asset row as seen by the budget synchronizer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashHolding {
    /// Username of the owning account.
    pub owner: String,
    /// Free-text category; only `"Nakit"` counts toward the budget.
    pub category: String,
    /// Partnership id stamped at creation, if the owner was linked then.
    pub partnership_id: Option<String>,
    /// Monetary value of the holding.
    pub value: Decimal,
}

/// Which asset rows feed a user's cash budget.
///
/// The partnership variant unions rows owned by either member of the pair
/// with rows stamped with the shared id. Assets recorded before the
/// partnership existed carry no stamp and are reachable through the owner
/// half of the filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashScope {
    /// Rows owned solely by the user.
    Owner {
        /// Acting username.
        username: String,
    },
    /// Rows owned by either member OR stamped with the shared partnership id.
    Partnership {
        /// Acting username.
        username: String,
        /// Linked partner username.
        partner: String,
        /// Shared partnership id.
        partnership_id: String,
    },
}

impl CashScope {
    /// Returns true if a row with the given owner and stamp falls inside
    /// this scope. Category is checked separately.
    #[must_use]
    pub fn contains(&self, owner: &str, partnership_id: Option<&str>) -> bool {
        match self {
            Self::Owner { username } => owner == username,
            Self::Partnership {
                username,
                partner,
                partnership_id: shared,
            } => owner == username || owner == partner || partnership_id == Some(shared.as_str()),
        }
    }
}
