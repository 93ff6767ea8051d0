//! Budget service: the pure half of the cash-budget synchronizer.
//!
//! The repository layer fetches asset rows and persists the result; everything
//! that decides *which* rows count and *what* the total is lives here.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::{CASH_CATEGORY, CashHolding, CashScope};

/// Budget service for business logic.
pub struct BudgetService;

impl BudgetService {
    /// Resolves the scope of asset rows feeding a user's cash budget.
    ///
    /// The union scope applies only when both a partner username and a shared
    /// partnership id are known; a half-linked account (either field alone)
    /// sums its own rows, the same as an unlinked one.
    #[must_use]
    pub fn cash_scope(
        username: &str,
        partner_username: Option<&str>,
        partnership_id: Option<&str>,
    ) -> CashScope {
        match (partner_username, partnership_id) {
            (Some(partner), Some(shared)) => CashScope::Partnership {
                username: username.to_string(),
                partner: partner.to_string(),
                partnership_id: shared.to_string(),
            },
            _ => CashScope::Owner {
                username: username.to_string(),
            },
        }
    }

    /// Returns true if the category feeds the cash budget.
    #[must_use]
    pub fn is_cash_category(category: &str) -> bool {
        category == CASH_CATEGORY
    }

    /// Returns true if a mutation moving between these categories must
    /// trigger a budget sync: the row is, or was, cash.
    #[must_use]
    pub fn mutation_touches_cash(old_category: Option<&str>, new_category: Option<&str>) -> bool {
        old_category.is_some_and(Self::is_cash_category)
            || new_category.is_some_and(Self::is_cash_category)
    }

    /// Sums the cash value of the holdings inside the scope.
    ///
    /// Non-cash categories never count. No matching rows yields zero, not an
    /// absence.
    #[must_use]
    pub fn cash_total(scope: &CashScope, holdings: &[CashHolding]) -> Decimal {
        holdings
            .iter()
            .filter(|h| Self::is_cash_category(&h.category))
            .filter(|h| scope.contains(&h.owner, h.partnership_id.as_deref()))
            .map(|h| h.value)
            .sum()
    }

    /// Validates a client-supplied monetary value.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeAmount` if the value is negative.
    pub fn validate_value(value: Decimal) -> Result<(), BudgetError> {
        if value < Decimal::ZERO {
            return Err(BudgetError::NegativeAmount);
        }
        Ok(())
    }
}
