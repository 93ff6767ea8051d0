//! Budget error types.

use thiserror::Error;

/// Budget-related validation errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// Amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,
}
