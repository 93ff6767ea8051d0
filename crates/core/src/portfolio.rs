//! Effective portfolio valuation.
//!
//! Portfolio holdings (foreign currency, gold) contribute to the budget shown
//! to the client only through a derived "effective value": amount times the
//! last-known TRY unit price, gated by the owner's inclusion toggle. The
//! stored budget row never absorbs this figure.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A portfolio row as seen by the valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioHolding {
    /// Quantity held.
    pub amount: Decimal,
    /// Last-known TRY unit price.
    pub rate: Decimal,
}

impl PortfolioHolding {
    /// TRY value of this holding.
    #[must_use]
    pub fn value(&self) -> Decimal {
        self.amount * self.rate
    }
}

/// Sums the TRY value of the holdings, honoring the inclusion toggle.
///
/// With the toggle off the contribution is zero regardless of holdings.
#[must_use]
pub fn effective_value(holdings: &[PortfolioHolding], included: bool) -> Decimal {
    if !included {
        return Decimal::ZERO;
    }
    holdings.iter().map(PortfolioHolding::value).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn holding(amount: Decimal, rate: Decimal) -> PortfolioHolding {
        PortfolioHolding { amount, rate }
    }

    #[test]
    fn test_effective_value_sums_amount_times_rate() {
        let holdings = vec![
            holding(dec!(100), dec!(41.95)),   // USD
            holding(dec!(2.5), dec!(5123.40)), // gram gold
        ];

        assert_eq!(effective_value(&holdings, true), dec!(17003.50));
    }

    #[test]
    fn test_toggle_off_zeroes_contribution() {
        let holdings = vec![holding(dec!(100), dec!(41.95))];
        assert_eq!(effective_value(&holdings, false), Decimal::ZERO);
    }

    #[test]
    fn test_empty_portfolio_is_zero() {
        assert_eq!(effective_value(&[], true), Decimal::ZERO);
    }

    proptest! {
        /// The toggle only ever switches between zero and the full sum.
        #[test]
        fn prop_toggle_is_all_or_nothing(
            amounts in prop::collection::vec((1i64..100_000, 1i64..10_000_000), 0..8),
        ) {
            let holdings: Vec<PortfolioHolding> = amounts
                .iter()
                .map(|(a, r)| holding(Decimal::new(*a, 2), Decimal::new(*r, 2)))
                .collect();

            let on = effective_value(&holdings, true);
            let off = effective_value(&holdings, false);

            prop_assert_eq!(off, Decimal::ZERO);
            prop_assert_eq!(on, holdings.iter().map(PortfolioHolding::value).sum::<Decimal>());
        }
    }
}
