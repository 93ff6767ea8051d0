//! Tests for cash-budget scope resolution and summation.

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use rstest::rstest;

use super::service::BudgetService;
use super::types::{CASH_CATEGORY, CashHolding, CashScope};

fn holding(
    owner: &str,
    category: &str,
    partnership_id: Option<&str>,
    value: Decimal,
) -> CashHolding {
    CashHolding {
        owner: owner.to_string(),
        category: category.to_string(),
        partnership_id: partnership_id.map(ToString::to_string),
        value,
    }
}

// ============================================================================
// Scope resolution
// ============================================================================

#[test]
fn test_scope_without_partner_is_owner_only() {
    let scope = BudgetService::cash_scope("alice", None, None);
    assert_eq!(
        scope,
        CashScope::Owner {
            username: "alice".to_string()
        }
    );
}

#[rstest]
#[case(Some("bob"), None)]
#[case(None, Some("p1"))]
fn test_half_linked_account_stays_owner_only(
    #[case] partner: Option<&str>,
    #[case] partnership: Option<&str>,
) {
    let scope = BudgetService::cash_scope("alice", partner, partnership);
    assert_eq!(
        scope,
        CashScope::Owner {
            username: "alice".to_string()
        }
    );
}

#[test]
fn test_full_link_resolves_to_partnership_union() {
    let scope = BudgetService::cash_scope("alice", Some("bob"), Some("p1"));
    assert_eq!(
        scope,
        CashScope::Partnership {
            username: "alice".to_string(),
            partner: "bob".to_string(),
            partnership_id: "p1".to_string()
        }
    );
}

// ============================================================================
// Summation
// ============================================================================

#[test]
fn test_owner_scope_sums_own_cash_only() {
    let scope = BudgetService::cash_scope("alice", None, None);
    let holdings = vec![
        holding("alice", CASH_CATEGORY, None, dec!(5000)),
        holding("alice", "Döviz", None, dec!(3500)),
        holding("bob", CASH_CATEGORY, None, dec!(2000)),
    ];

    assert_eq!(BudgetService::cash_total(&scope, &holdings), dec!(5000));
}

#[test]
fn test_partnership_scope_unions_stamped_and_personal_rows() {
    // Alice's holding carries the shared stamp; Bob's personal cash asset
    // predates the partnership and has no stamp. The union must reach both,
    // whichever member the sync runs for.
    let holdings = vec![
        holding("alice", CASH_CATEGORY, Some("p1"), dec!(5000)),
        holding("bob", CASH_CATEGORY, None, dec!(2000)),
    ];

    let alice_scope = BudgetService::cash_scope("alice", Some("bob"), Some("p1"));
    let bob_scope = BudgetService::cash_scope("bob", Some("alice"), Some("p1"));

    assert_eq!(
        BudgetService::cash_total(&alice_scope, &holdings),
        dec!(7000)
    );
    assert_eq!(BudgetService::cash_total(&bob_scope, &holdings), dec!(7000));
}

#[test]
fn test_no_matching_rows_yields_zero() {
    let scope = BudgetService::cash_scope("alice", None, None);
    assert_eq!(BudgetService::cash_total(&scope, &[]), Decimal::ZERO);

    let non_cash = vec![holding("alice", "Altın", None, dec!(900))];
    assert_eq!(BudgetService::cash_total(&scope, &non_cash), Decimal::ZERO);
}

#[test]
fn test_summation_is_idempotent() {
    let scope = BudgetService::cash_scope("alice", Some("bob"), Some("p1"));
    let holdings = vec![
        holding("alice", CASH_CATEGORY, Some("p1"), dec!(5000)),
        holding("bob", CASH_CATEGORY, Some("p1"), dec!(1250.50)),
    ];

    let first = BudgetService::cash_total(&scope, &holdings);
    let second = BudgetService::cash_total(&scope, &holdings);
    assert_eq!(first, second);
    assert_eq!(first, dec!(6250.50));
}

// ============================================================================
// Sync trigger policy
// ============================================================================

#[rstest]
#[case(None, Some(CASH_CATEGORY), true)] // create cash
#[case(Some(CASH_CATEGORY), None, true)] // delete cash
#[case(Some(CASH_CATEGORY), Some("Döviz"), true)] // recategorize away from cash
#[case(Some("Döviz"), Some(CASH_CATEGORY), true)] // recategorize into cash
#[case(Some("Döviz"), Some("Altın"), false)]
#[case(None, Some("Döviz"), false)]
fn test_mutation_touches_cash(
    #[case] old: Option<&str>,
    #[case] new: Option<&str>,
    #[case] expected: bool,
) {
    assert_eq!(BudgetService::mutation_touches_cash(old, new), expected);
}

#[test]
fn test_cash_category_is_exact() {
    assert!(BudgetService::is_cash_category("Nakit"));
    assert!(!BudgetService::is_cash_category("nakit"));
    assert!(!BudgetService::is_cash_category("Nakit "));
}

// ============================================================================
// Validation
// ============================================================================

#[test]
fn test_negative_value_rejected() {
    use super::error::BudgetError;

    assert_eq!(
        BudgetService::validate_value(dec!(-0.01)),
        Err(BudgetError::NegativeAmount)
    );
    assert_eq!(BudgetService::validate_value(Decimal::ZERO), Ok(()));
    assert_eq!(BudgetService::validate_value(dec!(5000)), Ok(()));
}

// ============================================================================
// Properties
// ============================================================================

fn cents() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000).prop_map(|n| Decimal::new(n, 2))
}

proptest! {
    /// The partnership union never loses value relative to owner-only scope.
    #[test]
    fn prop_union_scope_dominates_owner_scope(
        own in prop::collection::vec(cents(), 0..8),
        stamped in prop::collection::vec(cents(), 0..8),
    ) {
        let mut holdings: Vec<CashHolding> = own
            .iter()
            .map(|v| holding("alice", CASH_CATEGORY, None, *v))
            .collect();
        holdings.extend(
            stamped
                .iter()
                .map(|v| holding("bob", CASH_CATEGORY, Some("p1"), *v)),
        );

        let owner_scope = BudgetService::cash_scope("alice", None, None);
        let union_scope = BudgetService::cash_scope("alice", Some("bob"), Some("p1"));

        let owner_total = BudgetService::cash_total(&owner_scope, &holdings);
        let union_total = BudgetService::cash_total(&union_scope, &holdings);

        prop_assert!(union_total >= owner_total);
        prop_assert_eq!(union_total, own.iter().sum::<Decimal>() + stamped.iter().sum::<Decimal>());
    }

    /// Non-cash rows never move the total, whatever their value.
    #[test]
    fn prop_non_cash_rows_are_inert(
        cash in prop::collection::vec(cents(), 0..8),
        noise in prop::collection::vec(cents(), 0..8),
    ) {
        let mut holdings: Vec<CashHolding> = cash
            .iter()
            .map(|v| holding("alice", CASH_CATEGORY, None, *v))
            .collect();
        let baseline_scope = BudgetService::cash_scope("alice", None, None);
        let baseline = BudgetService::cash_total(&baseline_scope, &holdings);

        holdings.extend(noise.iter().map(|v| holding("alice", "Döviz", None, *v)));

        prop_assert_eq!(
            BudgetService::cash_total(&baseline_scope, &holdings),
            baseline
        );
    }
}
