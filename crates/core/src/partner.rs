//! Partner-aware query scope fallback rules.
//!
//! Dashboard reads merge a user's records with their partner's. How the merge
//! happens depends on which link fields are populated, and deliberately
//! differs between record kinds:
//!
//! - expenses and portfolio items fall back through three strategies
//!   (usernames union, partnership-id-or-owner, owner only);
//! - assets are fetched **strictly by partnership id** when both the partner
//!   username and the shared id are known.
//!
//! The asset strictness is observed production behavior; widening it would
//! silently change which assets each partner sees, so the two rules are kept
//! as separate constructors.

use serde::{Deserialize, Serialize};

/// Which rows a partner-aware read returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordScope {
    /// Rows owned by either member of the pair.
    Couple {
        /// Acting username.
        username: String,
        /// Linked partner username.
        partner: String,
    },
    /// Rows stamped with the partnership id, or owned by the user.
    PartnershipOrOwner {
        /// Acting username.
        username: String,
        /// Shared partnership id.
        partnership_id: String,
    },
    /// Rows stamped with the partnership id only.
    Partnership {
        /// Shared partnership id.
        partnership_id: String,
    },
    /// Rows owned by the user alone.
    Owner {
        /// Acting username.
        username: String,
    },
}

impl RecordScope {
    /// Scope for expense and portfolio reads.
    ///
    /// Fallback order: partner username known, then partnership id known,
    /// then the user alone.
    #[must_use]
    pub fn for_records(
        username: &str,
        partner_username: Option<&str>,
        partnership_id: Option<&str>,
    ) -> Self {
        match (partner_username, partnership_id) {
            (Some(partner), _) => Self::Couple {
                username: username.to_string(),
                partner: partner.to_string(),
            },
            (None, Some(shared)) => Self::PartnershipOrOwner {
                username: username.to_string(),
                partnership_id: shared.to_string(),
            },
            (None, None) => Self::Owner {
                username: username.to_string(),
            },
        }
    }

    /// Scope for asset reads.
    ///
    /// Stricter than `for_records`: with both the partner username and the
    /// shared id known, only stamped rows are returned.
    #[must_use]
    pub fn for_assets(
        username: &str,
        partner_username: Option<&str>,
        partnership_id: Option<&str>,
    ) -> Self {
        match (partner_username, partnership_id) {
            (Some(_), Some(shared)) => Self::Partnership {
                partnership_id: shared.to_string(),
            },
            (Some(partner), None) => Self::Couple {
                username: username.to_string(),
                partner: partner.to_string(),
            },
            (None, Some(shared)) => Self::PartnershipOrOwner {
                username: username.to_string(),
                partnership_id: shared.to_string(),
            },
            (None, None) => Self::Owner {
                username: username.to_string(),
            },
        }
    }

    /// Returns true if a row with the given owner and stamp falls inside
    /// this scope.
    #[must_use]
    pub fn contains(&self, owner: &str, partnership_id: Option<&str>) -> bool {
        match self {
            Self::Couple { username, partner } => owner == username || owner == partner,
            Self::PartnershipOrOwner {
                username,
                partnership_id: shared,
            } => owner == username || partnership_id == Some(shared.as_str()),
            Self::Partnership {
                partnership_id: shared,
            } => partnership_id == Some(shared.as_str()),
            Self::Owner { username } => owner == username,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_record_fallback_prefers_partner_username() {
        let scope = RecordScope::for_records("alice", Some("bob"), Some("p1"));
        assert_eq!(
            scope,
            RecordScope::Couple {
                username: "alice".to_string(),
                partner: "bob".to_string()
            }
        );
    }

    #[test]
    fn test_record_fallback_uses_partnership_when_partner_unknown() {
        let scope = RecordScope::for_records("alice", None, Some("p1"));
        assert_eq!(
            scope,
            RecordScope::PartnershipOrOwner {
                username: "alice".to_string(),
                partnership_id: "p1".to_string()
            }
        );
    }

    #[test]
    fn test_record_fallback_degrades_to_owner() {
        let scope = RecordScope::for_records("alice", None, None);
        assert_eq!(
            scope,
            RecordScope::Owner {
                username: "alice".to_string()
            }
        );
    }

    #[test]
    fn test_asset_scope_is_strict_when_fully_linked() {
        let scope = RecordScope::for_assets("alice", Some("bob"), Some("p1"));
        assert_eq!(
            scope,
            RecordScope::Partnership {
                partnership_id: "p1".to_string()
            }
        );

        // An unstamped personal asset is invisible under the strict scope,
        // unlike under the record fallback for the same link state.
        assert!(!scope.contains("alice", None));
        let record_scope = RecordScope::for_records("alice", Some("bob"), Some("p1"));
        assert!(record_scope.contains("alice", None));
    }

    #[rstest]
    #[case(Some("bob"), None)]
    #[case(None, Some("p1"))]
    #[case(None, None)]
    fn test_asset_scope_matches_record_fallback_when_not_fully_linked(
        #[case] partner: Option<&str>,
        #[case] partnership: Option<&str>,
    ) {
        assert_eq!(
            RecordScope::for_assets("alice", partner, partnership),
            RecordScope::for_records("alice", partner, partnership)
        );
    }

    #[test]
    fn test_couple_scope_membership() {
        let scope = RecordScope::for_records("alice", Some("bob"), None);
        assert!(scope.contains("alice", None));
        assert!(scope.contains("bob", Some("unrelated")));
        assert!(!scope.contains("carol", None));
    }

    #[test]
    fn test_partnership_or_owner_membership() {
        let scope = RecordScope::for_records("alice", None, Some("p1"));
        assert!(scope.contains("alice", None));
        assert!(scope.contains("bob", Some("p1")));
        assert!(!scope.contains("bob", None));
        assert!(!scope.contains("bob", Some("p2")));
    }
}
