//! Budget repository: the persistence half of the cash-budget synchronizer.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    Set,
};
use tracing::debug;
use uuid::Uuid;

use cuzdan_core::budget::{BudgetService, CashHolding, CashScope};

use crate::entities::{assets, budgets, users};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Budget repository.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Gets the stored budget row for a username, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn get_for(&self, username: &str) -> Result<Option<budgets::Model>, BudgetError> {
        Ok(budgets::Entity::find()
            .filter(budgets::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Recomputes the user's cash total and persists it as their budget,
    /// then propagates the same total to the partner's row if one is linked.
    /// Returns the total so mutation responses can carry the fresh figure.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or any statement fails.
    pub async fn sync_cash_budget(&self, username: &str) -> Result<Decimal, BudgetError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| BudgetError::UserNotFound(username.to_string()))?;

        self.sync_for_user(&user).await
    }

    /// Writes an explicit budget amount for the user (and the partner's row,
    /// for a linked pair), then reconciles against current cash holdings on
    /// the partner-affecting path. Returns the amount actually stored.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or any statement fails.
    pub async fn set_budget(&self, username: &str, amount: Decimal) -> Result<Decimal, BudgetError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| BudgetError::UserNotFound(username.to_string()))?;

        self.upsert_amount(&user.username, amount, &user.username)
            .await?;

        if let Some(partner) = &user.partner_username {
            self.upsert_amount(partner, amount, &user.username).await?;
            return self.sync_for_user(&user).await;
        }

        Ok(amount)
    }

    /// Synchronizer body, shared by the sync and set paths.
    async fn sync_for_user(&self, user: &users::Model) -> Result<Decimal, BudgetError> {
        let scope = BudgetService::cash_scope(
            &user.username,
            user.partner_username.as_deref(),
            user.partnership_id.as_deref(),
        );

        let rows = assets::Entity::find()
            .filter(cash_condition(&scope))
            .all(&self.db)
            .await?;

        let holdings: Vec<CashHolding> = rows
            .into_iter()
            .map(|a| CashHolding {
                owner: a.username,
                category: a.category,
                partnership_id: a.partnership_id,
                value: a.value,
            })
            .collect();

        let total = BudgetService::cash_total(&scope, &holdings);

        debug!(
            username = %user.username,
            total = %total,
            rows = holdings.len(),
            "Cash budget recomputed"
        );

        // Self then partner, two separate statements; if a concurrent sync
        // interleaves, the rows stay divergent only until the next
        // successful sync.
        self.upsert_amount(&user.username, total, &user.username)
            .await?;

        if let Some(partner) = &user.partner_username {
            self.upsert_amount(partner, total, &user.username).await?;
        }

        Ok(total)
    }

    /// Inserts or overwrites the single budget row for a username.
    async fn upsert_amount(
        &self,
        username: &str,
        amount: Decimal,
        added_by: &str,
    ) -> Result<(), BudgetError> {
        let existing = budgets::Entity::find()
            .filter(budgets::Column::Username.eq(username))
            .one(&self.db)
            .await?;

        let now = Utc::now().into();

        match existing {
            Some(row) => {
                let mut active: budgets::ActiveModel = row.into();
                active.amount = Set(amount);
                active.added_by = Set(added_by.to_string());
                active.updated_at = Set(now);
                active.update(&self.db).await?;
            }
            None => {
                let row = budgets::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    username: Set(username.to_string()),
                    amount: Set(amount),
                    added_by: Set(added_by.to_string()),
                    created_at: Set(now),
                    updated_at: Set(now),
                };
                row.insert(&self.db).await?;
            }
        }

        Ok(())
    }
}

/// Translates a cash scope into the asset filter feeding the budget.
fn cash_condition(scope: &CashScope) -> Condition {
    let cash = assets::Column::Category.eq(cuzdan_core::budget::CASH_CATEGORY);
    match scope {
        CashScope::Owner { username } => Condition::all()
            .add(cash)
            .add(assets::Column::Username.eq(username.as_str())),
        CashScope::Partnership {
            username,
            partner,
            partnership_id,
        } => Condition::all().add(cash).add(
            Condition::any()
                .add(assets::Column::Username.is_in([username.as_str(), partner.as_str()]))
                .add(assets::Column::PartnershipId.eq(partnership_id.as_str())),
        ),
    }
}
