//! Portfolio repository.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use cuzdan_core::partner::RecordScope;

use crate::entities::{portfolio_items, users};

/// Error types for portfolio operations.
#[derive(Debug, thiserror::Error)]
pub enum PortfolioError {
    /// Portfolio item not found.
    #[error("Portfolio item not found: {0}")]
    NotFound(Uuid),

    /// Owning user not found.
    #[error("User not found: {0}")]
    OwnerNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a portfolio item.
#[derive(Debug, Clone)]
pub struct CreatePortfolioInput {
    /// Owning username.
    pub username: String,
    /// Holding kind, e.g. `"Döviz"` or `"Altın"`.
    pub kind: String,
    /// Instrument code, e.g. `"USD"` or `"gram-altin"`.
    pub code: String,
    /// Quantity held.
    pub amount: Decimal,
    /// TRY unit price at entry.
    pub rate: Decimal,
}

/// Input for updating a portfolio item.
#[derive(Debug, Clone, Default)]
pub struct UpdatePortfolioInput {
    /// New kind.
    pub kind: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New quantity.
    pub amount: Option<Decimal>,
    /// New unit price.
    pub rate: Option<Decimal>,
}

/// Portfolio repository.
#[derive(Debug, Clone)]
pub struct PortfolioRepository {
    db: DatabaseConnection,
}

impl PortfolioRepository {
    /// Creates a new portfolio repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a portfolio item, stamping the owner's partnership id.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is absent or the insert fails.
    pub async fn create(
        &self,
        input: CreatePortfolioInput,
    ) -> Result<portfolio_items::Model, PortfolioError> {
        let owner = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .one(&self.db)
            .await?
            .ok_or_else(|| PortfolioError::OwnerNotFound(input.username.clone()))?;

        let now = Utc::now().into();
        let item = portfolio_items::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            kind: Set(input.kind),
            code: Set(input.code),
            amount: Set(input.amount),
            rate: Set(input.rate),
            partnership_id: Set(owner.partnership_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(item.insert(&self.db).await?)
    }

    /// Gets a portfolio item by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is absent or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<portfolio_items::Model, PortfolioError> {
        portfolio_items::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(PortfolioError::NotFound(id))
    }

    /// Updates a portfolio item.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is absent or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdatePortfolioInput,
    ) -> Result<portfolio_items::Model, PortfolioError> {
        let item = self.get(id).await?;

        let mut active: portfolio_items::ActiveModel = item.into();
        if let Some(kind) = input.kind {
            active.kind = Set(kind);
        }
        if let Some(code) = input.code {
            active.code = Set(code);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(rate) = input.rate {
            active.rate = Set(rate);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a portfolio item, returning the deleted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the item is absent or the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<portfolio_items::Model, PortfolioError> {
        let item = self.get(id).await?;
        item.clone().delete(&self.db).await?;
        Ok(item)
    }

    /// Lists portfolio items visible under the given scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_scope(
        &self,
        scope: &RecordScope,
    ) -> Result<Vec<portfolio_items::Model>, PortfolioError> {
        Ok(portfolio_items::Entity::find()
            .filter(scope_condition(scope))
            .order_by_asc(portfolio_items::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Restamps stored unit prices from a `code -> rate` map. Codes are
    /// matched case-insensitively; items without a fresh rate are left
    /// untouched. Returns the number of rows updated.
    ///
    /// # Errors
    ///
    /// Returns an error if a query or update fails.
    pub async fn restamp_rates(
        &self,
        rates: &HashMap<String, Decimal>,
    ) -> Result<u64, PortfolioError> {
        let items = portfolio_items::Entity::find().all(&self.db).await?;

        let mut updated = 0u64;
        let now = Utc::now().into();

        for item in items {
            let Some(rate) = rates.get(&item.code.to_uppercase()) else {
                continue;
            };
            if *rate == item.rate {
                continue;
            }

            let mut active: portfolio_items::ActiveModel = item.into();
            active.rate = Set(*rate);
            active.updated_at = Set(now);
            active.update(&self.db).await?;
            updated += 1;
        }

        Ok(updated)
    }
}

/// Translates a record scope into a portfolio filter.
pub(crate) fn scope_condition(scope: &RecordScope) -> Condition {
    match scope {
        RecordScope::Couple { username, partner } => Condition::all().add(
            portfolio_items::Column::Username.is_in([username.as_str(), partner.as_str()]),
        ),
        RecordScope::PartnershipOrOwner {
            username,
            partnership_id,
        } => Condition::any()
            .add(portfolio_items::Column::Username.eq(username.as_str()))
            .add(portfolio_items::Column::PartnershipId.eq(partnership_id.as_str())),
        RecordScope::Partnership { partnership_id } => Condition::all()
            .add(portfolio_items::Column::PartnershipId.eq(partnership_id.as_str())),
        RecordScope::Owner { username } => {
            Condition::all().add(portfolio_items::Column::Username.eq(username.as_str()))
        }
    }
}
