//! Asset repository.
//!
//! Every mutation returns enough context for the caller to decide whether
//! the cash-budget synchronizer must run (the row is, or was, `"Nakit"`).

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

use cuzdan_core::partner::RecordScope;

use crate::entities::{assets, users};

/// Error types for asset operations.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    /// Asset not found.
    #[error("Asset not found: {0}")]
    NotFound(Uuid),

    /// Owning user not found.
    #[error("User not found: {0}")]
    OwnerNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an asset.
#[derive(Debug, Clone)]
pub struct CreateAssetInput {
    /// Owning username.
    pub username: String,
    /// Free-text category; `"Nakit"` feeds the budget.
    pub category: String,
    /// Quantity held.
    pub amount: Decimal,
    /// Monetary value.
    pub value: Decimal,
}

/// Input for updating an asset.
#[derive(Debug, Clone, Default)]
pub struct UpdateAssetInput {
    /// New category.
    pub category: Option<String>,
    /// New quantity.
    pub amount: Option<Decimal>,
    /// New monetary value.
    pub value: Option<Decimal>,
}

/// An updated asset plus the category it had before the update.
#[derive(Debug, Clone)]
pub struct AssetUpdate {
    /// The row after the update.
    pub asset: assets::Model,
    /// Category before the update.
    pub previous_category: String,
}

/// Asset repository.
#[derive(Debug, Clone)]
pub struct AssetRepository {
    db: DatabaseConnection,
}

impl AssetRepository {
    /// Creates a new asset repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an asset, stamping the owner's current partnership id.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is absent or the insert fails.
    pub async fn create(&self, input: CreateAssetInput) -> Result<assets::Model, AssetError> {
        let owner = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .one(&self.db)
            .await?
            .ok_or_else(|| AssetError::OwnerNotFound(input.username.clone()))?;

        let now = Utc::now().into();
        let asset = assets::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            category: Set(input.category),
            amount: Set(input.amount),
            value: Set(input.value),
            partnership_id: Set(owner.partnership_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(asset.insert(&self.db).await?)
    }

    /// Gets an asset by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is absent or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<assets::Model, AssetError> {
        assets::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AssetError::NotFound(id))
    }

    /// Updates an asset, returning the new row and its previous category.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is absent or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateAssetInput,
    ) -> Result<AssetUpdate, AssetError> {
        let asset = self.get(id).await?;
        let previous_category = asset.category.clone();

        let mut active: assets::ActiveModel = asset.into();
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(value) = input.value {
            active.value = Set(value);
        }
        active.updated_at = Set(Utc::now().into());

        let asset = active.update(&self.db).await?;
        Ok(AssetUpdate {
            asset,
            previous_category,
        })
    }

    /// Deletes an asset, returning the deleted row.
    ///
    /// # Errors
    ///
    /// Returns an error if the asset is absent or the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<assets::Model, AssetError> {
        let asset = self.get(id).await?;
        asset.clone().delete(&self.db).await?;
        Ok(asset)
    }

    /// Lists assets visible under the given scope.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_for_scope(
        &self,
        scope: &RecordScope,
    ) -> Result<Vec<assets::Model>, AssetError> {
        Ok(assets::Entity::find()
            .filter(scope_condition(scope))
            .order_by_asc(assets::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }
}

/// Translates a record scope into an asset filter.
pub(crate) fn scope_condition(scope: &RecordScope) -> Condition {
    match scope {
        RecordScope::Couple { username, partner } => Condition::all().add(
            assets::Column::Username.is_in([username.as_str(), partner.as_str()]),
        ),
        RecordScope::PartnershipOrOwner {
            username,
            partnership_id,
        } => Condition::any()
            .add(assets::Column::Username.eq(username.as_str()))
            .add(assets::Column::PartnershipId.eq(partnership_id.as_str())),
        RecordScope::Partnership { partnership_id } => {
            Condition::all().add(assets::Column::PartnershipId.eq(partnership_id.as_str()))
        }
        RecordScope::Owner { username } => {
            Condition::all().add(assets::Column::Username.eq(username.as_str()))
        }
    }
}
