//! User repository: accounts, partner links, portfolio inclusion toggle.

use std::collections::HashMap;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::entities::users;

/// Error types for user operations.
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// User not found.
    #[error("User not found: {0}")]
    NotFound(String),

    /// Username already taken.
    #[error("Username already taken: {0}")]
    DuplicateUsername(String),

    /// A user cannot partner with themselves.
    #[error("Cannot link a user to themselves")]
    SelfLink,

    /// One side of the link is already partnered with someone else.
    #[error("User already linked: {0}")]
    AlreadyLinked(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Normalized username.
    pub username: String,
    /// Display name.
    pub full_name: String,
}

/// User repository.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a user account.
    ///
    /// # Errors
    ///
    /// Returns an error if the username is taken or the insert fails.
    pub async fn create(&self, input: CreateUserInput) -> Result<users::Model, UserError> {
        let existing = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .one(&self.db)
            .await?;

        if existing.is_some() {
            return Err(UserError::DuplicateUsername(input.username));
        }

        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(input.username),
            full_name: Set(input.full_name),
            partner_username: Set(None),
            partnership_id: Set(None),
            portfolio_budget_included: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(user.insert(&self.db).await?)
    }

    /// Finds a user by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn find_by_username(&self, username: &str) -> Result<Option<users::Model>, UserError> {
        Ok(users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?)
    }

    /// Gets a user by username or fails with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or the query fails.
    pub async fn get(&self, username: &str) -> Result<users::Model, UserError> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| UserError::NotFound(username.to_string()))
    }

    /// Sets the portfolio-inclusion toggle.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or the update fails.
    pub async fn set_portfolio_inclusion(
        &self,
        username: &str,
        included: bool,
    ) -> Result<users::Model, UserError> {
        let user = self.get(username).await?;

        let mut active: users::ActiveModel = user.into();
        active.portfolio_budget_included = Set(included);
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Links two users as partners, stamping a shared partnership id on both
    /// rows inside one transaction. An id already carried by either side is
    /// reused so older asset stamps stay valid.
    ///
    /// # Errors
    ///
    /// Returns an error if either user is absent, the link is a self-link,
    /// either side is already linked to someone else, or a write fails.
    pub async fn link_partner(
        &self,
        username: &str,
        partner_username: &str,
    ) -> Result<(users::Model, users::Model), UserError> {
        if username == partner_username {
            return Err(UserError::SelfLink);
        }

        let txn = self.db.begin().await?;

        let user = find_in_txn(&txn, username).await?;
        let partner = find_in_txn(&txn, partner_username).await?;

        for side in [&user, &partner] {
            if let Some(existing) = &side.partner_username {
                let other = if side.username == user.username {
                    partner_username
                } else {
                    username
                };
                if existing.as_str() != other {
                    return Err(UserError::AlreadyLinked(side.username.clone()));
                }
            }
        }

        let partnership_id = user
            .partnership_id
            .clone()
            .or_else(|| partner.partnership_id.clone())
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let now = Utc::now().into();

        let mut user_active: users::ActiveModel = user.into();
        user_active.partner_username = Set(Some(partner_username.to_string()));
        user_active.partnership_id = Set(Some(partnership_id.clone()));
        user_active.updated_at = Set(now);
        let user = user_active.update(&txn).await?;

        let mut partner_active: users::ActiveModel = partner.into();
        partner_active.partner_username = Set(Some(username.to_string()));
        partner_active.partnership_id = Set(Some(partnership_id));
        partner_active.updated_at = Set(now);
        let partner = partner_active.update(&txn).await?;

        txn.commit().await?;
        Ok((user, partner))
    }

    /// Removes the partner link from both sides inside one transaction.
    /// Tolerates a one-sided link: the reverse row is only touched if it
    /// actually points back.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or a write fails.
    pub async fn unlink_partner(&self, username: &str) -> Result<users::Model, UserError> {
        let txn = self.db.begin().await?;

        let user = find_in_txn(&txn, username).await?;
        let partner_username = user.partner_username.clone();
        let now = Utc::now().into();

        let mut user_active: users::ActiveModel = user.into();
        user_active.partner_username = Set(None);
        user_active.partnership_id = Set(None);
        user_active.updated_at = Set(now);
        let user = user_active.update(&txn).await?;

        if let Some(partner_username) = partner_username {
            let partner = users::Entity::find()
                .filter(users::Column::Username.eq(&partner_username))
                .one(&txn)
                .await?;

            if let Some(partner) = partner
                && partner.partner_username.as_deref() == Some(user.username.as_str())
            {
                let mut partner_active: users::ActiveModel = partner.into();
                partner_active.partner_username = Set(None);
                partner_active.partnership_id = Set(None);
                partner_active.updated_at = Set(now);
                partner_active.update(&txn).await?;
            }
        }

        txn.commit().await?;
        Ok(user)
    }

    /// Returns a username -> display-name map for the given usernames.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn display_names(
        &self,
        usernames: &[String],
    ) -> Result<HashMap<String, String>, UserError> {
        if usernames.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = users::Entity::find()
            .filter(users::Column::Username.is_in(usernames.iter().map(String::as_str)))
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|u| (u.username, u.full_name)).collect())
    }
}

/// Fetches a user inside a transaction or fails with `NotFound`.
async fn find_in_txn(txn: &DatabaseTransaction, username: &str) -> Result<users::Model, UserError> {
    users::Entity::find()
        .filter(users::Column::Username.eq(username))
        .one(txn)
        .await?
        .ok_or_else(|| UserError::NotFound(username.to_string()))
}
