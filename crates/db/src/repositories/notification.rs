//! Notification repository for stored in-app notifications.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::entities::notifications;

/// Error types for notification operations.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// Notification not found.
    #[error("Notification not found: {0}")]
    NotFound(Uuid),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Notification repository.
#[derive(Debug, Clone)]
pub struct NotificationRepository {
    db: DatabaseConnection,
}

impl NotificationRepository {
    /// Creates a new notification repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Records a notification for a recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails.
    pub async fn create(
        &self,
        username: &str,
        actor: &str,
        message: &str,
    ) -> Result<notifications::Model, NotificationError> {
        let row = notifications::ActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            actor: Set(actor.to_string()),
            message: Set(message.to_string()),
            read: Set(false),
            created_at: Set(Utc::now().into()),
        };

        Ok(row.insert(&self.db).await?)
    }

    /// Lists a user's notifications newest first, with the total count.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_for(
        &self,
        username: &str,
        unread_only: bool,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<notifications::Model>, u64), NotificationError> {
        let mut query =
            notifications::Entity::find().filter(notifications::Column::Username.eq(username));

        if unread_only {
            query = query.filter(notifications::Column::Read.eq(false));
        }

        let total = query.clone().count(&self.db).await?;

        let rows = query
            .order_by_desc(notifications::Column::CreatedAt)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Marks a notification read.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is absent or the update fails.
    pub async fn mark_read(&self, id: Uuid) -> Result<notifications::Model, NotificationError> {
        let row = notifications::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(NotificationError::NotFound(id))?;

        let mut active: notifications::ActiveModel = row.into();
        active.read = Set(true);

        Ok(active.update(&self.db).await?)
    }

    /// Deletes a notification.
    ///
    /// # Errors
    ///
    /// Returns an error if the notification is absent or the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<(), NotificationError> {
        let result = notifications::Entity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(NotificationError::NotFound(id));
        }

        Ok(())
    }
}
