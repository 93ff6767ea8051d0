//! Catalog repository: seeded categories and vendor listings, read-only
//! over HTTP.

use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use crate::entities::{categories, vendors};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Filters for the vendor listing.
#[derive(Debug, Clone, Default)]
pub struct VendorFilter {
    /// Filter by city.
    pub city: Option<String>,
    /// Filter by vendor category.
    pub category: Option<String>,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Lists expense categories in display order.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<categories::Model>, CatalogError> {
        Ok(categories::Entity::find()
            .order_by_asc(categories::Column::SortOrder)
            .order_by_asc(categories::Column::Name)
            .all(&self.db)
            .await?)
    }

    /// Lists vendors, optionally filtered by city and category.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_vendors(
        &self,
        filter: &VendorFilter,
    ) -> Result<Vec<vendors::Model>, CatalogError> {
        let mut query = vendors::Entity::find();

        if let Some(city) = &filter.city {
            query = query.filter(vendors::Column::City.eq(city));
        }
        if let Some(category) = &filter.category {
            query = query.filter(vendors::Column::Category.eq(category));
        }

        Ok(query.order_by_asc(vendors::Column::Name).all(&self.db).await?)
    }
}
