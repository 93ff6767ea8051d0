//! Dashboard repository: the partner-aware aggregation behind the
//! "get all dashboard data" endpoint.

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

use cuzdan_core::partner::RecordScope;
use cuzdan_core::portfolio::{PortfolioHolding, effective_value};

use crate::entities::{assets, budgets, expenses, portfolio_items, users};
use crate::repositories::{asset, expense, portfolio};

/// Error types for dashboard operations.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// User not found.
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Everything the client needs to render the dashboard.
#[derive(Debug, Clone)]
pub struct DashboardData {
    /// The acting user.
    pub user: users::Model,
    /// The linked partner, when the link resolves.
    pub partner: Option<users::Model>,
    /// Expenses under the record scope, newest first.
    pub expenses: Vec<expenses::Model>,
    /// Assets under the (stricter) asset scope.
    pub assets: Vec<assets::Model>,
    /// Portfolio items under the record scope.
    pub portfolio: Vec<portfolio_items::Model>,
    /// Stored budget row, if one exists yet.
    pub budget: Option<budgets::Model>,
    /// Derived portfolio contribution, zero when the toggle is off.
    pub effective_portfolio_value: Decimal,
    /// Username -> display name for self and partner.
    pub display_names: HashMap<String, String>,
}

/// Dashboard repository.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    db: DatabaseConnection,
}

impl DashboardRepository {
    /// Creates a new dashboard repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Aggregates the user's and partner's financial view.
    ///
    /// Expense and portfolio reads use the three-step partner fallback;
    /// asset reads use the stricter partnership-id scope. The budget figure
    /// is the stored row plus the derived portfolio contribution, which is
    /// never written back.
    ///
    /// # Errors
    ///
    /// Returns an error if the user is absent or a query fails.
    pub async fn get_dashboard(&self, username: &str) -> Result<DashboardData, DashboardError> {
        let user = users::Entity::find()
            .filter(users::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .ok_or_else(|| DashboardError::UserNotFound(username.to_string()))?;

        let partner = match &user.partner_username {
            Some(partner_username) => {
                users::Entity::find()
                    .filter(users::Column::Username.eq(partner_username))
                    .one(&self.db)
                    .await?
            }
            None => None,
        };

        let record_scope = RecordScope::for_records(
            &user.username,
            user.partner_username.as_deref(),
            user.partnership_id.as_deref(),
        );
        let asset_scope = RecordScope::for_assets(
            &user.username,
            user.partner_username.as_deref(),
            user.partnership_id.as_deref(),
        );

        let expense_rows = expenses::Entity::find()
            .filter(expense::scope_condition(&record_scope))
            .order_by_desc(expenses::Column::ExpenseDate)
            .all(&self.db)
            .await?;

        let asset_rows = assets::Entity::find()
            .filter(asset::scope_condition(&asset_scope))
            .order_by_asc(assets::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let portfolio_rows = portfolio_items::Entity::find()
            .filter(portfolio::scope_condition(&record_scope))
            .order_by_asc(portfolio_items::Column::CreatedAt)
            .all(&self.db)
            .await?;

        let budget = budgets::Entity::find()
            .filter(budgets::Column::Username.eq(&user.username))
            .one(&self.db)
            .await?;

        let holdings: Vec<PortfolioHolding> = portfolio_rows
            .iter()
            .map(|p| PortfolioHolding {
                amount: p.amount,
                rate: p.rate,
            })
            .collect();
        let effective_portfolio_value = effective_value(&holdings, user.portfolio_budget_included);

        let mut display_names = HashMap::new();
        display_names.insert(user.username.clone(), user.full_name.clone());
        if let Some(partner) = &partner {
            display_names.insert(partner.username.clone(), partner.full_name.clone());
        }

        Ok(DashboardData {
            user,
            partner,
            expenses: expense_rows,
            assets: asset_rows,
            portfolio: portfolio_rows,
            budget,
            effective_portfolio_value,
            display_names,
        })
    }
}
