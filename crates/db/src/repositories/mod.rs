//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.

pub mod asset;
pub mod budget;
pub mod catalog;
pub mod dashboard;
pub mod expense;
pub mod notification;
pub mod portfolio;
pub mod user;

pub use asset::{AssetError, AssetRepository, AssetUpdate, CreateAssetInput, UpdateAssetInput};
pub use budget::{BudgetError, BudgetRepository};
pub use catalog::{CatalogError, CatalogRepository, VendorFilter};
pub use dashboard::{DashboardData, DashboardError, DashboardRepository};
pub use expense::{
    CreateExpenseInput, ExpenseError, ExpenseRepository, ExpenseWithInstallments,
    UpdateExpenseInput,
};
pub use notification::{NotificationError, NotificationRepository};
pub use portfolio::{
    CreatePortfolioInput, PortfolioError, PortfolioRepository, UpdatePortfolioInput,
};
pub use user::{CreateUserInput, UserError, UserRepository};
