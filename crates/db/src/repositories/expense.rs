//! Expense repository with installment tracking.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait, ModelTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use cuzdan_core::partner::RecordScope;

use crate::entities::{expenses, installment_states, users};

/// Error types for expense operations.
#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    /// Expense not found.
    #[error("Expense not found: {0}")]
    NotFound(Uuid),

    /// Owning user not found.
    #[error("User not found: {0}")]
    OwnerNotFound(String),

    /// Installment number outside the expense's plan.
    #[error("Installment {requested} out of range, expense has {count}")]
    InstallmentOutOfRange {
        /// Requested installment number.
        requested: i32,
        /// Installments on the plan.
        count: i32,
    },

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

/// Input for creating an expense.
#[derive(Debug, Clone)]
pub struct CreateExpenseInput {
    /// Owning username.
    pub username: String,
    /// Expense title.
    pub title: String,
    /// Optional category name.
    pub category: Option<String>,
    /// Optional vendor name.
    pub vendor: Option<String>,
    /// Total amount.
    pub amount: Decimal,
    /// Date of the expense.
    pub expense_date: NaiveDate,
    /// Number of installments (at least 1).
    pub installments: i32,
}

/// Input for updating an expense.
#[derive(Debug, Clone, Default)]
pub struct UpdateExpenseInput {
    /// New title.
    pub title: Option<String>,
    /// New category (`Some(None)` clears it).
    pub category: Option<Option<String>>,
    /// New vendor (`Some(None)` clears it).
    pub vendor: Option<Option<String>>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub expense_date: Option<NaiveDate>,
}

/// An expense with its installment states.
#[derive(Debug, Clone)]
pub struct ExpenseWithInstallments {
    /// Expense record.
    pub expense: expenses::Model,
    /// Installment rows ordered by number.
    pub installments: Vec<installment_states::Model>,
}

/// Expense repository.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates an expense and its installment rows in one transaction,
    /// stamping the owner's current partnership id.
    ///
    /// # Errors
    ///
    /// Returns an error if the owner is absent or a write fails.
    pub async fn create(
        &self,
        input: CreateExpenseInput,
    ) -> Result<ExpenseWithInstallments, ExpenseError> {
        let owner = users::Entity::find()
            .filter(users::Column::Username.eq(&input.username))
            .one(&self.db)
            .await?
            .ok_or_else(|| ExpenseError::OwnerNotFound(input.username.clone()))?;

        let installments = input.installments.max(1);
        let txn = self.db.begin().await?;
        let now = Utc::now().into();
        let expense_id = Uuid::new_v4();

        let expense = expenses::ActiveModel {
            id: Set(expense_id),
            username: Set(input.username.clone()),
            title: Set(input.title),
            category: Set(input.category),
            vendor: Set(input.vendor),
            amount: Set(input.amount),
            expense_date: Set(input.expense_date),
            installments: Set(installments),
            partnership_id: Set(owner.partnership_id),
            created_at: Set(now),
            updated_at: Set(now),
        };
        let expense = expense.insert(&txn).await?;

        let mut states = Vec::with_capacity(usize::try_from(installments).unwrap_or(1));
        for installment_no in 1..=installments {
            let state = installment_states::ActiveModel {
                id: Set(Uuid::new_v4()),
                expense_id: Set(expense_id),
                username: Set(input.username.clone()),
                installment_no: Set(installment_no),
                paid: Set(false),
                paid_at: Set(None),
                created_at: Set(now),
                updated_at: Set(now),
            };
            states.push(state.insert(&txn).await?);
        }

        txn.commit().await?;
        Ok(ExpenseWithInstallments {
            expense,
            installments: states,
        })
    }

    /// Gets an expense by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is absent or the query fails.
    pub async fn get(&self, id: Uuid) -> Result<expenses::Model, ExpenseError> {
        expenses::Entity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(ExpenseError::NotFound(id))
    }

    /// Updates an expense.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is absent or the update fails.
    pub async fn update(
        &self,
        id: Uuid,
        input: UpdateExpenseInput,
    ) -> Result<expenses::Model, ExpenseError> {
        let expense = self.get(id).await?;

        let mut active: expenses::ActiveModel = expense.into();
        if let Some(title) = input.title {
            active.title = Set(title);
        }
        if let Some(category) = input.category {
            active.category = Set(category);
        }
        if let Some(vendor) = input.vendor {
            active.vendor = Set(vendor);
        }
        if let Some(amount) = input.amount {
            active.amount = Set(amount);
        }
        if let Some(expense_date) = input.expense_date {
            active.expense_date = Set(expense_date);
        }
        active.updated_at = Set(Utc::now().into());

        Ok(active.update(&self.db).await?)
    }

    /// Deletes an expense, returning the deleted row. Installment rows go
    /// with it via the cascade.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is absent or the delete fails.
    pub async fn delete(&self, id: Uuid) -> Result<expenses::Model, ExpenseError> {
        let expense = self.get(id).await?;
        expense.clone().delete(&self.db).await?;
        Ok(expense)
    }

    /// Lists expenses visible under the given scope, newest first, with the
    /// total row count for pagination.
    ///
    /// # Errors
    ///
    /// Returns an error if a query fails.
    pub async fn list_for_scope(
        &self,
        scope: &RecordScope,
        limit: u64,
        offset: u64,
    ) -> Result<(Vec<expenses::Model>, u64), ExpenseError> {
        let condition = scope_condition(scope);

        let total = expenses::Entity::find()
            .filter(condition.clone())
            .count(&self.db)
            .await?;

        let rows = expenses::Entity::find()
            .filter(condition)
            .order_by_desc(expenses::Column::ExpenseDate)
            .offset(offset)
            .limit(limit)
            .all(&self.db)
            .await?;

        Ok((rows, total))
    }

    /// Marks one installment paid or unpaid.
    ///
    /// # Errors
    ///
    /// Returns an error if the expense is absent, the number is outside the
    /// plan, or a write fails.
    pub async fn set_installment_paid(
        &self,
        expense_id: Uuid,
        installment_no: i32,
        paid: bool,
    ) -> Result<installment_states::Model, ExpenseError> {
        let expense = self.get(expense_id).await?;

        if installment_no < 1 || installment_no > expense.installments {
            return Err(ExpenseError::InstallmentOutOfRange {
                requested: installment_no,
                count: expense.installments,
            });
        }

        let now = Utc::now();
        let state = installment_states::Entity::find()
            .filter(installment_states::Column::ExpenseId.eq(expense_id))
            .filter(installment_states::Column::InstallmentNo.eq(installment_no))
            .one(&self.db)
            .await?;

        match state {
            Some(row) => {
                let mut active: installment_states::ActiveModel = row.into();
                active.paid = Set(paid);
                active.paid_at = Set(paid.then(|| now.into()));
                active.updated_at = Set(now.into());
                Ok(active.update(&self.db).await?)
            }
            // Plans created before installment tracking have no rows yet.
            None => {
                let row = installment_states::ActiveModel {
                    id: Set(Uuid::new_v4()),
                    expense_id: Set(expense_id),
                    username: Set(expense.username),
                    installment_no: Set(installment_no),
                    paid: Set(paid),
                    paid_at: Set(paid.then(|| now.into())),
                    created_at: Set(now.into()),
                    updated_at: Set(now.into()),
                };
                Ok(row.insert(&self.db).await?)
            }
        }
    }

    /// Lists installment states for an expense ordered by number.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn list_installments(
        &self,
        expense_id: Uuid,
    ) -> Result<Vec<installment_states::Model>, ExpenseError> {
        Ok(installment_states::Entity::find()
            .filter(installment_states::Column::ExpenseId.eq(expense_id))
            .order_by_asc(installment_states::Column::InstallmentNo)
            .all(&self.db)
            .await?)
    }
}

/// Translates a record scope into an expense filter.
pub(crate) fn scope_condition(scope: &RecordScope) -> Condition {
    match scope {
        RecordScope::Couple { username, partner } => Condition::all().add(
            expenses::Column::Username.is_in([username.as_str(), partner.as_str()]),
        ),
        RecordScope::PartnershipOrOwner {
            username,
            partnership_id,
        } => Condition::any()
            .add(expenses::Column::Username.eq(username.as_str()))
            .add(expenses::Column::PartnershipId.eq(partnership_id.as_str())),
        RecordScope::Partnership { partnership_id } => {
            Condition::all().add(expenses::Column::PartnershipId.eq(partnership_id.as_str()))
        }
        RecordScope::Owner { username } => {
            Condition::all().add(expenses::Column::Username.eq(username.as_str()))
        }
    }
}
