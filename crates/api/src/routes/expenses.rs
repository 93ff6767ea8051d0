//! Expense routes with installment tracking.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use cuzdan_core::budget::BudgetService;
use cuzdan_core::partner::RecordScope;
use cuzdan_db::repositories::expense::{
    CreateExpenseInput, ExpenseError, ExpenseRepository, UpdateExpenseInput,
};
use cuzdan_db::repositories::user::{UserError, UserRepository};
use cuzdan_shared::types::{PageRequest, Username};

use crate::AppState;
use crate::routes::{notify_pair, record_partner_notification, resolve_partner};

/// Creates the expense routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{username}/expenses", get(list_expenses))
        .route("/expenses", post(create_expense))
        .route("/expenses/{id}", put(update_expense))
        .route("/expenses/{id}", delete(delete_expense))
        .route(
            "/expenses/{id}/installments/{installment_no}",
            put(set_installment),
        )
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an expense.
#[derive(Debug, Deserialize)]
pub struct CreateExpenseRequest {
    /// Owning username.
    pub username: String,
    /// Expense title.
    pub title: String,
    /// Optional category.
    pub category: Option<String>,
    /// Optional vendor.
    pub vendor: Option<String>,
    /// Total amount.
    pub amount: Decimal,
    /// Date of the expense.
    pub expense_date: NaiveDate,
    /// Number of installments, defaults to 1.
    pub installments: Option<i32>,
}

/// Request body for updating an expense.
#[derive(Debug, Deserialize)]
pub struct UpdateExpenseRequest {
    /// New title.
    pub title: Option<String>,
    /// New category.
    pub category: Option<String>,
    /// New vendor.
    pub vendor: Option<String>,
    /// New amount.
    pub amount: Option<Decimal>,
    /// New date.
    pub expense_date: Option<NaiveDate>,
}

/// Request body for marking an installment.
#[derive(Debug, Deserialize)]
pub struct SetInstallmentRequest {
    /// Paid or not.
    pub paid: bool,
}

// ============================================================================
// Helpers
// ============================================================================

/// Serializes an expense row for API responses.
fn expense_json(expense: &cuzdan_db::entities::expenses::Model) -> serde_json::Value {
    json!({
        "id": expense.id,
        "username": expense.username,
        "title": expense.title,
        "category": expense.category,
        "vendor": expense.vendor,
        "amount": expense.amount.to_string(),
        "expense_date": expense.expense_date,
        "installments": expense.installments,
        "partnership_id": expense.partnership_id,
        "created_at": expense.created_at,
        "updated_at": expense.updated_at
    })
}

/// Serializes an installment state for API responses.
fn installment_json(
    row: &cuzdan_db::entities::installment_states::Model,
) -> serde_json::Value {
    json!({
        "id": row.id,
        "expense_id": row.expense_id,
        "installment_no": row.installment_no,
        "paid": row.paid,
        "paid_at": row.paid_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/users/{username}/expenses` - List expenses visible to a user.
async fn list_expenses(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(page): Query<PageRequest>,
) -> impl IntoResponse {
    let Ok(username) = Username::parse(&username) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_username",
                "message": "Username cannot be empty"
            })),
        )
            .into_response();
    };

    let user_repo = UserRepository::new((*state.db).clone());
    let user = match user_repo.get(username.as_str()).await {
        Ok(user) => user,
        Err(UserError::NotFound(_)) => {
            return (
                StatusCode::NOT_FOUND,
                Json(json!({
                    "error": "not_found",
                    "message": format!("User not found: {}", username)
                })),
            )
                .into_response();
        }
        Err(e) => {
            error!(error = %e, "Failed to get user");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "internal_error",
                    "message": "An error occurred"
                })),
            )
                .into_response();
        }
    };

    let scope = RecordScope::for_records(
        &user.username,
        user.partner_username.as_deref(),
        user.partnership_id.as_deref(),
    );

    let repo = ExpenseRepository::new((*state.db).clone());
    match repo
        .list_for_scope(&scope, page.clamped_limit(), page.offset)
        .await
    {
        Ok((expenses, total)) => {
            let rows: Vec<serde_json::Value> = expenses.iter().map(expense_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "expenses": rows,
                    "meta": {
                        "limit": page.clamped_limit(),
                        "offset": page.offset,
                        "total": total
                    }
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list expenses");
            map_expense_error(&e)
        }
    }
}

/// POST `/expenses` - Create an expense with its installment plan.
async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> impl IntoResponse {
    let Ok(username) = Username::parse(&payload.username) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_username",
                "message": "Username cannot be empty"
            })),
        )
            .into_response();
    };

    if payload.title.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_title",
                "message": "Title cannot be empty"
            })),
        )
            .into_response();
    }

    if BudgetService::validate_value(payload.amount).is_err() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_amount",
                "message": "Amount cannot be negative"
            })),
        )
            .into_response();
    }

    let installments = payload.installments.unwrap_or(1);
    if installments < 1 {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_installments",
                "message": "Installments must be at least 1"
            })),
        )
            .into_response();
    }

    let repo = ExpenseRepository::new((*state.db).clone());
    let input = CreateExpenseInput {
        username: username.into_inner(),
        title: payload.title.trim().to_string(),
        category: payload.category,
        vendor: payload.vendor,
        amount: payload.amount,
        expense_date: payload.expense_date,
        installments,
    };

    match repo.create(input).await {
        Ok(created) => {
            info!(
                username = %created.expense.username,
                title = %created.expense.title,
                amount = %created.expense.amount,
                "Expense created"
            );

            let partner = resolve_partner(&state, &created.expense.username).await;
            if let Some(partner) = &partner {
                record_partner_notification(
                    &state,
                    partner,
                    &created.expense.username,
                    &format!(
                        "{} added an expense: {}",
                        created.expense.username, created.expense.title
                    ),
                )
                .await;
            }
            notify_pair(&state, &created.expense.username, partner.as_deref());

            let states: Vec<serde_json::Value> =
                created.installments.iter().map(installment_json).collect();
            (
                StatusCode::CREATED,
                Json(json!({
                    "expense": expense_json(&created.expense),
                    "installments": states
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create expense");
            map_expense_error(&e)
        }
    }
}

/// PUT `/expenses/{id}` - Update an expense.
async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> impl IntoResponse {
    if let Some(amount) = payload.amount
        && BudgetService::validate_value(amount).is_err()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "negative_amount",
                "message": "Amount cannot be negative"
            })),
        )
            .into_response();
    }

    let repo = ExpenseRepository::new((*state.db).clone());
    let input = UpdateExpenseInput {
        title: payload.title,
        category: payload.category.map(Some),
        vendor: payload.vendor.map(Some),
        amount: payload.amount,
        expense_date: payload.expense_date,
    };

    match repo.update(id, input).await {
        Ok(expense) => {
            info!(expense_id = %expense.id, username = %expense.username, "Expense updated");

            let partner = resolve_partner(&state, &expense.username).await;
            notify_pair(&state, &expense.username, partner.as_deref());

            (StatusCode::OK, Json(expense_json(&expense))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update expense");
            map_expense_error(&e)
        }
    }
}

/// DELETE `/expenses/{id}` - Delete an expense and its installment plan.
async fn delete_expense(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(expense) => {
            info!(expense_id = %expense.id, username = %expense.username, "Expense deleted");

            let partner = resolve_partner(&state, &expense.username).await;
            notify_pair(&state, &expense.username, partner.as_deref());

            (
                StatusCode::OK,
                Json(json!({ "deleted": true, "id": expense.id })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete expense");
            map_expense_error(&e)
        }
    }
}

/// PUT `/expenses/{id}/installments/{installment_no}` - Mark an installment
/// paid or unpaid.
async fn set_installment(
    State(state): State<AppState>,
    Path((id, installment_no)): Path<(Uuid, i32)>,
    Json(payload): Json<SetInstallmentRequest>,
) -> impl IntoResponse {
    let repo = ExpenseRepository::new((*state.db).clone());

    match repo.set_installment_paid(id, installment_no, payload.paid).await {
        Ok(installment) => {
            info!(
                expense_id = %id,
                installment_no = installment_no,
                paid = payload.paid,
                "Installment updated"
            );

            let partner = resolve_partner(&state, &installment.username).await;
            notify_pair(&state, &installment.username, partner.as_deref());

            (StatusCode::OK, Json(installment_json(&installment))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update installment");
            map_expense_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps expense errors to HTTP responses.
fn map_expense_error(e: &ExpenseError) -> axum::response::Response {
    match e {
        ExpenseError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Expense not found: {}", id)
            })),
        )
            .into_response(),
        ExpenseError::OwnerNotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        ExpenseError::InstallmentOutOfRange { requested, count } => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "installment_out_of_range",
                "message": format!("Installment {} out of range, expense has {}", requested, count)
            })),
        )
            .into_response(),
        ExpenseError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
