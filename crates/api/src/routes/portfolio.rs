//! Portfolio routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};
use uuid::Uuid;

use cuzdan_core::budget::BudgetService;
use cuzdan_core::partner::RecordScope;
use cuzdan_core::portfolio::{PortfolioHolding, effective_value};
use cuzdan_db::repositories::portfolio::{
    CreatePortfolioInput, PortfolioError, PortfolioRepository, UpdatePortfolioInput,
};
use cuzdan_db::repositories::user::{UserError, UserRepository};
use cuzdan_shared::types::Username;

use crate::AppState;
use crate::routes::{notify_pair, resolve_partner};

/// Creates the portfolio routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{username}/portfolio", get(list_portfolio))
        .route("/portfolio", post(create_item))
        .route("/portfolio/refresh-rates", post(refresh_rates))
        .route("/portfolio/{id}", put(update_item))
        .route("/portfolio/{id}", delete(delete_item))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a portfolio item.
#[derive(Debug, Deserialize)]
pub struct CreatePortfolioRequest {
    /// Owning username.
    pub username: String,
    /// Holding kind, e.g. `"Döviz"` or `"Altın"`.
    pub kind: String,
    /// Instrument code, e.g. `"USD"`.
    pub code: String,
    /// Quantity held.
    pub amount: Decimal,
    /// TRY unit price at entry.
    pub rate: Decimal,
}

/// Request body for updating a portfolio item.
#[derive(Debug, Deserialize)]
pub struct UpdatePortfolioRequest {
    /// New kind.
    pub kind: Option<String>,
    /// New code.
    pub code: Option<String>,
    /// New quantity.
    pub amount: Option<Decimal>,
    /// New unit price.
    pub rate: Option<Decimal>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Serializes a portfolio row for API responses.
fn item_json(item: &cuzdan_db::entities::portfolio_items::Model) -> serde_json::Value {
    json!({
        "id": item.id,
        "username": item.username,
        "kind": item.kind,
        "code": item.code,
        "amount": item.amount.to_string(),
        "rate": item.rate.to_string(),
        "value": (item.amount * item.rate).to_string(),
        "partnership_id": item.partnership_id,
        "created_at": item.created_at,
        "updated_at": item.updated_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/users/{username}/portfolio` - List portfolio items visible to a
/// user, with the derived effective value.
async fn list_portfolio(
    State(state): State<AppState>,
    Path(username): Path<String>,
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

    let repo = PortfolioRepository::new((*state.db).clone());
    match repo.list_for_scope(&scope).await {
        Ok(items) => {
            let holdings: Vec<PortfolioHolding> = items
                .iter()
                .map(|p| PortfolioHolding {
                    amount: p.amount,
                    rate: p.rate,
                })
                .collect();
            let value = effective_value(&holdings, user.portfolio_budget_included);

            let rows: Vec<serde_json::Value> = items.iter().map(item_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "portfolio": rows,
                    "effective_value": value.to_string(),
                    "included_in_budget": user.portfolio_budget_included
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list portfolio");
            map_portfolio_error(&e)
        }
    }
}

/// POST `/portfolio` - Create a portfolio item.
async fn create_item(
    State(state): State<AppState>,
    Json(payload): Json<CreatePortfolioRequest>,
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

    if payload.kind.trim().is_empty() || payload.code.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_holding",
                "message": "Kind and code cannot be empty"
            })),
        )
            .into_response();
    }

    if BudgetService::validate_value(payload.amount).is_err()
        || BudgetService::validate_value(payload.rate).is_err()
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

    let repo = PortfolioRepository::new((*state.db).clone());
    let input = CreatePortfolioInput {
        username: username.into_inner(),
        kind: payload.kind.trim().to_string(),
        code: payload.code.trim().to_string(),
        amount: payload.amount,
        rate: payload.rate,
    };

    match repo.create(input).await {
        Ok(item) => {
            info!(
                username = %item.username,
                code = %item.code,
                amount = %item.amount,
                "Portfolio item created"
            );

            let partner = resolve_partner(&state, &item.username).await;
            notify_pair(&state, &item.username, partner.as_deref());

            (StatusCode::CREATED, Json(item_json(&item))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create portfolio item");
            map_portfolio_error(&e)
        }
    }
}

/// PUT `/portfolio/{id}` - Update a portfolio item.
async fn update_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePortfolioRequest>,
) -> impl IntoResponse {
    for value in [payload.amount, payload.rate].into_iter().flatten() {
        if BudgetService::validate_value(value).is_err() {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({
                    "error": "negative_amount",
                    "message": "Amount cannot be negative"
                })),
            )
                .into_response();
        }
    }

    let repo = PortfolioRepository::new((*state.db).clone());
    let input = UpdatePortfolioInput {
        kind: payload.kind,
        code: payload.code,
        amount: payload.amount,
        rate: payload.rate,
    };

    match repo.update(id, input).await {
        Ok(item) => {
            info!(item_id = %item.id, username = %item.username, "Portfolio item updated");

            let partner = resolve_partner(&state, &item.username).await;
            notify_pair(&state, &item.username, partner.as_deref());

            (StatusCode::OK, Json(item_json(&item))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update portfolio item");
            map_portfolio_error(&e)
        }
    }
}

/// DELETE `/portfolio/{id}` - Delete a portfolio item.
async fn delete_item(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = PortfolioRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(item) => {
            info!(item_id = %item.id, username = %item.username, "Portfolio item deleted");

            let partner = resolve_partner(&state, &item.username).await;
            notify_pair(&state, &item.username, partner.as_deref());

            (
                StatusCode::OK,
                Json(json!({ "deleted": true, "id": item.id })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to delete portfolio item");
            map_portfolio_error(&e)
        }
    }
}

/// POST `/portfolio/refresh-rates` - Pull the latest TRY unit prices and
/// restamp stored rates.
async fn refresh_rates(State(state): State<AppState>) -> impl IntoResponse {
    let rates = match state.rates.fetch_latest().await {
        Ok(rates) => rates,
        Err(e) => {
            error!(error = %e, "Failed to fetch rates");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "error": "rate_source_error",
                    "message": "Failed to fetch current rates"
                })),
            )
                .into_response();
        }
    };

    let repo = PortfolioRepository::new((*state.db).clone());
    match repo.restamp_rates(&rates).await {
        Ok(updated) => {
            info!(updated = updated, codes = rates.len(), "Rates restamped");
            (
                StatusCode::OK,
                Json(json!({ "updated": updated, "codes": rates.len() })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to restamp rates");
            map_portfolio_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps portfolio errors to HTTP responses.
fn map_portfolio_error(e: &PortfolioError) -> axum::response::Response {
    match e {
        PortfolioError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Portfolio item not found: {}", id)
            })),
        )
            .into_response(),
        PortfolioError::OwnerNotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        PortfolioError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
