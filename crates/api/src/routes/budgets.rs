//! Budget routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, put},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use cuzdan_core::budget::BudgetService;
use cuzdan_core::partner::RecordScope;
use cuzdan_core::portfolio::{PortfolioHolding, effective_value};
use cuzdan_db::repositories::budget::BudgetRepository;
use cuzdan_db::repositories::portfolio::PortfolioRepository;
use cuzdan_db::repositories::user::{UserError, UserRepository};
use cuzdan_shared::types::Username;

use crate::AppState;
use crate::routes::assets::map_budget_error;
use crate::routes::notify_pair;

/// Creates the budget routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{username}/budget", get(get_budget))
        .route("/users/{username}/budget", put(set_budget))
}

/// Request body for the explicit set-budget endpoint.
#[derive(Debug, Deserialize)]
pub struct SetBudgetRequest {
    /// Budget amount.
    pub amount: Decimal,
}

/// GET `/users/{username}/budget` - Stored cash budget plus the derived
/// portfolio contribution.
async fn get_budget(
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

    let budget_repo = BudgetRepository::new((*state.db).clone());
    let stored = match budget_repo.get_for(user.username.as_str()).await {
        Ok(row) => row.map_or(Decimal::ZERO, |b| b.amount),
        Err(e) => {
            error!(error = %e, "Failed to get budget");
            return map_budget_error(&e);
        }
    };

    // Portfolio contribution is derived at read time, never stored.
    let scope = RecordScope::for_records(
        &user.username,
        user.partner_username.as_deref(),
        user.partnership_id.as_deref(),
    );
    let portfolio_repo = PortfolioRepository::new((*state.db).clone());
    let portfolio = match portfolio_repo.list_for_scope(&scope).await {
        Ok(items) => items,
        Err(e) => {
            error!(error = %e, "Failed to list portfolio");
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

    let holdings: Vec<PortfolioHolding> = portfolio
        .iter()
        .map(|p| PortfolioHolding {
            amount: p.amount,
            rate: p.rate,
        })
        .collect();
    let portfolio_value = effective_value(&holdings, user.portfolio_budget_included);

    (
        StatusCode::OK,
        Json(json!({
            "username": user.username,
            "amount": stored.to_string(),
            "effective_portfolio_value": portfolio_value.to_string(),
            "total": (stored + portfolio_value).to_string()
        })),
    )
        .into_response()
}

/// PUT `/users/{username}/budget` - Explicitly set the budget. On the
/// partner-affecting path the synchronizer runs afterwards and the response
/// carries the reconciled total.
async fn set_budget(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<SetBudgetRequest>,
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

    let repo = BudgetRepository::new((*state.db).clone());

    match repo.set_budget(username.as_str(), payload.amount).await {
        Ok(total) => {
            info!(username = %username, amount = %total, "Budget set");

            let partner = crate::routes::resolve_partner(&state, username.as_str()).await;
            notify_pair(&state, username.as_str(), partner.as_deref());

            (
                StatusCode::OK,
                Json(json!({
                    "username": username.as_str(),
                    "amount": total.to_string()
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to set budget");
            map_budget_error(&e)
        }
    }
}
