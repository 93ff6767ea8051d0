//! Dashboard route: everything the client renders in one response.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use rust_decimal::Decimal;
use serde_json::json;
use tracing::error;

use cuzdan_db::repositories::dashboard::{DashboardError, DashboardRepository};
use cuzdan_shared::types::Username;

use crate::AppState;

/// Creates the dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/users/{username}/dashboard", get(get_dashboard))
}

/// GET `/users/{username}/dashboard` - Merged view of the user's and
/// partner's expenses, assets, portfolio, budget, and display names.
async fn get_dashboard(
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

    let repo = DashboardRepository::new((*state.db).clone());

    match repo.get_dashboard(username.as_str()).await {
        Ok(data) => {
            let stored = data.budget.as_ref().map_or(Decimal::ZERO, |b| b.amount);

            let expenses: Vec<serde_json::Value> = data
                .expenses
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "username": e.username,
                        "title": e.title,
                        "category": e.category,
                        "vendor": e.vendor,
                        "amount": e.amount.to_string(),
                        "expense_date": e.expense_date,
                        "installments": e.installments
                    })
                })
                .collect();

            let assets: Vec<serde_json::Value> = data
                .assets
                .iter()
                .map(|a| {
                    json!({
                        "id": a.id,
                        "username": a.username,
                        "category": a.category,
                        "amount": a.amount.to_string(),
                        "value": a.value.to_string(),
                        "partnership_id": a.partnership_id
                    })
                })
                .collect();

            let portfolio: Vec<serde_json::Value> = data
                .portfolio
                .iter()
                .map(|p| {
                    json!({
                        "id": p.id,
                        "username": p.username,
                        "kind": p.kind,
                        "code": p.code,
                        "amount": p.amount.to_string(),
                        "rate": p.rate.to_string(),
                        "value": (p.amount * p.rate).to_string()
                    })
                })
                .collect();

            (
                StatusCode::OK,
                Json(json!({
                    "user": {
                        "username": data.user.username,
                        "full_name": data.user.full_name,
                        "partner_username": data.user.partner_username,
                        "partnership_id": data.user.partnership_id,
                        "portfolio_budget_included": data.user.portfolio_budget_included
                    },
                    "expenses": expenses,
                    "assets": assets,
                    "portfolio": portfolio,
                    "budget": {
                        "amount": stored.to_string(),
                        "effective_portfolio_value": data.effective_portfolio_value.to_string(),
                        "total": (stored + data.effective_portfolio_value).to_string()
                    },
                    "names": data.display_names
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to build dashboard");
            map_dashboard_error(&e)
        }
    }
}

/// Maps dashboard errors to HTTP responses.
fn map_dashboard_error(e: &DashboardError) -> axum::response::Response {
    match e {
        DashboardError::UserNotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        DashboardError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
