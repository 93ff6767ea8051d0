//! User account and partner-link routes.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info};

use cuzdan_db::repositories::user::{CreateUserInput, UserError, UserRepository};
use cuzdan_shared::types::Username;

use crate::AppState;
use crate::routes::notify_pair;

/// Creates the user routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/{username}", get(get_user))
        .route(
            "/users/{username}/portfolio-inclusion",
            put(set_portfolio_inclusion),
        )
        .route("/users/{username}/partner", post(link_partner))
        .route("/users/{username}/partner", delete(unlink_partner))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating a user.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    /// Username (will be normalized).
    pub username: String,
    /// Display name.
    pub full_name: String,
}

/// Request body for the portfolio-inclusion toggle.
#[derive(Debug, Deserialize)]
pub struct PortfolioInclusionRequest {
    /// Whether portfolio value counts toward the displayed budget.
    pub included: bool,
}

/// Request body for linking a partner.
#[derive(Debug, Deserialize)]
pub struct LinkPartnerRequest {
    /// Partner username (will be normalized).
    pub partner_username: String,
}

// ============================================================================
// Helpers
// ============================================================================

/// Parses a username or produces the 400 envelope.
fn parse_username(raw: &str) -> Result<Username, axum::response::Response> {
    Username::parse(raw).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_username",
                "message": e.to_string()
            })),
        )
            .into_response()
    })
}

/// Serializes a user row for API responses.
fn user_json(user: &cuzdan_db::entities::users::Model) -> serde_json::Value {
    json!({
        "username": user.username,
        "full_name": user.full_name,
        "partner_username": user.partner_username,
        "partnership_id": user.partnership_id,
        "portfolio_budget_included": user.portfolio_budget_included,
        "created_at": user.created_at,
        "updated_at": user.updated_at
    })
}

// ============================================================================
// Route Handlers
// ============================================================================

/// POST `/users` - Create a user account.
async fn create_user(
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> impl IntoResponse {
    let username = match parse_username(&payload.username) {
        Ok(username) => username,
        Err(response) => return response,
    };

    if payload.full_name.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_full_name",
                "message": "Full name cannot be empty"
            })),
        )
            .into_response();
    }

    let repo = UserRepository::new((*state.db).clone());
    let input = CreateUserInput {
        username: username.into_inner(),
        full_name: payload.full_name.trim().to_string(),
    };

    match repo.create(input).await {
        Ok(user) => {
            info!(username = %user.username, "User created");
            (StatusCode::CREATED, Json(user_json(&user))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to create user");
            map_user_error(&e)
        }
    }
}

/// GET `/users/{username}` - Get a user profile.
async fn get_user(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let username = match parse_username(&username) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let repo = UserRepository::new((*state.db).clone());

    match repo.get(username.as_str()).await {
        Ok(user) => (StatusCode::OK, Json(user_json(&user))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to get user");
            map_user_error(&e)
        }
    }
}

/// PUT `/users/{username}/portfolio-inclusion` - Toggle whether portfolio
/// value counts toward the displayed budget.
async fn set_portfolio_inclusion(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<PortfolioInclusionRequest>,
) -> impl IntoResponse {
    let username = match parse_username(&username) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let repo = UserRepository::new((*state.db).clone());

    match repo
        .set_portfolio_inclusion(username.as_str(), payload.included)
        .await
    {
        Ok(user) => {
            info!(
                username = %user.username,
                included = payload.included,
                "Portfolio inclusion updated"
            );
            notify_pair(&state, &user.username, None);
            (StatusCode::OK, Json(user_json(&user))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to update portfolio inclusion");
            map_user_error(&e)
        }
    }
}

/// POST `/users/{username}/partner` - Link two users as partners.
async fn link_partner(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Json(payload): Json<LinkPartnerRequest>,
) -> impl IntoResponse {
    let username = match parse_username(&username) {
        Ok(username) => username,
        Err(response) => return response,
    };
    let partner_username = match parse_username(&payload.partner_username) {
        Ok(partner) => partner,
        Err(response) => return response,
    };

    let repo = UserRepository::new((*state.db).clone());

    match repo
        .link_partner(username.as_str(), partner_username.as_str())
        .await
    {
        Ok((user, partner)) => {
            info!(
                username = %user.username,
                partner = %partner.username,
                partnership_id = ?user.partnership_id,
                "Partners linked"
            );

            crate::routes::record_partner_notification(
                &state,
                &partner.username,
                &user.username,
                &format!("{} linked budgets with you", user.full_name),
            )
            .await;
            notify_pair(&state, &user.username, Some(&partner.username));

            (
                StatusCode::OK,
                Json(json!({
                    "user": user_json(&user),
                    "partner": user_json(&partner)
                })),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to link partners");
            map_user_error(&e)
        }
    }
}

/// DELETE `/users/{username}/partner` - Remove the partner link.
async fn unlink_partner(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> impl IntoResponse {
    let username = match parse_username(&username) {
        Ok(username) => username,
        Err(response) => return response,
    };

    let repo = UserRepository::new((*state.db).clone());

    // Capture the partner before the link is cleared so both sides still
    // get the refresh signal.
    let previous_partner = match repo.find_by_username(username.as_str()).await {
        Ok(Some(user)) => user.partner_username,
        Ok(None) => {
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
            error!(error = %e, "Failed to find user");
            return map_user_error(&e);
        }
    };

    match repo.unlink_partner(username.as_str()).await {
        Ok(user) => {
            info!(username = %user.username, "Partner unlinked");
            notify_pair(&state, &user.username, previous_partner.as_deref());
            (StatusCode::OK, Json(user_json(&user))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to unlink partner");
            map_user_error(&e)
        }
    }
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps user errors to HTTP responses.
fn map_user_error(e: &UserError) -> axum::response::Response {
    match e {
        UserError::NotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        UserError::DuplicateUsername(username) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "duplicate_username",
                "message": format!("Username already taken: {}", username)
            })),
        )
            .into_response(),
        UserError::SelfLink => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "self_link",
                "message": "Cannot link a user to themselves"
            })),
        )
            .into_response(),
        UserError::AlreadyLinked(username) => (
            StatusCode::CONFLICT,
            Json(json!({
                "error": "already_linked",
                "message": format!("User already linked: {}", username)
            })),
        )
            .into_response(),
        UserError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
