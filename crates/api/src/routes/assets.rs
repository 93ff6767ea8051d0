//! Asset routes.
//!
//! Every mutation response carries the budget figure after the mutation:
//! recomputed by the synchronizer when the row is (or was) cash, read back
//! unchanged otherwise.

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
use cuzdan_db::repositories::asset::{
    AssetError, AssetRepository, CreateAssetInput, UpdateAssetInput,
};
use cuzdan_db::repositories::budget::{BudgetError, BudgetRepository};
use cuzdan_db::repositories::user::{UserError, UserRepository};
use cuzdan_shared::types::Username;

use crate::AppState;
use crate::routes::{notify_pair, record_partner_notification, resolve_partner};

/// Creates the asset routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{username}/assets", get(list_assets))
        .route("/assets", post(create_asset))
        .route("/assets/{id}", put(update_asset))
        .route("/assets/{id}", delete(delete_asset))
}

// ============================================================================
// Request Types
// ============================================================================

/// Request body for creating an asset.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    /// Owning username.
    pub username: String,
    /// Free-text category; `"Nakit"` feeds the budget.
    pub category: String,
    /// Quantity held.
    pub amount: Decimal,
    /// Monetary value.
    pub value: Decimal,
}

/// Request body for updating an asset.
#[derive(Debug, Deserialize)]
pub struct UpdateAssetRequest {
    /// New category.
    pub category: Option<String>,
    /// New quantity.
    pub amount: Option<Decimal>,
    /// New monetary value.
    pub value: Option<Decimal>,
}

// ============================================================================
// Helpers
// ============================================================================

/// Serializes an asset row for API responses.
fn asset_json(asset: &cuzdan_db::entities::assets::Model) -> serde_json::Value {
    json!({
        "id": asset.id,
        "username": asset.username,
        "category": asset.category,
        "amount": asset.amount.to_string(),
        "value": asset.value.to_string(),
        "partnership_id": asset.partnership_id,
        "created_at": asset.created_at,
        "updated_at": asset.updated_at
    })
}

/// Budget figure accompanying a mutation response: recomputed when the
/// mutation touched cash, read back unchanged otherwise.
async fn budget_after_mutation(
    state: &AppState,
    username: &str,
    touched_cash: bool,
) -> Result<Decimal, BudgetError> {
    let repo = BudgetRepository::new((*state.db).clone());
    if touched_cash {
        repo.sync_cash_budget(username).await
    } else {
        Ok(repo
            .get_for(username)
            .await?
            .map_or(Decimal::ZERO, |b| b.amount))
    }
}

// ============================================================================
// Route Handlers
// ============================================================================

/// GET `/users/{username}/assets` - List assets visible to a user.
async fn list_assets(
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

    let scope = RecordScope::for_assets(
        &user.username,
        user.partner_username.as_deref(),
        user.partnership_id.as_deref(),
    );

    let repo = AssetRepository::new((*state.db).clone());
    match repo.list_for_scope(&scope).await {
        Ok(assets) => {
            let response: Vec<serde_json::Value> = assets.iter().map(asset_json).collect();
            (StatusCode::OK, Json(json!({ "assets": response }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list assets");
            map_asset_error(&e)
        }
    }
}

/// POST `/assets` - Create an asset and resync the budget if it is cash.
async fn create_asset(
    State(state): State<AppState>,
    Json(payload): Json<CreateAssetRequest>,
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

    if payload.category.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_category",
                "message": "Category cannot be empty"
            })),
        )
            .into_response();
    }

    if BudgetService::validate_value(payload.amount).is_err()
        || BudgetService::validate_value(payload.value).is_err()
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

    let repo = AssetRepository::new((*state.db).clone());
    let input = CreateAssetInput {
        username: username.into_inner(),
        category: payload.category.trim().to_string(),
        amount: payload.amount,
        value: payload.value,
    };

    let asset = match repo.create(input).await {
        Ok(asset) => asset,
        Err(e) => {
            error!(error = %e, "Failed to create asset");
            return map_asset_error(&e);
        }
    };

    let touched_cash = BudgetService::is_cash_category(&asset.category);
    let budget = match budget_after_mutation(&state, &asset.username, touched_cash).await {
        Ok(budget) => budget,
        Err(e) => {
            error!(error = %e, "Failed to sync budget");
            return map_budget_error(&e);
        }
    };

    info!(
        username = %asset.username,
        category = %asset.category,
        value = %asset.value,
        "Asset created"
    );

    let partner = resolve_partner(&state, &asset.username).await;
    if let Some(partner) = &partner {
        record_partner_notification(
            &state,
            partner,
            &asset.username,
            &format!("{} added an asset: {}", asset.username, asset.category),
        )
        .await;
    }
    notify_pair(&state, &asset.username, partner.as_deref());

    (
        StatusCode::CREATED,
        Json(json!({
            "asset": asset_json(&asset),
            "budget": budget.to_string()
        })),
    )
        .into_response()
}

/// PUT `/assets/{id}` - Update an asset, resyncing if cash is involved.
async fn update_asset(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateAssetRequest>,
) -> impl IntoResponse {
    if let Some(category) = &payload.category
        && category.trim().is_empty()
    {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": "invalid_category",
                "message": "Category cannot be empty"
            })),
        )
            .into_response();
    }

    for value in [payload.amount, payload.value].into_iter().flatten() {
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

    let repo = AssetRepository::new((*state.db).clone());
    let input = UpdateAssetInput {
        category: payload.category.map(|c| c.trim().to_string()),
        amount: payload.amount,
        value: payload.value,
    };

    let update = match repo.update(id, input).await {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "Failed to update asset");
            return map_asset_error(&e);
        }
    };

    let touched_cash = BudgetService::mutation_touches_cash(
        Some(&update.previous_category),
        Some(&update.asset.category),
    );
    let budget = match budget_after_mutation(&state, &update.asset.username, touched_cash).await {
        Ok(budget) => budget,
        Err(e) => {
            error!(error = %e, "Failed to sync budget");
            return map_budget_error(&e);
        }
    };

    info!(
        asset_id = %update.asset.id,
        username = %update.asset.username,
        "Asset updated"
    );

    let partner = resolve_partner(&state, &update.asset.username).await;
    notify_pair(&state, &update.asset.username, partner.as_deref());

    (
        StatusCode::OK,
        Json(json!({
            "asset": asset_json(&update.asset),
            "budget": budget.to_string()
        })),
    )
        .into_response()
}

/// DELETE `/assets/{id}` - Delete an asset, resyncing if it was cash.
async fn delete_asset(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = AssetRepository::new((*state.db).clone());

    let asset = match repo.delete(id).await {
        Ok(asset) => asset,
        Err(e) => {
            error!(error = %e, "Failed to delete asset");
            return map_asset_error(&e);
        }
    };

    let touched_cash = BudgetService::is_cash_category(&asset.category);
    let budget = match budget_after_mutation(&state, &asset.username, touched_cash).await {
        Ok(budget) => budget,
        Err(e) => {
            error!(error = %e, "Failed to sync budget");
            return map_budget_error(&e);
        }
    };

    info!(asset_id = %asset.id, username = %asset.username, "Asset deleted");

    let partner = resolve_partner(&state, &asset.username).await;
    notify_pair(&state, &asset.username, partner.as_deref());

    (
        StatusCode::OK,
        Json(json!({
            "deleted": true,
            "id": asset.id,
            "budget": budget.to_string()
        })),
    )
        .into_response()
}

// ============================================================================
// Error Mapping
// ============================================================================

/// Maps asset errors to HTTP responses.
fn map_asset_error(e: &AssetError) -> axum::response::Response {
    match e {
        AssetError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Asset not found: {}", id)
            })),
        )
            .into_response(),
        AssetError::OwnerNotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        AssetError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}

/// Maps budget errors to HTTP responses.
pub(crate) fn map_budget_error(e: &BudgetError) -> axum::response::Response {
    match e {
        BudgetError::UserNotFound(username) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("User not found: {}", username)
            })),
        )
            .into_response(),
        BudgetError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
