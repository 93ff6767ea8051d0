//! Catalog routes: category and vendor listings, read-only.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use cuzdan_db::repositories::catalog::{CatalogError, CatalogRepository, VendorFilter};

use crate::AppState;

/// Creates the catalog routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/vendors", get(list_vendors))
}

/// Query parameters for the vendor listing.
#[derive(Debug, Deserialize)]
pub struct VendorQuery {
    /// Filter by city.
    pub city: Option<String>,
    /// Filter by vendor category.
    pub category: Option<String>,
}

/// GET `/categories` - List expense categories in display order.
async fn list_categories(State(state): State<AppState>) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());

    match repo.list_categories().await {
        Ok(categories) => {
            let rows: Vec<serde_json::Value> = categories
                .iter()
                .map(|c| {
                    json!({
                        "id": c.id,
                        "name": c.name,
                        "icon": c.icon,
                        "sort_order": c.sort_order
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "categories": rows }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list categories");
            map_catalog_error(&e)
        }
    }
}

/// GET `/vendors` - List vendors, optionally filtered by city and category.
async fn list_vendors(
    State(state): State<AppState>,
    Query(query): Query<VendorQuery>,
) -> impl IntoResponse {
    let repo = CatalogRepository::new((*state.db).clone());
    let filter = VendorFilter {
        city: query.city,
        category: query.category,
    };

    match repo.list_vendors(&filter).await {
        Ok(vendors) => {
            let rows: Vec<serde_json::Value> = vendors
                .iter()
                .map(|v| {
                    json!({
                        "id": v.id,
                        "name": v.name,
                        "city": v.city,
                        "category": v.category,
                        "phone": v.phone
                    })
                })
                .collect();
            (StatusCode::OK, Json(json!({ "vendors": rows }))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to list vendors");
            map_catalog_error(&e)
        }
    }
}

/// Maps catalog errors to HTTP responses.
fn map_catalog_error(e: &CatalogError) -> axum::response::Response {
    match e {
        CatalogError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
