//! Stored notification routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use uuid::Uuid;

use cuzdan_db::repositories::notification::{NotificationError, NotificationRepository};
use cuzdan_shared::types::{PageRequest, Username};

use crate::AppState;

/// Creates the notification routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users/{username}/notifications", get(list_notifications))
        .route("/notifications/{id}/read", put(mark_read))
        .route("/notifications/{id}", delete(delete_notification))
}

/// Query parameters for the notification listing.
#[derive(Debug, Deserialize)]
pub struct NotificationQuery {
    /// Only unread notifications.
    #[serde(default)]
    pub unread: bool,
    /// Maximum number of items to return.
    pub limit: Option<u64>,
    /// Number of items to skip.
    pub offset: Option<u64>,
}

impl NotificationQuery {
    /// Pagination derived from the raw query values.
    fn page(&self) -> PageRequest {
        let mut page = PageRequest::default();
        if let Some(limit) = self.limit {
            page.limit = limit;
        }
        if let Some(offset) = self.offset {
            page.offset = offset;
        }
        page
    }
}

/// Serializes a notification row for API responses.
fn notification_json(n: &cuzdan_db::entities::notifications::Model) -> serde_json::Value {
    json!({
        "id": n.id,
        "username": n.username,
        "actor": n.actor,
        "message": n.message,
        "read": n.read,
        "created_at": n.created_at
    })
}

/// GET `/users/{username}/notifications` - List a user's notifications.
async fn list_notifications(
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<NotificationQuery>,
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

    let repo = NotificationRepository::new((*state.db).clone());

    let page = query.page();
    match repo
        .list_for(
            username.as_str(),
            query.unread,
            page.clamped_limit(),
            page.offset,
        )
        .await
    {
        Ok((notifications, total)) => {
            let rows: Vec<serde_json::Value> =
                notifications.iter().map(notification_json).collect();
            (
                StatusCode::OK,
                Json(json!({
                    "notifications": rows,
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
            error!(error = %e, "Failed to list notifications");
            map_notification_error(&e)
        }
    }
}

/// PUT `/notifications/{id}/read` - Mark a notification read.
async fn mark_read(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.mark_read(id).await {
        Ok(notification) => {
            (StatusCode::OK, Json(notification_json(&notification))).into_response()
        }
        Err(e) => {
            error!(error = %e, "Failed to mark notification read");
            map_notification_error(&e)
        }
    }
}

/// DELETE `/notifications/{id}` - Delete a notification.
async fn delete_notification(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let repo = NotificationRepository::new((*state.db).clone());

    match repo.delete(id).await {
        Ok(()) => (StatusCode::OK, Json(json!({ "deleted": true, "id": id }))).into_response(),
        Err(e) => {
            error!(error = %e, "Failed to delete notification");
            map_notification_error(&e)
        }
    }
}

/// Maps notification errors to HTTP responses.
fn map_notification_error(e: &NotificationError) -> axum::response::Response {
    match e {
        NotificationError::NotFound(id) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "error": "not_found",
                "message": format!("Notification not found: {}", id)
            })),
        )
            .into_response(),
        NotificationError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": "internal_error",
                "message": "An error occurred"
            })),
        )
            .into_response(),
    }
}
