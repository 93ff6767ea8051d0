//! API route definitions.

use axum::Router;
use tracing::warn;

use cuzdan_core::notify::Notifier;
use cuzdan_db::{NotificationRepository, UserRepository};

use crate::AppState;

pub mod assets;
pub mod budgets;
pub mod catalog;
pub mod dashboard;
pub mod expenses;
pub mod health;
pub mod notifications;
pub mod portfolio;
pub mod users;

/// Creates the API router with all routes.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(users::routes())
        .merge(assets::routes())
        .merge(budgets::routes())
        .merge(expenses::routes())
        .merge(portfolio::routes())
        .merge(dashboard::routes())
        .merge(catalog::routes())
        .merge(notifications::routes())
        .merge(crate::ws::routes())
}

/// Resolves the linked partner of a username, if any. Lookup failures are
/// logged and treated as "no partner": the refresh channel is best-effort.
pub(crate) async fn resolve_partner(state: &AppState, username: &str) -> Option<String> {
    let repo = UserRepository::new((*state.db).clone());
    match repo.find_by_username(username).await {
        Ok(Some(user)) => user.partner_username,
        Ok(None) => None,
        Err(e) => {
            warn!(error = %e, username = %username, "Failed to resolve partner");
            None
        }
    }
}

/// Signals the acting user's live sessions and, if a partner is known, the
/// partner's as a separate call.
pub(crate) fn notify_pair(state: &AppState, username: &str, partner: Option<&str>) {
    state.hub.notify(username);
    if let Some(partner) = partner {
        state.hub.notify(partner);
    }
}

/// Records a stored notification for the partner. Failures are logged, not
/// surfaced: the mutation itself already succeeded.
pub(crate) async fn record_partner_notification(
    state: &AppState,
    partner: &str,
    actor: &str,
    message: &str,
) {
    let repo = NotificationRepository::new((*state.db).clone());
    if let Err(e) = repo.create(partner, actor, message).await {
        warn!(error = %e, partner = %partner, "Failed to record notification");
    }
}
