//! Notification dispatch seam.
//!
//! Mutation paths signal live clients that their dashboard data is stale.
//! The signal is at-least-once, unordered, carries no payload, and is purely
//! a cache-invalidation hint; the transport lives behind this trait so the
//! core and repositories never touch it.

/// Dispatches a refresh hint to every live connection of a username.
pub trait Notifier: Send + Sync {
    /// Signals the user's live sessions to refetch. Unknown usernames and
    /// empty rooms are a no-op.
    fn notify(&self, username: &str);
}

/// Notifier that drops every signal. For tests and offline tooling.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _username: &str) {}
}
