use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Customer Views
///
/// Wrapped by `guard::customer_view_guard`: visitors without a session are redirected
/// to `/login`, everyone but admins sees the maintenance notice while it is on.
pub fn customer_views() -> Router<AppState> {
    Router::new().route("/account", get(handlers::account_view))
}

/// Admin Views
///
/// Wrapped by `guard::admin_view_guard`: no session redirects to `/admin/login`, a
/// customer session redirects home.
pub fn admin_views() -> Router<AppState> {
    Router::new().route("/admin/dashboard", get(handlers::admin_dashboard_view))
}
