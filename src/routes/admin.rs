use crate::{AppState, handlers};
use axum::{Router, routing::put};

/// Admin Router Module
///
/// Back-office API nested under `/admin`. Handlers authorize through the component
/// they call and answer 401 (no session) or 403 (customer session) on denial.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // PUT /admin/maintenance
        // Turns site-wide maintenance mode on or off.
        .route("/maintenance", put(handlers::set_maintenance))
}
