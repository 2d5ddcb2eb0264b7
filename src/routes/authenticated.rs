use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Authenticated Router Module
///
/// Every route here is wrapped by `auth_middleware`, so handlers only run for callers
/// with a valid session of either role.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // GET /auth/me
        // The "who am I" endpoint: public fields of the resolved principal.
        .route("/auth/me", get(handlers::get_me))
}
