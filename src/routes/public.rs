use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a session. The login surfaces, logout and the
/// maintenance read also stay reachable while maintenance mode is on.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /auth/login
        // Customer sign-in. Sets the session cookie on success.
        .route("/auth/login", post(handlers::login))
        // POST /auth/register
        // Customer self-registration; signs the new customer in.
        .route("/auth/register", post(handlers::register))
        // POST /auth/logout
        // Clears the session cookie. Always succeeds.
        .route("/auth/logout", post(handlers::logout))
        // POST /admin/login
        // Back-office sign-in. Kept out of the `/admin` nest so it is never gated.
        .route("/admin/login", post(handlers::admin_login))
        // GET /maintenance
        // Public read of the maintenance flag, used by the frontend route guard.
        .route("/maintenance", get(handlers::get_maintenance))
}
