use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::{
    AppState,
    auth::{self, AuthError, Capability, Principal, require_admin},
    repository::{RepositoryState, StorageError},
};

/// Settings key holding the flag.
pub const MAINTENANCE_KEY: &str = "maintenance_mode";

/// Paths that stay reachable for everyone while maintenance is on.
pub const MAINTENANCE_EXEMPT_PATHS: &[&str] = &[
    "/health",
    "/auth/login",
    "/auth/logout",
    "/admin/login",
    "/maintenance",
];

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Denied(#[from] AuthError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// MaintenanceGate
///
/// Reads and writes the site-wide maintenance flag. Every read goes to storage; there
/// is no caching across requests or instances.
#[derive(Clone)]
pub struct MaintenanceGate {
    repo: RepositoryState,
}

impl MaintenanceGate {
    pub fn new(repo: RepositoryState) -> Self {
        Self { repo }
    }

    /// is_enabled
    ///
    /// Fails open: if the flag cannot be read the site is treated as live.
    pub async fn is_enabled(&self) -> bool {
        match self.repo.get_setting(MAINTENANCE_KEY).await {
            Ok(value) => value.as_deref().map(str::trim) == Some("true"),
            Err(err) => {
                tracing::warn!("maintenance flag unreadable, treating as disabled: {err}");
                false
            }
        }
    }

    /// set_enabled
    ///
    /// Only an administrator may flip the flag. Storage failures propagate so the
    /// admin sees the toggle did not take effect.
    pub async fn set_enabled(
        &self,
        enabled: bool,
        acting: Option<&Principal>,
    ) -> Result<(), MaintenanceError> {
        auth::authorize(acting, Capability::Admin)?;
        let value = if enabled { "true" } else { "false" };
        self.repo.upsert_setting(MAINTENANCE_KEY, value).await?;
        tracing::info!(
            enabled,
            admin = %acting.map(|p| p.id().to_string()).unwrap_or_default(),
            "maintenance mode updated"
        );
        Ok(())
    }
}

/// The body returned to non-admin callers while maintenance is on.
pub fn maintenance_notice() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({
            "success": false,
            "maintenance": true,
            "error": "The site is undergoing maintenance. Please try again later."
        })),
    )
        .into_response()
}

/// maintenance_middleware
///
/// Applied to the whole API. While maintenance is on, any request from a non-admin
/// principal (including anonymous) outside the exempt paths is answered with the
/// maintenance notice instead of reaching its handler.
pub async fn maintenance_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if MAINTENANCE_EXEMPT_PATHS.contains(&request.uri().path()) {
        return next.run(request).await;
    }

    let is_admin = require_admin(auth::resolve(request.headers(), &state.tokens).as_ref());
    if !is_admin && state.maintenance().is_enabled().await {
        tracing::debug!(path = %request.uri().path(), "request blocked by maintenance mode");
        return maintenance_notice();
    }
    next.run(request).await
}
