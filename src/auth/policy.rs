use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use super::principal::Principal;

/// What a protected surface requires of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Authenticated,
    Admin,
}

/// The only authorization outcomes ever surfaced to clients.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AuthError {
    /// No valid session. Maps to 401.
    #[error("Authentication required")]
    AuthenticationRequired,
    /// Valid session, insufficient role. Maps to 403.
    #[error("Access denied")]
    AuthorizationDenied,
}

impl AuthError {
    pub fn status(self) -> StatusCode {
        match self {
            AuthError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AuthError::AuthorizationDenied => StatusCode::FORBIDDEN,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(json!({ "success": false, "error": self.to_string() })),
        )
            .into_response()
    }
}

pub fn require_authenticated(principal: Option<&Principal>) -> bool {
    principal.is_some()
}

pub fn require_admin(principal: Option<&Principal>) -> bool {
    matches!(principal, Some(Principal::Admin(_)))
}

/// authorize
///
/// Decides whether `principal` holds `capability`. No session is a 401-class denial;
/// a session with the wrong role is a 403-class denial.
pub fn authorize(principal: Option<&Principal>, capability: Capability) -> Result<(), AuthError> {
    if !require_authenticated(principal) {
        return Err(AuthError::AuthenticationRequired);
    }
    match capability {
        Capability::Authenticated => Ok(()),
        Capability::Admin if require_admin(principal) => Ok(()),
        Capability::Admin => Err(AuthError::AuthorizationDenied),
    }
}
