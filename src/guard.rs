use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use std::future::Future;

use crate::{
    AppState,
    auth::{self, Capability, Principal, authorize, policy::AuthError},
    maintenance,
};

/// Why a guarded view was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Denial {
    /// No session: send the visitor to the login page for this area.
    Login,
    /// Signed in with the wrong role: send the visitor home.
    Home,
    /// Maintenance is on and the visitor is not an administrator.
    Maintenance,
}

/// Guard states. `Denied` and `Allowed` are terminal for one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GuardState {
    Resolving,
    Denied(Denial),
    Allowed(Principal),
}

/// RouteGuard
///
/// Decides whether a protected view may render. Both inputs, the principal and the
/// maintenance flag, are awaited together and only their combined result counts.
#[derive(Debug, Clone)]
pub struct RouteGuard {
    required: Capability,
    login_path: &'static str,
    state: GuardState,
}

impl RouteGuard {
    /// Guard for customer-facing views; unauthenticated visitors go to `/login`.
    pub fn customer() -> Self {
        Self::new(Capability::Authenticated, "/login")
    }

    /// Guard for back-office views; unauthenticated visitors go to `/admin/login`.
    pub fn admin() -> Self {
        Self::new(Capability::Admin, "/admin/login")
    }

    pub fn new(required: Capability, login_path: &'static str) -> Self {
        Self {
            required,
            login_path,
            state: GuardState::Resolving,
        }
    }

    pub fn state(&self) -> &GuardState {
        &self.state
    }

    pub fn login_path(&self) -> &'static str {
        self.login_path
    }

    /// settle
    ///
    /// Applies the combined lookup result. Has no effect once the guard has left
    /// `Resolving`.
    pub fn settle(&mut self, principal: Option<Principal>, maintenance_enabled: bool) -> &GuardState {
        if self.state != GuardState::Resolving {
            return &self.state;
        }

        let is_admin = auth::require_admin(principal.as_ref());
        self.state = if maintenance_enabled && !is_admin {
            GuardState::Denied(Denial::Maintenance)
        } else {
            match (authorize(principal.as_ref(), self.required), principal) {
                (Ok(()), Some(principal)) => GuardState::Allowed(principal),
                (Err(AuthError::AuthorizationDenied), _) => GuardState::Denied(Denial::Home),
                _ => GuardState::Denied(Denial::Login),
            }
        };
        &self.state
    }

    /// resolve
    ///
    /// Drives both lookups concurrently, in whatever order they complete, then settles.
    pub async fn resolve<P, M>(&mut self, principal: P, maintenance_enabled: M) -> &GuardState
    where
        P: Future<Output = Option<Principal>>,
        M: Future<Output = bool>,
    {
        let (principal, enabled) = tokio::join!(principal, maintenance_enabled);
        self.settle(principal, enabled)
    }

    /// render
    ///
    /// Produces the protected content only from `Allowed`; every other state yields
    /// `None`, so nothing protected exists before or after a denial.
    pub fn render<T>(&self, view: impl FnOnce(&Principal) -> T) -> Option<T> {
        match &self.state {
            GuardState::Allowed(principal) => Some(view(principal)),
            _ => None,
        }
    }

    /// The HTTP outcome of a denial: a `303` redirect or the maintenance notice.
    pub fn denial_response(&self) -> Option<Response> {
        match self.state {
            GuardState::Denied(Denial::Login) => {
                Some(Redirect::to(self.login_path).into_response())
            }
            GuardState::Denied(Denial::Home) => Some(Redirect::to("/").into_response()),
            GuardState::Denied(Denial::Maintenance) => Some(maintenance::maintenance_notice()),
            _ => None,
        }
    }
}

async fn run_guard(
    mut guard: RouteGuard,
    state: AppState,
    mut request: Request,
    next: Next,
) -> Response {
    let gate = state.maintenance();
    let (headers, codec) = (request.headers(), &state.tokens);
    guard
        .resolve(async move { auth::resolve(headers, codec) }, gate.is_enabled())
        .await;

    let view = guard.render(|principal| {
        request.extensions_mut().insert(principal.clone());
        next.run(request)
    });
    match view {
        Some(view) => view.await,
        // resolve() never leaves the guard in Resolving.
        None => guard
            .denial_response()
            .unwrap_or_else(maintenance::maintenance_notice),
    }
}

/// Middleware guarding customer views (any signed-in principal).
pub async fn customer_view_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    run_guard(RouteGuard::customer(), state, request, next).await
}

/// Middleware guarding back-office views (administrators only).
pub async fn admin_view_guard(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    run_guard(RouteGuard::admin(), state, request, next).await
}
