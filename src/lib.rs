use axum::{
    Router,
    extract::{FromRef, Request},
    http::{HeaderName, HeaderValue, Method, header},
    middleware::{self, Next},
    response::Response,
};
use chrono::Duration;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Session authentication core: token codec, cookie transport, principal, policy.
pub mod auth;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod maintenance;
pub mod models;
pub mod password;
pub mod repository;

// Routing segregated by required access (Public, Authenticated, Admin, Views).
pub mod routes;
use auth::{Authenticated, CookiePolicy, TokenCodec, TokenCodecState};
use routes::{admin, authenticated, public, views};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use maintenance::MaintenanceGate;
pub use password::{Argon2Passwords, PasswordService, PasswordState};
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::login, handlers::admin_login, handlers::register, handlers::logout,
        handlers::get_me, handlers::get_maintenance, handlers::set_maintenance,
        handlers::account_view, handlers::admin_dashboard_view
    ),
    components(
        schemas(
            models::LoginRequest, models::RegisterRequest, models::LoginResponse,
            models::MeResponse, models::PublicUser, models::Role, models::MaintenanceStatus,
            models::MaintenanceUpdate, models::ViewModel,
        )
    ),
    tags(
        (name = "rental-portal", description = "Car rental session and access-control API")
    )
)]
struct ApiDoc;

/// Plaintext behind `AppState::decoy_digest`. No account owns the resulting digest.
const DECOY_PASSWORD: &str = "decoy-password-for-unknown-accounts";

/// AppState
///
/// The single, immutable container of shared services handed to every request.
#[derive(Clone)]
pub struct AppState {
    /// Account lookups and the key/value settings store.
    pub repo: RepositoryState,
    /// The loaded environment configuration.
    pub config: AppConfig,
    /// Session token signer/verifier, keyed once at startup.
    pub tokens: TokenCodecState,
    /// Password hashing primitive.
    pub passwords: PasswordState,
    /// Digest verified in place of an account's when a login names no account.
    pub decoy_digest: Arc<str>,
}

impl AppState {
    /// Builds the state with a codec keyed from `config` and Argon2 password hashing.
    pub fn new(repo: RepositoryState, config: AppConfig) -> Self {
        Self::with_passwords(repo, config, Arc::new(Argon2Passwords))
    }

    /// Builds the state around a specific password service. The decoy digest is
    /// produced by that same service.
    pub fn with_passwords(
        repo: RepositoryState,
        config: AppConfig,
        passwords: PasswordState,
    ) -> Self {
        let tokens = Arc::new(TokenCodec::new(
            config.jwt_secret.as_bytes(),
            Duration::seconds(config.session_ttl_secs),
        ));
        let decoy_digest: Arc<str> = match passwords.hash(DECOY_PASSWORD) {
            Ok(digest) => Arc::from(digest),
            Err(err) => {
                tracing::warn!("could not prepare decoy password digest: {err}");
                Arc::from("")
            }
        };
        Self {
            repo,
            config,
            tokens,
            passwords,
            decoy_digest,
        }
    }

    /// A gate over this state's repository. Cheap: it only clones the `Arc`.
    pub fn maintenance(&self) -> MaintenanceGate {
        MaintenanceGate::new(self.repo.clone())
    }

    pub fn cookie_policy(&self) -> CookiePolicy {
        CookiePolicy::new(self.config.cookie_secure())
    }
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

impl FromRef<AppState> for TokenCodecState {
    fn from_ref(app_state: &AppState) -> TokenCodecState {
        app_state.tokens.clone()
    }
}

/// auth_middleware
///
/// Enforces a valid session for the `authenticated_routes`. The `Authenticated`
/// extractor rejects with 401 before the handler runs when there is none.
async fn auth_middleware(_principal: Authenticated, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies access-control and maintenance layers, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // CORS: only the configured frontend may send credentialed (cookie) requests.
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);
    match HeaderValue::from_str(&state.config.frontend_origin) {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(_) => tracing::warn!(
            origin = %state.config.frontend_origin,
            "FRONTEND_ORIGIN is not a valid header value; cross-origin requests disabled"
        ),
    }

    let x_request_id = HeaderName::from_static("x-request-id");

    // API surface. The maintenance layer wraps everything merged above it.
    let api = Router::new()
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware)),
        )
        .nest("/admin", admin::admin_routes())
        .merge(views::customer_views().route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::customer_view_guard,
        )))
        .merge(views::admin_views().route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::admin_view_guard,
        )))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            maintenance::maintenance_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request tracing span with method, uri and the `x-request-id`, so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
