use crate::{
    AppState,
    auth::{
        AdminOnly, AdminPrincipal, Authenticated, CustomerPrincipal, Principal, cookie,
    },
    error::ApiError,
    models::{
        Admin, Customer, LoginRequest, LoginResponse, MaintenanceStatus, MaintenanceUpdate,
        MeResponse, NewCustomer, PublicUser, RegisterRequest, ViewModel,
    },
    password::PasswordState,
};
use axum::{
    Extension, Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::json;

// --- Session Helpers ---

/// Issues a token for `principal` and packages the cookie directive with the public
/// login body.
fn start_session(
    state: &AppState,
    principal: Principal,
) -> Result<(HeaderMap, Json<LoginResponse>), ApiError> {
    let token = state.tokens.issue_session(&principal).map_err(|err| {
        tracing::error!("failed to issue session token: {err}");
        ApiError::Internal
    })?;

    let mut headers = HeaderMap::new();
    let max_age = state.tokens.ttl().num_seconds();
    if !cookie::attach(&mut headers, &token, max_age, state.cookie_policy()) {
        return Err(ApiError::Internal);
    }

    let body = LoginResponse {
        success: true,
        user: PublicUser::from(&principal),
    };
    Ok((headers, Json(body)))
}

/// Runs the Argon2 check off the async executor.
async fn password_matches(passwords: PasswordState, plain: String, digest: String) -> bool {
    tokio::task::spawn_blocking(move || passwords.verify(&plain, &digest))
        .await
        .unwrap_or(false)
}

/// Spends the same verification work as a real check when the email matched no
/// account, so response time does not reveal which accounts exist.
async fn reject_unknown_account(state: &AppState, plain: String) -> ApiError {
    let decoy = state.decoy_digest.to_string();
    password_matches(state.passwords.clone(), plain, decoy).await;
    ApiError::InvalidCredentials
}

fn customer_principal(customer: Customer) -> Principal {
    Principal::Customer(CustomerPrincipal {
        id: customer.id,
        email: customer.email,
        first_name: customer.first_name,
        last_name: customer.last_name,
    })
}

fn admin_principal(admin: Admin) -> Principal {
    Principal::Admin(AdminPrincipal {
        id: admin.id,
        email: admin.email,
        username: admin.username,
    })
}

fn require_credentials(payload: &LoginRequest) -> Result<(), ApiError> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation("Email and password are required"));
    }
    Ok(())
}

// --- Handlers ---

/// login
///
/// [Public Route] Customer sign-in. Unknown email and wrong password produce the same
/// 401 body so the endpoint cannot be used to probe for accounts.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_credentials(&payload)?;

    let Some(customer) = state.repo.find_customer_by_email(payload.email.trim()).await? else {
        tracing::info!("customer login rejected");
        return Err(reject_unknown_account(&state, payload.password).await);
    };

    let digest = customer.password_hash.clone();
    if !password_matches(state.passwords.clone(), payload.password, digest).await {
        tracing::info!(customer_id = %customer.id, "customer login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!(customer_id = %customer.id, "customer signed in");
    start_session(&state, customer_principal(customer))
}

/// admin_login
///
/// [Public Route] Back-office sign-in. Issues an admin-role session.
#[utoipa::path(
    post,
    path = "/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Signed in; session cookie set", body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    require_credentials(&payload)?;

    let Some(admin) = state.repo.find_admin_by_email(payload.email.trim()).await? else {
        tracing::warn!("admin login rejected");
        return Err(reject_unknown_account(&state, payload.password).await);
    };

    let digest = admin.password_hash.clone();
    if !password_matches(state.passwords.clone(), payload.password, digest).await {
        tracing::warn!(admin_id = %admin.id, "admin login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    tracing::info!(admin_id = %admin.id, "admin signed in");
    start_session(&state, admin_principal(admin))
}

/// register
///
/// [Public Route] Customer self-registration. On success the new customer is signed in
/// immediately.
#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Registered; session cookie set", body = LoginResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if !email.contains('@') || email.len() < 3 {
        return Err(ApiError::Validation("A valid email is required"));
    }
    if payload.password.chars().count() < 8 {
        return Err(ApiError::Validation("Password must be at least 8 characters"));
    }
    if payload.first_name.trim().is_empty() || payload.last_name.trim().is_empty() {
        return Err(ApiError::Validation("First and last name are required"));
    }

    let passwords = state.passwords.clone();
    let plain = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || passwords.hash(&plain))
        .await
        .map_err(|_| ApiError::Internal)?
        .map_err(|err| {
            tracing::error!("{err}");
            ApiError::Internal
        })?;

    let customer = state
        .repo
        .create_customer(NewCustomer {
            email,
            password_hash,
            first_name: payload.first_name.trim().to_string(),
            last_name: payload.last_name.trim().to_string(),
        })
        .await?;

    tracing::info!(customer_id = %customer.id, "customer registered");
    let (headers, body) = start_session(&state, customer_principal(customer))?;
    Ok((StatusCode::CREATED, headers, body))
}

/// logout
///
/// [Public Route] Clears the session cookie. Always succeeds, signed in or not.
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses((status = 200, description = "Session cookie cleared"))
)]
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    cookie::clear(&mut headers, state.cookie_policy());
    (headers, Json(json!({ "success": true })))
}

/// get_me
///
/// [Authenticated Route] Returns the public fields of the resolved principal.
#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Current principal", body = MeResponse),
        (status = 401, description = "Authentication required")
    )
)]
pub async fn get_me(Authenticated(principal): Authenticated) -> Json<MeResponse> {
    Json(MeResponse {
        user: PublicUser::from(&principal),
    })
}

/// get_maintenance
///
/// [Public Route] Reports whether maintenance mode is on. Storage failures read as off.
#[utoipa::path(
    get,
    path = "/maintenance",
    responses((status = 200, description = "Maintenance state", body = MaintenanceStatus))
)]
pub async fn get_maintenance(State(state): State<AppState>) -> Json<MaintenanceStatus> {
    Json(MaintenanceStatus {
        enabled: state.maintenance().is_enabled().await,
    })
}

/// set_maintenance
///
/// [Admin Route] Turns maintenance mode on or off. `AdminOnly` rejects a customer with
/// 403 and an anonymous caller with 401 before the body is read; the gate checks the
/// role again before writing.
#[utoipa::path(
    put,
    path = "/admin/maintenance",
    request_body = MaintenanceUpdate,
    responses(
        (status = 200, description = "Updated", body = MaintenanceStatus),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn set_maintenance(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
    Json(update): Json<MaintenanceUpdate>,
) -> Result<Json<MaintenanceStatus>, ApiError> {
    let acting = Principal::Admin(admin);
    state
        .maintenance()
        .set_enabled(update.enabled, Some(&acting))
        .await?;
    Ok(Json(MaintenanceStatus {
        enabled: update.enabled,
    }))
}

/// account_view
///
/// [Guarded View] Customer account area. Only reached once the route guard has allowed
/// the request, which leaves the principal in the request extensions.
#[utoipa::path(
    get,
    path = "/account",
    responses(
        (status = 200, description = "Account view", body = ViewModel),
        (status = 303, description = "Redirect to login"),
        (status = 503, description = "Maintenance notice")
    )
)]
pub async fn account_view(Extension(principal): Extension<Principal>) -> Json<ViewModel> {
    Json(ViewModel {
        view: "account".to_string(),
        user: PublicUser::from(&principal),
    })
}

/// admin_dashboard_view
///
/// [Guarded View] Back-office landing page.
#[utoipa::path(
    get,
    path = "/admin/dashboard",
    responses(
        (status = 200, description = "Dashboard view", body = ViewModel),
        (status = 303, description = "Redirect to admin login or home"),
        (status = 503, description = "Maintenance notice")
    )
)]
pub async fn admin_dashboard_view(Extension(principal): Extension<Principal>) -> Json<ViewModel> {
    Json(ViewModel {
        view: "admin_dashboard".to_string(),
        user: PublicUser::from(&principal),
    })
}
