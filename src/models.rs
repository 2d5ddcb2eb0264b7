use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Principal;

// --- Account Records (Mapped to Database) ---

/// Customer
///
/// A customer account from the `customers` table. The password digest is loaded for
/// credential checks only and is never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

/// Admin
///
/// A back-office account from the `admins` table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Admin {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// NewCustomer
///
/// Insert payload for a customer; the password has already been hashed.
#[derive(Debug, Clone)]
pub struct NewCustomer {
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
}

// --- Request Payloads (Input Schemas) ---

/// LoginRequest
///
/// Credentials for both the customer (`POST /auth/login`) and admin
/// (`POST /admin/login`) login endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginRequest {
    #[schema(example = "driver@example.com")]
    pub email: String,
    pub password: String,
}

/// RegisterRequest
///
/// Input payload for customer self-registration (`POST /auth/register`).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
}

/// MaintenanceUpdate
///
/// Body of the admin-only maintenance toggle (`PUT /admin/maintenance`).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MaintenanceUpdate {
    pub enabled: bool,
}

// --- Output Schemas ---

/// Role
///
/// The wire form of a principal's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    User,
    Admin,
}

/// PublicUser
///
/// The public fields of a principal. Customers carry names, admins a username;
/// absent fields are omitted from the JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    pub role: Role,
}

impl From<&Principal> for PublicUser {
    fn from(principal: &Principal) -> Self {
        match principal {
            Principal::Customer(c) => PublicUser {
                id: c.id,
                email: c.email.clone(),
                first_name: Some(c.first_name.clone()),
                last_name: Some(c.last_name.clone()),
                username: None,
                role: Role::User,
            },
            Principal::Admin(a) => PublicUser {
                id: a.id,
                email: a.email.clone(),
                first_name: None,
                last_name: None,
                username: Some(a.username.clone()),
                role: Role::Admin,
            },
        }
    }
}

/// LoginResponse
///
/// Returned by successful login and registration. The session token itself travels
/// only in the `Set-Cookie` header.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct LoginResponse {
    pub success: bool,
    pub user: PublicUser,
}

/// MeResponse
///
/// Output of `GET /auth/me`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MeResponse {
    pub user: PublicUser,
}

/// MaintenanceStatus
///
/// Output of the public maintenance read and of the admin toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MaintenanceStatus {
    pub enabled: bool,
}

/// ViewModel
///
/// Minimal payload returned by guarded views once the route guard allows them.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct ViewModel {
    pub view: String,
    pub user: PublicUser,
}
