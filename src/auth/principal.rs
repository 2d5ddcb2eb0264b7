use axum::{
    extract::{FromRef, FromRequestParts},
    http::{HeaderMap, request::Parts},
};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use uuid::Uuid;

use super::{
    cookie,
    policy::{self, AuthError, Capability},
    token::{TokenCodec, TokenCodecState, TokenError},
};

/// A signed-in customer of the rental site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerPrincipal {
    pub id: Uuid,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// A signed-in back-office administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminPrincipal {
    pub id: Uuid,
    pub email: String,
    pub username: String,
}

/// Principal
///
/// The identity carried by a session token. The serialized form is tagged by `role`
/// (`"user"` or `"admin"`), so a token minted for one variant can only ever decode
/// back into that same variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role")]
pub enum Principal {
    #[serde(rename = "user")]
    Customer(CustomerPrincipal),
    #[serde(rename = "admin")]
    Admin(AdminPrincipal),
}

impl Principal {
    pub fn id(&self) -> Uuid {
        match self {
            Principal::Customer(c) => c.id,
            Principal::Admin(a) => a.id,
        }
    }

    pub fn email(&self) -> &str {
        match self {
            Principal::Customer(c) => &c.email,
            Principal::Admin(a) => &a.email,
        }
    }

    /// The wire value of the `role` discriminant.
    pub fn role(&self) -> &'static str {
        match self {
            Principal::Customer(_) => "user",
            Principal::Admin(_) => "admin",
        }
    }

    pub fn is_admin(&self) -> bool {
        matches!(self, Principal::Admin(_))
    }

    pub(crate) fn ensure_complete(&self) -> Result<(), TokenError> {
        if self.id().is_nil() {
            return Err(TokenError::Encoding("missing id"));
        }
        if self.email().trim().is_empty() {
            return Err(TokenError::Encoding("missing email"));
        }
        if let Principal::Admin(admin) = self {
            if admin.username.trim().is_empty() {
                return Err(TokenError::Encoding("missing username"));
            }
        }
        Ok(())
    }
}

/// resolve
///
/// Turns the incoming request headers into the authenticated principal, if any.
/// A missing cookie and a bad token (malformed, forged, expired) all yield `None`;
/// the reason is only ever written to the debug log.
pub fn resolve(headers: &HeaderMap, codec: &TokenCodec) -> Option<Principal> {
    let token = cookie::extract(headers)?;
    match codec.verify(&token) {
        Ok(claims) => Some(claims.principal),
        Err(reason) => {
            tracing::debug!(%reason, "discarding session cookie");
            None
        }
    }
}

/// MaybePrincipal
///
/// Extractor for surfaces that behave differently for signed-in users but are open to
/// everyone. Never rejects.
#[derive(Debug, Clone)]
pub struct MaybePrincipal(pub Option<Principal>);

impl<S> FromRequestParts<S> for MaybePrincipal
where
    S: Send + Sync,
    TokenCodecState: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let codec = TokenCodecState::from_ref(state);
        Ok(MaybePrincipal(resolve(&parts.headers, &codec)))
    }
}

/// Authenticated
///
/// Extractor requiring any valid session, customer or admin. Rejects with 401.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Principal);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
    TokenCodecState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybePrincipal(principal) = MaybePrincipal::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        policy::authorize(principal.as_ref(), Capability::Authenticated)?;
        principal
            .map(Authenticated)
            .ok_or(AuthError::AuthenticationRequired)
    }
}

/// AdminOnly
///
/// Extractor requiring an administrator session. Rejects with 401 when there is no
/// session and 403 when the session belongs to a customer.
#[derive(Debug, Clone)]
pub struct AdminOnly(pub AdminPrincipal);

impl<S> FromRequestParts<S> for AdminOnly
where
    S: Send + Sync,
    TokenCodecState: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let MaybePrincipal(principal) = MaybePrincipal::from_request_parts(parts, state)
            .await
            .unwrap_or_else(|never| match never {});
        policy::authorize(principal.as_ref(), Capability::Admin)?;
        match principal {
            Some(Principal::Admin(admin)) => Ok(AdminOnly(admin)),
            Some(Principal::Customer(_)) => Err(AuthError::AuthorizationDenied),
            None => Err(AuthError::AuthenticationRequired),
        }
    }
}
