//! Session authentication core.
//!
//! A request's identity flows through four layers, leaf first:
//! `cookie` pulls the raw token out of the `Cookie` header, `token` verifies it,
//! `principal` turns the verified claims into a typed [`Principal`], and `policy`
//! decides whether that principal may use a given surface.

pub mod cookie;
pub mod policy;
pub mod principal;
pub mod token;

pub use cookie::{CookiePolicy, SESSION_COOKIE_NAME};
pub use policy::{AuthError, Capability, authorize, require_admin, require_authenticated};
pub use principal::{
    AdminOnly, AdminPrincipal, Authenticated, CustomerPrincipal, MaybePrincipal, Principal, resolve,
};
pub use token::{Claims, Clock, FixedClock, SystemClock, TokenCodec, TokenCodecState, TokenError};
