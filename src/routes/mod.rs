/// Router Module Index
///
/// Routes are grouped by the access they require, and access control is attached to
/// each group as a whole so no endpoint is exposed by accident.

/// Routes open to every caller: sign-in, sign-out, registration and the maintenance read.
pub mod public;

/// Routes behind the `auth_middleware` layer. Require a valid session of either role.
pub mod authenticated;

/// Routes nested under `/admin`. Admin-only; the check happens below the handler.
pub mod admin;

/// Guarded views. Each group sits behind a route-guard middleware.
pub mod views;
