mod common;

use common::{admin, customer, test_state};
use rental_portal::{
    auth::{AuthError, Capability, authorize, require_admin, require_authenticated},
    maintenance::{MAINTENANCE_KEY, MaintenanceError},
    repository::Repository,
};

// --- Authorization Policy ---

#[test]
fn test_require_authenticated() {
    assert!(!require_authenticated(None));
    assert!(require_authenticated(Some(&customer())));
    assert!(require_authenticated(Some(&admin())));
}

#[test]
fn test_require_admin() {
    assert!(!require_admin(None));
    assert!(!require_admin(Some(&customer())));
    assert!(require_admin(Some(&admin())));
}

#[test]
fn test_authorize_maps_denials_to_distinct_outcomes() {
    assert_eq!(
        authorize(None, Capability::Authenticated),
        Err(AuthError::AuthenticationRequired)
    );
    assert_eq!(
        authorize(None, Capability::Admin),
        Err(AuthError::AuthenticationRequired)
    );
    assert_eq!(
        authorize(Some(&customer()), Capability::Admin),
        Err(AuthError::AuthorizationDenied)
    );
    assert_eq!(authorize(Some(&customer()), Capability::Authenticated), Ok(()));
    assert_eq!(authorize(Some(&admin()), Capability::Admin), Ok(()));
}

#[test]
fn test_auth_errors_are_generic() {
    assert_eq!(AuthError::AuthenticationRequired.status().as_u16(), 401);
    assert_eq!(AuthError::AuthorizationDenied.status().as_u16(), 403);
    assert_eq!(AuthError::AuthenticationRequired.to_string(), "Authentication required");
    assert_eq!(AuthError::AuthorizationDenied.to_string(), "Access denied");
}

// --- Maintenance Gate ---

#[tokio::test]
async fn test_maintenance_defaults_to_disabled() {
    let (state, _) = test_state();

    assert!(!state.maintenance().is_enabled().await);
}

#[tokio::test]
async fn test_admin_can_toggle_maintenance() {
    let (state, repo) = test_state();
    let gate = state.maintenance();

    gate.set_enabled(true, Some(&admin())).await.unwrap();
    assert!(gate.is_enabled().await);
    assert_eq!(
        repo.get_setting(MAINTENANCE_KEY).await.unwrap().as_deref(),
        Some("true")
    );

    gate.set_enabled(false, Some(&admin())).await.unwrap();
    assert!(!gate.is_enabled().await);
}

#[tokio::test]
async fn test_non_admin_cannot_toggle_maintenance() {
    let (state, _) = test_state();
    let gate = state.maintenance();

    let by_customer = gate.set_enabled(true, Some(&customer())).await;
    assert!(matches!(
        by_customer,
        Err(MaintenanceError::Denied(AuthError::AuthorizationDenied))
    ));

    let anonymous = gate.set_enabled(true, None).await;
    assert!(matches!(
        anonymous,
        Err(MaintenanceError::Denied(AuthError::AuthenticationRequired))
    ));

    assert!(!gate.is_enabled().await);
}

#[tokio::test]
async fn test_unreadable_flag_fails_open() {
    let (state, repo) = test_state();
    let gate = state.maintenance();
    gate.set_enabled(true, Some(&admin())).await.unwrap();

    repo.set_settings_unavailable(true);

    assert!(!gate.is_enabled().await);
}

#[tokio::test]
async fn test_unwritable_flag_propagates() {
    let (state, repo) = test_state();
    repo.set_settings_unavailable(true);

    let result = state.maintenance().set_enabled(true, Some(&admin())).await;

    assert!(matches!(result, Err(MaintenanceError::Storage(_))));
}

#[tokio::test]
async fn test_unrecognized_flag_value_reads_as_disabled() {
    let (state, repo) = test_state();
    repo.upsert_setting(MAINTENANCE_KEY, "yes please").await.unwrap();

    assert!(!state.maintenance().is_enabled().await);
}
