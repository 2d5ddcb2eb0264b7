mod common;

use chrono::Utc;
use common::{admin, customer};
use rental_portal::models::{
    Admin, Customer, LoginRequest, MaintenanceUpdate, PublicUser, RegisterRequest, Role,
};
use uuid::Uuid;

// --- Account Records ---

#[test]
fn test_customer_password_hash_is_never_serialized() {
    let record = Customer {
        id: Uuid::new_v4(),
        email: "driver@example.com".to_string(),
        password_hash: "$argon2id$v=19$secret".to_string(),
        first_name: "Dana".to_string(),
        last_name: "Reyes".to_string(),
        created_at: Utc::now(),
    };

    let json = serde_json::to_string(&record).unwrap();

    assert!(!json.contains("password_hash"));
    assert!(!json.contains("argon2"));
    assert!(json.contains("driver@example.com"));
}

#[test]
fn test_admin_password_hash_is_never_serialized() {
    let record = Admin {
        id: Uuid::new_v4(),
        email: "ops@example.com".to_string(),
        username: "ops".to_string(),
        password_hash: "$argon2id$v=19$secret".to_string(),
        created_at: Utc::now(),
    };

    let value = serde_json::to_value(&record).unwrap();

    assert!(value.get("password_hash").is_none());
    assert_eq!(value["username"], "ops");
}

// --- Public User Projection ---

#[test]
fn test_public_user_for_customer() {
    let value = serde_json::to_value(PublicUser::from(&customer())).unwrap();

    assert_eq!(value["role"], "user");
    assert_eq!(value["first_name"], "Dana");
    assert_eq!(value["last_name"], "Reyes");
    // Admin-only fields are omitted rather than null.
    assert!(value.get("username").is_none());
}

#[test]
fn test_public_user_for_admin() {
    let user = PublicUser::from(&admin());
    assert_eq!(user.role, Role::Admin);

    let value = serde_json::to_value(user).unwrap();
    assert_eq!(value["role"], "admin");
    assert_eq!(value["username"], "ops");
    assert!(value.get("first_name").is_none());
    assert!(value.get("last_name").is_none());
}

// --- Request Payloads ---

#[test]
fn test_request_payloads_deserialize() {
    let login: LoginRequest =
        serde_json::from_str(r#"{"email":"a@b.co","password":"pw"}"#).unwrap();
    assert_eq!(login.email, "a@b.co");

    let register: RegisterRequest = serde_json::from_str(
        r#"{"email":"a@b.co","password":"pw123456","first_name":"A","last_name":"B"}"#,
    )
    .unwrap();
    assert_eq!(register.last_name, "B");

    let update: MaintenanceUpdate = serde_json::from_str(r#"{"enabled":true}"#).unwrap();
    assert!(update.enabled);
}

#[test]
fn test_maintenance_update_rejects_non_boolean() {
    let result = serde_json::from_str::<MaintenanceUpdate>(r#"{"enabled":"true"}"#);

    assert!(result.is_err());
}
