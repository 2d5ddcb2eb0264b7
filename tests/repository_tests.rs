use rental_portal::{
    MemoryRepository,
    models::NewCustomer,
    repository::{Repository, StorageError},
};
use uuid::Uuid;

// --- Test Data Helpers ---

fn new_customer(email: &str) -> NewCustomer {
    NewCustomer {
        email: email.to_string(),
        password_hash: "digest".to_string(),
        first_name: "Jo".to_string(),
        last_name: "Lind".to_string(),
    }
}

// --- Customers ---

#[tokio::test]
async fn test_create_and_find_customer() {
    let repo = MemoryRepository::new();

    let created = repo
        .create_customer(new_customer("Jo.Lind@Example.com"))
        .await
        .unwrap();

    assert_eq!(created.email, "jo.lind@example.com");
    let by_email = repo
        .find_customer_by_email("JO.LIND@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(by_email.id, created.id);
    let by_id = repo.find_customer_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, created.email);
}

#[tokio::test]
async fn test_duplicate_customer_email_conflicts() {
    let repo = MemoryRepository::new();
    repo.create_customer(new_customer("jo@example.com"))
        .await
        .unwrap();

    let result = repo.create_customer(new_customer("JO@example.com")).await;

    assert!(matches!(result, Err(StorageError::Conflict)));
}

#[tokio::test]
async fn test_missing_accounts_are_none() {
    let repo = MemoryRepository::new();

    assert!(repo.find_customer_by_email("x@y.z").await.unwrap().is_none());
    assert!(repo.find_customer_by_id(Uuid::new_v4()).await.unwrap().is_none());
    assert!(repo.find_admin_by_email("x@y.z").await.unwrap().is_none());
    assert!(repo.find_admin_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

// --- Admins ---

#[tokio::test]
async fn test_admins_are_separate_from_customers() {
    let repo = MemoryRepository::new();
    let admin = repo.insert_admin("Ops@Example.com", "ops", "digest").await;

    let found = repo
        .find_admin_by_email("ops@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, admin.id);
    assert_eq!(found.username, "ops");
    assert!(repo.find_admin_by_id(admin.id).await.unwrap().is_some());
    assert!(
        repo.find_customer_by_email("ops@example.com")
            .await
            .unwrap()
            .is_none()
    );
}

// --- Site Settings ---

#[tokio::test]
async fn test_upsert_setting_last_write_wins() {
    let repo = MemoryRepository::new();

    assert_eq!(repo.get_setting("maintenance_mode").await.unwrap(), None);
    repo.upsert_setting("maintenance_mode", "true").await.unwrap();
    repo.upsert_setting("maintenance_mode", "false").await.unwrap();

    assert_eq!(
        repo.get_setting("maintenance_mode").await.unwrap().as_deref(),
        Some("false")
    );
}

#[tokio::test]
async fn test_settings_outage_affects_reads_and_writes() {
    let repo = MemoryRepository::new();
    repo.upsert_setting("maintenance_mode", "true").await.unwrap();

    repo.set_settings_unavailable(true);
    assert!(matches!(
        repo.get_setting("maintenance_mode").await,
        Err(StorageError::Unavailable(_))
    ));
    assert!(matches!(
        repo.upsert_setting("maintenance_mode", "false").await,
        Err(StorageError::Unavailable(_))
    ));

    repo.set_settings_unavailable(false);
    assert_eq!(
        repo.get_setting("maintenance_mode").await.unwrap().as_deref(),
        Some("true")
    );
}
