use crate::models::{Admin, Customer, NewCustomer};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// StorageError
///
/// Failures of the durable store. Messages stay internal; handlers map them to
/// generic responses.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("unique constraint violated")]
    Conflict,
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => StorageError::Conflict,
            _ => StorageError::Unavailable(err.to_string()),
        }
    }
}

/// Repository Trait
///
/// The persistence contract consumed by the auth core: account lookups for login and
/// the key/value settings used by the maintenance flag.
///
/// **Send + Sync + async_trait** are required so `Arc<dyn Repository>` can be shared
/// across Axum's asynchronous task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Customers ---
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError>;
    async fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, StorageError>;
    // Fails with `StorageError::Conflict` when the email is already registered.
    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StorageError>;

    // --- Admins ---
    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StorageError>;
    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>, StorageError>;

    // --- Site Settings (key/value) ---
    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError>;
    // Single atomic upsert keyed by `key`; concurrent writers converge last-write-wins.
    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// The production implementation of `Repository`, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Creates a new repository instance using the initialized connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    /// Emails are matched case-insensitively; they are stored lowercased.
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, created_at
            FROM customers
            WHERE email = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, StorageError> {
        let customer = sqlx::query_as::<_, Customer>(
            r#"
            SELECT id, email, password_hash, first_name, last_name, created_at
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StorageError> {
        let created = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (id, email, password_hash, first_name, last_name)
            VALUES ($1, lower($2), $3, $4, $5)
            RETURNING id, email, password_hash, first_name, last_name, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StorageError> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM admins
            WHERE email = lower($1)
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>, StorageError> {
        let admin = sqlx::query_as::<_, Admin>(
            r#"
            SELECT id, email, username, password_hash, created_at
            FROM admins
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(admin)
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        let value: Option<String> =
            sqlx::query_scalar("SELECT value FROM site_settings WHERE key = $1")
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;
        Ok(value)
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO site_settings (key, value, updated_at)
            VALUES ($1, $2, now())
            ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = now()
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

// --- In-Memory Implementation ---

/// MemoryRepository
///
/// A process-local `Repository` used by the test suites. Setting reads and writes can
/// be made to fail to simulate a storage outage.
#[derive(Default)]
pub struct MemoryRepository {
    customers: RwLock<HashMap<Uuid, Customer>>,
    admins: RwLock<HashMap<Uuid, Admin>>,
    settings: RwLock<HashMap<String, String>>,
    settings_down: AtomicBool,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// When `down` is true every settings read and write fails with `Unavailable`.
    pub fn set_settings_unavailable(&self, down: bool) {
        self.settings_down.store(down, Ordering::SeqCst);
    }

    /// Inserts an administrator record directly; admins have no self-service signup.
    pub async fn insert_admin(&self, email: &str, username: &str, password_hash: &str) -> Admin {
        let admin = Admin {
            id: Uuid::new_v4(),
            email: email.to_lowercase(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: Utc::now(),
        };
        self.admins.write().await.insert(admin.id, admin.clone());
        admin
    }

    fn check_settings(&self) -> Result<(), StorageError> {
        if self.settings_down.load(Ordering::SeqCst) {
            return Err(StorageError::Unavailable("settings store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn find_customer_by_email(&self, email: &str) -> Result<Option<Customer>, StorageError> {
        let email = email.to_lowercase();
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn find_customer_by_id(&self, id: Uuid) -> Result<Option<Customer>, StorageError> {
        Ok(self.customers.read().await.get(&id).cloned())
    }

    async fn create_customer(&self, customer: NewCustomer) -> Result<Customer, StorageError> {
        let email = customer.email.to_lowercase();
        let mut customers = self.customers.write().await;
        if customers.values().any(|c| c.email == email) {
            return Err(StorageError::Conflict);
        }
        let created = Customer {
            id: Uuid::new_v4(),
            email,
            password_hash: customer.password_hash,
            first_name: customer.first_name,
            last_name: customer.last_name,
            created_at: Utc::now(),
        };
        customers.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_admin_by_email(&self, email: &str) -> Result<Option<Admin>, StorageError> {
        let email = email.to_lowercase();
        Ok(self
            .admins
            .read()
            .await
            .values()
            .find(|a| a.email == email)
            .cloned())
    }

    async fn find_admin_by_id(&self, id: Uuid) -> Result<Option<Admin>, StorageError> {
        Ok(self.admins.read().await.get(&id).cloned())
    }

    async fn get_setting(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check_settings()?;
        Ok(self.settings.read().await.get(key).cloned())
    }

    async fn upsert_setting(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check_settings()?;
        self.settings
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
