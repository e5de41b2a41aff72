//! SQLite-backed stores

use crate::models::{Category, Company, Contract, User};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use proposal_auth::{
    Credential, CredentialStore, Permission, PermissionStore, Role, Session, SessionStore,
    StoreError, StoreResult,
};
use proposal_core::DatabaseSettings;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::{error, info};
use uuid::Uuid;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS credentials (
        user_id TEXT PRIMARY KEY,
        lookup_key_hash TEXT UNIQUE NOT NULL,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        deleted_at TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY REFERENCES credentials(user_id),
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone TEXT NOT NULL,
        invited_by TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sessions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        created_at INTEGER NOT NULL,
        expires_at INTEGER NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at)",
    r#"
    CREATE TABLE IF NOT EXISTS companies (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS permissions (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        company_id TEXT,
        role TEXT NOT NULL,
        contract_id TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_permissions_user_id ON permissions(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_permissions_company_id ON permissions(company_id)",
    r#"
    CREATE TABLE IF NOT EXISTS contracts (
        id TEXT PRIMARY KEY,
        company_id TEXT NOT NULL REFERENCES companies(id),
        name TEXT NOT NULL,
        created_by TEXT NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id TEXT PRIMARY KEY,
        company_id TEXT NOT NULL REFERENCES companies(id),
        parent_id TEXT REFERENCES categories(id),
        description TEXT NOT NULL,
        kind TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_categories_company_id ON categories(company_id)",
];

#[derive(Debug, sqlx::FromRow)]
struct CredentialRecord {
    user_id: String,
    lookup_key_hash: String,
    password_hash: String,
}

impl CredentialRecord {
    fn into_credential(self) -> StoreResult<Credential> {
        Ok(Credential {
            user_id: parse_uuid(&self.user_id)?,
            lookup_key_hash: self.lookup_key_hash,
            password_hash: self.password_hash,
        })
    }
}

/// Session timestamps are stored as epoch seconds; sessions never carry
/// sub-second precision.
#[derive(Debug, sqlx::FromRow)]
struct SessionRecord {
    id: String,
    user_id: String,
    created_at: i64,
    expires_at: i64,
}

impl SessionRecord {
    fn into_session(self) -> StoreResult<Session> {
        Ok(Session {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            created_at: from_epoch(self.created_at)?,
            expires_at: from_epoch(self.expires_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PermissionRecord {
    id: String,
    user_id: String,
    company_id: Option<String>,
    role: String,
    contract_id: Option<String>,
}

impl PermissionRecord {
    fn into_permission(self) -> StoreResult<Permission> {
        Ok(Permission {
            id: parse_uuid(&self.id)?,
            user_id: parse_uuid(&self.user_id)?,
            company_id: self.company_id.as_deref().map(parse_uuid).transpose()?,
            role: self
                .role
                .parse::<Role>()
                .map_err(|e| StoreError::Corrupt(e.to_string()))?,
            contract_id: self.contract_id.as_deref().map(parse_uuid).transpose()?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CompanyRecord {
    id: String,
    name: String,
    created_by: String,
    created_at: String,
    updated_at: String,
}

impl CompanyRecord {
    fn into_company(self) -> StoreResult<Company> {
        Ok(Company {
            id: parse_uuid(&self.id)?,
            name: self.name,
            created_by: parse_uuid(&self.created_by)?,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: String,
    first_name: String,
    last_name: String,
    phone: String,
    invited_by: Option<String>,
    created_at: String,
    updated_at: String,
}

impl UserRecord {
    fn into_user(self) -> StoreResult<User> {
        Ok(User {
            id: parse_uuid(&self.id)?,
            first_name: self.first_name,
            last_name: self.last_name,
            phone: self.phone,
            invited_by: self.invited_by.as_deref().map(parse_uuid).transpose()?,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CategoryRecord {
    id: String,
    company_id: String,
    parent_id: Option<String>,
    description: String,
    kind: String,
    created_at: String,
    updated_at: String,
}

impl CategoryRecord {
    fn into_category(self) -> StoreResult<Category> {
        Ok(Category {
            id: parse_uuid(&self.id)?,
            company_id: parse_uuid(&self.company_id)?,
            parent_id: self.parent_id.as_deref().map(parse_uuid).transpose()?,
            description: self.description,
            kind: self.kind,
            created_at: parse_time(&self.created_at)?,
            updated_at: parse_time(&self.updated_at)?,
        })
    }
}

fn parse_uuid(raw: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| StoreError::Corrupt(format!("bad id '{raw}': {e}")))
}

fn parse_time(raw: &str) -> StoreResult<DateTime<Utc>> {
    raw.parse()
        .map_err(|e| StoreError::Corrupt(format!("bad timestamp '{raw}': {e}")))
}

fn from_epoch(seconds: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {seconds}")))
}

fn store_error(err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(db.message().to_string())
        }
        sqlx::Error::RowNotFound => StoreError::NotFound(err.to_string()),
        _ => {
            error!(error = %err, "Database error");
            StoreError::Unavailable(err.to_string())
        }
    }
}

/// All stores over one SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and create the schema.
    ///
    /// In-memory databases get a single connection that is never recycled,
    /// since each connection would otherwise see its own empty database.
    pub async fn connect(settings: &DatabaseSettings) -> StoreResult<Self> {
        let in_memory = settings.url.contains(":memory:");
        let max_connections = if in_memory { 1 } else { settings.max_connections };

        let mut options = SqlitePoolOptions::new().max_connections(max_connections);
        if in_memory {
            options = options.idle_timeout(None).max_lifetime(None);
        }

        let pool = options
            .connect(&settings.url)
            .await
            .map_err(store_error)?;

        let store = Self { pool };
        store.create_tables().await?;

        info!(url = %settings.url, max_connections, "Database ready");
        Ok(store)
    }

    async fn create_tables(&self) -> StoreResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement)
                .execute(&self.pool)
                .await
                .map_err(store_error)?;
        }
        Ok(())
    }

    pub async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    /// Insert a company and grant its creator the owning permission, atomically
    pub async fn create_company(&self, company: &Company, owner: &Permission) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        sqlx::query(
            "INSERT INTO companies (id, name, created_by, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(company.id.to_string())
        .bind(&company.name)
        .bind(company.created_by.to_string())
        .bind(company.created_at.to_rfc3339())
        .bind(company.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        insert_permission_query(owner)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)
    }

    pub async fn find_company(&self, company_id: Uuid) -> StoreResult<Option<Company>> {
        let record = sqlx::query_as::<_, CompanyRecord>(
            "SELECT id, name, created_by, created_at, updated_at FROM companies WHERE id = ?",
        )
        .bind(company_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(CompanyRecord::into_company).transpose()
    }

    /// Rename a company, returning the updated record if it exists
    pub async fn rename_company(&self, company_id: Uuid, name: &str) -> StoreResult<Option<Company>> {
        let result = sqlx::query("UPDATE companies SET name = ?, updated_at = ? WHERE id = ?")
            .bind(name)
            .bind(Utc::now().to_rfc3339())
            .bind(company_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_company(company_id).await
    }

    pub async fn insert_contract(&self, contract: &Contract) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO contracts (id, company_id, name, created_by, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(contract.id.to_string())
        .bind(contract.company_id.to_string())
        .bind(&contract.name)
        .bind(contract.created_by.to_string())
        .bind(contract.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    /// Delete a company with its grants, contracts and categories.
    ///
    /// Returns `false` when the company does not exist.
    pub async fn delete_company(&self, company_id: Uuid) -> StoreResult<bool> {
        let id = company_id.to_string();
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        for statement in [
            "DELETE FROM permissions WHERE company_id = ?",
            "DELETE FROM contracts WHERE company_id = ?",
            "DELETE FROM categories WHERE company_id = ?",
        ] {
            sqlx::query(statement)
                .bind(&id)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }

        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(&id)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            tx.rollback().await.map_err(store_error)?;
            return Ok(false);
        }
        tx.commit().await.map_err(store_error)?;
        Ok(true)
    }

    /// Store a new account's credential, profile and initial grants together
    pub async fn create_user(
        &self,
        user: &User,
        credential: &Credential,
        grants: &[Permission],
    ) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        insert_credential_query(credential)
            .execute(&mut *tx)
            .await
            .map_err(store_error)?;

        sqlx::query(&format!(
            "INSERT INTO users ({USER_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(user.id.to_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.phone)
        .bind(user.invited_by.map(|id| id.to_string()))
        .bind(user.created_at.to_rfc3339())
        .bind(user.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(store_error)?;

        for grant in grants {
            insert_permission_query(grant)
                .execute(&mut *tx)
                .await
                .map_err(store_error)?;
        }

        tx.commit().await.map_err(store_error)
    }

    /// Active users only; a deactivated credential hides its profile
    pub async fn find_user(&self, user_id: Uuid) -> StoreResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {ACTIVE_USER_COLUMNS} FROM users u \
             JOIN credentials c ON c.user_id = u.id \
             WHERE u.id = ? AND c.deleted_at IS NULL"
        ))
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(UserRecord::into_user).transpose()
    }

    pub async fn list_users(&self) -> StoreResult<Vec<User>> {
        let records = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {ACTIVE_USER_COLUMNS} FROM users u \
             JOIN credentials c ON c.user_id = u.id \
             WHERE c.deleted_at IS NULL ORDER BY u.created_at"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        records.into_iter().map(UserRecord::into_user).collect()
    }

    pub async fn insert_category(&self, category: &Category) -> StoreResult<()> {
        sqlx::query(&format!(
            "INSERT INTO categories ({CATEGORY_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(category.id.to_string())
        .bind(category.company_id.to_string())
        .bind(category.parent_id.map(|id| id.to_string()))
        .bind(&category.description)
        .bind(&category.kind)
        .bind(category.created_at.to_rfc3339())
        .bind(category.updated_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;
        Ok(())
    }

    /// A category of another company is treated as absent
    pub async fn find_category(
        &self,
        company_id: Uuid,
        category_id: Uuid,
    ) -> StoreResult<Option<Category>> {
        let record = sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE company_id = ? AND id = ?"
        ))
        .bind(company_id.to_string())
        .bind(category_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(CategoryRecord::into_category).transpose()
    }

    pub async fn list_categories(&self, company_id: Uuid) -> StoreResult<Vec<Category>> {
        let records = sqlx::query_as::<_, CategoryRecord>(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories WHERE company_id = ? ORDER BY created_at"
        ))
        .bind(company_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        records.into_iter().map(CategoryRecord::into_category).collect()
    }

    pub async fn update_category(
        &self,
        company_id: Uuid,
        category_id: Uuid,
        description: &str,
    ) -> StoreResult<Option<Category>> {
        let result = sqlx::query(
            "UPDATE categories SET description = ?, updated_at = ? WHERE company_id = ? AND id = ?",
        )
        .bind(description)
        .bind(Utc::now().to_rfc3339())
        .bind(company_id.to_string())
        .bind(category_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_category(company_id, category_id).await
    }

    /// Delete a category and its sub-categories. Returns `false` when it
    /// does not exist in the company.
    pub async fn delete_category(&self, company_id: Uuid, category_id: Uuid) -> StoreResult<bool> {
        let id = category_id.to_string();
        let result = sqlx::query(
            "DELETE FROM categories WHERE company_id = ? AND (id = ? OR parent_id = ?)",
        )
        .bind(company_id.to_string())
        .bind(&id)
        .bind(&id)
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        Ok(result.rows_affected() > 0)
    }
}

const USER_COLUMNS: &str = "id, first_name, last_name, phone, invited_by, created_at, updated_at";
const ACTIVE_USER_COLUMNS: &str =
    "u.id, u.first_name, u.last_name, u.phone, u.invited_by, u.created_at, u.updated_at";
const CATEGORY_COLUMNS: &str =
    "id, company_id, parent_id, description, kind, created_at, updated_at";

fn insert_credential_query(
    credential: &Credential,
) -> sqlx::query::Query<'static, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'static>> {
    let now = Utc::now().to_rfc3339();
    sqlx::query(
        "INSERT INTO credentials (user_id, lookup_key_hash, password_hash, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(credential.user_id.to_string())
    .bind(credential.lookup_key_hash.clone())
    .bind(credential.password_hash.clone())
    .bind(now.clone())
    .bind(now)
}

fn insert_permission_query(
    permission: &Permission,
) -> sqlx::query::Query<'static, sqlx::Sqlite, sqlx::sqlite::SqliteArguments<'static>> {
    sqlx::query(
        "INSERT INTO permissions (id, user_id, company_id, role, contract_id) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(permission.id.to_string())
    .bind(permission.user_id.to_string())
    .bind(permission.company_id.map(|id| id.to_string()))
    .bind(permission.role.as_str())
    .bind(permission.contract_id.map(|id| id.to_string()))
}

#[async_trait]
impl CredentialStore for SqliteStore {
    async fn find_by_lookup_key(&self, lookup_key_hash: &str) -> StoreResult<Option<Credential>> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT user_id, lookup_key_hash, password_hash FROM credentials WHERE lookup_key_hash = ? AND deleted_at IS NULL",
        )
        .bind(lookup_key_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(CredentialRecord::into_credential).transpose()
    }

    async fn find_by_user_id(&self, user_id: Uuid) -> StoreResult<Option<Credential>> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            "SELECT user_id, lookup_key_hash, password_hash FROM credentials WHERE user_id = ? AND deleted_at IS NULL",
        )
        .bind(user_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(CredentialRecord::into_credential).transpose()
    }

    async fn insert_credential(&self, credential: &Credential) -> StoreResult<()> {
        insert_credential_query(credential)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_password_hash(&self, user_id: Uuid, password_hash: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE credentials SET password_hash = ?, updated_at = ? \
             WHERE user_id = ? AND deleted_at IS NULL",
        )
        .bind(password_hash)
        .bind(Utc::now().to_rfc3339())
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("credential for user {user_id}")));
        }
        Ok(())
    }

    /// Soft delete: the row stays so its lookup key remains reserved
    async fn deactivate_credential(&self, user_id: Uuid) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE credentials SET deleted_at = ?, updated_at = ? \
             WHERE user_id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(user_id.to_string())
        .execute(&self.pool)
        .await
        .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("credential for user {user_id}")));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn insert_session(&self, session: &Session) -> StoreResult<()> {
        sqlx::query("INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(session.id.to_string())
            .bind(session.user_id.to_string())
            .bind(session.created_at.timestamp())
            .bind(session.expires_at.timestamp())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn find_session(&self, session_id: Uuid) -> StoreResult<Option<Session>> {
        let record = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?",
        )
        .bind(session_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(SessionRecord::into_session).transpose()
    }

    async fn delete_session(&self, session_id: Uuid) -> StoreResult<()> {
        sqlx::query("DELETE FROM sessions WHERE id = ?")
            .bind(session_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn delete_sessions_for_user(&self, user_id: Uuid) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(result.rows_affected())
    }
}

const PERMISSION_COLUMNS: &str = "id, user_id, company_id, role, contract_id";

#[async_trait]
impl PermissionStore for SqliteStore {
    async fn permissions_for_user(&self, user_id: Uuid) -> StoreResult<Vec<Permission>> {
        let records = sqlx::query_as::<_, PermissionRecord>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE user_id = ?"
        ))
        .bind(user_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        records.into_iter().map(PermissionRecord::into_permission).collect()
    }

    async fn permissions_for_company(&self, company_id: Uuid) -> StoreResult<Vec<Permission>> {
        let records = sqlx::query_as::<_, PermissionRecord>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE company_id = ?"
        ))
        .bind(company_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(store_error)?;

        records.into_iter().map(PermissionRecord::into_permission).collect()
    }

    async fn find_permission(&self, permission_id: Uuid) -> StoreResult<Option<Permission>> {
        let record = sqlx::query_as::<_, PermissionRecord>(&format!(
            "SELECT {PERMISSION_COLUMNS} FROM permissions WHERE id = ?"
        ))
        .bind(permission_id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(store_error)?;

        record.map(PermissionRecord::into_permission).transpose()
    }

    async fn insert_permission(&self, permission: &Permission) -> StoreResult<()> {
        insert_permission_query(permission)
            .execute(&self.pool)
            .await
            .map_err(store_error)?;
        Ok(())
    }

    async fn update_permission(
        &self,
        permission_id: Uuid,
        role: Role,
        contract_id: Option<Uuid>,
    ) -> StoreResult<Permission> {
        let result = sqlx::query("UPDATE permissions SET role = ?, contract_id = ? WHERE id = ?")
            .bind(role.as_str())
            .bind(contract_id.map(|id| id.to_string()))
            .bind(permission_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("permission {permission_id}")));
        }

        self.find_permission(permission_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("permission {permission_id}")))
    }

    async fn delete_permission(&self, permission_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM permissions WHERE id = ?")
            .bind(permission_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(store_error)?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("permission {permission_id}")));
        }
        Ok(())
    }
}
