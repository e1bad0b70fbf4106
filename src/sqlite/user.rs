use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

use crate::authz::Role;
use crate::repository::{NewUser, User, UserRepository};
use crate::CrmError;

use super::{db_err, parse_stored};

const COLUMNS: &str = "u.id, u.email, u.name, u.hashed_password, u.role, u.company_id, \
     c.name AS company_name, u.created_at, u.updated_at";

#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    name: String,
    hashed_password: String,
    role: String,
    company_id: Option<i64>,
    company_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = CrmError;

    fn try_from(row: UserRecord) -> Result<Self, Self::Error> {
        let role = parse_stored(Role::from_str(&row.role), "role", &row.role)?;
        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            hashed_password: row.hashed_password,
            role,
            company_id: row.company_id,
            company_name: row.company_name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, CrmError> {
        let row: Option<UserRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users u LEFT JOIN companies c ON c.id = u.company_id WHERE u.id = ?"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_user_by_id", e))?;

        row.map(User::try_from).transpose()
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, CrmError> {
        let row: Option<UserRecord> = sqlx::query_as(&format!(
            "SELECT {COLUMNS} FROM users u LEFT JOIN companies c ON c.id = u.company_id WHERE u.email = ?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("find_user_by_email", e))?;

        row.map(User::try_from).transpose()
    }

    async fn create_user(&self, new: NewUser) -> Result<User, CrmError> {
        let now = Utc::now();
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (email, name, hashed_password, role, company_id, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(&new.email)
        .bind(&new.name)
        .bind(&new.hashed_password)
        .bind(new.role.as_str())
        .bind(new.company_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("create_user", e))?;

        self.find_user_by_id(id)
            .await?
            .ok_or_else(|| CrmError::DatabaseError("created user vanished".to_owned()))
    }
}
