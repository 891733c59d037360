//! User repository for database operations.

use crate::entities::user::{NewUserRecord, User, UserRole, UserUpdate};
use crate::types::{errors::UserError, UserResult};
use chrono::Utc;
use sqlx::{Row, SqlitePool};

const USER_COLUMNS: &str =
    "id, name, email, role, password_hash, deleted_at, created_at, updated_at";

/// Repository for user database operations
#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Create a new user repository
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find a live user by ID
    pub async fn find_by_id(&self, id: i64) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = ? AND deleted_at IS NULL"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.map(row_to_user))
    }

    /// Find a live user by email
    pub async fn find_by_email(&self, email: &str) -> UserResult<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ? AND deleted_at IS NULL"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(row.map(row_to_user))
    }

    /// Return which of the candidate emails already belong to live users.
    /// Used by batch validation to probe a whole batch in one query.
    pub async fn existing_emails(&self, candidates: &[String]) -> UserResult<Vec<String>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = candidates.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query_str = format!(
            "SELECT email FROM users WHERE deleted_at IS NULL AND email IN ({})",
            placeholders
        );

        let mut query = sqlx::query_scalar::<_, String>(&query_str);
        for email in candidates {
            query = query.bind(email);
        }

        query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }

    /// Fetch one page of live users ordered by id, optionally filtered by a
    /// case-insensitive substring match on name or email. Returns the page
    /// together with the total number of matching rows.
    pub async fn search_page(
        &self,
        search: Option<&str>,
        page: u32,
        per_page: u32,
    ) -> UserResult<(Vec<User>, i64)> {
        let page = page.max(1);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let (rows, total) = if let Some(term) = search {
            let pattern = format!("%{}%", term);

            let total: i64 = sqlx::query_scalar(
                "SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND (name LIKE ? OR email LIKE ?)",
            )
            .bind(&pattern)
            .bind(&pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

            let rows = sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE deleted_at IS NULL AND (name LIKE ? OR email LIKE ?)
                 ORDER BY id LIMIT ? OFFSET ?"
            ))
            .bind(&pattern)
            .bind(&pattern)
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

            (rows, total)
        } else {
            let total: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| UserError::DatabaseError(e.to_string()))?;

            let rows = sqlx::query(&format!(
                "SELECT {USER_COLUMNS} FROM users
                 WHERE deleted_at IS NULL
                 ORDER BY id LIMIT ? OFFSET ?"
            ))
            .bind(i64::from(per_page))
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

            (rows, total)
        };

        Ok((rows.into_iter().map(row_to_user).collect(), total))
    }

    /// Insert all records inside a single transaction: either every row is
    /// written or none is. A uniqueness race surfaces as `EmailAlreadyExists`
    /// and leaves the table untouched.
    pub async fn insert_many(&self, records: &[NewUserRecord]) -> UserResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        for record in records {
            sqlx::query(
                "INSERT INTO users (name, email, role, password_hash, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(&record.name)
            .bind(&record.email)
            .bind(record.role.as_str())
            .bind(&record.password_hash)
            .bind(&now)
            .bind(&now)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    UserError::EmailAlreadyExists
                } else {
                    UserError::DatabaseError(e.to_string())
                }
            })?;
        }

        tx.commit()
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(records.len() as u64)
    }

    /// Apply the supplied fields to a live user. Builds a dynamic UPDATE over
    /// the provided columns only.
    pub async fn update_fields(&self, id: i64, update: &UserUpdate) -> UserResult<()> {
        if update.is_empty() {
            // Nothing to write, but the caller still expects an existence check.
            return self
                .find_by_id(id)
                .await?
                .map(|_| ())
                .ok_or(UserError::UserNotFound);
        }

        let mut query_parts = Vec::new();
        let mut values = Vec::new();

        if let Some(ref name) = update.name {
            query_parts.push("name = ?");
            values.push(name.clone());
        }

        if let Some(ref email) = update.email {
            query_parts.push("email = ?");
            values.push(email.clone());
        }

        if let Some(ref role) = update.role {
            query_parts.push("role = ?");
            values.push(role.clone());
        }

        if let Some(ref password_hash) = update.password_hash {
            query_parts.push("password_hash = ?");
            values.push(password_hash.clone());
        }

        query_parts.push("updated_at = ?");
        values.push(Utc::now().to_rfc3339());

        let set_clause = query_parts.join(", ");
        let query_str = format!(
            "UPDATE users SET {} WHERE id = ? AND deleted_at IS NULL",
            set_clause
        );

        let mut query = sqlx::query(&query_str);
        for value in values {
            query = query.bind(value);
        }
        query = query.bind(id);

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if e.to_string().contains("UNIQUE constraint failed") {
                    UserError::EmailAlreadyExists
                } else {
                    UserError::DatabaseError(e.to_string())
                }
            })?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Soft delete a user by stamping `deleted_at`
    pub async fn soft_delete(&self, id: i64) -> UserResult<()> {
        let now = Utc::now().to_rfc3339();

        let result = sqlx::query(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(&now)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(UserError::UserNotFound);
        }

        Ok(())
    }

    /// Soft delete every live user among the given ids; ids without a live
    /// row are skipped. Returns how many rows were marked.
    pub async fn soft_delete_many(&self, ids: &[i64]) -> UserResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().to_rfc3339();
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(",");
        let query_str = format!(
            "UPDATE users SET deleted_at = ?, updated_at = ? WHERE deleted_at IS NULL AND id IN ({})",
            placeholders
        );

        let mut query = sqlx::query(&query_str);
        query = query.bind(&now);
        query = query.bind(&now);
        for &id in ids {
            query = query.bind(id);
        }

        let result = query
            .execute(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))?;

        Ok(result.rows_affected())
    }

    /// Count live users
    pub async fn count(&self) -> UserResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted_at IS NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| UserError::DatabaseError(e.to_string()))
    }
}

fn row_to_user(row: sqlx::sqlite::SqliteRow) -> User {
    User {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        role: UserRole::from(row.get::<String, _>("role").as_str()),
        password_hash: row.get("password_hash"),
        deleted_at: row.get("deleted_at"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
