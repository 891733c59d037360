//! User service for managing user operations.

use std::collections::HashSet;

use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{error, info};

use crate::types::{BatchErrors, NewUser, Page, UpdateUser};
use crate::utils::validation::validate_new_user;
use crewdesk_database::{NewUserRecord, User, UserError, UserRepository, UserRole, UserUpdate};

/// Fixed page size for user listings
pub const PER_PAGE: u32 = 10;

/// Outcome of a rejected or failed bulk create
#[derive(Debug, Error)]
pub enum BulkCreateError {
    #[error("validation failed for some records")]
    Validation(BatchErrors),
    #[error(transparent)]
    Store(#[from] UserError),
}

/// Service for managing user operations
#[derive(Clone)]
pub struct UserService {
    user_repository: UserRepository,
}

impl UserService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            user_repository: UserRepository::new(pool),
        }
    }

    /// Get a user by ID
    pub async fn get_user(&self, user_id: i64) -> Result<User, UserError> {
        self.user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(UserError::UserNotFound)
    }

    /// List one page of users, optionally filtered by a case-insensitive
    /// substring match on name or email.
    pub async fn list_users(
        &self,
        search: Option<&str>,
        page: u32,
    ) -> Result<Page<User>, UserError> {
        let page = page.max(1);
        let search = search.map(str::trim).filter(|term| !term.is_empty());

        let (users, total) = self
            .user_repository
            .search_page(search, page, PER_PAGE)
            .await?;

        Ok(Page::new(users, page, PER_PAGE, total))
    }

    /// Validate and insert a whole batch of users.
    ///
    /// Validation is exhaustive: every record is checked and all failures are
    /// collected before anything is written. Email uniqueness is enforced
    /// against existing live users and against earlier records in the same
    /// batch. A single invalid record rejects the entire batch; when all
    /// records pass, they are inserted in one transaction.
    pub async fn bulk_create(&self, records: &[NewUser]) -> Result<u64, BulkCreateError> {
        let candidates: Vec<String> = records
            .iter()
            .map(|record| record.email.clone())
            .filter(|email| !email.trim().is_empty())
            .collect();

        let taken: HashSet<String> = self
            .user_repository
            .existing_emails(&candidates)
            .await
            .map_err(BulkCreateError::Store)?
            .into_iter()
            .collect();

        let mut batch_errors = BatchErrors::new();
        let mut seen_in_batch: HashSet<&str> = HashSet::new();

        for (index, record) in records.iter().enumerate() {
            let mut errors = validate_new_user(record);

            if !record.email.trim().is_empty() {
                if taken.contains(&record.email) || seen_in_batch.contains(record.email.as_str()) {
                    errors.add("email", "The email has already been taken.");
                }
                seen_in_batch.insert(record.email.as_str());
            }

            if !errors.is_empty() {
                batch_errors.insert(index, errors);
            }
        }

        if !batch_errors.is_empty() {
            return Err(BulkCreateError::Validation(batch_errors));
        }

        let mut rows = Vec::with_capacity(records.len());
        for record in records {
            let password_hash = crewdesk_auth::hash_password(&record.password)
                .map_err(|e| UserError::DatabaseError(format!("password hashing failed: {e}")))?;

            rows.push(NewUserRecord {
                name: record.name.clone(),
                email: record.email.clone(),
                role: UserRole::from(record.role.as_str()),
                password_hash,
            });
        }

        let inserted = self.user_repository.insert_many(&rows).await.map_err(|e| {
            error!(error = %e, "bulk user insert failed, batch rolled back");
            BulkCreateError::Store(e)
        })?;

        info!(inserted, "bulk user insert committed");
        Ok(inserted)
    }

    /// Apply allow-listed fields to an existing user. A supplied password is
    /// hashed before persisting; the remaining fields are stored as given,
    /// without further validation.
    pub async fn update_user(&self, user_id: i64, update: UpdateUser) -> Result<(), UserError> {
        let password_hash = match update.password {
            Some(ref password) => Some(
                crewdesk_auth::hash_password(password)
                    .map_err(|e| UserError::DatabaseError(format!("password hashing failed: {e}")))?,
            ),
            None => None,
        };

        let fields = UserUpdate {
            name: update.name,
            email: update.email,
            role: update.role,
            password_hash,
        };

        self.user_repository.update_fields(user_id, &fields).await?;

        info!(user_id, "updated user");
        Ok(())
    }

    /// Soft delete a single user
    pub async fn soft_delete_user(&self, user_id: i64) -> Result<(), UserError> {
        self.user_repository.soft_delete(user_id).await?;

        info!(user_id, "soft deleted user");
        Ok(())
    }

    /// Soft delete every matching user among the given ids; ids without a
    /// live row are silently ignored.
    pub async fn batch_delete_users(&self, ids: &[i64]) -> Result<u64, UserError> {
        let marked = self.user_repository.soft_delete_many(ids).await?;

        info!(requested = ids.len(), marked, "batch soft delete");
        Ok(marked)
    }
}
