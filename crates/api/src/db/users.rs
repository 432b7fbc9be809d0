//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use clementine_core::{Email, Role, UserId};

use super::RepositoryError;
use crate::models::user::{NewUser, User};

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    phone: Option<String>,
    role: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        let role: Role = row.role.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid role in database: {e}"))
        })?;

        Ok(Self {
            user_id: UserId::new(row.id),
            email,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            role,
            created_at: row.created_at,
        })
    }
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(&self, input: &NewUser) -> Result<UserId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO users (email, password_hash, first_name, last_name, phone)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            ",
        )
        .bind(input.email.as_str())
        .bind(&input.password_hash)
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.phone)
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("email already registered".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        Ok(UserId::new(id))
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            r"
            SELECT id, email, first_name, last_name, phone, role, created_at
            FROM users
            WHERE id = $1
            ",
        )
        .bind(id.as_i32())
        .fetch_optional(self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    /// Get a user and their password hash by email.
    ///
    /// Returns `None` if no user has this email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if stored data is invalid.
    pub async fn get_with_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        #[derive(Debug, sqlx::FromRow)]
        struct UserWithHashRow {
            #[sqlx(flatten)]
            user: UserRow,
            password_hash: String,
        }

        let row: Option<UserWithHashRow> = sqlx::query_as(
            r"
            SELECT id, email, first_name, last_name, phone, role, created_at,
                   password_hash
            FROM users
            WHERE email = $1
            ",
        )
        .bind(email.as_str())
        .fetch_optional(self.pool)
        .await?;

        match row {
            Some(r) => Ok(Some((User::try_from(r.user)?, r.password_hash))),
            None => Ok(None),
        }
    }
}
