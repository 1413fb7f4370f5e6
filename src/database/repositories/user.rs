//! User repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::user::{User, Role, UpdateUserRequest};
use crate::utils::errors::EventDeskError;

#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new user; the password must already be hashed
    pub async fn create(&self, username: &str, password_hash: &str, email: &str, full_name: &str, role: Role) -> Result<User, EventDeskError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, password_hash, email, full_name, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at
            "#
        )
        .bind(username)
        .bind(password_hash)
        .bind(email)
        .bind(full_name)
        .bind(role)
        .bind(Utc::now())
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if EventDeskError::is_constraint_violation(&e, "users_username_key") {
                EventDeskError::InvalidInput(format!("Username {} is already taken", username))
            } else {
                e.into()
            }
        })?;

        Ok(user)
    }

    /// Find active user by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, EventDeskError> {
        let mut conn = self.pool.acquire().await?;
        Self::find_active_in(&mut conn, id).await
    }

    /// Find active user by ID on an existing connection
    pub async fn find_active_in(conn: &mut PgConnection, id: i64) -> Result<Option<User>, EventDeskError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at FROM users WHERE user_id = $1 AND is_active = TRUE"
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Find active user by username
    pub async fn find_active_by_username(&self, username: &str) -> Result<Option<User>, EventDeskError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at FROM users WHERE username = $1 AND is_active = TRUE"
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    /// Update user
    pub async fn update(&self, id: i64, request: UpdateUserRequest) -> Result<User, EventDeskError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                full_name = COALESCE($3, full_name),
                role = COALESCE($4, role),
                is_active = COALESCE($5, is_active),
                updated_at = $6
            WHERE user_id = $1
            RETURNING user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at
            "#
        )
        .bind(id)
        .bind(request.email)
        .bind(request.full_name)
        .bind(request.role)
        .bind(request.is_active)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        user.ok_or(EventDeskError::UserNotFound { user_id: id })
    }

    /// Deactivate user (soft delete)
    pub async fn deactivate(&self, id: i64) -> Result<(), EventDeskError> {
        let result = sqlx::query("UPDATE users SET is_active = FALSE, updated_at = $2 WHERE user_id = $1 AND is_active = TRUE")
            .bind(id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(EventDeskError::UserNotFound { user_id: id });
        }

        Ok(())
    }

    /// List all active users
    pub async fn list_active(&self) -> Result<Vec<User>, EventDeskError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at FROM users WHERE is_active = TRUE ORDER BY full_name"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// List active users with a role
    pub async fn list_by_role(&self, role: Role) -> Result<Vec<User>, EventDeskError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT user_id, username, password_hash, email, full_name, role, is_active, created_at, updated_at FROM users WHERE role = $1 AND is_active = TRUE ORDER BY full_name"
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    /// Count active users per role
    pub async fn count_by_role(&self) -> Result<Vec<(Role, i64)>, EventDeskError> {
        let counts = sqlx::query_as::<_, (Role, i64)>(
            "SELECT role, COUNT(*) FROM users WHERE is_active = TRUE GROUP BY role ORDER BY role"
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(counts)
    }
}
