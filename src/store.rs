//!
//! # Store Layer
//!
//! Thin, explicit data-access structs wrapping a `PgPool`. One instance of
//! each store is constructed at startup and handed to the route handlers via
//! `web::Data`, so handlers never touch the pool directly and tests can stand
//! up stores against a scratch database.
//!
//! Every mutation that must be race-free (lock flips, reset-token consumption)
//! is a single conditional UPDATE, delegating per-record atomicity to the
//! database.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{Task, TaskInput, TaskQuery, User, UserProfile};

const USER_COLUMNS: &str =
    "id, username, email, password_hash, locked, reset_token, reset_token_expires_at, \
     created_at, updated_at";

const PROFILE_COLUMNS: &str = "id, username, email, locked, created_at, updated_at";

const TASK_COLUMNS: &str = "id, title, detail, status, due_date, created_at, updated_at, user_id";

/// Access to the `users` table: credentials, lock state, and reset tokens.
#[derive(Clone)]
pub struct UserStore {
    pool: PgPool,
}

impl UserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Looks up a user by (already normalized) email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE email = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_by_id(&self, id: i32) -> Result<Option<User>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Inserts a new user and returns its public profile.
    ///
    /// A unique-constraint violation on email or username surfaces as
    /// `AppError::Conflict` via the `From<sqlx::Error>` impl.
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserProfile, AppError> {
        let sql = format!(
            "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING {}",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(username)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Fetches the public profile for a user id.
    pub async fn profile(&self, id: i32) -> Result<Option<UserProfile>, AppError> {
        let sql = format!("SELECT {} FROM users WHERE id = $1", PROFILE_COLUMNS);
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Flips the lock flag in one statement. Returns the updated profile, or
    /// `None` when no such user exists.
    pub async fn set_locked(&self, id: i32, locked: bool) -> Result<Option<UserProfile>, AppError> {
        let sql = format!(
            "UPDATE users SET locked = $2, updated_at = now() WHERE id = $1 RETURNING {}",
            PROFILE_COLUMNS
        );
        let profile = sqlx::query_as::<_, UserProfile>(&sql)
            .bind(id)
            .bind(locked)
            .fetch_optional(&self.pool)
            .await?;
        Ok(profile)
    }

    /// Persists a freshly issued reset token and its expiry on the user row.
    ///
    /// Touches only the two reset columns (plus `updated_at`); no other field
    /// is re-validated or rewritten.
    pub async fn set_reset_token(
        &self,
        id: i32,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET reset_token = $2, reset_token_expires_at = $3, updated_at = now() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(token)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Completes a password reset in one conditional UPDATE: the stored token
    /// must equal the presented one and must not have expired. The token
    /// columns are cleared in the same statement, making the token single-use.
    ///
    /// Returns `false` when nothing matched: unknown user, rotated token, or
    /// elapsed expiry. Concurrent reset attempts race on the row; exactly one
    /// can win.
    pub async fn consume_reset_token(
        &self,
        id: i32,
        token: &str,
        new_password_hash: &str,
    ) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $3, reset_token = NULL, \
             reset_token_expires_at = NULL, updated_at = now() \
             WHERE id = $1 AND reset_token = $2 AND reset_token_expires_at > now()",
        )
        .bind(id)
        .bind(token)
        .bind(new_password_hash)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// Access to the `tasks` table, always scoped to an owning user.
#[derive(Clone)]
pub struct TaskStore {
    pool: PgPool,
}

impl TaskStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Lists a user's tasks, newest first, with optional status and search
    /// filters. Conditions are appended dynamically and bound positionally.
    pub async fn list(&self, user_id: i32, query: &TaskQuery) -> Result<Vec<Task>, AppError> {
        let mut sql = format!("SELECT {} FROM tasks WHERE user_id = $1", TASK_COLUMNS);
        let mut param_count = 2;

        if query.status.is_some() {
            sql.push_str(&format!(" AND status = ${}", param_count));
            param_count += 1;
        }
        if query.search.is_some() {
            sql.push_str(&format!(
                " AND (title ILIKE ${} OR detail ILIKE ${})",
                param_count,
                param_count + 1
            ));
        }
        sql.push_str(" ORDER BY created_at DESC");

        let mut query_builder = sqlx::query_as::<_, Task>(&sql).bind(user_id);
        if let Some(status) = query.status {
            query_builder = query_builder.bind(status);
        }
        if let Some(search) = &query.search {
            let pattern = format!("%{}%", search);
            query_builder = query_builder.bind(pattern.clone());
            query_builder = query_builder.bind(pattern);
        }

        let tasks = query_builder.fetch_all(&self.pool).await?;
        Ok(tasks)
    }

    pub async fn insert(&self, task: &Task) -> Result<Task, AppError> {
        let sql = format!(
            "INSERT INTO tasks (id, title, detail, status, due_date, user_id) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {}",
            TASK_COLUMNS
        );
        let created = sqlx::query_as::<_, Task>(&sql)
            .bind(task.id)
            .bind(&task.title)
            .bind(&task.detail)
            .bind(task.status)
            .bind(task.due_date)
            .bind(task.user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(created)
    }

    /// Fetches a task owned by `user_id`. Tasks belonging to other users are
    /// indistinguishable from missing ones.
    pub async fn find(&self, id: uuid::Uuid, user_id: i32) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    /// Updates a task in one owner-scoped statement; `None` means the task
    /// does not exist or belongs to someone else.
    pub async fn update(
        &self,
        id: uuid::Uuid,
        user_id: i32,
        input: &TaskInput,
    ) -> Result<Option<Task>, AppError> {
        let sql = format!(
            "UPDATE tasks SET title = $1, detail = $2, status = $3, due_date = $4, \
             updated_at = now() WHERE id = $5 AND user_id = $6 RETURNING {}",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(&input.title)
            .bind(&input.detail)
            .bind(input.status)
            .bind(input.due_date)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    /// Deletes a task owned by `user_id`. Returns `false` when nothing matched.
    pub async fn delete(&self, id: uuid::Uuid, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
