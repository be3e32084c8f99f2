use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Represents the state of a task.
/// Corresponds to the `task_status` SQL enum; serialized for clients with the
/// display names "To Do", "Doing", and "Done".
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "lowercase")]
pub enum TaskStatus {
    /// Task is yet to be started.
    #[serde(rename = "To Do")]
    Todo,
    /// Task is currently being worked on.
    #[serde(rename = "Doing")]
    Doing,
    /// Task is completed.
    #[serde(rename = "Done")]
    Done,
}

/// Input structure for creating or updating a task.
/// Contains validation rules for its fields.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TaskInput {
    /// The title of the task.
    /// Must be between 1 and 200 characters.
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    /// An optional free-form detail for the task.
    /// Maximum length of 1000 characters if provided.
    #[validate(length(max = 1000))]
    pub detail: Option<String>,

    /// Optional due date for the task. Must lie in the future on the update
    /// path; the create path accepts any value (enforced in the handler).
    pub due_date: Option<DateTime<Utc>>,

    /// The current state of the task.
    pub status: TaskStatus,
}

/// Represents a task entity as stored in the database and returned by the API.
///
/// Every task is owned by exactly one user, referenced by id.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Task {
    /// Unique identifier for the task (UUID v4).
    pub id: Uuid,
    /// The title of the task.
    pub title: String,
    /// An optional free-form detail for the task.
    pub detail: Option<String>,
    /// The current state of the task.
    pub status: TaskStatus,
    /// Optional due date for the task.
    pub due_date: Option<DateTime<Utc>>,
    /// Timestamp of when the task was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the task.
    pub updated_at: DateTime<Utc>,
    /// Identifier of the user who owns the task.
    pub user_id: i32,
}

/// Represents query parameters for filtering tasks when listing them.
#[derive(Debug, Serialize, Deserialize)]
pub struct TaskQuery {
    /// Filter tasks by state.
    pub status: Option<TaskStatus>,
    /// Search term to filter tasks by title or detail (case-insensitive).
    pub search: Option<String>,
}

impl Task {
    /// Creates a new `Task` instance from `TaskInput` and the owner's `user_id`.
    /// Sets `created_at`, `updated_at` to the current time, and `id` to a new UUID.
    pub fn new(input: TaskInput, user_id: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: input.title,
            detail: input.detail,
            status: input.status,
            due_date: input.due_date,
            created_at: now,
            updated_at: now,
            user_id,
        }
    }
}
