use crate::{
    auth::extractors::AuthenticatedUserId,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use uuid::Uuid;
use validator::Validate;

/// Retrieves a list of tasks for the authenticated user.
///
/// Tasks are scoped to their owner and ordered by creation date, newest
/// first. Supports filtering by `status` and a case-insensitive `search` term
/// over titles and details.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<TaskStore>,
    query_params: web::Query<TaskQuery>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    let found = tasks.list(user_id.0, &query_params).await?;
    Ok(HttpResponse::Ok().json(found))
}

/// Creates a new task for the authenticated user.
///
/// The owner is always the authenticated user; it cannot be set from the
/// payload. The due date is accepted as-is on this path (the future-only rule
/// applies to updates).
///
/// ## Responses:
/// - `201 Created`: the newly created `Task`.
/// - `400 Bad Request`: input validation failed.
/// - `401 Unauthorized`: missing or invalid bearer token.
#[post("")]
pub async fn create_task(
    tasks: web::Data<TaskStore>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner(), user_id.0);
    let created = tasks.insert(&task).await?;

    Ok(HttpResponse::Created().json(created))
}

/// Retrieves a specific task by its ID.
///
/// A task owned by someone else is indistinguishable from a missing one.
///
/// ## Responses:
/// - `200 OK`: the `Task` object.
/// - `404 Not Found`: no such task for this user.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    match tasks.find(task_id.into_inner(), user_id.0).await? {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Updates an existing task.
///
/// Owner-scoped; the update and the ownership check are one conditional
/// statement. A due date supplied on this path must lie in the future.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `400 Bad Request`: validation failed or the due date is in the past.
/// - `404 Not Found`: no such task for this user.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    if let Some(due_date) = task_data.due_date {
        if due_date <= Utc::now() {
            return Err(AppError::Validation("Due date must be in the future".into()));
        }
    }

    match tasks
        .update(task_id.into_inner(), user_id.0, &task_data)
        .await?
    {
        Some(task) => Ok(HttpResponse::Ok().json(task)),
        None => Err(AppError::NotFound("Task not found".into())),
    }
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: no such task for this user.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<TaskStore>,
    task_id: web::Path<Uuid>,
    user_id: AuthenticatedUserId,
) -> Result<impl Responder, AppError> {
    if !tasks.delete(task_id.into_inner(), user_id.0).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use crate::models::{TaskInput, TaskStatus};
    use validator::Validate;

    #[test]
    fn test_task_input_validation() {
        let invalid_input_empty_title = TaskInput {
            title: "".to_string(),
            detail: Some("Test Detail".to_string()),
            status: TaskStatus::Todo,
            due_date: None,
        };
        assert!(
            invalid_input_empty_title.validate().is_err(),
            "Validation should fail for empty title."
        );

        let long_title = "a".repeat(201);
        let invalid_input_long_title = TaskInput {
            title: long_title,
            detail: Some("Test Detail".to_string()),
            status: TaskStatus::Doing,
            due_date: None,
        };
        assert!(
            invalid_input_long_title.validate().is_err(),
            "Validation should fail for overly long title."
        );

        let valid_input = TaskInput {
            title: "Valid Title".to_string(),
            detail: Some("Test Detail".to_string()),
            status: TaskStatus::Done,
            due_date: None,
        };
        assert!(
            valid_input.validate().is_ok(),
            "Validation should pass for valid input."
        );

        let long_detail = "b".repeat(1001);
        let invalid_input_long_detail = TaskInput {
            title: "Valid title for detail test".to_string(),
            detail: Some(long_detail),
            status: TaskStatus::Todo,
            due_date: None,
        };
        assert!(
            invalid_input_long_detail.validate().is_err(),
            "Validation should fail for overly long detail."
        );
    }
}
