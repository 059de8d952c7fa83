use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Task, TaskInput, TaskQuery},
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use log::info;
use uuid::Uuid;
use validator::Validate;

fn not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

/// Retrieves the authenticated user's tasks, newest first.
///
/// ## Query Parameters:
/// - `completed` (optional): `true` or `false`.
/// - `search` (optional): case-insensitive match on title or description.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects.
/// - `401 Unauthorized`: Missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<dyn TaskStore>,
    query_params: web::Query<TaskQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = tasks.list(user.id, &query_params).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the authenticated user.
///
/// ## Request Body:
/// `{title, description?, is_completed?}`. Any owner field in the body is ignored.
///
/// ## Responses:
/// - `201 Created`: The new `Task`.
/// - `401 Unauthorized`: Missing or invalid token, or the token's user no longer exists.
/// - `422 Unprocessable Entity`: Title or description length out of range.
#[post("")]
pub async fn create_task(
    tasks: web::Data<dyn TaskStore>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks.create(Task::new(task_data.into_inner(), user.id)).await?;
    info!("user {} created task {}", user.id, task.id);
    Ok(HttpResponse::Created().json(task))
}

/// Retrieves one task.
///
/// ## Responses:
/// - `200 OK`: The `Task`.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = tasks
        .get(user.id, task_id.into_inner())
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title, description and completion flag of a task.
///
/// ## Responses:
/// - `200 OK`: The updated `Task`.
/// - `404 Not Found`: No such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: Validation failed.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = tasks
        .update(user.id, task_id.into_inner(), &task_data)
        .await?
        .ok_or_else(not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task.
///
/// ## Responses:
/// - `204 No Content`: Deleted.
/// - `404 Not Found`: No such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<dyn TaskStore>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task_uuid = task_id.into_inner();
    if !tasks.delete(user.id, task_uuid).await? {
        return Err(not_found());
    }

    info!("user {} deleted task {}", user.id, task_uuid);
    Ok(HttpResponse::NoContent().finish())
}
