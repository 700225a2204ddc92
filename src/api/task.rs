use crate::auth::auth::AuthUser;
use crate::model::task::{TaskPriority, TaskSummary, TaskUpdateRow};
use crate::push::PushClient;
use actix_web::{HttpResponse, Responder, web};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::{FromRow, MySqlPool};
use tracing::{error, warn};
use utoipa::ToSchema;

const TASK_LIST_SQL: &str = r#"
    SELECT t.id, t.title, t.description, t.priority, t.status, t.due_date,
           t.report, t.created_at,
           fu.full_name AS from_name,
           tu.full_name AS to_name
    FROM tasks t
    LEFT JOIN users fu ON fu.id = t.assigned_by
    LEFT JOIN users tu ON tu.id = t.assigned_to
"#;

/// Tasks assigned to the caller
#[utoipa::path(
    get,
    path = "/api/v1/tasks/received",
    responses(
        (status = 200, description = "Tasks assigned to the caller, newest first", body = [TaskSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_received(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sql = format!("{TASK_LIST_SQL} WHERE t.assigned_to = ? ORDER BY t.created_at DESC");

    let tasks = sqlx::query_as::<_, TaskSummary>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch received tasks");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(tasks))
}

/// Tasks the caller assigned to others
#[utoipa::path(
    get,
    path = "/api/v1/tasks/assigned",
    responses(
        (status = 200, description = "Tasks assigned by the caller, newest first", body = [TaskSummary]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_assigned(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let sql = format!("{TASK_LIST_SQL} WHERE t.assigned_by = ? ORDER BY t.created_at DESC");

    let tasks = sqlx::query_as::<_, TaskSummary>(&sql)
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to fetch assigned tasks");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(tasks))
}

#[derive(Deserialize, ToSchema)]
pub struct CreateTask {
    #[schema(example = "Prepare monthly report")]
    pub title: String,
    #[schema(example = "Figures for May", nullable = true)]
    pub description: Option<String>,
    #[schema(example = "medium")]
    pub priority: Option<TaskPriority>,
    #[schema(example = "2024-06-10", value_type = String, format = "date", nullable = true)]
    pub due_date: Option<NaiveDate>,
    #[schema(example = 42)]
    pub assigned_to: u64,
}

#[derive(FromRow)]
struct AssigneeSql {
    expo_push_token: Option<String>,
}

async fn may_assign_to(
    pool: &MySqlPool,
    auth: &AuthUser,
    target_id: u64,
) -> Result<bool, sqlx::Error> {
    if auth.is_admin() {
        return Ok(true);
    }

    let granted = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM task_access_grants WHERE owner_id = ? AND target_id = ?)",
    )
    .bind(auth.user_id)
    .bind(target_id)
    .fetch_one(pool)
    .await?;

    Ok(granted != 0)
}

/// Assign a task
#[utoipa::path(
    post,
    path = "/api/v1/tasks",
    request_body = CreateTask,
    responses(
        (status = 201, description = "Task assigned", body = Object, example = json!({
            "message": "Task assigned"
        })),
        (status = 400, description = "Missing title or unknown assignee"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller may not assign tasks to this user"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn create_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    push: web::Data<PushClient>,
    payload: web::Json<CreateTask>,
) -> actix_web::Result<impl Responder> {
    // Local validation before any write.
    let title = payload.title.trim();
    if title.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Title is required"
        })));
    }

    let assignee = sqlx::query_as::<_, AssigneeSql>(
        "SELECT expo_push_token FROM users WHERE id = ? AND is_active = TRUE",
    )
    .bind(payload.assigned_to)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to look up assignee");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let Some(assignee) = assignee else {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Assignee not found"
        })));
    };

    let allowed = may_assign_to(pool.get_ref(), &auth, payload.assigned_to)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to check assign permission");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    if !allowed {
        return Ok(HttpResponse::Forbidden().json(json!({
            "message": "Not allowed to assign tasks to this user"
        })));
    }

    let priority = payload.priority.unwrap_or(TaskPriority::Medium);

    sqlx::query(
        r#"
        INSERT INTO tasks (title, description, priority, status, due_date, assigned_by, assigned_to)
        VALUES (?, ?, ?, 'pending', ?, ?, ?)
        "#,
    )
    .bind(title)
    .bind(&payload.description)
    .bind(priority.to_string())
    .bind(payload.due_date)
    .bind(auth.user_id)
    .bind(payload.assigned_to)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to create task");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Fire-and-forget: delivery failure never fails the assignment.
    if let Some(token) = assignee.expo_push_token {
        let push = push.get_ref().clone();
        let title = title.to_string();
        actix_web::rt::spawn(async move {
            if let Err(e) = push.send(&token, "New Task Assigned", &title).await {
                warn!(error = %e, "Push notification failed");
            }
        });
    }

    Ok(HttpResponse::Created().json(json!({
        "message": "Task assigned"
    })))
}

#[derive(Serialize, FromRow, ToSchema)]
pub struct AssignableUser {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "John Doe", nullable = true)]
    pub full_name: Option<String>,
    #[schema(example = 3)]
    pub role_id: u8,
}

/// Users the caller may assign tasks to
#[utoipa::path(
    get,
    path = "/api/v1/tasks/assignable-users",
    responses(
        (status = 200, description = "Assignable users", body = [AssignableUser]),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn assignable_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let users = if auth.is_admin() {
        sqlx::query_as::<_, AssignableUser>(
            r#"
            SELECT id, full_name, role_id
            FROM users
            WHERE id != ? AND is_active = TRUE
            ORDER BY full_name
            "#,
        )
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
    } else {
        sqlx::query_as::<_, AssignableUser>(
            r#"
            SELECT u.id, u.full_name, u.role_id
            FROM users u
            JOIN task_access_grants g ON g.target_id = u.id
            WHERE g.owner_id = ? AND u.is_active = TRUE
            ORDER BY u.full_name
            "#,
        )
        .bind(auth.user_id)
        .fetch_all(pool.get_ref())
        .await
    }
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to list assignable users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(users))
}

#[derive(Deserialize, ToSchema)]
pub struct CompleteTask {
    #[schema(example = "Report sent to finance", nullable = true)]
    pub report: Option<String>,
}

/// Mark a received task completed
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/complete",
    params(("task_id" = u64, Path, description = "Task ID")),
    request_body = CompleteTask,
    responses(
        (status = 200, description = "Task completed", body = Object, example = json!({
            "message": "Task completed"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Task not found, not the assignee, or already completed"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn complete_task(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<CompleteTask>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    let result = sqlx::query(
        r#"
        UPDATE tasks
        SET status = 'completed', report = ?
        WHERE id = ? AND assigned_to = ? AND status = 'pending'
        "#,
    )
    .bind(&payload.report)
    .bind(task_id)
    .bind(auth.user_id)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, task_id, "Failed to complete task");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if result.rows_affected() == 0 {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Task not found or already completed"
        })));
    }

    Ok(HttpResponse::Ok().json(json!({
        "message": "Task completed"
    })))
}

/// Prefix bare hosts with https; empty input yields nothing.
fn normalize_url(url: &str) -> Option<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        return None;
    }
    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

fn decode_list(raw: Option<&str>) -> Vec<String> {
    raw.and_then(|s| serde_json::from_str(s).ok())
        .unwrap_or_default()
}

#[derive(Serialize, ToSchema)]
pub struct TaskUpdateResponse {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = 1)]
    pub task_id: u64,
    #[schema(example = "John Doe", nullable = true)]
    pub user_name: Option<String>,
    #[schema(example = 40)]
    pub progress: u8,
    #[schema(example = "Halfway through the figures", nullable = true)]
    pub comment: Option<String>,
    pub links: Vec<String>,
    pub images: Vec<String>,
    #[schema(example = "2024-06-02T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

impl From<TaskUpdateRow> for TaskUpdateResponse {
    fn from(row: TaskUpdateRow) -> Self {
        Self {
            id: row.id,
            task_id: row.task_id,
            user_name: row.user_name,
            progress: row.progress,
            comment: row.comment,
            links: decode_list(row.links.as_deref()),
            images: decode_list(row.images.as_deref()),
            created_at: row.created_at,
        }
    }
}

async fn task_visible_to(
    pool: &MySqlPool,
    task_id: u64,
    user_id: u64,
) -> Result<bool, sqlx::Error> {
    let visible = sqlx::query_scalar::<_, i64>(
        "SELECT EXISTS(SELECT 1 FROM tasks WHERE id = ? AND (assigned_to = ? OR assigned_by = ?))",
    )
    .bind(task_id)
    .bind(user_id)
    .bind(user_id)
    .fetch_one(pool)
    .await?;
    Ok(visible != 0)
}

/// Progress updates for a task
#[utoipa::path(
    get,
    path = "/api/v1/tasks/{task_id}/updates",
    params(("task_id" = u64, Path, description = "Task ID")),
    responses(
        (status = 200, description = "Updates, newest first", body = [TaskUpdateResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found or not visible to the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn list_updates(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    let visible = task_visible_to(pool.get_ref(), task_id, auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, task_id, "Failed to check task visibility");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    if !visible {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Task not found"
        })));
    }

    let rows = sqlx::query_as::<_, TaskUpdateRow>(
        r#"
        SELECT tu.id, tu.task_id, tu.progress, tu.comment, tu.links, tu.images,
               tu.created_at, u.full_name AS user_name
        FROM task_updates tu
        LEFT JOIN users u ON u.id = tu.user_id
        WHERE tu.task_id = ?
        ORDER BY tu.created_at DESC
        "#,
    )
    .bind(task_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, task_id, "Failed to fetch task updates");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let updates: Vec<TaskUpdateResponse> = rows.into_iter().map(Into::into).collect();
    Ok(HttpResponse::Ok().json(updates))
}

#[derive(Deserialize, ToSchema)]
pub struct AddTaskUpdate {
    #[schema(example = 40, maximum = 100)]
    pub progress: u8,
    #[schema(example = "Halfway through the figures", nullable = true)]
    pub comment: Option<String>,
    #[serde(default)]
    pub links: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
}

/// Add a progress update
#[utoipa::path(
    post,
    path = "/api/v1/tasks/{task_id}/updates",
    params(("task_id" = u64, Path, description = "Task ID")),
    request_body = AddTaskUpdate,
    responses(
        (status = 201, description = "Update recorded", body = Object, example = json!({
            "message": "Update recorded"
        })),
        (status = 400, description = "Progress out of range"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Task not found or not visible to the caller"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Tasks"
)]
pub async fn add_update(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<AddTaskUpdate>,
) -> actix_web::Result<impl Responder> {
    let task_id = path.into_inner();

    if payload.progress > 100 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Progress must be between 0 and 100"
        })));
    }

    let visible = task_visible_to(pool.get_ref(), task_id, auth.user_id)
        .await
        .map_err(|e| {
            error!(error = %e, task_id, "Failed to check task visibility");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;
    if !visible {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Task not found"
        })));
    }

    let links: Vec<String> = payload
        .links
        .iter()
        .filter_map(|l| normalize_url(l))
        .collect();

    let links_json = serde_json::to_string(&links)
        .map_err(actix_web::error::ErrorInternalServerError)?;
    let images_json = serde_json::to_string(&payload.images)
        .map_err(actix_web::error::ErrorInternalServerError)?;

    sqlx::query(
        r#"
        INSERT INTO task_updates (task_id, user_id, progress, comment, links, images)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(task_id)
    .bind(auth.user_id)
    .bind(payload.progress)
    .bind(&payload.comment)
    .bind(links_json)
    .bind(images_json)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, task_id, "Failed to record task update");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Update recorded"
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_url_passes_through_schemes() {
        assert_eq!(
            normalize_url("https://example.com").as_deref(),
            Some("https://example.com")
        );
        assert_eq!(
            normalize_url("http://example.com").as_deref(),
            Some("http://example.com")
        );
    }

    #[test]
    fn normalize_url_prefixes_bare_hosts() {
        assert_eq!(
            normalize_url("  example.com/doc ").as_deref(),
            Some("https://example.com/doc")
        );
    }

    #[test]
    fn normalize_url_rejects_empty() {
        assert_eq!(normalize_url("   "), None);
    }

    #[test]
    fn decode_list_tolerates_bad_json() {
        assert_eq!(
            decode_list(Some(r#"["a","b"]"#)),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(decode_list(Some("not json")).is_empty());
        assert!(decode_list(None).is_empty());
    }
}
