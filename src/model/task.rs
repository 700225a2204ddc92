use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaskPriority {
    Low,
    Medium,
    High,
}

/// Task list row, joined with the counterpart users' display names.
#[derive(Debug, Serialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 1,
    "title": "Prepare monthly report",
    "description": "Figures for May",
    "priority": "high",
    "status": "pending",
    "due_date": "2024-06-10",
    "report": null,
    "from_name": "Admin User",
    "to_name": "John Doe",
    "created_at": "2024-06-01T10:00:00Z"
}))]
pub struct TaskSummary {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "Prepare monthly report")]
    pub title: String,
    #[schema(nullable = true)]
    pub description: Option<String>,
    #[schema(example = "high")]
    pub priority: String,
    #[schema(example = "pending")]
    pub status: String,
    #[schema(example = "2024-06-10", value_type = String, format = "date", nullable = true)]
    pub due_date: Option<NaiveDate>,
    /// Completion report written by the assignee, if any.
    #[schema(nullable = true)]
    pub report: Option<String>,
    #[schema(example = "Admin User", nullable = true)]
    pub from_name: Option<String>,
    #[schema(example = "John Doe", nullable = true)]
    pub to_name: Option<String>,
    #[schema(example = "2024-06-01T10:00:00Z", value_type = String, format = "date-time", nullable = true)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw task-update row. `links` and `images` are stored as JSON text and
/// decoded into lists at the API boundary.
#[derive(Debug, sqlx::FromRow)]
pub struct TaskUpdateRow {
    pub id: u64,
    pub task_id: u64,
    pub user_name: Option<String>,
    pub progress: u8,
    pub comment: Option<String>,
    pub links: Option<String>,
    pub images: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}
