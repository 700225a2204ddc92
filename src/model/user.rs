use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of a user, safe to return from listing endpoints.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(example = json!({
    "id": 42,
    "username": "jdoe",
    "full_name": "John Doe",
    "role_id": 3
}))]
pub struct Profile {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe", nullable = true)]
    pub full_name: Option<String>,
    #[schema(example = 3)]
    pub role_id: u8,
}
