//! Admin management of task-assignment access grants.
//!
//! A grant (owner, target) lets a non-admin owner assign tasks to the target.
//! Admins need no grants.

use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, MySqlPool};
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, FromRow, ToSchema)]
pub struct ManagedUser {
    #[schema(example = 42)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John Doe", nullable = true)]
    pub full_name: Option<String>,
    #[schema(example = 3)]
    pub role_id: u8,
    #[schema(example = true)]
    pub is_active: bool,
}

/// All users except the caller, for the admin access screen
#[utoipa::path(
    get,
    path = "/api/v1/admin/users",
    responses(
        (status = 200, description = "Users the admin can manage", body = [ManagedUser]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_users(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;

    let users = sqlx::query_as::<_, ManagedUser>(
        r#"
        SELECT id, username, full_name, role_id, is_active
        FROM users
        WHERE id != ?
        ORDER BY full_name
        "#,
    )
    .bind(auth.user_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to list users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(users))
}

#[derive(Serialize, ToSchema)]
pub struct AccessGrants {
    #[schema(example = 42)]
    pub owner_id: u64,
    pub target_ids: Vec<u64>,
}

/// Grant targets for one owner
#[utoipa::path(
    get,
    path = "/api/v1/admin/access/{owner_id}",
    params(("owner_id" = u64, Path, description = "Grant owner's user ID")),
    responses(
        (status = 200, description = "Users the owner may assign tasks to", body = AccessGrants),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn get_access(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let owner_id = path.into_inner();

    let target_ids = sqlx::query_scalar::<_, u64>(
        "SELECT target_id FROM task_access_grants WHERE owner_id = ? ORDER BY target_id",
    )
    .bind(owner_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, owner_id, "Failed to fetch access grants");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(AccessGrants {
        owner_id,
        target_ids,
    }))
}

#[derive(Deserialize, ToSchema)]
pub struct ReplaceAccess {
    pub target_ids: Vec<u64>,
}

/// Replace an owner's grant set
#[utoipa::path(
    put,
    path = "/api/v1/admin/access/{owner_id}",
    params(("owner_id" = u64, Path, description = "Grant owner's user ID")),
    request_body = ReplaceAccess,
    responses(
        (status = 200, description = "Grant set replaced", body = AccessGrants),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Caller is not an admin"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn put_access(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<u64>,
    payload: web::Json<ReplaceAccess>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let owner_id = path.into_inner();

    // Self-grants are meaningless; drop them silently.
    let mut target_ids: Vec<u64> = payload
        .target_ids
        .iter()
        .copied()
        .filter(|&id| id != owner_id)
        .collect();
    target_ids.sort_unstable();
    target_ids.dedup();

    let mut tx = pool.begin().await.map_err(|e| {
        error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query("DELETE FROM task_access_grants WHERE owner_id = ?")
        .bind(owner_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!(error = %e, owner_id, "Failed to clear access grants");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    for target_id in &target_ids {
        sqlx::query("INSERT INTO task_access_grants (owner_id, target_id) VALUES (?, ?)")
            .bind(owner_id)
            .bind(target_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                error!(error = %e, owner_id, target_id, "Failed to insert access grant");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
    }

    tx.commit().await.map_err(|e| {
        error!(error = %e, "Failed to commit access grants");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(AccessGrants {
        owner_id,
        target_ids,
    }))
}
