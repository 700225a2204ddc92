use crate::auth::auth::AuthUser;
use crate::model::user::Profile;
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use tracing::error;
use utoipa::ToSchema;

/// The caller's own profile
#[utoipa::path(
    get,
    path = "/api/v1/profile",
    responses(
        (status = 200, description = "Caller's profile", body = Profile),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Account no longer exists"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn get_profile(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let profile = sqlx::query_as::<_, Profile>(
        "SELECT id, username, full_name, role_id FROM users WHERE id = ?",
    )
    .bind(auth.user_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch profile");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match profile {
        Some(p) => Ok(HttpResponse::Ok().json(p)),
        None => Ok(HttpResponse::NotFound().json(json!({
            "message": "User not found"
        }))),
    }
}

#[derive(Deserialize, ToSchema)]
pub struct PushTokenReq {
    #[schema(example = "ExponentPushToken[xxxxxxxxxxxxxxxxxxxxxx]", nullable = true)]
    pub expo_push_token: Option<String>,
}

/// Register or clear the caller's push token
#[utoipa::path(
    put,
    path = "/api/v1/profile/push-token",
    request_body = PushTokenReq,
    responses(
        (status = 200, description = "Token stored", body = Object, example = json!({
            "message": "Push token updated"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Profile"
)]
pub async fn put_push_token(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<PushTokenReq>,
) -> actix_web::Result<impl Responder> {
    let token = payload
        .expo_push_token
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty());

    sqlx::query("UPDATE users SET expo_push_token = ? WHERE id = ?")
        .bind(token)
        .bind(auth.user_id)
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            error!(error = %e, user_id = auth.user_id, "Failed to store push token");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Push token updated"
    })))
}
