//! User management routes: listing, profile updates, password change,
//! account deletion and per-user activity stats.

use actix_web::{HttpResponse, delete, get, put, web};
use tracing::info;
use uuid::Uuid;

use crate::api::round_to_2dp;
use crate::auth::{self, AuthUser};
use crate::db::{DbPool, chat_messages, code_analyses, users};
use crate::error::{AppError, AppResult};
use crate::models::{
    ChangePasswordRequest, DeleteAccountRequest, MessageResponse, ProfileUpdateResponse,
    SuccessResponse, UpdateProfileRequest, UpdateUserRequest, UserEnvelope, UserListResponse,
    UserStats, UserStatsResponse,
};

use super::auth::{MIN_PASSWORD_LEN, is_plausible_email};

/// Update the caller's name and email.
///
/// PUT /users/profile
#[utoipa::path(
    put,
    path = "/users/profile",
    tag = "Users",
    security(("bearer_token" = [])),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = ProfileUpdateResponse),
        (status = 400, description = "Invalid input or email in use", body = crate::error::ErrorResponse)
    )
)]
#[put("/profile")]
pub async fn update_profile(
    auth: AuthUser,
    body: web::Json<UpdateProfileRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let name = body.name.trim();
    let email = body.email.trim().to_lowercase();

    if name.is_empty() || email.is_empty() {
        return Err(AppError::InvalidInput(
            "Name and email are required".to_string(),
        ));
    }

    if !is_plausible_email(&email) {
        return Err(AppError::InvalidInput("Invalid email address".to_string()));
    }

    if users::email_taken_by_other(pool.connection(), &email, auth.id()).await? {
        return Err(AppError::InvalidInput(
            "Email already in use by another account".to_string(),
        ));
    }

    let updated = users::update_profile(pool.connection(), auth.user, name, &email).await?;

    Ok(HttpResponse::Ok().json(ProfileUpdateResponse {
        success: true,
        user: updated.into(),
        message: "Profile updated successfully".to_string(),
    }))
}

/// Change the caller's password.
///
/// PUT /users/password
#[utoipa::path(
    put,
    path = "/users/password",
    tag = "Users",
    security(("bearer_token" = [])),
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = SuccessResponse),
        (status = 400, description = "Wrong current password or weak new password", body = crate::error::ErrorResponse)
    )
)]
#[put("/password")]
pub async fn change_password(
    auth: AuthUser,
    body: web::Json<ChangePasswordRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth::verify_password(&body.current_password, &auth.user.password_hash)? {
        return Err(AppError::InvalidInput(
            "Current password is incorrect".to_string(),
        ));
    }

    if body.new_password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::InvalidInput(format!(
            "New password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }

    let new_hash = auth::hash_password(&body.new_password)?;
    users::update_password_hash(pool.connection(), auth.user, &new_hash).await?;

    Ok(HttpResponse::Ok().json(SuccessResponse {
        success: true,
        message: "Password changed successfully".to_string(),
    }))
}

/// Delete the caller's account after confirming their password.
///
/// DELETE /users/account
#[utoipa::path(
    delete,
    path = "/users/account",
    tag = "Users",
    security(("bearer_token" = [])),
    request_body = DeleteAccountRequest,
    responses(
        (status = 200, description = "Account deleted", body = SuccessResponse),
        (status = 400, description = "Wrong password", body = crate::error::ErrorResponse)
    )
)]
#[delete("/account")]
pub async fn delete_account(
    auth: AuthUser,
    body: web::Json<DeleteAccountRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if !auth::verify_password(&body.password, &auth.user.password_hash)? {
        return Err(AppError::InvalidInput("Incorrect password".to_string()));
    }

    let user_id = auth.id();
    users::delete(pool.connection(), user_id).await?;
    info!("User {} deleted their account", user_id);

    Ok(HttpResponse::Ok().json(SuccessResponse {
        success: true,
        message: "Account deleted successfully".to_string(),
    }))
}

/// List all users, newest first.
///
/// GET /users
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "All users", body = UserListResponse)
    )
)]
#[get("")]
pub async fn list_users(_auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let users = users::list_all(pool.connection()).await?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch one user by id.
///
/// GET /users/{id}
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "The user", body = UserEnvelope),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    )
)]
#[get("/{id}")]
pub async fn get_user(
    _auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user_id = parse_user_id(&path)?;

    let user = users::find_by_id(pool.connection(), user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    Ok(HttpResponse::Ok().json(UserEnvelope { user: user.into() }))
}

/// Partially update a user. Self only.
///
/// PUT /users/{id}
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserEnvelope),
        (status = 400, description = "No fields to update", body = crate::error::ErrorResponse),
        (status = 403, description = "Not your profile", body = crate::error::ErrorResponse)
    )
)]
#[put("/{id}")]
pub async fn update_user(
    auth: AuthUser,
    path: web::Path<String>,
    body: web::Json<UpdateUserRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    require_self(&auth, &path, "You can only update your own profile")?;

    if body.is_empty() {
        return Err(AppError::InvalidInput("No fields to update".to_string()));
    }

    let updated = users::apply_update(pool.connection(), auth.user, &body).await?;

    Ok(HttpResponse::Ok().json(UserEnvelope {
        user: updated.into(),
    }))
}

/// Delete a user. Self only.
///
/// DELETE /users/{id}
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "Users",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = MessageResponse),
        (status = 403, description = "Not your account", body = crate::error::ErrorResponse)
    )
)]
#[delete("/{id}")]
pub async fn delete_user(
    auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    require_self(&auth, &path, "You can only delete your own account")?;

    let user_id = auth.id();
    if !users::delete(pool.connection(), user_id).await? {
        return Err(AppError::NotFound("User not found".to_string()));
    }
    info!("User {} deleted", user_id);

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "User deleted successfully".to_string(),
    }))
}

/// Per-user activity statistics.
///
/// GET /users/{id}/stats
#[utoipa::path(
    get,
    path = "/users/{id}/stats",
    tag = "Users",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "Activity stats", body = UserStatsResponse),
        (status = 404, description = "Unknown user", body = crate::error::ErrorResponse)
    )
)]
#[get("/{id}/stats")]
pub async fn user_stats(
    _auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let user_id = parse_user_id(&path)?;
    let db = pool.connection();

    let user = users::find_by_id(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    let total_chat_messages = chat_messages::count_for_user(db, user_id).await? as i64;
    let total_code_analyses = code_analyses::count_for_user(db, user_id).await? as i64;
    let average_code_score = round_to_2dp(code_analyses::average_score_for_user(db, user_id).await?);
    let languages_used = code_analyses::languages_for_user(db, user_id).await?;

    Ok(HttpResponse::Ok().json(UserStatsResponse {
        stats: UserStats {
            total_chat_messages,
            total_code_analyses,
            average_code_score,
            languages_used,
            join_date: user.created_at,
        },
    }))
}

/// Parse a path id, mapping garbage to 404 (the row cannot exist).
fn parse_user_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| AppError::NotFound("User not found".to_string()))
}

/// Reject requests that target a different user's row.
fn require_self(auth: &AuthUser, raw_id: &str, message: &str) -> AppResult<()> {
    match Uuid::parse_str(raw_id) {
        Ok(id) if id == auth.id() => Ok(()),
        _ => Err(AppError::Forbidden(message.to_string())),
    }
}

/// Configure user routes.
///
/// Literal paths (profile/password/account) are registered before the `{id}`
/// matchers so they are not captured as ids.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(update_profile)
        .service(change_password)
        .service(delete_account)
        .service(list_users)
        .service(user_stats)
        .service(get_user)
        .service(update_user)
        .service(delete_user);
}
