//! Database operations for users.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::user;
use crate::error::AppResult;
use crate::models::UpdateUserRequest;

/// Insert a new user row.
pub async fn insert(
    db: &DatabaseConnection,
    email: &str,
    password_hash: &str,
    name: &str,
    avatar_url: Option<&str>,
) -> AppResult<user::Model> {
    let now = Utc::now();

    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.to_string()),
        password_hash: Set(password_hash.to_string()),
        name: Set(name.to_string()),
        avatar_url: Set(avatar_url.map(|s| s.to_string())),
        level: Set(1),
        xp: Set(0),
        completed_exercises: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let inserted = model.insert(db).await?;
    Ok(inserted)
}

/// Find a user by email.
pub async fn find_by_email(db: &DatabaseConnection, email: &str) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;

    Ok(result)
}

/// Find a user by ID.
pub async fn find_by_id(db: &DatabaseConnection, id: Uuid) -> AppResult<Option<user::Model>> {
    let result = user::Entity::find_by_id(id).one(db).await?;
    Ok(result)
}

/// Check whether an email is already registered.
pub async fn email_exists(db: &DatabaseConnection, email: &str) -> AppResult<bool> {
    let count = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// Check whether an email is registered to a different account than `user_id`.
pub async fn email_taken_by_other(
    db: &DatabaseConnection,
    email: &str,
    user_id: Uuid,
) -> AppResult<bool> {
    let count = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .filter(user::Column::Id.ne(user_id))
        .count(db)
        .await?;

    Ok(count > 0)
}

/// List all users, newest first.
pub async fn list_all(db: &DatabaseConnection) -> AppResult<Vec<user::Model>> {
    let users = user::Entity::find()
        .order_by_desc(user::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(users)
}

/// Apply a partial profile update. Only the supplied fields are written;
/// `updated_at` is maintained by the database trigger.
pub async fn apply_update(
    db: &DatabaseConnection,
    current: user::Model,
    update: &UpdateUserRequest,
) -> AppResult<user::Model> {
    let mut active: user::ActiveModel = current.into();

    if let Some(ref name) = update.name {
        active.name = Set(name.clone());
    }
    if let Some(ref avatar_url) = update.avatar_url {
        active.avatar_url = Set(Some(avatar_url.clone()));
    }
    if let Some(level) = update.level {
        active.level = Set(level);
    }
    if let Some(xp) = update.xp {
        active.xp = Set(xp);
    }
    if let Some(completed) = update.completed_exercises {
        active.completed_exercises = Set(completed);
    }

    let updated = active.update(db).await?;
    Ok(updated)
}

/// Update name and email (PUT /users/profile).
pub async fn update_profile(
    db: &DatabaseConnection,
    current: user::Model,
    name: &str,
    email: &str,
) -> AppResult<user::Model> {
    let mut active: user::ActiveModel = current.into();
    active.name = Set(name.to_string());
    active.email = Set(email.to_string());

    let updated = active.update(db).await?;
    Ok(updated)
}

/// Replace the stored password hash.
pub async fn update_password_hash(
    db: &DatabaseConnection,
    current: user::Model,
    password_hash: &str,
) -> AppResult<user::Model> {
    let mut active: user::ActiveModel = current.into();
    active.password_hash = Set(password_hash.to_string());

    let updated = active.update(db).await?;
    Ok(updated)
}

/// Point the user's avatar_url at a freshly uploaded file.
pub async fn update_avatar_url(
    db: &DatabaseConnection,
    current: user::Model,
    avatar_url: &str,
) -> AppResult<user::Model> {
    let mut active: user::ActiveModel = current.into();
    active.avatar_url = Set(Some(avatar_url.to_string()));

    let updated = active.update(db).await?;
    Ok(updated)
}

/// Delete a user. Chat messages and analyses cascade at the database layer.
/// Returns false when no row was deleted.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> AppResult<bool> {
    let result = user::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}
