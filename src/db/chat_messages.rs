//! Database operations for chat messages.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::chat_message;
use crate::error::AppResult;

/// List a user's conversation history in chronological order.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<chat_message::Model>> {
    let messages = chat_message::Entity::find()
        .filter(chat_message::Column::UserId.eq(user_id))
        .order_by_asc(chat_message::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(messages)
}

/// Append a message to a user's conversation.
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    content: &str,
    is_user: bool,
) -> AppResult<chat_message::Model> {
    let model = chat_message::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        content: Set(content.to_string()),
        is_user: Set(is_user),
        created_at: Set(Utc::now()),
    };

    let inserted = model.insert(db).await?;
    Ok(inserted)
}

/// Delete one message, scoped to its owner. Returns false when the message
/// does not exist or belongs to a different user.
pub async fn delete_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    message_id: Uuid,
) -> AppResult<bool> {
    let result = chat_message::Entity::delete_many()
        .filter(chat_message::Column::Id.eq(message_id))
        .filter(chat_message::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Delete every message belonging to a user. Returns the number removed.
pub async fn clear_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<u64> {
    let result = chat_message::Entity::delete_many()
        .filter(chat_message::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected)
}

/// Count a user's messages (used by the per-user stats endpoint).
pub async fn count_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<u64> {
    let count = chat_message::Entity::find()
        .filter(chat_message::Column::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(count)
}
