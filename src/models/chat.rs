//! Chat message models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::chat_message;

/// A chat message as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageView {
    pub id: String,
    pub content: String,
    pub is_user: bool,
    pub created_at: DateTime<Utc>,
}

impl From<chat_message::Model> for ChatMessageView {
    fn from(m: chat_message::Model) -> Self {
        Self {
            id: m.id.to_string(),
            content: m.content,
            is_user: m.is_user,
            created_at: m.created_at,
        }
    }
}

/// POST /chat body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateChatMessageRequest {
    pub content: String,
    pub is_user: bool,
}

/// `{"messages": [...]}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageList {
    pub messages: Vec<ChatMessageView>,
}

/// `{"message": {...}}` envelope returned on creation.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatMessageCreated {
    pub message: ChatMessageView,
}
