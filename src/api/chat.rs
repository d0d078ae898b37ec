//! Chat message routes. Every row is scoped to the authenticated user.

use actix_web::{HttpResponse, delete, get, post, web};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::db::{DbPool, chat_messages};
use crate::error::{AppError, AppResult};
use crate::models::{
    ChatMessageCreated, ChatMessageList, CreateChatMessageRequest, MessageResponse,
};

/// List the caller's conversation in chronological order.
///
/// GET /chat
#[utoipa::path(
    get,
    path = "/chat",
    tag = "Chat",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Conversation history", body = ChatMessageList)
    )
)]
#[get("")]
pub async fn list_messages(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let messages = chat_messages::list_for_user(pool.connection(), auth.id()).await?;

    Ok(HttpResponse::Ok().json(ChatMessageList {
        messages: messages.into_iter().map(Into::into).collect(),
    }))
}

/// Append a message to the caller's conversation.
///
/// POST /chat
#[utoipa::path(
    post,
    path = "/chat",
    tag = "Chat",
    security(("bearer_token" = [])),
    request_body = CreateChatMessageRequest,
    responses(
        (status = 201, description = "Message stored", body = ChatMessageCreated),
        (status = 400, description = "Empty content", body = crate::error::ErrorResponse)
    )
)]
#[post("")]
pub async fn create_message(
    auth: AuthUser,
    body: web::Json<CreateChatMessageRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if body.content.trim().is_empty() {
        return Err(AppError::InvalidInput("Content is required".to_string()));
    }

    let message =
        chat_messages::insert(pool.connection(), auth.id(), &body.content, body.is_user).await?;

    Ok(HttpResponse::Created().json(ChatMessageCreated {
        message: message.into(),
    }))
}

/// Delete one of the caller's messages.
///
/// Rows belonging to other users are indistinguishable from missing ones.
///
/// DELETE /chat/{id}
#[utoipa::path(
    delete,
    path = "/chat/{id}",
    tag = "Chat",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "Message id")),
    responses(
        (status = 200, description = "Message deleted", body = MessageResponse),
        (status = 404, description = "Unknown or foreign message", body = crate::error::ErrorResponse)
    )
)]
#[delete("/{id}")]
pub async fn delete_message(
    auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let not_found = || AppError::NotFound("Message not found or not authorized".to_string());

    let message_id = Uuid::parse_str(&path).map_err(|_| not_found())?;

    if !chat_messages::delete_for_user(pool.connection(), auth.id(), message_id).await? {
        return Err(not_found());
    }

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Message deleted successfully".to_string(),
    }))
}

/// Clear the caller's entire conversation.
///
/// DELETE /chat
#[utoipa::path(
    delete,
    path = "/chat",
    tag = "Chat",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Conversation cleared", body = MessageResponse)
    )
)]
#[delete("")]
pub async fn clear_messages(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    chat_messages::clear_for_user(pool.connection(), auth.id()).await?;

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "All chat messages cleared successfully".to_string(),
    }))
}

/// Configure chat routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(list_messages)
        .service(create_message)
        .service(delete_message)
        .service(clear_messages);
}
