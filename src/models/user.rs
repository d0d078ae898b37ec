//! User models for registration, login and profile management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::user;

/// User info returned by the API. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub name: String,
    pub avatar_url: Option<String>,
    pub level: i32,
    pub xp: i32,
    pub completed_exercises: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<user::Model> for UserView {
    fn from(m: user::Model) -> Self {
        Self {
            id: m.id.to_string(),
            email: m.email,
            name: m.name,
            avatar_url: m.avatar_url,
            level: m.level,
            xp: m.xp,
            completed_exercises: m.completed_exercises,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Session JWT claims.
///
/// The user id is carried in both `sub` and `user_id`.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub iat: usize,
    pub exp: usize,
    pub user_id: String,
}

/// POST /auth/register body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

/// POST /auth/login body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response for register/login: the user plus a bearer token.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserView,
    pub token: String,
}

/// `{"user": ...}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserEnvelope {
    pub user: UserView,
}

/// `{"users": [...]}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserListResponse {
    pub users: Vec<UserView>,
}

/// PUT /users/{id} body. Every field is optional; at least one must be set.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub level: Option<i32>,
    pub xp: Option<i32>,
    pub completed_exercises: Option<i32>,
}

impl UpdateUserRequest {
    /// True when no recognized field was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.avatar_url.is_none()
            && self.level.is_none()
            && self.xp.is_none()
            && self.completed_exercises.is_none()
    }
}

/// PUT /users/profile body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: String,
    pub email: String,
}

/// PUT /users/password body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// DELETE /users/account body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteAccountRequest {
    pub password: String,
}

/// Response for PUT /users/profile.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ProfileUpdateResponse {
    pub success: bool,
    pub user: UserView,
    pub message: String,
}

/// Per-user activity statistics.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStats {
    pub total_chat_messages: i64,
    pub total_code_analyses: i64,
    pub average_code_score: f64,
    pub languages_used: Vec<String>,
    pub join_date: DateTime<Utc>,
}

/// `{"stats": ...}` envelope for GET /users/{id}/stats.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserStatsResponse {
    pub stats: UserStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_emptiness() {
        assert!(UpdateUserRequest::default().is_empty());

        let req = UpdateUserRequest {
            xp: Some(120),
            ..Default::default()
        };
        assert!(!req.is_empty());
    }

    #[test]
    fn test_user_view_never_exposes_password_hash() {
        let model = user::Model {
            id: uuid::Uuid::new_v4(),
            email: "student@example.com".to_string(),
            password_hash: "$2b$12$secret-hash".to_string(),
            name: "Student".to_string(),
            avatar_url: None,
            level: 1,
            xp: 0,
            completed_exercises: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let view = UserView::from(model);
        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("secret-hash"));
    }
}
