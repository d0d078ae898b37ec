//! Domain models and request/response shapes for the Code Tutor API.

pub mod chat;
pub mod code_analysis;
pub mod user;

// Re-export commonly used types
pub use chat::{ChatMessageCreated, ChatMessageList, ChatMessageView, CreateChatMessageRequest};
pub use code_analysis::{
    CodeAnalysisEnvelope, CodeAnalysisList, CodeAnalysisStats, CodeAnalysisView,
    CreateCodeAnalysisRequest, RecentAnalysis,
};
pub use user::{
    AuthResponse, ChangePasswordRequest, Claims, DeleteAccountRequest, LoginRequest,
    ProfileUpdateResponse, RegisterRequest, UpdateProfileRequest, UpdateUserRequest, UserEnvelope,
    UserListResponse, UserStats, UserStatsResponse, UserView,
};

/// Plain `{"message": "..."}` acknowledgement body.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

/// `{"success": true, "message": "..."}` acknowledgement body.
#[derive(Debug, serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
    pub message: String,
}
