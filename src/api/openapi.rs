//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Code Tutor Server",
        version = "0.4.0",
        description = "REST API for the Code Tutor learning platform: accounts, chat history, code analysis records and avatar upload"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::service_info,
        api::health::health,
        api::health::ready,
        // Auth endpoints
        api::auth::register,
        api::auth::login,
        api::auth::me,
        // User endpoints
        api::users::update_profile,
        api::users::change_password,
        api::users::delete_account,
        api::users::list_users,
        api::users::get_user,
        api::users::update_user,
        api::users::delete_user,
        api::users::user_stats,
        // Chat endpoints
        api::chat::list_messages,
        api::chat::create_message,
        api::chat::delete_message,
        api::chat::clear_messages,
        // Code analysis endpoints
        api::code_analysis::stats_summary,
        api::code_analysis::list_analyses,
        api::code_analysis::get_analysis,
        api::code_analysis::create_analysis,
        api::code_analysis::delete_analysis,
        // Upload endpoints
        api::upload::upload_profile_photo,
        api::upload::serve_upload,
    ),
    components(
        schemas(
            // Common
            error::ErrorResponse,
            models::MessageResponse,
            models::SuccessResponse,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            api::health::ServiceInfoResponse,
            // Auth / users
            models::RegisterRequest,
            models::LoginRequest,
            models::AuthResponse,
            models::UserView,
            models::UserEnvelope,
            models::UserListResponse,
            models::UpdateUserRequest,
            models::UpdateProfileRequest,
            models::ProfileUpdateResponse,
            models::ChangePasswordRequest,
            models::DeleteAccountRequest,
            models::UserStats,
            models::UserStatsResponse,
            // Chat
            models::ChatMessageView,
            models::CreateChatMessageRequest,
            models::ChatMessageList,
            models::ChatMessageCreated,
            // Code analysis
            models::CodeAnalysisView,
            models::CreateCodeAnalysisRequest,
            models::CodeAnalysisList,
            models::CodeAnalysisEnvelope,
            models::RecentAnalysis,
            models::CodeAnalysisStats,
            // Upload
            api::upload::UploadResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Auth", description = "Registration, login and session info"),
        (name = "Users", description = "User management and stats"),
        (name = "Chat", description = "Per-user chat message log"),
        (name = "Code Analysis", description = "Stored code analysis records"),
        (name = "Upload", description = "Profile photo upload and serving")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add the bearer token security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_token",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
