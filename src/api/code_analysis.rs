//! Code analysis routes. Records are immutable once stored and scoped to
//! the authenticated user; this layer persists and returns them without
//! interpreting scores or feedback.

use actix_web::{HttpResponse, delete, get, post, web};
use uuid::Uuid;

use crate::api::round_to_2dp;
use crate::auth::AuthUser;
use crate::db::{DbPool, code_analyses};
use crate::error::{AppError, AppResult};
use crate::models::{
    CodeAnalysisEnvelope, CodeAnalysisList, CodeAnalysisStats, CreateCodeAnalysisRequest,
    MessageResponse,
};

/// How many analyses the stats summary reports as "recent".
const RECENT_ANALYSES_LIMIT: u64 = 5;

/// Summary statistics over the caller's analyses.
///
/// GET /code-analysis/stats/summary
#[utoipa::path(
    get,
    path = "/code-analysis/stats/summary",
    tag = "Code Analysis",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Aggregated stats", body = CodeAnalysisStats)
    )
)]
#[get("/stats/summary")]
pub async fn stats_summary(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let db = pool.connection();
    let user_id = auth.id();

    let total_analyses = code_analyses::count_for_user(db, user_id).await? as i64;
    let average_score = round_to_2dp(code_analyses::average_score_for_user(db, user_id).await?);
    let languages_used = code_analyses::languages_for_user(db, user_id).await?;
    let recent = code_analyses::recent_for_user(db, user_id, RECENT_ANALYSES_LIMIT).await?;

    Ok(HttpResponse::Ok().json(CodeAnalysisStats {
        total_analyses,
        average_score,
        languages_used,
        recent_analyses: recent.into_iter().map(Into::into).collect(),
    }))
}

/// List the caller's analyses, newest first.
///
/// GET /code-analysis
#[utoipa::path(
    get,
    path = "/code-analysis",
    tag = "Code Analysis",
    security(("bearer_token" = [])),
    responses(
        (status = 200, description = "Stored analyses", body = CodeAnalysisList)
    )
)]
#[get("")]
pub async fn list_analyses(auth: AuthUser, pool: web::Data<DbPool>) -> AppResult<HttpResponse> {
    let analyses = code_analyses::list_for_user(pool.connection(), auth.id()).await?;

    Ok(HttpResponse::Ok().json(CodeAnalysisList {
        analyses: analyses.into_iter().map(Into::into).collect(),
    }))
}

/// Fetch one analysis.
///
/// GET /code-analysis/{id}
#[utoipa::path(
    get,
    path = "/code-analysis/{id}",
    tag = "Code Analysis",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "Analysis id")),
    responses(
        (status = 200, description = "The analysis", body = CodeAnalysisEnvelope),
        (status = 404, description = "Unknown or foreign analysis", body = crate::error::ErrorResponse)
    )
)]
#[get("/{id}")]
pub async fn get_analysis(
    auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let not_found = || AppError::NotFound("Analysis not found or not authorized".to_string());

    let analysis_id = Uuid::parse_str(&path).map_err(|_| not_found())?;

    let analysis = code_analyses::find_for_user(pool.connection(), auth.id(), analysis_id)
        .await?
        .ok_or_else(not_found)?;

    Ok(HttpResponse::Ok().json(CodeAnalysisEnvelope {
        analysis: analysis.into(),
    }))
}

/// Store a new analysis record.
///
/// POST /code-analysis
#[utoipa::path(
    post,
    path = "/code-analysis",
    tag = "Code Analysis",
    security(("bearer_token" = [])),
    request_body = CreateCodeAnalysisRequest,
    responses(
        (status = 201, description = "Analysis stored", body = CodeAnalysisEnvelope),
        (status = 400, description = "Invalid input", body = crate::error::ErrorResponse)
    )
)]
#[post("")]
pub async fn create_analysis(
    auth: AuthUser,
    body: web::Json<CreateCodeAnalysisRequest>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    if body.code.trim().is_empty() {
        return Err(AppError::InvalidInput("Code is required".to_string()));
    }
    if body.language.trim().is_empty() {
        return Err(AppError::InvalidInput("Language is required".to_string()));
    }
    if !(0..=100).contains(&body.score) {
        return Err(AppError::InvalidInput(
            "Score must be between 0 and 100".to_string(),
        ));
    }

    let analysis = code_analyses::insert(
        pool.connection(),
        auth.id(),
        &body.code,
        &body.language,
        body.score,
        &body.feedback,
        &body.suggestions,
    )
    .await?;

    Ok(HttpResponse::Created().json(CodeAnalysisEnvelope {
        analysis: analysis.into(),
    }))
}

/// Delete one of the caller's analyses.
///
/// DELETE /code-analysis/{id}
#[utoipa::path(
    delete,
    path = "/code-analysis/{id}",
    tag = "Code Analysis",
    security(("bearer_token" = [])),
    params(("id" = String, Path, description = "Analysis id")),
    responses(
        (status = 200, description = "Analysis deleted", body = MessageResponse),
        (status = 404, description = "Unknown or foreign analysis", body = crate::error::ErrorResponse)
    )
)]
#[delete("/{id}")]
pub async fn delete_analysis(
    auth: AuthUser,
    path: web::Path<String>,
    pool: web::Data<DbPool>,
) -> AppResult<HttpResponse> {
    let not_found = || AppError::NotFound("Analysis not found or not authorized".to_string());

    let analysis_id = Uuid::parse_str(&path).map_err(|_| not_found())?;

    if !code_analyses::delete_for_user(pool.connection(), auth.id(), analysis_id).await? {
        return Err(not_found());
    }

    Ok(HttpResponse::Ok().json(MessageResponse {
        message: "Analysis deleted successfully".to_string(),
    }))
}

/// Configure code analysis routes.
///
/// `stats/summary` is registered before the `{id}` matchers so "stats" is
/// never parsed as an analysis id.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(stats_summary)
        .service(list_analyses)
        .service(create_analysis)
        .service(get_analysis)
        .service(delete_analysis);
}
