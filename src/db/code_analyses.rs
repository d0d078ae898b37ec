//! Database operations for code analyses.

use chrono::Utc;
use sea_orm::*;
use uuid::Uuid;

use crate::entity::code_analysis;
use crate::error::AppResult;

/// List a user's analyses, newest first.
pub async fn list_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<code_analysis::Model>> {
    let analyses = code_analysis::Entity::find()
        .filter(code_analysis::Column::UserId.eq(user_id))
        .order_by_desc(code_analysis::Column::CreatedAt)
        .all(db)
        .await?;

    Ok(analyses)
}

/// Find one analysis, scoped to its owner. Cross-user ids come back as None.
pub async fn find_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    analysis_id: Uuid,
) -> AppResult<Option<code_analysis::Model>> {
    let result = code_analysis::Entity::find_by_id(analysis_id)
        .filter(code_analysis::Column::UserId.eq(user_id))
        .one(db)
        .await?;

    Ok(result)
}

/// Store a new analysis record. Feedback and suggestions are persisted as
/// JSONB arrays in the given order.
pub async fn insert(
    db: &DatabaseConnection,
    user_id: Uuid,
    code: &str,
    language: &str,
    score: i32,
    feedback: &[String],
    suggestions: &[String],
) -> AppResult<code_analysis::Model> {
    let model = code_analysis::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(user_id),
        code: Set(code.to_string()),
        language: Set(language.to_string()),
        score: Set(score),
        feedback: Set(serde_json::json!(feedback)),
        suggestions: Set(serde_json::json!(suggestions)),
        created_at: Set(Utc::now()),
    };

    let inserted = model.insert(db).await?;
    Ok(inserted)
}

/// Delete one analysis, scoped to its owner. Returns false when the record
/// does not exist or belongs to a different user.
pub async fn delete_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    analysis_id: Uuid,
) -> AppResult<bool> {
    let result = code_analysis::Entity::delete_many()
        .filter(code_analysis::Column::Id.eq(analysis_id))
        .filter(code_analysis::Column::UserId.eq(user_id))
        .exec(db)
        .await?;

    Ok(result.rows_affected > 0)
}

/// Count a user's analyses.
pub async fn count_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<u64> {
    let count = code_analysis::Entity::find()
        .filter(code_analysis::Column::UserId.eq(user_id))
        .count(db)
        .await?;

    Ok(count)
}

#[derive(Debug, FromQueryResult)]
struct AvgScoreRow {
    average: Option<f64>,
}

/// Average score across a user's analyses; 0.0 when there are none.
pub async fn average_score_for_user(db: &DatabaseConnection, user_id: Uuid) -> AppResult<f64> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"SELECT AVG(score)::DOUBLE PRECISION AS average
           FROM code_analyses
           WHERE user_id = $1"#,
        [user_id.into()],
    );

    let row = AvgScoreRow::find_by_statement(stmt).one(db).await?;

    Ok(row.and_then(|r| r.average).unwrap_or(0.0))
}

#[derive(Debug, FromQueryResult)]
struct LanguageRow {
    language: String,
}

/// Distinct languages a user has submitted, alphabetically.
pub async fn languages_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> AppResult<Vec<String>> {
    let stmt = Statement::from_sql_and_values(
        DbBackend::Postgres,
        r#"SELECT DISTINCT language
           FROM code_analyses
           WHERE user_id = $1
           ORDER BY language"#,
        [user_id.into()],
    );

    let rows = LanguageRow::find_by_statement(stmt).all(db).await?;

    Ok(rows.into_iter().map(|r| r.language).collect())
}

/// The user's most recent analyses, newest first.
pub async fn recent_for_user(
    db: &DatabaseConnection,
    user_id: Uuid,
    limit: u64,
) -> AppResult<Vec<code_analysis::Model>> {
    let analyses = code_analysis::Entity::find()
        .filter(code_analysis::Column::UserId.eq(user_id))
        .order_by_desc(code_analysis::Column::CreatedAt)
        .limit(limit)
        .all(db)
        .await?;

    Ok(analyses)
}
