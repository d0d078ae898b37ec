//! Code analysis models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entity::code_analysis;

/// A stored code analysis as returned by the API.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CodeAnalysisView {
    pub id: String,
    pub code: String,
    pub language: String,
    pub score: i32,
    pub feedback: Vec<String>,
    pub suggestions: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<code_analysis::Model> for CodeAnalysisView {
    fn from(m: code_analysis::Model) -> Self {
        Self {
            id: m.id.to_string(),
            code: m.code,
            language: m.language,
            score: m.score,
            feedback: string_list(m.feedback),
            suggestions: string_list(m.suggestions),
            created_at: m.created_at,
        }
    }
}

/// Decode a JSONB array of strings, dropping anything that is not a string.
fn string_list(value: serde_json::Value) -> Vec<String> {
    match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|v| match v {
                serde_json::Value::String(s) => Some(s),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// POST /code-analysis body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCodeAnalysisRequest {
    pub code: String,
    pub language: String,
    pub score: i32,
    pub feedback: Vec<String>,
    pub suggestions: Vec<String>,
}

/// `{"analyses": [...]}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CodeAnalysisList {
    pub analyses: Vec<CodeAnalysisView>,
}

/// `{"analysis": {...}}` envelope.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CodeAnalysisEnvelope {
    pub analysis: CodeAnalysisView,
}

/// Row shape for the recent-analyses part of the stats summary.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecentAnalysis {
    pub id: String,
    pub language: String,
    pub score: i32,
    pub created_at: DateTime<Utc>,
}

impl From<code_analysis::Model> for RecentAnalysis {
    fn from(m: code_analysis::Model) -> Self {
        Self {
            id: m.id.to_string(),
            language: m.language,
            score: m.score,
            created_at: m.created_at,
        }
    }
}

/// GET /code-analysis/stats/summary response.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CodeAnalysisStats {
    pub total_analyses: i64,
    pub average_score: f64,
    pub languages_used: Vec<String>,
    pub recent_analyses: Vec<RecentAnalysis>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_list_keeps_order() {
        let value = serde_json::json!(["first", "second", "third"]);
        assert_eq!(string_list(value), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_string_list_tolerates_junk() {
        assert_eq!(string_list(serde_json::json!(null)), Vec::<String>::new());
        assert_eq!(
            string_list(serde_json::json!(["ok", 42, {"k": "v"}])),
            vec!["ok"]
        );
    }
}
