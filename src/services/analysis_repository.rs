//! Analysis Store - persistence for snippet analysis records

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::models::{CodeAnalysis, SnippetAnalysisRecord, SnippetAnalysisRow, SnippetSubmission};
use crate::utils::{ApiError, ApiResult};

/// Insert and full-listing access to `snippet_analyses`.
/// Records are never updated or deleted.
#[derive(Clone)]
pub struct AnalysisRepository {
    pool: SqlitePool,
}

impl AnalysisRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a snippet with its completed analysis in a single insert.
    /// The store assigns `id` and `created_at`.
    pub async fn insert(
        &self,
        snippet: &SnippetSubmission,
        analysis: &CodeAnalysis,
    ) -> ApiResult<SnippetAnalysisRecord> {
        let id = Uuid::new_v4().to_string();
        let analysis_json = serde_json::to_string(analysis)
            .map_err(|e| ApiError::internal_error(format!("Failed to encode analysis: {}", e)))?;

        sqlx::query(
            r#"INSERT INTO snippet_analyses (id, code, language, title, analysis_json, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&id)
        .bind(&snippet.code)
        .bind(&snippet.language)
        .bind(&snippet.title)
        .bind(&analysis_json)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        let row = sqlx::query_as::<_, SnippetAnalysisRow>(
            r#"SELECT id, code, language, title, analysis_json, created_at
               FROM snippet_analyses WHERE id = ?"#,
        )
        .bind(&id)
        .fetch_one(&self.pool)
        .await?;

        Self::decode(row)
    }

    /// Every stored record in insertion order, capped at the `limit` most recent
    pub async fn list_all(&self, limit: u32) -> ApiResult<Vec<SnippetAnalysisRecord>> {
        let rows = sqlx::query_as::<_, SnippetAnalysisRow>(
            r#"SELECT id, code, language, title, analysis_json, created_at
               FROM (SELECT * FROM snippet_analyses ORDER BY seq DESC LIMIT ?)
               ORDER BY seq ASC"#,
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Self::decode).collect()
    }

    pub async fn count(&self) -> ApiResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM snippet_analyses")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Cheap round trip used by the readiness probe
    pub async fn ping(&self) -> ApiResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn decode(row: SnippetAnalysisRow) -> ApiResult<SnippetAnalysisRecord> {
        let id = row.id.clone();
        SnippetAnalysisRecord::try_from(row).map_err(|e| {
            tracing::error!("Stored analysis for record {} is not valid JSON: {}", id, e);
            sqlx::Error::Decode(Box::new(e)).into()
        })
    }
}
