use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::IssueRepository;
use crate::core::error::{AppError, Result};
use crate::features::issues::models::{
    Issue, IssueChanges, IssueFilter, IssueWithReporter, NewIssue, ReporterProfile,
};

const ISSUE_COLUMNS: &str = r#"
    id, reporter_id, title, description, category, image_url,
    location_lat, location_lng, location_address,
    status, created_at, updated_at
"#;

/// Postgres-backed issue store
#[derive(Clone)]
pub struct PgIssueRepository {
    pool: PgPool,
}

impl PgIssueRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct IssueWithReporterRow {
    #[sqlx(flatten)]
    issue: Issue,
    reporter_name: Option<String>,
    reporter_email: Option<String>,
}

/// Constraint violations are caller mistakes; everything else stays a database error
fn map_db_error(context: &str, e: sqlx::Error) -> AppError {
    let code = e
        .as_database_error()
        .and_then(|db| db.code())
        .map(|c| c.into_owned());

    match code.as_deref() {
        // check_violation, not_null_violation
        Some("23514") | Some("23502") => {
            tracing::warn!("{}: constraint violated: {:?}", context, e);
            AppError::Validation("Issue failed validation".to_string())
        }
        _ => {
            tracing::error!("{}: {:?}", context, e);
            AppError::Database(e)
        }
    }
}

#[async_trait]
impl IssueRepository for PgIssueRepository {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        let sql = format!(
            r#"
            INSERT INTO issues (
                id, reporter_id, title, description, category, image_url,
                location_lat, location_lng, location_address
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {ISSUE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(issue.id)
            .bind(&issue.reporter_id)
            .bind(&issue.title)
            .bind(&issue.description)
            .bind(issue.category)
            .bind(&issue.image_url)
            .bind(issue.location.lat)
            .bind(issue.location.lng)
            .bind(&issue.location.address)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to insert issue", e))
    }

    async fn find_by_filter(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        // Text comparison keeps unknown filter values from failing the enum cast
        let sql = format!(
            r#"
            SELECT {ISSUE_COLUMNS}
            FROM issues
            WHERE ($1::text IS NULL OR status::text = $1)
              AND ($2::text IS NULL OR category::text = $2)
            ORDER BY created_at DESC, id DESC
            "#
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(filter.status.as_deref())
            .bind(filter.category.as_deref())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list issues", e))
    }

    async fn find_by_reporter(&self, reporter_id: &str) -> Result<Vec<Issue>> {
        let sql = format!(
            r#"
            SELECT {ISSUE_COLUMNS}
            FROM issues
            WHERE reporter_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(reporter_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to list reporter issues", e))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Issue>> {
        let sql = format!("SELECT {ISSUE_COLUMNS} FROM issues WHERE id = $1");

        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to fetch issue", e))
    }

    async fn update(&self, id: Uuid, changes: IssueChanges) -> Result<Issue> {
        let sql = format!(
            r#"
            UPDATE issues
            SET status = COALESCE($2, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {ISSUE_COLUMNS}
            "#
        );

        sqlx::query_as::<_, Issue>(&sql)
            .bind(id)
            .bind(changes.status)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_db_error("Failed to update issue", e))?
            .ok_or_else(|| AppError::NotFound("Issue not found".to_string()))
    }

    async fn find_all_with_reporter_identity(&self) -> Result<Vec<IssueWithReporter>> {
        let rows = sqlx::query_as::<_, IssueWithReporterRow>(
            r#"
            SELECT
                i.id, i.reporter_id, i.title, i.description, i.category, i.image_url,
                i.location_lat, i.location_lng, i.location_address,
                i.status, i.created_at, i.updated_at,
                r.name AS reporter_name,
                r.email AS reporter_email
            FROM issues i
            LEFT JOIN reporters r ON r.id = i.reporter_id
            ORDER BY i.created_at ASC, i.id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to load issues for export", e))?;

        Ok(rows
            .into_iter()
            .map(|row| IssueWithReporter::new(row.issue, row.reporter_name, row.reporter_email))
            .collect())
    }

    async fn upsert_reporter(&self, profile: &ReporterProfile) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO reporters (id, name, email)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET name = COALESCE(EXCLUDED.name, reporters.name),
                email = COALESCE(EXCLUDED.email, reporters.email),
                updated_at = NOW()
            "#,
        )
        .bind(&profile.id)
        .bind(&profile.name)
        .bind(&profile.email)
        .execute(&self.pool)
        .await
        .map_err(|e| map_db_error("Failed to upsert reporter", e))?;

        Ok(())
    }
}
