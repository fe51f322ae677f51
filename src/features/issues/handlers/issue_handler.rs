use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use tracing::debug;

use crate::core::error::{AppError, Result};
use crate::core::extractor::{AppJson, AppMultipart, AppQuery};
use crate::features::auth::guards::RequireAdmin;
use crate::features::auth::model::AuthenticatedUser;
use crate::features::issues::dtos::{
    CreateIssueDto, CreateIssueForm, ImageUpload, IssueResponseDto, ListIssuesQuery,
    UpdateIssueStatusDto,
};
use crate::features::issues::models::IssueFilter;
use crate::features::issues::services::IssueService;
use crate::shared::types::ApiResponse;

async fn read_text(field: axum::extract::multipart::Field<'_>, name: &str) -> Result<String> {
    field.text().await.map_err(|e| {
        AppError::BadRequest(format!("Failed to read {} field: {}", name, e))
    })
}

/// Report a new issue
///
/// Accepts multipart/form-data with `title`, `description`, optional
/// `category`, optional `location` (JSON string) and an optional `image` file.
#[utoipa::path(
    post,
    path = "/api/issues",
    tag = "issues",
    request_body(
        content = CreateIssueForm,
        content_type = "multipart/form-data",
        description = "Issue fields plus an optional photo",
    ),
    responses(
        (status = 201, description = "Issue reported", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Missing fields, invalid category, location or photo"),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Error reporting issue")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_issue(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
    AppMultipart(mut multipart): AppMultipart,
) -> Result<(StatusCode, Json<ApiResponse<IssueResponseDto>>)> {
    let mut input = CreateIssueDto::default();
    let mut image: Option<ImageUpload> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        debug!("Failed to read multipart field: {}", e);
        AppError::BadRequest(format!("Failed to read multipart data: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "title" => input.title = read_text(field, "title").await?,
            "description" => input.description = read_text(field, "description").await?,
            "category" => input.category = Some(read_text(field, "category").await?),
            "location" => input.location = Some(read_text(field, "location").await?),
            "image" => {
                let content_type = field
                    .content_type()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "application/octet-stream".to_string());
                let filename = field
                    .file_name()
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "image".to_string());

                let data = field.bytes().await.map_err(|e| {
                    debug!("Failed to read image bytes: {}", e);
                    AppError::BadRequest(format!("Failed to read image data: {}", e))
                })?;

                // Browsers send an empty part when no file was picked
                if !data.is_empty() {
                    image = Some(ImageUpload {
                        data: data.to_vec(),
                        filename,
                        content_type,
                    });
                }
            }
            _ => debug!("Ignoring unknown field: {}", field_name),
        }
    }

    let issue = service.create(&user, input, image).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            Some(issue.into()),
            Some("Issue reported".to_string()),
            None,
        )),
    ))
}

/// List issues (public)
#[utoipa::path(
    get,
    path = "/api/issues",
    tag = "issues",
    params(ListIssuesQuery),
    responses(
        (status = 200, description = "Matching issues, newest first", body = ApiResponse<Vec<IssueResponseDto>>),
        (status = 500, description = "Error fetching issues")
    )
)]
pub async fn list_issues(
    State(service): State<Arc<IssueService>>,
    AppQuery(query): AppQuery<ListIssuesQuery>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    let filter = IssueFilter::new(query.status, query.category);
    let issues = service.list(filter).await?;
    let dtos: Vec<IssueResponseDto> = issues.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}

/// List the caller's own issues
#[utoipa::path(
    get,
    path = "/api/issues/my",
    tag = "issues",
    responses(
        (status = 200, description = "Issues reported by the caller", body = ApiResponse<Vec<IssueResponseDto>>),
        (status = 401, description = "Authentication required"),
        (status = 500, description = "Error fetching your issues")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_my_issues(
    user: AuthenticatedUser,
    State(service): State<Arc<IssueService>>,
) -> Result<Json<ApiResponse<Vec<IssueResponseDto>>>> {
    let issues = service.list_mine(&user).await?;
    let dtos: Vec<IssueResponseDto> = issues.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::list(dtos)))
}

/// Update issue status (admin only)
#[utoipa::path(
    patch,
    path = "/api/issues/{id}/status",
    tag = "issues",
    params(
        ("id" = String, Path, description = "Issue ID")
    ),
    request_body = UpdateIssueStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<IssueResponseDto>),
        (status = 400, description = "Invalid status value"),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "Issue not found"),
        (status = 500, description = "Error updating issue status")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_issue_status(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<IssueService>>,
    Path(id): Path<String>,
    AppJson(dto): AppJson<UpdateIssueStatusDto>,
) -> Result<Json<ApiResponse<IssueResponseDto>>> {
    let issue = service
        .update_status(&admin, &id, dto.status_text())
        .await?;
    Ok(Json(ApiResponse::success(
        Some(issue.into()),
        Some("Status updated".to_string()),
        None,
    )))
}

/// Export every issue as CSV (admin only)
#[utoipa::path(
    get,
    path = "/api/issues/export/csv",
    tag = "issues",
    responses(
        (status = 200, description = "CSV attachment", content_type = "text/csv", body = String),
        (status = 401, description = "Authentication required"),
        (status = 403, description = "Admin access required"),
        (status = 404, description = "No issues found to export"),
        (status = 500, description = "Error exporting CSV")
    ),
    security(("bearer_auth" = []))
)]
pub async fn export_issues_csv(
    RequireAdmin(admin): RequireAdmin,
    State(service): State<Arc<IssueService>>,
) -> Result<Response> {
    let export = service.export_csv(&admin).await?;
    let disposition = format!("attachment; filename=\"{}\"", export.filename);

    Ok((
        [
            (header::CONTENT_TYPE, export.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}
