use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::core::error::AppError;
use crate::features::issues::models::{Issue, IssueCategory, IssueLocation, IssueStatus};
use crate::shared::constants::{ALLOWED_IMAGE_TYPES, MAX_IMAGE_SIZE};

/// Response DTO for an issue
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IssueResponseDto {
    pub id: Uuid,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    /// Photo URL, empty when no photo was attached
    pub image_url: String,
    pub location: IssueLocation,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Issue> for IssueResponseDto {
    fn from(issue: Issue) -> Self {
        let location = issue.location();
        Self {
            id: issue.id,
            reporter_id: issue.reporter_id,
            title: issue.title,
            description: issue.description,
            category: issue.category,
            image_url: issue.image_url,
            location,
            status: issue.status,
            created_at: issue.created_at,
            updated_at: issue.updated_at,
        }
    }
}

/// Text fields of a new issue, as collected from the multipart form
#[derive(Debug, Clone, Default, Validate)]
pub struct CreateIssueDto {
    #[validate(custom(function = "not_blank", message = "title is required"))]
    pub title: String,
    #[validate(custom(function = "not_blank", message = "description is required"))]
    pub description: String,
    /// One of garbage, road, water, electricity, other; blank means other
    pub category: Option<String>,
    /// JSON-serialized `{lat, lng, address}`
    pub location: Option<String>,
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required"));
    }
    Ok(())
}

/// Photo attached to a new issue
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl ImageUpload {
    /// Reject photos the storage collaborator must never see
    pub fn check(&self) -> Result<(), AppError> {
        if self.data.len() > MAX_IMAGE_SIZE {
            return Err(AppError::BadRequest(format!(
                "Image too large. Maximum size is {} MB",
                MAX_IMAGE_SIZE / 1024 / 1024
            )));
        }

        if !ALLOWED_IMAGE_TYPES.contains(&self.content_type.as_str()) {
            return Err(AppError::BadRequest(format!(
                "Image type '{}' is not allowed. Allowed types: {}",
                self.content_type,
                ALLOWED_IMAGE_TYPES.join(", ")
            )));
        }

        Ok(())
    }
}

/// Create issue form, for OpenAPI documentation only.
/// The handler reads the multipart body field by field.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct CreateIssueForm {
    #[schema(example = "Overflowing bin")]
    pub title: String,
    #[schema(example = "The bin on the corner has not been emptied for a week")]
    pub description: String,
    #[schema(example = "garbage")]
    pub category: Option<String>,
    /// JSON-serialized location
    #[schema(example = r#"{"lat":-6.2,"lng":106.8,"address":"Jl. Sudirman 1"}"#)]
    pub location: Option<String>,
    /// Optional photo (jpeg, png, gif or webp, at most 10MB)
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub image: Option<String>,
}

/// Request DTO for updating issue status
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateIssueStatusDto {
    /// "Pending", "In Progress" or "Resolved"; anything else is rejected
    #[serde(default)]
    #[schema(value_type = String, example = "In Progress")]
    pub status: Option<Value>,
}

impl UpdateIssueStatusDto {
    /// The submitted status as text; non-string values read as empty and
    /// fail status parsing like any other unknown value
    pub fn status_text(&self) -> &str {
        self.status.as_ref().and_then(Value::as_str).unwrap_or("")
    }
}

/// Query filters for the public issue list
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
pub struct ListIssuesQuery {
    /// Exact status to match, e.g. "Resolved"
    pub status: Option<String>,
    /// Exact category to match, e.g. "road"
    pub category: Option<String>,
}
