use std::sync::Arc;

use uuid::Uuid;
use validator::Validate;

use super::csv_export;
use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AdminCapability, AuthenticatedUser};
use crate::features::issues::dtos::{CreateIssueDto, ImageUpload};
use crate::features::issues::models::{
    Issue, IssueCategory, IssueChanges, IssueFilter, IssueLocation, IssueStatus, NewIssue,
    ReporterProfile,
};
use crate::features::issues::repositories::IssueRepository;
use crate::modules::storage::ImageStorage;
use crate::shared::constants::EXPORT_FILENAME;
use crate::shared::validation::validation_messages;

const CREATE_FAILED: &str = "Error reporting issue";
const LIST_FAILED: &str = "Error fetching issues";
const LIST_MINE_FAILED: &str = "Error fetching your issues";
const UPDATE_STATUS_FAILED: &str = "Error updating issue status";
const EXPORT_FAILED: &str = "Error exporting CSV";

/// A rendered CSV export ready to be sent as an attachment
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub filename: &'static str,
    pub content_type: &'static str,
    pub body: String,
}

/// Keep caller-facing errors; log anything else and replace it with the
/// operation's generic message
fn collapse(message: &'static str) -> impl Fn(AppError) -> AppError {
    move |e| {
        if e.is_client_error() {
            e
        } else {
            tracing::error!("{}: {}", message, e);
            AppError::Internal(message.to_string())
        }
    }
}

/// Service for issue operations
pub struct IssueService {
    repository: Arc<dyn IssueRepository>,
    storage: Arc<dyn ImageStorage>,
}

impl IssueService {
    pub fn new(repository: Arc<dyn IssueRepository>, storage: Arc<dyn ImageStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    /// Report a new issue owned by `reporter`.
    ///
    /// Input is fully validated before the photo is uploaded, so a rejected
    /// report never leaves an orphaned object behind.
    pub async fn create(
        &self,
        reporter: &AuthenticatedUser,
        input: CreateIssueDto,
        image: Option<ImageUpload>,
    ) -> Result<Issue> {
        if let Err(errors) = input.validate() {
            let messages = validation_messages(&errors);
            return Err(AppError::Validation(messages.join(", ")));
        }

        let category = match input.category.as_deref().map(str::trim) {
            None | Some("") => IssueCategory::default(),
            Some(raw) => raw.parse::<IssueCategory>()?,
        };
        let location = IssueLocation::parse(input.location.as_deref())?;

        if let Some(image) = &image {
            image.check()?;
        }

        let image_url = match image {
            Some(image) => Some(
                self.storage
                    .store_image(
                        image.data,
                        &image.filename,
                        &image.content_type,
                        &reporter.sub,
                    )
                    .await
                    .map_err(collapse(CREATE_FAILED))?,
            ),
            None => None,
        };

        let new_issue = NewIssue::new(
            &reporter.sub,
            input.title,
            input.description,
            category,
            image_url,
            location,
        )?;

        self.record_reporter(reporter).await;

        let issue = self
            .repository
            .insert(new_issue)
            .await
            .map_err(collapse(CREATE_FAILED))?;

        tracing::info!("Created issue {} for reporter {}", issue.id, issue.reporter_id);

        Ok(issue)
    }

    /// Mirror the caller's display identity for the export; never fails the caller
    async fn record_reporter(&self, reporter: &AuthenticatedUser) {
        if reporter.name.is_none() && reporter.email.is_none() {
            return;
        }

        let profile = ReporterProfile {
            id: reporter.sub.clone(),
            name: reporter.name.clone(),
            email: reporter.email.clone(),
        };

        if let Err(e) = self.repository.upsert_reporter(&profile).await {
            tracing::warn!("Failed to record reporter {}: {}", reporter.sub, e);
        }
    }

    /// All issues matching `filter`, newest first
    pub async fn list(&self, filter: IssueFilter) -> Result<Vec<Issue>> {
        self.repository
            .find_by_filter(&filter)
            .await
            .map_err(collapse(LIST_FAILED))
    }

    /// Issues reported by the caller, newest first
    pub async fn list_mine(&self, user: &AuthenticatedUser) -> Result<Vec<Issue>> {
        self.repository
            .find_by_reporter(&user.sub)
            .await
            .map_err(collapse(LIST_MINE_FAILED))
    }

    pub async fn update_status(
        &self,
        admin: &AdminCapability,
        id: &str,
        raw_status: &str,
    ) -> Result<Issue> {
        let status: IssueStatus = raw_status.parse()?;

        let not_found = || AppError::NotFound("Issue not found".to_string());
        let id = Uuid::parse_str(id).map_err(|_| not_found())?;

        self.repository
            .find_by_id(id)
            .await
            .map_err(collapse(UPDATE_STATUS_FAILED))?
            .ok_or_else(not_found)?;

        let issue = self
            .repository
            .update(
                id,
                IssueChanges {
                    status: Some(status),
                },
            )
            .await
            .map_err(collapse(UPDATE_STATUS_FAILED))?;

        tracing::info!(
            "Updated issue status: {} -> {} by {}",
            issue.id,
            issue.status,
            admin.sub()
        );

        Ok(issue)
    }

    pub async fn export_csv(&self, admin: &AdminCapability) -> Result<CsvExport> {
        let rows = self
            .repository
            .find_all_with_reporter_identity()
            .await
            .map_err(collapse(EXPORT_FAILED))?;

        if rows.is_empty() {
            return Err(AppError::NotFound("No issues found to export".to_string()));
        }

        let body = csv_export::render(&rows).map_err(|e| {
            tracing::error!("{}: {}", EXPORT_FAILED, e);
            AppError::Internal(EXPORT_FAILED.to_string())
        })?;

        tracing::info!("Exported {} issues for {}", rows.len(), admin.sub());

        Ok(CsvExport {
            filename: EXPORT_FILENAME,
            content_type: "text/csv; charset=utf-8",
            body,
        })
    }
}
