use async_trait::async_trait;
use uuid::Uuid;

use crate::core::error::Result;
use crate::features::issues::models::{
    Issue, IssueChanges, IssueFilter, IssueWithReporter, NewIssue, ReporterProfile,
};

#[cfg(test)]
mod memory;
mod postgres;

#[cfg(test)]
pub use memory::InMemoryIssueRepository;
pub use postgres::PgIssueRepository;

/// Persistence seam for issues and the reporter identities shown in exports
#[async_trait]
pub trait IssueRepository: Send + Sync {
    /// Store a new issue; the stored row gets `Pending` status and fresh timestamps
    async fn insert(&self, issue: NewIssue) -> Result<Issue>;

    /// Issues matching `filter`, newest first
    async fn find_by_filter(&self, filter: &IssueFilter) -> Result<Vec<Issue>>;

    /// Issues reported by `reporter_id`, newest first
    async fn find_by_reporter(&self, reporter_id: &str) -> Result<Vec<Issue>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Issue>>;

    /// Apply `changes` and refresh `updated_at`; `NotFound` when no issue has `id`
    async fn update(&self, id: Uuid, changes: IssueChanges) -> Result<Issue>;

    /// Every issue in creation order, joined with its reporter's name and email
    async fn find_all_with_reporter_identity(&self) -> Result<Vec<IssueWithReporter>>;

    /// Record the latest known display identity of a reporter
    async fn upsert_reporter(&self, profile: &ReporterProfile) -> Result<()>;
}
