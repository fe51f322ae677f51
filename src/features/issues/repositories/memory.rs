//! In-memory issue store for service and handler tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::IssueRepository;
use crate::core::error::{AppError, Result};
use crate::features::issues::models::{
    Issue, IssueChanges, IssueFilter, IssueStatus, IssueWithReporter, NewIssue, ReporterProfile,
};

#[derive(Default)]
pub struct InMemoryIssueRepository {
    issues: RwLock<HashMap<Uuid, Issue>>,
    reporters: RwLock<HashMap<String, ReporterProfile>>,
    clock: RwLock<Option<DateTime<Utc>>>,
    fail: AtomicBool,
    fail_reporters: AtomicBool,
}

impl InMemoryIssueRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every issue operation fail as an unreachable database would
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Make only reporter upserts fail
    pub fn set_reporters_failing(&self, fail: bool) {
        self.fail_reporters.store(fail, Ordering::SeqCst);
    }

    pub async fn reporter(&self, id: &str) -> Option<ReporterProfile> {
        self.reporters.read().await.get(id).cloned()
    }

    pub async fn count(&self) -> usize {
        self.issues.read().await.len()
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Strictly increasing timestamps so ordering is deterministic
    async fn tick(&self) -> DateTime<Utc> {
        let mut clock = self.clock.write().await;
        let now = match *clock {
            Some(last) if last >= Utc::now() => last + Duration::milliseconds(1),
            _ => Utc::now(),
        };
        *clock = Some(now);
        now
    }

    fn newest_first(mut issues: Vec<Issue>) -> Vec<Issue> {
        issues.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        issues
    }
}

#[async_trait]
impl IssueRepository for InMemoryIssueRepository {
    async fn insert(&self, issue: NewIssue) -> Result<Issue> {
        self.check()?;
        let now = self.tick().await;
        let stored = Issue {
            id: issue.id,
            reporter_id: issue.reporter_id,
            title: issue.title,
            description: issue.description,
            category: issue.category,
            image_url: issue.image_url,
            location_lat: issue.location.lat,
            location_lng: issue.location.lng,
            location_address: issue.location.address,
            status: IssueStatus::Pending,
            created_at: now,
            updated_at: now,
        };
        self.issues.write().await.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_filter(&self, filter: &IssueFilter) -> Result<Vec<Issue>> {
        self.check()?;
        let issues = self.issues.read().await;
        Ok(Self::newest_first(
            issues.values().filter(|i| filter.matches(i)).cloned().collect(),
        ))
    }

    async fn find_by_reporter(&self, reporter_id: &str) -> Result<Vec<Issue>> {
        self.check()?;
        let issues = self.issues.read().await;
        Ok(Self::newest_first(
            issues
                .values()
                .filter(|i| i.reporter_id == reporter_id)
                .cloned()
                .collect(),
        ))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Issue>> {
        self.check()?;
        Ok(self.issues.read().await.get(&id).cloned())
    }

    async fn update(&self, id: Uuid, changes: IssueChanges) -> Result<Issue> {
        self.check()?;
        let now = self.tick().await;
        let mut issues = self.issues.write().await;
        let issue = issues
            .get_mut(&id)
            .ok_or_else(|| AppError::NotFound("Issue not found".to_string()))?;

        if let Some(status) = changes.status {
            issue.status = status;
        }
        issue.updated_at = now;
        Ok(issue.clone())
    }

    async fn find_all_with_reporter_identity(&self) -> Result<Vec<IssueWithReporter>> {
        self.check()?;
        let issues = self.issues.read().await;
        let reporters = self.reporters.read().await;

        let mut all: Vec<Issue> = issues.values().cloned().collect();
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));

        Ok(all
            .into_iter()
            .map(|issue| {
                let profile = reporters.get(&issue.reporter_id);
                IssueWithReporter::new(
                    issue,
                    profile.and_then(|p| p.name.clone()),
                    profile.and_then(|p| p.email.clone()),
                )
            })
            .collect())
    }

    async fn upsert_reporter(&self, profile: &ReporterProfile) -> Result<()> {
        self.check()?;
        if self.fail_reporters.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }

        let mut reporters = self.reporters.write().await;
        let entry = reporters
            .entry(profile.id.clone())
            .or_insert_with(|| ReporterProfile {
                id: profile.id.clone(),
                name: None,
                email: None,
            });
        if profile.name.is_some() {
            entry.name = profile.name.clone();
        }
        if profile.email.is_some() {
            entry.email = profile.email.clone();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::{IssueCategory, IssueLocation};

    fn new_issue(reporter: &str, title: &str) -> NewIssue {
        NewIssue::new(
            reporter,
            title.to_string(),
            "details".to_string(),
            IssueCategory::Road,
            None,
            IssueLocation::default(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_export_oldest_first() {
        let repo = InMemoryIssueRepository::new();
        repo.insert(new_issue("a", "first")).await.unwrap();
        repo.insert(new_issue("a", "second")).await.unwrap();

        let listed = repo.find_by_filter(&IssueFilter::default()).await.unwrap();
        assert_eq!(listed[0].title, "second");

        let exported = repo.find_all_with_reporter_identity().await.unwrap();
        assert_eq!(exported[0].issue.title, "first");
    }

    #[tokio::test]
    async fn test_upsert_keeps_known_fields() {
        let repo = InMemoryIssueRepository::new();
        let id = "r1".to_string();
        repo.upsert_reporter(&ReporterProfile {
            id: id.clone(),
            name: Some("Rita".into()),
            email: Some("rita@mail.test".into()),
        })
        .await
        .unwrap();
        repo.upsert_reporter(&ReporterProfile {
            id: id.clone(),
            name: None,
            email: Some("rita@new.test".into()),
        })
        .await
        .unwrap();

        let profile = repo.reporter(&id).await.unwrap();
        assert_eq!(profile.name.as_deref(), Some("Rita"));
        assert_eq!(profile.email.as_deref(), Some("rita@new.test"));
    }

    #[tokio::test]
    async fn test_update_unknown_issue_is_not_found() {
        let repo = InMemoryIssueRepository::new();
        let err = repo
            .update(Uuid::now_v7(), IssueChanges::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
