use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::core::error::AppError;

/// Triage state of an issue, matching the `issue_status` database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_status")]
pub enum IssueStatus {
    #[default]
    Pending,
    #[serde(rename = "In Progress")]
    #[sqlx(rename = "In Progress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueStatus::Pending => "Pending",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }
}

impl std::fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(IssueStatus::Pending),
            "In Progress" => Ok(IssueStatus::InProgress),
            "Resolved" => Ok(IssueStatus::Resolved),
            _ => Err(AppError::BadRequest("Invalid status value".to_string())),
        }
    }
}

/// Kind of civic problem, matching the `issue_category` database enum
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "issue_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum IssueCategory {
    Garbage,
    Road,
    Water,
    Electricity,
    #[default]
    Other,
}

impl IssueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueCategory::Garbage => "garbage",
            IssueCategory::Road => "road",
            IssueCategory::Water => "water",
            IssueCategory::Electricity => "electricity",
            IssueCategory::Other => "other",
        }
    }
}

impl std::fmt::Display for IssueCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "garbage" => Ok(IssueCategory::Garbage),
            "road" => Ok(IssueCategory::Road),
            "water" => Ok(IssueCategory::Water),
            "electricity" => Ok(IssueCategory::Electricity),
            "other" => Ok(IssueCategory::Other),
            _ => Err(AppError::Validation("Invalid category value".to_string())),
        }
    }
}

/// Where an issue was observed. Every part is optional; `{}` is a valid location.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct IssueLocation {
    #[serde(
        default,
        deserialize_with = "lenient_coordinate",
        skip_serializing_if = "Option::is_none"
    )]
    pub lat: Option<f64>,
    #[serde(
        default,
        deserialize_with = "lenient_coordinate",
        skip_serializing_if = "Option::is_none"
    )]
    pub lng: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

impl IssueLocation {
    /// Parse the serialized location sent with a new issue.
    ///
    /// Blank input and JSON `null` give the empty location; anything that is
    /// not a location object is a `BadRequest`.
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        let raw = match raw.map(str::trim) {
            None | Some("") => return Ok(Self::default()),
            Some(raw) => raw,
        };

        let invalid = |reason: String| {
            tracing::debug!("Rejected location payload: {}", reason);
            AppError::BadRequest("Invalid location format".to_string())
        };

        match serde_json::from_str::<serde_json::Value>(raw).map_err(|e| invalid(e.to_string()))? {
            serde_json::Value::Null => Ok(Self::default()),
            value @ serde_json::Value::Object(_) => {
                serde_json::from_value(value).map_err(|e| invalid(e.to_string()))
            }
            other => Err(invalid(format!("expected an object, got {}", other))),
        }
    }
}

/// Accepts numbers and numeric strings (form clients often send the latter)
fn lenient_coordinate<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Coordinate {
        Number(f64),
        Text(String),
    }

    match Option::<Coordinate>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Coordinate::Number(n)) => Ok(Some(n)),
        Some(Coordinate::Text(s)) if s.trim().is_empty() => Ok(None),
        Some(Coordinate::Text(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
    }
}

/// Database model for an issue
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Issue {
    pub id: Uuid,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub image_url: String,
    pub location_lat: Option<f64>,
    pub location_lng: Option<f64>,
    pub location_address: Option<String>,
    pub status: IssueStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Issue {
    pub fn location(&self) -> IssueLocation {
        IssueLocation {
            lat: self.location_lat,
            lng: self.location_lng,
            address: self.location_address.clone(),
        }
    }
}

/// A validated issue ready to be stored. `status` always starts as Pending.
#[derive(Debug, Clone)]
pub struct NewIssue {
    pub id: Uuid,
    pub reporter_id: String,
    pub title: String,
    pub description: String,
    pub category: IssueCategory,
    pub image_url: String,
    pub location: IssueLocation,
}

impl NewIssue {
    pub fn new(
        reporter_id: &str,
        title: String,
        description: String,
        category: IssueCategory,
        image_url: Option<String>,
        location: IssueLocation,
    ) -> Result<Self, AppError> {
        if title.trim().is_empty() {
            return Err(AppError::Validation("title is required".to_string()));
        }
        if description.trim().is_empty() {
            return Err(AppError::Validation("description is required".to_string()));
        }

        Ok(Self {
            id: Uuid::now_v7(),
            reporter_id: reporter_id.to_string(),
            title,
            description,
            category,
            image_url: image_url.unwrap_or_default(),
            location,
        })
    }
}

/// Fields an update may change; `None` leaves the stored value alone
#[derive(Debug, Clone, Default)]
pub struct IssueChanges {
    pub status: Option<IssueStatus>,
}

/// Listing criteria. Values are literal: anything outside the enumerations
/// matches no issue rather than being rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFilter {
    pub status: Option<String>,
    pub category: Option<String>,
}

impl IssueFilter {
    /// Blank values mean "no restriction"
    pub fn new(status: Option<String>, category: Option<String>) -> Self {
        let non_blank = |v: Option<String>| v.filter(|s| !s.is_empty());
        Self {
            status: non_blank(status),
            category: non_blank(category),
        }
    }

    pub fn matches(&self, issue: &Issue) -> bool {
        self.status
            .as_deref()
            .map_or(true, |s| s == issue.status.as_str())
            && self
                .category
                .as_deref()
                .map_or(true, |c| c == issue.category.as_str())
    }
}

/// Display identity of a reporter, mirrored from their access token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReporterProfile {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Shown instead of a reporter name or email that cannot be resolved
pub const UNRESOLVED_REPORTER: &str = "N/A";

/// An issue joined with its reporter's display identity
#[derive(Debug, Clone, PartialEq)]
pub struct IssueWithReporter {
    pub issue: Issue,
    pub reporter_name: String,
    pub reporter_email: String,
}

impl IssueWithReporter {
    pub fn new(issue: Issue, name: Option<String>, email: Option<String>) -> Self {
        let resolve = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNRESOLVED_REPORTER.to_string())
        };
        Self {
            issue,
            reporter_name: resolve(name),
            reporter_email: resolve(email),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parses_only_known_values() {
        assert_eq!("Pending".parse::<IssueStatus>().unwrap(), IssueStatus::Pending);
        assert_eq!(
            "In Progress".parse::<IssueStatus>().unwrap(),
            IssueStatus::InProgress
        );
        assert_eq!("Resolved".parse::<IssueStatus>().unwrap(), IssueStatus::Resolved);

        for invalid in ["Closed", "pending", "InProgress", ""] {
            let err = invalid.parse::<IssueStatus>().unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref m) if m == "Invalid status value"));
        }
    }

    #[test]
    fn test_status_serializes_with_display_names() {
        assert_eq!(
            serde_json::to_value(IssueStatus::InProgress).unwrap(),
            "In Progress"
        );
        assert_eq!(IssueStatus::default(), IssueStatus::Pending);
    }

    #[test]
    fn test_category_parses_only_known_values() {
        assert_eq!("road".parse::<IssueCategory>().unwrap(), IssueCategory::Road);
        assert_eq!(IssueCategory::default(), IssueCategory::Other);

        let err = "potholes".parse::<IssueCategory>().unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_location_parse_blank_is_empty() {
        assert_eq!(IssueLocation::parse(None).unwrap(), IssueLocation::default());
        assert_eq!(IssueLocation::parse(Some("  ")).unwrap(), IssueLocation::default());
        assert_eq!(IssueLocation::parse(Some("null")).unwrap(), IssueLocation::default());
        assert_eq!(IssueLocation::parse(Some("{}")).unwrap(), IssueLocation::default());
    }

    #[test]
    fn test_location_parse_accepts_numeric_strings() {
        let location =
            IssueLocation::parse(Some(r#"{"lat":"12.5","lng":-3,"address":"Main St"}"#)).unwrap();
        assert_eq!(location.lat, Some(12.5));
        assert_eq!(location.lng, Some(-3.0));
        assert_eq!(location.address.as_deref(), Some("Main St"));
    }

    #[test]
    fn test_location_parse_rejects_malformed_input() {
        for raw in ["{lat: 1", "[1,2]", "\"somewhere\"", r#"{"lat":"north"}"#] {
            let err = IssueLocation::parse(Some(raw)).unwrap_err();
            assert!(matches!(err, AppError::BadRequest(ref m) if m == "Invalid location format"));
        }
    }

    #[test]
    fn test_location_serializes_only_present_parts() {
        let location = IssueLocation {
            lat: None,
            lng: None,
            address: Some("Dock 4".to_string()),
        };
        assert_eq!(
            serde_json::to_value(&location).unwrap(),
            serde_json::json!({ "address": "Dock 4" })
        );
    }

    #[test]
    fn test_new_issue_requires_title_and_description() {
        let err = NewIssue::new(
            "u1",
            " ".to_string(),
            "desc".to_string(),
            IssueCategory::Other,
            None,
            IssueLocation::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "title is required"));

        let err = NewIssue::new(
            "u1",
            "title".to_string(),
            String::new(),
            IssueCategory::Other,
            None,
            IssueLocation::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(ref m) if m == "description is required"));
    }

    #[test]
    fn test_new_issue_defaults_image_url_to_empty() {
        let issue = NewIssue::new(
            "u1",
            "Broken light".to_string(),
            "Dark corner".to_string(),
            IssueCategory::Electricity,
            None,
            IssueLocation::default(),
        )
        .unwrap();
        assert_eq!(issue.image_url, "");
        assert_eq!(issue.reporter_id, "u1");
    }

    #[test]
    fn test_filter_treats_blank_as_unrestricted() {
        let filter = IssueFilter::new(Some(String::new()), Some("road".to_string()));
        assert_eq!(filter.status, None);
        assert_eq!(filter.category.as_deref(), Some("road"));
    }

    #[test]
    fn test_reporter_identity_falls_back_to_placeholder() {
        let now = Utc::now();
        let issue = Issue {
            id: Uuid::now_v7(),
            reporter_id: "gone".to_string(),
            title: "t".to_string(),
            description: "d".to_string(),
            category: IssueCategory::Other,
            image_url: String::new(),
            location_lat: None,
            location_lng: None,
            location_address: None,
            status: IssueStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let row = IssueWithReporter::new(issue, None, Some(" ".to_string()));
        assert_eq!(row.reporter_name, UNRESOLVED_REPORTER);
        assert_eq!(row.reporter_email, UNRESOLVED_REPORTER);
    }
}
