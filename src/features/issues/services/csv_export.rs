use chrono::{DateTime, Utc};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use thiserror::Error;

use crate::features::issues::models::IssueWithReporter;

/// Export column order; clients parse by position
pub const HEADERS: [&str; 8] = [
    "Reported By",
    "Email",
    "Title",
    "Description",
    "Category",
    "Status",
    "Created At",
    "Address",
];

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("CSV write error: {0}")]
    Write(#[from] csv::Error),

    #[error("CSV flush error: {0}")]
    Flush(#[from] std::io::Error),

    #[error("CSV output is not UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// `3/7/2025, 2:05:09 PM`
pub fn format_created_at(at: &DateTime<Utc>) -> String {
    at.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
}

/// Render a header line plus one line per row
pub fn render(rows: &[IssueWithReporter]) -> Result<String, CsvExportError> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADERS)?;

    for row in rows {
        let issue = &row.issue;
        let created_at = format_created_at(&issue.created_at);
        writer.write_record([
            row.reporter_name.as_str(),
            row.reporter_email.as_str(),
            issue.title.as_str(),
            issue.description.as_str(),
            issue.category.as_str(),
            issue.status.as_str(),
            created_at.as_str(),
            issue.location_address.as_deref().unwrap_or(""),
        ])?;
    }

    let bytes = writer.into_inner().map_err(|e| e.into_error())?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::issues::models::{Issue, IssueCategory, IssueStatus};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn issue(title: &str, description: &str, address: Option<&str>) -> Issue {
        let at = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        Issue {
            id: Uuid::now_v7(),
            reporter_id: "citizen-1".to_string(),
            title: title.to_string(),
            description: description.to_string(),
            category: IssueCategory::Water,
            image_url: String::new(),
            location_lat: None,
            location_lng: None,
            location_address: address.map(str::to_string),
            status: IssueStatus::InProgress,
            created_at: at,
            updated_at: at,
        }
    }

    fn parse(body: &str) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .from_reader(body.as_bytes())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_created_at_uses_us_locale_style() {
        let morning = Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 1).unwrap();
        assert_eq!(format_created_at(&morning), "12/25/2024, 12:00:01 AM");

        let afternoon = Utc.with_ymd_and_hms(2025, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(format_created_at(&afternoon), "3/7/2025, 2:05:09 PM");
    }

    #[test]
    fn test_header_only_for_no_rows() {
        let body = render(&[]).unwrap();
        assert_eq!(
            body,
            "Reported By,Email,Title,Description,Category,Status,Created At,Address\n"
        );
    }

    #[test]
    fn test_row_columns_follow_header_order() {
        let rows = vec![IssueWithReporter::new(
            issue("Leaking main", "Water everywhere", Some("Jl. Merdeka 5")),
            Some("Carl Citizen".to_string()),
            Some("carl@mail.test".to_string()),
        )];

        let body = render(&rows).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            "Carl Citizen,carl@mail.test,Leaking main,Water everywhere,water,In Progress,\"3/7/2025, 2:05:09 PM\",Jl. Merdeka 5"
        );
    }

    #[test]
    fn test_unresolved_reporter_and_missing_address() {
        let rows = vec![IssueWithReporter::new(issue("Pothole", "Deep", None), None, None)];

        let records = parse(&render(&rows).unwrap());
        assert_eq!(records[1][0], "N/A");
        assert_eq!(records[1][1], "N/A");
        assert_eq!(records[1][7], "");
    }

    #[test]
    fn test_special_characters_are_quoted() {
        let rows = vec![IssueWithReporter::new(
            issue("Sign says \"STOP\"", "line one,\nline two", Some("Corner of A, B")),
            Some("Dee".to_string()),
            Some("dee@mail.test".to_string()),
        )];

        let body = render(&rows).unwrap();
        assert!(body.contains("\"Sign says \"\"STOP\"\"\""));

        let records = parse(&body);
        assert_eq!(records.len(), 2);
        assert_eq!(records[1][2], "Sign says \"STOP\"");
        assert_eq!(records[1][3], "line one,\nline two");
        assert_eq!(records[1][7], "Corner of A, B");
    }
}
