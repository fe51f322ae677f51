pub mod csv_export;
mod issue_service;

pub use issue_service::{CsvExport, IssueService};
