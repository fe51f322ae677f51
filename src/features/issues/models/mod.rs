mod issue;

pub use issue::{
    Issue, IssueCategory, IssueChanges, IssueFilter, IssueLocation, IssueStatus,
    IssueWithReporter, NewIssue, ReporterProfile, UNRESOLVED_REPORTER,
};
