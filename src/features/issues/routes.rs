use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, patch, post},
    Router,
};

use crate::features::issues::handlers;
use crate::features::issues::services::IssueService;
use crate::shared::constants::MAX_IMAGE_SIZE;

/// Room for the text fields and multipart framing around a full-size photo
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

/// Routes anyone may call
pub fn public_routes(service: Arc<IssueService>) -> Router {
    Router::new()
        .route("/api/issues", get(handlers::list_issues))
        .with_state(service)
}

/// Routes that need an authenticated caller (auth middleware is applied by the caller)
pub fn protected_routes(service: Arc<IssueService>) -> Router {
    Router::new()
        .route(
            "/api/issues",
            post(handlers::create_issue)
                .layer(DefaultBodyLimit::max(MAX_IMAGE_SIZE + MULTIPART_OVERHEAD)),
        )
        .route("/api/issues/my", get(handlers::list_my_issues))
        .route(
            "/api/issues/{id}/status",
            patch(handlers::update_issue_status),
        )
        .route("/api/issues/export/csv", get(handlers::export_issues_csv))
        .with_state(service)
}
