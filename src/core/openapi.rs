use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::auth;
use crate::features::issues::{
    dtos as issues_dtos, handlers as issues_handlers, models as issues_models,
};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Auth
        auth::handler::get_me,
        // Issues
        issues_handlers::create_issue,
        issues_handlers::list_issues,
        issues_handlers::list_my_issues,
        issues_handlers::update_issue_status,
        issues_handlers::export_issues_csv,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Auth
            auth::dto::MeResponseDto,
            auth::model::AuthenticatedUser,
            ApiResponse<auth::dto::MeResponseDto>,
            // Issues
            issues_models::IssueStatus,
            issues_models::IssueCategory,
            issues_models::IssueLocation,
            issues_dtos::IssueResponseDto,
            issues_dtos::CreateIssueForm,
            issues_dtos::UpdateIssueStatusDto,
            ApiResponse<issues_dtos::IssueResponseDto>,
            ApiResponse<Vec<issues_dtos::IssueResponseDto>>,
        )
    ),
    tags(
        (name = "auth", description = "Caller identity"),
        (name = "issues", description = "Civic issue reporting and triage"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Civic Issues API",
        version = "0.1.0",
        description = "Report civic issues, triage them and export them as CSV",
    )
)]
pub struct ApiDoc;

/// Adds the Bearer JWT security scheme to the document
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Overrides the document info with the configured Swagger settings
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
