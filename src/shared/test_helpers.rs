use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
    Router,
};
use tokio::sync::Mutex;

use crate::core::error::{AppError, Result};
use crate::features::auth::model::{AdminCapability, AuthenticatedUser};
use crate::modules::storage::ImageStorage;

/// Bearer token the test auth layer resolves to an admin
pub const ADMIN_TOKEN: &str = "test-admin-token";
/// Bearer token for a citizen whose token carries name and email
pub const CITIZEN_TOKEN: &str = "test-citizen-token";
/// Bearer token for a second citizen
pub const OTHER_CITIZEN_TOKEN: &str = "test-other-citizen-token";
/// Bearer token for a citizen whose token carries no display identity
pub const ANONYMOUS_CITIZEN_TOKEN: &str = "test-anonymous-token";

pub fn admin_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "admin-1".to_string(),
        name: Some("Ada Admin".to_string()),
        email: Some("ada@city.test".to_string()),
        roles: vec!["admin".to_string()],
    }
}

pub fn citizen_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "citizen-1".to_string(),
        name: Some("Carl Citizen".to_string()),
        email: Some("carl@mail.test".to_string()),
        roles: vec!["citizen".to_string()],
    }
}

pub fn other_citizen_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "citizen-2".to_string(),
        name: Some("Olga Other".to_string()),
        email: Some("olga@mail.test".to_string()),
        roles: vec!["citizen".to_string()],
    }
}

pub fn anonymous_citizen_user() -> AuthenticatedUser {
    AuthenticatedUser {
        sub: "citizen-anon".to_string(),
        name: None,
        email: None,
        roles: vec![],
    }
}

pub fn admin_capability() -> AdminCapability {
    admin_user()
        .admin_capability()
        .expect("test admin holds the admin role")
}

fn user_for_token(token: &str) -> Option<AuthenticatedUser> {
    match token {
        ADMIN_TOKEN => Some(admin_user()),
        CITIZEN_TOKEN => Some(citizen_user()),
        OTHER_CITIZEN_TOKEN => Some(other_citizen_user()),
        ANONYMOUS_CITIZEN_TOKEN => Some(anonymous_citizen_user()),
        _ => None,
    }
}

async fn inject_test_user(mut request: Request, next: Next) -> Response {
    let user = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .and_then(user_for_token);

    if let Some(user) = user {
        request.extensions_mut().insert(user);
    }
    next.run(request).await
}

/// Stand-in for the JWT middleware: known test tokens become users, anything
/// else leaves the request unauthenticated
pub fn with_test_auth(router: Router) -> Router {
    router.layer(axum::middleware::from_fn(inject_test_user))
}

/// Image storage double that records uploads and returns predictable URLs
#[derive(Default)]
pub struct FakeImageStorage {
    pub uploads: Mutex<Vec<(String, String, usize)>>,
    pub fail: bool,
}

impl FakeImageStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl ImageStorage for FakeImageStorage {
    async fn store_image(
        &self,
        data: Vec<u8>,
        original_filename: &str,
        content_type: &str,
        owner: &str,
    ) -> Result<String> {
        if self.fail {
            return Err(AppError::ExternalServiceError(
                "Image storage unavailable".to_string(),
            ));
        }
        let mut uploads = self.uploads.lock().await;
        uploads.push((
            original_filename.to_string(),
            content_type.to_string(),
            data.len(),
        ));
        Ok(format!(
            "https://images.test/issues/{}/{}-{}",
            owner,
            uploads.len(),
            original_filename
        ))
    }
}

pub fn fake_storage() -> Arc<FakeImageStorage> {
    Arc::new(FakeImageStorage::default())
}
