// =============================================================================
// ROLE CONSTANTS
// =============================================================================

/// Admin role - can change issue status and export issues
pub const ROLE_ADMIN: &str = "admin";

// =============================================================================
// ISSUE PHOTOS
// =============================================================================

/// Image types accepted for an issue photo
pub const ALLOWED_IMAGE_TYPES: &[&str] = &["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Maximum issue photo size in bytes (10MB)
pub const MAX_IMAGE_SIZE: usize = 10 * 1024 * 1024;

/// Filename suggested to clients for the CSV export
pub const EXPORT_FILENAME: &str = "issues.csv";
