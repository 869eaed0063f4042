pub mod agency_service;
pub mod invitation_service;
pub mod notification_service;
pub mod user_service;

use thiserror::Error;

/// Data-access error that keeps true absence distinguishable from
/// transient failure. Read paths return `Ok(None)` only when the row
/// genuinely does not exist.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}
