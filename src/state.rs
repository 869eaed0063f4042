use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::provider::AuthProvider;

/// Shared application state injected into handlers and middleware.
///
/// Built once at startup; everything request-scoped hangs off this via
/// `axum::extract::State` instead of per-handler client construction.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub auth: Arc<dyn AuthProvider>,
}

impl AppState {
    pub fn new(pool: PgPool, auth: Arc<dyn AuthProvider>) -> Self {
        Self { pool, auth }
    }
}
