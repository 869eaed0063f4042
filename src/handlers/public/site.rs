use axum::extract::State;
use axum::response::Json;
use serde_json::{json, Value};

use crate::database::manager;
use crate::state::AppState;

/// GET / - the marketing landing payload: nav links plus the entry points
/// into the agency app.
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Aksara",
            "version": version,
            "description": "Agency management platform API",
            "nav": [
                { "name": "Features", "href": "#features" },
                { "name": "Solutions", "href": "#solutions" },
                { "name": "Pricing", "href": "#pricing" },
                { "name": "About", "href": "#about" }
            ],
            "actions": {
                "sign_in": "/agency/sign-in",
                "sign_up": "/agency/sign-up"
            }
        }
    }))
}

/// GET /health - liveness plus a database ping
pub async fn health(State(state): State<AppState>) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match manager::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

/// GET /agency/unauthorized - target of the role-mismatch redirect
pub async fn unauthorized() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "page": "unauthorized",
            "message": "You do not have access to this agency. Contact an agency owner to request access.",
            "back": "/"
        }
    }))
}
