use std::sync::Arc;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use aksara_api::auth::provider::LocalAuthProvider;
use aksara_api::config;
use aksara_api::database::manager;
use aksara_api::handlers::{pages, protected, public};
use aksara_api::middleware::jwt_auth_middleware;
use aksara_api::state::AppState;

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    // Initialize configuration (this loads the config singleton)
    let config = config::config();

    tracing_subscriber::fmt::init();
    tracing::info!("Starting Aksara API in {:?} mode", config.environment);

    let pool = manager::connect(config)
        .unwrap_or_else(|e| panic!("failed to configure database pool: {}", e));
    let auth = Arc::new(LocalAuthProvider::new(pool.clone()));
    let state = AppState::new(pool, auth);

    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("AKSARA_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Aksara API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::site::root))
        .route("/health", get(public::site::health))
        // Public auth routes
        .merge(auth_public_routes())
        // Session-resolved pages with gate-driven redirects
        .merge(page_routes())
        // Protected JSON API
        .merge(api_routes())
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_public_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/agency/sign-in", post(public::auth::sign_in))
        .route("/agency/sign-up", post(public::auth::sign_up))
        .route("/agency/oauth/:provider", get(public::auth::oauth_redirect))
        .route("/agency/unauthorized", get(public::site::unauthorized))
}

fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/agency", get(pages::agency::agency_picker))
        .route("/agency/:agency_id", get(pages::agency::agency_layout))
}

fn api_routes() -> Router<AppState> {
    use axum::routing::{post, put};

    Router::new()
        .route("/api/auth/whoami", get(protected::auth::whoami))
        .route("/api/agency", post(protected::agency::upsert))
        .route(
            "/api/agency/:agency_id",
            get(protected::agency::details)
                .put(protected::agency::update)
                .delete(protected::agency::delete),
        )
        .route(
            "/api/agency/:agency_id/subscription",
            get(protected::agency::subscription),
        )
        .route(
            "/api/agency/:agency_id/connected-account",
            put(protected::agency::connected_account),
        )
        .route(
            "/api/agency/:agency_id/notifications",
            get(protected::agency::notifications),
        )
        .layer(axum::middleware::from_fn(jwt_auth_middleware))
}
