pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod resources;

use axum::{routing::any, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the service router. The router is stateless - configuration and the
/// connection pool are process-wide singletons - so the binary and the tests
/// share this construction as-is.
pub fn app() -> Router {
    Router::new()
        .route("/", any(handlers::index))
        .route("/api/:resource", any(handlers::dispatch))
        // Any other path behaves like an unknown resource: discovery, not 404.
        .fallback(handlers::index)
        // The original answered every request with permissive CORS headers so
        // browser dashboards on other origins could call it directly.
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
