pub mod profiles;
pub mod rest;
pub mod tools;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

pub use profiles::{ProfileError, ProfileOrigin, ProfileService, ResolvedProfile};
pub use tools::{ToolDefinition, ToolOutput, Toolbox, Tools};

pub struct AppState {
    pub tools: Tools,
}

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/", get(|| async { "ok" }))
        .route("/tools", get(rest::api_tools))
        .route("/tools/{name}", post(rest::api_call_tool))
        .with_state(state)
        // CORS
        .layer(
            tower_http::cors::CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods(tower_http::cors::Any)
                .allow_headers(tower_http::cors::Any),
        )
        // Logging layer: method + path only
        .layer(
            tower_http::trace::TraceLayer::new_for_http().make_span_with(
                |request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        path = %request.uri().path(),
                    )
                },
            ),
        )
}
