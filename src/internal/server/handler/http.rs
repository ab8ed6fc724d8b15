// src/internal/server/handler/http.rs

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use crate::internal::registry::EndpointRegistry;

/// Handler builds the plain HTTP routes served next to the MCP endpoint
pub struct Handler {
    registry: Arc<EndpointRegistry>,
}

impl Handler {
    pub fn new(registry: Arc<EndpointRegistry>) -> Self {
        Self { registry }
    }

    /// `GET /health` plus the logging and CORS middleware stack.
    pub fn create_http_router(&self) -> Router {
        let router = Router::new()
            .route("/health", get(Self::health))
            .with_state(Arc::clone(&self.registry))
            .layer(
                ServiceBuilder::new()
                    .layer(middleware::from_fn(Self::log_requests))
                    .layer(CorsLayer::permissive()),
            );

        info!("HTTP health route registered");
        router
    }

    async fn health(State(registry): State<Arc<EndpointRegistry>>) -> impl IntoResponse {
        (
            StatusCode::OK,
            Json(json!({ "status": "ok", "endpoints": registry.len() })),
        )
    }

    /// Middleware to log HTTP requests
    async fn log_requests(request: Request<Body>, next: Next) -> impl IntoResponse {
        let method = request.method().clone();
        let uri = request.uri().clone();
        let started = Instant::now();

        debug!("→ {} {}", method, uri);
        let response = next.run(request).await;
        debug!("← {} {} in {:?}", response.status(), uri, started.elapsed());

        response
    }
}
