//! API router.
//!
//! Returns a composable `Router` with every route under `/api/`.
//!
//! Layer stack (outermost → innermost):
//! 1. Request tracing → 2. Request timeout → 3. Identity → 4. Audit logger

use std::sync::Arc;
use std::time::Duration;

use axum::routing::{get, post};
use axum::Router;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;
use crate::assessment::AssessmentService;

/// Build the API router.
///
/// A request still running when `request_timeout` elapses is dropped with
/// 408; an assessment dropped before persistence writes no record.
pub fn api_router(service: Arc<AssessmentService>, request_timeout: Duration) -> Router {
    let ctx = ApiContext::new(service);

    // Layers are applied innermost first.
    let protected = Router::new()
        .route("/check-drug-risk", post(endpoints::risk::check))
        .route("/analyze-symptoms", post(endpoints::symptoms::analyze))
        .route("/records", get(endpoints::records::list))
        .route("/records/:id", get(endpoints::records::detail))
        .route("/summary", get(endpoints::summary::get))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::audit::log_access))
        .layer(axum::middleware::from_fn(middleware::identity::require_user));

    let unprotected = Router::new()
        .route("/health", get(endpoints::health::check))
        .with_state(ctx);

    Router::new()
        .nest("/api", protected.merge(unprotected))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
}
