//! Shared types for the API layer.

use std::sync::Arc;

use crate::assessment::AssessmentService;

/// Shared state for all API routes.
#[derive(Clone)]
pub struct ApiContext {
    pub service: Arc<AssessmentService>,
}

impl ApiContext {
    pub fn new(service: Arc<AssessmentService>) -> Self {
        Self { service }
    }
}

/// Caller identity, injected into request extensions by the identity
/// middleware. The id is opaque; authentication happens upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}
