//! Caller identity middleware.
//!
//! Authentication is handled in front of this service; it forwards the
//! authenticated user's id in `X-User-Id`. Requests without it are
//! rejected before reaching a handler.

use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::UserContext;

pub const USER_ID_HEADER: &str = "X-User-Id";
const MAX_USER_ID_LEN: usize = 128;

pub async fn require_user(mut req: Request<axum::body::Body>, next: Next) -> Response {
    let user_id = req
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|id| !id.is_empty() && id.len() <= MAX_USER_ID_LEN)
        .map(str::to_string);

    match user_id {
        Some(user_id) => {
            req.extensions_mut().insert(UserContext { user_id });
            next.run(req).await
        }
        None => ApiError::Unauthorized.into_response(),
    }
}
