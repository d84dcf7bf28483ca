//! `GET /api/summary`: allergies, active medications and the latest
//! assessments of each kind.

use axum::extract::State;
use axum::{Extension, Json};

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::assessment::HealthSummary;

pub async fn get(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
) -> Result<Json<HealthSummary>, ApiError> {
    Ok(Json(ctx.service.summary(&user.user_id).await?))
}
