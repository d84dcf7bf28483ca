//! `POST /api/analyze-symptoms`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::assessment::Assessed;
use crate::models::SymptomAssessment;

#[derive(Debug, Deserialize)]
pub struct SymptomRequest {
    pub symptoms: String,
    /// Omitted means the user's active medications.
    #[serde(default)]
    pub current_medications: Option<Vec<String>>,
}

pub async fn analyze(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<SymptomRequest>, JsonRejection>,
) -> Result<Json<Assessed<SymptomAssessment>>, ApiError> {
    let Json(req) = body?;
    let assessed = ctx
        .service
        .assess_symptoms(
            &user.user_id,
            &req.symptoms,
            req.current_medications.as_deref(),
        )
        .await?;
    Ok(Json(assessed))
}
