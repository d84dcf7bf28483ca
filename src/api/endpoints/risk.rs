//! `POST /api/check-drug-risk`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::assessment::Assessed;
use crate::models::DrugRiskAssessment;

#[derive(Debug, Deserialize)]
pub struct DrugRiskRequest {
    pub drug_name: String,
    /// Merged with the allergies already on file.
    #[serde(default)]
    pub user_allergies: Vec<String>,
}

pub async fn check(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    body: Result<Json<DrugRiskRequest>, JsonRejection>,
) -> Result<Json<Assessed<DrugRiskAssessment>>, ApiError> {
    let Json(req) = body?;
    let assessed = ctx
        .service
        .assess_drug_risk(&user.user_id, &req.drug_name, &req.user_allergies)
        .await?;
    Ok(Json(assessed))
}
