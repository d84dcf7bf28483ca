//! Classification history endpoints.
//!
//! - `GET /api/records?kind=&limit=`: the caller's records, newest first
//! - `GET /api/records/:id`: one record, only if the caller owns it

use std::str::FromStr;

use axum::extract::rejection::QueryRejection;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::{ApiContext, UserContext};
use crate::models::{ClassificationRecord, RecordKind};

#[derive(Debug, Deserialize)]
pub struct RecordsQuery {
    pub kind: Option<String>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct RecordsResponse {
    pub records: Vec<ClassificationRecord>,
}

pub async fn list(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    query: Result<Query<RecordsQuery>, QueryRejection>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let Query(query) = query?;
    let kind = query
        .kind
        .as_deref()
        .filter(|k| !k.is_empty())
        .map(RecordKind::from_str)
        .transpose()
        .map_err(|_| ApiError::BadRequest("kind must be drug_risk or symptom".into()))?;

    let records = ctx
        .service
        .list_records(&user.user_id, kind, query.limit)
        .await?;
    Ok(Json(RecordsResponse { records }))
}

pub async fn detail(
    State(ctx): State<ApiContext>,
    Extension(user): Extension<UserContext>,
    Path(id): Path<String>,
) -> Result<Json<ClassificationRecord>, ApiError> {
    let id = Uuid::parse_str(&id).map_err(|_| ApiError::BadRequest("Invalid record id".into()))?;
    ctx.service
        .get_record(&user.user_id, id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Record not found".into()))
}
