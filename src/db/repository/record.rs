use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

/// Append a classification record. Single INSERT, so concurrent writers on
/// separate connections never observe a partial row.
pub fn insert_classification_record(
    conn: &Connection,
    record: &NewClassificationRecord,
) -> Result<ClassificationRecord, DatabaseError> {
    let id = Uuid::new_v4();
    // Stored at microsecond precision; the returned record must match a re-read.
    let created_at = Utc::now().trunc_subsecs(6);
    let kind = record.assessment.kind();
    if record.input.kind() != kind {
        return Err(DatabaseError::ConstraintViolation(format!(
            "input snapshot kind {} does not match assessment kind {kind}",
            record.input.kind()
        )));
    }

    conn.execute(
        "INSERT INTO classification_records
         (id, user_id, kind, source, input_snapshot, assessment, upstream_error, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id.to_string(),
            record.user_id,
            kind.as_str(),
            record.source.as_str(),
            serde_json::to_string(&record.input)?,
            record.assessment.to_json()?,
            record.upstream_error,
            created_at.to_rfc3339_opts(SecondsFormat::Micros, true),
        ],
    )?;

    Ok(ClassificationRecord {
        id,
        user_id: record.user_id.clone(),
        kind,
        source: record.source,
        input: record.input.clone(),
        assessment: record.assessment.clone(),
        upstream_error: record.upstream_error.clone(),
        created_at,
    })
}

/// Fetch one record, scoped to its owner.
pub fn get_classification_record(
    conn: &Connection,
    user_id: &str,
    id: &Uuid,
) -> Result<Option<ClassificationRecord>, DatabaseError> {
    let raw = conn
        .query_row(
            "SELECT id, user_id, kind, source, input_snapshot, assessment, upstream_error, created_at
             FROM classification_records WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id],
            raw_record,
        )
        .optional()?;
    raw.map(decode_record).transpose()
}

/// A user's records, newest first, optionally filtered by kind.
pub fn list_classification_records(
    conn: &Connection,
    user_id: &str,
    kind: Option<RecordKind>,
    limit: u32,
) -> Result<Vec<ClassificationRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, kind, source, input_snapshot, assessment, upstream_error, created_at
         FROM classification_records
         WHERE user_id = ?1 AND (?2 IS NULL OR kind = ?2)
         ORDER BY created_at DESC, rowid DESC
         LIMIT ?3",
    )?;
    let rows = stmt
        .query_map(
            params![user_id, kind.map(|k| k.as_str()), limit],
            raw_record,
        )?
        .collect::<Result<Vec<_>, _>>()?;
    rows.into_iter().map(decode_record).collect()
}

type RawRecord = (
    String,
    String,
    String,
    String,
    String,
    String,
    Option<String>,
    String,
);

fn raw_record(row: &Row<'_>) -> rusqlite::Result<RawRecord> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
    ))
}

fn decode_record(raw: RawRecord) -> Result<ClassificationRecord, DatabaseError> {
    let (id, user_id, kind, source, input, assessment, upstream_error, created_at) = raw;
    let kind = RecordKind::from_str(&kind)?;
    Ok(ClassificationRecord {
        id: Uuid::parse_str(&id).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        user_id,
        kind,
        source: AssessmentSource::from_str(&source)?,
        input: serde_json::from_str(&input)?,
        assessment: Assessment::from_json(kind, &assessment)?,
        upstream_error,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?
            .with_timezone(&Utc),
    })
}
