use std::collections::BTreeSet;
use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

pub fn insert_allergy(conn: &Connection, allergy: &Allergy) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO allergies (id, user_id, name, severity, symptoms, diagnosed_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            allergy.id.to_string(),
            allergy.user_id,
            allergy.name,
            allergy.severity.as_str(),
            allergy.symptoms,
            allergy.diagnosed_date.map(|d| d.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_user_allergies(conn: &Connection, user_id: &str) -> Result<Vec<Allergy>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, severity, symptoms, diagnosed_date
         FROM allergies WHERE user_id = ?1 ORDER BY name",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, Option<String>>(4)?,
            row.get::<_, Option<String>>(5)?,
        ))
    })?;

    let mut allergies = Vec::new();
    for row in rows {
        let (id, user_id, name, severity, symptoms, diagnosed_date) = row?;
        allergies.push(Allergy {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            user_id,
            name,
            severity: AllergySeverity::from_str(&severity)?,
            symptoms,
            diagnosed_date: diagnosed_date
                .and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
        });
    }
    Ok(allergies)
}

/// Case-folded allergy names recorded for a user.
pub fn known_allergy_terms(
    conn: &Connection,
    user_id: &str,
) -> Result<BTreeSet<String>, DatabaseError> {
    let mut stmt = conn.prepare("SELECT name FROM allergies WHERE user_id = ?1")?;
    let terms = stmt
        .query_map(params![user_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(terms
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect())
}
