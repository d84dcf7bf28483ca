use chrono::NaiveDate;
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::*;

pub fn insert_medication(conn: &Connection, med: &Medication) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO medications (id, user_id, name, dosage, frequency, start_date, end_date,
         prescribing_doctor, notes, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            med.id.to_string(),
            med.user_id,
            med.name,
            med.dosage,
            med.frequency,
            med.start_date.to_string(),
            med.end_date.map(|d| d.to_string()),
            med.prescribing_doctor,
            med.notes,
            med.is_active as i32,
        ],
    )?;
    Ok(())
}

pub fn get_active_medications(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<Medication>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, user_id, name, dosage, frequency, start_date, end_date,
                prescribing_doctor, notes, is_active
         FROM medications WHERE user_id = ?1 AND is_active = 1
         ORDER BY start_date DESC, name",
    )?;

    let rows = stmt.query_map(params![user_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, Option<String>>(7)?,
            row.get::<_, Option<String>>(8)?,
            row.get::<_, i32>(9)?,
        ))
    })?;

    let mut meds = Vec::new();
    for row in rows {
        let (id, user_id, name, dosage, frequency, start, end, doctor, notes, active) = row?;
        meds.push(Medication {
            id: Uuid::parse_str(&id)
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            user_id,
            name,
            dosage,
            frequency,
            start_date: NaiveDate::parse_from_str(&start, "%Y-%m-%d")
                .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
            end_date: end.and_then(|d| NaiveDate::parse_from_str(&d, "%Y-%m-%d").ok()),
            prescribing_doctor: doctor,
            notes,
            is_active: active != 0,
        });
    }
    Ok(meds)
}

/// Names of a user's active medications, newest first.
pub fn active_medication_names(
    conn: &Connection,
    user_id: &str,
) -> Result<Vec<String>, DatabaseError> {
    Ok(get_active_medications(conn, user_id)?
        .into_iter()
        .map(|m| m.name)
        .collect())
}
