//! Assessment service: validation, profile lookups, classification and the
//! audit record, in that order.
//!
//! Each step that touches SQLite or the classifier runs on the blocking
//! pool. Classification and persistence are separate awaits, so a caller
//! that drops the future before persistence leaves no record behind.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::classify::{normalise_terms, Classified, Classifiers};
use crate::db::{self, Database, DatabaseError};
use crate::models::{
    Allergy, Assessment, AssessmentSource, ClassificationRecord, DrugRiskAssessment,
    InputSnapshot, Medication, NewClassificationRecord, RecordKind, SymptomAssessment,
};

pub const MAX_DRUG_NAME_CHARS: usize = 100;
pub const MAX_TERM_CHARS: usize = 100;
pub const MAX_SYMPTOM_CHARS: usize = 2000;

pub const DEFAULT_RECORD_LIMIT: u32 = 20;
pub const MAX_RECORD_LIMIT: u32 = 100;
const SUMMARY_RECENT: u32 = 5;

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Persistence failed: {0}")]
    Persistence(#[from] DatabaseError),

    #[error("Worker task failed: {0}")]
    Worker(String),
}

/// An assessment together with the record that audits it.
#[derive(Debug, Clone, Serialize)]
pub struct Assessed<T> {
    #[serde(flatten)]
    pub assessment: T,
    pub record_id: Uuid,
    pub source: AssessmentSource,
}

/// What the summary view shows for one user.
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub allergies: Vec<Allergy>,
    pub active_medications: Vec<Medication>,
    pub recent_drug_checks: Vec<ClassificationRecord>,
    pub recent_symptom_analyses: Vec<ClassificationRecord>,
}

#[derive(Clone)]
pub struct AssessmentService {
    db: Database,
    classifiers: Classifiers,
}

impl AssessmentService {
    pub fn new(db: Database, classifiers: Classifiers) -> Self {
        Self { db, classifiers }
    }

    pub fn classifiers(&self) -> &Classifiers {
        &self.classifiers
    }

    /// Check a drug against the user's known allergies plus any declared
    /// with the request.
    pub async fn assess_drug_risk(
        &self,
        user_id: &str,
        drug_name: &str,
        declared_allergies: &[String],
    ) -> Result<Assessed<DrugRiskAssessment>, AssessmentError> {
        let drug_name = drug_name.trim().to_string();
        validate_required("drug_name", &drug_name, MAX_DRUG_NAME_CHARS)?;
        validate_terms("user_allergies", declared_allergies)?;

        let known = {
            let store = self.db.clone();
            let user = user_id.to_string();
            blocking(move || Ok(db::known_allergy_terms(&store.connect()?, &user)?)).await?
        };
        let mut terms: BTreeSet<String> = normalise_terms(declared_allergies);
        terms.extend(known);

        let classified = {
            let classifier = self.classifiers.drug_risk.clone();
            let drug = drug_name.clone();
            let terms = terms.clone();
            blocking(move || Ok(classifier.classify_drug_risk(&drug, &terms))).await?
        };

        let input = InputSnapshot::DrugRisk {
            drug_name,
            allergies: terms.into_iter().collect(),
        };
        let record_id = self.persist(user_id, input, &classified).await?;

        Ok(Assessed {
            assessment: classified.assessment,
            record_id,
            source: classified.source,
        })
    }

    /// Classify free-text symptoms. `None` medications means "use the
    /// user's active medication list".
    pub async fn assess_symptoms(
        &self,
        user_id: &str,
        symptoms: &str,
        current_medications: Option<&[String]>,
    ) -> Result<Assessed<SymptomAssessment>, AssessmentError> {
        let symptoms = symptoms.trim().to_string();
        validate_required("symptoms", &symptoms, MAX_SYMPTOM_CHARS)?;

        let medications: Vec<String> = match current_medications {
            Some(meds) => {
                validate_terms("current_medications", meds)?;
                meds.iter()
                    .map(|m| m.trim().to_string())
                    .filter(|m| !m.is_empty())
                    .collect()
            }
            None => {
                let store = self.db.clone();
                let user = user_id.to_string();
                blocking(move || Ok(db::active_medication_names(&store.connect()?, &user)?)).await?
            }
        };

        let classified = {
            let classifier = self.classifiers.symptoms.clone();
            let text = symptoms.clone();
            let meds = medications.clone();
            blocking(move || Ok(classifier.classify_symptoms(&text, &meds))).await?
        };

        let input = InputSnapshot::Symptom {
            symptoms,
            medications,
        };
        let record_id = self.persist(user_id, input, &classified).await?;

        Ok(Assessed {
            assessment: classified.assessment,
            record_id,
            source: classified.source,
        })
    }

    pub async fn get_record(
        &self,
        user_id: &str,
        id: Uuid,
    ) -> Result<Option<ClassificationRecord>, AssessmentError> {
        let store = self.db.clone();
        let user = user_id.to_string();
        blocking(move || Ok(db::get_classification_record(&store.connect()?, &user, &id)?)).await
    }

    /// Newest first. `limit` is clamped to `1..=MAX_RECORD_LIMIT`.
    pub async fn list_records(
        &self,
        user_id: &str,
        kind: Option<RecordKind>,
        limit: Option<u32>,
    ) -> Result<Vec<ClassificationRecord>, AssessmentError> {
        let limit = limit
            .unwrap_or(DEFAULT_RECORD_LIMIT)
            .clamp(1, MAX_RECORD_LIMIT);
        let store = self.db.clone();
        let user = user_id.to_string();
        blocking(move || {
            Ok(db::list_classification_records(
                &store.connect()?,
                &user,
                kind,
                limit,
            )?)
        })
        .await
    }

    pub async fn summary(&self, user_id: &str) -> Result<HealthSummary, AssessmentError> {
        let store = self.db.clone();
        let user = user_id.to_string();
        blocking(move || {
            let conn = store.connect()?;
            Ok(HealthSummary {
                allergies: db::get_user_allergies(&conn, &user)?,
                active_medications: db::get_active_medications(&conn, &user)?,
                recent_drug_checks: db::list_classification_records(
                    &conn,
                    &user,
                    Some(RecordKind::DrugRisk),
                    SUMMARY_RECENT,
                )?,
                recent_symptom_analyses: db::list_classification_records(
                    &conn,
                    &user,
                    Some(RecordKind::Symptom),
                    SUMMARY_RECENT,
                )?,
            })
        })
        .await
    }

    async fn persist<T>(
        &self,
        user_id: &str,
        input: InputSnapshot,
        classified: &Classified<T>,
    ) -> Result<Uuid, AssessmentError>
    where
        T: Clone + Into<Assessment>,
    {
        let new = NewClassificationRecord {
            user_id: user_id.to_string(),
            source: classified.source,
            input,
            assessment: classified.assessment.clone().into(),
            upstream_error: classified.upstream_error.clone(),
        };
        let kind = new.assessment.kind();
        let store = self.db.clone();

        let result = blocking(move || {
            let conn = store.connect()?;
            Ok(db::insert_classification_record(&conn, &new)?)
        })
        .await;

        match result {
            Ok(record) => {
                tracing::info!(
                    user_id,
                    kind = %kind,
                    source = %record.source,
                    record_id = %record.id,
                    "Assessment recorded"
                );
                Ok(record.id)
            }
            Err(e) => {
                tracing::error!(user_id, kind = %kind, error = %e, "Failed to record assessment");
                Err(e)
            }
        }
    }
}

async fn blocking<T, F>(f: F) -> Result<T, AssessmentError>
where
    F: FnOnce() -> Result<T, AssessmentError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AssessmentError::Worker(e.to_string()))?
}

fn validate_required(field: &str, value: &str, max_chars: usize) -> Result<(), AssessmentError> {
    if value.is_empty() {
        return Err(AssessmentError::InputValidation(format!("{field} is required")));
    }
    if value.chars().count() > max_chars {
        return Err(AssessmentError::InputValidation(format!(
            "{field} must be at most {max_chars} characters"
        )));
    }
    Ok(())
}

fn validate_terms(field: &str, terms: &[String]) -> Result<(), AssessmentError> {
    if terms.iter().any(|t| t.trim().chars().count() > MAX_TERM_CHARS) {
        return Err(AssessmentError::InputValidation(format!(
            "each entry in {field} must be at most {MAX_TERM_CHARS} characters"
        )));
    }
    Ok(())
}
