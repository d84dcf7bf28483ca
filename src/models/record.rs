use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::assessment::Assessment;
use super::enums::{AssessmentSource, RecordKind};

/// Caller input captured at classification time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputSnapshot {
    DrugRisk {
        drug_name: String,
        allergies: Vec<String>,
    },
    Symptom {
        symptoms: String,
        medications: Vec<String>,
    },
}

impl InputSnapshot {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::DrugRisk { .. } => RecordKind::DrugRisk,
            Self::Symptom { .. } => RecordKind::Symptom,
        }
    }
}

/// Immutable audit entry for one classification call.
///
/// `upstream_error` keeps the raw AI failure for operators and is never
/// serialized into API responses.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationRecord {
    pub id: Uuid,
    pub user_id: String,
    pub kind: RecordKind,
    pub source: AssessmentSource,
    pub input: InputSnapshot,
    pub assessment: Assessment,
    #[serde(skip_serializing)]
    pub upstream_error: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A record that has not been written yet.
#[derive(Debug, Clone)]
pub struct NewClassificationRecord {
    pub user_id: String,
    pub source: AssessmentSource,
    pub input: InputSnapshot,
    pub assessment: Assessment,
    pub upstream_error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DrugRiskAssessment, RiskLevel};

    #[test]
    fn upstream_error_not_serialized() {
        let record = ClassificationRecord {
            id: Uuid::new_v4(),
            user_id: "u1".into(),
            kind: RecordKind::DrugRisk,
            source: AssessmentSource::AiFallback,
            input: InputSnapshot::DrugRisk {
                drug_name: "Aspirin".into(),
                allergies: vec![],
            },
            assessment: Assessment::DrugRisk(DrugRiskAssessment {
                risk_level: RiskLevel::High,
                potential_reactions: vec!["AI analysis unavailable".into()],
                recommendations: vec!["Consult healthcare provider immediately".into()],
                ai_analysis: None,
                confidence_score: None,
            }),
            upstream_error: Some("connection refused at 10.0.0.3".into()),
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("upstream_error").is_none());
        assert_eq!(json["source"], "ai_fallback");
        assert_eq!(json["input"]["drug_name"], "Aspirin");
    }
}
