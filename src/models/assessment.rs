use serde::{Deserialize, Serialize};

use super::enums::{RecordKind, RiskLevel, SymptomClassification, SymptomSeverity, Urgency};

/// Outcome of a drug-versus-allergy risk check.
///
/// A `High` level always carries at least one reaction explaining the
/// trigger; `Low` carries only generic caution text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrugRiskAssessment {
    pub risk_level: RiskLevel,
    pub potential_reactions: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub ai_analysis: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<f32>,
}

/// Outcome of a free-text symptom assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomAssessment {
    pub classification: SymptomClassification,
    pub confidence_score: f32,
    pub ai_analysis: String,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub severity: Option<SymptomSeverity>,
    #[serde(default)]
    pub urgency: Option<Urgency>,
}

/// Either kind of assessment, as stored on a classification record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Assessment {
    DrugRisk(DrugRiskAssessment),
    Symptom(SymptomAssessment),
}

impl Assessment {
    pub fn kind(&self) -> RecordKind {
        match self {
            Self::DrugRisk(_) => RecordKind::DrugRisk,
            Self::Symptom(_) => RecordKind::Symptom,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::DrugRisk(a) => serde_json::to_string(a),
            Self::Symptom(a) => serde_json::to_string(a),
        }
    }

    /// Decode a stored assessment; the record kind selects the shape.
    pub fn from_json(kind: RecordKind, json: &str) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            RecordKind::DrugRisk => Self::DrugRisk(serde_json::from_str(json)?),
            RecordKind::Symptom => Self::Symptom(serde_json::from_str(json)?),
        })
    }
}

impl From<DrugRiskAssessment> for Assessment {
    fn from(a: DrugRiskAssessment) -> Self {
        Self::DrugRisk(a)
    }
}

impl From<SymptomAssessment> for Assessment {
    fn from(a: SymptomAssessment) -> Self {
        Self::Symptom(a)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drug_risk_accepts_missing_optional_fields() {
        let json = r#"{"risk_level":"medium","potential_reactions":[],"recommendations":["x"]}"#;
        let a: DrugRiskAssessment = serde_json::from_str(json).unwrap();
        assert_eq!(a.risk_level, RiskLevel::Medium);
        assert!(a.ai_analysis.is_none());
        assert!(a.confidence_score.is_none());
    }

    #[test]
    fn stored_json_decodes_by_kind() {
        let original = Assessment::Symptom(SymptomAssessment {
            classification: SymptomClassification::SideEffect,
            confidence_score: 0.45,
            ai_analysis: "headache".into(),
            recommendations: vec!["Monitor".into()],
            severity: Some(SymptomSeverity::Mild),
            urgency: None,
        });
        let json = original.to_json().unwrap();
        let decoded = Assessment::from_json(RecordKind::Symptom, &json).unwrap();
        assert_eq!(decoded, original);
        assert!(Assessment::from_json(RecordKind::DrugRisk, &json).is_err());
    }
}
