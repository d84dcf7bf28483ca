//! Fixed assessments returned when AI output cannot be used.

use crate::models::enums::{RiskLevel, SymptomClassification, Urgency};
use crate::models::{DrugRiskAssessment, SymptomAssessment};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The generation call itself failed.
pub fn drug_risk_unavailable() -> DrugRiskAssessment {
    DrugRiskAssessment {
        risk_level: RiskLevel::High,
        potential_reactions: strings(&["AI analysis unavailable"]),
        recommendations: strings(&["Consult healthcare provider immediately"]),
        ai_analysis: None,
        confidence_score: None,
    }
}

/// The response was not a JSON object.
pub fn drug_risk_not_json(raw: &str) -> DrugRiskAssessment {
    DrugRiskAssessment {
        risk_level: RiskLevel::Medium,
        potential_reactions: strings(&["Consult healthcare provider"]),
        recommendations: strings(&["Professional medical evaluation recommended"]),
        ai_analysis: Some(raw.trim().to_string()),
        confidence_score: None,
    }
}

/// The response was JSON but missing or out-of-schema fields.
pub fn drug_risk_malformed(raw: &str) -> DrugRiskAssessment {
    DrugRiskAssessment {
        risk_level: RiskLevel::Medium,
        potential_reactions: strings(&["Unable to analyze - consult doctor"]),
        recommendations: strings(&["Seek professional medical advice"]),
        ai_analysis: Some(raw.trim().to_string()),
        confidence_score: None,
    }
}

pub fn symptoms_unavailable() -> SymptomAssessment {
    SymptomAssessment {
        classification: SymptomClassification::Unknown,
        confidence_score: 0.0,
        ai_analysis: "AI analysis temporarily unavailable".into(),
        recommendations: strings(&["Consult healthcare provider"]),
        severity: None,
        urgency: Some(Urgency::High),
    }
}

pub fn symptoms_not_json(raw: &str) -> SymptomAssessment {
    SymptomAssessment {
        classification: SymptomClassification::Unknown,
        confidence_score: 0.5,
        ai_analysis: raw.trim().to_string(),
        recommendations: strings(&["Consult healthcare provider for proper diagnosis"]),
        severity: None,
        urgency: Some(Urgency::Medium),
    }
}

pub fn symptoms_malformed(raw: &str) -> SymptomAssessment {
    SymptomAssessment {
        classification: SymptomClassification::Unknown,
        confidence_score: 0.5,
        ai_analysis: raw.trim().to_string(),
        recommendations: strings(&["Professional medical evaluation needed"]),
        severity: None,
        urgency: Some(Urgency::Medium),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unavailable_drug_fallback_is_high_with_reason() {
        let a = drug_risk_unavailable();
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.potential_reactions, vec!["AI analysis unavailable"]);
        assert!(a.ai_analysis.is_none());
    }

    #[test]
    fn parse_fallbacks_keep_raw_text() {
        assert_eq!(
            drug_risk_not_json("  maybe fine \n").ai_analysis.as_deref(),
            Some("maybe fine")
        );
        assert_eq!(drug_risk_malformed("{}").risk_level, RiskLevel::Medium);
        assert_eq!(symptoms_not_json("text").ai_analysis, "text");
        assert_eq!(symptoms_malformed("{}").confidence_score, 0.5);
    }
}
