use std::collections::BTreeSet;
use std::sync::Arc;

use super::fallback;
use super::parser::{self, ParseOutcome};
use super::prompt::{build_drug_risk_prompt, build_symptom_prompt, ASSESSMENT_SYSTEM_PROMPT};
use super::{Classified, DrugRiskClassifier, SymptomClassifier};
use crate::llm::LlmClient;
use crate::models::enums::AssessmentSource;
use crate::models::{DrugRiskAssessment, SymptomAssessment};

/// Why AI output was not used.
enum Degraded {
    Upstream(String),
    NotJson(String),
    Malformed { raw: String, reason: String },
}

impl Degraded {
    fn describe(&self) -> String {
        match self {
            Self::Upstream(e) => e.clone(),
            Self::NotJson(_) => "response is not a JSON object".into(),
            Self::Malformed { reason, .. } => format!("malformed response: {reason}"),
        }
    }
}

fn degraded<T>(assessment: T, why: &Degraded) -> Classified<T> {
    Classified {
        assessment,
        source: AssessmentSource::AiFallback,
        upstream_error: Some(why.describe()),
    }
}

/// Drug-risk classification through a text generator.
///
/// With no rule-based fallback configured, failures produce the fixed
/// conservative assessments in [`fallback`].
pub struct AiAssistedRiskClassifier {
    llm: Arc<dyn LlmClient>,
    rules: Option<Arc<dyn DrugRiskClassifier>>,
}

impl AiAssistedRiskClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, rules: Option<Arc<dyn DrugRiskClassifier>>) -> Self {
        Self { llm, rules }
    }

    fn degrade(
        &self,
        why: Degraded,
        drug_name: &str,
        allergy_terms: &BTreeSet<String>,
    ) -> Classified<DrugRiskAssessment> {
        tracing::warn!(model = self.llm.model(), reason = %why.describe(), "AI drug-risk assessment degraded");

        if let Some(rules) = &self.rules {
            let mut assessment = rules.classify_drug_risk(drug_name, allergy_terms).assessment;
            if let Degraded::NotJson(raw) | Degraded::Malformed { raw, .. } = &why {
                assessment.ai_analysis = Some(raw.trim().to_string());
            }
            return degraded(assessment, &why);
        }

        let assessment = match &why {
            Degraded::Upstream(_) => fallback::drug_risk_unavailable(),
            Degraded::NotJson(raw) => fallback::drug_risk_not_json(raw),
            Degraded::Malformed { raw, .. } => fallback::drug_risk_malformed(raw),
        };
        degraded(assessment, &why)
    }
}

impl DrugRiskClassifier for AiAssistedRiskClassifier {
    fn classify_drug_risk(
        &self,
        drug_name: &str,
        allergy_terms: &BTreeSet<String>,
    ) -> Classified<DrugRiskAssessment> {
        let prompt = build_drug_risk_prompt(drug_name, allergy_terms);
        let response = match self.llm.generate(&prompt, ASSESSMENT_SYSTEM_PROMPT) {
            Ok(text) => text,
            Err(e) => return self.degrade(Degraded::Upstream(e.to_string()), drug_name, allergy_terms),
        };

        match parser::parse_drug_risk(&response) {
            ParseOutcome::Parsed(assessment) => Classified {
                assessment,
                source: AssessmentSource::Ai,
                upstream_error: None,
            },
            ParseOutcome::NotJson => self.degrade(Degraded::NotJson(response), drug_name, allergy_terms),
            ParseOutcome::Malformed(reason) => self.degrade(
                Degraded::Malformed { raw: response, reason },
                drug_name,
                allergy_terms,
            ),
        }
    }
}

/// Symptom classification through a text generator.
pub struct AiAssistedSymptomClassifier {
    llm: Arc<dyn LlmClient>,
    rules: Option<Arc<dyn SymptomClassifier>>,
}

impl AiAssistedSymptomClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, rules: Option<Arc<dyn SymptomClassifier>>) -> Self {
        Self { llm, rules }
    }

    fn degrade(
        &self,
        why: Degraded,
        symptoms: &str,
        medications: &[String],
    ) -> Classified<SymptomAssessment> {
        tracing::warn!(model = self.llm.model(), reason = %why.describe(), "AI symptom assessment degraded");

        if let Some(rules) = &self.rules {
            let mut assessment = rules.classify_symptoms(symptoms, medications).assessment;
            if let Degraded::NotJson(raw) | Degraded::Malformed { raw, .. } = &why {
                assessment.ai_analysis = format!("{}\n\nAI response: {}", assessment.ai_analysis, raw.trim());
            }
            return degraded(assessment, &why);
        }

        let assessment = match &why {
            Degraded::Upstream(_) => fallback::symptoms_unavailable(),
            Degraded::NotJson(raw) => fallback::symptoms_not_json(raw),
            Degraded::Malformed { raw, .. } => fallback::symptoms_malformed(raw),
        };
        degraded(assessment, &why)
    }
}

impl SymptomClassifier for AiAssistedSymptomClassifier {
    fn classify_symptoms(
        &self,
        symptoms: &str,
        medications: &[String],
    ) -> Classified<SymptomAssessment> {
        let prompt = build_symptom_prompt(symptoms, medications);
        let response = match self.llm.generate(&prompt, ASSESSMENT_SYSTEM_PROMPT) {
            Ok(text) => text,
            Err(e) => return self.degrade(Degraded::Upstream(e.to_string()), symptoms, medications),
        };

        match parser::parse_symptoms(&response) {
            ParseOutcome::Parsed(assessment) => Classified {
                assessment,
                source: AssessmentSource::Ai,
                upstream_error: None,
            },
            ParseOutcome::NotJson => self.degrade(Degraded::NotJson(response), symptoms, medications),
            ParseOutcome::Malformed(reason) => self.degrade(
                Degraded::Malformed { raw: response, reason },
                symptoms,
                medications,
            ),
        }
    }
}
