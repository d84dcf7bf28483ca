//! Risk and symptom classification.
//!
//! Two strategies satisfy each capability trait: deterministic rules over
//! the knowledge tables, and an AI-assisted variant that prompts a text
//! generator and degrades to a fixed fallback on any failure. The active
//! strategy is chosen from configuration in [`build_classifiers`].

pub mod ai;
pub mod fallback;
pub mod knowledge;
pub mod parser;
pub mod prompt;
pub mod rules;

pub use ai::{AiAssistedRiskClassifier, AiAssistedSymptomClassifier};
pub use knowledge::{DrugClass, KnowledgeBase, KnowledgeError};
pub use rules::{RuleBasedRiskClassifier, RuleBasedSymptomClassifier};

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::config::{ClassifierConfig, ClassifierStrategy, FallbackPolicy};
use crate::llm::LlmClient;
use crate::models::enums::AssessmentSource;
use crate::models::{DrugRiskAssessment, SymptomAssessment};

/// A classifier result plus where it came from.
///
/// `upstream_error` holds the raw AI failure for the audit record; it is
/// never shown to the end user.
#[derive(Debug, Clone, PartialEq)]
pub struct Classified<T> {
    pub assessment: T,
    pub source: AssessmentSource,
    pub upstream_error: Option<String>,
}

impl<T> Classified<T> {
    pub fn rule_based(assessment: T) -> Self {
        Self {
            assessment,
            source: AssessmentSource::RuleBased,
            upstream_error: None,
        }
    }
}

/// Drug-versus-allergy risk classification. Never fails.
pub trait DrugRiskClassifier: Send + Sync {
    fn classify_drug_risk(
        &self,
        drug_name: &str,
        allergy_terms: &BTreeSet<String>,
    ) -> Classified<DrugRiskAssessment>;
}

/// Free-text symptom classification. Never fails.
pub trait SymptomClassifier: Send + Sync {
    fn classify_symptoms(
        &self,
        symptoms: &str,
        medications: &[String],
    ) -> Classified<SymptomAssessment>;
}

/// The pair of classifiers the assessment service runs with.
#[derive(Clone)]
pub struct Classifiers {
    pub drug_risk: Arc<dyn DrugRiskClassifier>,
    pub symptoms: Arc<dyn SymptomClassifier>,
    pub strategy: ClassifierStrategy,
}

/// Wire up classifiers for the configured strategy.
///
/// `llm` is only consulted for the AI-assisted strategy; passing `None`
/// there is a configuration error the caller must have caught already,
/// so this falls back to rules and logs it.
pub fn build_classifiers(
    config: &ClassifierConfig,
    knowledge: Arc<KnowledgeBase>,
    llm: Option<Arc<dyn LlmClient>>,
) -> Classifiers {
    let rule_risk = Arc::new(RuleBasedRiskClassifier::new(knowledge.clone()));
    let rule_symptoms = Arc::new(RuleBasedSymptomClassifier::new(knowledge));

    match (config.strategy, llm) {
        (ClassifierStrategy::AiAssisted, Some(llm)) => {
            let (risk_fallback, symptom_fallback) = match config.fallback {
                FallbackPolicy::Conservative => (None, None),
                FallbackPolicy::RuleBased => (
                    Some(rule_risk.clone() as Arc<dyn DrugRiskClassifier>),
                    Some(rule_symptoms.clone() as Arc<dyn SymptomClassifier>),
                ),
            };
            tracing::info!(model = llm.model(), fallback = ?config.fallback, "AI-assisted classifiers active");
            Classifiers {
                drug_risk: Arc::new(AiAssistedRiskClassifier::new(llm.clone(), risk_fallback)),
                symptoms: Arc::new(AiAssistedSymptomClassifier::new(llm, symptom_fallback)),
                strategy: ClassifierStrategy::AiAssisted,
            }
        }
        (ClassifierStrategy::AiAssisted, None) => {
            tracing::warn!("AI-assisted strategy requested without a generation client; using rules");
            Classifiers {
                drug_risk: rule_risk,
                symptoms: rule_symptoms,
                strategy: ClassifierStrategy::RuleBased,
            }
        }
        (ClassifierStrategy::RuleBased, _) => {
            tracing::info!("Rule-based classifiers active");
            Classifiers {
                drug_risk: rule_risk,
                symptoms: rule_symptoms,
                strategy: ClassifierStrategy::RuleBased,
            }
        }
    }
}

/// Lower-case, trim and drop empty terms.
pub fn normalise_terms<I, S>(terms: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    terms
        .into_iter()
        .map(|t| t.as_ref().trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;
    use crate::models::enums::RiskLevel;

    fn config(strategy: ClassifierStrategy, fallback: FallbackPolicy) -> ClassifierConfig {
        ClassifierConfig {
            strategy,
            fallback,
            knowledge_path: None,
        }
    }

    #[test]
    fn rule_based_strategy_ignores_llm() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new("{}"));
        let c = build_classifiers(
            &config(ClassifierStrategy::RuleBased, FallbackPolicy::Conservative),
            KnowledgeBase::builtin().unwrap(),
            Some(llm),
        );
        assert_eq!(c.strategy, ClassifierStrategy::RuleBased);
        let out = c.drug_risk.classify_drug_risk("Amoxicillin", &normalise_terms(["Penicillin"]));
        assert_eq!(out.source, AssessmentSource::RuleBased);
        assert_eq!(out.assessment.risk_level, RiskLevel::High);
    }

    #[test]
    fn ai_strategy_without_client_uses_rules() {
        let c = build_classifiers(
            &config(ClassifierStrategy::AiAssisted, FallbackPolicy::Conservative),
            KnowledgeBase::builtin().unwrap(),
            None,
        );
        assert_eq!(c.strategy, ClassifierStrategy::RuleBased);
    }

    #[test]
    fn ai_strategy_uses_client() {
        let llm: Arc<dyn LlmClient> = Arc::new(MockLlmClient::new(
            r#"{"risk_level":"medium","potential_reactions":["GI upset"],"recommendations":["Take with food"]}"#,
        ));
        let c = build_classifiers(
            &config(ClassifierStrategy::AiAssisted, FallbackPolicy::Conservative),
            KnowledgeBase::builtin().unwrap(),
            Some(llm),
        );
        let out = c.drug_risk.classify_drug_risk("Ibuprofen", &BTreeSet::new());
        assert_eq!(out.source, AssessmentSource::Ai);
        assert_eq!(out.assessment.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn normalise_terms_merges_case_variants() {
        let terms = normalise_terms(["Penicillin", " penicillin", "", "Latex"]);
        assert_eq!(terms.len(), 2);
        assert!(terms.contains("penicillin"));
    }
}
