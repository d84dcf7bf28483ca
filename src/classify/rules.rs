use std::collections::BTreeSet;
use std::sync::Arc;

use super::knowledge::{KnowledgeBase, MIN_PARTIAL_MATCH_LEN};
use super::{Classified, DrugRiskClassifier, SymptomClassifier};
use crate::models::enums::{RiskLevel, SymptomClassification};
use crate::models::{DrugRiskAssessment, SymptomAssessment};

const ALLERGIC_CONFIDENCE_BASE: f32 = 0.4;
const ALLERGIC_CONFIDENCE_CAP: f32 = 0.9;
const SIDE_EFFECT_CONFIDENCE_BASE: f32 = 0.3;
const SIDE_EFFECT_CONFIDENCE_CAP: f32 = 0.8;
const CONFIDENCE_PER_INDICATOR: f32 = 0.15;
const UNRELATED_CONFIDENCE: f32 = 0.3;

pub const LOW_RISK_RECOMMENDATIONS: [&str; 2] = [
    "Take as prescribed by your healthcare provider",
    "Monitor for any unusual symptoms",
];

/// Deterministic drug-risk rules over the drug-class table.
pub struct RuleBasedRiskClassifier {
    knowledge: Arc<KnowledgeBase>,
}

impl RuleBasedRiskClassifier {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Classify a drug against case-folded allergy terms.
    ///
    /// A term implicates the drug when the drug name contains it, or when
    /// the term names a drug class the drug belongs to. Each term yields at
    /// most one reaction, so repeated class matches never duplicate output.
    pub fn assess(&self, drug_name: &str, allergy_terms: &BTreeSet<String>) -> DrugRiskAssessment {
        let display_name = drug_name.trim();
        let drug = display_name.to_lowercase();

        let mut reactions: Vec<String> = Vec::new();
        let mut recommendations: Vec<String> = Vec::new();

        for term in allergy_terms {
            let term = term.trim().to_lowercase();
            if term.is_empty() {
                continue;
            }
            let direct = term.len() >= MIN_PARTIAL_MATCH_LEN && drug.contains(&term);
            let by_class = self
                .knowledge
                .drug_classes
                .iter()
                .any(|class| class.named_by(&term) && class.includes_drug(&drug));
            if !(direct || by_class) {
                continue;
            }

            let reaction = format!("Allergic reaction to {display_name} due to {term} allergy");
            if !reactions.contains(&reaction) {
                reactions.push(reaction);
            }
            let advice = format!("Avoid {display_name}. Consult doctor for alternatives.");
            if !recommendations.contains(&advice) {
                recommendations.push(advice);
            }
        }

        if reactions.is_empty() {
            return DrugRiskAssessment {
                risk_level: RiskLevel::Low,
                potential_reactions: Vec::new(),
                recommendations: LOW_RISK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
                ai_analysis: None,
                confidence_score: None,
            };
        }

        DrugRiskAssessment {
            risk_level: RiskLevel::High,
            potential_reactions: reactions,
            recommendations,
            ai_analysis: None,
            confidence_score: None,
        }
    }
}

impl DrugRiskClassifier for RuleBasedRiskClassifier {
    fn classify_drug_risk(
        &self,
        drug_name: &str,
        allergy_terms: &BTreeSet<String>,
    ) -> Classified<DrugRiskAssessment> {
        Classified::rule_based(self.assess(drug_name, allergy_terms))
    }
}

/// Deterministic symptom rules over the indicator word lists.
pub struct RuleBasedSymptomClassifier {
    knowledge: Arc<KnowledgeBase>,
}

impl RuleBasedSymptomClassifier {
    pub fn new(knowledge: Arc<KnowledgeBase>) -> Self {
        Self { knowledge }
    }

    /// Allergic indicators take strict priority over side-effect indicators.
    pub fn assess(&self, symptoms: &str, medications: &[String]) -> SymptomAssessment {
        let text = symptoms.to_lowercase();
        let allergic = matched(&self.knowledge.allergic_indicators, &text);
        let side_effects = matched(&self.knowledge.side_effect_indicators, &text);

        if !allergic.is_empty() {
            return SymptomAssessment {
                classification: SymptomClassification::AllergicReaction,
                confidence_score: indicator_confidence(
                    ALLERGIC_CONFIDENCE_BASE,
                    ALLERGIC_CONFIDENCE_CAP,
                    allergic.len(),
                ),
                ai_analysis: format!(
                    "Reported symptoms ({}) are commonly associated with allergic reactions.{}",
                    allergic.join(", "),
                    medication_note(medications)
                ),
                recommendations: vec![
                    "Seek immediate medical attention if symptoms worsen, especially difficulty breathing or swelling".into(),
                    "Consider stopping any recently started medication and consult your doctor".into(),
                ],
                severity: None,
                urgency: None,
            };
        }

        if !side_effects.is_empty() {
            return SymptomAssessment {
                classification: SymptomClassification::SideEffect,
                confidence_score: indicator_confidence(
                    SIDE_EFFECT_CONFIDENCE_BASE,
                    SIDE_EFFECT_CONFIDENCE_CAP,
                    side_effects.len(),
                ),
                ai_analysis: format!(
                    "Reported symptoms ({}) are common medication side effects.{}",
                    side_effects.join(", "),
                    medication_note(medications)
                ),
                recommendations: vec![
                    "Monitor your symptoms over the next few days".into(),
                    "Consult your doctor if symptoms persist or interfere with daily activities".into(),
                ],
                severity: None,
                urgency: None,
            };
        }

        SymptomAssessment {
            classification: SymptomClassification::Unrelated,
            confidence_score: UNRELATED_CONFIDENCE,
            ai_analysis: "No known allergic or side-effect indicators were found in the reported symptoms."
                .into(),
            recommendations: vec![
                "Consult a healthcare provider if symptoms persist or worsen".into(),
            ],
            severity: None,
            urgency: None,
        }
    }
}

impl SymptomClassifier for RuleBasedSymptomClassifier {
    fn classify_symptoms(
        &self,
        symptoms: &str,
        medications: &[String],
    ) -> Classified<SymptomAssessment> {
        Classified::rule_based(self.assess(symptoms, medications))
    }
}

/// Indicators present in `text` as substrings, in table order.
fn matched<'a>(indicators: &'a [String], text: &str) -> Vec<&'a str> {
    indicators
        .iter()
        .filter(|term| text.contains(term.as_str()))
        .map(String::as_str)
        .collect()
}

/// `min(cap, base + 0.15 * count)`, rounded to two decimals.
fn indicator_confidence(base: f32, cap: f32, count: usize) -> f32 {
    let raw = (base + CONFIDENCE_PER_INDICATOR * count as f32).min(cap);
    (raw * 100.0).round() / 100.0
}

fn medication_note(medications: &[String]) -> String {
    let names: Vec<&str> = medications
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    if names.is_empty() {
        String::new()
    } else {
        format!(" Current medications considered: {}.", names.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::normalise_terms;

    fn risk() -> RuleBasedRiskClassifier {
        RuleBasedRiskClassifier::new(KnowledgeBase::builtin().unwrap())
    }

    fn symptoms() -> RuleBasedSymptomClassifier {
        RuleBasedSymptomClassifier::new(KnowledgeBase::builtin().unwrap())
    }

    #[test]
    fn amoxicillin_with_penicillin_allergy_is_high() {
        let a = risk().assess("Amoxicillin", &normalise_terms(["penicillin"]));
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(
            a.potential_reactions,
            vec!["Allergic reaction to Amoxicillin due to penicillin allergy"]
        );
        assert_eq!(
            a.recommendations,
            vec!["Avoid Amoxicillin. Consult doctor for alternatives."]
        );
    }

    #[test]
    fn no_match_is_low_with_two_generic_recommendations() {
        for (drug, allergies) in [
            ("Acetaminophen", vec!["penicillin"]),
            ("Metformin", vec!["latex", "shellfish"]),
            ("Lisinopril", vec![]),
        ] {
            let a = risk().assess(drug, &normalise_terms(allergies));
            assert_eq!(a.risk_level, RiskLevel::Low, "{drug}");
            assert!(a.potential_reactions.is_empty());
            assert_eq!(a.recommendations.len(), 2);
            assert_eq!(a.recommendations[0], LOW_RISK_RECOMMENDATIONS[0]);
        }
    }

    #[test]
    fn class_member_drug_without_related_allergy_is_low() {
        let a = risk().assess("Amoxicillin", &normalise_terms(["latex"]));
        assert_eq!(a.risk_level, RiskLevel::Low);
    }

    #[test]
    fn drug_named_after_allergy_is_high() {
        let a = risk().assess("Codeine Phosphate", &normalise_terms(["Codeine"]));
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(
            a.potential_reactions,
            vec!["Allergic reaction to Codeine Phosphate due to codeine allergy"]
        );
    }

    #[test]
    fn nsaid_alias_flags_naproxen() {
        let a = risk().assess("Naproxen", &normalise_terms(["NSAIDs"]));
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.potential_reactions.len(), 1);
    }

    #[test]
    fn multiple_allergies_accumulate_without_duplicate_advice() {
        let a = risk().assess("Amoxicillin", &normalise_terms(["penicillin", "beta-lactam antibiotics"]));
        assert_eq!(a.risk_level, RiskLevel::High);
        assert_eq!(a.potential_reactions.len(), 2);
        assert_eq!(a.recommendations.len(), 1);
    }

    #[test]
    fn high_always_has_reactions() {
        for drug in ["Amoxicillin", "Aspirin", "Ibuprofen", "Sulfamethoxazole"] {
            for allergy in ["penicillin", "aspirin", "ibuprofen", "sulfa"] {
                let a = risk().assess(drug, &normalise_terms([allergy]));
                if a.risk_level == RiskLevel::High {
                    assert!(a.potential_reactions.iter().any(|r| !r.is_empty()));
                }
            }
        }
    }

    #[test]
    fn headache_is_side_effect_with_045() {
        let a = symptoms().assess("mild headache after lunch", &[]);
        assert_eq!(a.classification, SymptomClassification::SideEffect);
        assert_eq!(a.confidence_score, 0.45);
    }

    #[test]
    fn hives_dominate_side_effects() {
        let a = symptoms().assess(
            "Hives with nausea, dizziness, headache, fatigue and stomach pain",
            &[],
        );
        assert_eq!(a.classification, SymptomClassification::AllergicReaction);
        assert_eq!(a.confidence_score, 0.55);
    }

    #[test]
    fn allergic_confidence_monotonic_and_capped() {
        let texts = [
            "rash",
            "rash and hives",
            "rash, hives, swelling",
            "rash, hives, swelling, itching",
            "rash, hives, swelling, itching, difficulty breathing",
        ];
        let scores: Vec<f32> = texts
            .iter()
            .map(|t| symptoms().assess(t, &[]).confidence_score)
            .collect();
        assert_eq!(scores, vec![0.55, 0.7, 0.85, 0.9, 0.9]);
        assert!(scores.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn side_effect_confidence_capped_at_080() {
        let a = symptoms().assess("nausea, dizziness, headache, fatigue, stomach pain", &[]);
        assert_eq!(a.classification, SymptomClassification::SideEffect);
        assert_eq!(a.confidence_score, 0.8);
    }

    #[test]
    fn no_indicators_is_unrelated() {
        let a = symptoms().assess("sore knee after running", &["Metformin".into()]);
        assert_eq!(a.classification, SymptomClassification::Unrelated);
        assert_eq!(a.confidence_score, 0.3);
        assert_eq!(a.recommendations.len(), 1);
    }

    #[test]
    fn substring_matching_is_not_word_bounded() {
        // "crashing" contains "rash"
        let a = symptoms().assess("crashing tiredness", &[]);
        assert_eq!(a.classification, SymptomClassification::AllergicReaction);
    }

    #[test]
    fn medications_noted_in_analysis() {
        let a = symptoms().assess("nausea", &["Metformin".into()]);
        assert!(a.ai_analysis.contains("Metformin"));
    }

    #[test]
    fn trait_results_are_tagged_rule_based() {
        let out = risk().classify_drug_risk("Aspirin", &normalise_terms(["aspirin"]));
        assert_eq!(out.source, crate::models::enums::AssessmentSource::RuleBased);
        assert!(out.upstream_error.is_none());
    }
}
