use std::collections::BTreeSet;

pub const ASSESSMENT_SYSTEM_PROMPT: &str = r#"
You are DrugShield, a medication safety assistant. You assess drug allergy
risk and classify reported symptoms for a consumer health application.

RULES:
1. Be conservative. If unsure, err on the side of caution and rate risk higher.
2. If symptoms suggest a serious condition, recommend immediate medical attention.
3. Never prescribe, never give dosages.
4. Respond with a single JSON object and nothing else.
"#;

/// Build the drug-risk prompt. Allergy order follows the sorted term set,
/// so the same inputs always produce the same prompt.
pub fn build_drug_risk_prompt(drug_name: &str, allergy_terms: &BTreeSet<String>) -> String {
    let allergies = if allergy_terms.is_empty() {
        "None reported".to_string()
    } else {
        allergy_terms.iter().cloned().collect::<Vec<_>>().join(", ")
    };

    format!(
        r#"Analyze the potential risks of prescribing {drug_name} to a patient with the following known allergies: {allergies}.

Provide:
1. Risk level (low, medium or high)
2. Specific potential reactions
3. Medical recommendations

Respond in this JSON format:
{{
  "risk_level": "low | medium | high",
  "potential_reactions": ["reaction1", "reaction2"],
  "recommendations": ["recommendation1", "recommendation2"],
  "confidence_score": 0.95
}}

Be conservative in risk assessment. If unsure, err on the side of caution."#
    )
}

pub fn build_symptom_prompt(symptoms: &str, medications: &[String]) -> String {
    let meds: Vec<&str> = medications
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .collect();
    let meds_line = if meds.is_empty() {
        String::new()
    } else {
        format!("\nCurrent medications: {}", meds.join(", "))
    };

    format!(
        r#"Analyze these symptoms:
<symptoms>
{symptoms}
</symptoms>{meds_line}

Classify the symptoms and respond in this JSON format:
{{
  "classification": "allergic_reaction | side_effect | unrelated | unknown",
  "confidence_score": 0.85,
  "ai_analysis": "Detailed analysis of the symptoms",
  "recommendations": ["recommendation1", "recommendation2"],
  "severity": "mild | moderate | severe",
  "urgency": "low | medium | high"
}}

Focus on safety. If symptoms suggest serious conditions, recommend immediate medical attention."#
    )
}
