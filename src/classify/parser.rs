//! Best-effort parsing of generated text into assessments.
//!
//! The outcome distinguishes text that is not a JSON object at all from a
//! JSON object with missing or out-of-schema fields, because the two map
//! to different fallback wording.

use serde::Deserialize;

use crate::models::enums::{RiskLevel, SymptomClassification, SymptomSeverity, Urgency};
use crate::models::{DrugRiskAssessment, SymptomAssessment};

/// Reaction line attached to a `high` result that came without reasons.
pub const UNSPECIFIED_HIGH_RISK_REACTION: &str =
    "Potential adverse reaction flagged; details not provided";

#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome<T> {
    Parsed(T),
    NotJson,
    Malformed(String),
}

/// Trim and drop a surrounding Markdown code fence (```` ``` ```` or ```` ```json ````).
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Skip the info string on the opening fence line.
    let body = match rest.find('\n') {
        Some(nl) => &rest[nl + 1..],
        None => return trimmed,
    };
    let body = body.trim_end();
    body.strip_suffix("```").unwrap_or(body).trim()
}

#[derive(Deserialize)]
struct RawDrugRisk {
    risk_level: String,
    potential_reactions: Vec<String>,
    recommendations: Vec<String>,
    #[serde(default)]
    confidence_score: Option<f64>,
}

#[derive(Deserialize)]
struct RawSymptom {
    classification: String,
    confidence_score: f64,
    #[serde(default)]
    ai_analysis: Option<String>,
    recommendations: Vec<String>,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    urgency: Option<String>,
}

/// Parse a drug-risk response. On success `ai_analysis` holds the
/// generated text.
pub fn parse_drug_risk(response: &str) -> ParseOutcome<DrugRiskAssessment> {
    let json = strip_code_fence(response);
    if !json.starts_with('{') {
        return ParseOutcome::NotJson;
    }

    let raw: RawDrugRisk = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => return ParseOutcome::Malformed(e.to_string()),
    };

    let risk_level = match parse_enum::<RiskLevel>(&raw.risk_level) {
        Ok(level) => level,
        Err(reason) => return ParseOutcome::Malformed(reason),
    };

    let mut potential_reactions = non_empty(raw.potential_reactions);
    if risk_level == RiskLevel::High && potential_reactions.is_empty() {
        potential_reactions.push(UNSPECIFIED_HIGH_RISK_REACTION.to_string());
    }

    ParseOutcome::Parsed(DrugRiskAssessment {
        risk_level,
        potential_reactions,
        recommendations: non_empty(raw.recommendations),
        ai_analysis: Some(response.trim().to_string()),
        confidence_score: raw.confidence_score.map(clamp_confidence),
    })
}

/// Parse a symptom response. The model's own `ai_analysis` wins when
/// present; otherwise the generated text is kept.
pub fn parse_symptoms(response: &str) -> ParseOutcome<SymptomAssessment> {
    let json = strip_code_fence(response);
    if !json.starts_with('{') {
        return ParseOutcome::NotJson;
    }

    let raw: RawSymptom = match serde_json::from_str(json) {
        Ok(raw) => raw,
        Err(e) => return ParseOutcome::Malformed(e.to_string()),
    };

    let classification = match parse_enum::<SymptomClassification>(&raw.classification) {
        Ok(c) => c,
        Err(reason) => return ParseOutcome::Malformed(reason),
    };
    let severity = match raw.severity.as_deref().map(parse_enum::<SymptomSeverity>).transpose() {
        Ok(s) => s,
        Err(reason) => return ParseOutcome::Malformed(reason),
    };
    let urgency = match raw.urgency.as_deref().map(parse_enum::<Urgency>).transpose() {
        Ok(u) => u,
        Err(reason) => return ParseOutcome::Malformed(reason),
    };

    let ai_analysis = raw
        .ai_analysis
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .unwrap_or_else(|| response.trim().to_string());

    ParseOutcome::Parsed(SymptomAssessment {
        classification,
        confidence_score: clamp_confidence(raw.confidence_score) as f32,
        ai_analysis,
        recommendations: non_empty(raw.recommendations),
        severity,
        urgency,
    })
}

fn parse_enum<T>(value: &str) -> Result<T, String>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .to_lowercase()
        .parse::<T>()
        .map_err(|e| e.to_string())
}

fn clamp_confidence(value: f64) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0) as f32
    }
}

fn non_empty(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
