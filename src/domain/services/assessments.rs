#[cfg(test)]
#[path = "assessments_test.rs"]
mod tests;

use std::str::FromStr;

use serde_json::Value;

use super::Gateway;
use crate::domain::models::AssessmentScores;
use crate::domain::models::BigFiveTraits;
use crate::domain::models::CandidateProfile;
use crate::domain::models::CandidateSummary;
use crate::domain::models::ChatPrompt;
use crate::domain::models::GatewayResponse;
use crate::domain::models::Recommendation;

const ANALYST_INSTRUCTION: &str =
    "You are a recruitment assessment analyst. Reply with a single JSON object and nothing else.";

/// Reads the JSON object the model was asked for, either from a fenced block
/// or from the whole reply.
fn payload_of(res: &GatewayResponse) -> Option<Value> {
    if let Some(payload) = &res.structured_payload {
        return Some(payload.clone());
    }

    return serde_json::from_str::<Value>(res.display_text.trim()).ok();
}

fn summary_prompt(
    profile: &CandidateProfile,
    scores: &AssessmentScores,
    feedback: &str,
    role_label: &str,
) -> String {
    return format!(
        r#"Based on the following candidate data, write a professional summary and a recommendation.

Candidate profile:
- Name: {name}
- Major: {major}
- Position: {role_label}

Assessment scores:
- Logic score: {logic}/100
- Simulation score: {simulation}/100
- Overall score: {overall}/100

Simulation feedback:
{feedback}

Provide:
1. A short summary (2-3 sentences) of the candidate's performance.
2. A recommendation: "RECOMMENDED", "CONSIDER" or "REJECT".

Format the response as JSON:
{{
  "summary": "...",
  "recommendation": "RECOMMENDED|CONSIDER|REJECT"
}}"#,
        name = profile.name,
        major = profile.major,
        logic = scores.logic_score,
        simulation = scores.simulation_score,
        overall = scores.overall_score,
    );
}

fn traits_prompt(feedback: &str, scores: &AssessmentScores) -> String {
    return format!(
        r#"Analyse the following simulation feedback and score the Big Five personality traits (0-100).

Feedback: {feedback}
Logic score: {logic}/100
Simulation score: {simulation}/100

Respond with JSON in this format:
{{
  "openness": 0-100,
  "conscientiousness": 0-100,
  "extraversion": 0-100,
  "agreeableness": 0-100,
  "neuroticism": 0-100
}}"#,
        logic = scores.logic_score,
        simulation = scores.simulation_score,
    );
}

fn trait_score(payload: &Value, key: &str) -> Option<u8> {
    let score = payload.get(key)?.as_f64()?;
    return Some(score.round().clamp(0.0, 100.0) as u8);
}

fn traits_of(payload: &Value) -> Option<BigFiveTraits> {
    return Some(BigFiveTraits {
        openness: trait_score(payload, "openness")?,
        conscientiousness: trait_score(payload, "conscientiousness")?,
        extraversion: trait_score(payload, "extraversion")?,
        agreeableness: trait_score(payload, "agreeableness")?,
        neuroticism: trait_score(payload, "neuroticism")?,
    });
}

/// Recruiter facing reports built on top of the gateway. None of these fail:
/// when the model cannot be reached or answers nonsense, a score based
/// fallback is returned instead.
pub struct Assessments<'a> {
    gateway: &'a Gateway,
}

impl<'a> Assessments<'a> {
    pub fn new(gateway: &'a Gateway) -> Assessments<'a> {
        return Assessments { gateway };
    }

    pub async fn summarize(
        &self,
        profile: &CandidateProfile,
        scores: &AssessmentScores,
        feedback: &str,
        role_label: &str,
    ) -> CandidateSummary {
        let fallback_recommendation = Recommendation::from_overall_score(scores.overall_score);
        let prompt = ChatPrompt::new(
            vec![],
            &summary_prompt(profile, scores, feedback, role_label),
            ANALYST_INSTRUCTION,
        );

        let res = match self.gateway.send(&prompt).await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to generate candidate summary");
                return CandidateSummary {
                    summary: "Unable to create a summary. Please try again.".to_string(),
                    recommendation: fallback_recommendation,
                };
            }
        };

        let payload = match payload_of(&res) {
            Some(payload) if payload.is_object() => payload,
            _ => {
                return CandidateSummary {
                    summary: res.display_text,
                    recommendation: fallback_recommendation,
                };
            }
        };

        let summary = payload
            .get("summary")
            .and_then(|e| return e.as_str())
            .filter(|e| return !e.trim().is_empty())
            .unwrap_or("No summary available")
            .to_string();

        let recommendation = payload
            .get("recommendation")
            .and_then(|e| return e.as_str())
            .and_then(|e| return Recommendation::from_str(e.trim()).ok())
            .unwrap_or(Recommendation::Consider);

        return CandidateSummary {
            summary,
            recommendation,
        };
    }

    pub async fn analyze_traits(&self, feedback: &str, scores: &AssessmentScores) -> BigFiveTraits {
        let fallback = BigFiveTraits::neutral(scores);
        let prompt = ChatPrompt::new(vec![], &traits_prompt(feedback, scores), ANALYST_INSTRUCTION);

        let res = match self.gateway.send(&prompt).await {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Failed to analyze personality traits");
                return fallback;
            }
        };

        let payload = match payload_of(&res) {
            Some(payload) => payload,
            None => return fallback,
        };

        return traits_of(&payload).unwrap_or(fallback);
    }
}
