use serde_derive::Deserialize;
use serde_derive::Serialize;
use strum::EnumString;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub name: String,
    pub major: String,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentScores {
    pub logic_score: u8,
    pub simulation_score: u8,
    pub overall_score: u8,
}

#[derive(
    Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize, EnumString, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum Recommendation {
    Recommended,
    Consider,
    Reject,
}

impl Recommendation {
    pub fn from_overall_score(score: u8) -> Recommendation {
        if score >= 70 {
            return Recommendation::Recommended;
        }
        if score >= 50 {
            return Recommendation::Consider;
        }

        return Recommendation::Reject;
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub summary: String,
    pub recommendation: Recommendation,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigFiveTraits {
    pub openness: u8,
    pub conscientiousness: u8,
    pub extraversion: u8,
    pub agreeableness: u8,
    pub neuroticism: u8,
}

impl BigFiveTraits {
    /// Neutral traits used when the model cannot be asked, leaning on the
    /// logic score for conscientiousness.
    pub fn neutral(scores: &AssessmentScores) -> BigFiveTraits {
        return BigFiveTraits {
            openness: 50,
            conscientiousness: scores.logic_score,
            extraversion: 50,
            agreeableness: 50,
            neuroticism: 50,
        };
    }
}
