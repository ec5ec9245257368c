//! Sentiment scores and the suggested-action table
//!
//! Suggestions are never generated by the provider. A score is bucketed with
//! strict inequalities (exactly ±0.5 is neutral) and the bucket selects one of
//! three fixed two-item lists.

use serde::{Deserialize, Serialize};

/// Emotional valence of a message, always within [-1.0, 1.0]
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SentimentScore(f64);

impl SentimentScore {
    pub const MIN: f64 = -1.0;
    pub const MAX: f64 = 1.0;

    /// Accept a score only if it is finite and inside the domain
    pub fn new(value: f64) -> Option<Self> {
        if value.is_finite() && (Self::MIN..=Self::MAX).contains(&value) {
            Some(Self(value))
        } else {
            None
        }
    }

    /// Clamp a finite model-produced score into the domain
    pub fn clamped(value: f64) -> Option<Self> {
        value
            .is_finite()
            .then(|| Self(value.clamp(Self::MIN, Self::MAX)))
    }

    pub fn value(&self) -> f64 {
        self.0
    }

    pub fn bucket(&self) -> SentimentBucket {
        SentimentBucket::for_score(self.0)
    }
}

/// Which fixed suggestion list a score selects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SentimentBucket {
    Positive,
    Neutral,
    Supportive,
}

const POSITIVE_ACTIONS: [&str; 2] = [
    "That sounds wonderful! Maybe share that positivity with a friend.",
    "Keep embracing that feeling!",
];

const NEUTRAL_ACTIONS: [&str; 2] = [
    "Thanks for sharing how you feel. Take a moment to notice what is on your mind.",
    "A short walk or a glass of water can help you reset.",
];

const SUPPORTIVE_ACTIONS: [&str; 2] = [
    "It's okay to feel that way. Perhaps taking a few deep breaths could help.",
    "Consider writing down your thoughts in the journal.",
];

impl SentimentBucket {
    pub fn for_score(score: f64) -> Self {
        if score > 0.5 {
            SentimentBucket::Positive
        } else if score < -0.5 {
            SentimentBucket::Supportive
        } else {
            SentimentBucket::Neutral
        }
    }

    pub fn actions(&self) -> &'static [&'static str; 2] {
        match self {
            SentimentBucket::Positive => &POSITIVE_ACTIONS,
            SentimentBucket::Neutral => &NEUTRAL_ACTIONS,
            SentimentBucket::Supportive => &SUPPORTIVE_ACTIONS,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentBucket::Positive => "positive",
            SentimentBucket::Neutral => "neutral",
            SentimentBucket::Supportive => "supportive",
        }
    }
}

/// Suggested actions for a score, in table order
pub fn suggested_actions(score: SentimentScore) -> Vec<String> {
    score
        .bucket()
        .actions()
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Two-way keyword heuristic used when no provider is configured
///
/// "happy" or "good" anywhere in the lower-cased text scores 0.8, anything
/// else -0.4.
pub fn keyword_score(text: &str) -> SentimentScore {
    let lowered = text.to_lowercase();
    if lowered.contains("happy") || lowered.contains("good") {
        SentimentScore(0.8)
    } else {
        SentimentScore(-0.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_boundaries_are_neutral() {
        assert_eq!(SentimentBucket::for_score(0.5), SentimentBucket::Neutral);
        assert_eq!(SentimentBucket::for_score(-0.5), SentimentBucket::Neutral);
        assert_eq!(SentimentBucket::for_score(0.500001), SentimentBucket::Positive);
        assert_eq!(SentimentBucket::for_score(-0.500001), SentimentBucket::Supportive);
    }

    #[test]
    fn test_score_domain() {
        assert!(SentimentScore::new(1.0).is_some());
        assert!(SentimentScore::new(-1.0).is_some());
        assert!(SentimentScore::new(1.01).is_none());
        assert!(SentimentScore::new(f64::NAN).is_none());
        assert_eq!(SentimentScore::clamped(3.0).unwrap().value(), 1.0);
        assert_eq!(SentimentScore::clamped(-7.5).unwrap().value(), -1.0);
        assert!(SentimentScore::clamped(f64::INFINITY).is_none());
    }

    #[test]
    fn test_keyword_heuristic() {
        assert_eq!(keyword_score("I feel GOOD today").value(), 0.8);
        assert_eq!(keyword_score("so Happy").value(), 0.8);
        assert_eq!(keyword_score("I am not feeling well").value(), -0.4);
    }

    #[test]
    fn test_mildly_negative_gets_neutral_pair() {
        let actions = suggested_actions(keyword_score("I am not feeling well"));
        assert_eq!(actions, NEUTRAL_ACTIONS.to_vec());
        assert_ne!(actions, SUPPORTIVE_ACTIONS.to_vec());
    }

    #[test]
    fn test_score_serializes_as_number() {
        let json = serde_json::to_string(&SentimentScore(0.25)).unwrap();
        assert_eq!(json, "0.25");
    }

    proptest! {
        #[test]
        fn prop_bucket_matches_strict_thresholds(score in -1.0f64..=1.0) {
            let actions = suggested_actions(SentimentScore::new(score).unwrap());
            let expected: &[&str; 2] = if score > 0.5 {
                &POSITIVE_ACTIONS
            } else if score < -0.5 {
                &SUPPORTIVE_ACTIONS
            } else {
                &NEUTRAL_ACTIONS
            };
            prop_assert_eq!(actions, expected.to_vec());
        }
    }
}
