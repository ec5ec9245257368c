//! Companion chat and mood contracts
//!
//! Two output shapes exist for the companion capability. They are kept on
//! separate actions: `getEmpatheticResponse` answers with free text,
//! `getMoodInsights` answers with a score and table-driven suggestions.

use serde::{Deserialize, Serialize};

use super::Validate;
use crate::error::{GatewayError, Result};
use crate::sentiment::SentimentScore;

/// Longest message accepted from the UI
pub const MAX_MESSAGE_CHARS: usize = 4000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Model,
}

impl ChatRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChatRole::User => "user",
            ChatRole::Model => "model",
        }
    }
}

/// One exchange in a conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            text: text.into(),
        }
    }
}

/// Companion request; `history` is the full prior conversation, oldest first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanionRequest {
    pub user_input: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<ChatTurn>,
}

impl CompanionRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
            history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<ChatTurn>) -> Self {
        self.history = history;
        self
    }
}

impl Validate for CompanionRequest {
    fn validate(&self) -> Result<()> {
        validate_message(&self.user_input)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanionReply {
    pub response: String,
}

/// Mood check request (single message, no history)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoodRequest {
    pub user_input: String,
}

impl MoodRequest {
    pub fn new(user_input: impl Into<String>) -> Self {
        Self {
            user_input: user_input.into(),
        }
    }
}

impl Validate for MoodRequest {
    fn validate(&self) -> Result<()> {
        validate_message(&self.user_input)
    }
}

/// Scored emotional valence with its fixed suggestion pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentResult {
    pub sentiment_score: SentimentScore,
    pub suggested_actions: Vec<String>,
}

impl SentimentResult {
    pub fn from_score(score: SentimentScore) -> Self {
        Self {
            sentiment_score: score,
            suggested_actions: crate::sentiment::suggested_actions(score),
        }
    }
}

fn validate_message(text: &str) -> Result<()> {
    if text.trim().is_empty() {
        return Err(GatewayError::validation("userInput must not be empty"));
    }
    let chars = text.chars().count();
    if chars > MAX_MESSAGE_CHARS {
        return Err(GatewayError::validation(format!(
            "userInput is {} characters, limit is {}",
            chars, MAX_MESSAGE_CHARS
        )));
    }
    Ok(())
}
