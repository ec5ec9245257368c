//! Accessibility profile and recommended UI configuration

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Validate;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionLevel {
    None,
    Low,
    Moderate,
    Severe,
}

/// Motor and cognitive needs share one scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImpairmentLevel {
    None,
    Mild,
    Moderate,
    Severe,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommunicationMode {
    Text,
    Speech,
    Sign,
}

impl fmt::Display for VisionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisionLevel::None => write!(f, "none"),
            VisionLevel::Low => write!(f, "low"),
            VisionLevel::Moderate => write!(f, "moderate"),
            VisionLevel::Severe => write!(f, "severe"),
        }
    }
}

impl fmt::Display for ImpairmentLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImpairmentLevel::None => write!(f, "none"),
            ImpairmentLevel::Mild => write!(f, "mild"),
            ImpairmentLevel::Moderate => write!(f, "moderate"),
            ImpairmentLevel::Severe => write!(f, "severe"),
        }
    }
}

impl fmt::Display for CommunicationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommunicationMode::Text => write!(f, "text"),
            CommunicationMode::Speech => write!(f, "speech"),
            CommunicationMode::Sign => write!(f, "sign"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessibilityNeeds {
    pub vision: VisionLevel,
    pub motor: ImpairmentLevel,
    pub cognitive: ImpairmentLevel,
}

/// User's stated accessibility needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessibilityProfile {
    pub accessibility_needs: AccessibilityNeeds,
    pub preferred_communication_mode: CommunicationMode,
}

impl AccessibilityProfile {
    pub fn new(
        vision: VisionLevel,
        motor: ImpairmentLevel,
        cognitive: ImpairmentLevel,
        mode: CommunicationMode,
    ) -> Self {
        Self {
            accessibility_needs: AccessibilityNeeds {
                vision,
                motor,
                cognitive,
            },
            preferred_communication_mode: mode,
        }
    }
}

impl Validate for AccessibilityProfile {
    // every field is a closed enum, so a deserialized profile is already valid
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

/// Recommended UI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConfig {
    pub font_size: String,
    pub contrast_level: String,
    pub voice_navigation_enabled: bool,
    pub gesture_control_enabled: bool,
    pub sign_language_support: bool,
    pub preferred_language: String,
}

impl UiConfig {
    /// Deterministic configuration used when no provider is consulted
    pub fn derive_from(profile: &AccessibilityProfile) -> Self {
        let motor = profile.accessibility_needs.motor;
        Self {
            font_size: "large".to_string(),
            contrast_level: "high".to_string(),
            voice_navigation_enabled: motor != ImpairmentLevel::None,
            gesture_control_enabled: motor == ImpairmentLevel::Severe,
            sign_language_support: profile.preferred_communication_mode == CommunicationMode::Sign,
            preferred_language: "en".to_string(),
        }
    }

    /// Force sign-language support to follow the preferred communication mode
    ///
    /// Returns true when the value had to be corrected.
    pub fn reconcile_sign_support(&mut self, profile: &AccessibilityProfile) -> bool {
        let expected = profile.preferred_communication_mode == CommunicationMode::Sign;
        let corrected = self.sign_language_support != expected;
        self.sign_language_support = expected;
        corrected
    }
}
