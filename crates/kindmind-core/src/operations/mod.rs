//! Operation registry
//!
//! Each operation is a named prompt definition: the input fields its
//! template reads, the model that serves it, the output shape the response
//! must satisfy, and the sentence completing "Failed to ..." when it does not.
//! The registry is built once and shared read-only.

pub mod template;

use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::error::{GatewayError, Result};
use crate::provider::{ModelKind, ResponseFormat};

pub const ADAPT_ACCESSIBILITY_UI: &str = "adaptAccessibilityUI";
pub const ANALYZE_SENTIMENT: &str = "analyzeSentiment";
pub const EMPATHETIC_COMPANION: &str = "empatheticCompanion";
pub const GENERATE_SPEECH: &str = "generateSpeech";
pub const TRANSLATE_SIGN_LANGUAGE: &str = "translateSignLanguage";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    Boolean,
}

impl FieldKind {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::Boolean => value.is_boolean(),
        }
    }

    fn schema_type(&self) -> &'static str {
        match self {
            FieldKind::String => "STRING",
            FieldKind::Number => "NUMBER",
            FieldKind::Boolean => "BOOLEAN",
        }
    }
}

/// One field of a structured output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub description: &'static str,
}

impl FieldSpec {
    pub const fn required(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: true,
            description,
        }
    }

    pub const fn optional(name: &'static str, kind: FieldKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            required: false,
            description,
        }
    }
}

/// Declared shape of an operation's output
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputShape {
    /// JSON object with the listed fields
    Object(Vec<FieldSpec>),
    /// Non-empty free text
    Text,
    /// Raw audio bytes
    Audio,
}

/// A named prompt definition
#[derive(Debug, Clone)]
pub struct OperationSpec {
    pub name: &'static str,
    pub model: ModelKind,
    pub system_instruction: Option<&'static str>,
    pub template: &'static str,
    pub output: OutputShape,
    pub temperature: Option<f32>,
    /// Completes "Failed to ..." when the provider yields nothing usable
    pub failure_reason: &'static str,
}

impl OperationSpec {
    /// Input fields read by the template
    pub fn input_fields(&self) -> Vec<String> {
        template::placeholders(self.template)
    }

    pub fn response_format(&self) -> ResponseFormat {
        match &self.output {
            OutputShape::Object(fields) => ResponseFormat::Json(Some(response_schema(fields))),
            OutputShape::Text => ResponseFormat::Text,
            OutputShape::Audio => ResponseFormat::Audio,
        }
    }

    pub fn failure(&self) -> GatewayError {
        GatewayError::generation(self.name, self.failure_reason)
    }

    /// Check a decoded JSON object against the declared fields
    ///
    /// Unknown fields are dropped; optional fields may be absent or null.
    pub fn conform(&self, value: Value) -> Result<Map<String, Value>> {
        let OutputShape::Object(fields) = &self.output else {
            return Err(self.failure());
        };
        let Value::Object(mut object) = value else {
            tracing::warn!(operation = self.name, "Structured output is not a JSON object");
            return Err(self.failure());
        };

        let mut conformed = Map::new();
        for field in fields {
            match object.remove(field.name) {
                Some(Value::Null) | None if !field.required => {}
                Some(v) if field.kind.matches(&v) => {
                    conformed.insert(field.name.to_string(), v);
                }
                other => {
                    tracing::warn!(
                        operation = self.name,
                        field = field.name,
                        found = ?other,
                        "Structured output does not match the declared shape"
                    );
                    return Err(self.failure());
                }
            }
        }
        Ok(conformed)
    }
}

fn response_schema(fields: &[FieldSpec]) -> Value {
    let properties: Map<String, Value> = fields
        .iter()
        .map(|f| {
            (
                f.name.to_string(),
                json!({"type": f.kind.schema_type(), "description": f.description}),
            )
        })
        .collect();
    let required: Vec<&str> = fields.iter().filter(|f| f.required).map(|f| f.name).collect();
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": required,
    })
}

/// Name-indexed set of operations
#[derive(Debug, Clone, Default)]
pub struct OperationRegistry {
    operations: HashMap<&'static str, OperationSpec>,
}

impl OperationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every operation the gateway uses
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(adapt_accessibility_ui());
        registry.register(analyze_sentiment());
        registry.register(empathetic_companion());
        registry.register(generate_speech());
        registry.register(translate_sign_language());
        registry
    }

    pub fn register(&mut self, spec: OperationSpec) {
        self.operations.insert(spec.name, spec);
    }

    pub fn get(&self, name: &str) -> Result<&OperationSpec> {
        self.operations
            .get(name)
            .ok_or_else(|| GatewayError::config(format!("unknown operation '{}'", name)))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

fn adapt_accessibility_ui() -> OperationSpec {
    OperationSpec {
        name: ADAPT_ACCESSIBILITY_UI,
        model: ModelKind::Text,
        system_instruction: None,
        template: "You are an AI expert in designing accessible user interfaces. Given the user's \
accessibility needs and preferred communication mode, recommend an optimal UI configuration.

Accessibility Needs:
Vision: {{{accessibilityNeeds.vision}}}
Motor: {{{accessibilityNeeds.motor}}}
Cognitive: {{{accessibilityNeeds.cognitive}}}
Preferred Communication Mode: {{{preferredCommunicationMode}}}

Based on these needs, provide the following UI configuration:
- font size (e.g., small, medium, large, extra large)
- contrast level (e.g., low, medium, high)
- voice navigation enabled (true/false)
- gesture control enabled (true/false)
- sign language support enabled (true/false)
- preferred language (e.g., en, es, fr)

Ensure the configuration is tailored to the user's specific needs and promotes ease of use and accessibility.",
        output: OutputShape::Object(vec![
            FieldSpec::required("fontSize", FieldKind::String, "The recommended font size for the user."),
            FieldSpec::required("contrastLevel", FieldKind::String, "The recommended contrast level for the user."),
            FieldSpec::required("voiceNavigationEnabled", FieldKind::Boolean, "Whether voice navigation should be enabled."),
            FieldSpec::required("gestureControlEnabled", FieldKind::Boolean, "Whether gesture control should be enabled."),
            FieldSpec::required("signLanguageSupport", FieldKind::Boolean, "Whether sign language support should be enabled."),
            FieldSpec::required("preferredLanguage", FieldKind::String, "The preferred language of the user."),
        ]),
        temperature: None,
        failure_reason: "adapt the accessibility UI.",
    }
}

fn analyze_sentiment() -> OperationSpec {
    OperationSpec {
        name: ANALYZE_SENTIMENT,
        model: ModelKind::Text,
        system_instruction: None,
        template: "Analyze the sentiment of the following text and provide a sentiment score.

Text: {{{text}}}

Respond with a JSON object containing the sentimentScore.",
        output: OutputShape::Object(vec![FieldSpec::required(
            "sentimentScore",
            FieldKind::Number,
            "The sentiment score of the text, from -1.0 (negative) to 1.0 (positive).",
        )]),
        temperature: None,
        failure_reason: "analyze sentiment.",
    }
}

const COMPANION_PERSONA: &str = "You are an empathetic AI companion designed for Deaf users.
You communicate in clear, simple, friendly text.
You never say you cannot respond, you never show technical errors, and you never say you are having trouble.
If a user expresses sadness, stress, or emotional discomfort, respond with care and understanding.

Your responses should always:
- Start with empathy (e.g., \"I'm sorry you feel this way\" / \"That sounds really hard\")
- Ask how you can help
- Be supportive and kind
- Use short, clear sentences (easy to read)
- Avoid long paragraphs
- Never sound robotic
- Never refuse to answer unless the message is unsafe
- NEVER say \"I can't respond\", \"I'm having trouble\", \"Try again later\", or similar.

Example correct tone:
User: \"I am not feeling well\"
AI: \"I'm really sorry to hear that. That must feel difficult. I'm here for you. How can I help you feel a little better?\"

If the user feels sad, structure the reply as: empathy, a direct support question, a short comforting line.
Example:
\"I'm really sorry you're feeling low today.
That sounds tough.
Do you want to tell me what's bothering you, or should I try to cheer you up?\"";

fn empathetic_companion() -> OperationSpec {
    OperationSpec {
        name: EMPATHETIC_COMPANION,
        model: ModelKind::Text,
        system_instruction: Some(COMPANION_PERSONA),
        template: "User message: \"{{{userInput}}}\"",
        output: OutputShape::Text,
        temperature: Some(0.7),
        failure_reason: "generate a companion response.",
    }
}

fn generate_speech() -> OperationSpec {
    OperationSpec {
        name: GENERATE_SPEECH,
        model: ModelKind::Speech,
        system_instruction: None,
        template: "{{{text}}}",
        output: OutputShape::Audio,
        temperature: None,
        failure_reason: "generate speech from text.",
    }
}

fn translate_sign_language() -> OperationSpec {
    OperationSpec {
        name: TRANSLATE_SIGN_LANGUAGE,
        model: ModelKind::Vision,
        system_instruction: None,
        template: "You are an expert sign language translator with the ability to understand emotional context.

You will receive a video of sign language. Provide an accurate text translation.
Based on the user's facial expressions and the context of the signs, also determine the emotion or intent behind the message.

Video: {{media url=videoDataUri}}

Respond in JSON format with the translatedText, confidenceScore, and emotion fields.
Example:
{
  \"translatedText\": \"Where is the hospital?\",
  \"confidenceScore\": 0.92,
  \"emotion\": \"Urgent and questioning\"
}",
        output: OutputShape::Object(vec![
            FieldSpec::required("translatedText", FieldKind::String, "The translated text of the sign language video."),
            FieldSpec::required(
                "confidenceScore",
                FieldKind::Number,
                "A score indicating the confidence of the translation, from 0 to 1.",
            ),
            FieldSpec::optional(
                "emotion",
                FieldKind::String,
                "The detected emotion or intent from the video (e.g., \"questioning\", \"urgent\", \"happy\").",
            ),
        ]),
        temperature: None,
        failure_reason: "translate sign language.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_registry() {
        let registry = OperationRegistry::builtin();
        assert_eq!(registry.len(), 5);
        assert!(registry.get("nope").is_err());
        assert_eq!(
            registry.get(ADAPT_ACCESSIBILITY_UI).unwrap().input_fields(),
            vec![
                "accessibilityNeeds.vision",
                "accessibilityNeeds.motor",
                "accessibilityNeeds.cognitive",
                "preferredCommunicationMode"
            ]
        );
        assert_eq!(
            registry.get(TRANSLATE_SIGN_LANGUAGE).unwrap().input_fields(),
            vec!["videoDataUri"]
        );
    }

    #[test]
    fn test_conform_drops_unknown_and_allows_missing_optional() {
        let spec = translate_sign_language();
        let out = spec
            .conform(json!({"translatedText": "hi", "confidenceScore": 0.5, "extra": 1}))
            .unwrap();
        assert_eq!(out.len(), 2);
        assert!(!out.contains_key("extra"));
    }

    #[test]
    fn test_conform_rejects_missing_required_field() {
        let spec = adapt_accessibility_ui();
        let err = spec.conform(json!({"fontSize": "large"})).unwrap_err();
        assert_eq!(err.to_string(), "Failed to adapt the accessibility UI.");
    }

    #[test]
    fn test_conform_rejects_wrong_type() {
        let spec = analyze_sentiment();
        assert!(spec.conform(json!({"sentimentScore": "high"})).is_err());
        assert!(spec.conform(json!([1, 2])).is_err());
    }

    #[test]
    fn test_response_schema_lists_required_fields() {
        let ResponseFormat::Json(Some(schema)) = translate_sign_language().response_format() else {
            panic!("expected JSON format");
        };
        assert_eq!(schema["required"], json!(["translatedText", "confidenceScore"]));
        assert_eq!(schema["properties"]["emotion"]["type"], "STRING");
    }
}
