//! Generative invocation wrapper
//!
//! Renders an operation's template, sends one request to the provider under
//! a deadline, and checks the reply against the declared output shape. The
//! wrapper never retries; transient failures are retried inside the provider
//! client, if at all.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::contracts::ChatTurn;
use crate::error::{GatewayError, Result};
use crate::operations::{template, OperationRegistry, OperationSpec, OutputShape};
use crate::provider::{Blob, Content, GenerationRequest, GenerationResponse, GenerativeProvider, Part};

/// Validated result of one invocation
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutput {
    Object(Map<String, Value>),
    Text(String),
    Audio(Blob),
}

pub struct Invoker {
    provider: Arc<dyn GenerativeProvider>,
    registry: Arc<OperationRegistry>,
    timeout: Duration,
}

impl Invoker {
    pub fn new(
        provider: Arc<dyn GenerativeProvider>,
        registry: Arc<OperationRegistry>,
        timeout: Duration,
    ) -> Self {
        Self {
            provider,
            registry,
            timeout,
        }
    }

    pub fn registry(&self) -> &OperationRegistry {
        &self.registry
    }

    /// Invoke an operation with no prior conversation
    pub async fn invoke(&self, operation: &str, input: &Value) -> Result<InvocationOutput> {
        self.invoke_with_history(operation, input, &[]).await
    }

    /// Invoke an operation, replaying `history` before the rendered prompt
    pub async fn invoke_with_history(
        &self,
        operation: &str,
        input: &Value,
        history: &[ChatTurn],
    ) -> Result<InvocationOutput> {
        let spec = self.registry.get(operation)?;
        let request = build_request(spec, input, history)?;

        let start = Instant::now();
        let response = tokio::time::timeout(self.timeout, self.provider.generate(request))
            .await
            .map_err(|_| GatewayError::Timeout {
                operation: spec.name.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            })??;

        tracing::debug!(
            operation = spec.name,
            provider = self.provider.name(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Provider call completed"
        );

        check_output(spec, response)
    }

    /// Invoke a structured operation and deserialize its object
    pub async fn invoke_object<T: DeserializeOwned>(&self, operation: &str, input: &Value) -> Result<T> {
        match self.invoke(operation, input).await? {
            InvocationOutput::Object(map) => {
                let spec = self.registry.get(operation)?;
                serde_json::from_value(Value::Object(map)).map_err(|e| {
                    tracing::warn!(operation = spec.name, error = %e, "Structured output failed to deserialize");
                    spec.failure()
                })
            }
            _ => Err(self.registry.get(operation)?.failure()),
        }
    }
}

/// Assemble the provider request: history in order, then the rendered prompt
pub fn build_request(spec: &OperationSpec, input: &Value, history: &[ChatTurn]) -> Result<GenerationRequest> {
    let parts = template::render(spec.template, input)?;

    let mut contents: Vec<Content> = history
        .iter()
        .map(|turn| Content {
            role: turn.role,
            parts: vec![Part::Text(turn.text.clone())],
        })
        .collect();
    contents.push(Content::user(parts));

    Ok(GenerationRequest {
        operation: spec.name.to_string(),
        model: spec.model,
        system_instruction: spec.system_instruction.map(str::to_string),
        contents,
        temperature: spec.temperature,
        response_format: spec.response_format(),
    })
}

fn check_output(spec: &OperationSpec, response: GenerationResponse) -> Result<InvocationOutput> {
    match &spec.output {
        OutputShape::Audio => match response.audio {
            Some(blob) if !blob.data.is_empty() => Ok(InvocationOutput::Audio(blob)),
            _ => {
                tracing::warn!(operation = spec.name, "Provider returned no audio");
                Err(spec.failure())
            }
        },
        OutputShape::Text => match response.text {
            Some(text) if !text.trim().is_empty() => Ok(InvocationOutput::Text(text)),
            _ => {
                tracing::warn!(operation = spec.name, "Provider returned no text");
                Err(spec.failure())
            }
        },
        OutputShape::Object(_) => {
            let Some(text) = response.text.filter(|t| !t.trim().is_empty()) else {
                tracing::warn!(operation = spec.name, "Provider returned no structured output");
                return Err(spec.failure());
            };
            let value: Value = serde_json::from_str(strip_code_fence(&text)).map_err(|e| {
                tracing::warn!(operation = spec.name, error = %e, "Structured output is not valid JSON");
                spec.failure()
            })?;
            spec.conform(value).map(InvocationOutput::Object)
        }
    }
}

/// Models sometimes wrap JSON in a Markdown fence even when asked not to
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
