//! Flow execution.
//!
//! Every invocation runs the same fixed sequence of stages:
//!
//! 1. **Validate input** against the flow's input contract
//! 2. **Render** the prompt template
//! 3. **Invoke** the model service (bounded by the executor's timeout)
//! 4. **Parse** the raw response as a JSON object
//! 5. **Validate output** against the flow's output contract
//!
//! The first stage that fails ends the invocation with a [`FlowFailure`] of the
//! matching [`FailureKind`]. Nothing is retried, cached or partially returned.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::core::contract::json_kind;
use crate::core::error::{FailureKind, FlowFailure};
use crate::core::flow::FlowDefinition;
use crate::core::model::{ModelError, ModelService};
use crate::core::registry::FlowRegistry;
use crate::core::telemetry::{Telemetry, TraceEntry, TraceOutcome};

/// Default bound on a single model round trip.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Outcome of one invocation.
pub type ExecutionResult = Result<Value, FlowFailure>;

/// Input of one invocation: input field name to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionRequest {
    fields: Map<String, Value>,
}

impl ExecutionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Builds a request from anything that serializes to a JSON object.
    pub fn from_serializable<T: Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        match serde_json::to_value(value)? {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(<serde_json::Error as serde::ser::Error>::custom(format!(
                "a request must be an object, not {}",
                json_kind(&other)
            ))),
        }
    }

    /// Builds a request from a submitted form: every value becomes a string
    /// field. Missing fields are left for the input contract to report.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        fields
            .iter()
            .fold(Self::new(), |request, (name, value)| request.with(name.as_str(), value.as_str()))
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.fields)
    }
}

impl From<Map<String, Value>> for ExecutionRequest {
    fn from(fields: Map<String, Value>) -> Self {
        Self { fields }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    ValidateInput,
    Render,
    Invoke,
    ParseOutput,
    ValidateOutput,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::ValidateInput => "validate-input",
            Stage::Render => "render",
            Stage::Invoke => "invoke",
            Stage::ParseOutput => "parse-output",
            Stage::ValidateOutput => "validate-output",
        })
    }
}

/// Runs flows against a model service.
///
/// Holds no per-call state: clone it freely and call it from as many tasks as
/// needed. The only shared resource is the model service itself.
pub struct FlowExecutor<M: ModelService + ?Sized = dyn ModelService> {
    model: Arc<M>,
    timeout: Option<Duration>,
    telemetry: Option<Arc<dyn Telemetry>>,
}

impl<M: ModelService + ?Sized> Clone for FlowExecutor<M> {
    fn clone(&self) -> Self {
        Self {
            model: Arc::clone(&self.model),
            timeout: self.timeout,
            telemetry: self.telemetry.clone(),
        }
    }
}

impl<M: ModelService> FlowExecutor<M> {
    pub fn new(model: M) -> Self {
        Self::from_arc(Arc::new(model))
    }
}

impl<M: ModelService + ?Sized> FlowExecutor<M> {
    /// Uses an already shared model service.
    pub fn from_arc(model: Arc<M>) -> Self {
        Self {
            model,
            timeout: Some(DEFAULT_TIMEOUT),
            telemetry: None,
        }
    }

    /// Bounds each model round trip. `None` waits indefinitely.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_telemetry(mut self, telemetry: Arc<dyn Telemetry>) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Looks `name` up in `registry` and executes it.
    pub async fn execute_named(
        &self,
        registry: &FlowRegistry,
        name: &str,
        request: ExecutionRequest,
    ) -> ExecutionResult {
        match registry.get(name) {
            Some(flow) => self.execute(flow, request).await,
            None => {
                log::warn!("Requested unknown flow '{}'", name);
                Err(FlowFailure::invalid_input(format!("Unknown flow '{name}'")))
            }
        }
    }

    /// Executes `flow` once.
    pub async fn execute(&self, flow: &FlowDefinition, request: ExecutionRequest) -> ExecutionResult {
        let invocation_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        let result = self.run_stages(flow, request.into_value(), invocation_id).await;

        match &result {
            Ok(_) => log::debug!("[{}] flow '{}' succeeded", invocation_id, flow.name()),
            Err(failure) => log::warn!(
                "[{}] flow '{}' failed with {}: {}",
                invocation_id,
                flow.name(),
                failure.kind,
                failure.message
            ),
        }

        if let Some(telemetry) = &self.telemetry {
            telemetry.record(TraceEntry {
                invocation_id,
                flow: flow.name().to_string(),
                model: self.model.model_name().to_string(),
                started_at,
                elapsed_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
                outcome: match &result {
                    Ok(_) => TraceOutcome::Success,
                    Err(failure) => TraceOutcome::Failure(failure.kind),
                },
            });
        }

        result
    }

    async fn run_stages(&self, flow: &FlowDefinition, input: Value, id: Uuid) -> ExecutionResult {
        let name = flow.name();

        log::debug!("[{}] {}: {}", id, name, Stage::ValidateInput);
        flow.input()
            .validate(&input)
            .map_err(|e| FlowFailure::invalid_input(format!("Invalid input for '{name}': {e}")))?;

        // A built flow binds every placeholder to an input field, so after
        // validation this only fails for templates rendered outside a flow.
        log::debug!("[{}] {}: {}", id, name, Stage::Render);
        let prompt = flow.template().render(&input).map_err(|e| {
            FlowFailure::new(
                FailureKind::RenderFailure,
                format!("Could not build the prompt for '{name}': {e}"),
            )
        })?;

        log::debug!("[{}] {}: {} ({} bytes)", id, name, Stage::Invoke, prompt.len());
        let raw = self.invoke(&prompt, flow.output_shape()).await.map_err(|e| {
            FlowFailure::new(
                FailureKind::ModelUnavailable,
                format!("Model service unavailable for '{name}': {e}"),
            )
        })?;

        log::debug!("[{}] {}: {}", id, name, Stage::ParseOutput);
        let output = parse_model_output(&raw).map_err(|reason| {
            FlowFailure::malformed_output(format!(
                "Model response for '{name}' is not a JSON object: {reason}"
            ))
        })?;

        log::debug!("[{}] {}: {}", id, name, Stage::ValidateOutput);
        flow.output().validate(&output).map_err(|e| {
            FlowFailure::malformed_output(format!(
                "Model response for '{name}' does not match its output contract: {e}"
            ))
        })?;

        Ok(output)
    }

    async fn invoke(&self, prompt: &str, output_shape: &str) -> Result<String, ModelError> {
        let call = self.model.invoke(prompt, output_shape);
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .map_err(|_| ModelError::Timeout(limit))?,
            None => call.await,
        }
    }
}

/// Interprets a raw model response as a JSON object.
///
/// Accepts a bare object, an object inside a Markdown code fence, or an object
/// surrounded by prose (first `{` to last `}`).
pub fn parse_model_output(raw: &str) -> Result<Value, String> {
    let text = strip_code_fence(raw.trim());
    if text.is_empty() {
        return Err("empty response".to_string());
    }

    let parsed = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(first) => match (text.find('{'), text.rfind('}')) {
            (Some(start), Some(end)) if start < end => {
                serde_json::from_str(&text[start..=end]).map_err(|_| first.to_string())?
            }
            _ => return Err(first.to_string()),
        },
    };

    match parsed {
        Value::Object(_) => Ok(parsed),
        other => Err(format!("expected an object, found {}", json_kind(&other))),
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(body) = text.strip_prefix("```") else {
        return text;
    };
    // Skip the info string (`json`, `JSON`, ...) on the opening line.
    let body = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    body.strip_suffix("```").unwrap_or(body).trim()
}
