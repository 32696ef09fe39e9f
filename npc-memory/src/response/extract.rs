//! Assembling a normalized result from one agent turn.

use super::fragment::{AgentReplyFragment, ToolCallPayload, ToolStatus};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Tool name used for results that cannot be tied to any call.
const UNKNOWN_TOOL: &str = "unknown";

/// A tool invocation surfaced to the caller. `args` are passed through unvalidated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub tool: String,
    pub args: Map<String, Value>,
}

/// What a tool returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallResult {
    pub tool: String,
    pub result: Value,
    pub status: ToolStatus,
}

impl ToolCallResult {
    fn error(tool: impl Into<String>, raw: Value) -> Self {
        Self {
            tool: tool.into(),
            result: raw,
            status: ToolStatus::Error,
        }
    }
}

/// The normalized output of one agent turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedResponse {
    /// Content of the last text fragment, or empty.
    pub message: String,
    /// Tool calls in fragment order.
    pub tool_calls: Vec<ToolCall>,
    /// `tool_results[i]` belongs to `tool_calls[i]`; `None` if no result arrived.
    pub tool_results: Vec<Option<ToolCallResult>>,
    /// Results that arrived with no unresolved call before them.
    pub uncorrelated_results: Vec<ToolCallResult>,
    /// Error results for calls whose arguments could not be parsed, by
    /// index into `tool_calls`, holding the raw arguments. The calls' own
    /// result slots stay open for the platform's return.
    pub argument_errors: Vec<(usize, ToolCallResult)>,
    /// Reasoning steps in order.
    pub reasoning: Vec<String>,
}

impl ExtractedResponse {
    /// Whether the turn produced nothing at all.
    pub fn is_empty(&self) -> bool {
        self.message.is_empty()
            && self.tool_calls.is_empty()
            && self.uncorrelated_results.is_empty()
            && self.reasoning.is_empty()
    }

    /// Each tool call with its result, if one arrived.
    pub fn pairs(&self) -> impl Iterator<Item = (&ToolCall, Option<&ToolCallResult>)> {
        self.tool_calls
            .iter()
            .zip(self.tool_results.iter().map(Option::as_ref))
    }

    /// Whether any result has error status or any call had bad arguments.
    pub fn has_errors(&self) -> bool {
        self.tool_results
            .iter()
            .flatten()
            .chain(&self.uncorrelated_results)
            .chain(self.argument_errors.iter().map(|(_, r)| r))
            .any(|r| r.status == ToolStatus::Error)
    }

    /// Handle a tool result: fill the nearest preceding unfilled slot.
    fn resolve(&mut self, name: Option<String>, result: Value, status: ToolStatus) {
        match self.tool_results.iter().rposition(Option::is_none) {
            Some(slot) => {
                let tool = name.unwrap_or_else(|| self.tool_calls[slot].tool.clone());
                self.tool_results[slot] = Some(ToolCallResult {
                    tool,
                    result,
                    status,
                });
            }
            None => self.uncorrelated_results.push(ToolCallResult {
                tool: name.unwrap_or_else(|| UNKNOWN_TOOL.to_string()),
                result,
                status,
            }),
        }
    }

    fn call(&mut self, payload: &ToolCallPayload) {
        let args = parse_arguments(&payload.arguments).unwrap_or_else(|| {
            tracing::debug!(tool = %payload.name, "Unparseable tool call arguments");
            let error = ToolCallResult::error(payload.name.clone(), payload.arguments.clone());
            self.argument_errors.push((self.tool_calls.len(), error));
            Map::new()
        });
        self.tool_calls.push(ToolCall {
            tool: payload.name.clone(),
            args,
        });
        self.tool_results.push(None);
    }

    fn push(&mut self, fragment: &AgentReplyFragment) {
        match fragment {
            AgentReplyFragment::Reasoning { reasoning } => self.reasoning.push(reasoning.clone()),
            AgentReplyFragment::ToolCall { tool_call } => self.call(tool_call),
            AgentReplyFragment::ToolReturn {
                name,
                tool_return,
                status,
            } => self.resolve(name.clone(), tool_return.clone(), *status),
            AgentReplyFragment::Text { content } => self.message = content.text(),
            AgentReplyFragment::Other => {}
        }
    }

    /// Record an element that did not parse as any fragment.
    fn push_malformed(&mut self, raw: &Value) {
        let kind = raw.get("message_type").and_then(Value::as_str);
        tracing::debug!(kind = ?kind, "Malformed reply fragment");

        if kind == Some("tool_return_message") {
            let name = raw.get("name").and_then(Value::as_str).map(str::to_string);
            self.resolve(name, raw.clone(), ToolStatus::Error);
        } else {
            let name = raw
                .pointer("/tool_call/name")
                .and_then(Value::as_str)
                .unwrap_or(UNKNOWN_TOOL);
            self.uncorrelated_results
                .push(ToolCallResult::error(name, raw.clone()));
        }
    }
}

/// Arguments as a JSON object, decoding them first if they came as a string.
fn parse_arguments(arguments: &Value) -> Option<Map<String, Value>> {
    let decoded;
    let value = match arguments {
        Value::String(encoded) => {
            decoded = serde_json::from_str::<Value>(encoded).ok()?;
            &decoded
        }
        other => other,
    };
    match value {
        Value::Object(map) => Some(map.clone()),
        _ => None,
    }
}

/// Turns ordered reply fragments into an [`ExtractedResponse`].
///
/// Tool results are matched to calls by position only: each result fills
/// the nearest preceding call that has no result yet. Nothing here fails;
/// garbled fragments become error-status results.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseExtractor;

impl ResponseExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract from typed fragments in a single forward pass.
    pub fn extract(&self, fragments: &[AgentReplyFragment]) -> ExtractedResponse {
        let mut response = ExtractedResponse::default();
        for fragment in fragments {
            response.push(fragment);
        }
        response
    }

    /// Extract from raw JSON fragments as received from the platform.
    pub fn extract_raw(&self, fragments: &[Value]) -> ExtractedResponse {
        let mut response = ExtractedResponse::default();
        for raw in fragments {
            match AgentReplyFragment::deserialize(raw) {
                Ok(fragment) => response.push(&fragment),
                Err(_) => response.push_malformed(raw),
            }
        }
        response
    }
}

impl fmt::Display for ExtractedResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in &self.reasoning {
            writeln!(f, "Reasoning: {step}")?;
        }
        for (call, result) in self.pairs() {
            writeln!(f, "Tool call: {} {}", call.tool, Value::Object(call.args.clone()))?;
            match result {
                Some(r) => writeln!(f, "Tool return ({}): {}", r.status, r.result)?,
                None => writeln!(f, "Tool return: <none>")?,
            }
        }
        for (index, r) in &self.argument_errors {
            writeln!(f, "Bad arguments for call {index} ({}): {}", r.tool, r.result)?;
        }
        for r in &self.uncorrelated_results {
            writeln!(f, "Uncorrelated return from {} ({}): {}", r.tool, r.status, r.result)?;
        }
        if !self.message.is_empty() {
            writeln!(f, "Assistant: {}", self.message)?;
        }
        Ok(())
    }
}
