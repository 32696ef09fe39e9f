//! Fragments of a multi-part agent reply.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// One typed piece of an agent turn, as sent by the agent platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "message_type")]
pub enum AgentReplyFragment {
    /// An internal reasoning step.
    #[serde(rename = "reasoning_message")]
    Reasoning { reasoning: String },

    /// A tool invocation requested by the agent.
    #[serde(rename = "tool_call_message")]
    ToolCall { tool_call: ToolCallPayload },

    /// The value a tool returned.
    #[serde(rename = "tool_return_message")]
    ToolReturn {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        tool_return: Value,
        status: ToolStatus,
    },

    /// User-facing text.
    #[serde(rename = "assistant_message")]
    Text { content: AssistantContent },

    /// Any other kind (system, user, usage statistics). Ignored.
    #[serde(other)]
    Other,
}

impl AgentReplyFragment {
    pub fn reasoning(reasoning: impl Into<String>) -> Self {
        AgentReplyFragment::Reasoning {
            reasoning: reasoning.into(),
        }
    }

    /// A tool call whose arguments are already a JSON value.
    pub fn tool_call(name: impl Into<String>, arguments: Value) -> Self {
        AgentReplyFragment::ToolCall {
            tool_call: ToolCallPayload {
                name: name.into(),
                arguments,
            },
        }
    }

    pub fn tool_return(name: impl Into<String>, tool_return: Value, status: ToolStatus) -> Self {
        AgentReplyFragment::ToolReturn {
            name: Some(name.into()),
            tool_return,
            status,
        }
    }

    pub fn text(text: impl Into<String>) -> Self {
        AgentReplyFragment::Text {
            content: AssistantContent::Text(text.into()),
        }
    }

    /// Short name of this fragment's kind.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentReplyFragment::Reasoning { .. } => "reasoning",
            AgentReplyFragment::ToolCall { .. } => "tool_call",
            AgentReplyFragment::ToolReturn { .. } => "tool_result",
            AgentReplyFragment::Text { .. } => "text",
            AgentReplyFragment::Other => "other",
        }
    }
}

/// Name and arguments of a tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallPayload {
    pub name: String,
    /// Either a JSON object or a string holding JSON-encoded arguments.
    #[serde(default)]
    pub arguments: Value,
}

/// Text of an assistant message: a plain string or a list of text parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AssistantContent {
    Text(String),
    Parts(Vec<TextPart>),
}

impl AssistantContent {
    /// The text, with parts concatenated.
    pub fn text(&self) -> String {
        match self {
            AssistantContent::Text(text) => text.clone(),
            AssistantContent::Parts(parts) => parts.iter().map(|p| p.text.as_str()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextPart {
    pub text: String,
}

/// Whether a tool ran successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    Success,
    Error,
}

impl fmt::Display for ToolStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolStatus::Success => write!(f, "success"),
            ToolStatus::Error => write!(f, "error"),
        }
    }
}
