//! Structured extraction of multi-part agent replies.
//!
//! An agent turn arrives as an ordered list of fragments: reasoning steps,
//! tool calls, tool results and text. [`ResponseExtractor`] folds them into
//! one [`ExtractedResponse`] for display and action dispatch.

mod extract;
mod fragment;

pub use extract::{ExtractedResponse, ResponseExtractor, ToolCall, ToolCallResult};
pub use fragment::{AgentReplyFragment, AssistantContent, TextPart, ToolCallPayload, ToolStatus};
