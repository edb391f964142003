//! Responses API request/response model.
//!
//! Requests are plain serializable structs. Responses are decoded into an
//! explicit sum type: a unified `output_text` plus a sequence of tagged
//! output items. Item kinds we do not interpret (reasoning, file_search_call,
//! ...) are kept verbatim so they can be echoed back in the next request.

use crate::error::EndpointError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{json, Map, Value};
use std::str::FromStr;

// ============================================================================
// Request side
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    Low,
    Medium,
    #[default]
    High,
}

impl ReasoningEffort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningEffort::Low => "low",
            ReasoningEffort::Medium => "medium",
            ReasoningEffort::High => "high",
        }
    }
}

impl FromStr for ReasoningEffort {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(ReasoningEffort::Low),
            "medium" => Ok(ReasoningEffort::Medium),
            "high" => Ok(ReasoningEffort::High),
            other => Err(format!("unknown reasoning effort {other:?}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Reasoning {
    pub effort: ReasoningEffort,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    Developer,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPart {
    InputText { text: String },
    InputFile { file_id: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<InputPart>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InputMessage {
    pub role: Role,
    pub content: MessageContent,
}

impl InputMessage {
    pub fn system(text: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn user_parts(parts: Vec<InputPart>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Parts(parts),
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            MessageContent::Parts(_) => None,
        }
    }
}

/// Result of a locally executed function call, keyed by its call id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename = "function_call_output")]
pub struct ToolResult {
    pub call_id: String,
    pub output: String,
}

/// One entry of the conversation sent to the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranscriptEntry {
    Message(InputMessage),
    Output(OutputItem),
    ToolResult(ToolResult),
}

impl From<InputMessage> for TranscriptEntry {
    fn from(m: InputMessage) -> Self {
        TranscriptEntry::Message(m)
    }
}

impl From<OutputItem> for TranscriptEntry {
    fn from(item: OutputItem) -> Self {
        TranscriptEntry::Output(item)
    }
}

impl From<ToolResult> for TranscriptEntry {
    fn from(r: ToolResult) -> Self {
        TranscriptEntry::ToolResult(r)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolDeclaration {
    /// Managed search, executed by the endpoint itself.
    FileSearch {
        vector_store_ids: Vec<String>,
        max_num_results: u32,
    },
    /// Function tool executed locally.
    Function {
        name: String,
        description: String,
        parameters: Value,
        strict: bool,
    },
}

impl ToolDeclaration {
    pub fn file_search(vector_store_id: &str, max_num_results: u32) -> Self {
        ToolDeclaration::FileSearch {
            vector_store_ids: vec![vector_store_id.to_string()],
            max_num_results,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            ToolDeclaration::FileSearch { .. } => "file_search",
            ToolDeclaration::Function { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponsesRequest {
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<Reasoning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    pub input: Vec<TranscriptEntry>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDeclaration>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub include: Vec<String>,
}

impl ResponsesRequest {
    pub fn new(model: impl Into<String>, input: Vec<TranscriptEntry>) -> Self {
        Self {
            model: model.into(),
            reasoning: None,
            instructions: None,
            input,
            tools: Vec::new(),
            include: Vec::new(),
        }
    }

    pub fn with_reasoning(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning = Some(Reasoning { effort });
        self
    }

    pub fn with_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.instructions = Some(instructions.into());
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_include(mut self, include: Vec<String>) -> Self {
        self.include = include;
        self
    }
}

// ============================================================================
// Response side
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPiece {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ContentPiece {
    pub fn output_text(text: impl Into<String>) -> Self {
        Self {
            kind: "output_text".to_string(),
            text: Some(text.into()),
            extra: Map::new(),
        }
    }

    pub fn as_output_text(&self) -> Option<&str> {
        if self.kind == "output_text" {
            self.text.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageItem {
    #[serde(default)]
    pub content: Vec<ContentPiece>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageItem {
    pub fn assistant_text(text: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("role".to_string(), json!("assistant"));
        Self {
            content: vec![ContentPiece::output_text(text)],
            extra,
        }
    }

    pub fn output_texts(&self) -> impl Iterator<Item = &str> {
        self.content.iter().filter_map(ContentPiece::as_output_text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    pub call_id: String,
    /// JSON-encoded arguments, as produced by the model.
    #[serde(default)]
    pub arguments: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FunctionCall {
    pub fn new(
        name: impl Into<String>,
        call_id: impl Into<String>,
        arguments: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            call_id: call_id.into(),
            arguments: arguments.into(),
            extra: Map::new(),
        }
    }

    /// Decoded arguments; empty when missing or not a JSON object.
    pub fn parsed_arguments(&self) -> Map<String, Value> {
        if self.arguments.trim().is_empty() {
            return Map::new();
        }
        match serde_json::from_str::<Value>(&self.arguments) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// One item of the endpoint's `output` array.
#[derive(Debug, Clone, PartialEq)]
pub enum OutputItem {
    Message(MessageItem),
    FunctionCall(FunctionCall),
    /// Anything else (reasoning, file_search_call, ...), kept verbatim.
    Other(Value),
}

fn without_kind(value: &Value) -> Option<Value> {
    let mut map = value.as_object()?.clone();
    map.remove("type");
    Some(Value::Object(map))
}

impl OutputItem {
    /// Decode a raw output item. Never fails: items that do not match their
    /// declared kind are kept as [`OutputItem::Other`].
    pub fn from_value(value: Value) -> Self {
        let decoded = match value.get("type").and_then(Value::as_str) {
            Some("message") => without_kind(&value)
                .and_then(|v| serde_json::from_value(v).ok())
                .map(OutputItem::Message),
            Some("function_call") => without_kind(&value)
                .and_then(|v| serde_json::from_value(v).ok())
                .map(OutputItem::FunctionCall),
            _ => None,
        };
        decoded.unwrap_or(OutputItem::Other(value))
    }

    pub fn kind(&self) -> &str {
        match self {
            OutputItem::Message(_) => "message",
            OutputItem::FunctionCall(_) => "function_call",
            OutputItem::Other(v) => v.get("type").and_then(Value::as_str).unwrap_or("unknown"),
        }
    }
}

impl Serialize for OutputItem {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut value = match self {
            OutputItem::Message(m) => serde_json::to_value(m),
            OutputItem::FunctionCall(c) => serde_json::to_value(c),
            OutputItem::Other(v) => return v.serialize(serializer),
        }
        .map_err(serde::ser::Error::custom)?;
        if let Value::Object(map) = &mut value {
            map.insert("type".to_string(), json!(self.kind()));
        }
        value.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for OutputItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(OutputItem::from_value)
    }
}

/// Decoded endpoint response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelResponse {
    /// Unified final text (all `output_text` pieces joined).
    pub output_text: Option<String>,
    pub output: Vec<OutputItem>,
}

impl ModelResponse {
    pub fn new(output: Vec<OutputItem>) -> Self {
        let output_text = joined_output_text(&output);
        Self {
            output_text,
            output,
        }
    }

    /// Decode a raw response body. A body-level `output_text` wins over the
    /// text derived from message items.
    pub fn from_json(body: &Value) -> Result<Self, EndpointError> {
        let output = match body.get("output") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items.iter().cloned().map(OutputItem::from_value).collect(),
            Some(other) => {
                return Err(EndpointError::InvalidResponse(format!(
                    "`output` is not an array: {other}"
                )))
            }
        };
        let output_text = match body.get("output_text").and_then(Value::as_str) {
            Some(text) => Some(text.to_string()),
            None => joined_output_text(&output),
        };
        Ok(Self {
            output_text,
            output,
        })
    }

    pub fn final_text(&self) -> Option<&str> {
        self.output_text.as_deref()
    }

    /// Texts worth trying as the model's answer, in priority order: the
    /// unified text, then each `output_text` piece of each message item.
    pub fn text_candidates(&self) -> impl Iterator<Item = &str> {
        let pieces = self.output.iter().flat_map(|item| match item {
            OutputItem::Message(m) => m.output_texts().collect::<Vec<_>>(),
            _ => Vec::new(),
        });
        self.final_text().into_iter().chain(pieces)
    }

    /// Function calls the caller must execute. Managed search calls are
    /// separate item kinds and never show up here.
    pub fn function_calls(&self) -> Vec<&FunctionCall> {
        self.output
            .iter()
            .filter_map(|item| match item {
                OutputItem::FunctionCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

fn joined_output_text(output: &[OutputItem]) -> Option<String> {
    let mut pieces = output
        .iter()
        .filter_map(|item| match item {
            OutputItem::Message(m) => Some(m.output_texts()),
            _ => None,
        })
        .flatten()
        .peekable();
    pieces.peek()?;
    Some(pieces.collect())
}
