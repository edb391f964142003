//! Outlook Agent: document attribute extraction and lodging outlook reports
//!
//! Both pipelines talk to a Responses-style generative endpoint through the
//! [`ResponsesEndpoint`] trait; the OpenAI client is one implementation
//! (feature `openai`, on by default).
//!
//! ## Architecture
//!
//! ```text
//!   file id ──► AttributeExtractor ──► AttributeRecord ──► SidecarIndex
//!                      │                                        │
//!                      ▼                                        │ file_list
//!              ┌───────────────┐                                │
//!              │   Responses   │◄───────────────────────────────┘
//!              │   endpoint    │◄──── file_search (managed, server side)
//!              └───────────────┘
//!                      ▲
//!                      │
//!   period ──► ReportAgent / ToolLoop ──► Report
//! ```
//!
//! ## Failure model
//! - Endpoint failures propagate as [`ExtractionError`] / [`ReportError`]
//! - Malformed model output never fails: blank records, degraded reports
//! - Unknown tools and inventory failures are answered with `{"error": ...}`
//!
//! No tracing subscriber is installed here; embedding binaries choose one.

pub mod config;
pub mod endpoint;
pub mod error;
pub mod extractor;
pub mod inventory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod period;
pub mod prompts;
pub mod report;
pub mod responses;
pub mod tool_loop;

pub use config::Settings;
pub use endpoint::ResponsesEndpoint;
pub use error::{ConfigError, EndpointError, ExtractionError, IndexError, ReportError};
pub use extractor::{record_from_response, AttributeExtractor};
pub use inventory::{
    file_list_tool, FileInventory, FileInventoryListing, InventoryFile, SidecarEntry,
    SidecarFileInventory, SidecarIndex, FILE_LIST_TOOL,
};
#[cfg(feature = "openai")]
pub use openai::OpenAiResponsesClient;
pub use period::{compose_period, nearest_quarter_season, resolve_period, resolve_period_now};
pub use report::Report;
pub use responses::{
    FunctionCall, InputMessage, MessageItem, ModelResponse, OutputItem, ReasoningEffort,
    ResponsesRequest, ToolDeclaration, ToolResult, TranscriptEntry,
};
pub use tool_loop::{
    seed_transcript, GeneratedReport, LoopState, LoopStatus, ReportAgent, ToolLoop,
    ToolLoopOptions, ToolLoopOutcome,
};

pub use outlook_attrs;
