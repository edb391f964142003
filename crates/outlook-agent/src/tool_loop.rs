//! Tool-calling retrieval loop for report generation.
//!
//! ```text
//!              ┌──────────────── tool results appended ───────────────┐
//!              v                                                      │
//!   seed ─> AwaitingModel ── function calls ──> DispatchingTools ─────┘
//!              │
//!              └── no function calls ──> Done(final text) ──> Report
//! ```
//!
//! `file_search` runs inside the endpoint and comes back as its own output
//! items; only `file_list` is executed here. Every output item is echoed
//! back so the endpoint sees its own calls next to their results.

use crate::config::{
    DEFAULT_FILE_SEARCH_MAX_RESULTS, DEFAULT_REPORT_MAX_ROUNDS, DEFAULT_REPORT_MODEL,
};
use crate::endpoint::ResponsesEndpoint;
use crate::error::ReportError;
use crate::inventory::{file_list_tool, FileInventory, FILE_LIST_TOOL};
use crate::prompts;
use crate::report::Report;
use crate::responses::{
    FunctionCall, InputMessage, ReasoningEffort, ResponsesRequest, ToolDeclaration, ToolResult,
    TranscriptEntry,
};
use outlook_attrs::AttributeDefinitionSet;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

pub const FILE_SEARCH_RESULTS_INCLUDE: &str = "file_search_call.results";

#[derive(Debug, Clone, PartialEq)]
pub struct ToolLoopOptions {
    pub model: String,
    pub reasoning_effort: ReasoningEffort,
    pub file_search_max_results: u32,
    /// Maximum number of generative calls.
    pub max_rounds: usize,
}

impl Default for ToolLoopOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_REPORT_MODEL.to_string(),
            reasoning_effort: ReasoningEffort::High,
            file_search_max_results: DEFAULT_FILE_SEARCH_MAX_RESULTS,
            max_rounds: DEFAULT_REPORT_MAX_ROUNDS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopState {
    AwaitingModel,
    DispatchingTools(Vec<FunctionCall>),
    /// Final text of the last response.
    Done(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoopStatus {
    Done { report: Report, degraded: bool },
    /// The model still requested tools after the last allowed round.
    Exceeded,
}

#[derive(Debug, Clone)]
pub struct ToolLoopOutcome {
    pub transcript: Vec<TranscriptEntry>,
    /// Generative calls issued.
    pub rounds: usize,
    /// Function calls executed locally.
    pub tool_calls: usize,
    pub status: LoopStatus,
}

impl ToolLoopOutcome {
    pub fn report(&self) -> Option<&Report> {
        match &self.status {
            LoopStatus::Done { report, .. } => Some(report),
            LoopStatus::Exceeded => None,
        }
    }
}

pub struct ToolLoop<'a, E: ResponsesEndpoint + ?Sized, I: FileInventory + ?Sized> {
    endpoint: &'a E,
    inventory: &'a I,
    vector_store_id: String,
    options: ToolLoopOptions,
}

impl<'a, E: ResponsesEndpoint + ?Sized, I: FileInventory + ?Sized> ToolLoop<'a, E, I> {
    pub fn new(
        endpoint: &'a E,
        inventory: &'a I,
        vector_store_id: impl Into<String>,
        options: ToolLoopOptions,
    ) -> Self {
        Self {
            endpoint,
            inventory,
            vector_store_id: vector_store_id.into(),
            options,
        }
    }

    pub fn tools(&self) -> Vec<ToolDeclaration> {
        vec![
            ToolDeclaration::file_search(&self.vector_store_id, self.options.file_search_max_results),
            file_list_tool(),
        ]
    }

    fn request(&self, transcript: &[TranscriptEntry], first: bool) -> ResponsesRequest {
        let request = ResponsesRequest::new(&self.options.model, transcript.to_vec())
            .with_reasoning(self.options.reasoning_effort)
            .with_tools(self.tools())
            .with_include(vec![FILE_SEARCH_RESULTS_INCLUDE.to_string()]);
        if first {
            request
        } else {
            request.with_instructions(prompts::CONTINUATION_DIRECTIVE)
        }
    }

    /// Drive the conversation from `seed` until the model answers without
    /// requesting tools, or `max_rounds` calls have been made.
    pub fn run(&self, seed: Vec<TranscriptEntry>) -> Result<ToolLoopOutcome, ReportError> {
        let max_rounds = self.options.max_rounds.max(1);
        let mut transcript = seed;
        let mut rounds = 0usize;
        let mut tool_calls = 0usize;
        let mut state = LoopState::AwaitingModel;

        loop {
            state = match state {
                LoopState::AwaitingModel if rounds >= max_rounds => {
                    warn!(max_rounds, tool_calls, "round limit reached with tools still pending");
                    return Ok(ToolLoopOutcome {
                        transcript,
                        rounds,
                        tool_calls,
                        status: LoopStatus::Exceeded,
                    });
                }
                LoopState::AwaitingModel => {
                    let request = self.request(&transcript, rounds == 0);
                    rounds += 1;
                    debug!(
                        round = rounds,
                        model = %self.options.model,
                        transcript_len = transcript.len(),
                        "requesting model turn"
                    );
                    let response = self
                        .endpoint
                        .create(&request)
                        .map_err(|source| ReportError::Endpoint {
                            round: rounds,
                            source,
                        })?;

                    let calls: Vec<FunctionCall> =
                        response.function_calls().into_iter().cloned().collect();
                    let text = response.final_text().unwrap_or_default().to_string();
                    transcript.extend(response.output.into_iter().map(TranscriptEntry::from));

                    if calls.is_empty() {
                        LoopState::Done(text)
                    } else {
                        LoopState::DispatchingTools(calls)
                    }
                }
                LoopState::DispatchingTools(calls) => {
                    for call in calls {
                        let output = self.dispatch(&call);
                        transcript.push(
                            ToolResult {
                                call_id: call.call_id,
                                output,
                            }
                            .into(),
                        );
                        tool_calls += 1;
                    }
                    LoopState::AwaitingModel
                }
                LoopState::Done(text) => {
                    let (report, degraded) = match Report::from_model_text(&text) {
                        Ok(report) => (report, false),
                        Err(e) => {
                            warn!(error = %e, "final answer is not a report object; degrading");
                            (Report::degraded(text.trim()), true)
                        }
                    };
                    return Ok(ToolLoopOutcome {
                        transcript,
                        rounds,
                        tool_calls,
                        status: LoopStatus::Done { report, degraded },
                    });
                }
            };
        }
    }

    /// Execute one function call; failures become `{"error": ...}` results.
    fn dispatch(&self, call: &FunctionCall) -> String {
        match call.name.as_str() {
            FILE_LIST_TOOL => {
                let args = call.parsed_arguments();
                let vector_store_id = args
                    .get("vector_store_id")
                    .and_then(Value::as_str)
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .unwrap_or(self.vector_store_id.as_str());
                debug!(call_id = %call.call_id, vector_store_id, "file_list");

                let result = self
                    .inventory
                    .list_files(vector_store_id)
                    .and_then(|listing| Ok(serde_json::to_string(&listing)?));
                match result {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %format!("{e:#}"), "file_list failed");
                        tool_error(format!("{e:#}"))
                    }
                }
            }
            other => {
                warn!(tool = other, "model requested an unknown tool");
                tool_error(format!("unknown tool: {other}"))
            }
        }
    }
}

fn tool_error(message: String) -> String {
    json!({ "error": message }).to_string()
}

/// Opening transcript: report instructions plus the period request.
pub fn seed_transcript(
    period: &str,
    vector_store_id: &str,
    defs: &AttributeDefinitionSet,
) -> Vec<TranscriptEntry> {
    vec![
        InputMessage::system(prompts::REPORT_INSTRUCTIONS).into(),
        InputMessage::user(prompts::report_request(period, defs, vector_store_id)).into(),
    ]
}

#[derive(Debug, Clone)]
pub struct GeneratedReport {
    pub period: String,
    pub report: Report,
    /// The final answer was not a report object; `report.summary` holds it.
    pub degraded: bool,
    pub rounds: usize,
    pub tool_calls: usize,
}

/// Generates lodging outlook reports against one endpoint and inventory.
pub struct ReportAgent<E, I> {
    endpoint: E,
    inventory: I,
    options: ToolLoopOptions,
}

impl<E: ResponsesEndpoint, I: FileInventory> ReportAgent<E, I> {
    pub fn new(endpoint: E, inventory: I, options: ToolLoopOptions) -> Self {
        Self {
            endpoint,
            inventory,
            options,
        }
    }

    pub fn options(&self) -> &ToolLoopOptions {
        &self.options
    }

    pub fn generate_report(
        &self,
        period: &str,
        vector_store_id: &str,
        defs: &AttributeDefinitionSet,
    ) -> Result<GeneratedReport, ReportError> {
        let tool_loop = ToolLoop::new(
            &self.endpoint,
            &self.inventory,
            vector_store_id,
            self.options.clone(),
        );
        let outcome = tool_loop.run(seed_transcript(period, vector_store_id, defs))?;
        match outcome.status {
            LoopStatus::Done { report, degraded } => {
                info!(
                    period,
                    rounds = outcome.rounds,
                    tool_calls = outcome.tool_calls,
                    degraded,
                    "report generated"
                );
                Ok(GeneratedReport {
                    period: period.to_string(),
                    report,
                    degraded,
                    rounds: outcome.rounds,
                    tool_calls: outcome.tool_calls,
                })
            }
            LoopStatus::Exceeded => Err(ReportError::RoundLimitExceeded {
                max_rounds: self.options.max_rounds.max(1),
            }),
        }
    }
}
