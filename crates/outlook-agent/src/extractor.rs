//! Schema-driven attribute extraction for one uploaded document.

use crate::config::DEFAULT_EXTRACTION_MODEL;
use crate::endpoint::ResponsesEndpoint;
use crate::error::ExtractionError;
use crate::prompts;
use crate::responses::{InputMessage, InputPart, ModelResponse, ReasoningEffort, ResponsesRequest};
use outlook_attrs::{build_loose_schema, AttributeDefinitionSet, AttributeRecord};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

pub struct AttributeExtractor<'a, E: ResponsesEndpoint + ?Sized> {
    endpoint: &'a E,
    definitions: &'a AttributeDefinitionSet,
    model: String,
    reasoning_effort: ReasoningEffort,
}

impl<'a, E: ResponsesEndpoint + ?Sized> AttributeExtractor<'a, E> {
    pub fn new(endpoint: &'a E, definitions: &'a AttributeDefinitionSet) -> Self {
        Self {
            endpoint,
            definitions,
            model: DEFAULT_EXTRACTION_MODEL.to_string(),
            reasoning_effort: ReasoningEffort::High,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_reasoning_effort(mut self, effort: ReasoningEffort) -> Self {
        self.reasoning_effort = effort;
        self
    }

    /// The extraction request for `document` (an uploaded file id).
    ///
    /// The schema is rebuilt on every call and sent as text next to the file
    /// reference.
    pub fn build_request(&self, document: &str) -> ResponsesRequest {
        let schema = build_loose_schema(self.definitions);
        let input = vec![
            InputMessage::system(prompts::extraction_system_prompt(self.definitions)).into(),
            InputMessage::user_parts(vec![
                InputPart::InputText {
                    text: prompts::EXTRACTION_USER_INSTRUCTION.to_string(),
                },
                InputPart::InputText {
                    text: prompts::schema_text(&schema),
                },
                InputPart::InputFile {
                    file_id: document.to_string(),
                },
            ])
            .into(),
        ];
        ResponsesRequest::new(&self.model, input).with_reasoning(self.reasoning_effort)
    }

    /// Extract a normalized record. Only endpoint failures are errors;
    /// unusable model output yields an all-blank record.
    pub fn extract(
        &self,
        document: &str,
        filename_hint: Option<&str>,
    ) -> Result<AttributeRecord, ExtractionError> {
        let request = self.build_request(document);
        debug!(document, model = %self.model, "requesting attribute extraction");

        let response = self.endpoint.create(&request).map_err(|source| ExtractionError {
            document: document.to_string(),
            source,
        })?;

        let record = record_from_response(self.definitions, &response, filename_hint);
        info!(
            document,
            title = record.title().unwrap_or(""),
            blank = record.is_blank(),
            "extracted attributes"
        );
        Ok(record)
    }
}

/// First candidate text that parses as a JSON object.
fn parse_object(response: &ModelResponse) -> Option<Map<String, Value>> {
    response.text_candidates().find_map(|text| {
        match serde_json::from_str::<Value>(text.trim()) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    })
}

/// Turn a model response into the canonical record: parse, normalize, then
/// backfill the title from `filename_hint` when it is still blank.
pub fn record_from_response(
    defs: &AttributeDefinitionSet,
    response: &ModelResponse,
    filename_hint: Option<&str>,
) -> AttributeRecord {
    let raw = parse_object(response).unwrap_or_else(|| {
        warn!(
            text = response.final_text().unwrap_or(""),
            "model output is not a JSON object; using blank attributes"
        );
        Map::new()
    });

    let mut record = AttributeRecord::normalize(defs, &raw);
    if let Some(hint) = filename_hint {
        if record.backfill_title(hint) {
            debug!(hint, "title backfilled from filename");
        }
    }

    for violation in record.enum_violations(defs) {
        warn!(
            attribute = %violation.attribute,
            value = %violation.value,
            "value outside allowed enum"
        );
    }
    record
}
