//! Attribute extraction against a scripted endpoint.

use outlook_agent::outlook_attrs::{AttributeDefinitionSet, AttributeValue};
use outlook_agent::*;
use serde_json::json;
use std::cell::RefCell;
use std::collections::VecDeque;

/// Endpoint that replays canned responses and records every request.
#[derive(Default)]
struct ScriptedEndpoint {
    replies: RefCell<VecDeque<Result<ModelResponse, EndpointError>>>,
    requests: RefCell<Vec<serde_json::Value>>,
}

impl ScriptedEndpoint {
    fn replying(replies: Vec<Result<ModelResponse, EndpointError>>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            requests: RefCell::default(),
        }
    }

    fn text(text: &str) -> Self {
        Self::replying(vec![Ok(ModelResponse::new(vec![OutputItem::Message(
            MessageItem::assistant_text(text),
        )]))])
    }
}

impl ResponsesEndpoint for ScriptedEndpoint {
    fn create(&self, request: &ResponsesRequest) -> Result<ModelResponse, EndpointError> {
        self.requests
            .borrow_mut()
            .push(serde_json::to_value(request).unwrap());
        self.replies
            .borrow_mut()
            .pop_front()
            .expect("no scripted reply left")
    }
}

fn defs() -> AttributeDefinitionSet {
    AttributeDefinitionSet::builtin().unwrap()
}

fn list(items: &[&str]) -> AttributeValue {
    AttributeValue::List(items.iter().map(|s| s.to_string()).collect())
}

// ============================================================================
// Coercion
// ============================================================================

#[test]
fn numbers_and_list_elements_are_coerced_to_strings() {
    let defs = defs();
    let endpoint =
        ScriptedEndpoint::text(r#"{"year": 2024, "travel_types": ["leisure", 3], "company": "Hyatt"}"#);
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", None)
        .unwrap();

    assert_eq!(record.get("year"), Some(&AttributeValue::from("2024")));
    assert_eq!(record.get("travel_types"), Some(&list(&["leisure", "3"])));
    assert_eq!(record.get("company"), Some(&AttributeValue::from("Hyatt")));
}

#[test]
fn every_declared_key_is_present_and_extras_are_dropped() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text(r#"{"company": "Hilton", "ceo": "someone", "period": null}"#);
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", None)
        .unwrap();

    assert_eq!(record.len(), defs.len());
    for name in defs.names() {
        assert!(record.get(name).is_some(), "missing {name}");
    }
    assert!(record.get("ceo").is_none());
    assert_eq!(record.get("period"), Some(&AttributeValue::default()));
}

#[test]
fn enum_violations_are_kept() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text(r#"{"sentiment": "bullish"}"#);
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", None)
        .unwrap();
    assert_eq!(record.get("sentiment"), Some(&AttributeValue::from("bullish")));
}

// ============================================================================
// Malformed output and fallbacks
// ============================================================================

#[test]
fn invalid_json_yields_all_blank_record() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text("Sorry, I cannot read this document.");
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", None)
        .unwrap();

    assert_eq!(record.len(), defs.len());
    assert!(record.is_blank());
}

#[test]
fn blank_title_is_backfilled_from_filename() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text(r#"{"title": "  ", "company": "Marriott"}"#);
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", Some("Q2_2025_Report.pdf"))
        .unwrap();
    assert_eq!(record.title(), Some("Q2 2025 Report"));
}

#[test]
fn unparseable_output_still_gets_a_title() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text("not json");
    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", Some("uploads/Host_Hotels_Q1_2025.pdf"))
        .unwrap();
    assert_eq!(record.title(), Some("Host Hotels Q1 2025"));
}

#[test]
fn message_pieces_are_tried_when_unified_text_is_unusable() {
    let defs = defs();
    let mut message = MessageItem::assistant_text("Here you go:");
    message
        .content
        .push(outlook_agent::responses::ContentPiece::output_text(r#"{"company": "Ryman"}"#));
    let endpoint = ScriptedEndpoint::replying(vec![Ok(ModelResponse::new(vec![
        OutputItem::Other(json!({"type": "reasoning", "id": "rs_1"})),
        OutputItem::Message(message),
    ]))]);

    let record = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_1", None)
        .unwrap();
    assert_eq!(record.get("company"), Some(&AttributeValue::from("Ryman")));
}

// ============================================================================
// Requests and errors
// ============================================================================

#[test]
fn endpoint_failure_is_an_extraction_error() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::replying(vec![Err(EndpointError::Http {
        status: 429,
        body: "rate limited".to_string(),
    })]);
    let err = AttributeExtractor::new(&endpoint, &defs)
        .extract("file_9", Some("x.pdf"))
        .unwrap_err();

    assert_eq!(err.document, "file_9");
    assert!(matches!(err.source, EndpointError::Http { status: 429, .. }));
    assert!(err.to_string().contains("file_9"));
}

#[test]
fn configured_model_and_effort_are_sent() {
    let defs = defs();
    let endpoint = ScriptedEndpoint::text("{}");
    AttributeExtractor::new(&endpoint, &defs)
        .with_model("gpt-5")
        .with_reasoning_effort(ReasoningEffort::Low)
        .extract("file_7", None)
        .unwrap();

    let requests = endpoint.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["model"], "gpt-5");
    assert_eq!(requests[0]["reasoning"]["effort"], "low");
    assert_eq!(requests[0]["input"][1]["content"][2]["file_id"], "file_7");
}
