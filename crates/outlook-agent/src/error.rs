//! Error taxonomy.
//!
//! Transport/API failures surface as these errors. Malformed model output,
//! unknown tool names and blank attributes are recovered locally and only logged.

/// Failure talking to the generative endpoint.
#[derive(Debug, thiserror::Error)]
pub enum EndpointError {
    #[error("endpoint http error {status}: {body}")]
    Http { status: u16, body: String },
    #[error("failed to reach endpoint: {0}")]
    Transport(String),
    #[error("endpoint returned an unexpected response: {0}")]
    InvalidResponse(String),
    #[error("OPENAI_API_KEY is not set")]
    MissingApiKey,
}

/// Attribute extraction could not obtain a model response.
#[derive(Debug, thiserror::Error)]
#[error("attribute extraction failed for {document}: {source}")]
pub struct ExtractionError {
    pub document: String,
    #[source]
    pub source: EndpointError,
}

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("report generation failed in round {round}: {source}")]
    Endpoint {
        round: usize,
        #[source]
        source: EndpointError,
    },
    #[error("model still requested tools after {max_rounds} rounds")]
    RoundLimitExceeded { max_rounds: usize },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid {name}={value:?} ({expected})")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Attributes(#[from] outlook_attrs::DefinitionError),
}

#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("failed to write sidecar index {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode sidecar index: {0}")]
    Encode(#[from] serde_json::Error),
}
