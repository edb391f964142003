//! Environment-driven settings.
//!
//! Every variable is optional; blank values fall back to the default.
//! Numeric values are clamped into their supported range, unparseable ones
//! are errors.

use crate::error::ConfigError;
use crate::responses::ReasoningEffort;
use crate::tool_loop::ToolLoopOptions;
use outlook_attrs::AttributeDefinitionSet;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";
pub const MODEL_ATTR_EXTRACT_ENV: &str = "MODEL_ATTR_EXTRACT";
pub const MODEL_REPORT_ENV: &str = "MODEL_REPORT";
pub const FILE_SEARCH_MAX_RESULTS_ENV: &str = "FILE_SEARCH_MAX_RESULTS";
pub const VECTOR_STORE_ID_ENV: &str = "VECTOR_STORE_ID";
pub const OUTLOOK_REASONING_EFFORT_ENV: &str = "OUTLOOK_REASONING_EFFORT";
pub const OUTLOOK_REPORT_MAX_ROUNDS_ENV: &str = "OUTLOOK_REPORT_MAX_ROUNDS";
pub const OUTLOOK_HTTP_TIMEOUT_SECS_ENV: &str = "OUTLOOK_HTTP_TIMEOUT_SECS";
pub const OUTLOOK_ATTRIBUTES_CONFIG_ENV: &str = "OUTLOOK_ATTRIBUTES_CONFIG";
pub const OUTLOOK_STATE_DIR_ENV: &str = "OUTLOOK_STATE_DIR";

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_EXTRACTION_MODEL: &str = "gpt-5-mini";
pub const DEFAULT_REPORT_MODEL: &str = "gpt-5";
pub const DEFAULT_FILE_SEARCH_MAX_RESULTS: u32 = 6;
// Bound on generative calls per report. Reports usually finish in a handful of
// rounds; the cap only matters when a model keeps requesting tools.
pub const DEFAULT_REPORT_MAX_ROUNDS: usize = 16;
const DEFAULT_STATE_DIR: &str = "state";
pub const METADATA_INDEX_FILE: &str = "metadata.json";

#[derive(Clone)]
pub struct Settings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub extraction_model: String,
    pub report_model: String,
    pub reasoning_effort: ReasoningEffort,
    pub file_search_max_results: u32,
    pub report_max_rounds: usize,
    /// `None` waits indefinitely.
    pub http_timeout: Option<Duration>,
    pub vector_store_id: Option<String>,
    pub attributes_config: Option<PathBuf>,
    pub state_dir: PathBuf,
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("extraction_model", &self.extraction_model)
            .field("report_model", &self.report_model)
            .field("reasoning_effort", &self.reasoning_effort)
            .field("file_search_max_results", &self.file_search_max_results)
            .field("report_max_rounds", &self.report_max_rounds)
            .field("http_timeout", &self.http_timeout)
            .field("vector_store_id", &self.vector_store_id)
            .field("attributes_config", &self.attributes_config)
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            extraction_model: DEFAULT_EXTRACTION_MODEL.to_string(),
            report_model: DEFAULT_REPORT_MODEL.to_string(),
            reasoning_effort: ReasoningEffort::High,
            file_search_max_results: DEFAULT_FILE_SEARCH_MAX_RESULTS,
            report_max_rounds: DEFAULT_REPORT_MAX_ROUNDS,
            http_timeout: None,
            vector_store_id: None,
            attributes_config: None,
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
        }
    }
}

pub(crate) fn normalize_http_base_url(base_url: &str, default: &str) -> String {
    let mut host = base_url.trim().to_string();
    if host.is_empty() {
        host = default.to_string();
    }
    if !host.starts_with("http://") && !host.starts_with("https://") {
        host = format!("https://{host}");
    }
    host.trim_end_matches('/').to_string()
}

struct Env<F> {
    lookup: F,
}

impl<F: Fn(&str) -> Option<String>> Env<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.lookup)(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn string(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or_else(|| default.to_string())
    }

    fn u64(&self, name: &'static str, expected: &'static str) -> Result<Option<u64>, ConfigError> {
        self.get(name)
            .map(|v| {
                v.parse::<u64>().map_err(|_| ConfigError::Invalid {
                    name,
                    value: v.clone(),
                    expected,
                })
            })
            .transpose()
    }

    fn clamped(&self, name: &'static str, default: u64, min: u64, max: u64) -> Result<u64, ConfigError> {
        Ok(self
            .u64(name, "expected integer")?
            .map_or(default, |n| n.clamp(min, max)))
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolve settings from an arbitrary variable source.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, ConfigError> {
        let env = Env { lookup };

        let reasoning_effort = match env.get(OUTLOOK_REASONING_EFFORT_ENV) {
            None => ReasoningEffort::High,
            Some(v) => v.parse().map_err(|_| ConfigError::Invalid {
                name: OUTLOOK_REASONING_EFFORT_ENV,
                value: v.clone(),
                expected: "expected low|medium|high",
            })?,
        };

        let file_search_max_results = env.clamped(
            FILE_SEARCH_MAX_RESULTS_ENV,
            u64::from(DEFAULT_FILE_SEARCH_MAX_RESULTS),
            1,
            50,
        )? as u32;
        let report_max_rounds =
            env.clamped(OUTLOOK_REPORT_MAX_ROUNDS_ENV, DEFAULT_REPORT_MAX_ROUNDS as u64, 1, 256)?
                as usize;
        let http_timeout = env
            .u64(
                OUTLOOK_HTTP_TIMEOUT_SECS_ENV,
                "expected integer seconds; 0 disables",
            )?
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);

        Ok(Self {
            api_key: env.get(OPENAI_API_KEY_ENV),
            base_url: normalize_http_base_url(
                &env.string(OPENAI_BASE_URL_ENV, DEFAULT_OPENAI_BASE_URL),
                DEFAULT_OPENAI_BASE_URL,
            ),
            extraction_model: env.string(MODEL_ATTR_EXTRACT_ENV, DEFAULT_EXTRACTION_MODEL),
            report_model: env.string(MODEL_REPORT_ENV, DEFAULT_REPORT_MODEL),
            reasoning_effort,
            file_search_max_results,
            report_max_rounds,
            http_timeout,
            vector_store_id: env.get(VECTOR_STORE_ID_ENV),
            attributes_config: env.get(OUTLOOK_ATTRIBUTES_CONFIG_ENV).map(PathBuf::from),
            state_dir: PathBuf::from(env.string(OUTLOOK_STATE_DIR_ENV, DEFAULT_STATE_DIR)),
        })
    }

    /// Attribute definitions from `OUTLOOK_ATTRIBUTES_CONFIG`, or the built-in set.
    pub fn load_attribute_definitions(&self) -> Result<AttributeDefinitionSet, ConfigError> {
        let defs = match &self.attributes_config {
            Some(path) => AttributeDefinitionSet::load(path)?,
            None => AttributeDefinitionSet::builtin()?,
        };
        Ok(defs)
    }

    pub fn metadata_index_path(&self) -> PathBuf {
        self.state_dir.join(METADATA_INDEX_FILE)
    }

    pub fn tool_loop_options(&self) -> ToolLoopOptions {
        ToolLoopOptions {
            model: self.report_model.clone(),
            reasoning_effort: self.reasoning_effort,
            file_search_max_results: self.file_search_max_results,
            max_rounds: self.report_max_rounds,
        }
    }
}
