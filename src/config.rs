//! Pipeline configuration.
//!
//! Every stage receives its settings through [`PipelineConfig`] rather than
//! reading ambient process state; the only environment lookups happen in the
//! CLI layer, which folds API keys into the config before the run starts.
//!
//! The file format is YAML:
//!
//! ```yaml
//! concurrency: 10
//! task_timeout_secs: 20
//! search:
//!   base_url: https://newsapi.org/v2
//!   page_size: 10
//! summarizer:
//!   endpoint: https://api.maisa.ai/v1/capabilities/summarize
//! llm:
//!   base_url: https://api.openai.com/v1
//!   extraction:
//!     model: gpt-4o-mini
//!     temperature: 0.0
//!   synthesis:
//!     model: gpt-4o
//!     temperature: 0.23
//! ```

use std::error::Error;
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use tracing::info;

/// Everything a pipeline run needs, passed explicitly into each stage.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub summarizer: SummarizerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    /// Cap on concurrent per-record tasks in the enrichment and extraction
    /// phases.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Deadline for a single per-record task; a hanging download or
    /// completion must not stall the phase join.
    #[serde(default = "default_task_timeout_secs")]
    pub task_timeout_secs: u64,
}

/// Search provider (NewsAPI-shaped) settings.
#[derive(Clone, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_search_base")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

/// Abstractive summarization endpoint settings.
#[derive(Clone, Deserialize)]
pub struct SummarizerConfig {
    #[serde(default = "default_summarizer_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
}

/// OpenAI-compatible completion backend settings.
#[derive(Clone, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_base")]
    pub base_url: String,
    #[serde(default)]
    pub api_key: String,
    /// Model used for per-article fact extraction.
    #[serde(default = "default_extraction_settings")]
    pub extraction: ModelSettings,
    /// Model used for the single synthesis completion.
    #[serde(default = "default_synthesis_settings")]
    pub synthesis: ModelSettings,
}

/// Model identity plus sampling variance (0.0 - 1.0).
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
}

impl PipelineConfig {
    /// Load the YAML config file at `path`.
    pub fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read config file {path}: {e}"))?;
        let config: PipelineConfig = serde_yaml::from_str(&raw)
            .map_err(|e| format!("failed to parse config file {path}: {e}"))?;
        info!(path, "Loaded configuration");
        Ok(config)
    }

    /// Fold CLI/env-provided API keys over the file-loaded values.
    pub fn override_keys(
        &mut self,
        search_key: Option<&str>,
        summarizer_key: Option<&str>,
        llm_key: Option<&str>,
    ) {
        if let Some(key) = search_key {
            self.search.api_key = key.to_string();
        }
        if let Some(key) = summarizer_key {
            self.summarizer.api_key = key.to_string();
        }
        if let Some(key) = llm_key {
            self.llm.api_key = key.to_string();
        }
    }

    /// Per-record task deadline as a [`Duration`].
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_secs)
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            summarizer: SummarizerConfig::default(),
            llm: LlmConfig::default(),
            concurrency: default_concurrency(),
            task_timeout_secs: default_task_timeout_secs(),
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_search_base(),
            api_key: String::new(),
            page_size: default_page_size(),
        }
    }
}

impl Default for SummarizerConfig {
    fn default() -> Self {
        Self {
            endpoint: default_summarizer_endpoint(),
            api_key: String::new(),
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_llm_base(),
            api_key: String::new(),
            extraction: default_extraction_settings(),
            synthesis: default_synthesis_settings(),
        }
    }
}

// Keys stay out of Debug output.
impl fmt::Debug for SearchConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("page_size", &self.page_size)
            .finish()
    }
}

impl fmt::Debug for SummarizerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SummarizerConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &redact(&self.api_key))
            .field("extraction", &self.extraction)
            .field("synthesis", &self.synthesis)
            .finish()
    }
}

fn redact(key: &str) -> &'static str {
    if key.is_empty() { "<unset>" } else { "<redacted>" }
}

fn default_concurrency() -> usize {
    10
}

fn default_task_timeout_secs() -> u64 {
    20
}

fn default_search_base() -> String {
    "https://newsapi.org/v2".to_string()
}

fn default_page_size() -> u32 {
    10
}

fn default_summarizer_endpoint() -> String {
    "https://api.maisa.ai/v1/capabilities/summarize".to_string()
}

fn default_llm_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_extraction_settings() -> ModelSettings {
    ModelSettings {
        model: "gpt-4o-mini".to_string(),
        temperature: 0.0,
    }
}

fn default_synthesis_settings() -> ModelSettings {
    ModelSettings {
        model: "gpt-4o".to_string(),
        temperature: 0.23,
    }
}
