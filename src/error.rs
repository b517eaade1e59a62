//! Error taxonomy for the synthesis pipeline.
//!
//! Only two stages can fail a whole run: the single search-provider request
//! ([`ProviderError`]) and the single synthesis completion
//! ([`GenerationError`]). Enrichment and extraction failures are per-record:
//! they are logged, counted in the run report, and never surfaced.

use std::time::Duration;

use thiserror::Error;

/// Top-level error for a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The search provider request failed. Fatal: no candidate articles.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The final synthesis completion failed. Fatal: no article.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Zero records survived enrichment, so there is nothing to synthesize.
    #[error("no sources survived enrichment; nothing to synthesize")]
    NoSources,
}

/// Search provider unavailable or returned a bad response.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("search provider returned HTTP {0}")]
    Status(u16),

    #[error("search provider request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed search provider payload: {0}")]
    Payload(#[from] serde_json::Error),
}

/// Failure of the final synthesis stage.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("synthesis completion failed: {0}")]
    Completion(#[source] LlmError),

    #[error("synthesized article cites unknown source {source_name:?} -> {url}")]
    UnknownCitation { source_name: String, url: String },

    #[error("synthesized article contains no citation links")]
    MissingCitations,
}

/// Failure of a chat completion request.
#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("completion response carried no message content")]
    EmptyResponse,
}

/// Per-record enrichment failure. Swallowed by the enricher: the record
/// simply keeps its unset body/image/summary fields.
#[derive(Debug, Error)]
pub enum EnrichError {
    #[error("article download failed: {0}")]
    Download(#[from] reqwest::Error),

    #[error("article download returned HTTP {0}")]
    Status(u16),

    #[error("no readable body text at {url}")]
    EmptyBody { url: String },

    #[error("summarization failed: {0}")]
    Summarize(String),

    #[error("enrichment timed out after {0:?}")]
    Deadline(Duration),
}

/// Per-record extraction failure. Swallowed by the extractor: the record
/// contributes no fact bullets to the synthesis input.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("fact extraction completion failed: {0}")]
    Completion(#[from] LlmError),

    #[error("fact extraction response contained no bullet points")]
    NoBullets,

    #[error("fact extraction timed out after {0:?}")]
    Deadline(Duration),
}
