//! Data models for the fetch/enrich/extract/synthesize pipeline.
//!
//! - [`ArticleRecord`]: one discovered news item, enriched in place
//! - [`FactBullet`]: the neutral fact/quote distillation of one article
//! - [`SourceGroups`]: fact bullets grouped by originating outlet
//! - [`FinalArticle`]: the synthesized, citation-annotated narrative
//! - [`RunReport`]: per-stage success/failure counts for one run

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// A single discovered news item.
///
/// Created by the fetcher with only the identity fields populated; the
/// enricher fills in `body_text`, `top_image_url`, and `summary` in place.
/// A record that fails enrichment keeps all three unset and is skipped by
/// the downstream stages. Identity key: `url`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// Headline as reported by the search provider.
    pub title: String,
    /// Canonical article URL; the record's identity.
    pub url: String,
    /// Name of the publishing outlet (grouping key for synthesis input).
    pub source_name: String,
    /// Publication timestamp as reported by the provider (RFC 3339).
    pub published_at: String,
    /// Full article body, set by the enricher on success.
    pub body_text: Option<String>,
    /// Representative image URL, set by the enricher on success.
    pub top_image_url: Option<String>,
    /// Short abstractive summary of the body, set by the enricher.
    pub summary: Option<String>,
}

impl ArticleRecord {
    /// A bare record as produced by the fetcher.
    pub fn stub(
        title: impl Into<String>,
        url: impl Into<String>,
        source_name: impl Into<String>,
        published_at: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source_name: source_name.into(),
            published_at: published_at.into(),
            body_text: None,
            top_image_url: None,
            summary: None,
        }
    }

    /// Whether the enricher managed to attach a body to this record.
    pub fn is_enriched(&self) -> bool {
        self.body_text.is_some()
    }
}

/// The fact/quote bullets extracted from one enriched article.
///
/// `bullet_points` is non-empty by construction; an article whose extraction
/// fails contributes no `FactBullet` at all.
#[derive(Debug, Clone, Serialize)]
pub struct FactBullet {
    pub source_name: String,
    pub article_url: String,
    pub title: String,
    pub bullet_points: Vec<String>,
}

/// Fact bullets grouped by `source_name`. Multiple articles from the same
/// outlet accumulate under one key; intra-group order follows completion
/// arrival order.
pub type SourceGroups = HashMap<String, Vec<FactBullet>>;

/// A (source name, article URL) pair cited by the synthesized article.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Citation {
    pub source_name: String,
    pub url: String,
}

/// The synthesized narrative, plus the citation pairs that survived
/// validation against the synthesis input.
#[derive(Debug)]
pub struct FinalArticle {
    /// Markdown text with inline `[**_Source Name_**](url)` citations.
    pub text: String,
    /// Distinct validated citations, in order of first appearance.
    pub citations: Vec<Citation>,
}

/// Per-stage counts for one pipeline run, so callers can report partial
/// degradation instead of digging through logs.
#[derive(Debug, Default, Clone, Serialize)]
pub struct RunReport {
    /// Candidate records returned by the search provider.
    pub fetched: usize,
    /// Records that gained a body during enrichment.
    pub enriched: usize,
    /// Records whose enrichment failed (left bare, never dropped).
    pub enrichment_failures: usize,
    /// Records that produced a fact-bullet set.
    pub extracted: usize,
    /// Enriched records whose extraction failed (dropped from synthesis).
    pub extraction_failures: usize,
}
