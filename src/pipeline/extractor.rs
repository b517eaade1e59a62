//! Per-record fact extraction.
//!
//! Each enriched record is reduced to a neutral bullet-point list by one
//! chat completion; completions run concurrently under the shared bound and
//! per-task deadline. Results are grouped by source name, so several
//! articles from one outlet accumulate under one key. Arrival order decides
//! intra-group order, which is accepted non-determinism; the set of bullets
//! per source does not depend on it.

use futures::stream::{self, StreamExt};
use tracing::{debug, info, instrument, warn};

use crate::config::PipelineConfig;
use crate::error::ExtractError;
use crate::llm::Completion;
use crate::models::{ArticleRecord, FactBullet, SourceGroups};
use crate::prompts;
use crate::utils::truncate_for_log;

/// Outcome counts for one extraction phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractStats {
    /// Records that produced a fact-bullet set.
    pub extracted: usize,
    /// Enriched records whose extraction failed (contribute nothing).
    pub failed: usize,
}

/// Extract fact bullets from every enriched record and group them by source.
///
/// Records without a body are not extraction candidates and produce no
/// group entry. Per-record failures are logged and dropped; the phase never
/// fails as a whole. Returns an empty mapping when nothing qualifies.
#[instrument(level = "info", skip_all, fields(query = %query, count = records.len()))]
pub async fn extract<C: Completion>(
    llm: &C,
    config: &PipelineConfig,
    query: &str,
    records: &[ArticleRecord],
) -> (SourceGroups, ExtractStats) {
    let deadline = config.task_timeout();

    let outcomes: Vec<Result<FactBullet, ExtractError>> = stream::iter(
        records.iter().filter(|record| record.is_enriched()),
    )
    .map(|record| async move {
        let body = record.body_text.as_deref().unwrap_or_default();
        let prompt = prompts::fact_extraction(query, body);
        let text = match tokio::time::timeout(deadline, llm.complete(&config.llm.extraction, &prompt))
            .await
        {
            Ok(Ok(text)) => text,
            Ok(Err(e)) => return Err(ExtractError::Completion(e)),
            Err(_) => return Err(ExtractError::Deadline(deadline)),
        };

        let bullet_points = parse_bullets(&text);
        if bullet_points.is_empty() {
            warn!(
                url = %record.url,
                response_preview = %truncate_for_log(&text, 300),
                "Completion yielded no bullet points"
            );
            return Err(ExtractError::NoBullets);
        }
        debug!(url = %record.url, bullets = bullet_points.len(), "Extracted fact bullets");
        Ok(FactBullet {
            source_name: record.source_name.clone(),
            article_url: record.url.clone(),
            title: record.title.clone(),
            bullet_points,
        })
    })
    .buffer_unordered(config.concurrency.max(1))
    .collect()
    .await;

    let mut groups = SourceGroups::new();
    let mut stats = ExtractStats::default();
    for outcome in outcomes {
        match outcome {
            Ok(bullet) => {
                stats.extracted += 1;
                groups
                    .entry(bullet.source_name.clone())
                    .or_default()
                    .push(bullet);
            }
            Err(e) => {
                stats.failed += 1;
                warn!(error = %e, "Fact extraction failed for one article; dropping it");
            }
        }
    }

    info!(
        sources = groups.len(),
        extracted = stats.extracted,
        failed = stats.failed,
        "Extraction phase settled"
    );
    (groups, stats)
}

/// Parse a completion into bullet strings.
///
/// Accepts `-`, `*`, and `•` markers. A model that ignores the marker
/// format but still answers line-per-fact is salvaged by keeping its
/// non-empty lines.
fn parse_bullets(text: &str) -> Vec<String> {
    let marked: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix("- ")
                .or_else(|| line.strip_prefix("* "))
                .or_else(|| line.strip_prefix("• "))
        })
        .map(|rest| rest.trim().to_string())
        .filter(|rest| !rest.is_empty())
        .collect();
    if !marked.is_empty() {
        return marked;
    }
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
