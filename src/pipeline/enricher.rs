//! Per-record article enrichment.
//!
//! For each record, concurrently: download the article URL, parse body text
//! and a representative image out of the HTML, then ask the summarization
//! endpoint for a short abstract of the body. Records are mutated in place;
//! the stage never fails as a whole and never changes the record count.
//! Every per-record task runs under a deadline so one hanging download
//! cannot stall the phase join.

use futures::stream::{self, StreamExt};
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::{PipelineConfig, SummarizerConfig};
use crate::error::EnrichError;
use crate::models::ArticleRecord;

/// Outcome counts for one enrichment phase.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnrichStats {
    /// Records that gained a body.
    pub enriched: usize,
    /// Records that already had a body and were left untouched.
    pub skipped: usize,
    /// Records whose enrichment failed and were left bare.
    pub failed: usize,
}

enum Outcome {
    Enriched,
    Skipped,
    Failed,
}

/// Enrich all records in place, bounded by `config.concurrency`.
///
/// Returns only after every per-record task has settled. Failures are
/// logged and counted; the failing record keeps its unset fields and stays
/// in the slice.
#[instrument(level = "info", skip_all, fields(count = records.len()))]
pub async fn enrich(
    http: &reqwest::Client,
    config: &PipelineConfig,
    records: &mut [ArticleRecord],
) -> EnrichStats {
    let deadline = config.task_timeout();

    let outcomes: Vec<Outcome> = stream::iter(records.iter_mut())
        .map(|record| async move {
            if record.body_text.is_some() {
                debug!(url = %record.url, "Record already enriched; skipping");
                return Outcome::Skipped;
            }
            match tokio::time::timeout(deadline, enrich_one(http, config, &mut *record)).await {
                Ok(Ok(())) => {
                    debug!(url = %record.url, "Enriched record");
                    Outcome::Enriched
                }
                Ok(Err(e)) => {
                    warn!(url = %record.url, error = %e, "Enrichment failed; record left bare");
                    Outcome::Failed
                }
                Err(_) => {
                    let e = EnrichError::Deadline(deadline);
                    warn!(url = %record.url, error = %e, "Enrichment timed out; record left bare");
                    Outcome::Failed
                }
            }
        })
        .buffer_unordered(config.concurrency.max(1))
        .collect()
        .await;

    let mut stats = EnrichStats::default();
    for outcome in outcomes {
        match outcome {
            Outcome::Enriched => stats.enriched += 1,
            Outcome::Skipped => stats.skipped += 1,
            Outcome::Failed => stats.failed += 1,
        }
    }
    info!(
        enriched = stats.enriched,
        skipped = stats.skipped,
        failed = stats.failed,
        "Enrichment phase settled"
    );
    stats
}

async fn enrich_one(
    http: &reqwest::Client,
    config: &PipelineConfig,
    record: &mut ArticleRecord,
) -> Result<(), EnrichError> {
    let response = http.get(&record.url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(EnrichError::Status(status.as_u16()));
    }
    let html = response.text().await?;

    let extracted = parse_article(&html);
    if extracted.body.trim().is_empty() {
        return Err(EnrichError::EmptyBody {
            url: record.url.clone(),
        });
    }
    let top_image = extracted
        .top_image
        .and_then(|raw| resolve_image_url(&record.url, &raw));

    // A summarization failure downgrades the record instead of discarding
    // the body that was already extracted.
    let summary = match summarize(http, &config.summarizer, &extracted.body).await {
        Ok(s) => Some(s),
        Err(e) => {
            warn!(url = %record.url, error = %e, "Summarization failed; keeping body without summary");
            None
        }
    };

    record.body_text = Some(extracted.body);
    record.top_image_url = top_image;
    record.summary = summary;
    Ok(())
}

struct Extracted {
    body: String,
    top_image: Option<String>,
}

/// Pull readable body text and a representative image out of article HTML.
///
/// Paragraphs inside an `<article>` element are preferred; pages without one
/// fall back to every `<p>`. The image comes from the `og:image` meta tag,
/// falling back to the first `<img src>`.
fn parse_article(html: &str) -> Extracted {
    let document = Html::parse_document(html);
    let scoped_selector = Selector::parse("article p").unwrap();
    let any_selector = Selector::parse("p").unwrap();

    let mut body = String::new();
    let scoped: Vec<_> = document.select(&scoped_selector).collect();
    let paragraphs = if scoped.is_empty() {
        document.select(&any_selector).collect()
    } else {
        scoped
    };
    for element in paragraphs {
        let text = element.text().collect::<Vec<_>>().join(" ");
        let text = text.trim();
        if !text.is_empty() {
            body.push_str(text);
            body.push('\n');
        }
    }

    let og_selector = Selector::parse(r#"meta[property="og:image"]"#).unwrap();
    let img_selector = Selector::parse("img[src]").unwrap();
    let top_image = document
        .select(&og_selector)
        .find_map(|meta| meta.value().attr("content"))
        .or_else(|| {
            document
                .select(&img_selector)
                .find_map(|img| img.value().attr("src"))
        })
        .map(str::to_string);

    Extracted { body, top_image }
}

/// Resolve a possibly-relative image reference against the article URL.
fn resolve_image_url(article_url: &str, raw: &str) -> Option<String> {
    let base = Url::parse(article_url).ok()?;
    base.join(raw).ok().map(|resolved| resolved.to_string())
}

/// Request a short abstractive summary of `text`.
///
/// The endpoint answers with a string-encoded one-entry mapping; the summary
/// is its first value.
async fn summarize(
    http: &reqwest::Client,
    config: &SummarizerConfig,
    text: &str,
) -> Result<String, EnrichError> {
    let payload = serde_json::json!({
        "format": "paragraph",
        "length": "short",
        "text": text,
    });
    let response = http
        .post(&config.endpoint)
        .header("X-API-Key", &config.api_key)
        .header("accept", "application/json")
        .json(&payload)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(EnrichError::Summarize(format!("HTTP {status}")));
    }
    let body = response.text().await?;
    first_string_value(&body)
        .ok_or_else(|| EnrichError::Summarize("response carried no summary value".to_string()))
}

fn first_string_value(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .as_object()?
        .values()
        .next()?
        .as_str()
        .map(str::to_string)
}
