//! The four-stage synthesis pipeline.
//!
//! Stage order: fetch → enrich → extract → synthesize. The two fan-out
//! stages (enrich, extract) run their per-record tasks concurrently and
//! join on every task settling before the next stage starts; both degrade
//! gracefully per record. Only the two single-shot stages can fail the run:
//! the provider fetch and the synthesis completion. A run in which zero
//! records survive enrichment short-circuits with
//! [`PipelineError::NoSources`] instead of asking the model to write from
//! an empty outline.

pub mod enricher;
pub mod extractor;
pub mod fetcher;
pub mod synthesizer;

use tracing::{info, instrument};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::llm::Completion;
use crate::models::{ArticleRecord, FinalArticle, RunReport};

/// Everything one successful run produces.
#[derive(Debug)]
pub struct PipelineOutput {
    /// The synthesized, citation-validated article.
    pub article: FinalArticle,
    /// All fetched records, enriched where enrichment succeeded. Feeds the
    /// source panel and the optional flat-file export.
    pub records: Vec<ArticleRecord>,
    /// Per-stage success/failure counts.
    pub report: RunReport,
}

/// Run the whole pipeline for `query`.
#[instrument(level = "info", skip_all, fields(query = %query))]
pub async fn run<C: Completion>(
    http: &reqwest::Client,
    llm: &C,
    config: &PipelineConfig,
    query: &str,
) -> Result<PipelineOutput, PipelineError> {
    let mut records = fetcher::fetch(http, &config.search, query).await?;
    let fetched = records.len();

    let enrich_stats = enricher::enrich(http, config, &mut records).await;
    debug_assert_eq!(records.len(), fetched);

    let (groups, extract_stats) = extractor::extract(llm, config, query, &records).await;
    if groups.is_empty() {
        return Err(PipelineError::NoSources);
    }

    let article = synthesizer::synthesize(llm, &config.llm, query, &groups).await?;

    let report = RunReport {
        fetched,
        enriched: enrich_stats.enriched + enrich_stats.skipped,
        enrichment_failures: enrich_stats.failed,
        extracted: extract_stats.extracted,
        extraction_failures: extract_stats.failed,
    };
    info!(?report, "Pipeline run complete");

    Ok(PipelineOutput {
        article,
        records,
        report,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ModelSettings, SearchConfig, SummarizerConfig};
    use crate::error::LlmError;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Bullet replies for extraction prompts; a cited article for the
    /// synthesis prompt. Told apart by the prompt preamble.
    struct EndToEndBackend {
        article: String,
    }

    impl Completion for EndToEndBackend {
        async fn complete(&self, _: &ModelSettings, prompt: &str) -> Result<String, LlmError> {
            if prompt.contains("Synthesize the bullet points") {
                Ok(self.article.clone())
            } else {
                Ok("- a relevant fact\n- \"a quote,\" said someone".to_string())
            }
        }
    }

    fn story_html(marker: &str) -> String {
        format!(
            "<html><body><article><p>Body text about {marker}, long enough to matter.</p></article></body></html>"
        )
    }

    async fn mount_search(server: &MockServer, articles: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/everything"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "ok", "articles": articles })),
            )
            .mount(server)
            .await;
    }

    fn test_config(server: &MockServer) -> PipelineConfig {
        PipelineConfig {
            search: SearchConfig {
                base_url: server.uri(),
                api_key: "k".to_string(),
                page_size: 10,
            },
            summarizer: SummarizerConfig {
                endpoint: format!("{}/summarize", server.uri()),
                api_key: String::new(),
            },
            ..PipelineConfig::default()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_partial_enrichment() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_search(
            &server,
            serde_json::json!([
                { "source": { "name": "Example Times" }, "title": "One",
                  "url": format!("{base}/one"), "publishedAt": "2026-08-29T10:00:00Z" },
                { "source": { "name": "Daily Wire Report" }, "title": "Two",
                  "url": format!("{base}/two"), "publishedAt": "2026-08-29T09:00:00Z" },
                { "source": { "name": "Ghost Gazette" }, "title": "Three",
                  "url": format!("{base}/three"), "publishedAt": "2026-08-29T08:00:00Z" }
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/one"))
            .respond_with(ResponseTemplate::new(200).set_body_string(story_html("one")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/two"))
            .respond_with(ResponseTemplate::new(200).set_body_string(story_html("two")))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/three"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/summarize"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "summary": "short" })),
            )
            .mount(&server)
            .await;

        let llm = EndToEndBackend {
            article: format!(
                "Things happened [**_Example Times_**]({base}/one) and \
                 elsewhere [**_Daily Wire Report_**]({base}/two)."
            ),
        };
        let config = test_config(&server);
        let output = run(&reqwest::Client::new(), &llm, &config, "Climate Change")
            .await
            .unwrap();

        assert_eq!(output.report.fetched, 3);
        assert_eq!(output.report.enriched, 2);
        assert_eq!(output.report.enrichment_failures, 1);
        assert_eq!(output.report.extracted, 2);
        assert_eq!(output.records.len(), 3);
        assert!(!output.article.text.is_empty());
        assert_eq!(output.article.citations.len(), 2);
        let sources: Vec<_> = output
            .article
            .citations
            .iter()
            .map(|c| c.source_name.as_str())
            .collect();
        assert!(sources.contains(&"Example Times"));
        assert!(sources.contains(&"Daily Wire Report"));
    }

    #[tokio::test]
    async fn test_zero_survivors_short_circuits_with_no_sources() {
        let server = MockServer::start().await;
        let base = server.uri();
        mount_search(
            &server,
            serde_json::json!([
                { "source": { "name": "Example Times" }, "title": "One",
                  "url": format!("{base}/one"), "publishedAt": "2026-08-29T10:00:00Z" }
            ]),
        )
        .await;
        Mock::given(method("GET"))
            .and(path("/one"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let llm = EndToEndBackend {
            article: String::new(),
        };
        let config = test_config(&server);
        let err = run(&reqwest::Client::new(), &llm, &config, "Climate Change")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoSources));
    }

    #[tokio::test]
    async fn test_provider_failure_aborts_the_run() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/everything"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let llm = EndToEndBackend {
            article: String::new(),
        };
        let config = test_config(&server);
        let err = run(&reqwest::Client::new(), &llm, &config, "anything")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::Provider(_)));
    }

    #[tokio::test]
    async fn test_empty_provider_result_is_no_sources() {
        let server = MockServer::start().await;
        mount_search(&server, serde_json::json!([])).await;

        let llm = EndToEndBackend {
            article: String::new(),
        };
        let config = test_config(&server);
        let err = run(&reqwest::Client::new(), &llm, &config, "obscure topic")
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::NoSources));
    }
}
