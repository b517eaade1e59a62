//! Final article synthesis with citation validation.
//!
//! One chat completion turns the grouped fact bullets into a single
//! narrative. The model is instructed to cite inline with
//! `[**_Source Name_**](url)` links; its output is not trusted to honor
//! that contract, so a validation pass parses every emitted citation and
//! checks it against the synthesis input. A failing validation re-asks
//! once, then fails the run.

use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, instrument, warn};

use crate::config::LlmConfig;
use crate::error::GenerationError;
use crate::llm::Completion;
use crate::models::{Citation, FinalArticle, SourceGroups};
use crate::prompts;
use crate::utils::truncate_for_log;

static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[\*\*_(?P<source>[^\]]+?)_\*\*\]\((?P<url>[^)\s]+)\)").unwrap()
});

/// Compose one cohesive article out of the grouped fact bullets.
///
/// The caller guarantees `groups` is non-empty; empty synthesis input is
/// handled upstream by the pipeline's no-sources short circuit.
#[instrument(level = "info", skip_all, fields(query = %query, sources = groups.len()))]
pub async fn synthesize<C: Completion>(
    llm: &C,
    config: &LlmConfig,
    query: &str,
    groups: &SourceGroups,
) -> Result<FinalArticle, GenerationError> {
    let outline = outline(groups);
    let prompt = prompts::synthesis(query, &outline);
    debug!(outline_bytes = outline.len(), "Synthesis prompt assembled");

    let text = llm
        .complete(&config.synthesis, &prompt)
        .await
        .map_err(GenerationError::Completion)?;

    match validate_citations(&text, groups) {
        Ok(citations) => {
            info!(citations = citations.len(), "Synthesized article validated");
            Ok(FinalArticle { text, citations })
        }
        Err(e) => {
            warn!(
                error = %e,
                response_preview = %truncate_for_log(&text, 300),
                "Synthesized article failed citation validation; re-asking once"
            );
            let text = llm
                .complete(&config.synthesis, &prompt)
                .await
                .map_err(GenerationError::Completion)?;
            let citations = validate_citations(&text, groups)?;
            info!(citations = citations.len(), "Re-asked article validated");
            Ok(FinalArticle { text, citations })
        }
    }
}

/// Serialize the grouped bullets into the prompt outline.
///
/// Sources are sorted by name so the same input always produces the same
/// prompt, whatever order extraction completed in.
fn outline(groups: &SourceGroups) -> String {
    let mut out = String::new();
    for source in groups.keys().sorted() {
        out.push_str(&format!("## {source}\n"));
        for bullet in &groups[source] {
            out.push_str(&format!("### {} <{}>\n", bullet.title, bullet.article_url));
            for point in &bullet.bullet_points {
                out.push_str(&format!("- {point}\n"));
            }
        }
        out.push('\n');
    }
    out
}

/// Parse every emitted citation link and check it against the input groups.
///
/// Each cited (source, url) pair must name a source group containing a
/// bullet with that exact article URL, and at least one citation must be
/// present. Returns the distinct citations in order of first appearance.
fn validate_citations(
    text: &str,
    groups: &SourceGroups,
) -> Result<Vec<Citation>, GenerationError> {
    let mut citations: Vec<Citation> = Vec::new();
    for caps in CITATION_RE.captures_iter(text) {
        let source = caps["source"].to_string();
        let url = caps["url"].to_string();
        let known = groups
            .get(&source)
            .is_some_and(|bullets| bullets.iter().any(|b| b.article_url == url));
        if !known {
            return Err(GenerationError::UnknownCitation { source_name: source, url });
        }
        let citation = Citation {
            source_name: source,
            url,
        };
        if !citations.contains(&citation) {
            citations.push(citation);
        }
    }
    if citations.is_empty() {
        return Err(GenerationError::MissingCitations);
    }
    Ok(citations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ModelSettings;
    use crate::error::LlmError;
    use crate::models::FactBullet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn groups() -> SourceGroups {
        let mut groups = SourceGroups::new();
        groups.insert(
            "Example Times".to_string(),
            vec![FactBullet {
                source_name: "Example Times".to_string(),
                article_url: "https://a.example/1".to_string(),
                title: "Grid strain eases".to_string(),
                bullet_points: vec!["Demand fell 3%.".to_string()],
            }],
        );
        groups.insert(
            "Daily Wire Report".to_string(),
            vec![FactBullet {
                source_name: "Daily Wire Report".to_string(),
                article_url: "https://b.example/1".to_string(),
                title: "Storms batter coast".to_string(),
                bullet_points: vec!["Ports closed for two days.".to_string()],
            }],
        );
        groups
    }

    /// Replies from a fixed script, one entry per call.
    struct ScriptedBackend {
        script: Vec<Result<String, LlmError>>,
        calls: AtomicUsize,
    }

    impl ScriptedBackend {
        fn new(script: Vec<Result<String, LlmError>>) -> Self {
            Self {
                script,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Completion for ScriptedBackend {
        async fn complete(&self, _: &ModelSettings, _: &str) -> Result<String, LlmError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            match self.script.get(call) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(_)) | None => Err(LlmError::EmptyResponse),
            }
        }
    }

    const GOOD_ARTICLE: &str = "Electricity demand fell 3% \
        [**_Example Times_**](https://a.example/1). Meanwhile ports shut \
        [**_Daily Wire Report_**](https://b.example/1).";

    fn config() -> LlmConfig {
        LlmConfig::default()
    }

    #[tokio::test]
    async fn test_synthesize_accepts_valid_citations() {
        let backend = ScriptedBackend::new(vec![Ok(GOOD_ARTICLE.to_string())]);
        let article = synthesize(&backend, &config(), "storms", &groups())
            .await
            .unwrap();
        assert_eq!(article.citations.len(), 2);
        assert!(article.text.contains("Example Times"));
        assert_eq!(backend.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_synthesize_reasks_once_on_unknown_citation() {
        let bad = "Claim [**_Example Times_**](https://fabricated.example/x).";
        let backend =
            ScriptedBackend::new(vec![Ok(bad.to_string()), Ok(GOOD_ARTICLE.to_string())]);
        let article = synthesize(&backend, &config(), "storms", &groups())
            .await
            .unwrap();
        assert_eq!(backend.calls.load(Ordering::SeqCst), 2);
        assert_eq!(article.citations.len(), 2);
    }

    #[tokio::test]
    async fn test_synthesize_fails_after_second_invalid_answer() {
        let uncited = "An article with no links at all.";
        let backend = ScriptedBackend::new(vec![
            Ok(uncited.to_string()),
            Ok(uncited.to_string()),
        ]);
        let err = synthesize(&backend, &config(), "storms", &groups())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::MissingCitations));
    }

    #[tokio::test]
    async fn test_synthesize_surfaces_completion_failure() {
        let backend = ScriptedBackend::new(vec![]);
        let err = synthesize(&backend, &config(), "storms", &groups())
            .await
            .unwrap_err();
        assert!(matches!(err, GenerationError::Completion(_)));
    }

    #[test]
    fn test_outline_is_sorted_and_complete() {
        let outline = outline(&groups());
        let daily = outline.find("## Daily Wire Report").unwrap();
        let example = outline.find("## Example Times").unwrap();
        assert!(daily < example);
        assert!(outline.contains("<https://a.example/1>"));
        assert!(outline.contains("- Ports closed for two days."));
    }

    #[test]
    fn test_validate_citations_dedupes_and_orders() {
        let text = format!("{GOOD_ARTICLE} Repeat [**_Example Times_**](https://a.example/1).");
        let citations = validate_citations(&text, &groups()).unwrap();
        assert_eq!(citations.len(), 2);
        assert_eq!(citations[0].source_name, "Example Times");
    }

    #[test]
    fn test_validate_citations_rejects_wrong_source_for_url() {
        let text = "Claim [**_Daily Wire Report_**](https://a.example/1).";
        let err = validate_citations(text, &groups()).unwrap_err();
        assert!(matches!(err, GenerationError::UnknownCitation { .. }));
    }
}
