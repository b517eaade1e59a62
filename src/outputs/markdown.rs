//! Markdown rendering of the final article and its source panel.
//!
//! The article text arrives from synthesis already formatted; this module
//! frames it with a header and appends a "Sources" section listing every
//! record that contributed content — image, summary, and a read-more link —
//! so a reader can audit the coverage behind the narrative.

use chrono::Local;

use crate::pipeline::PipelineOutput;

/// Render a pipeline run as one markdown document.
pub fn render(query: &str, output: &PipelineOutput) -> String {
    let mut doc = String::new();
    doc.push_str(&format!("# {query}\n\n"));
    doc.push_str(&format!(
        "_Synthesized from {} of {} discovered articles on {}._\n\n",
        output.report.extracted,
        output.report.fetched,
        Local::now().format("%Y-%m-%d %H:%M")
    ));
    doc.push_str(output.article.text.trim_end());
    doc.push_str("\n\n---\n\n## Sources\n\n");

    for record in output.records.iter().filter(|r| r.is_enriched()) {
        doc.push_str(&format!("### {} — {}\n\n", record.source_name, record.title));
        if let Some(image) = &record.top_image_url {
            doc.push_str(&format!("![{}]({})\n\n", record.title, image));
        }
        if let Some(summary) = &record.summary {
            doc.push_str(summary.trim());
            doc.push_str("\n\n");
        }
        doc.push_str(&format!("[Read more]({})\n\n", record.url));
    }
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ArticleRecord, Citation, FinalArticle, RunReport};

    fn sample_output() -> PipelineOutput {
        let mut enriched = ArticleRecord::stub(
            "Grid strain eases",
            "https://a.example/1",
            "Example Times",
            "2026-08-29T10:00:00Z",
        );
        enriched.body_text = Some("Body".to_string());
        enriched.top_image_url = Some("https://a.example/lead.jpg".to_string());
        enriched.summary = Some("A short abstract.".to_string());

        let bare = ArticleRecord::stub(
            "Unreachable story",
            "https://b.example/1",
            "Ghost Gazette",
            "2026-08-29T09:00:00Z",
        );

        PipelineOutput {
            article: FinalArticle {
                text: "Narrative [**_Example Times_**](https://a.example/1).".to_string(),
                citations: vec![Citation {
                    source_name: "Example Times".to_string(),
                    url: "https://a.example/1".to_string(),
                }],
            },
            records: vec![enriched, bare],
            report: RunReport {
                fetched: 2,
                enriched: 1,
                enrichment_failures: 1,
                extracted: 1,
                extraction_failures: 0,
            },
        }
    }

    #[test]
    fn test_render_includes_article_and_source_panel() {
        let doc = render("Climate Change", &sample_output());
        assert!(doc.starts_with("# Climate Change\n"));
        assert!(doc.contains("Narrative [**_Example Times_**]"));
        assert!(doc.contains("## Sources"));
        assert!(doc.contains("### Example Times — Grid strain eases"));
        assert!(doc.contains("![Grid strain eases](https://a.example/lead.jpg)"));
        assert!(doc.contains("A short abstract."));
        assert!(doc.contains("[Read more](https://a.example/1)"));
    }

    #[test]
    fn test_render_omits_unenriched_records_from_panel() {
        let doc = render("Climate Change", &sample_output());
        assert!(!doc.contains("Ghost Gazette"));
        assert!(!doc.contains("Unreachable story"));
    }

    #[test]
    fn test_render_reports_coverage_counts() {
        let doc = render("Climate Change", &sample_output());
        assert!(doc.contains("Synthesized from 1 of 2 discovered articles"));
    }
}
