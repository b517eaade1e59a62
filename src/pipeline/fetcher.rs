//! Article discovery against the search provider.
//!
//! One HTTP GET per run. The provider answers with a JSON body carrying an
//! `articles` array; each row becomes an [`ArticleRecord`] stub with the
//! enrichment fields unset. A non-success status aborts the whole run with
//! [`ProviderError`]; there is no retry at this layer because a failed fetch
//! leaves no partial results to salvage.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use crate::config::SearchConfig;
use crate::error::ProviderError;
use crate::models::ArticleRecord;
use crate::query;

#[derive(Debug, Deserialize)]
struct ProviderPayload {
    #[serde(default)]
    articles: Vec<ProviderArticle>,
}

// The provider emits explicit nulls for missing metadata, hence the Options.
#[derive(Debug, Deserialize)]
struct ProviderArticle {
    title: Option<String>,
    url: String,
    source: ProviderSource,
    #[serde(rename = "publishedAt")]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProviderSource {
    name: Option<String>,
}

impl From<ProviderArticle> for ArticleRecord {
    fn from(article: ProviderArticle) -> Self {
        ArticleRecord::stub(
            article.title.unwrap_or_default(),
            article.url,
            article.source.name.unwrap_or_default(),
            article.published_at.unwrap_or_default(),
        )
    }
}

/// Fetch candidate records for `query` from the search provider.
#[instrument(level = "info", skip_all, fields(query = %search_query))]
pub async fn fetch(
    http: &reqwest::Client,
    config: &SearchConfig,
    search_query: &str,
) -> Result<Vec<ArticleRecord>, ProviderError> {
    let url = query::search_url(config, search_query);
    debug!(%url, "Search provider request");

    // Key appended here so the loggable URL above never carries it.
    let response = http
        .get(format!("{url}&apiKey={}", config.api_key))
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(ProviderError::Status(status.as_u16()));
    }

    let body = response.text().await?;
    let payload: ProviderPayload = serde_json::from_str(&body)?;
    let records: Vec<ArticleRecord> = payload.articles.into_iter().map(Into::into).collect();

    info!(count = records.len(), "Indexed candidate articles");
    Ok(records)
}
