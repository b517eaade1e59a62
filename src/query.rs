//! Search-request construction.
//!
//! The query-to-URL resolver is a fixed string builder over the provider's
//! `everything` endpoint. The API key is deliberately not part of the built
//! URL; the fetcher appends it at request time so the URL can be logged.

use crate::config::SearchConfig;

/// Build the search URL for `query`, without the API key.
pub fn search_url(config: &SearchConfig, query: &str) -> String {
    format!(
        "{}/everything?q={}&language=en&pageSize={}",
        config.base_url.trim_end_matches('/'),
        urlencoding::encode(query.trim()),
        config.page_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_encodes_query() {
        let config = SearchConfig::default();
        let url = search_url(&config, "US economy & stocks");
        assert_eq!(
            url,
            "https://newsapi.org/v2/everything?q=US%20economy%20%26%20stocks&language=en&pageSize=10"
        );
    }

    #[test]
    fn test_search_url_trims_base_slash_and_query() {
        let config = SearchConfig {
            base_url: "http://localhost:9000/v2/".to_string(),
            api_key: String::new(),
            page_size: 5,
        };
        let url = search_url(&config, "  climate change ");
        assert_eq!(
            url,
            "http://localhost:9000/v2/everything?q=climate%20change&language=en&pageSize=5"
        );
    }

    #[test]
    fn test_search_url_never_contains_api_key() {
        let config = SearchConfig {
            api_key: "topsecret".to_string(),
            ..SearchConfig::default()
        };
        assert!(!search_url(&config, "anything").contains("topsecret"));
    }
}
