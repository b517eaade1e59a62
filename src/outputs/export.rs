//! Delimited flat-file export of raw article records.
//!
//! Archival only; the pipeline does not depend on it. Each run that asks
//! for an export writes one timestamped CSV with every fetched record,
//! enriched or not.

use std::error::Error;

use chrono::Local;
use tokio::fs;
use tracing::{info, instrument};

use crate::models::ArticleRecord;

const HEADER: &str = "title,url,source_name,published_at,body_text,top_image_url,summary";

/// Write all records as a timestamped CSV under `dir`.
///
/// Returns the path of the written file.
#[instrument(level = "info", skip_all, fields(dir = %dir, count = records.len()))]
pub async fn write_records_csv(
    records: &[ArticleRecord],
    dir: &str,
) -> Result<String, Box<dyn Error>> {
    fs::create_dir_all(dir).await?;
    let path = format!(
        "{}/search_{}.csv",
        dir.trim_end_matches('/'),
        Local::now().format("%Y-%m-%d_%H%M%S")
    );
    fs::write(&path, records_to_csv(records)).await?;
    info!(path = %path, "Wrote record export");
    Ok(path)
}

fn records_to_csv(records: &[ArticleRecord]) -> String {
    let mut out = String::from(HEADER);
    out.push('\n');
    for record in records {
        let row = [
            record.title.as_str(),
            record.url.as_str(),
            record.source_name.as_str(),
            record.published_at.as_str(),
            record.body_text.as_deref().unwrap_or(""),
            record.top_image_url.as_deref().unwrap_or(""),
            record.summary.as_deref().unwrap_or(""),
        ]
        .iter()
        .map(|field| csv_field(field))
        .collect::<Vec<_>>()
        .join(",");
        out.push_str(&row);
        out.push('\n');
    }
    out
}

/// Quote a field when it carries a delimiter, quote, or newline; internal
/// quotes are doubled per RFC 4180.
fn csv_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
