//! # newsweave
//!
//! A news synthesis pipeline: given a search query, it discovers matching
//! articles through a search provider, extracts body text and a short
//! summary from each, distills every article into neutral fact bullets via
//! an LLM, and weaves the bullets into a single narrative article with
//! inline source citations.
//!
//! ## Usage
//!
//! ```sh
//! newsweave "Climate Change" -o ./articles
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs four stages in sequence:
//! 1. **Fetch**: one search-provider request returning candidate records
//! 2. **Enrich**: concurrent per-article download, parse, and summarize
//! 3. **Extract**: concurrent per-article fact-bullet completions, grouped
//!    by source
//! 4. **Synthesize**: one completion producing the final cited article,
//!    validated against the synthesis input

use std::error::Error;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod error;
mod llm;
mod models;
mod outputs;
mod pipeline;
mod prompts;
mod query;
mod utils;

use cli::Cli;
use config::PipelineConfig;
use llm::{ChatClient, RetryCompletion};
use utils::{ensure_writable_dir, slugify_query};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsweave starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.output_dir, query = %args.query, "Parsed CLI arguments");

    // Early check: ensure the article output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Config ----
    let mut config = if std::path::Path::new(&args.config).exists() {
        PipelineConfig::load(&args.config)?
    } else {
        warn!(path = %args.config, "Config file not found; using built-in defaults");
        PipelineConfig::default()
    };
    config.override_keys(
        args.newsapi_key.as_deref(),
        args.summarizer_key.as_deref(),
        args.llm_key.as_deref(),
    );
    debug!(?config, "Effective configuration");

    // ---- Clients ----
    let http = reqwest::Client::builder()
        .user_agent(concat!("newsweave/", env!("CARGO_PKG_VERSION")))
        .build()?;
    let llm = RetryCompletion::new(
        ChatClient::new(http.clone(), &config.llm),
        5,
        Duration::from_secs(1),
    );

    // ---- Run the pipeline ----
    let output = match pipeline::run(&http, &llm, &config, &args.query).await {
        Ok(output) => output,
        Err(e) => {
            error!(error = %e, "Pipeline run failed");
            return Err(e.into());
        }
    };
    info!(
        fetched = output.report.fetched,
        enriched = output.report.enriched,
        enrichment_failures = output.report.enrichment_failures,
        extracted = output.report.extracted,
        extraction_failures = output.report.extraction_failures,
        citations = output.article.citations.len(),
        "Run produced an article"
    );

    // ---- Render and write outputs ----
    let rendered = outputs::markdown::render(&args.query, &output);
    let output_filename = format!(
        "{}/{}_{}.md",
        args.output_dir.trim_end_matches('/'),
        chrono::Local::now().format("%Y-%m-%d"),
        slugify_query(&args.query)
    );
    info!(path = %output_filename, "Writing article markdown");
    if let Err(e) = tokio::fs::write(&output_filename, &rendered).await {
        error!(path = %output_filename, error = %e, "Failed writing article markdown");
    }

    if args.export_csv {
        if let Err(e) = outputs::export::write_records_csv(&output.records, &args.export_dir).await
        {
            error!(error = %e, "Failed to write record export");
        }
    }

    println!("{rendered}");

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
