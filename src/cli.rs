//! Command-line interface definitions.
//!
//! All options can be provided via flags; API keys fall back to environment
//! variables so they stay out of shell history.

use clap::Parser;

/// Command-line arguments for newsweave.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// newsweave "Climate Change"
///
/// # Custom config and output locations, plus a CSV export of the records
/// newsweave "EU AI Act" -c ./newsweave.yaml -o ./articles --export-csv
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Search query to build the article from
    pub query: String,

    /// Path to the YAML pipeline configuration
    #[arg(short, long, default_value = "config.yaml")]
    pub config: String,

    /// Output directory for the rendered article markdown
    #[arg(short, long, default_value = "./articles")]
    pub output_dir: String,

    /// Also export the raw article records as a CSV file
    #[arg(long)]
    pub export_csv: bool,

    /// Output directory for CSV exports
    #[arg(long, default_value = "./searches")]
    pub export_dir: String,

    /// Search provider API key (overrides the config file)
    #[arg(long, env = "NEWSAPI_KEY")]
    pub newsapi_key: Option<String>,

    /// Summarization API key (overrides the config file)
    #[arg(long, env = "SUMMARIZER_API_KEY")]
    pub summarizer_key: Option<String>,

    /// Completion backend API key (overrides the config file)
    #[arg(long, env = "OPENAI_API_KEY")]
    pub llm_key: Option<String>,
}
