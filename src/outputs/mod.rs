//! Output rendering for a completed pipeline run.
//!
//! - [`markdown`]: the synthesized article plus its source panel
//! - [`export`]: optional delimited flat-file export of the raw records

pub mod export;
pub mod markdown;
