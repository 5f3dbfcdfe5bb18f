//! Output format value object

use serde::{Deserialize, Serialize};

/// How room reports are rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Summary, tallies and settlement (default)
    #[default]
    Full,
    /// Room summary line only
    Summary,
    /// JSON output
    Json,
}
