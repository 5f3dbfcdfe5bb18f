//! Logging configuration from TOML (`[logging]` section)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// ```toml
/// [logging]
/// file = "~/.local/state/investa/investa.log"   # tracing output
/// audit_file = "./investa-audit.jsonl"          # JSONL audit trail
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLoggingConfig {
    /// Also write tracing output to this file
    pub file: Option<PathBuf>,
    /// Append audit events to this JSONL file
    pub audit_file: Option<PathBuf>,
}
