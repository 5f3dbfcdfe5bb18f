//! Structured configuration issues.
//!
//! Config validation never fails the load; it reports issues with a severity
//! and the loader falls back to defaults for the affected field.

/// Severity level of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Fatal: the configuration cannot work at all.
    Error,
    /// Non-fatal: a default is used instead.
    Warning,
}

/// Identifies a specific configuration issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigIssueCode {
    /// A quorum rule string that does not parse.
    InvalidRule { field: String, value: String },
    /// A decimal field that does not parse.
    InvalidDecimal { field: String, value: String },
    /// A numeric field that must be strictly positive.
    NonPositive { field: String, value: String },
    /// A numeric field above its hard limit.
    AboveLimit {
        field: String,
        value: String,
        limit: String,
    },
}

impl ConfigIssueCode {
    pub fn field(&self) -> &str {
        match self {
            ConfigIssueCode::InvalidRule { field, .. }
            | ConfigIssueCode::InvalidDecimal { field, .. }
            | ConfigIssueCode::NonPositive { field, .. }
            | ConfigIssueCode::AboveLimit { field, .. } => field,
        }
    }
}

/// A detected issue in the configuration.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    pub severity: Severity,
    pub code: ConfigIssueCode,
    pub message: String,
}

impl ConfigIssue {
    pub fn warning(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            message: message.into(),
        }
    }

    pub fn error(code: ConfigIssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}
