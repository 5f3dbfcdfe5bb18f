//! Logging infrastructure: structured audit trail.
//!
//! Provides [`JsonlAuditLog`], a JSONL file writer that implements the
//! [`AuditLog`](investa_application::AuditLog) port.

mod jsonl_audit;

pub use jsonl_audit::JsonlAuditLog;
