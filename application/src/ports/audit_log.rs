//! Port for the structured audit trail.
//!
//! Separate from `tracing` diagnostics: tracing carries human-readable
//! operation logs, while this port records one machine-readable event per
//! state change of a room.

use investa_domain::RoomId;
use serde_json::Value;

/// One audit record.
pub struct AuditEvent {
    /// Event type identifier (e.g. "contribution_recorded", "vote_recorded").
    pub event_type: &'static str,
    pub room_id: RoomId,
    /// Event-specific fields.
    pub payload: Value,
}

impl AuditEvent {
    pub fn new(event_type: &'static str, room_id: RoomId, payload: Value) -> Self {
        Self {
            event_type,
            room_id,
            payload,
        }
    }
}

/// Records audit events.
///
/// `record` is synchronous and infallible; an adapter that cannot write
/// drops the event and reports through `tracing`.
pub trait AuditLog: Send + Sync {
    fn record(&self, event: AuditEvent);
}

/// No-op implementation for tests and when auditing is disabled.
pub struct NoAuditLog;

impl AuditLog for NoAuditLog {
    fn record(&self, _event: AuditEvent) {}
}
