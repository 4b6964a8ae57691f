//! Security audit logging for the admin API.
//!
//! Authentication outcomes are logged under the `audit` target so they can
//! be routed separately (`RUST_LOG=audit=info`).

use std::net::SocketAddr;
use tracing::{info, warn};

/// Security audit events that should be logged for monitoring and alerting.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// Missing or rejected bearer token
    AuthFailure {
        remote_addr: Option<SocketAddr>,
        path: String,
        reason: &'static str,
    },
    /// Successful authentication (for correlation)
    AuthSuccess {
        remote_addr: Option<SocketAddr>,
        uid: String,
    },
}

/// Log a security audit event with structured fields.
pub fn log_audit_event(event: AuditEvent) {
    match event {
        AuditEvent::AuthFailure {
            remote_addr,
            path,
            reason,
        } => {
            warn!(
                target: "audit",
                event_type = "auth_failure",
                remote_addr = ?remote_addr,
                %path,
                reason,
                "Authentication failed"
            );
        },
        AuditEvent::AuthSuccess { remote_addr, uid } => {
            info!(
                target: "audit",
                event_type = "auth_success",
                remote_addr = ?remote_addr,
                %uid,
                "Authentication succeeded"
            );
        },
    }
}
