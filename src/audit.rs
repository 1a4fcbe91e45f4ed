use chrono::{DateTime, Utc};
use serde_json::Value;
use uuid::Uuid;

use crate::store::AuditLog;

#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub id: Uuid,
    pub user_id: Option<String>,
    pub action: String,
    pub resource: Option<String>,
    pub metadata: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Best-effort: a failed audit write is logged and never fails the request.
pub async fn log_audit(
    audit: &dyn AuditLog,
    now: DateTime<Utc>,
    user_id: Option<&str>,
    action: &str,
    resource: Option<&str>,
    metadata: Option<Value>,
) {
    let entry = AuditEntry {
        id: Uuid::new_v4(),
        user_id: user_id.map(str::to_string),
        action: action.to_string(),
        resource: resource.map(str::to_string),
        metadata,
        created_at: now,
    };

    if let Err(err) = audit.record(entry).await {
        tracing::warn!(error = %err, action, "audit log failed");
    }
}
