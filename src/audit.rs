//! Audit trail for outbound control calls
//!
//! Each lock or release request is appended as one JSON line to
//! `<state dir>/rotest-board/audit.log`. Disabled with `general.audit_log`.

use crate::config::{Config, ConfigManager};
use crate::control::{ControlAction, ControlResponse};
use crate::error::BoardError;
use chrono::Utc;
use serde_json::{json, Value};
use std::path::PathBuf;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tracing::warn;

/// Append-only JSON-lines audit log
pub struct AuditLog {
    enabled: bool,
    path: PathBuf,
}

impl AuditLog {
    pub fn new(config: &Config) -> Self {
        Self {
            enabled: config.general.audit_log,
            path: ConfigManager::audit_log_path(),
        }
    }

    /// Audit log writing to an explicit path
    pub fn at(path: PathBuf, enabled: bool) -> Self {
        Self { enabled, path }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Record the outcome of a control call
    pub async fn control_call(
        &self,
        action: ControlAction,
        resource: &str,
        outcome: Result<&ControlResponse, &BoardError>,
    ) {
        let data = match outcome {
            Ok(response) => json!({
                "resource": resource,
                "ok": true,
                "effected_resources": response.effected_resources,
                "user": response.user,
            }),
            Err(e) => json!({
                "resource": resource,
                "ok": false,
                "error": e.to_string(),
            }),
        };
        self.log(&format!("control.{}", action.endpoint()), &data).await;
    }

    /// Write one event. IO failures are logged and otherwise ignored.
    pub async fn log(&self, event: &str, data: &Value) {
        if !self.enabled {
            return;
        }

        let entry = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "event": event,
            "data": data,
        });

        let mut line = match serde_json::to_string(&entry) {
            Ok(s) => s,
            Err(e) => {
                warn!("Failed to serialize audit event: {}", e);
                return;
            }
        };
        line.push('\n');

        if let Err(e) = self.append(&line).await {
            warn!("Failed to write audit log {}: {}", self.path.display(), e);
        }
    }

    async fn append(&self, line: &str) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;

        file.write_all(line.as_bytes()).await?;
        file.flush().await
    }
}
