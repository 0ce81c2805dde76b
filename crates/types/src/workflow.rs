//! Workflow data model shared by the gateway client and the TUI.
//!
//! These types are the UI's read-only projection of what the REANA server
//! reports. Wire-level quirks (nested JSON strings, combined `name.run`
//! identifiers) are resolved by `reana-api` before values land here.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a workflow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Created,
    Queued,
    Pending,
    Running,
    Finished,
    Failed,
    Stopped,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl WorkflowStatus {
    /// Statuses after which the server reports no further transitions.
    pub const TERMINAL: [WorkflowStatus; 4] = [Self::Finished, Self::Failed, Self::Stopped, Self::Deleted];

    pub fn is_terminal(self) -> bool {
        Self::TERMINAL.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Queued => "queued",
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Finished => "finished",
            Self::Failed => "failed",
            Self::Stopped => "stopped",
            Self::Deleted => "deleted",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State of the interactive (notebook) session attached to a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Created,
    Closed,
    #[serde(other)]
    Unknown,
}

/// Disk usage as reported by the server: a raw byte count plus its
/// pre-rendered human form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowSize {
    #[serde(default)]
    pub raw: u64,
    #[serde(default)]
    pub human_readable: String,
}

/// Job counters of a running or finished workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowProgress {
    pub total: u32,
    pub finished: u32,
    pub failed: u32,
    pub running: u32,
}

/// A single workflow run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: String,
    pub name: String,
    pub run_number: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub session_status: Option<SessionStatus>,
    #[serde(default)]
    pub session_uri: Option<String>,
    #[serde(default)]
    pub size: WorkflowSize,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub started: Option<String>,
    #[serde(default)]
    pub finished: Option<String>,
    #[serde(default)]
    pub progress: Option<WorkflowProgress>,
}

impl Workflow {
    pub fn is_deleted(&self) -> bool {
        self.status == WorkflowStatus::Deleted
    }

    pub fn is_running(&self) -> bool {
        self.status == WorkflowStatus::Running
    }

    /// True when an interactive session is currently open.
    pub fn has_open_session(&self) -> bool {
        self.session_status == Some(SessionStatus::Created)
    }

    /// Display name in the `name #run` form used across the dashboard.
    pub fn display_name(&self) -> String {
        if self.run_number.is_empty() {
            self.name.clone()
        } else {
            format!("{} #{}", self.name, self.run_number)
        }
    }

    /// Wall-clock run time: started → finished, or started → `now` while the
    /// workflow is still active. `None` when the workflow never started.
    pub fn run_duration(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        let started = parse_server_timestamp(self.started.as_deref()?)?;
        let end = match self.finished.as_deref() {
            Some(finished) => parse_server_timestamp(finished)?,
            None if self.status.is_terminal() => return None,
            None => now,
        };
        Some(end.signed_duration_since(started))
    }
}

/// Parses the timestamp formats emitted by the server (`2024-03-01T10:00:00`
/// without offset, or RFC 3339).
pub fn parse_server_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}

/// Logs of one job within a workflow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobLog {
    pub job_name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub compute_backend: Option<String>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub finished_at: Option<String>,
    #[serde(default)]
    pub logs: String,
}

/// Engine logs plus per-job logs keyed by job id, in server order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogBundle {
    #[serde(default)]
    pub engine_logs: String,
    #[serde(default)]
    pub job_logs: IndexMap<String, JobLog>,
}

/// One entry of a workflow's workspace listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceFile {
    pub name: String,
    #[serde(default)]
    pub size: WorkflowSize,
    #[serde(default)]
    pub last_modified: Option<String>,
}

/// Handle returned by the server after opening an interactive session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionHandle {
    /// Path or URL of the notebook, relative to the server when not absolute.
    pub uri: String,
}

/// Dashboard settings published by the server under `/api/config`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default)]
    pub polling_secs: Option<u64>,
    /// Days of inactivity after which an interactive session is closed.
    #[serde(default)]
    pub max_interactive_session_inactivity_period: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn terminal_statuses_match_lifecycle() {
        assert!(WorkflowStatus::Finished.is_terminal());
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(WorkflowStatus::Stopped.is_terminal());
        assert!(WorkflowStatus::Deleted.is_terminal());
        assert!(!WorkflowStatus::Running.is_terminal());
        assert!(!WorkflowStatus::Created.is_terminal());
        assert!(!WorkflowStatus::Queued.is_terminal());
    }

    #[test]
    fn unknown_status_deserializes_to_unknown() {
        let status: WorkflowStatus = serde_json::from_str("\"paused\"").expect("status");
        assert_eq!(status, WorkflowStatus::Unknown);
        let session: SessionStatus = serde_json::from_str("\"created\"").expect("session");
        assert_eq!(session, SessionStatus::Created);
    }

    #[test]
    fn display_name_omits_empty_run_number() {
        let mut workflow = Workflow {
            name: "roofit".into(),
            run_number: "3".into(),
            ..Workflow::default()
        };
        assert_eq!(workflow.display_name(), "roofit #3");
        workflow.run_number.clear();
        assert_eq!(workflow.display_name(), "roofit");
    }

    #[test]
    fn run_duration_uses_now_while_active() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 5, 0).single().expect("now");
        let workflow = Workflow {
            status: WorkflowStatus::Running,
            started: Some("2024-03-01T10:00:00".into()),
            ..Workflow::default()
        };
        assert_eq!(workflow.run_duration(now), Some(chrono::Duration::minutes(5)));
    }

    #[test]
    fn run_duration_is_none_for_never_started() {
        let now = Utc::now();
        let workflow = Workflow::default();
        assert_eq!(workflow.run_duration(now), None);
    }

    #[test]
    fn parses_rfc3339_and_naive_timestamps() {
        assert!(parse_server_timestamp("2024-03-01T10:00:00Z").is_some());
        assert!(parse_server_timestamp("2024-03-01T10:00:00.123456").is_some());
        assert!(parse_server_timestamp("2024-03-01 10:00:00").is_some());
        assert!(parse_server_timestamp("yesterday").is_none());
    }
}
