//! Wire formats of the REANA REST API and their conversion into the shared
//! data model.

use indexmap::IndexMap;
use reana_types::{
    JobLog, LogBundle, ServerConfig, SessionHandle, SessionStatus, Workflow, WorkflowProgress, WorkflowSize,
    WorkflowStatus, WorkspaceFile,
};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::GatewayError;

/// `GET /api/workflows` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowListResponse {
    #[serde(default)]
    pub items: Vec<WorkflowRecord>,
}

/// One workflow as listed by the server. `name` carries the run number as a
/// dotted suffix (`roofit.3`).
#[derive(Debug, Deserialize)]
pub(crate) struct WorkflowRecord {
    pub id: String,
    pub name: String,
    pub status: WorkflowStatus,
    #[serde(default)]
    pub size: WorkflowSize,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub progress: Option<ProgressRecord>,
    #[serde(default)]
    pub session_status: Option<SessionStatus>,
    #[serde(default)]
    pub session_uri: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ProgressRecord {
    #[serde(default)]
    pub run_started_at: Option<String>,
    #[serde(default)]
    pub run_finished_at: Option<String>,
    #[serde(default)]
    pub total: Option<JobCount>,
    #[serde(default)]
    pub finished: Option<JobCount>,
    #[serde(default)]
    pub failed: Option<JobCount>,
    #[serde(default)]
    pub running: Option<JobCount>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct JobCount {
    #[serde(default)]
    pub total: u32,
}

fn count(job_count: Option<&JobCount>) -> u32 {
    job_count.map(|c| c.total).unwrap_or(0)
}

impl From<WorkflowRecord> for Workflow {
    fn from(record: WorkflowRecord) -> Self {
        let (name, run_number) = split_run_number(&record.name);
        let progress = record.progress.unwrap_or_default();
        let counters = WorkflowProgress {
            total: count(progress.total.as_ref()),
            finished: count(progress.finished.as_ref()),
            failed: count(progress.failed.as_ref()),
            running: count(progress.running.as_ref()),
        };
        Workflow {
            id: record.id,
            name,
            run_number,
            status: record.status,
            session_status: record.session_status,
            session_uri: record.session_uri.filter(|uri| !uri.is_empty()),
            size: record.size,
            created: record.created,
            started: progress.run_started_at,
            finished: progress.run_finished_at,
            progress: (counters.total > 0).then_some(counters),
        }
    }
}

/// Split `roofit.3` or `roofit.3.1` (restarted run) into name and run number.
fn split_run_number(full_name: &str) -> (String, String) {
    let mut parts = full_name.splitn(2, '.');
    let name = parts.next().unwrap_or_default().to_string();
    let run_number = parts
        .next()
        .filter(|run| run.split('.').all(|piece| !piece.is_empty() && piece.chars().all(|c| c.is_ascii_digit())))
        .map(str::to_string);
    match run_number {
        Some(run) => (name, run),
        None => (full_name.to_string(), String::new()),
    }
}

/// `GET /api/workflows/{id}/logs` envelope; `logs` is itself a JSON document
/// encoded as a string.
#[derive(Debug, Deserialize)]
pub(crate) struct LogsResponse {
    #[serde(default)]
    pub logs: String,
}

#[derive(Debug, Default, Deserialize)]
struct LogsDocument {
    #[serde(default)]
    workflow_logs: Option<String>,
    #[serde(default)]
    job_logs: IndexMap<String, JobLog>,
}

impl LogsResponse {
    pub fn into_bundle(self) -> Result<LogBundle, GatewayError> {
        if self.logs.trim().is_empty() {
            return Ok(LogBundle::default());
        }
        let document: LogsDocument = serde_json::from_str(&self.logs)?;
        Ok(LogBundle {
            engine_logs: document.workflow_logs.unwrap_or_default(),
            job_logs: document.job_logs,
        })
    }
}

/// `GET /api/workflows/{id}/workspace` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceResponse {
    #[serde(default)]
    pub items: Vec<WorkspaceRecord>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WorkspaceRecord {
    pub name: String,
    #[serde(default)]
    pub size: WorkflowSize,
    #[serde(default, rename = "last-modified")]
    pub last_modified: Option<String>,
}

impl From<WorkspaceRecord> for WorkspaceFile {
    fn from(record: WorkspaceRecord) -> Self {
        WorkspaceFile {
            name: record.name,
            size: record.size,
            last_modified: record.last_modified,
        }
    }
}

/// `GET /api/workflows/{id}/specification` envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct SpecificationResponse {
    #[serde(default)]
    pub specification: Value,
}

/// `POST /api/workflows/{id}/open/jupyter` response.
#[derive(Debug, Deserialize)]
pub(crate) struct OpenSessionResponse {
    #[serde(default)]
    pub path: String,
}

impl From<OpenSessionResponse> for SessionHandle {
    fn from(response: OpenSessionResponse) -> Self {
        SessionHandle { uri: response.path }
    }
}

/// `GET /api/config` response. Values may be numbers, numeric strings, or
/// markers such as `"forever"` meaning "no limit".
#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConfigResponse {
    #[serde(default, deserialize_with = "lenient_u64")]
    pub polling_secs: Option<u64>,
    #[serde(default, deserialize_with = "lenient_u64")]
    pub maximum_interactive_session_inactivity_period: Option<u64>,
}

impl From<ConfigResponse> for ServerConfig {
    fn from(response: ConfigResponse) -> Self {
        ServerConfig {
            polling_secs: response.polling_secs,
            max_interactive_session_inactivity_period: response.maximum_interactive_session_inactivity_period,
        }
    }
}

fn lenient_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        Value::Number(number) => number.as_u64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Object(map) => map.get("value").and_then(|inner| match inner {
            Value::Number(number) => number.as_u64(),
            Value::String(text) => text.trim().parse().ok(),
            _ => None,
        }),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_record_splits_run_number_and_progress() {
        let json = r#"{
            "id": "2f3c",
            "name": "roofit.12",
            "status": "running",
            "size": {"raw": 2048, "human_readable": "2 KiB"},
            "created": "2024-03-01T09:59:00",
            "progress": {
                "run_started_at": "2024-03-01T10:00:00",
                "run_finished_at": null,
                "total": {"total": 4},
                "finished": {"total": 1},
                "running": {"total": 2}
            },
            "session_status": "created",
            "session_uri": "/2f3c"
        }"#;
        let record: WorkflowRecord = serde_json::from_str(json).expect("record");
        let workflow = Workflow::from(record);
        assert_eq!(workflow.name, "roofit");
        assert_eq!(workflow.run_number, "12");
        assert_eq!(workflow.status, WorkflowStatus::Running);
        assert!(workflow.has_open_session());
        assert_eq!(workflow.started.as_deref(), Some("2024-03-01T10:00:00"));
        let progress = workflow.progress.expect("progress");
        assert_eq!((progress.total, progress.finished, progress.running, progress.failed), (4, 1, 2, 0));
    }

    #[test]
    fn restarted_runs_keep_full_run_number() {
        assert_eq!(split_run_number("roofit.3.1"), ("roofit".to_string(), "3.1".to_string()));
        assert_eq!(split_run_number("no-run"), ("no-run".to_string(), String::new()));
        assert_eq!(split_run_number("odd.name"), ("odd.name".to_string(), String::new()));
    }

    #[test]
    fn logs_document_is_decoded_from_nested_string() {
        let inner = serde_json::json!({
            "workflow_logs": "engine started",
            "job_logs": {
                "job-1": {"job_name": "gendata", "status": "finished", "logs": "ok"},
                "job-2": {"job_name": "fitdata", "status": "running", "logs": ""}
            }
        });
        let response = LogsResponse {
            logs: inner.to_string(),
        };
        let bundle = response.into_bundle().expect("bundle");
        assert_eq!(bundle.engine_logs, "engine started");
        let names: Vec<&str> = bundle.job_logs.values().map(|job| job.job_name.as_str()).collect();
        assert_eq!(names, ["gendata", "fitdata"]);
    }

    #[test]
    fn empty_logs_string_is_an_empty_bundle() {
        let bundle = LogsResponse { logs: " ".into() }.into_bundle().expect("bundle");
        assert_eq!(bundle, LogBundle::default());
    }

    #[test]
    fn config_values_accept_numbers_strings_and_wrappers() {
        let json = r#"{
            "polling_secs": "30",
            "maximum_interactive_session_inactivity_period": {"value": "7", "title": "Maximum inactivity"}
        }"#;
        let config: ServerConfig = serde_json::from_str::<ConfigResponse>(json).expect("config").into();
        assert_eq!(config.polling_secs, Some(30));
        assert_eq!(config.max_interactive_session_inactivity_period, Some(7));

        let forever = r#"{"maximum_interactive_session_inactivity_period": {"value": "forever"}}"#;
        let config: ServerConfig = serde_json::from_str::<ConfigResponse>(forever).expect("config").into();
        assert_eq!(config.max_interactive_session_inactivity_period, None);
        assert_eq!(config.polling_secs, None);
    }

    #[test]
    fn workspace_records_read_dashed_timestamp() {
        let json = r#"{"items": [{"name": "results/plot.png", "size": {"raw": 10, "human_readable": "10 Bytes"}, "last-modified": "2024-03-01T10:00:00"}]}"#;
        let response: WorkspaceResponse = serde_json::from_str(json).expect("workspace");
        let files: Vec<WorkspaceFile> = response.items.into_iter().map(WorkspaceFile::from).collect();
        assert_eq!(files[0].name, "results/plot.png");
        assert_eq!(files[0].last_modified.as_deref(), Some("2024-03-01T10:00:00"));
    }
}
