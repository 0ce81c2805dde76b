//! In-memory gateway used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use reana_api::{GatewayError, WorkflowGateway};
use reana_types::{FetchOptions, LogBundle, ServerConfig, SessionHandle, Workflow, WorkspaceFile};
use serde_json::Value;

/// Gateway answering from preset data and recording the calls it received.
#[derive(Debug, Default)]
pub struct ScriptedGateway {
    pub workflows: HashMap<String, Workflow>,
    /// Operations (by call name) that fail with a server error.
    pub failing: Vec<&'static str>,
    pub calls: Mutex<Vec<String>>,
}

impl ScriptedGateway {
    pub fn with_workflow(workflow_id: &str, workflow: Workflow) -> Self {
        let mut gateway = Self::default();
        gateway.workflows.insert(workflow_id.to_string(), workflow);
        gateway
    }

    pub fn failing(mut self, operation: &'static str) -> Self {
        self.failing.push(operation);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, operation: &'static str, workflow_id: &str) -> Result<(), GatewayError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(format!("{operation} {workflow_id}"));
        }
        if self.failing.contains(&operation) {
            return Err(GatewayError::Status {
                code: 500,
                message: "internal error".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl WorkflowGateway for ScriptedGateway {
    async fn fetch_workflow(&self, workflow_id: &str, _options: FetchOptions) -> Result<Workflow, GatewayError> {
        self.record("fetch_workflow", workflow_id)?;
        self.workflows.get(workflow_id).cloned().ok_or(GatewayError::NotFound)
    }

    async fn fetch_workflow_logs(&self, workflow_id: &str, _options: FetchOptions) -> Result<LogBundle, GatewayError> {
        self.record("fetch_workflow_logs", workflow_id)?;
        Ok(LogBundle {
            engine_logs: format!("engine logs of {workflow_id}"),
            ..LogBundle::default()
        })
    }

    async fn open_interactive_session(&self, workflow_id: &str) -> Result<SessionHandle, GatewayError> {
        self.record("open_interactive_session", workflow_id)?;
        Ok(SessionHandle {
            uri: format!("/{workflow_id}?token=abc"),
        })
    }

    async fn close_interactive_session(&self, workflow_id: &str) -> Result<(), GatewayError> {
        self.record("close_interactive_session", workflow_id)
    }

    async fn delete_workflow(&self, workflow_id: &str) -> Result<(), GatewayError> {
        self.record("delete_workflow", workflow_id)
    }

    async fn stop_workflow(&self, workflow_id: &str) -> Result<(), GatewayError> {
        self.record("stop_workflow", workflow_id)
    }

    async fn fetch_workspace(&self, workflow_id: &str) -> Result<Vec<WorkspaceFile>, GatewayError> {
        self.record("fetch_workspace", workflow_id)?;
        Ok(vec![WorkspaceFile {
            name: "results/plot.png".into(),
            ..WorkspaceFile::default()
        }])
    }

    async fn fetch_specification(&self, workflow_id: &str) -> Result<Value, GatewayError> {
        self.record("fetch_specification", workflow_id)?;
        Ok(serde_json::json!({"workflow": {"type": "serial"}}))
    }

    async fn fetch_config(&self) -> Result<ServerConfig, GatewayError> {
        self.record("fetch_config", "-")?;
        Ok(ServerConfig {
            polling_secs: Some(30),
            max_interactive_session_inactivity_period: Some(7),
        })
    }
}
