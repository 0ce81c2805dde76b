//! Shared types for the REANA terminal dashboard.
//!
//! Besides the workflow data model, this crate defines the message/effect
//! vocabulary of the TUI: [`Msg`] flows into state updates, [`Effect`] flows
//! out of them and is turned into side effects by the command layer.

pub mod workflow;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use workflow::{
    JobLog, LogBundle, ServerConfig, SessionHandle, SessionStatus, Workflow, WorkflowProgress, WorkflowSize,
    WorkflowStatus, WorkspaceFile, parse_server_timestamp,
};

/// How a fetch should be performed and presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchOptions {
    /// Bypass any intermediate caches.
    pub refetch: bool,
    /// Show the blocking loading indicator while the request is in flight.
    pub show_loader: bool,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            refetch: false,
            show_loader: true,
        }
    }
}

impl FetchOptions {
    /// Options used by polling ticks and refreshes: fresh data, no loader.
    pub fn background() -> Self {
        Self {
            refetch: true,
            show_loader: false,
        }
    }
}

/// Gateway operation names, used when reporting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatewayOperation {
    FetchWorkflow,
    FetchWorkflowLogs,
    FetchWorkspace,
    FetchSpecification,
    FetchServerConfig,
    OpenInteractiveSession,
    CloseInteractiveSession,
    StopWorkflow,
    DeleteWorkflow,
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::FetchWorkflow => "fetch workflow",
            Self::FetchWorkflowLogs => "fetch workflow logs",
            Self::FetchWorkspace => "fetch workspace",
            Self::FetchSpecification => "fetch specification",
            Self::FetchServerConfig => "fetch server configuration",
            Self::OpenInteractiveSession => "open interactive session",
            Self::CloseInteractiveSession => "close interactive session",
            Self::StopWorkflow => "stop workflow",
            Self::DeleteWorkflow => "delete workflow",
        };
        f.write_str(label)
    }
}

/// Visual weight of a notification or dialog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Messages that update application state.
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Periodic UI tick (throbbers, toast expiry)
    Tick,
    /// Terminal resized
    Resize(u16, u16),
    /// One scheduled polling cycle for a subscription
    PollTick { workflow_id: String, generation: u64 },
    /// User asked for a one-off background refresh
    RefreshRequested,
    /// Workflow metadata arrived for the identifier it was requested with
    /// (a UUID or a `name.run` reference)
    WorkflowLoaded { workflow_id: String, workflow: Box<Workflow> },
    /// The identifier does not resolve to an accessible workflow
    WorkflowMissing { workflow_id: String },
    /// Engine and job logs arrived
    WorkflowLogsLoaded { workflow_id: String, logs: Box<LogBundle> },
    /// Workspace listing arrived
    WorkspaceLoaded { workflow_id: String, files: Vec<WorkspaceFile> },
    /// Workflow specification arrived
    SpecificationLoaded { workflow_id: String, specification: Value },
    /// Server-side dashboard configuration arrived
    ServerConfigLoaded(ServerConfig),
    /// An interactive session was opened
    SessionOpened {
        workflow_id: String,
        session: SessionHandle,
        inactivity_period_days: Option<u64>,
    },
    /// The interactive session was closed
    SessionClosed { workflow_id: String },
    /// Stop was accepted by the server
    WorkflowStopped { workflow_id: String },
    /// Delete (or workspace cleanup) was accepted by the server
    WorkflowDeleted { workflow_id: String },
    /// A gateway call failed; surfaced through notifications and logs
    GatewayFailed {
        operation: GatewayOperation,
        workflow_id: Option<String>,
        message: String,
    },
}

/// Side effects requested by state updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchWorkflow { workflow_id: String, options: FetchOptions },
    FetchWorkflowLogs { workflow_id: String, options: FetchOptions },
    FetchWorkspace { workflow_id: String },
    FetchSpecification { workflow_id: String },
    FetchServerConfig,
    OpenInteractiveSession {
        workflow_id: String,
        inactivity_period_days: Option<u64>,
    },
    CloseInteractiveSession { workflow_id: String },
    StopWorkflow { workflow_id: String },
    DeleteWorkflow { workflow_id: String },
    /// Show a transient notification
    Notify {
        title: String,
        message: String,
        severity: Severity,
    },
    CopyToClipboard(String),
    // Change the main view
    SwitchTo(Route),
    // Display a modal view
    ShowModal(Modal),
    // Hide any open modals
    CloseModal,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    WorkflowDetails(String),
}

/// Dialogs attached to the workflow detail view. Each carries the workflow id
/// it acts upon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    DeleteWorkflow(String),
    StopWorkflow(String),
    ShareWorkflow(String),
}

impl Modal {
    pub fn workflow_id(&self) -> &str {
        match self {
            Self::DeleteWorkflow(id) | Self::StopWorkflow(id) | Self::ShareWorkflow(id) => id,
        }
    }
}
