//! Application state for the REANA dashboard.
//!
//! [`App`] owns the workflow store, the toast queue and the shared context.
//! Components read the store through [`App::store`] and change it only by
//! dispatching [`StoreCommand`]s; gateway responses arrive as [`Msg`]s and are
//! folded into the store by [`App::update`].

use std::sync::Arc;
use std::time::Instant;

use reana_api::WorkflowGateway;
use reana_types::{Effect, FetchOptions, GatewayOperation, Modal, Msg, Severity};
use reana_util::DashboardConfig;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::store::{StoreCommand, WorkflowStore};
use crate::ui::components::actions_popup::{SessionCapabilities, session_opened_message};
use crate::ui::components::notifications::NotificationCenter;
use crate::ui::theme::{NordTheme, Theme};
use crate::ui::utils::THROBBER_FRAMES;

/// Cross-cutting shared context owned by the App.
///
/// Holds runtime-wide objects like the gateway and configuration. This avoids
/// threading multiple references through components.
pub struct SharedCtx {
    pub config: DashboardConfig,
    pub gateway: Arc<dyn WorkflowGateway>,
    pub theme: Box<dyn Theme>,
    /// Sender half of the runtime's message channel; polling timers post
    /// their ticks here.
    pub msg_sender: mpsc::Sender<Msg>,
}

impl SharedCtx {
    pub fn new(config: DashboardConfig, gateway: Arc<dyn WorkflowGateway>, msg_sender: mpsc::Sender<Msg>) -> Self {
        Self {
            config,
            gateway,
            theme: Box::new(NordTheme::new()),
            msg_sender,
        }
    }
}

pub struct App {
    pub ctx: SharedCtx,
    store: WorkflowStore,
    pub notifications: NotificationCenter,
    /// Dialog currently shown above the detail view
    pub open_modal: Option<Modal>,
    /// Whether gateway calls are in flight
    pub executing: bool,
    pub throbber_idx: usize,
    pub should_quit: bool,
}

impl App {
    pub fn new(config: DashboardConfig, gateway: Arc<dyn WorkflowGateway>, msg_sender: mpsc::Sender<Msg>) -> Self {
        Self {
            ctx: SharedCtx::new(config, gateway, msg_sender),
            store: WorkflowStore::default(),
            notifications: NotificationCenter::default(),
            open_modal: None,
            executing: false,
            throbber_idx: 0,
            should_quit: false,
        }
    }

    /// Read-only view of the workflow store.
    pub fn store(&self) -> &WorkflowStore {
        &self.store
    }

    /// The single write path into the store.
    pub fn dispatch(&mut self, command: StoreCommand) {
        self.store.dispatch(command);
    }

    pub fn session_capabilities(&self) -> SessionCapabilities {
        SessionCapabilities {
            max_inactivity_days: self.ctx.config.max_interactive_session_inactivity_period,
        }
    }

    pub fn notify(&mut self, title: impl Into<String>, message: impl Into<String>, severity: Severity) {
        self.notifications.push(title, message, severity, Instant::now());
    }

    pub fn throbber(&self) -> &'static str {
        THROBBER_FRAMES[self.throbber_idx % THROBBER_FRAMES.len()]
    }

    /// Fold a message into application state, returning follow-up effects.
    /// View-local reactions (polling, tabs) are handled by the components.
    pub fn update(&mut self, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::Tick => {
                self.throbber_idx = (self.throbber_idx + 1) % THROBBER_FRAMES.len();
                self.notifications.expire(Instant::now());
                Vec::new()
            }
            Msg::WorkflowLoaded { workflow_id, workflow } => {
                self.dispatch(StoreCommand::WorkflowLoaded {
                    workflow_id: workflow_id.clone(),
                    workflow: workflow.clone(),
                });
                Vec::new()
            }
            Msg::WorkflowMissing { workflow_id } => {
                info!(%workflow_id, "workflow not found or not accessible");
                self.dispatch(StoreCommand::WorkflowMissing {
                    workflow_id: workflow_id.clone(),
                });
                Vec::new()
            }
            Msg::WorkflowLogsLoaded { workflow_id, logs } => {
                self.dispatch(StoreCommand::LogsLoaded {
                    workflow_id: workflow_id.clone(),
                    logs: logs.clone(),
                });
                Vec::new()
            }
            Msg::WorkspaceLoaded { workflow_id, files } => {
                self.dispatch(StoreCommand::WorkspaceLoaded {
                    workflow_id: workflow_id.clone(),
                    files: files.clone(),
                });
                Vec::new()
            }
            Msg::SpecificationLoaded {
                workflow_id,
                specification,
            } => {
                self.dispatch(StoreCommand::SpecificationLoaded {
                    workflow_id: workflow_id.clone(),
                    specification: specification.clone(),
                });
                Vec::new()
            }
            Msg::ServerConfigLoaded(server) => {
                self.ctx.config.merge_server_config(server);
                info!(
                    polling_secs = self.ctx.config.effective_polling_secs(),
                    max_inactivity_days = ?self.ctx.config.max_interactive_session_inactivity_period,
                    "server configuration applied"
                );
                Vec::new()
            }
            Msg::SessionOpened {
                workflow_id,
                session,
                inactivity_period_days,
            } => {
                info!(%workflow_id, uri = %session.uri, "interactive session opened");
                vec![
                    Effect::Notify {
                        title: "Success!".into(),
                        message: session_opened_message(*inactivity_period_days),
                        severity: Severity::Success,
                    },
                    background_fetch(workflow_id),
                ]
            }
            Msg::SessionClosed { workflow_id } => {
                vec![
                    Effect::Notify {
                        title: "Success!".into(),
                        message: "The interactive session has been closed.".into(),
                        severity: Severity::Success,
                    },
                    background_fetch(workflow_id),
                ]
            }
            Msg::WorkflowStopped { workflow_id } => vec![background_fetch(workflow_id)],
            Msg::WorkflowDeleted { workflow_id } => vec![background_fetch(workflow_id)],
            Msg::GatewayFailed {
                operation,
                workflow_id,
                message,
            } => self.gateway_failed(*operation, workflow_id.as_deref(), message),
            Msg::Resize(..) | Msg::PollTick { .. } | Msg::RefreshRequested => Vec::new(),
        }
    }

    fn gateway_failed(&mut self, operation: GatewayOperation, workflow_id: Option<&str>, message: &str) -> Vec<Effect> {
        warn!(%operation, workflow_id = ?workflow_id, error = message, "gateway call failed");
        if operation == GatewayOperation::FetchWorkflow
            && let Some(workflow_id) = workflow_id
        {
            self.dispatch(StoreCommand::FetchFailed {
                workflow_id: workflow_id.to_string(),
            });
        }
        if operation == GatewayOperation::FetchServerConfig {
            // Local settings and built-in defaults stay in effect.
            return Vec::new();
        }
        vec![Effect::Notify {
            title: "An error has occurred".into(),
            message: format!("Could not {operation}: {message}"),
            severity: Severity::Warning,
        }]
    }
}

fn background_fetch(workflow_id: &str) -> Effect {
    Effect::FetchWorkflow {
        workflow_id: workflow_id.to_string(),
        options: FetchOptions::background(),
    }
}
