//! # Command Execution Layer
//!
//! This module translates application effects ([`Effect`]) into imperative
//! commands ([`Cmd`]) and executes them. It is the boundary where the pure
//! state updates of the app meet side effects:
//! - Writing to the system clipboard
//! - Calling the REANA gateway on spawned tokio tasks
//! - Posting toast notifications
//!
//! Every gateway call resolves to exactly one [`Msg`]: the success message for
//! the operation, `WorkflowMissing` when a workflow fetch finds nothing, or
//! `GatewayFailed` for anything else. Nothing here panics or propagates errors
//! past the runtime loop.

use std::sync::Arc;

use reana_api::{GatewayError, WorkflowGateway};
use reana_types::{Effect, FetchOptions, GatewayOperation, Msg, Severity};
use tokio::task::{JoinHandle, spawn};
use tracing::{debug, warn};

use crate::app::App;
use crate::store::StoreCommand;

/// Side-effectful commands executed outside of pure state updates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Write text into the system clipboard.
    ClipboardSet(String),
    /// Call the REANA gateway on a background task.
    Gateway(GatewayCall),
}

/// One request to the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
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
}

impl GatewayCall {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            GatewayCall::FetchWorkflow { .. } => GatewayOperation::FetchWorkflow,
            GatewayCall::FetchWorkflowLogs { .. } => GatewayOperation::FetchWorkflowLogs,
            GatewayCall::FetchWorkspace { .. } => GatewayOperation::FetchWorkspace,
            GatewayCall::FetchSpecification { .. } => GatewayOperation::FetchSpecification,
            GatewayCall::FetchServerConfig => GatewayOperation::FetchServerConfig,
            GatewayCall::OpenInteractiveSession { .. } => GatewayOperation::OpenInteractiveSession,
            GatewayCall::CloseInteractiveSession { .. } => GatewayOperation::CloseInteractiveSession,
            GatewayCall::StopWorkflow { .. } => GatewayOperation::StopWorkflow,
            GatewayCall::DeleteWorkflow { .. } => GatewayOperation::DeleteWorkflow,
        }
    }

    fn workflow_id(&self) -> Option<&str> {
        match self {
            GatewayCall::FetchWorkflow { workflow_id, .. }
            | GatewayCall::FetchWorkflowLogs { workflow_id, .. }
            | GatewayCall::FetchWorkspace { workflow_id }
            | GatewayCall::FetchSpecification { workflow_id }
            | GatewayCall::OpenInteractiveSession { workflow_id, .. }
            | GatewayCall::CloseInteractiveSession { workflow_id }
            | GatewayCall::StopWorkflow { workflow_id }
            | GatewayCall::DeleteWorkflow { workflow_id } => Some(workflow_id),
            GatewayCall::FetchServerConfig => None,
        }
    }
}

/// Results of running a batch of commands.
#[derive(Debug, Default)]
pub struct CommandBatch {
    /// Spawned gateway calls; each resolves to the message describing its outcome.
    pub pending: Vec<JoinHandle<Msg>>,
}

/// Convert effects into commands, applying the ones that only touch app state
/// (notifications, quitting, loader bookkeeping) on the way.
///
/// Navigation effects (`SwitchTo`, `ShowModal`, `CloseModal`) are handled by
/// the runtime before this point.
pub fn from_effects(app: &mut App, effects: Vec<Effect>) -> Vec<Cmd> {
    let mut commands = Vec::new();

    for effect in effects {
        let call = match effect {
            Effect::FetchWorkflow { workflow_id, options } => {
                app.dispatch(StoreCommand::FetchStarted {
                    workflow_id: workflow_id.clone(),
                    show_loader: options.show_loader,
                });
                GatewayCall::FetchWorkflow { workflow_id, options }
            }
            Effect::FetchWorkflowLogs { workflow_id, options } => GatewayCall::FetchWorkflowLogs { workflow_id, options },
            Effect::FetchWorkspace { workflow_id } => GatewayCall::FetchWorkspace { workflow_id },
            Effect::FetchSpecification { workflow_id } => GatewayCall::FetchSpecification { workflow_id },
            Effect::FetchServerConfig => GatewayCall::FetchServerConfig,
            Effect::OpenInteractiveSession {
                workflow_id,
                inactivity_period_days,
            } => GatewayCall::OpenInteractiveSession {
                workflow_id,
                inactivity_period_days,
            },
            Effect::CloseInteractiveSession { workflow_id } => GatewayCall::CloseInteractiveSession { workflow_id },
            Effect::StopWorkflow { workflow_id } => GatewayCall::StopWorkflow { workflow_id },
            Effect::DeleteWorkflow { workflow_id } => GatewayCall::DeleteWorkflow { workflow_id },
            Effect::CopyToClipboard(text) => {
                commands.push(Cmd::ClipboardSet(text));
                continue;
            }
            Effect::Notify {
                title,
                message,
                severity,
            } => {
                app.notify(title, message, severity);
                continue;
            }
            Effect::Quit => {
                app.should_quit = true;
                continue;
            }
            navigation @ (Effect::SwitchTo(_) | Effect::ShowModal(_) | Effect::CloseModal) => {
                debug!(?navigation, "navigation effect reached the command layer; ignoring");
                continue;
            }
        };
        commands.push(Cmd::Gateway(call));
    }

    commands
}

/// Execute commands. Clipboard writes happen inline; gateway calls are
/// spawned and returned as pending handles for the runtime to await.
pub fn run_cmds(app: &mut App, commands: Vec<Cmd>) -> CommandBatch {
    let mut batch = CommandBatch::default();
    for command in commands {
        match command {
            Cmd::ClipboardSet(text) => execute_clipboard_set(app, text),
            Cmd::Gateway(call) => {
                let gateway = Arc::clone(&app.ctx.gateway);
                batch.pending.push(spawn(execute_gateway_call(gateway, call)));
            }
        }
    }
    batch
}

/// Translate and execute effects in one step.
pub fn run_from_effects(app: &mut App, effects: Vec<Effect>) -> CommandBatch {
    let commands = from_effects(app, effects);
    run_cmds(app, commands)
}

fn execute_clipboard_set(app: &mut App, text: String) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => app.notify("Copied", "Copied to the clipboard.", Severity::Info),
        Err(error) => {
            warn!(%error, "clipboard write failed");
            app.notify("Clipboard unavailable", error.to_string(), Severity::Warning);
        }
    }
}

/// Perform one gateway call and describe its outcome as a message.
pub async fn execute_gateway_call(gateway: Arc<dyn WorkflowGateway>, call: GatewayCall) -> Msg {
    let operation = call.operation();
    let workflow_id = call.workflow_id().map(str::to_string);
    debug!(%operation, ?workflow_id, "executing gateway call");

    let result = match call {
        GatewayCall::FetchWorkflow { workflow_id, options } => {
            match gateway.fetch_workflow(&workflow_id, options).await {
                Ok(workflow) => Ok(Msg::WorkflowLoaded {
                    workflow_id,
                    workflow: Box::new(workflow),
                }),
                Err(GatewayError::NotFound) => Ok(Msg::WorkflowMissing { workflow_id }),
                Err(error) => Err(error),
            }
        }
        GatewayCall::FetchWorkflowLogs { workflow_id, options } => gateway
            .fetch_workflow_logs(&workflow_id, options)
            .await
            .map(|logs| Msg::WorkflowLogsLoaded {
                workflow_id,
                logs: Box::new(logs),
            }),
        GatewayCall::FetchWorkspace { workflow_id } => gateway
            .fetch_workspace(&workflow_id)
            .await
            .map(|files| Msg::WorkspaceLoaded { workflow_id, files }),
        GatewayCall::FetchSpecification { workflow_id } => gateway
            .fetch_specification(&workflow_id)
            .await
            .map(|specification| Msg::SpecificationLoaded {
                workflow_id,
                specification,
            }),
        GatewayCall::FetchServerConfig => gateway.fetch_config().await.map(Msg::ServerConfigLoaded),
        GatewayCall::OpenInteractiveSession {
            workflow_id,
            inactivity_period_days,
        } => gateway
            .open_interactive_session(&workflow_id)
            .await
            .map(|session| Msg::SessionOpened {
                workflow_id,
                session,
                inactivity_period_days,
            }),
        GatewayCall::CloseInteractiveSession { workflow_id } => gateway
            .close_interactive_session(&workflow_id)
            .await
            .map(|()| Msg::SessionClosed { workflow_id }),
        GatewayCall::StopWorkflow { workflow_id } => gateway
            .stop_workflow(&workflow_id)
            .await
            .map(|()| Msg::WorkflowStopped { workflow_id }),
        GatewayCall::DeleteWorkflow { workflow_id } => gateway
            .delete_workflow(&workflow_id)
            .await
            .map(|()| Msg::WorkflowDeleted { workflow_id }),
    };

    result.unwrap_or_else(|error| Msg::GatewayFailed {
        operation,
        workflow_id,
        message: error.to_string(),
    })
}
