//! Workflow store shared by every view.
//!
//! Reads go through [`StoreSelectors`]; the only write path is
//! [`WorkflowStore::dispatch`] with a [`StoreCommand`]. Views hold a shared
//! borrow of the store while rendering and never mutate it directly.

use std::collections::{HashMap, HashSet};

use reana_types::{LogBundle, Workflow, WorkspaceFile};
use serde_json::Value;

/// Read-only queries over the store.
pub trait StoreSelectors {
    /// Workflow metadata, present only when the last fetch found it.
    fn workflow(&self, workflow_id: &str) -> Option<&Workflow>;
    /// Whether at least one fetch for this identifier has completed.
    fn is_fetched(&self, workflow_id: &str) -> bool;
    /// Whether a fetch with a visible loader is in flight.
    fn is_loading(&self, workflow_id: &str) -> bool;
    fn logs(&self, workflow_id: &str) -> Option<&LogBundle>;
    fn workspace(&self, workflow_id: &str) -> Option<&[WorkspaceFile]>;
    fn specification(&self, workflow_id: &str) -> Option<&Value>;
}

/// The write vocabulary of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCommand {
    /// A fetch started; only loader-visible fetches mark the id as loading.
    FetchStarted { workflow_id: String, show_loader: bool },
    /// A fetch failed for a reason other than "not found".
    FetchFailed { workflow_id: String },
    WorkflowLoaded { workflow_id: String, workflow: Box<Workflow> },
    WorkflowMissing { workflow_id: String },
    LogsLoaded { workflow_id: String, logs: Box<LogBundle> },
    WorkspaceLoaded { workflow_id: String, files: Vec<WorkspaceFile> },
    SpecificationLoaded { workflow_id: String, specification: Value },
}

/// Normalized workflow state keyed by the identifier the view asked for.
#[derive(Debug, Default)]
pub struct WorkflowStore {
    workflows: HashMap<String, Workflow>,
    fetched: HashSet<String>,
    loading: HashSet<String>,
    logs: HashMap<String, LogBundle>,
    workspaces: HashMap<String, Vec<WorkspaceFile>>,
    specifications: HashMap<String, Value>,
}

impl WorkflowStore {
    pub fn dispatch(&mut self, command: StoreCommand) {
        match command {
            StoreCommand::FetchStarted {
                workflow_id,
                show_loader,
            } => {
                if show_loader {
                    self.loading.insert(workflow_id);
                }
            }
            StoreCommand::FetchFailed { workflow_id } => {
                // The identifier stays "not yet fetched" when nothing ever
                // arrived so the next poll or refresh can resolve it.
                self.loading.remove(&workflow_id);
            }
            StoreCommand::WorkflowLoaded { workflow_id, workflow } => {
                self.loading.remove(&workflow_id);
                self.fetched.insert(workflow_id.clone());
                self.workflows.insert(workflow_id, *workflow);
            }
            StoreCommand::WorkflowMissing { workflow_id } => {
                self.loading.remove(&workflow_id);
                self.workflows.remove(&workflow_id);
                self.logs.remove(&workflow_id);
                self.fetched.insert(workflow_id);
            }
            StoreCommand::LogsLoaded { workflow_id, logs } => {
                self.logs.insert(workflow_id, *logs);
            }
            StoreCommand::WorkspaceLoaded { workflow_id, files } => {
                self.workspaces.insert(workflow_id, files);
            }
            StoreCommand::SpecificationLoaded {
                workflow_id,
                specification,
            } => {
                self.specifications.insert(workflow_id, specification);
            }
        }
    }
}

impl StoreSelectors for WorkflowStore {
    fn workflow(&self, workflow_id: &str) -> Option<&Workflow> {
        self.workflows.get(workflow_id)
    }

    fn is_fetched(&self, workflow_id: &str) -> bool {
        self.fetched.contains(workflow_id)
    }

    fn is_loading(&self, workflow_id: &str) -> bool {
        self.loading.contains(workflow_id)
    }

    fn logs(&self, workflow_id: &str) -> Option<&LogBundle> {
        self.logs.get(workflow_id)
    }

    fn workspace(&self, workflow_id: &str) -> Option<&[WorkspaceFile]> {
        self.workspaces.get(workflow_id).map(Vec::as_slice)
    }

    fn specification(&self, workflow_id: &str) -> Option<&Value> {
        self.specifications.get(workflow_id)
    }
}
