//! Workflow detail view.

mod details_component;
mod dialogs;
mod info_panel;
mod panes;
mod phase;
mod specification;

pub use details_component::WorkflowDetailsComponent;
