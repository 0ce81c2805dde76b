//! Dialog contents for the modals the detail view can open.

use reana_types::{Effect, Modal, Severity, Workflow};

use crate::ui::components::common::{ConfirmationButton, ConfirmationModalState};

/// Build the dialog for `modal`. `workflow` provides the display name when
/// it is known.
pub fn dialog_for(modal: &Modal, workflow: Option<&Workflow>) -> ConfirmationModalState {
    let workflow_id = modal.workflow_id().to_string();
    let name = workflow
        .map(Workflow::display_name)
        .unwrap_or_else(|| workflow_id.clone());
    match modal {
        Modal::DeleteWorkflow(_) => ConfirmationModalState::new(
            "Delete workflow",
            format!(
                "Are you sure you want to delete workflow \"{name}\"?\n\
                 Its workspace will be removed. This cannot be undone."
            ),
            Severity::Error,
            vec![
                ConfirmationButton::new("Delete", vec![Effect::DeleteWorkflow { workflow_id }, Effect::CloseModal]),
                ConfirmationButton::dismiss("Cancel"),
            ],
        )
        .with_focus(1),
        Modal::StopWorkflow(_) => ConfirmationModalState::new(
            "Stop workflow",
            format!(
                "Are you sure you want to stop workflow \"{name}\"?\n\
                 Running jobs will be terminated."
            ),
            Severity::Warning,
            vec![
                ConfirmationButton::new("Stop", vec![Effect::StopWorkflow { workflow_id }, Effect::CloseModal]),
                ConfirmationButton::dismiss("Cancel"),
            ],
        )
        .with_focus(1),
        Modal::ShareWorkflow(_) => {
            let identifier = workflow.map(|workflow| workflow.id.clone()).unwrap_or(workflow_id);
            ConfirmationModalState::new(
                "Share workflow",
                format!(
                    "Workflow \"{name}\" can be referenced by its identifier:\n{identifier}\n\
                     Press c to copy it to the clipboard."
                ),
                Severity::Info,
                vec![
                    ConfirmationButton::new(
                        "Copy identifier",
                        vec![Effect::CopyToClipboard(identifier), Effect::CloseModal],
                    )
                    .with_shortcut('c'),
                    ConfirmationButton::dismiss("Close"),
                ],
            )
        }
    }
}
