//! Derivation of the per-workflow action menu.
//!
//! [`build_menu`] is a pure function of the workflow and the server's session
//! capabilities. Items are recomputed on every render and never stored.

use reana_types::{Effect, Modal, Workflow};
use reana_util::pluralize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuKey {
    OpenSession,
    Share,
    CloseSession,
    Stop,
    Delete,
    FreeUpDisk,
}

/// What activating a menu item does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuAction {
    OpenInteractiveSession {
        workflow_id: String,
        inactivity_period_days: Option<u64>,
    },
    ShowShareDialog(String),
    CloseInteractiveSession(String),
    ShowStopDialog(String),
    ShowDeleteDialog(String),
    /// Delete the workspace of an already deleted workflow, no confirmation.
    FreeUpDisk(String),
}

impl MenuAction {
    pub fn into_effects(self) -> Vec<Effect> {
        match self {
            MenuAction::OpenInteractiveSession {
                workflow_id,
                inactivity_period_days,
            } => vec![Effect::OpenInteractiveSession {
                workflow_id,
                inactivity_period_days,
            }],
            MenuAction::ShowShareDialog(workflow_id) => vec![Effect::ShowModal(Modal::ShareWorkflow(workflow_id))],
            MenuAction::CloseInteractiveSession(workflow_id) => {
                vec![Effect::CloseInteractiveSession { workflow_id }]
            }
            MenuAction::ShowStopDialog(workflow_id) => vec![Effect::ShowModal(Modal::StopWorkflow(workflow_id))],
            MenuAction::ShowDeleteDialog(workflow_id) => vec![Effect::ShowModal(Modal::DeleteWorkflow(workflow_id))],
            MenuAction::FreeUpDisk(workflow_id) => vec![Effect::DeleteWorkflow { workflow_id }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuItem {
    pub key: MenuKey,
    pub label: &'static str,
    pub icon: &'static str,
    pub action: MenuAction,
}

/// Server-side limits that shape the menu's side effects.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionCapabilities {
    pub max_inactivity_days: Option<u64>,
}

/// Ordered actions available for `workflow`.
pub fn build_menu(workflow: &Workflow, capabilities: &SessionCapabilities) -> Vec<MenuItem> {
    let id = workflow.id.clone();
    let deleted = workflow.is_deleted();
    let running = workflow.is_running();
    let session_open = workflow.has_open_session();

    let mut items = Vec::with_capacity(4);
    if !deleted && !session_open {
        items.push(MenuItem {
            key: MenuKey::OpenSession,
            label: "Open interactive session",
            icon: "◉",
            action: MenuAction::OpenInteractiveSession {
                workflow_id: id.clone(),
                inactivity_period_days: capabilities.max_inactivity_days,
            },
        });
    }
    items.push(MenuItem {
        key: MenuKey::Share,
        label: "Share workflow",
        icon: "⇪",
        action: MenuAction::ShowShareDialog(id.clone()),
    });
    // A deleted workflow's session is gone with it.
    if session_open && !deleted {
        items.push(MenuItem {
            key: MenuKey::CloseSession,
            label: "Close interactive session",
            icon: "◎",
            action: MenuAction::CloseInteractiveSession(id.clone()),
        });
    }
    if running {
        items.push(MenuItem {
            key: MenuKey::Stop,
            label: "Stop workflow",
            icon: "■",
            action: MenuAction::ShowStopDialog(id.clone()),
        });
    }
    if !deleted && !running {
        items.push(MenuItem {
            key: MenuKey::Delete,
            label: "Delete workflow",
            icon: "✖",
            action: MenuAction::ShowDeleteDialog(id.clone()),
        });
    }
    if deleted && workflow.size.raw > 0 {
        items.push(MenuItem {
            key: MenuKey::FreeUpDisk,
            label: "Free up disk",
            icon: "⛁",
            action: MenuAction::FreeUpDisk(id),
        });
    }
    items
}

/// Success notification text after an interactive session was opened.
pub fn session_opened_message(inactivity_period_days: Option<u64>) -> String {
    let mut message = String::from(
        "The interactive session has been created. However, it could take several minutes to start the \
         Jupyter Notebook. Its address is shown in the workflow header.",
    );
    if let Some(days) = inactivity_period_days {
        message.push_str(&format!(
            " Please note that it will be automatically closed after {} of inactivity.",
            pluralize(days, "day")
        ));
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use reana_types::{SessionStatus, WorkflowSize, WorkflowStatus};

    const ALL_STATUSES: [WorkflowStatus; 9] = [
        WorkflowStatus::Created,
        WorkflowStatus::Queued,
        WorkflowStatus::Pending,
        WorkflowStatus::Running,
        WorkflowStatus::Finished,
        WorkflowStatus::Failed,
        WorkflowStatus::Stopped,
        WorkflowStatus::Deleted,
        WorkflowStatus::Unknown,
    ];
    const ALL_SESSIONS: [Option<SessionStatus>; 4] = [
        None,
        Some(SessionStatus::Created),
        Some(SessionStatus::Closed),
        Some(SessionStatus::Unknown),
    ];

    fn workflow(status: WorkflowStatus, session_status: Option<SessionStatus>, raw: u64) -> Workflow {
        Workflow {
            id: "wf-1".into(),
            name: "roofit".into(),
            run_number: "1".into(),
            status,
            session_status,
            size: WorkflowSize {
                raw,
                human_readable: format!("{raw} Bytes"),
            },
            ..Workflow::default()
        }
    }

    fn labels(items: &[MenuItem]) -> Vec<&'static str> {
        items.iter().map(|item| item.label).collect()
    }

    fn every_workflow() -> impl Iterator<Item = Workflow> {
        ALL_STATUSES.into_iter().flat_map(|status| {
            ALL_SESSIONS
                .into_iter()
                .flat_map(move |session| [0, 1, 4096].into_iter().map(move |raw| workflow(status, session, raw)))
        })
    }

    #[test]
    fn deleted_workflows_never_offer_session_stop_or_delete() {
        for wf in every_workflow().filter(Workflow::is_deleted) {
            let keys: Vec<MenuKey> = build_menu(&wf, &SessionCapabilities::default())
                .iter()
                .map(|item| item.key)
                .collect();
            for forbidden in [MenuKey::OpenSession, MenuKey::CloseSession, MenuKey::Stop, MenuKey::Delete] {
                assert!(!keys.contains(&forbidden), "{forbidden:?} offered for {wf:?}");
            }
        }
    }

    #[test]
    fn free_up_disk_appears_once_only_with_workspace_left() {
        for wf in every_workflow().filter(Workflow::is_deleted) {
            let count = build_menu(&wf, &SessionCapabilities::default())
                .iter()
                .filter(|item| item.key == MenuKey::FreeUpDisk)
                .count();
            let expected = if wf.size.raw > 0 { 1 } else { 0 };
            assert_eq!(count, expected, "unexpected free-up entries for {wf:?}");
        }
        for wf in every_workflow().filter(|wf| !wf.is_deleted()) {
            let menu = build_menu(&wf, &SessionCapabilities::default());
            assert!(menu.iter().all(|item| item.key != MenuKey::FreeUpDisk));
        }
    }

    #[test]
    fn deleted_workflow_with_a_stale_session_cannot_close_it() {
        let wf = workflow(WorkflowStatus::Deleted, Some(SessionStatus::Created), 120);
        assert_eq!(
            labels(&build_menu(&wf, &SessionCapabilities::default())),
            ["Share workflow", "Free up disk"]
        );
    }

    #[test]
    fn open_session_swaps_open_for_close() {
        for wf in every_workflow().filter(|wf| wf.has_open_session() && !wf.is_deleted()) {
            let menu = build_menu(&wf, &SessionCapabilities::default());
            let keys: Vec<MenuKey> = menu.iter().map(|item| item.key).collect();
            assert!(keys.contains(&MenuKey::CloseSession));
            assert!(!keys.contains(&MenuKey::OpenSession));
        }
    }

    #[test]
    fn running_offers_stop_instead_of_delete() {
        for wf in every_workflow().filter(Workflow::is_running) {
            let keys: Vec<MenuKey> = build_menu(&wf, &SessionCapabilities::default())
                .iter()
                .map(|item| item.key)
                .collect();
            assert!(keys.contains(&MenuKey::Stop));
            assert!(!keys.contains(&MenuKey::Delete));
        }
    }

    #[test]
    fn building_twice_yields_identical_menus() {
        let capabilities = SessionCapabilities {
            max_inactivity_days: Some(7),
        };
        for wf in every_workflow() {
            assert_eq!(build_menu(&wf, &capabilities), build_menu(&wf, &capabilities));
        }
    }

    #[test]
    fn running_with_open_session_follows_rule_order() {
        let wf = workflow(WorkflowStatus::Running, Some(SessionStatus::Created), 5);
        assert_eq!(
            labels(&build_menu(&wf, &SessionCapabilities::default())),
            ["Share workflow", "Close interactive session", "Stop workflow"]
        );
    }

    #[test]
    fn deleted_with_workspace_offers_share_and_free_up() {
        let wf = workflow(WorkflowStatus::Deleted, None, 120);
        assert_eq!(
            labels(&build_menu(&wf, &SessionCapabilities::default())),
            ["Share workflow", "Free up disk"]
        );
    }

    #[test]
    fn finished_without_session_offers_open_share_delete() {
        let wf = workflow(WorkflowStatus::Finished, None, 0);
        assert_eq!(
            labels(&build_menu(&wf, &SessionCapabilities::default())),
            ["Open interactive session", "Share workflow", "Delete workflow"]
        );
    }

    #[test]
    fn open_session_action_carries_inactivity_period() {
        let wf = workflow(WorkflowStatus::Finished, None, 0);
        let capabilities = SessionCapabilities {
            max_inactivity_days: Some(7),
        };
        let open = build_menu(&wf, &capabilities).remove(0);
        assert_eq!(
            open.action.into_effects(),
            vec![Effect::OpenInteractiveSession {
                workflow_id: "wf-1".into(),
                inactivity_period_days: Some(7),
            }]
        );
    }

    #[test]
    fn dialog_actions_open_modals_and_free_up_deletes_directly() {
        let running = workflow(WorkflowStatus::Running, None, 0);
        let stop = build_menu(&running, &SessionCapabilities::default())
            .into_iter()
            .find(|item| item.key == MenuKey::Stop)
            .expect("stop item");
        assert_eq!(
            stop.action.into_effects(),
            vec![Effect::ShowModal(Modal::StopWorkflow("wf-1".into()))]
        );

        let deleted = workflow(WorkflowStatus::Deleted, None, 10);
        let free_up = build_menu(&deleted, &SessionCapabilities::default())
            .into_iter()
            .find(|item| item.key == MenuKey::FreeUpDisk)
            .expect("free up item");
        assert_eq!(
            free_up.action.into_effects(),
            vec![Effect::DeleteWorkflow {
                workflow_id: "wf-1".into()
            }]
        );
    }

    #[test]
    fn session_message_mentions_inactivity_period_when_configured() {
        assert!(session_opened_message(Some(7)).contains("closed after 7 days of inactivity"));
        assert!(session_opened_message(Some(1)).contains("after 1 day of"));
        assert!(!session_opened_message(None).contains("inactivity"));
    }
}
