use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use reana_types::{Effect, FetchOptions, Modal, Msg, Severity, Workflow};
use tracing::{debug, info};

use super::dialogs::dialog_for;
use super::info_panel::{INFO_PANEL_HEIGHT, PollingSummary, render_info_panel};
use super::panes::{
    DetailTab, PanesState, render_engine_logs, render_job_logs, render_specification, render_tab_bar, render_workspace,
};
use super::phase::DetailPhase;
use crate::app::App;
use crate::polling::PollingController;
use crate::store::StoreSelectors;
use crate::ui::components::Component;
use crate::ui::components::actions_popup::{ActionsPopup, MenuItem, Propagation, build_menu};
use crate::ui::components::common::ConfirmationModal;
use crate::ui::theme::Theme;
use crate::ui::theme::theme_helpers as th;
use crate::ui::utils::centered_min;

const NOT_FOUND_TITLE: &str = "An error has occurred";
const NOT_FOUND_MESSAGE: &str = "Sorry, this workflow either does not exist or you are not authorised to see it.";
const MOUSE_SCROLL_ROWS: i32 = 3;

/// Detail page of one workflow: metadata header, action menu, tabbed logs
/// and workspace, plus the confirmation dialogs.
///
/// While mounted the component owns the polling timer for its identifier;
/// [`Component::on_route_exit`] releases it.
#[derive(Debug)]
pub struct WorkflowDetailsComponent {
    workflow_id: String,
    polling: PollingController,
    popup: ActionsPopup,
    dialog: ConfirmationModal,
    /// Modal the dialog was last built for
    dialog_modal: Option<Modal>,
    tab: DetailTab,
    panes: PanesState,
    /// Tabs whose data was already requested in this mount
    requested: [bool; 4],
    tab_areas: Vec<Rect>,
    pane_area: Rect,
}

impl WorkflowDetailsComponent {
    pub fn new(workflow_id: impl Into<String>) -> Self {
        Self {
            workflow_id: workflow_id.into(),
            polling: PollingController::default(),
            popup: ActionsPopup::default(),
            dialog: ConfirmationModal::default(),
            dialog_modal: None,
            tab: DetailTab::default(),
            panes: PanesState::default(),
            requested: [false; 4],
            tab_areas: Vec::new(),
            pane_area: Rect::default(),
        }
    }

    fn phase(&self, app: &App) -> DetailPhase {
        DetailPhase::resolve(app.store(), &self.workflow_id)
    }

    fn menu_items(&self, app: &App) -> Vec<MenuItem> {
        app.store()
            .workflow(&self.workflow_id)
            .map(|workflow| build_menu(workflow, &app.session_capabilities()))
            .unwrap_or_default()
    }

    /// Whether a message about `workflow_id` concerns the workflow on screen.
    /// Mutations address workflows by UUID while the view may be keyed by a
    /// `name.run` reference.
    fn concerns_this_view(&self, app: &App, workflow_id: &str) -> bool {
        workflow_id == self.workflow_id
            || app
                .store()
                .workflow(&self.workflow_id)
                .is_some_and(|workflow| workflow.id == workflow_id)
    }

    /// Rebuild the dialog when the application's open modal changed.
    fn sync_dialog(&mut self, app: &App) {
        let wanted = app
            .open_modal
            .as_ref()
            .filter(|modal| self.concerns_this_view(app, modal.workflow_id()));
        if wanted == self.dialog_modal.as_ref() {
            return;
        }
        match wanted {
            Some(modal) => {
                self.popup.close();
                self.dialog
                    .show(dialog_for(modal, app.store().workflow(&self.workflow_id)));
            }
            None => self.dialog.hide(),
        }
        self.dialog_modal = wanted.cloned();
    }

    fn select_tab(&mut self, app: &App, tab: DetailTab) -> Vec<Effect> {
        self.tab = tab;
        if self.requested[tab.index()] {
            return Vec::new();
        }
        self.requested[tab.index()] = true;
        let workflow_id = self.workflow_id.clone();
        match tab {
            DetailTab::Workspace if app.store().workspace(&workflow_id).is_none() => {
                vec![Effect::FetchWorkspace { workflow_id }]
            }
            DetailTab::Specification if app.store().specification(&workflow_id).is_none() => {
                vec![Effect::FetchSpecification { workflow_id }]
            }
            _ => Vec::new(),
        }
    }

    /// Background refetch of metadata and logs, plus the data behind the
    /// visible tab.
    fn refresh(&self) -> Vec<Effect> {
        let mut effects = self.polling.refresh();
        let workflow_id = self.workflow_id.clone();
        match self.tab {
            DetailTab::Workspace => effects.push(Effect::FetchWorkspace { workflow_id }),
            DetailTab::Specification => effects.push(Effect::FetchSpecification { workflow_id }),
            DetailTab::JobLogs | DetailTab::EngineLogs => {}
        }
        effects
    }

    fn scroll(&mut self, app: &App, key: KeyCode) {
        if self.tab == DetailTab::JobLogs {
            let job_count = app.store().logs(&self.workflow_id).map_or(0, |logs| logs.job_logs.len());
            match key {
                KeyCode::Char('n') | KeyCode::Char(']') => return self.panes.select_next_job(job_count),
                KeyCode::Char('p') | KeyCode::Char('[') => return self.panes.select_prev_job(),
                _ => {}
            }
        }
        let metrics = self.panes.scroll_mut(self.tab);
        match key {
            KeyCode::Up | KeyCode::Char('k') => metrics.scroll_lines(-1),
            KeyCode::Down | KeyCode::Char('j') => metrics.scroll_lines(1),
            KeyCode::PageUp => metrics.scroll_pages(-1),
            KeyCode::PageDown => metrics.scroll_pages(1),
            KeyCode::Home | KeyCode::Char('g') => metrics.scroll_to_top(),
            KeyCode::End | KeyCode::Char('G') => metrics.scroll_to_bottom(),
            _ => {}
        }
    }

    fn render_loader(&self, frame: &mut Frame, rect: Rect, app: &App) {
        let theme = &*app.ctx.theme;
        let area = centered_min(30, 0, 24, 1, rect);
        let line = Line::from(vec![
            Span::styled(format!("{} ", app.throbber()), theme.accent_primary_style()),
            Span::styled("Loading workflow...", theme.text_secondary_style()),
        ]);
        frame.render_widget(Paragraph::new(line).centered(), area);
    }

    fn render_not_found(&self, frame: &mut Frame, rect: Rect, theme: &dyn Theme) {
        let area = centered_min(50, 0, 40, 5, rect);
        let block = th::block_with_severity(theme, Severity::Error, Some(NOT_FOUND_TITLE));
        let body = Paragraph::new(Span::styled(NOT_FOUND_MESSAGE, theme.text_primary_style()))
            .wrap(Wrap { trim: true })
            .block(block);
        frame.render_widget(Clear, area);
        frame.render_widget(body, area);
    }

    fn render_found(&mut self, frame: &mut Frame, rect: Rect, app: &App, workflow: &Workflow) {
        let theme = &*app.ctx.theme;
        let [info_area, tabs_area, pane_area] = Layout::vertical([
            Constraint::Length(INFO_PANEL_HEIGHT),
            Constraint::Length(1),
            Constraint::Min(1),
        ])
        .areas(rect);

        let polling = PollingSummary {
            interval: self.polling.interval(),
            active: self.polling.is_polling(),
        };
        let trigger_row = render_info_panel(
            frame,
            info_area,
            theme,
            workflow,
            &app.ctx.config.server_url,
            polling,
            Utc::now(),
        );
        let items = build_menu(workflow, &app.session_capabilities());
        self.popup.render_trigger(frame, trigger_row, !items.is_empty(), theme);

        self.tab_areas = render_tab_bar(frame, tabs_area, theme, self.tab);
        self.pane_area = pane_area;

        let store = app.store();
        match self.tab {
            DetailTab::JobLogs => {
                render_job_logs(frame, pane_area, theme, store.logs(&self.workflow_id), &mut self.panes)
            }
            DetailTab::EngineLogs => {
                render_engine_logs(frame, pane_area, theme, store.logs(&self.workflow_id), &mut self.panes)
            }
            DetailTab::Workspace => {
                render_workspace(frame, pane_area, theme, store.workspace(&self.workflow_id), &mut self.panes)
            }
            DetailTab::Specification => render_specification(
                frame,
                pane_area,
                theme,
                store.specification(&self.workflow_id),
                &mut self.panes,
            ),
        }

        self.popup.render_menu(frame, rect, &items, theme);

        if self.dialog.is_visible() {
            let width = centered_min(60, 0, 50, 0, rect).width;
            let height = self.dialog.preferred_height(width);
            let area = centered_min(60, 0, 50, height, rect);
            self.dialog.render(frame, area, app);
        }
    }
}

impl Component for WorkflowDetailsComponent {
    fn on_route_enter(&mut self, app: &mut App) -> Vec<Effect> {
        info!(workflow_id = %self.workflow_id, "workflow details mounted");
        self.polling = PollingController::new(app.ctx.config.polling_interval());
        let mut effects = self.polling.activate(&self.workflow_id, &app.ctx.msg_sender);
        effects.push(Effect::FetchWorkflowLogs {
            workflow_id: self.workflow_id.clone(),
            options: FetchOptions::background(),
        });
        effects
    }

    fn on_route_exit(&mut self, app: &mut App) -> Vec<Effect> {
        debug!(workflow_id = %self.workflow_id, "workflow details unmounted");
        self.polling.deactivate();
        self.popup.close();
        self.dialog.hide();
        self.dialog_modal = None;
        app.open_modal = None;
        Vec::new()
    }

    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        match msg {
            Msg::PollTick { workflow_id, generation } => self.polling.on_tick(workflow_id, *generation),
            Msg::RefreshRequested if self.phase(app) != DetailPhase::FetchedNotFound => self.refresh(),
            Msg::WorkflowLoaded { workflow_id, workflow } if *workflow_id == self.workflow_id => {
                self.polling.observe(workflow);
                Vec::new()
            }
            Msg::WorkflowMissing { workflow_id } if *workflow_id == self.workflow_id => {
                self.polling.deactivate();
                self.popup.close();
                app.open_modal = None;
                Vec::new()
            }
            Msg::ServerConfigLoaded(_) => {
                self.polling
                    .set_interval(app.ctx.config.polling_interval(), &app.ctx.msg_sender);
                Vec::new()
            }
            // The app refetches mutated workflows by UUID; refresh this
            // view's own key when it differs.
            Msg::SessionOpened { workflow_id, .. }
            | Msg::SessionClosed { workflow_id }
            | Msg::WorkflowStopped { workflow_id }
            | Msg::WorkflowDeleted { workflow_id }
                if *workflow_id != self.workflow_id && self.concerns_this_view(app, workflow_id) =>
            {
                self.polling.refresh()
            }
            _ => Vec::new(),
        }
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.sync_dialog(app);
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return vec![Effect::Quit];
        }
        if self.dialog.is_visible() {
            return self.dialog.handle_key_events(app, key);
        }

        let phase = self.phase(app);
        let found = phase == DetailPhase::FetchedFound;
        if found {
            let items = self.menu_items(app);
            if let Propagation::Stop(effects) = self.popup.handle_key_events(key, items) {
                return effects;
            }
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => vec![Effect::Quit],
            // A missing workflow stays missing; no retries.
            KeyCode::Char('r') if phase != DetailPhase::FetchedNotFound => self.refresh(),
            _ if !found => Vec::new(),
            KeyCode::Tab | KeyCode::Right => self.select_tab(app, self.tab.next()),
            KeyCode::BackTab | KeyCode::Left => self.select_tab(app, self.tab.prev()),
            KeyCode::Char(digit @ '1'..='4') => {
                let index = digit as usize - '1' as usize;
                DetailTab::from_index(index)
                    .map(|tab| self.select_tab(app, tab))
                    .unwrap_or_default()
            }
            code => {
                self.scroll(app, code);
                Vec::new()
            }
        }
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        self.sync_dialog(app);
        if self.dialog.is_visible() {
            return self.dialog.handle_mouse_events(app, mouse);
        }
        if self.phase(app) != DetailPhase::FetchedFound {
            return Vec::new();
        }
        let items = self.menu_items(app);
        if let Propagation::Stop(effects) = self.popup.handle_mouse_events(mouse, items) {
            return effects;
        }

        let position = Position::new(mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                let clicked = self.tab_areas.iter().position(|area| area.contains(position));
                clicked
                    .and_then(DetailTab::from_index)
                    .map(|tab| self.select_tab(app, tab))
                    .unwrap_or_default()
            }
            MouseEventKind::ScrollUp if self.pane_area.contains(position) => {
                self.panes.scroll_mut(self.tab).scroll_lines(-MOUSE_SCROLL_ROWS);
                Vec::new()
            }
            MouseEventKind::ScrollDown if self.pane_area.contains(position) => {
                self.panes.scroll_mut(self.tab).scroll_lines(MOUSE_SCROLL_ROWS);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        if self.dialog.is_visible() {
            return self.dialog.get_hint_spans(app);
        }
        let theme = &*app.ctx.theme;
        if self.popup.is_open() {
            return th::build_hint_spans(
                theme,
                &[("↑/↓", " Select  "), ("Enter", " Run  "), ("Esc", " Close")],
            );
        }
        match self.phase(app) {
            DetailPhase::FetchedFound => {
                let mut hints = vec![
                    ("Tab/1-4", " Switch tab  "),
                    ("↑/↓/PgUp/PgDn", " Scroll  "),
                    ("a", " Actions  "),
                    ("r", " Refresh  "),
                    ("q", " Quit"),
                ];
                if self.tab == DetailTab::JobLogs {
                    hints.insert(2, ("n/p", " Next/prev job  "));
                }
                th::build_hint_spans(theme, &hints)
            }
            DetailPhase::NotYetFetched => th::build_hint_spans(theme, &[("r", " Retry  "), ("q", " Quit")]),
            DetailPhase::FetchedNotFound => th::build_hint_spans(theme, &[("q", " Quit")]),
        }
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        self.sync_dialog(app);
        match self.phase(app) {
            DetailPhase::NotYetFetched => self.render_loader(frame, rect, app),
            DetailPhase::FetchedNotFound => self.render_not_found(frame, rect, &*app.ctx.theme),
            DetailPhase::FetchedFound => {
                if let Some(workflow) = app.store().workflow(&self.workflow_id) {
                    self.render_found(frame, rect, app, workflow);
                }
            }
        }
    }
}
