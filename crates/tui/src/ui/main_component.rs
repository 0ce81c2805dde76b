use crossterm::event::{KeyEvent, MouseEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use reana_types::{Effect, Modal, Msg, Route};
use tracing::debug;

use crate::app::App;
use crate::ui::components::Component;
use crate::ui::components::notifications::ToastComponent;
use crate::ui::components::workflow_details::WorkflowDetailsComponent;

/// Root view: the routed content view, the hints bar and the toast stack.
#[derive(Default)]
pub struct MainView {
    /// Current main view component
    pub content_view: Option<Box<dyn Component>>,
    toasts: ToastComponent,
}

impl MainView {
    /// Replace the content view for `route`. Not meant to be called directly;
    /// the runtime does it while handling `Effect::SwitchTo` so that the
    /// previous view's `on_route_exit` runs first.
    pub fn set_current_route(&mut self, _app: &mut App, route: Route) {
        let view: Box<dyn Component> = match route {
            Route::WorkflowDetails(workflow_id) => Box::new(WorkflowDetailsComponent::new(workflow_id)),
        };
        self.content_view = Some(view);
    }

    /// Update the open modal (use None to clear). The content view builds
    /// and renders the matching dialog.
    pub fn set_open_modal(&mut self, app: &mut App, modal: Option<Modal>) {
        debug!(?modal, "modal changed");
        app.open_modal = modal;
    }
}

impl Component for MainView {
    fn handle_message(&mut self, app: &mut App, msg: &Msg) -> Vec<Effect> {
        let mut effects = app.update(msg);
        if let Some(content) = self.content_view.as_mut() {
            effects.extend(content.handle_message(app, msg));
        }
        effects
    }

    fn handle_key_events(&mut self, app: &mut App, key: KeyEvent) -> Vec<Effect> {
        self.content_view
            .as_mut()
            .map(|content| content.handle_key_events(app, key))
            .unwrap_or_default()
    }

    fn handle_mouse_events(&mut self, app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        self.content_view
            .as_mut()
            .map(|content| content.handle_mouse_events(app, mouse))
            .unwrap_or_default()
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        let mut hint_spans = vec![Span::styled("Hints: ", app.ctx.theme.text_muted_style())];
        if let Some(content) = self.content_view.as_ref() {
            hint_spans.extend(content.get_hint_spans(app));
        }
        hint_spans
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        Layout::vertical([
            Constraint::Min(1),    // Main view
            Constraint::Length(1), // Hints bar
        ])
        .split(area)
        .to_vec()
    }

    fn render(&mut self, frame: &mut Frame, area: Rect, app: &App) {
        // Fill the entire background with the theme's background color for consistency
        let bg_fill = Paragraph::new("").style(Style::default().bg(app.ctx.theme.roles().background));
        frame.render_widget(bg_fill, area);

        let layout = self.get_preferred_layout(app, area);
        if let Some(content) = self.content_view.as_mut() {
            content.render(frame, layout[0], app);
        }

        let hints_widget = Paragraph::new(Line::from(self.get_hint_spans(app))).style(app.ctx.theme.text_muted_style());
        frame.render_widget(hints_widget, layout[1]);

        if !app.notifications.is_empty() {
            self.toasts.render(frame, layout[0], app);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_support::ScriptedGateway;
    use reana_types::Severity;
    use reana_util::DashboardConfig;
    use tokio::sync::mpsc;

    #[tokio::test(start_paused = true)]
    async fn messages_reach_app_before_content_view() {
        let (sender, _receiver) = mpsc::channel(8);
        let mut app = App::new(DashboardConfig::default(), Arc::new(ScriptedGateway::default()), sender);
        let mut main_view = MainView::default();
        main_view.set_current_route(&mut app, Route::WorkflowDetails("wf".into()));

        let effects = main_view.handle_message(
            &mut app,
            &Msg::SessionClosed {
                workflow_id: "wf".into(),
            },
        );
        assert!(matches!(
            &effects[0],
            Effect::Notify {
                severity: Severity::Success,
                ..
            }
        ));
    }

    #[test]
    fn modal_state_lives_on_the_app() {
        let (sender, _receiver) = mpsc::channel(8);
        let mut app = App::new(DashboardConfig::default(), Arc::new(ScriptedGateway::default()), sender);
        let mut main_view = MainView::default();
        main_view.set_open_modal(&mut app, Some(Modal::ShareWorkflow("wf".into())));
        assert_eq!(app.open_modal, Some(Modal::ShareWorkflow("wf".into())));
        main_view.set_open_modal(&mut app, None);
        assert_eq!(app.open_modal, None);
    }
}
