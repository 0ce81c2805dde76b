use crossterm::event::{KeyCode, KeyEvent, MouseButton, MouseEvent, MouseEventKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};
use reana_types::Effect;
use unicode_width::UnicodeWidthStr;

use super::state::ConfirmationModalState;
use crate::app::App;
use crate::ui::components::Component;
use crate::ui::theme::theme_helpers::{block_with_severity, build_hint_spans, render_button};

const MIN_BUTTON_WIDTH: u16 = 12;
const BUTTON_SPACER: u16 = 2;

/// Dialog with a message and a row of buttons. Without state it renders
/// nothing and ignores input.
#[derive(Debug, Default)]
pub struct ConfirmationModal {
    state: Option<ConfirmationModalState>,
    button_areas: Vec<Rect>,
}

impl ConfirmationModal {
    pub fn show(&mut self, state: ConfirmationModalState) {
        self.state = Some(state);
        self.button_areas.clear();
    }

    pub fn hide(&mut self) {
        self.state = None;
        self.button_areas.clear();
    }

    pub fn is_visible(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&ConfirmationModalState> {
        self.state.as_ref()
    }

    /// Height the dialog needs to show `width` columns of message plus buttons.
    pub fn preferred_height(&self, width: u16) -> u16 {
        let Some(state) = self.state.as_ref() else {
            return 0;
        };
        let inner_width = width.saturating_sub(2).max(1) as usize;
        let message_rows: usize = state
            .message()
            .lines()
            .map(|line| UnicodeWidthStr::width(line).div_ceil(inner_width).max(1))
            .sum();
        // borders + message + spacer + buttons
        2 + message_rows.max(1) as u16 + 1 + 3
    }
}

impl Component for ConfirmationModal {
    fn handle_key_events(&mut self, _app: &mut App, key: KeyEvent) -> Vec<Effect> {
        let Some(state) = self.state.as_mut() else {
            return Vec::new();
        };
        match key.code {
            KeyCode::Tab | KeyCode::Right => state.focus_next(),
            KeyCode::BackTab | KeyCode::Left => state.focus_prev(),
            KeyCode::Enter => return state.press_focused(),
            KeyCode::Esc => return vec![Effect::CloseModal],
            KeyCode::Char(character) => {
                if let Some(index) = state.shortcut_index(character) {
                    return state.press(index);
                }
            }
            _ => {}
        }
        Vec::new()
    }

    fn handle_mouse_events(&mut self, _app: &mut App, mouse: MouseEvent) -> Vec<Effect> {
        let Some(state) = self.state.as_ref() else {
            return Vec::new();
        };
        let MouseEvent { kind, column, row, .. } = mouse;
        if kind == MouseEventKind::Down(MouseButton::Left) {
            let position = Position::new(column, row);
            if let Some(index) = self.button_areas.iter().position(|area| area.contains(position)) {
                return state.press(index);
            }
        }
        Vec::new()
    }

    fn get_hint_spans(&self, app: &App) -> Vec<Span<'static>> {
        build_hint_spans(
            &*app.ctx.theme,
            &[("Tab/←/→", " Focus  "), ("Enter", " Confirm  "), ("Esc", " Cancel")],
        )
    }

    fn get_preferred_layout(&self, _app: &App, area: Rect) -> Vec<Rect> {
        let has_message = self.state.as_ref().is_some_and(|state| !state.message().is_empty());
        Layout::vertical([
            Constraint::Min(if has_message { 1 } else { 0 }), // Message
            Constraint::Length(1),                            // Spacer
            Constraint::Length(3),                            // Buttons
        ])
        .split(area)
        .to_vec()
    }

    fn render(&mut self, frame: &mut Frame, rect: Rect, app: &App) {
        let Some(state) = self.state.as_ref() else {
            return;
        };
        let theme = &*app.ctx.theme;
        let block = block_with_severity(theme, state.severity(), Some(state.title()))
            .style(theme.modal_background_style().fg(theme.roles().text));
        let inner = block.inner(rect);

        frame.render_widget(Clear, rect);
        frame.render_widget(block, rect);

        let layout = self.get_preferred_layout(app, inner);
        let [message_rect, _, button_rect] = layout[..] else {
            return;
        };

        let lines: Vec<Line> = state
            .message()
            .lines()
            .map(|line| Line::from(Span::styled(line.to_string(), theme.text_primary_style())))
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), message_rect);

        let mut button_areas = Vec::with_capacity(state.buttons().len());
        let mut x = button_rect.x;
        for (index, button) in state.buttons().iter().enumerate() {
            let width = (UnicodeWidthStr::width(button.label.as_str()) as u16 + 4).max(MIN_BUTTON_WIDTH);
            let right_edge = button_rect.x + button_rect.width;
            if x >= right_edge {
                break;
            }
            let area = Rect::new(x, button_rect.y, width.min(right_edge - x), button_rect.height);
            render_button(
                frame,
                area,
                button.label.as_str(),
                state.is_button_focused(index),
                None,
                theme,
            );
            button_areas.push(area);
            x = x.saturating_add(width + BUTTON_SPACER);
        }
        self.button_areas = button_areas;
    }
}
